use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle points a hook can be attached to.
///
/// Marked `non_exhaustive` so new lifecycle points can be added without
/// breaking downstream handlers.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HookEvent {
    /// Before a tool invocation
    PreToolUse,
    /// After a tool invocation
    PostToolUse,
    /// Before a command runs
    PreCommand,
    /// After a command ran
    PostCommand,
    /// Before a file operation
    PreFileOperation,
    /// After a file operation
    PostFileOperation,
    /// Session started
    SessionStart,
    /// Session ended
    SessionEnd,
    /// Before an agent is spawned
    PreAgentSpawn,
    /// After an agent was spawned
    PostAgentSpawn,
    /// Task started
    TaskStart,
    /// Task completed
    TaskComplete,
    /// Value written to the memory store
    MemoryStore,
    /// Value read from the memory store
    MemoryRetrieve,
    /// An error was raised somewhere in the host
    ErrorRaised,
}

impl HookEvent {
    /// Stable kebab-case identifier, used for bus topics and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            HookEvent::PreToolUse => "pre-tool-use",
            HookEvent::PostToolUse => "post-tool-use",
            HookEvent::PreCommand => "pre-command",
            HookEvent::PostCommand => "post-command",
            HookEvent::PreFileOperation => "pre-file-operation",
            HookEvent::PostFileOperation => "post-file-operation",
            HookEvent::SessionStart => "session-start",
            HookEvent::SessionEnd => "session-end",
            HookEvent::PreAgentSpawn => "pre-agent-spawn",
            HookEvent::PostAgentSpawn => "post-agent-spawn",
            HookEvent::TaskStart => "task-start",
            HookEvent::TaskComplete => "task-complete",
            HookEvent::MemoryStore => "memory-store",
            HookEvent::MemoryRetrieve => "memory-retrieve",
            HookEvent::ErrorRaised => "error-raised",
        }
    }
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Execution priority for a registered hook.
///
/// Lower rank runs earlier. Priority only orders execution; it never filters
/// which hooks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HookPriority {
    Highest,
    High,
    #[default]
    Normal,
    Low,
    Lowest,
}

impl HookPriority {
    /// Numeric rank backing this level.
    pub fn rank(&self) -> u8 {
        match self {
            HookPriority::Highest => 0,
            HookPriority::High => 1,
            HookPriority::Normal => 2,
            HookPriority::Low => 3,
            HookPriority::Lowest => 4,
        }
    }
}

impl PartialOrd for HookPriority {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HookPriority {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}
