//! Dispatch context and the payload contracts supplied by host subsystems.
//!
//! The engine never interprets the payload fields; it only carries them to
//! handlers. `ContextData` is the one piece of shared mutable state in the
//! model: a scratch map scoped to a single dispatch that earlier handlers
//! write and later handlers read.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::events::HookEvent;

/// Tool invocation details, supplied by the tool engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    #[serde(default)]
    pub input: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
}

/// Command execution details, supplied by the command runner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandInfo {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

/// File operation details, supplied by the file-operation layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileOperationInfo {
    pub operation: String,
    pub path: String,
}

/// Session details, supplied by the session manager.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Agent details, supplied by the agent lifecycle manager.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentInfo {
    pub agent_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_type: Option<String>,
}

/// Task details, supplied by the task manager.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskInfo {
    pub task_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Memory operation details, supplied by the memory store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryInfo {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// Error details, supplied by the error reporter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Shared scratch map for one dispatch.
///
/// Cloning is cheap (handle clone); all clones see the same map. Accessors
/// lock internally so a guard is never held across an await point.
#[derive(Debug, Clone, Default)]
pub struct ContextData {
    inner: Arc<Mutex<Map<String, Value>>>,
}

impl ContextData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a value by key (cloned out of the map).
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.lock().expect("context data poisoned").get(key).cloned()
    }

    /// Write a value, returning the previous one if any.
    pub fn insert(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.inner
            .lock()
            .expect("context data poisoned")
            .insert(key.into(), value)
    }

    /// Remove a key, returning its value if present.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.inner.lock().expect("context data poisoned").remove(key)
    }

    /// Clone the whole map out.
    pub fn snapshot(&self) -> Map<String, Value> {
        self.inner.lock().expect("context data poisoned").clone()
    }
}

/// Context passed to every handler in one dispatch.
///
/// Exactly the payload slot matching the event's domain is populated by the
/// caller. One fresh instance per `execute` call; never shared across
/// concurrent dispatches.
#[derive(Debug, Clone)]
pub struct HookContext {
    pub event: HookEvent,
    pub timestamp: DateTime<Utc>,
    pub tool: Option<ToolInfo>,
    pub command: Option<CommandInfo>,
    pub file_operation: Option<FileOperationInfo>,
    pub session: Option<SessionInfo>,
    pub agent: Option<AgentInfo>,
    pub task: Option<TaskInfo>,
    pub memory: Option<MemoryInfo>,
    pub error: Option<ErrorInfo>,
    data: ContextData,
}

impl HookContext {
    pub fn new(event: HookEvent) -> Self {
        Self {
            event,
            timestamp: Utc::now(),
            tool: None,
            command: None,
            file_operation: None,
            session: None,
            agent: None,
            task: None,
            memory: None,
            error: None,
            data: ContextData::new(),
        }
    }

    pub fn with_tool(mut self, tool: ToolInfo) -> Self {
        self.tool = Some(tool);
        self
    }

    pub fn with_command(mut self, command: CommandInfo) -> Self {
        self.command = Some(command);
        self
    }

    pub fn with_file_operation(mut self, op: FileOperationInfo) -> Self {
        self.file_operation = Some(op);
        self
    }

    pub fn with_session(mut self, session: SessionInfo) -> Self {
        self.session = Some(session);
        self
    }

    pub fn with_agent(mut self, agent: AgentInfo) -> Self {
        self.agent = Some(agent);
        self
    }

    pub fn with_task(mut self, task: TaskInfo) -> Self {
        self.task = Some(task);
        self
    }

    pub fn with_memory(mut self, memory: MemoryInfo) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn with_error(mut self, error: ErrorInfo) -> Self {
        self.error = Some(error);
        self
    }

    /// Handle to the dispatch-scoped scratch map. Callers can keep a clone
    /// to inspect what handlers wrote after the dispatch returns.
    pub fn data(&self) -> ContextData {
        self.data.clone()
    }
}
