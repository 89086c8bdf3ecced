//! In-process lifecycle hook engine: registration keyed by event and
//! priority, ordered dispatch with partial-failure isolation, per-hook
//! statistics, and post-dispatch notifications on a broadcast bus.

pub mod bus;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod executor;
pub mod handler;
pub mod registry;
pub mod result;

pub use bus::{DispatchNotice, EventBus, DEFAULT_BUS_CAPACITY};
pub use config::HooklineConfig;
pub use context::{
    AgentInfo, CommandInfo, ContextData, ErrorInfo, FileOperationInfo, HookContext,
    MemoryInfo, SessionInfo, TaskInfo, ToolInfo,
};
pub use error::HookError;
pub use events::{HookEvent, HookPriority};
pub use executor::{ExecuteOptions, HookExecutor, HookStats};
pub use handler::{FnHandler, HookDefinition, HookHandler, HookId};
pub use registry::{HookRegistry, RegisterOptions};
pub use result::{AggregatedHookResult, HookRecord, HookResult};

/// Initialize structured JSON logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    fmt()
        .json()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
}
