use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context::HookContext;
use crate::events::{HookEvent, HookPriority};
use crate::result::HookResult;

/// Identity of a registration. Generated at register time; never derived
/// from the handler itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HookId(Uuid);

impl HookId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for HookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An observer invoked when its event fires.
///
/// Returning `Err` is the failure path; the executor converts it into a
/// failed [`HookResult`] and never lets it escape the dispatch.
#[async_trait]
pub trait HookHandler: Send + Sync {
    async fn handle(&self, ctx: &HookContext) -> Result<HookResult>;
}

/// Adapter so a plain function returning a boxed future can be registered
/// as a handler without a dedicated struct.
///
/// ```
/// use anyhow::Result;
/// use futures::future::BoxFuture;
/// use hookline::{FnHandler, HookContext, HookResult};
///
/// fn log_tool(ctx: &HookContext) -> BoxFuture<'_, Result<HookResult>> {
///     Box::pin(async move {
///         let _ = ctx.tool.as_ref();
///         Ok(HookResult::ok())
///     })
/// }
///
/// let handler = FnHandler::new(log_tool);
/// ```
pub struct FnHandler<F>(F);

impl<F> FnHandler<F>
where
    F: for<'a> Fn(&'a HookContext) -> BoxFuture<'a, Result<HookResult>> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> HookHandler for FnHandler<F>
where
    F: for<'a> Fn(&'a HookContext) -> BoxFuture<'a, Result<HookResult>> + Send + Sync,
{
    async fn handle(&self, ctx: &HookContext) -> Result<HookResult> {
        (self.0)(ctx).await
    }
}

/// A registration as stored by the registry.
///
/// `seq` is a registry-global counter assigned at register time; together
/// with the priority rank it forms the total execution order (ties broken by
/// registration order).
#[derive(Clone)]
pub struct HookDefinition {
    pub id: HookId,
    pub event: HookEvent,
    pub priority: HookPriority,
    pub handler: Arc<dyn HookHandler>,
    pub enabled: bool,
    pub registered_at: DateTime<Utc>,
    pub(crate) seq: u64,
}

impl fmt::Debug for HookDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookDefinition")
            .field("id", &self.id)
            .field("event", &self.event)
            .field("priority", &self.priority)
            .field("enabled", &self.enabled)
            .field("registered_at", &self.registered_at)
            .field("seq", &self.seq)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo_event(ctx: &HookContext) -> BoxFuture<'_, Result<HookResult>> {
        Box::pin(async move {
            assert_eq!(ctx.event, HookEvent::TaskStart);
            Ok(HookResult::ok())
        })
    }

    #[tokio::test]
    async fn fn_handler_invokes_function() {
        let handler = FnHandler::new(echo_event);
        let ctx = HookContext::new(HookEvent::TaskStart);
        let result = handler.handle(&ctx).await.unwrap();
        assert!(result.success);
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(HookId::generate(), HookId::generate());
    }
}
