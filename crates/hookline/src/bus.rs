//! Post-dispatch notification channel.
//!
//! The executor is purely a publisher: after every dispatch it sends one
//! [`DispatchNotice`] and ignores the send result, so a missing subscriber
//! never slows down or fails the caller.

use tokio::sync::broadcast;

use crate::events::HookEvent;
use crate::result::AggregatedHookResult;

/// Default channel capacity when none is configured.
pub const DEFAULT_BUS_CAPACITY: usize = 64;

/// Summary of one completed dispatch.
#[derive(Debug, Clone)]
pub struct DispatchNotice {
    pub event: HookEvent,
    pub result: AggregatedHookResult,
}

/// Broadcast handle other subsystems subscribe to for dispatch summaries.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<DispatchNotice>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to dispatch notices. Receivers that fall behind the channel
    /// capacity observe a lag error, not a blocked publisher.
    pub fn subscribe(&self) -> broadcast::Receiver<DispatchNotice> {
        self.tx.subscribe()
    }

    /// Fire-and-forget publish. A send error only means nobody is
    /// subscribed right now.
    pub fn publish(&self, notice: DispatchNotice) {
        let _ = self.tx.send(notice);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}
