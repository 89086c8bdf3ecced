use std::time::Duration;

use serde_json::Value;

use crate::events::HookEvent;
use crate::handler::HookId;

/// What a single handler decided.
#[derive(Debug, Clone, Default)]
pub struct HookResult {
    /// Whether the handler considers the event handled successfully.
    pub success: bool,
    /// Failure description when `success` is false.
    pub error: Option<String>,
    /// Arbitrary output for the caller or for later handlers.
    pub data: Option<Value>,
    /// Request that no further handlers run in this dispatch. Independent
    /// of `success`.
    pub stop: bool,
}

impl HookResult {
    /// Shorthand for a plain success.
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    /// Success carrying output data.
    pub fn ok_with(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            ..Default::default()
        }
    }

    /// Failure with a description.
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// Successful short-circuit: stop the dispatch after this handler.
    pub fn stop() -> Self {
        Self {
            success: true,
            stop: true,
            ..Default::default()
        }
    }

    pub fn with_stop(mut self) -> Self {
        self.stop = true;
        self
    }
}

/// One handler's attributable outcome within a dispatch.
#[derive(Debug, Clone)]
pub struct HookRecord {
    pub id: HookId,
    pub result: HookResult,
    pub duration: Duration,
}

impl HookRecord {
    pub fn duration_ms(&self) -> u64 {
        self.duration.as_millis() as u64
    }
}

/// The combined outcome of one dispatch, listing every selected handler's
/// individual result in execution order.
#[derive(Debug, Clone)]
pub struct AggregatedHookResult {
    pub event: HookEvent,
    pub results: Vec<HookRecord>,
    /// Logical AND of every collected result's `success`. True when no
    /// handlers were selected.
    pub overall_success: bool,
    /// A handler requested short-circuit (or a failure ended the dispatch
    /// under `continue_on_error: false`).
    pub stopped_early: bool,
    pub total_duration: Duration,
}

impl AggregatedHookResult {
    /// Empty result for a dispatch that selected no handlers.
    pub fn empty(event: HookEvent) -> Self {
        Self {
            event,
            results: Vec::new(),
            overall_success: true,
            stopped_early: false,
            total_duration: Duration::ZERO,
        }
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.total_duration.as_millis() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn shorthands() {
        let ok = HookResult::ok();
        assert!(ok.success && !ok.stop && ok.error.is_none());

        let fail = HookResult::fail("boom");
        assert!(!fail.success);
        assert_eq!(fail.error.as_deref(), Some("boom"));

        let stop = HookResult::stop();
        assert!(stop.success && stop.stop);

        let with_data = HookResult::ok_with(json!({"k": 1})).with_stop();
        assert!(with_data.stop);
        assert_eq!(with_data.data, Some(json!({"k": 1})));
    }

    #[test]
    fn empty_aggregate_is_successful() {
        let agg = AggregatedHookResult::empty(HookEvent::SessionStart);
        assert!(agg.overall_success);
        assert!(!agg.stopped_early);
        assert!(agg.results.is_empty());
        assert_eq!(agg.total_duration_ms(), 0);
    }
}
