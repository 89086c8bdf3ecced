//! Dispatch engine: selects the enabled handlers for a fired event, runs
//! them under the configured ordering policy, aggregates their outcomes,
//! keeps per-hook statistics, and publishes a post-dispatch notice.
//!
//! Every handler invocation runs in a spawned task, so a panicking handler
//! is contained the same way as one returning an error. Timeouts are
//! advisory: an expired task keeps running detached and its eventual result
//! is discarded.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::task::JoinError;

use crate::bus::{DispatchNotice, EventBus};
use crate::config::HooklineConfig;
use crate::context::HookContext;
use crate::events::HookEvent;
use crate::handler::{HookDefinition, HookId};
use crate::registry::HookRegistry;
use crate::result::{AggregatedHookResult, HookRecord, HookResult};

/// Per-dispatch execution options.
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Run handlers sharing a priority rank concurrently, with a barrier
    /// between ranks. Sequential (false) is the default because later
    /// handlers may depend on context data written by earlier ones.
    pub parallel: bool,
    /// When false, a failing handler ends the dispatch like `stop: true`.
    pub continue_on_error: bool,
    /// Per-handler deadline. Falls back to the configured default when
    /// unset.
    pub timeout: Option<Duration>,
    /// Restrict the dispatch to this subset of registrations.
    pub only_ids: Option<HashSet<HookId>>,
}

impl ExecuteOptions {
    /// Sequential dispatch; errors are contained but do not short-circuit.
    pub fn new() -> Self {
        Self {
            parallel: false,
            continue_on_error: true,
            timeout: None,
            only_ids: None,
        }
    }

    pub fn parallel(mut self) -> Self {
        self.parallel = true;
        self
    }

    pub fn stop_on_error(mut self) -> Self {
        self.continue_on_error = false;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_only_ids(mut self, ids: impl IntoIterator<Item = HookId>) -> Self {
        self.only_ids = Some(ids.into_iter().collect());
        self
    }
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-hook counters, keyed by registration id. Kept for the lifetime of
/// the executor; surviving unregistration is intentional.
#[derive(Debug, Clone, Default)]
pub struct HookStats {
    pub invocations: u64,
    pub successes: u64,
    pub failures: u64,
    pub total_duration: Duration,
    pub last_run: Option<DateTime<Utc>>,
}

impl HookStats {
    pub fn average_duration(&self) -> Duration {
        if self.invocations == 0 {
            Duration::ZERO
        } else {
            self.total_duration / self.invocations as u32
        }
    }

    fn record(&mut self, success: bool, duration: Duration) {
        self.invocations += 1;
        if success {
            self.successes += 1;
        } else {
            self.failures += 1;
        }
        self.total_duration += duration;
        self.last_run = Some(Utc::now());
    }
}

/// Runs the handlers applicable to a fired event and produces one
/// aggregated, attributable result.
pub struct HookExecutor {
    registry: Arc<HookRegistry>,
    bus: EventBus,
    stats: DashMap<HookId, HookStats>,
    config: HooklineConfig,
}

impl HookExecutor {
    pub fn new(registry: Arc<HookRegistry>, bus: EventBus) -> Self {
        Self::with_config(registry, bus, HooklineConfig::default())
    }

    pub fn with_config(
        registry: Arc<HookRegistry>,
        bus: EventBus,
        config: HooklineConfig,
    ) -> Self {
        Self {
            registry,
            bus,
            stats: DashMap::new(),
            config,
        }
    }

    /// The bus this executor publishes dispatch notices on.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Options seeded from the executor's configuration.
    pub fn default_options(&self) -> ExecuteOptions {
        ExecuteOptions {
            parallel: self.config.parallel,
            continue_on_error: self.config.continue_on_error,
            timeout: None,
            only_ids: None,
        }
    }

    /// Dispatch `event` to every enabled matching handler with the
    /// configured defaults.
    pub async fn execute(&self, event: HookEvent, context: HookContext) -> AggregatedHookResult {
        self.execute_with(event, context, self.default_options()).await
    }

    /// Dispatch `event` with explicit options.
    ///
    /// Handler misbehavior never escapes this call: failures, timeouts and
    /// panics all surface as failed entries in the returned result.
    pub async fn execute_with(
        &self,
        event: HookEvent,
        context: HookContext,
        options: ExecuteOptions,
    ) -> AggregatedHookResult {
        let started = Instant::now();
        let timeout = options.timeout.or(self.config.default_timeout());

        let selected: Vec<HookDefinition> = self
            .registry
            .list(Some(event))
            .into_iter()
            .filter(|d| d.enabled)
            .filter(|d| {
                options
                    .only_ids
                    .as_ref()
                    .map_or(true, |ids| ids.contains(&d.id))
            })
            .collect();

        tracing::debug!(
            event = %event,
            selected = selected.len(),
            parallel = options.parallel,
            "dispatching hooks"
        );

        let ctx = Arc::new(context);
        let mut records: Vec<HookRecord> = Vec::with_capacity(selected.len());
        let mut stopped_early = false;

        if options.parallel {
            // One rank group at a time; a group that requests a stop still
            // finishes, but no later group starts.
            for group in rank_groups(&selected) {
                let invocations = group
                    .iter()
                    .map(|def| self.invoke(def, Arc::clone(&ctx), timeout));
                let group_records = futures::future::join_all(invocations).await;

                let mut halt = false;
                for record in group_records {
                    if record.result.stop
                        || (!options.continue_on_error && !record.result.success)
                    {
                        halt = true;
                    }
                    records.push(record);
                }
                if halt {
                    stopped_early = true;
                    break;
                }
            }
        } else {
            for def in &selected {
                let record = self.invoke(def, Arc::clone(&ctx), timeout).await;
                let halt = record.result.stop
                    || (!options.continue_on_error && !record.result.success);
                records.push(record);
                if halt {
                    stopped_early = true;
                    break;
                }
            }
        }

        let overall_success = records.iter().all(|r| r.result.success);
        let aggregated = AggregatedHookResult {
            event,
            results: records,
            overall_success,
            stopped_early,
            total_duration: started.elapsed(),
        };

        tracing::debug!(
            event = %event,
            handlers = aggregated.results.len(),
            overall_success = aggregated.overall_success,
            stopped_early = aggregated.stopped_early,
            total_ms = aggregated.total_duration_ms(),
            "dispatch complete"
        );

        self.bus.publish(DispatchNotice {
            event,
            result: aggregated.clone(),
        });

        aggregated
    }

    /// Counters for one registration, if it has ever been invoked.
    pub fn stats(&self, id: HookId) -> Option<HookStats> {
        self.stats.get(&id).map(|entry| entry.clone())
    }

    /// Counters for every registration invoked so far.
    pub fn all_stats(&self) -> Vec<(HookId, HookStats)> {
        self.stats
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }

    pub fn reset_stats(&self) {
        self.stats.clear();
    }

    async fn invoke(
        &self,
        def: &HookDefinition,
        ctx: Arc<HookContext>,
        timeout: Option<Duration>,
    ) -> HookRecord {
        let started = Instant::now();
        let handler = Arc::clone(&def.handler);
        let task = tokio::spawn(async move { handler.handle(&ctx).await });

        let result = match timeout {
            Some(limit) => match tokio::time::timeout(limit, task).await {
                Ok(joined) => conclude(def.id, joined),
                Err(_) => {
                    // The task keeps running detached; whatever it
                    // eventually returns is discarded.
                    tracing::warn!(
                        hook_id = %def.id,
                        event = %def.event,
                        timeout_ms = limit.as_millis() as u64,
                        "hook timed out"
                    );
                    HookResult::fail(format!(
                        "handler timed out after {}ms",
                        limit.as_millis()
                    ))
                }
            },
            None => conclude(def.id, task.await),
        };

        let duration = started.elapsed();
        self.stats
            .entry(def.id)
            .or_default()
            .record(result.success, duration);

        HookRecord {
            id: def.id,
            result,
            duration,
        }
    }
}

/// Convert a joined handler task into a `HookResult`, containing errors and
/// panics as failed results.
fn conclude(
    id: HookId,
    joined: Result<anyhow::Result<HookResult>, JoinError>,
) -> HookResult {
    match joined {
        Ok(Ok(result)) => result,
        Ok(Err(err)) => {
            tracing::warn!(hook_id = %id, error = %err, "hook failed");
            HookResult::fail(err.to_string())
        }
        Err(join_err) if join_err.is_panic() => {
            tracing::warn!(hook_id = %id, "hook panicked");
            HookResult::fail("handler panicked")
        }
        Err(_) => HookResult::fail("handler task was cancelled"),
    }
}

/// Split a (rank, seq)-sorted slice into consecutive same-rank groups.
fn rank_groups(defs: &[HookDefinition]) -> Vec<&[HookDefinition]> {
    let mut groups = Vec::new();
    let mut start = 0;
    for i in 1..=defs.len() {
        if i == defs.len() || defs[i].priority.rank() != defs[start].priority.rank() {
            groups.push(&defs[start..i]);
            start = i;
        }
    }
    groups
}
