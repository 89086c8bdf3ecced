//! Authoritative store of hook registrations, organized by event.
//!
//! Execution order within one event is a total order: ascending priority
//! rank, ties broken by registration sequence (first registered runs first).
//! `list` returns a cloned snapshot so later mutation never affects an
//! in-flight dispatch.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;

use crate::error::HookError;
use crate::events::{HookEvent, HookPriority};
use crate::handler::{HookDefinition, HookHandler, HookId};

/// Options accepted by [`HookRegistry::register_with`].
#[derive(Debug, Clone, Default)]
pub struct RegisterOptions {
    pub priority: HookPriority,
    /// Registered-but-inactive definitions are retained and can be enabled
    /// later without losing their place in the order.
    pub disabled: bool,
    /// Caller-supplied id, for hosts that want stable identifiers for
    /// built-in hooks. Must be unique within the registry.
    pub id: Option<HookId>,
}

impl RegisterOptions {
    pub fn with_priority(priority: HookPriority) -> Self {
        Self {
            priority,
            ..Default::default()
        }
    }
}

/// Registry of hook definitions, keyed by event.
pub struct HookRegistry {
    hooks: DashMap<HookEvent, Vec<HookDefinition>>,
    next_seq: AtomicU64,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self {
            hooks: DashMap::new(),
            next_seq: AtomicU64::new(0),
        }
    }

    /// Register a handler at [`HookPriority::Normal`] with a generated id.
    pub fn register(&self, event: HookEvent, handler: Arc<dyn HookHandler>) -> HookId {
        self.register_with(event, handler, RegisterOptions::default())
            .unwrap_or_else(|_| unreachable!("generated ids cannot collide with options"))
    }

    /// Register a handler at a specific priority with a generated id.
    pub fn register_with_priority(
        &self,
        event: HookEvent,
        handler: Arc<dyn HookHandler>,
        priority: HookPriority,
    ) -> HookId {
        self.register_with(event, handler, RegisterOptions::with_priority(priority))
            .unwrap_or_else(|_| unreachable!("generated ids cannot collide with options"))
    }

    /// Register a handler with full options.
    ///
    /// Fails only when `options.id` duplicates an existing registration.
    pub fn register_with(
        &self,
        event: HookEvent,
        handler: Arc<dyn HookHandler>,
        options: RegisterOptions,
    ) -> Result<HookId, HookError> {
        let id = match options.id {
            Some(id) => {
                if self.contains(id) {
                    return Err(HookError::InvalidRegistration(format!(
                        "hook id {id} is already registered"
                    )));
                }
                id
            }
            None => HookId::generate(),
        };

        let definition = HookDefinition {
            id,
            event,
            priority: options.priority,
            handler,
            enabled: !options.disabled,
            registered_at: Utc::now(),
            seq: self.next_seq.fetch_add(1, Ordering::SeqCst),
        };

        tracing::debug!(
            hook_id = %id,
            event = %event,
            priority = ?options.priority,
            "registered hook"
        );

        self.hooks.entry(event).or_default().push(definition);
        Ok(id)
    }

    /// Remove a registration. Returns whether something was removed;
    /// idempotent, unknown ids are a no-op.
    pub fn unregister(&self, id: HookId) -> bool {
        for mut entry in self.hooks.iter_mut() {
            let before = entry.len();
            entry.retain(|d| d.id != id);
            if entry.len() < before {
                tracing::debug!(hook_id = %id, "unregistered hook");
                return true;
            }
        }
        false
    }

    /// Mark a registration active. Returns whether the id was found.
    pub fn enable(&self, id: HookId) -> bool {
        self.set_enabled(id, true)
    }

    /// Mark a registration inactive without removing it. Returns whether
    /// the id was found.
    pub fn disable(&self, id: HookId) -> bool {
        self.set_enabled(id, false)
    }

    fn set_enabled(&self, id: HookId, enabled: bool) -> bool {
        for mut entry in self.hooks.iter_mut() {
            if let Some(def) = entry.iter_mut().find(|d| d.id == id) {
                def.enabled = enabled;
                return true;
            }
        }
        false
    }

    /// Whether an id is registered (enabled or not).
    pub fn contains(&self, id: HookId) -> bool {
        self.hooks
            .iter()
            .any(|entry| entry.iter().any(|d| d.id == id))
    }

    /// Snapshot of definitions for one event (or all), sorted by
    /// (priority rank, registration sequence).
    pub fn list(&self, event: Option<HookEvent>) -> Vec<HookDefinition> {
        let mut defs: Vec<HookDefinition> = match event {
            Some(event) => self
                .hooks
                .get(&event)
                .map(|entry| entry.clone())
                .unwrap_or_default(),
            None => self
                .hooks
                .iter()
                .flat_map(|entry| entry.value().clone())
                .collect(),
        };
        defs.sort_by_key(|d| (d.priority.rank(), d.seq));
        defs
    }

    /// Number of registrations for one event.
    pub fn count(&self, event: HookEvent) -> usize {
        self.hooks.get(&event).map_or(0, |entry| entry.len())
    }

    /// Total number of registrations.
    pub fn len(&self) -> usize {
        self.hooks.iter().map(|entry| entry.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}
