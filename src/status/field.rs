//! Observable leaf field.

use super::registry::ObserverRegistry;
use super::tree::StatusTree;
use crate::types::{ObserverCallback, ObserverEvent, ObserverId, ValueChange};
use parking_lot::RwLock;
use std::sync::Weak;

/// Mutable part of a field: the payload and its availability flag.
struct FieldState {
    value: Option<serde_json::Value>,
    enabled: bool,
}

/// A single observable scalar field in the status tree.
///
/// Created disabled when the remote schema node is first materialized;
/// `enabled` flips true on the first server-supplied value. Observers are
/// invoked synchronously on the thread that delivered the update.
pub struct StatusField {
    /// Field name within its group.
    name: String,

    /// Current payload and availability.
    state: RwLock<FieldState>,

    /// Fine-grained observers on this field.
    observers: ObserverRegistry,

    /// Owning tree, for coarse propagation.
    tree: Weak<StatusTree>,
}

impl StatusField {
    pub(crate) fn new(name: impl Into<String>, tree: Weak<StatusTree>) -> Self {
        Self {
            name: name.into(),
            state: RwLock::new(FieldState {
                value: None,
                enabled: false,
            }),
            observers: ObserverRegistry::new(),
            tree,
        }
    }

    /// Field name within its group.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current payload, if the server ever supplied one.
    pub fn value(&self) -> Option<serde_json::Value> {
        self.state.read().value.clone()
    }

    /// True once the remote source has supplied a value for this field.
    pub fn enabled(&self) -> bool {
        self.state.read().enabled
    }

    /// Register an observer for the given event mask.
    pub fn add_observer(&self, callback: ObserverCallback, events: ObserverEvent) -> ObserverId {
        self.observers.add(callback, events)
    }

    /// Remove an observer. No-op (returns false) if it was never added.
    pub fn remove_observer(&self, id: ObserverId) -> bool {
        self.observers.remove(id)
    }

    /// Number of observers listening for any event in `events`.
    pub fn observer_count(&self, events: ObserverEvent) -> usize {
        self.observers.count(events)
    }

    /// Apply a server-supplied value.
    ///
    /// Fires one dispatch per matching observer carrying the union of what
    /// happened: `UPDATED_FROM_SERVER` always, `ENABLED` on the first
    /// delivery, `VALUE_CHANGED` when the payload differs. Afterwards the
    /// owning tree's coarse observers are notified.
    pub fn update_from_server(&self, value: serde_json::Value) {
        let (events, change) = {
            let mut state = self.state.write();
            let previous = state.value.replace(value.clone());

            let mut events = ObserverEvent::UPDATED_FROM_SERVER;
            if !state.enabled {
                state.enabled = true;
                events |= ObserverEvent::ENABLED;
            }
            if previous.as_ref() != Some(&value) {
                events |= ObserverEvent::VALUE_CHANGED;
            }

            (
                events,
                ValueChange {
                    previous,
                    current: Some(value),
                },
            )
        };

        self.observers.dispatch(events, &change, &self.name);

        if let Some(tree) = self.tree.upgrade() {
            tree.notify(ObserverEvent::UPDATED_FROM_SERVER, &ValueChange::unknown());
        }
    }

    /// Mark the field as no longer reported by the server.
    ///
    /// Keeps the last value for inspection but flips `enabled` off and
    /// fires `DISABLED`. Subscription units never revert on this; it is
    /// informational for consumers that registered for it.
    pub fn disable(&self) {
        let change = {
            let mut state = self.state.write();
            if !state.enabled {
                return;
            }
            state.enabled = false;
            ValueChange {
                previous: state.value.clone(),
                current: None,
            }
        };

        self.observers
            .dispatch(ObserverEvent::DISABLED, &change, &self.name);
    }
}
