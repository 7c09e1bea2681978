//! Observer registry shared by leaf and tree dispatch.

use crate::types::{ObserverCallback, ObserverEvent, ObserverId, ValueChange};
use parking_lot::RwLock;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::error;

/// One registered observer.
struct Registered {
    id: ObserverId,
    events: ObserverEvent,
    callback: ObserverCallback,
}

/// Ordered observer registry with masked dispatch.
///
/// Dispatch iterates a snapshot taken under the read lock, so a callback
/// may add or remove observers on the same registry without deadlocking.
/// Observers added during a dispatch see only later dispatches; observers
/// removed during a dispatch may still receive the in-flight one.
pub(crate) struct ObserverRegistry {
    observers: RwLock<Vec<Registered>>,
    next_id: AtomicU64,
}

impl ObserverRegistry {
    pub(crate) fn new() -> Self {
        Self {
            observers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a callback for the given event mask.
    ///
    /// Duplicate registration of an identical callback is allowed and
    /// results in multiple invocations per event.
    pub(crate) fn add(&self, callback: ObserverCallback, events: ObserverEvent) -> ObserverId {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.observers.write().push(Registered {
            id,
            events,
            callback,
        });
        id
    }

    /// Remove a previously registered callback. Returns false if absent.
    pub(crate) fn remove(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.write();
        let before = observers.len();
        observers.retain(|o| o.id != id);
        observers.len() != before
    }

    /// Number of observers whose mask intersects `events`.
    pub(crate) fn count(&self, events: ObserverEvent) -> usize {
        self.observers
            .read()
            .iter()
            .filter(|o| o.events.intersects(events))
            .count()
    }

    /// Invoke every observer whose mask intersects `events`.
    ///
    /// A panicking callback is caught and logged; the remaining observers
    /// still run. `origin` names the dispatching node for the log line.
    pub(crate) fn dispatch(&self, events: ObserverEvent, change: &ValueChange, origin: &str) {
        let snapshot: Vec<(ObserverId, ObserverCallback)> = self
            .observers
            .read()
            .iter()
            .filter(|o| o.events.intersects(events))
            .map(|o| (o.id, Arc::clone(&o.callback)))
            .collect();

        for (id, callback) in snapshot {
            let result = panic::catch_unwind(AssertUnwindSafe(|| callback(events, change)));
            if result.is_err() {
                error!(observer = %id, %origin, ?events, "observer panicked during dispatch");
            }
        }
    }
}
