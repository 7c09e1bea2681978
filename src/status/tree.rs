//! Root status tree and its coarse observer registry.

use super::group::StatusGroup;
use super::registry::ObserverRegistry;
use crate::types::{ObserverCallback, ObserverEvent, ObserverId, ValueChange};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

/// Root container mapping domain name to groups, plus the tree-wide
/// observer registry.
///
/// One tree instance persists for the whole lifetime of the owning unit
/// of work (e.g. one vehicle session). Coarse observers registered here
/// fire on any update anywhere in the tree, not scoped to a group.
pub struct StatusTree {
    /// domain name -> group name -> group.
    domains: RwLock<HashMap<String, HashMap<String, Arc<StatusGroup>>>>,

    /// Tree-wide (coarse) observers.
    observers: ObserverRegistry,

    /// Handed to groups and fields for upward propagation.
    weak_self: Weak<StatusTree>,
}

impl StatusTree {
    /// Create an empty tree.
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|weak_self| Self {
            domains: RwLock::new(HashMap::new()),
            observers: ObserverRegistry::new(),
            weak_self: weak_self.clone(),
        })
    }

    /// Materialize a group under a domain, or return the existing one.
    ///
    /// Groups are created disabled and never re-created.
    pub fn insert_group(&self, domain: &str, name: &str) -> Arc<StatusGroup> {
        if let Some(existing) = self
            .domains
            .read()
            .get(domain)
            .and_then(|groups| groups.get(name))
        {
            return Arc::clone(existing);
        }

        let mut domains = self.domains.write();
        let groups = domains.entry(domain.to_string()).or_default();
        Arc::clone(groups.entry(name.to_string()).or_insert_with(|| {
            Arc::new(StatusGroup::new(name, self.weak_self.clone()))
        }))
    }

    /// Look up a group by domain and name.
    pub fn group(&self, domain: &str, name: &str) -> Option<Arc<StatusGroup>> {
        self.domains
            .read()
            .get(domain)
            .and_then(|groups| groups.get(name))
            .cloned()
    }

    /// Whether a group is present under the given domain.
    pub fn status_exists(&self, domain: &str, name: &str) -> bool {
        self.group(domain, name).is_some()
    }

    /// Names of all materialized domains.
    pub fn domain_names(&self) -> Vec<String> {
        self.domains.read().keys().cloned().collect()
    }

    /// Register a coarse observer for the given event mask.
    pub fn add_observer(&self, callback: ObserverCallback, events: ObserverEvent) -> ObserverId {
        self.observers.add(callback, events)
    }

    /// Remove a coarse observer.
    ///
    /// Callers at tree level always remove exactly the observer they
    /// added, so a `false` return indicates a logic defect upstream.
    pub fn remove_observer(&self, id: ObserverId) -> bool {
        self.observers.remove(id)
    }

    /// Number of coarse observers listening for any event in `events`.
    pub fn observer_count(&self, events: ObserverEvent) -> usize {
        self.observers.count(events)
    }

    /// Signal a completed poll/push cycle to coarse observers.
    ///
    /// Delivers the unknown-value sentinel; individual field updates have
    /// already propagated themselves.
    pub fn notify_updated(&self) {
        self.notify(ObserverEvent::UPDATED_FROM_SERVER, &ValueChange::unknown());
    }

    /// Dispatch a tree-wide event to matching coarse observers.
    pub(crate) fn notify(&self, events: ObserverEvent, change: &ValueChange) {
        self.observers.dispatch(events, change, "tree");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_insert_group_is_get_or_create() {
        let tree = StatusTree::new();

        let first = tree.insert_group("charging", "chargingStatus");
        let second = tree.insert_group("charging", "chargingStatus");
        assert!(Arc::ptr_eq(&first, &second));

        assert!(tree.status_exists("charging", "chargingStatus"));
        assert!(!tree.status_exists("charging", "plugStatus"));
        assert!(!tree.status_exists("parking", "chargingStatus"));
    }

    #[test]
    fn test_field_update_reaches_coarse_observers() {
        let tree = StatusTree::new();
        let group = tree.insert_group("charging", "chargingStatus");
        let field = group.insert_field("chargingState");

        let fired = Arc::new(AtomicUsize::new(0));
        let f = Arc::clone(&fired);
        tree.add_observer(
            Arc::new(move |_, change| {
                assert!(change.is_unknown());
                f.fetch_add(1, Ordering::SeqCst);
            }),
            ObserverEvent::UPDATED_FROM_SERVER,
        );

        field.update_from_server(json!("charging"));
        tree.notify_updated();
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_remove_observer_reports_absence() {
        let tree = StatusTree::new();
        let id = tree.add_observer(Arc::new(|_, _| {}), ObserverEvent::ALL);

        assert!(tree.remove_observer(id));
        assert!(!tree.remove_observer(id));
        assert_eq!(tree.observer_count(ObserverEvent::ALL), 0);
    }
}
