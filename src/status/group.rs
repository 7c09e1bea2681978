//! Observable status group.

use super::field::StatusField;
use super::tree::StatusTree;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::trace;

/// A named sub-tree of fields representing one status category.
///
/// `enabled` means the group itself has been instantiated by the data
/// source; it does not imply every child field is populated. Groups are
/// never re-created: `enabled` may flip true long after the object exists.
pub struct StatusGroup {
    /// Group name within its domain.
    name: String,

    /// Whether the data source has instantiated this group.
    enabled: AtomicBool,

    /// Child fields by name.
    fields: RwLock<HashMap<String, Arc<StatusField>>>,

    /// Owning tree, handed down to child fields.
    tree: Weak<StatusTree>,
}

impl StatusGroup {
    pub(crate) fn new(name: impl Into<String>, tree: Weak<StatusTree>) -> Self {
        Self {
            name: name.into(),
            enabled: AtomicBool::new(false),
            fields: RwLock::new(HashMap::new()),
            tree,
        }
    }

    /// Group name within its domain.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the data source has instantiated this group.
    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Flip the instantiated flag. Called by the data-source layer when
    /// the remote domain introduces or populates the group.
    pub fn set_enabled(&self, enabled: bool) {
        let was = self.enabled.swap(enabled, Ordering::SeqCst);
        if was != enabled {
            trace!(group = %self.name, enabled, "group availability changed");
        }
    }

    /// Materialize a schema node, or return the existing one.
    ///
    /// Fields are created disabled and never re-created.
    pub fn insert_field(&self, name: &str) -> Arc<StatusField> {
        if let Some(existing) = self.fields.read().get(name) {
            return Arc::clone(existing);
        }

        let mut fields = self.fields.write();
        Arc::clone(
            fields
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(StatusField::new(name, self.tree.clone()))),
        )
    }

    /// Look up a child field by name.
    pub fn field(&self, name: &str) -> Option<Arc<StatusField>> {
        self.fields.read().get(name).cloned()
    }

    /// Names of all materialized child fields.
    pub fn field_names(&self) -> Vec<String> {
        self.fields.read().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_field_is_get_or_create() {
        let group = StatusGroup::new("chargingStatus", Weak::new());

        let first = group.insert_field("chargingState");
        let second = group.insert_field("chargingState");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(group.field_names().len(), 1);
    }

    #[test]
    fn test_enabled_independent_of_children() {
        let group = StatusGroup::new("plugStatus", Weak::new());
        let field = group.insert_field("plugConnectionState");

        group.set_enabled(true);
        assert!(group.enabled());
        assert!(!field.enabled());
    }
}
