//! Core types shared across the status tree and the subscription layer.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Unique identifier for an attached observer, scoped to the registry
/// (field or tree) that issued it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObserverId(pub u64);

impl fmt::Debug for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObserverId({})", self.0)
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

bitflags! {
    /// Event kinds an observer can be registered for.
    ///
    /// A dispatch carries the union of everything that happened in one
    /// update; an observer is invoked when its mask intersects that union.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ObserverEvent: u8 {
        /// The node reported a value for the first time in this epoch.
        const ENABLED = 1 << 0;
        /// The node stopped reporting values.
        const DISABLED = 1 << 1;
        /// The stored value changed.
        const VALUE_CHANGED = 1 << 2;
        /// The remote source delivered an update (changed or not).
        const UPDATED_FROM_SERVER = 1 << 3;
        /// Every event kind.
        const ALL = Self::ENABLED.bits()
            | Self::DISABLED.bits()
            | Self::VALUE_CHANGED.bits()
            | Self::UPDATED_FROM_SERVER.bits();
    }
}

/// Value transition delivered to observers.
///
/// Tree-level (coarse) dispatches carry the unknown sentinel: both sides
/// `None`, meaning "something, somewhere in the tree".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueChange {
    /// Value before the update, if the node held one.
    pub previous: Option<Value>,

    /// Value after the update.
    pub current: Option<Value>,
}

impl ValueChange {
    /// The tree-level sentinel: no value information.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// True if this change carries no value information.
    pub fn is_unknown(&self) -> bool {
        self.previous.is_none() && self.current.is_none()
    }
}

/// Callback invoked on a matching event.
///
/// Runs synchronously on whatever thread delivered the update. Must not
/// assume exclusive access to the tree; adding or removing observers from
/// inside a callback is supported.
pub type ObserverCallback = Arc<dyn Fn(ObserverEvent, &ValueChange) + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_mask_intersection() {
        let mask = ObserverEvent::VALUE_CHANGED | ObserverEvent::UPDATED_FROM_SERVER;
        assert!(mask.intersects(ObserverEvent::UPDATED_FROM_SERVER));
        assert!(!mask.intersects(ObserverEvent::ENABLED));
        assert!(ObserverEvent::ALL.contains(mask));
    }

    #[test]
    fn test_unknown_sentinel() {
        assert!(ValueChange::unknown().is_unknown());

        let change = ValueChange {
            previous: None,
            current: Some(serde_json::json!("charging")),
        };
        assert!(!change.is_unknown());
    }
}
