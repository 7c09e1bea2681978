//! Declarative subscription plan types.

use crate::privacy::Privacy;
use crate::types::ObserverEvent;
use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Location of a field in the status tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldPath {
    pub domain: String,
    pub group: String,
    pub field: String,
}

impl FieldPath {
    pub fn new(
        domain: impl Into<String>,
        group: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            group: group.into(),
            field: field.into(),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.domain, self.group, self.field)
    }
}

/// A field change delivered to a unit's handler.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldChange {
    /// Name of the subscription unit that declared the field.
    pub unit: String,

    /// Which field changed.
    pub path: FieldPath,

    /// Value before the update, if the field held one.
    pub previous: Option<Value>,

    /// Value after the update.
    pub current: Option<Value>,
}

/// Handler invoked when a subscribed field fires.
///
/// Cheap to clone; the same handler may back several fields. Handlers run
/// synchronously on the delivery thread, so slow work (persistence writes)
/// should be shipped elsewhere, e.g. through [`FieldHandler::channel`].
#[derive(Clone)]
pub struct FieldHandler(Arc<dyn Fn(&FieldChange) + Send + Sync>);

impl FieldHandler {
    /// Wrap a closure.
    pub fn new(handler: impl Fn(&FieldChange) + Send + Sync + 'static) -> Self {
        Self(Arc::new(handler))
    }

    /// Forward changes into a channel.
    ///
    /// Uses `try_send`: a full or disconnected receiver drops the change
    /// rather than blocking the delivery thread.
    pub fn channel(sender: Sender<FieldChange>) -> Self {
        Self::new(move |change: &FieldChange| {
            let _ = sender.try_send(change.clone());
        })
    }

    pub(crate) fn invoke(&self, change: &FieldChange) {
        (self.0)(change);
    }
}

impl fmt::Debug for FieldHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FieldHandler(..)")
    }
}

/// One field a unit subscribes to.
#[derive(Clone, Debug)]
pub struct FieldSpec {
    /// Where the field lives.
    pub path: FieldPath,

    /// Handler to attach.
    pub handler: FieldHandler,

    /// Events the handler fires on.
    pub events: ObserverEvent,

    /// Whether the field gates the unit's readiness.
    pub required: bool,

    /// Privacy flag that suppresses this handler when active.
    pub privacy: Option<Privacy>,
}

impl FieldSpec {
    /// An optional field firing on value changes.
    pub fn new(path: FieldPath, handler: FieldHandler) -> Self {
        Self {
            path,
            handler,
            events: ObserverEvent::VALUE_CHANGED,
            required: false,
            privacy: None,
        }
    }

    /// Mark the field required for the unit's readiness.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Override the event mask the handler fires on.
    pub fn events(mut self, events: ObserverEvent) -> Self {
        self.events = events;
        self
    }

    /// Suppress this handler when the given privacy flag is active.
    pub fn privacy(mut self, flag: Privacy) -> Self {
        self.privacy = Some(flag);
        self
    }
}

/// A named group of field subscriptions registered and deferred together.
#[derive(Clone, Debug)]
pub struct UnitSpec {
    /// Unit name, unique within a plan.
    pub name: String,

    /// Declared fields, in attachment order.
    pub fields: Vec<FieldSpec>,
}

impl UnitSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field declaration.
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }
}

/// The full set of units a manager registers.
#[derive(Clone, Debug, Default)]
pub struct SubscriptionPlan {
    pub units: Vec<UnitSpec>,
}

impl SubscriptionPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a unit declaration.
    pub fn unit(mut self, unit: UnitSpec) -> Self {
        self.units.push(unit);
        self
    }
}
