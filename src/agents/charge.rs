//! Charge tracking agent: the canonical subscription plan.

use crate::error::Result;
use crate::privacy::{Privacy, PrivacySettings};
use crate::status::StatusTree;
use crate::subscriptions::{
    AdaptiveSubscriptionManager, FieldChange, FieldHandler, FieldPath, FieldSpec,
    SubscriptionPlan, UnitSpec,
};
use std::sync::Arc;

/// Unit observing the charging status group.
pub const UNIT_CHARGING: &str = "charging";
/// Unit observing the plug status group.
pub const UNIT_PLUG: &str = "plug";
/// Unit observing the parking position group.
pub const UNIT_POSITION: &str = "position";

/// Receiver for observed field changes.
///
/// Implemented by the persistence layer; runs on the delivery thread, so
/// slow work belongs on the implementor's side of a channel.
pub trait ChargeEventSink: Send + Sync {
    fn on_change(&self, change: &FieldChange);
}

impl<F> ChargeEventSink for F
where
    F: Fn(&FieldChange) + Send + Sync,
{
    fn on_change(&self, change: &FieldChange) {
        self(change)
    }
}

/// Tracks charging activity for one vehicle.
///
/// Wraps an [`AdaptiveSubscriptionManager`] over the charging, plug, and
/// position groups. Charging and plug each gate on their required fields;
/// position has none and registers as soon as its group is instantiated.
/// Position observers honor [`Privacy::NoLocations`].
pub struct ChargeAgent {
    manager: AdaptiveSubscriptionManager,
}

impl ChargeAgent {
    /// Build the plan and run the initial registration pass against the
    /// vehicle's status tree.
    pub fn new(
        tree: Arc<StatusTree>,
        sink: Arc<dyn ChargeEventSink>,
        privacy: PrivacySettings,
    ) -> Result<Self> {
        let manager = AdaptiveSubscriptionManager::new(tree, Self::plan(sink), privacy)?;
        Ok(Self { manager })
    }

    /// The declarative plan the agent registers.
    fn plan(sink: Arc<dyn ChargeEventSink>) -> SubscriptionPlan {
        let handler = {
            let sink = Arc::clone(&sink);
            FieldHandler::new(move |change| sink.on_change(change))
        };
        let field = |group: &str, name: &str| {
            FieldSpec::new(FieldPath::new("charging", group, name), handler.clone())
        };
        let position = |name: &str| {
            FieldSpec::new(
                FieldPath::new("parking", "parkingPosition", name),
                handler.clone(),
            )
        };

        SubscriptionPlan::new()
            .unit(
                UnitSpec::new(UNIT_CHARGING)
                    .field(field("chargingStatus", "carCapturedTimestamp").required())
                    .field(field("chargingStatus", "chargingState").required())
                    .field(field("chargingStatus", "chargePower_kW"))
                    .field(field("chargingStatus", "chargeRate_kmph")),
            )
            .unit(
                UnitSpec::new(UNIT_PLUG)
                    .field(field("plugStatus", "plugConnectionState").required())
                    .field(field("plugStatus", "plugLockState")),
            )
            .unit(
                UnitSpec::new(UNIT_POSITION)
                    .field(position("latitude").privacy(Privacy::NoLocations))
                    .field(position("longitude").privacy(Privacy::NoLocations))
                    .field(position("carCapturedTimestamp")),
            )
    }

    /// Whether the charging status observers are attached.
    pub fn charging_status_registered(&self) -> bool {
        self.manager.is_registered(UNIT_CHARGING)
    }

    /// Whether the plug status observers are attached.
    pub fn plug_status_registered(&self) -> bool {
        self.manager.is_registered(UNIT_PLUG)
    }

    /// Whether the parking position observers are attached.
    pub fn position_registered(&self) -> bool {
        self.manager.is_registered(UNIT_POSITION)
    }

    /// The underlying manager, for diagnostics.
    pub fn manager(&self) -> &AdaptiveSubscriptionManager {
        &self.manager
    }

    /// Detach every observer the agent attached.
    pub fn shutdown(&self) {
        self.manager.shutdown();
    }
}
