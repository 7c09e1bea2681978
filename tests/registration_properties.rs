//! Property tests for the readiness/registration state machine.

use proptest::prelude::*;
use serde_json::json;
use statuswatch::{
    AdaptiveSubscriptionManager, FieldHandler, FieldPath, FieldSpec, ObserverEvent,
    PrivacySettings, StatusTree, SubscriptionPlan, UnitSpec,
};
use std::sync::Arc;

/// Availability of each node the plan references.
#[derive(Clone, Debug)]
struct Availability {
    charging_group: bool,
    captured_timestamp: bool,
    charging_state: bool,
    plug_group: bool,
    plug_connection: bool,
}

fn availability() -> impl Strategy<Value = Availability> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(charging_group, captured_timestamp, charging_state, plug_group, plug_connection)| {
            Availability {
                charging_group,
                captured_timestamp,
                charging_state,
                plug_group,
                plug_connection,
            }
        },
    )
}

fn build_tree(avail: &Availability) -> Arc<StatusTree> {
    let tree = StatusTree::new();

    let charging = tree.insert_group("charging", "chargingStatus");
    let ts = charging.insert_field("carCapturedTimestamp");
    let cs = charging.insert_field("chargingState");
    charging.set_enabled(avail.charging_group);
    if avail.captured_timestamp {
        ts.update_from_server(json!("2021-04-11T11:51:58Z"));
    }
    if avail.charging_state {
        cs.update_from_server(json!("readyForCharging"));
    }

    let plug = tree.insert_group("charging", "plugStatus");
    let pc = plug.insert_field("plugConnectionState");
    plug.set_enabled(avail.plug_group);
    if avail.plug_connection {
        pc.update_from_server(json!("connected"));
    }

    tree
}

fn two_unit_plan() -> SubscriptionPlan {
    let noop = FieldHandler::new(|_| {});
    SubscriptionPlan::new()
        .unit(
            UnitSpec::new("charging")
                .field(
                    FieldSpec::new(
                        FieldPath::new("charging", "chargingStatus", "carCapturedTimestamp"),
                        noop.clone(),
                    )
                    .required(),
                )
                .field(
                    FieldSpec::new(
                        FieldPath::new("charging", "chargingStatus", "chargingState"),
                        noop.clone(),
                    )
                    .required(),
                ),
        )
        .unit(
            UnitSpec::new("plug").field(
                FieldSpec::new(
                    FieldPath::new("charging", "plugStatus", "plugConnectionState"),
                    noop,
                )
                .required(),
            ),
        )
}

proptest! {
    /// Registration after construction is exactly the readiness
    /// condition, and the coarse observer exists iff anything is pending.
    #[test]
    fn registration_matches_readiness(avail in availability()) {
        let tree = build_tree(&avail);
        let manager = AdaptiveSubscriptionManager::new(
            Arc::clone(&tree),
            two_unit_plan(),
            PrivacySettings::new(),
        ).unwrap();

        let charging_ready =
            avail.charging_group && avail.captured_timestamp && avail.charging_state;
        let plug_ready = avail.plug_group && avail.plug_connection;

        prop_assert_eq!(manager.is_registered("charging"), charging_ready);
        prop_assert_eq!(manager.is_registered("plug"), plug_ready);

        let expected_coarse = usize::from(!(charging_ready && plug_ready));
        prop_assert_eq!(
            tree.observer_count(ObserverEvent::UPDATED_FROM_SERVER),
            expected_coarse
        );
        prop_assert_eq!(manager.watching_tree(), !(charging_ready && plug_ready));
    }

    /// Whatever the starting point, completing the tree resolves every
    /// unit and leaves no coarse observer behind.
    #[test]
    fn completion_resolves_all_units(avail in availability()) {
        let tree = build_tree(&avail);
        let manager = AdaptiveSubscriptionManager::new(
            Arc::clone(&tree),
            two_unit_plan(),
            PrivacySettings::new(),
        ).unwrap();

        let charging = tree.group("charging", "chargingStatus").unwrap();
        charging.set_enabled(true);
        charging
            .field("carCapturedTimestamp")
            .unwrap()
            .update_from_server(json!("2021-04-11T12:03:25Z"));
        charging
            .field("chargingState")
            .unwrap()
            .update_from_server(json!("charging"));

        let plug = tree.group("charging", "plugStatus").unwrap();
        plug.set_enabled(true);
        plug.field("plugConnectionState")
            .unwrap()
            .update_from_server(json!("connected"));

        tree.notify_updated();

        prop_assert!(manager.all_registered());
        prop_assert_eq!(tree.observer_count(ObserverEvent::UPDATED_FROM_SERVER), 0);
    }
}
