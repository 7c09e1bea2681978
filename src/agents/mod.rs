//! Consumers that register subscription plans against a vehicle's tree.

mod charge;

pub use charge::{ChargeAgent, ChargeEventSink, UNIT_CHARGING, UNIT_PLUG, UNIT_POSITION};
