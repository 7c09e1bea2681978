//! # statuswatch
//!
//! Adaptive observer registration over a telemetry status tree whose
//! fields arrive and become available at unpredictable, independent times.
//!
//! ## Core Concepts
//!
//! - **Status tree**: domains of groups of observable fields, materialized
//!   incrementally by the data-source layer
//! - **Subscription plan**: a declarative list of (group, field, handler)
//!   requests, grouped into independently progressing units
//! - **Adaptive manager**: attaches field observers immediately where the
//!   sub-tree is populated, defers the rest behind one coarse tree
//!   observer, and resolves them as data arrives
//! - **Privacy**: flags that suppress individual observers without
//!   affecting readiness
//!
//! ## Example
//!
//! ```ignore
//! use statuswatch::{ChargeAgent, PrivacySettings, StatusTree};
//!
//! let tree = StatusTree::new();
//! // ... session layer materializes groups and fields ...
//!
//! let agent = ChargeAgent::new(tree, sink, PrivacySettings::new())?;
//!
//! // Registered now, or automatically once the data arrives.
//! if agent.charging_status_registered() {
//!     println!("charging observers live");
//! }
//! ```

pub mod agents;
pub mod error;
pub mod privacy;
pub mod status;
pub mod subscriptions;
pub mod types;

// Re-exports
pub use agents::{ChargeAgent, ChargeEventSink, UNIT_CHARGING, UNIT_PLUG, UNIT_POSITION};
pub use error::{Result, WatchError};
pub use privacy::{Privacy, PrivacySettings};
pub use status::{StatusField, StatusGroup, StatusTree};
pub use subscriptions::{
    AdaptiveSubscriptionManager, FieldChange, FieldHandler, FieldPath, FieldSpec,
    SubscriptionPlan, UnitSpec,
};
pub use types::{ObserverCallback, ObserverEvent, ObserverId, ValueChange};
