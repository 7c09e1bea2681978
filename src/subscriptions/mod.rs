//! Adaptive subscription management.
//!
//! A consumer declares, per logical unit, which fields of the status tree
//! it wants to observe. The manager attaches fine-grained observers
//! immediately where the sub-tree is already populated, and falls back to
//! one coarse tree-wide observer for everything else:
//! - each tree update re-checks the pending units
//! - units that became ready get their field observers attached
//! - the coarse observer is removed exactly once when nothing is pending
//!
//! Units progress independently, so a vehicle that reports charging data
//! before plug data registers the charging unit first.
//!
//! # Example
//!
//! ```ignore
//! let plan = SubscriptionPlan::new().unit(
//!     UnitSpec::new("charging")
//!         .field(FieldSpec::new(
//!             FieldPath::new("charging", "chargingStatus", "chargingState"),
//!             FieldHandler::channel(tx),
//!         ).required()),
//! );
//!
//! let manager = AdaptiveSubscriptionManager::new(tree, plan, PrivacySettings::new())?;
//! assert!(manager.is_registered("charging") || manager.watching_tree());
//! ```

mod manager;
mod plan;

pub use manager::AdaptiveSubscriptionManager;
pub use plan::{FieldChange, FieldHandler, FieldPath, FieldSpec, SubscriptionPlan, UnitSpec};
