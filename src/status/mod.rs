//! Observable status tree primitives.
//!
//! The data-source layer materializes a tree of domains, groups, and
//! fields as the remote schema arrives, then pushes values into fields as
//! polls complete:
//! - [`StatusField`]: a single scalar field holding an opaque payload and
//!   an `enabled` flag that flips on the first server-supplied value
//! - [`StatusGroup`]: a named collection of fields with its own `enabled`
//!   flag, independent of its children's
//! - [`StatusTree`]: the root domain map plus the coarse observer
//!   registry that fires on any update anywhere in the tree
//!
//! Observer dispatch is synchronous, iterates a snapshot (re-entrant
//! add/remove is safe), and isolates panicking callbacks.

mod field;
mod group;
mod registry;
mod tree;

pub use field::StatusField;
pub use group::StatusGroup;
pub use tree::StatusTree;
