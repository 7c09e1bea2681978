//! Error types for the subscription layer.

use thiserror::Error;

/// Main error type for subscription operations.
///
/// A group or field that merely has not arrived yet is never an error;
/// deferral handles that. Variants here are configuration defects that a
/// retry cannot fix.
#[derive(Clone, Debug, Error)]
pub enum WatchError {
    #[error("subscription plan declares unit more than once: {0}")]
    DuplicateUnit(String),

    #[error("field {field} is not part of group {group}")]
    FieldNotInSchema { group: String, field: String },
}

/// Result type for subscription operations.
pub type Result<T> = std::result::Result<T, WatchError>;
