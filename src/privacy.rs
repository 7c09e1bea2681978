//! Privacy flags that suppress individual observers.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// User-selected privacy restrictions.
///
/// A flag suppresses the attachment of observers tagged with it; it never
/// changes readiness computation or the registration of untagged fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Privacy {
    /// Do not observe or record vehicle positions.
    NoLocations,
}

impl fmt::Display for Privacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Privacy::NoLocations => write!(f, "no-locations"),
        }
    }
}

/// Set of active privacy restrictions.
pub type PrivacySettings = HashSet<Privacy>;
