//! Strongly-typed expense identifier
//!
//! A newtype over a v4 UUID so expense ids can't be confused with any other
//! string flowing through the ledger (member names, group labels).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const DISPLAY_PREFIX: &str = "exp-";

/// Unique, immutable identifier of an expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(Uuid);

impl ExpenseId {
    /// Create a new random ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an ID from an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Check whether a user-typed identifier refers to this ID
    ///
    /// Accepts the full UUID, the short display form (`exp-1a2b3c4d`), or any
    /// leading fragment of the UUID's hyphenated text.
    pub fn matches_prefix(&self, identifier: &str) -> bool {
        let identifier = identifier.trim();
        let identifier = identifier
            .strip_prefix(DISPLAY_PREFIX)
            .unwrap_or(identifier)
            .to_ascii_lowercase();
        !identifier.is_empty() && self.0.to_string().starts_with(&identifier)
    }
}

impl Default for ExpenseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", DISPLAY_PREFIX, &self.0.to_string()[..8])
    }
}

impl FromStr for ExpenseId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix(DISPLAY_PREFIX).unwrap_or(s);
        Ok(Self(Uuid::parse_str(s)?))
    }
}
