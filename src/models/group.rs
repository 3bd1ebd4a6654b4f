//! Group model
//!
//! A group is a label that partitions expenses into independent ledgers,
//! optionally carrying the list of members it was set up for. Groups are
//! only used to filter the expense store; they don't own anything.

use serde::{Deserialize, Serialize};

/// Label of the group that always exists and receives unlabeled expenses
pub const DEFAULT_GROUP: &str = "General";

/// A named expense group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,

    /// Members the group was created for (informational)
    #[serde(default)]
    pub members: Vec<String>,
}

impl Group {
    pub fn new(name: impl Into<String>, members: Vec<String>) -> Self {
        Self {
            name: name.into(),
            members,
        }
    }
}
