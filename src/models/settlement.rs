//! Settlement model
//!
//! A settlement is a suggested payment from a debtor to a creditor. They are
//! derived from balances on demand and never stored.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;

/// A directed payment instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Member who pays
    pub from: String,
    /// Member who receives
    pub to: String,
    pub amount: Money,
}

impl Settlement {
    pub fn new(from: impl Into<String>, to: impl Into<String>, amount: Money) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount,
        }
    }
}

impl fmt::Display for Settlement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}: {}", self.from, self.to, self.amount)
    }
}
