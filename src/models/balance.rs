//! Balance model
//!
//! Net balances are derived from the expense store every time they are
//! asked for. A positive balance means the member is owed money, a negative
//! one means they owe money.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;

/// Where a member stands overall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceStatus {
    /// Is owed money
    Creditor,
    /// Owes money
    Debtor,
    /// Within one cent of zero
    Settled,
}

impl BalanceStatus {
    pub fn of(balance: Money) -> Self {
        if balance.is_negligible() {
            Self::Settled
        } else if balance.is_positive() {
            Self::Creditor
        } else {
            Self::Debtor
        }
    }
}

impl fmt::Display for BalanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Creditor => write!(f, "should receive"),
            Self::Debtor => write!(f, "owes money"),
            Self::Settled => write!(f, "all settled"),
        }
    }
}

/// One member's net balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberBalance {
    pub member: String,
    pub balance: Money,
}

impl MemberBalance {
    pub fn new(member: impl Into<String>, balance: Money) -> Self {
        Self {
            member: member.into(),
            balance,
        }
    }

    pub fn status(&self) -> BalanceStatus {
        BalanceStatus::of(self.balance)
    }
}

/// Net balance of every registered member, in registry order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BalanceSheet {
    entries: Vec<MemberBalance>,
}

impl BalanceSheet {
    pub fn new(entries: Vec<MemberBalance>) -> Self {
        Self { entries }
    }

    /// Build a sheet from `(member, balance)` pairs, keeping their order
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Money)>,
        S: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(member, balance)| MemberBalance::new(member, balance))
                .collect(),
        }
    }

    /// Balance of a single member, if they are on the sheet
    pub fn get(&self, member: &str) -> Option<Money> {
        self.entries
            .iter()
            .find(|e| e.member == member)
            .map(|e| e.balance)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MemberBalance> {
        self.entries.iter()
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [MemberBalance] {
        &mut self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all balances; zero for a closed set of expenses
    pub fn total(&self) -> Money {
        self.entries.iter().map(|e| e.balance).sum()
    }

    /// True when nobody owes or is owed more than one cent
    pub fn is_settled(&self) -> bool {
        self.entries.iter().all(|e| e.balance.is_negligible())
    }
}

impl<'a> IntoIterator for &'a BalanceSheet {
    type Item = &'a MemberBalance;
    type IntoIter = std::slice::Iter<'a, MemberBalance>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
