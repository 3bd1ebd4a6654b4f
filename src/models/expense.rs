//! Expense model
//!
//! An expense records who paid for something and how its cost is shared.
//! Shares are computed once, when the expense is added, and stored as-is;
//! an expense is never edited afterwards. Corrections are a delete followed
//! by a new expense.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::group::DEFAULT_GROUP;
use super::ids::ExpenseId;
use super::money::Money;

/// How an expense's cost is divided among participants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SplitPolicy {
    /// Everyone owes the same share
    #[default]
    Equal,
    /// Each participant owes an explicitly entered amount
    Custom,
    /// Shares are proportional to per-member weights
    Ratio,
}

impl SplitPolicy {
    /// Parse a policy name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "equal" | "equally" => Some(Self::Equal),
            "custom" | "exact" => Some(Self::Custom),
            "ratio" | "weights" | "weighted" => Some(Self::Ratio),
            _ => None,
        }
    }
}

impl fmt::Display for SplitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal => write!(f, "Equal"),
            Self::Custom => write!(f, "Custom"),
            Self::Ratio => write!(f, "Ratio"),
        }
    }
}

/// A split policy together with its parameters, as supplied by the caller
#[derive(Debug, Clone, PartialEq)]
pub enum SplitRule {
    /// Divide evenly among the listed members
    Equal { among: Vec<String> },
    /// Use the given amount for each member
    Custom { shares: BTreeMap<String, Money> },
    /// Divide among the listed members in proportion to their weights.
    /// Listed members without a weight are left out of the split.
    Ratio {
        among: Vec<String>,
        weights: BTreeMap<String, f64>,
    },
}

impl SplitRule {
    pub fn policy(&self) -> SplitPolicy {
        match self {
            Self::Equal { .. } => SplitPolicy::Equal,
            Self::Custom { .. } => SplitPolicy::Custom,
            Self::Ratio { .. } => SplitPolicy::Ratio,
        }
    }

    /// The participant list as the caller expressed it
    pub fn participants(&self) -> Vec<String> {
        match self {
            Self::Equal { among } | Self::Ratio { among, .. } => among.clone(),
            Self::Custom { shares } => shares.keys().cloned().collect(),
        }
    }
}

/// Input for adding an expense to the ledger
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub description: String,
    pub amount: Money,
    /// Member -> amount that member paid
    pub paid_amounts: BTreeMap<String, Money>,
    pub split: SplitRule,
    pub group: String,
}

impl NewExpense {
    /// Start a new expense in the default group with no payers yet
    pub fn new(description: impl Into<String>, amount: Money, split: SplitRule) -> Self {
        Self {
            description: description.into(),
            amount,
            paid_amounts: BTreeMap::new(),
            split,
            group: DEFAULT_GROUP.to_string(),
        }
    }

    /// Record that `member` paid `amount` towards this expense
    pub fn paid_by(mut self, member: impl Into<String>, amount: Money) -> Self {
        self.paid_amounts.insert(member.into(), amount);
        self
    }

    /// Record that `member` paid the whole amount
    pub fn paid_in_full_by(self, member: impl Into<String>) -> Self {
        let amount = self.amount;
        self.paid_by(member, amount)
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }
}

/// A recorded shared expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub(crate) id: ExpenseId,

    pub(crate) description: String,

    /// Total cost
    pub(crate) amount: Money,

    /// Member -> amount that member personally paid
    pub(crate) paid_amounts: BTreeMap<String, Money>,

    pub(crate) split_policy: SplitPolicy,

    /// Participants as entered when the expense was added
    #[serde(default)]
    pub(crate) split_among: Vec<String>,

    /// Ratio weights as entered, for Ratio splits only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) ratio_weights: Option<BTreeMap<String, f64>>,

    /// Member -> owed share
    pub(crate) splits: BTreeMap<String, Money>,

    pub(crate) group: String,

    pub(crate) created_at: DateTime<Utc>,
}

impl Expense {
    /// Build an expense from validated input and computed shares
    pub(crate) fn record(
        new: NewExpense,
        paid_amounts: BTreeMap<String, Money>,
        splits: BTreeMap<String, Money>,
    ) -> Self {
        let split_among = new.split.participants();
        let split_policy = new.split.policy();
        let ratio_weights = match new.split {
            SplitRule::Ratio { weights, .. } => Some(weights),
            _ => None,
        };

        Self {
            id: ExpenseId::new(),
            description: new.description.trim().to_string(),
            amount: new.amount,
            paid_amounts,
            split_policy,
            split_among,
            ratio_weights,
            splits,
            group: new.group,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> ExpenseId {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn paid_amounts(&self) -> &BTreeMap<String, Money> {
        &self.paid_amounts
    }

    pub fn split_policy(&self) -> SplitPolicy {
        self.split_policy
    }

    pub fn split_among(&self) -> &[String] {
        &self.split_among
    }

    pub fn ratio_weights(&self) -> Option<&BTreeMap<String, f64>> {
        self.ratio_weights.as_ref()
    }

    pub fn splits(&self) -> &BTreeMap<String, Money> {
        &self.splits
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Sum of all paid amounts
    pub fn total_paid(&self) -> Money {
        self.paid_amounts.values().sum()
    }

    /// Sum of all owed shares
    pub fn total_split(&self) -> Money {
        self.splits.values().sum()
    }

    /// Whether this expense falls under a group filter (`None` = all groups)
    pub fn in_scope(&self, group_filter: Option<&str>) -> bool {
        group_filter.map_or(true, |group| self.group == group)
    }

    /// Whether a member paid for or shares in this expense
    pub fn involves(&self, member: &str) -> bool {
        self.paid_amounts.contains_key(member) || self.splits.contains_key(member)
    }

    /// Check the stored invariants of an expense
    pub fn validate(&self) -> Result<(), ExpenseValidationError> {
        if self.description.trim().is_empty() {
            return Err(ExpenseValidationError::EmptyDescription);
        }

        if !self.amount.is_positive() {
            return Err(ExpenseValidationError::NonPositiveAmount(self.amount));
        }

        if self.group.trim().is_empty() {
            return Err(ExpenseValidationError::EmptyGroup);
        }

        if self.paid_amounts.is_empty() {
            return Err(ExpenseValidationError::NoPayers);
        }

        if self.splits.is_empty() {
            return Err(ExpenseValidationError::NoShares);
        }

        let negative = self
            .paid_amounts
            .iter()
            .chain(self.splits.iter())
            .find(|(_, amount)| amount.is_negative());
        if let Some((member, amount)) = negative {
            return Err(ExpenseValidationError::NegativeAmount {
                member: member.clone(),
                amount: *amount,
            });
        }

        let paid_total = self.total_paid();
        if !paid_total.approx_eq(self.amount) {
            return Err(ExpenseValidationError::PaymentsMismatch {
                expense_amount: self.amount,
                paid_total,
            });
        }

        let splits_total = self.total_split();
        if !splits_total.approx_eq(self.amount) {
            return Err(ExpenseValidationError::SplitsMismatch {
                expense_amount: self.amount,
                splits_total,
            });
        }

        Ok(())
    }
}

impl fmt::Display for Expense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} [{}]",
            self.created_at.format("%Y-%m-%d"),
            self.description,
            self.amount,
            self.group
        )
    }
}

/// Validation errors for stored expenses
#[derive(Debug, Clone, PartialEq)]
pub enum ExpenseValidationError {
    EmptyDescription,
    EmptyGroup,
    NonPositiveAmount(Money),
    NoPayers,
    NoShares,
    NegativeAmount {
        member: String,
        amount: Money,
    },
    PaymentsMismatch {
        expense_amount: Money,
        paid_total: Money,
    },
    SplitsMismatch {
        expense_amount: Money,
        splits_total: Money,
    },
}

impl fmt::Display for ExpenseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDescription => write!(f, "Expense description cannot be empty"),
            Self::EmptyGroup => write!(f, "Expense group cannot be empty"),
            Self::NonPositiveAmount(amount) => {
                write!(f, "Expense amount must be positive, got {}", amount)
            }
            Self::NoPayers => write!(f, "Expense has no payers"),
            Self::NoShares => write!(f, "Expense has no shares"),
            Self::NegativeAmount { member, amount } => {
                write!(f, "Negative amount {} recorded for '{}'", amount, member)
            }
            Self::PaymentsMismatch {
                expense_amount,
                paid_total,
            } => write!(
                f,
                "Paid amounts ({}) do not match expense amount ({})",
                paid_total, expense_amount
            ),
            Self::SplitsMismatch {
                expense_amount,
                splits_total,
            } => write!(
                f,
                "Split totals ({}) do not match expense amount ({})",
                splits_total, expense_amount
            ),
        }
    }
}

impl std::error::Error for ExpenseValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn dinner() -> Expense {
        let new = NewExpense::new(
            "  Dinner ",
            Money::from_cents(9000),
            SplitRule::Equal {
                among: vec!["A".into(), "B".into(), "C".into()],
            },
        )
        .paid_in_full_by("A");

        let paid = new.paid_amounts.clone();
        let splits = ["A", "B", "C"]
            .iter()
            .map(|m| (m.to_string(), Money::from_cents(3000)))
            .collect();

        Expense::record(new, paid, splits)
    }

    #[test]
    fn test_record_expense() {
        let expense = dinner();
        assert_eq!(expense.description(), "Dinner");
        assert_eq!(expense.amount(), Money::from_cents(9000));
        assert_eq!(expense.split_policy(), SplitPolicy::Equal);
        assert_eq!(expense.split_among(), ["A", "B", "C"]);
        assert_eq!(expense.group(), DEFAULT_GROUP);
        assert!(expense.ratio_weights().is_none());
        assert_eq!(expense.total_paid(), expense.total_split());
        assert!(expense.validate().is_ok());
    }

    #[test]
    fn test_in_scope() {
        let expense = dinner();
        assert!(expense.in_scope(None));
        assert!(expense.in_scope(Some("General")));
        assert!(!expense.in_scope(Some("Trip")));
    }

    #[test]
    fn test_involves() {
        let expense = dinner();
        assert!(expense.involves("A"));
        assert!(expense.involves("C"));
        assert!(!expense.involves("D"));
    }

    #[test]
    fn test_split_mismatch_validation() {
        let mut expense = dinner();
        expense.splits.insert("C".into(), Money::from_cents(1000));
        assert!(matches!(
            expense.validate(),
            Err(ExpenseValidationError::SplitsMismatch { .. })
        ));
    }

    #[test]
    fn test_one_cent_drift_is_tolerated() {
        let mut expense = dinner();
        expense.splits.insert("C".into(), Money::from_cents(2999));
        assert!(expense.validate().is_ok());
    }

    #[test]
    fn test_payments_mismatch_validation() {
        let mut expense = dinner();
        expense.paid_amounts.insert("A".into(), Money::from_cents(5000));
        assert!(matches!(
            expense.validate(),
            Err(ExpenseValidationError::PaymentsMismatch { .. })
        ));
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(SplitPolicy::parse("Equal"), Some(SplitPolicy::Equal));
        assert_eq!(SplitPolicy::parse("custom"), Some(SplitPolicy::Custom));
        assert_eq!(SplitPolicy::parse("RATIO"), Some(SplitPolicy::Ratio));
        assert_eq!(SplitPolicy::parse("halves"), None);
    }

    #[test]
    fn test_serialization() {
        let expense = dinner();
        let json = serde_json::to_string(&expense).unwrap();
        assert!(json.contains("\"split_policy\":\"equal\""));
        assert!(!json.contains("ratio_weights"));

        let deserialized: Expense = serde_json::from_str(&json).unwrap();
        assert_eq!(expense, deserialized);
    }
}
