//! Reader for legacy float-based exports
//!
//! Older exports store amounts as decimal floats, have no schema version and
//! may omit the split policy. They are converted to the native snapshot:
//! amounts are checked against the total with a tolerance of one cent,
//! rounded to cents, and any rounding leftover is folded into the largest
//! entry so stored totals match exactly.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;
use uuid::Uuid;

use crate::error::{SplitError, SplitResult};
use crate::models::{Expense, ExpenseId, Money, SplitPolicy, DEFAULT_GROUP};

use super::json::{LedgerSnapshot, SNAPSHOT_SCHEMA_VERSION};

/// Date format used by legacy exports
pub const LEGACY_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Largest decimal discrepancy accepted between parts and their total
const DECIMAL_TOLERANCE: f64 = 0.01 + 1e-9;

/// A legacy export document
#[derive(Debug, Clone, Deserialize)]
pub struct LegacySnapshot {
    pub expenses: Vec<LegacyExpense>,

    #[serde(default)]
    pub groups: BTreeMap<String, Vec<String>>,

    pub members: Vec<String>,

    #[serde(default)]
    pub export_date: Option<String>,
}

/// A legacy expense record
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyExpense {
    pub id: String,
    pub description: String,
    pub amount: f64,

    #[serde(default)]
    pub paid_by: Vec<String>,

    #[serde(default)]
    pub paid_amounts: BTreeMap<String, f64>,

    #[serde(default)]
    pub split_among: Vec<String>,

    #[serde(default)]
    pub split_type: Option<String>,

    pub splits: BTreeMap<String, f64>,

    #[serde(default)]
    pub ratio_splits: Option<BTreeMap<String, f64>>,

    #[serde(default)]
    pub date: Option<String>,

    #[serde(default)]
    pub group: Option<String>,
}

impl LegacySnapshot {
    /// Convert to a native snapshot at the current schema version
    pub fn into_snapshot(self) -> SplitResult<LedgerSnapshot> {
        let exported_at = match self.export_date.as_deref() {
            Some(date) => parse_date(date)?,
            None => Utc::now(),
        };

        let expenses = self
            .expenses
            .into_iter()
            .map(LegacyExpense::into_expense)
            .collect::<SplitResult<Vec<_>>>()?;

        debug!(count = expenses.len(), "Converted legacy expenses");

        Ok(LedgerSnapshot {
            schema_version: SNAPSHOT_SCHEMA_VERSION.to_string(),
            exported_at,
            app_version: String::new(),
            expenses,
            groups: self.groups,
            members: self.members,
        })
    }
}

impl LegacyExpense {
    /// Convert to a stored expense, fixing amounts to exact cents
    pub fn into_expense(self) -> SplitResult<Expense> {
        let id = Uuid::parse_str(self.id.trim())
            .map(ExpenseId::from_uuid)
            .map_err(|e| SplitError::Format(format!("Expense id '{}': {}", self.id, e)))?;
        let context = |msg: String| SplitError::Format(format!("Expense {}: {}", id, msg));

        let amount = Money::from_decimal(self.amount)
            .ok_or_else(|| context(format!("invalid amount {}", self.amount)))?;

        let mut paid = self.paid_amounts;
        if paid.is_empty() {
            // Legacy single-payer records may carry only the payer's name
            if let [payer] = self.paid_by.as_slice() {
                paid.insert(payer.clone(), self.amount);
            }
        }
        let paid_amounts = to_exact_cents(&paid, self.amount, amount)
            .map_err(|m| context(format!("paid amounts {}", m)))?;
        let splits = to_exact_cents(&self.splits, self.amount, amount)
            .map_err(|m| context(format!("splits {}", m)))?;

        let split_policy = match self.split_type.as_deref() {
            Some(name) => SplitPolicy::parse(name)
                .ok_or_else(|| context(format!("unknown split type '{}'", name)))?,
            None => infer_policy(&splits, self.ratio_splits.is_some()),
        };

        let ratio_weights = match split_policy {
            SplitPolicy::Ratio => self.ratio_splits,
            _ => None,
        };

        let split_among = if self.split_among.is_empty() {
            splits.keys().cloned().collect()
        } else {
            self.split_among
        };

        let group = match self.group.as_deref().map(str::trim) {
            Some(group) if !group.is_empty() => group.to_string(),
            _ => DEFAULT_GROUP.to_string(),
        };

        let created_at = match self.date.as_deref() {
            Some(date) => parse_date(date)?,
            None => Utc::now(),
        };

        Ok(Expense {
            id,
            description: self.description,
            amount,
            paid_amounts,
            split_policy,
            split_among,
            ratio_weights,
            splits,
            group,
            created_at,
        })
    }
}

/// Round decimal parts to cents so they add up to exactly `total`
///
/// The parts must already agree with `decimal_total` within one cent.
/// The rounding leftover goes to the largest part (first one on ties).
fn to_exact_cents(
    parts: &BTreeMap<String, f64>,
    decimal_total: f64,
    total: Money,
) -> Result<BTreeMap<String, Money>, String> {
    if parts.is_empty() {
        return Err("are empty".into());
    }

    let decimal_sum: f64 = parts.values().sum();
    if (decimal_sum - decimal_total).abs() > DECIMAL_TOLERANCE {
        return Err(format!(
            "add up to {:.2}, expected {:.2}",
            decimal_sum, decimal_total
        ));
    }

    let mut rounded = BTreeMap::new();
    for (member, value) in parts {
        let cents = Money::from_decimal(*value)
            .ok_or_else(|| format!("contain an invalid amount for '{}'", member))?;
        rounded.insert(member.clone(), cents);
    }

    let leftover = total - rounded.values().sum::<Money>();
    if !leftover.is_zero() {
        let largest = parts
            .iter()
            .fold(None::<(&String, f64)>, |best, (member, value)| match best {
                Some((_, top)) if top >= *value => best,
                _ => Some((member, *value)),
            })
            .map(|(member, _)| member.clone());
        if let Some(member) = largest {
            if let Some(share) = rounded.get_mut(&member) {
                *share += leftover;
            }
        }
    }

    Ok(rounded)
}

/// Guess the split policy of a record that didn't store one
fn infer_policy(splits: &BTreeMap<String, Money>, has_ratios: bool) -> SplitPolicy {
    if has_ratios {
        return SplitPolicy::Ratio;
    }

    let min = splits.values().min();
    let max = splits.values().max();
    match (min, max) {
        (Some(min), Some(max)) if (*max - *min) <= Money::EPSILON => SplitPolicy::Equal,
        _ => SplitPolicy::Custom,
    }
}

fn parse_date(date: &str) -> SplitResult<DateTime<Utc>> {
    let date = date.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(date) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(date, LEGACY_DATE_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| SplitError::Format(format!("Invalid date '{}': {}", date, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::json::parse_snapshot;
    use crate::ledger::Ledger;

    const LEGACY_EXPORT: &str = r#"{
      "expenses": [
        {
          "id": "0b5e8a52-3f0e-4d4c-9a51-1c1a6f0f6a11",
          "description": "Dinner",
          "amount": 100.0,
          "paid_by": ["A"],
          "paid_amounts": {"A": 100.0},
          "split_among": ["A", "B", "C"],
          "splits": {"A": 33.333333333333336, "B": 33.333333333333336, "C": 33.333333333333336},
          "date": "2024-03-01 19:30:00",
          "group": "General"
        },
        {
          "id": "7f3d2c10-91b4-4b7e-8a0e-5d2f9c7e1b22",
          "description": "Groceries",
          "amount": 50.0,
          "paid_by": ["B"],
          "paid_amounts": {"B": 50.0},
          "split_among": ["A", "B"],
          "splits": {"A": 20.0, "B": 30.0},
          "ratio_splits": {"A": 2.0, "B": 3.0},
          "date": "2024-03-02 10:00:00",
          "group": "Trip"
        }
      ],
      "groups": {"Trip": ["A", "B"]},
      "members": ["A", "B", "C"],
      "export_date": "2024-03-03 12:00:00"
    }"#;

    #[test]
    fn test_legacy_import() {
        let snapshot = parse_snapshot(LEGACY_EXPORT).unwrap();
        assert_eq!(snapshot.schema_version, SNAPSHOT_SCHEMA_VERSION);
        assert_eq!(snapshot.expenses.len(), 2);

        let dinner = &snapshot.expenses[0];
        assert_eq!(dinner.amount(), Money::from_cents(10000));
        assert_eq!(dinner.split_policy(), SplitPolicy::Equal);
        assert_eq!(dinner.total_split(), Money::from_cents(10000));
        assert_eq!(dinner.splits()["A"], Money::from_cents(3334));
        assert_eq!(dinner.splits()["B"], Money::from_cents(3333));
        assert_eq!(
            dinner.created_at().format(LEGACY_DATE_FORMAT).to_string(),
            "2024-03-01 19:30:00"
        );

        let groceries = &snapshot.expenses[1];
        assert_eq!(groceries.split_policy(), SplitPolicy::Ratio);
        assert_eq!(groceries.ratio_weights().unwrap()["B"], 3.0);
        assert_eq!(groceries.group(), "Trip");
    }

    #[test]
    fn test_legacy_balances_match_decimal_ones() {
        let snapshot = parse_snapshot(LEGACY_EXPORT).unwrap();
        let ledger = Ledger::from_snapshot(snapshot).unwrap();

        let balances = ledger.compute_balances(None);
        // A: paid 100, owes 33.34 + 20 ; B: paid 50, owes 33.33 + 30 ; C owes 33.33
        assert_eq!(balances.get("A"), Some(Money::from_cents(4666)));
        assert_eq!(balances.get("B"), Some(Money::from_cents(-1333)));
        assert_eq!(balances.get("C"), Some(Money::from_cents(-3333)));
        assert!(balances.total().is_zero());
    }

    #[test]
    fn test_single_payer_without_amounts() {
        let expense: LegacyExpense = serde_json::from_str(
            r#"{
                "id": "0b5e8a52-3f0e-4d4c-9a51-1c1a6f0f6a11",
                "description": "Taxi",
                "amount": 12.5,
                "paid_by": ["C"],
                "splits": {"A": 6.25, "C": 6.25}
            }"#,
        )
        .unwrap();

        let expense = expense.into_expense().unwrap();
        assert_eq!(expense.paid_amounts()["C"], Money::from_cents(1250));
        assert_eq!(expense.group(), DEFAULT_GROUP);
        assert_eq!(expense.split_among(), ["A", "C"]);
    }

    #[test]
    fn test_custom_policy_inferred() {
        let expense: LegacyExpense = serde_json::from_str(
            r#"{
                "id": "0b5e8a52-3f0e-4d4c-9a51-1c1a6f0f6a11",
                "description": "Taxi",
                "amount": 30.0,
                "paid_amounts": {"A": 30.0},
                "splits": {"A": 10.0, "B": 20.0}
            }"#,
        )
        .unwrap();
        assert_eq!(expense.into_expense().unwrap().split_policy(), SplitPolicy::Custom);
    }

    #[test]
    fn test_mismatched_splits_rejected() {
        let expense: LegacyExpense = serde_json::from_str(
            r#"{
                "id": "0b5e8a52-3f0e-4d4c-9a51-1c1a6f0f6a11",
                "description": "Taxi",
                "amount": 30.0,
                "paid_amounts": {"A": 30.0},
                "splits": {"A": 10.0, "B": 10.0}
            }"#,
        )
        .unwrap();
        assert!(matches!(expense.into_expense(), Err(SplitError::Format(_))));
    }

    #[test]
    fn test_bad_id_rejected() {
        let expense: LegacyExpense = serde_json::from_str(
            r#"{"id": "abc", "description": "X", "amount": 1.0,
                "paid_amounts": {"A": 1.0}, "splits": {"A": 1.0}}"#,
        )
        .unwrap();
        assert!(expense.into_expense().is_err());
    }

    #[test]
    fn test_to_exact_cents_folds_leftover_into_largest() {
        let parts = BTreeMap::from([
            ("A".to_string(), 0.333),
            ("B".to_string(), 0.333),
            ("C".to_string(), 0.334),
        ]);
        let rounded = to_exact_cents(&parts, 1.0, Money::from_cents(100)).unwrap();
        assert_eq!(rounded["A"], Money::from_cents(33));
        assert_eq!(rounded["B"], Money::from_cents(33));
        assert_eq!(rounded["C"], Money::from_cents(34));

        let parts = BTreeMap::from([("A".to_string(), 0.005), ("B".to_string(), 0.005)]);
        let rounded = to_exact_cents(&parts, 0.01, Money::from_cents(1)).unwrap();
        assert_eq!(rounded.values().sum::<Money>(), Money::from_cents(1));
    }
}
