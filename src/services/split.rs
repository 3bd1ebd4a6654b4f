//! Split calculator
//!
//! Turns an expense amount and a split rule into the share each participant
//! owes, and checks who paid. Everything here is a pure function of its
//! arguments; the ledger calls it before anything is stored.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::error::{SplitError, SplitResult};
use crate::models::{Money, SplitRule};

/// Ratio weights are fixed to this many units per 1.0 before allocation
const WEIGHT_SCALE: f64 = 1_000_000.0;

/// Compute each participant's owed share of `amount`
///
/// The returned shares add up to `amount` (exactly for Equal and Ratio
/// splits, within [`Money::EPSILON`] for Custom splits). Every member named
/// by the rule must appear in `members`.
pub fn calculate_splits(
    amount: Money,
    rule: &SplitRule,
    members: &[String],
) -> SplitResult<BTreeMap<String, Money>> {
    if !amount.is_positive() {
        return Err(SplitError::InvalidSplit(format!(
            "Expense amount must be positive, got {}",
            amount
        )));
    }

    let splits = match rule {
        SplitRule::Equal { among } => equal_split(amount, among, members)?,
        SplitRule::Custom { shares } => custom_split(amount, shares, members)?,
        SplitRule::Ratio { among, weights } => ratio_split(amount, among, weights, members)?,
    };

    debug!(
        policy = %rule.policy(),
        amount = %amount,
        participants = splits.len(),
        "Calculated splits"
    );

    Ok(splits)
}

/// Check the payer amounts of an expense and return them normalized
///
/// A single payer is recorded as having paid the full amount. Several
/// payers must together have paid `amount`, within [`Money::EPSILON`].
pub fn validate_payments(
    amount: Money,
    paid_amounts: &BTreeMap<String, Money>,
    members: &[String],
) -> SplitResult<BTreeMap<String, Money>> {
    if paid_amounts.is_empty() {
        return Err(SplitError::InvalidPayment(
            "At least one payer is required".into(),
        ));
    }

    for (payer, paid) in paid_amounts {
        if !is_member(members, payer) {
            return Err(SplitError::InvalidPayment(format!(
                "Unknown payer '{}'",
                payer
            )));
        }
        if paid.is_negative() {
            return Err(SplitError::InvalidPayment(format!(
                "Payer '{}' cannot pay a negative amount ({})",
                payer, paid
            )));
        }
    }

    if paid_amounts.len() == 1 {
        return Ok(paid_amounts
            .keys()
            .map(|payer| (payer.clone(), amount))
            .collect());
    }

    let total: Money = paid_amounts.values().sum();
    if !total.approx_eq(amount) {
        return Err(SplitError::InvalidPayment(format!(
            "Paid amounts total {} but the expense amount is {}",
            total, amount
        )));
    }

    Ok(paid_amounts.clone())
}

fn equal_split(
    amount: Money,
    among: &[String],
    members: &[String],
) -> SplitResult<BTreeMap<String, Money>> {
    check_participants(among, members)?;

    let shares = amount
        .split_evenly(among.len())
        .ok_or_else(|| SplitError::InvalidSplit("Cannot split the amount evenly".into()))?;

    Ok(among.iter().cloned().zip(shares).collect())
}

fn custom_split(
    amount: Money,
    shares: &BTreeMap<String, Money>,
    members: &[String],
) -> SplitResult<BTreeMap<String, Money>> {
    if shares.is_empty() {
        return Err(SplitError::InvalidSplit(
            "Custom split needs at least one share".into(),
        ));
    }

    for (member, share) in shares {
        if !is_member(members, member) {
            return Err(SplitError::InvalidSplit(format!(
                "Unknown member '{}' in split",
                member
            )));
        }
        if share.is_negative() {
            return Err(SplitError::InvalidSplit(format!(
                "Share for '{}' cannot be negative ({})",
                member, share
            )));
        }
    }

    let total: Money = shares.values().sum();
    if !total.approx_eq(amount) {
        return Err(SplitError::InvalidSplit(format!(
            "Custom shares total {} but the expense amount is {}",
            total, amount
        )));
    }

    Ok(shares.clone())
}

fn ratio_split(
    amount: Money,
    among: &[String],
    weights: &BTreeMap<String, f64>,
    members: &[String],
) -> SplitResult<BTreeMap<String, Money>> {
    check_participants(among, members)?;

    for (member, &weight) in weights {
        if !is_member(members, member) {
            return Err(SplitError::InvalidSplit(format!(
                "Unknown member '{}' in ratio weights",
                member
            )));
        }
        if !weight.is_finite() || weight <= 0.0 {
            return Err(SplitError::InvalidSplit(format!(
                "Ratio weight for '{}' must be positive, got {}",
                member, weight
            )));
        }
    }

    // Participants without a weight sit this expense out.
    let mut included = Vec::new();
    let mut scaled = Vec::new();
    for member in among {
        if let Some(&weight) = weights.get(member) {
            let units = (weight * WEIGHT_SCALE).round();
            if units < 1.0 || units > u64::MAX as f64 {
                return Err(SplitError::InvalidSplit(format!(
                    "Ratio weight for '{}' is out of range ({})",
                    member, weight
                )));
            }
            included.push(member.clone());
            scaled.push(units as u64);
        }
    }

    if included.is_empty() {
        return Err(SplitError::InvalidSplit(
            "No participant has a ratio weight".into(),
        ));
    }

    let shares = amount
        .allocate(&scaled)
        .ok_or_else(|| SplitError::InvalidSplit("Cannot allocate the amount by ratio".into()))?;

    Ok(included.into_iter().zip(shares).collect())
}

/// Participants must be a non-empty set of registered members
fn check_participants(among: &[String], members: &[String]) -> SplitResult<()> {
    if among.is_empty() {
        return Err(SplitError::InvalidSplit(
            "Split must include at least one participant".into(),
        ));
    }

    let mut seen = HashSet::new();
    for member in among {
        if !seen.insert(member.as_str()) {
            return Err(SplitError::InvalidSplit(format!(
                "Participant '{}' is listed more than once",
                member
            )));
        }
        if !is_member(members, member) {
            return Err(SplitError::InvalidSplit(format!(
                "Unknown member '{}' in split",
                member
            )));
        }
    }

    Ok(())
}

fn is_member(members: &[String], name: &str) -> bool {
    members.iter().any(|m| m == name)
}
