//! Balance aggregator
//!
//! Reduces the expense store to one net balance per registered member:
//! what they paid minus what they owe, over the expenses in scope.

use std::collections::HashMap;

use tracing::debug;

use crate::models::{BalanceSheet, Expense, MemberBalance, Money};

/// Compute the net balance of every member over the expenses in scope
///
/// `group_filter` of `None` covers all groups. Every member appears on the
/// returned sheet, in registry order, even with no activity. Names that are
/// no longer registered (removed members) are ignored, so their share of
/// old expenses drops out of the result.
pub fn compute_balances(
    members: &[String],
    expenses: &[Expense],
    group_filter: Option<&str>,
) -> BalanceSheet {
    let mut balances: Vec<Money> = vec![Money::zero(); members.len()];
    let index: HashMap<&str, usize> = members
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();

    let mut in_scope = 0usize;
    for expense in expenses.iter().filter(|e| e.in_scope(group_filter)) {
        in_scope += 1;

        for (payer, paid) in expense.paid_amounts() {
            if let Some(&i) = index.get(payer.as_str()) {
                balances[i] += *paid;
            }
        }

        for (member, share) in expense.splits() {
            if let Some(&i) = index.get(member.as_str()) {
                balances[i] -= *share;
            }
        }
    }

    debug!(
        members = members.len(),
        expenses = in_scope,
        group = group_filter.unwrap_or("all"),
        "Computed balances"
    );

    BalanceSheet::new(
        members
            .iter()
            .zip(balances)
            .map(|(member, balance)| MemberBalance::new(member.clone(), balance))
            .collect(),
    )
}
