//! Settlement planner
//!
//! Greedy debt simplification: every debtor pays creditors in registry order
//! until their debt is cleared. Balances are exact cents, so when they sum
//! to zero the result zeroes every balance. It is not guaranteed to use the
//! fewest possible payments.

use tracing::debug;

use crate::models::{BalanceSheet, Money, Settlement};

/// Plan the payments that bring every balance on the sheet to zero
///
/// Members with a zero balance take no part, but a single cent is still
/// owed and gets paid. Debtors and creditors are both visited in sheet order, so the same sheet
/// always yields the same list.
pub fn plan_settlements(sheet: &BalanceSheet) -> Vec<Settlement> {
    let mut creditors: Vec<(&str, Money)> = sheet
        .iter()
        .filter(|e| e.balance.is_positive())
        .map(|e| (e.member.as_str(), e.balance))
        .collect();

    let debtors: Vec<(&str, Money)> = sheet
        .iter()
        .filter(|e| e.balance.is_negative())
        .map(|e| (e.member.as_str(), e.balance.abs()))
        .collect();

    let mut settlements = Vec::new();

    for (debtor, debt) in debtors {
        let mut remaining = debt;

        for (creditor, credit) in creditors.iter_mut() {
            if remaining.is_zero() {
                break;
            }
            if !credit.is_positive() {
                continue;
            }

            let amount = remaining.min(*credit);
            settlements.push(Settlement::new(debtor, *creditor, amount));
            remaining -= amount;
            *credit -= amount;
        }
    }

    debug!(payments = settlements.len(), "Planned settlements");

    settlements
}

/// The balances that remain once the given payments have been made
///
/// A payment raises the payer's balance and lowers the receiver's. Names not
/// on the sheet are ignored.
pub fn apply_settlements(sheet: &BalanceSheet, settlements: &[Settlement]) -> BalanceSheet {
    let mut after = sheet.clone();

    for settlement in settlements {
        for entry in after.entries_mut() {
            if entry.member == settlement.from {
                entry.balance += settlement.amount;
            } else if entry.member == settlement.to {
                entry.balance -= settlement.amount;
            }
        }
    }

    after
}
