//! Ledger-wide CLI commands: balances, settlements, summary and clearing

use crate::config::Settings;
use crate::display::{format_balance_sheet, format_settlements, format_summary};
use crate::error::SplitResult;
use crate::services::apply_settlements;
use crate::storage::Storage;

fn scope_header(group: Option<&str>) -> String {
    match group {
        Some(group) => format!("Group: {}\n\n", group),
        None => String::new(),
    }
}

/// Print every member's net balance
pub fn handle_balances(
    storage: &Storage,
    settings: &Settings,
    group: Option<&str>,
) -> SplitResult<()> {
    let sheet = storage.read(|ledger| ledger.compute_balances(group))?;

    print!("{}", scope_header(group));
    print!("{}", format_balance_sheet(&sheet, &settings.currency_symbol));
    Ok(())
}

/// Print the payments that settle all balances
pub fn handle_settle(
    storage: &Storage,
    settings: &Settings,
    group: Option<&str>,
) -> SplitResult<()> {
    let (sheet, settlements) = storage.read(|ledger| {
        let sheet = ledger.compute_balances(group);
        let settlements = ledger.compute_settlements(group);
        (sheet, settlements)
    })?;

    let remaining = apply_settlements(&sheet, &settlements);

    print!("{}", scope_header(group));
    if settlements.is_empty() && !remaining.is_settled() {
        println!("No payments can be suggested.");
    } else {
        print!("{}", format_settlements(&settlements, &settings.currency_symbol));
    }

    // Shares of removed members, or custom splits a cent off, leave a remainder.
    if !remaining.is_settled() {
        println!(
            "\nNote: {} remains unassigned after these payments.",
            remaining.total().format_with_symbol(&settings.currency_symbol)
        );
    }

    Ok(())
}

/// Print quick statistics
pub fn handle_summary(
    storage: &Storage,
    settings: &Settings,
    group: Option<&str>,
) -> SplitResult<()> {
    let summary = storage.read(|ledger| ledger.summary(group))?;
    print!("{}", format_summary(&summary, group, &settings.currency_symbol));
    Ok(())
}

/// Delete all expenses, or everything with `all`
pub fn handle_clear(storage: &Storage, all: bool, force: bool) -> SplitResult<()> {
    if !force {
        let what = if all {
            "all members, groups and expenses"
        } else {
            "all expenses"
        };
        println!("This will permanently delete {}.", what);
        println!("Run again with --force to confirm.");
        return Ok(());
    }

    if all {
        storage.update(|ledger| ledger.clear_all())?;
        println!("Cleared all data.");
    } else {
        let count = storage.update(|ledger| ledger.clear_expenses())?;
        println!("Cleared {} expense(s).", count);
    }

    Ok(())
}
