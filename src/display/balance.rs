//! Balance and settlement display formatting

use crate::ledger::LedgerSummary;
use crate::models::{BalanceSheet, Settlement};

/// Format net balances as a table, in registry order
pub fn format_balance_sheet(sheet: &BalanceSheet, symbol: &str) -> String {
    if sheet.is_empty() {
        return "No members yet.\n".to_string();
    }

    let name_width = sheet
        .iter()
        .map(|e| e.member.chars().count())
        .max()
        .unwrap_or(6)
        .max(6);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:>12}  {}\n",
        "Member",
        "Balance",
        "Status",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:->12}  {:-<14}\n",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for entry in sheet {
        output.push_str(&format!(
            "{:<name_width$}  {:>12}  {}\n",
            entry.member,
            entry.balance.format_with_symbol(symbol),
            entry.status(),
            name_width = name_width,
        ));
    }

    output
}

/// Format suggested payments, one per line
pub fn format_settlements(settlements: &[Settlement], symbol: &str) -> String {
    if settlements.is_empty() {
        return "All settled up! No payments needed.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!("Suggested payments ({}):\n", settlements.len()));

    for (i, s) in settlements.iter().enumerate() {
        output.push_str(&format!(
            "  {}. {} pays {} {}\n",
            i + 1,
            s.from,
            s.to,
            s.amount.format_with_symbol(symbol)
        ));
    }

    output
}

/// Format quick statistics for the expenses in scope
pub fn format_summary(summary: &LedgerSummary, group_filter: Option<&str>, symbol: &str) -> String {
    let mut output = String::new();

    if let Some(group) = group_filter {
        output.push_str(&format!("Group:          {}\n", group));
    }
    output.push_str(&format!(
        "Total expenses: {}\n",
        summary.total_amount.format_with_symbol(symbol)
    ));
    output.push_str(&format!("Expense count:  {}\n", summary.expense_count));
    output.push_str(&format!("Members:        {}\n", summary.member_count));
    output.push_str(&format!("Groups:         {}\n", summary.group_count));

    output
}
