//! Expense display formatting
//!
//! Provides the expense register view and the detail view with payers and
//! shares.

use super::truncate;
use crate::models::{Expense, SplitPolicy};

/// Format a list of expenses as a register, oldest first
pub fn format_expense_list(expenses: &[&Expense], symbol: &str, date_format: &str) -> String {
    if expenses.is_empty() {
        return "No expenses found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:12}  {:10}  {:24}  {:>12}  {:14}  {}\n",
        "ID", "Date", "Description", "Amount", "Paid by", "Group"
    ));
    output.push_str(&"-".repeat(90));
    output.push('\n');

    for expense in expenses {
        let payers: Vec<&str> = expense.paid_amounts().keys().map(String::as_str).collect();

        output.push_str(&format!(
            "{:12}  {:10}  {:24}  {:>12}  {:14}  {}\n",
            expense.id().to_string(),
            expense.created_at().format(date_format).to_string(),
            truncate(expense.description(), 24),
            expense.amount().format_with_symbol(symbol),
            truncate(&payers.join(", "), 14),
            expense.group()
        ));
    }

    output
}

/// Format expense details, including who paid and who owes what
pub fn format_expense_details(expense: &Expense, symbol: &str, date_format: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Expense:     {}\n", expense.id()));
    output.push_str(&format!("Description: {}\n", expense.description()));
    output.push_str(&format!(
        "Amount:      {}\n",
        expense.amount().format_with_symbol(symbol)
    ));
    output.push_str(&format!(
        "Date:        {}\n",
        expense.created_at().format(date_format)
    ));
    output.push_str(&format!("Group:       {}\n", expense.group()));
    output.push_str(&format!("Split:       {}\n", expense.split_policy()));

    if let (SplitPolicy::Ratio, Some(weights)) = (expense.split_policy(), expense.ratio_weights())
    {
        let ratio: Vec<String> = weights
            .iter()
            .map(|(member, weight)| format!("{} {}", member, weight))
            .collect();
        output.push_str(&format!("Ratio:       {}\n", ratio.join(" : ")));
    }

    output.push_str("\nPaid by:\n");
    for (member, amount) in expense.paid_amounts() {
        output.push_str(&format!(
            "  {}: {}\n",
            member,
            amount.format_with_symbol(symbol)
        ));
    }

    output.push_str("\nShares:\n");
    for (member, amount) in expense.splits() {
        output.push_str(&format!(
            "  {}: {}\n",
            member,
            amount.format_with_symbol(symbol)
        ));
    }

    output
}
