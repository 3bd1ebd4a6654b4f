//! Display formatting for terminal output
//!
//! Provides utilities for formatting ledger data for terminal display as
//! plain-text tables and detail views. Amounts are printed with the
//! configured currency symbol.

pub mod balance;
pub mod expense;
pub mod member;

pub use balance::{format_balance_sheet, format_settlements, format_summary};
pub use expense::{format_expense_details, format_expense_list};
pub use member::{format_group_list, format_member_list};

/// Truncate a string to `max_len` characters, marking the cut with "..."
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        ".".repeat(max_len)
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}
