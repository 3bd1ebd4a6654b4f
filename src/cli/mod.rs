//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the ledger.

pub mod export;
pub mod expense;
pub mod group;
pub mod ledger;
pub mod member;

pub use export::{handle_export_command, handle_import_command, ExportArgs, ExportFormat};
pub use expense::{handle_expense_command, ExpenseCommands, SplitArg};
pub use group::{handle_group_command, GroupCommands};
pub use ledger::{handle_balances, handle_clear, handle_settle, handle_summary};
pub use member::{handle_member_command, MemberCommands};
