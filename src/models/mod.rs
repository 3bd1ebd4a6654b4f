//! Core data models for SplitLedger
//!
//! This module contains the data structures of the shared-expense domain:
//! money amounts, expenses and their split rules, groups, balances and
//! settlements.

pub mod balance;
pub mod expense;
pub mod group;
pub mod ids;
pub mod money;
pub mod settlement;

pub use balance::{BalanceSheet, BalanceStatus, MemberBalance};
pub use expense::{Expense, ExpenseValidationError, NewExpense, SplitPolicy, SplitRule};
pub use group::{Group, DEFAULT_GROUP};
pub use ids::ExpenseId;
pub use money::{Money, MoneyParseError};
pub use settlement::Settlement;
