//! Service layer for SplitLedger
//!
//! The ledger algorithms live here as pure functions over model types:
//! computing shares, aggregating balances and planning settlements. The
//! [`Ledger`](crate::ledger::Ledger) wires them to its own state.

pub mod balance;
pub mod settlement;
pub mod split;

pub use balance::compute_balances;
pub use settlement::{apply_settlements, plan_settlements};
pub use split::{calculate_splits, validate_payments};
