//! SplitLedger - terminal-based shared expense tracker
//!
//! This library provides the core of the SplitLedger application: a ledger
//! of shared expenses among a group of members that works out who owes
//! whom and suggests the payments that settle all debts.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `models`: Core data types (money, expenses, balances, settlements)
//! - `services`: Split calculator, balance aggregator, settlement planner
//! - `ledger`: The ledger aggregate that ties the services to its state
//! - `export`: Snapshot formats (JSON, YAML, CSV, legacy import)
//! - `storage`: Mutex-guarded, atomically persisted ledger
//! - `config`: Configuration and path management
//! - `display`: Plain-text formatting for terminal output
//! - `cli`: Command handlers for the `splitledger` binary
//! - `error`: Custom error types
//!
//! # Example
//!
//! ```
//! use splitledger_cli::ledger::Ledger;
//! use splitledger_cli::models::{Money, NewExpense, SplitRule};
//!
//! let mut ledger = Ledger::new();
//! for name in ["A", "B", "C"] {
//!     ledger.add_member(name);
//! }
//!
//! let among = vec!["A".to_string(), "B".to_string(), "C".to_string()];
//! let dinner = NewExpense::new("Dinner", Money::from_cents(9000), SplitRule::Equal { among })
//!     .paid_in_full_by("A");
//! ledger.add_expense(dinner).unwrap();
//!
//! let settlements = ledger.compute_settlements(None);
//! assert_eq!(settlements.len(), 2);
//! assert_eq!(settlements[0].to_string(), "B -> A: $30.00");
//! ```

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod ledger;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{SplitError, SplitResult};
pub use ledger::{Ledger, LedgerSummary};
