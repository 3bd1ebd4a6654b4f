//! Import and export formats for SplitLedger
//!
//! - JSON: the native snapshot, used for the data file and full backups
//! - YAML: the same snapshot for human-readable backups
//! - CSV: expense shares and balances for spreadsheets
//! - Legacy: reader for older float-based JSON exports

pub mod csv;
pub mod json;
pub mod legacy;
pub mod yaml;

pub use self::csv::{export_balances_csv, export_expenses_csv};
pub use json::{export_json, parse_snapshot, LedgerSnapshot, SNAPSHOT_SCHEMA_VERSION};
pub use yaml::{export_yaml, parse_yaml_snapshot};
