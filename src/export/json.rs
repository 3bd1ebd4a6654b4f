//! JSON snapshot format
//!
//! The native snapshot is the whole ledger with a schema version. It is
//! used for the data file, for `export --format json` and for `import`.
//! Documents without a `schema_version` are older float-based exports and
//! are handed to [`super::legacy`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::Write;

use crate::error::{SplitError, SplitResult};
use crate::ledger::Ledger;
use crate::models::Expense;

use super::legacy::LegacySnapshot;

/// Current snapshot schema version
pub const SNAPSHOT_SCHEMA_VERSION: &str = "1.0.0";

/// Serializable copy of a whole ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Schema version for compatibility checking
    pub schema_version: String,

    #[serde(default = "Utc::now")]
    pub exported_at: DateTime<Utc>,

    /// Application version that wrote the snapshot
    #[serde(default)]
    pub app_version: String,

    pub expenses: Vec<Expense>,

    /// Group name -> member list
    #[serde(default)]
    pub groups: BTreeMap<String, Vec<String>>,

    /// Registered members, in registration order
    pub members: Vec<String>,
}

impl LedgerSnapshot {
    pub fn from_ledger(ledger: &Ledger) -> Self {
        Self {
            schema_version: SNAPSHOT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            expenses: ledger.expenses().to_vec(),
            groups: ledger
                .groups()
                .iter()
                .map(|g| (g.name.clone(), g.members.clone()))
                .collect(),
            members: ledger.members().to_vec(),
        }
    }
}

/// Write the ledger as a native JSON snapshot
pub fn export_json<W: Write>(ledger: &Ledger, writer: &mut W, pretty: bool) -> SplitResult<()> {
    let snapshot = ledger.export_state();

    if pretty {
        serde_json::to_writer_pretty(writer, &snapshot)
    } else {
        serde_json::to_writer(writer, &snapshot)
    }
    .map_err(|e| SplitError::Export(e.to_string()))?;

    Ok(())
}

/// Parse a JSON document as a snapshot, native or legacy
pub fn parse_snapshot(json_str: &str) -> SplitResult<LedgerSnapshot> {
    let value: Value = serde_json::from_str(json_str)
        .map_err(|e| SplitError::Format(format!("Invalid JSON: {}", e)))?;
    snapshot_from_value(value)
}

/// Interpret an already-parsed document as a snapshot
///
/// The document must be an object with `expenses` and `members`. If it
/// carries a `schema_version` it must be the current one; otherwise it is
/// read as a legacy export.
pub fn snapshot_from_value(value: Value) -> SplitResult<LedgerSnapshot> {
    let object = value
        .as_object()
        .ok_or_else(|| SplitError::Format("Snapshot must be an object".into()))?;

    for field in ["expenses", "members"] {
        if !object.contains_key(field) {
            return Err(SplitError::Format(format!(
                "Snapshot is missing required field '{}'",
                field
            )));
        }
    }

    match object.get("schema_version") {
        Some(Value::String(version)) if version == SNAPSHOT_SCHEMA_VERSION => {
            serde_json::from_value(value).map_err(|e| SplitError::Format(e.to_string()))
        }
        Some(Value::String(version)) => Err(SplitError::Format(format!(
            "Schema version mismatch: expected {}, got {}",
            SNAPSHOT_SCHEMA_VERSION, version
        ))),
        Some(other) => Err(SplitError::Format(format!(
            "Schema version must be a string, got {}",
            other
        ))),
        None => {
            let legacy: LegacySnapshot = serde_json::from_value(value)
                .map_err(|e| SplitError::Format(format!("Legacy snapshot: {}", e)))?;
            legacy.into_snapshot()
        }
    }
}
