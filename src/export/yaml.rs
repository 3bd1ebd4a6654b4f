//! YAML Export functionality
//!
//! Writes the native snapshot as YAML for a human-readable backup. The
//! document can be imported again like a JSON snapshot.

use crate::error::{SplitError, SplitResult};
use crate::export::json::{snapshot_from_value, LedgerSnapshot};
use crate::ledger::Ledger;
use std::io::Write;

/// Export the whole ledger in YAML format
pub fn export_yaml<W: Write>(ledger: &Ledger, writer: &mut W) -> SplitResult<()> {
    let snapshot = ledger.export_state();
    let summary = ledger.summary(None);

    let export_err = |e: std::io::Error| SplitError::Export(e.to_string());

    writeln!(writer, "# SplitLedger Export").map_err(export_err)?;
    writeln!(writer, "# Generated: {}", snapshot.exported_at).map_err(export_err)?;
    writeln!(writer, "# App Version: {}", snapshot.app_version).map_err(export_err)?;
    writeln!(
        writer,
        "# {} members, {} expenses totalling {}",
        summary.member_count, summary.expense_count, summary.total_amount
    )
    .map_err(export_err)?;
    writeln!(writer, "#").map_err(export_err)?;
    writeln!(writer, "# Amounts are in cents.").map_err(export_err)?;
    writeln!(writer).map_err(export_err)?;

    serde_yaml::to_writer(writer, &snapshot).map_err(|e| SplitError::Export(e.to_string()))?;

    Ok(())
}

/// Parse a YAML document as a snapshot, native or legacy
pub fn parse_yaml_snapshot(yaml_str: &str) -> SplitResult<LedgerSnapshot> {
    let value: serde_json::Value = serde_yaml::from_str(yaml_str)
        .map_err(|e| SplitError::Format(format!("Invalid YAML: {}", e)))?;
    snapshot_from_value(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, NewExpense, SplitRule};

    fn ledger() -> Ledger {
        let mut ledger = Ledger::new();
        ledger.add_member("Alice");
        ledger.add_member("Bob");
        ledger
            .add_expense(
                NewExpense::new(
                    "Groceries",
                    Money::from_cents(4500),
                    SplitRule::Equal {
                        among: vec!["Alice".into(), "Bob".into()],
                    },
                )
                .paid_in_full_by("Alice"),
            )
            .unwrap();
        ledger
    }

    #[test]
    fn test_yaml_export() {
        let mut output = Vec::new();
        export_yaml(&ledger(), &mut output).unwrap();

        let yaml = String::from_utf8(output).unwrap();
        assert!(yaml.starts_with("# SplitLedger Export"));
        assert!(yaml.contains("2 members, 1 expenses totalling $45.00"));
        assert!(yaml.contains("Groceries"));
    }

    #[test]
    fn test_yaml_roundtrip() {
        let ledger = ledger();
        let mut output = Vec::new();
        export_yaml(&ledger, &mut output).unwrap();

        let snapshot = parse_yaml_snapshot(std::str::from_utf8(&output).unwrap()).unwrap();
        let restored = Ledger::from_snapshot(snapshot).unwrap();

        assert_eq!(restored.members(), ledger.members());
        assert_eq!(restored.expenses().len(), 1);
        assert_eq!(
            restored.compute_balances(None),
            ledger.compute_balances(None)
        );
    }
}
