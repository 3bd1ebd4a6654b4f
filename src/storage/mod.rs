//! Storage layer for SplitLedger
//!
//! Owns the one [`Ledger`] of a data directory behind a mutex and persists
//! it as a JSON snapshot with atomic writes. Every mutation runs under the
//! lock and is followed by a save; a failed save is logged and does not
//! undo the in-memory change.

pub mod file_io;

pub use file_io::{read_text_if_exists, write_json_atomic};

use std::sync::{Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::config::paths::SplitPaths;
use crate::error::{SplitError, SplitResult};
use crate::export::json::parse_snapshot;
use crate::ledger::Ledger;

/// Thread-safe owner of a persisted ledger
pub struct Storage {
    paths: SplitPaths,
    ledger: Mutex<Ledger>,
}

impl Storage {
    /// Open the ledger stored under `paths`, starting empty if there is none
    ///
    /// Both native and legacy snapshots are accepted. A legacy file is
    /// rewritten in the native format on the next save.
    pub fn open(paths: SplitPaths) -> SplitResult<Self> {
        paths.ensure_directories()?;

        let ledger = match read_text_if_exists(paths.ledger_file())? {
            Some(text) => {
                let snapshot = parse_snapshot(&text).map_err(|e| {
                    SplitError::Storage(format!(
                        "Failed to load {}: {}",
                        paths.ledger_file().display(),
                        e
                    ))
                })?;
                Ledger::from_snapshot(snapshot)?
            }
            None => Ledger::new(),
        };

        debug!(
            path = %paths.ledger_file().display(),
            members = ledger.members().len(),
            expenses = ledger.expenses().len(),
            "Opened ledger"
        );

        Ok(Self {
            paths,
            ledger: Mutex::new(ledger),
        })
    }

    fn lock(&self) -> SplitResult<MutexGuard<'_, Ledger>> {
        self.ledger
            .lock()
            .map_err(|e| SplitError::Storage(format!("Failed to acquire ledger lock: {}", e)))
    }

    /// Run a read-only query against the ledger
    pub fn read<T>(&self, f: impl FnOnce(&Ledger) -> T) -> SplitResult<T> {
        let ledger = self.lock()?;
        Ok(f(&ledger))
    }

    /// Run a mutation against the ledger and persist the result
    ///
    /// Persistence is best-effort: a failed write is logged and the
    /// in-memory change stands.
    pub fn update<T>(&self, f: impl FnOnce(&mut Ledger) -> T) -> SplitResult<T> {
        let mut ledger = self.lock()?;
        let result = f(&mut ledger);

        if let Err(e) = self.persist(&ledger) {
            warn!(error = %e, "Failed to persist ledger");
        }

        Ok(result)
    }

    fn persist(&self, ledger: &Ledger) -> SplitResult<()> {
        write_json_atomic(self.paths.ledger_file(), &ledger.export_state())?;
        debug!(path = %self.paths.ledger_file().display(), "Saved ledger");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, NewExpense, SplitRule};
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = SplitPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    fn lunch(payer: &str) -> NewExpense {
        NewExpense::new(
            "Lunch",
            Money::from_cents(1000),
            SplitRule::Equal {
                among: vec!["A".into(), "B".into()],
            },
        )
        .paid_in_full_by(payer)
    }

    #[test]
    fn test_storage_creation() {
        let (temp_dir, storage) = create_test_storage();

        assert!(temp_dir.path().join("data").exists());
        assert!(!temp_dir.path().join("data").join("ledger.json").exists());
        assert!(storage.read(|l| l.members().is_empty()).unwrap());
    }

    #[test]
    fn test_update_persists() {
        let (temp_dir, storage) = create_test_storage();

        storage
            .update(|l| {
                l.add_member("A");
                l.add_member("B");
                l.add_expense(lunch("A"))
            })
            .unwrap()
            .unwrap();
        assert!(temp_dir.path().join("data").join("ledger.json").exists());

        let paths = SplitPaths::with_base_dir(temp_dir.path().to_path_buf());
        let reopened = Storage::open(paths).unwrap();
        let balance = reopened
            .read(|l| l.compute_balances(None).get("B"))
            .unwrap();
        assert_eq!(balance, Some(Money::from_cents(-500)));
    }

    #[test]
    fn test_opens_legacy_data_file() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SplitPaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();
        std::fs::write(
            paths.ledger_file(),
            r#"{"expenses": [], "groups": {"Trip": []}, "members": ["A", "B"]}"#,
        )
        .unwrap();

        let storage = Storage::open(paths.clone()).unwrap();
        assert_eq!(storage.read(|l| l.members().to_vec()).unwrap(), vec!["A", "B"]);
        assert_eq!(storage.read(|l| l.groups().len()).unwrap(), 1);

        storage.update(|l| l.add_member("C")).unwrap();
        let text = std::fs::read_to_string(paths.ledger_file()).unwrap();
        assert!(text.contains("schema_version"));
    }

    #[test]
    fn test_corrupt_data_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SplitPaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();
        std::fs::write(paths.ledger_file(), "{ broken").unwrap();

        assert!(matches!(Storage::open(paths), Err(SplitError::Storage(_))));
    }

    #[test]
    fn test_concurrent_updates_are_serialized() {
        let (_temp_dir, storage) = create_test_storage();
        storage
            .update(|l| {
                l.add_member("A");
                l.add_member("B");
            })
            .unwrap();

        let storage = Arc::new(storage);
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let storage = Arc::clone(&storage);
                thread::spawn(move || {
                    let payer = if i % 2 == 0 { "A" } else { "B" };
                    storage.update(|l| l.add_expense(lunch(payer))).unwrap().unwrap();
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let (count, total) = storage
            .read(|l| (l.expenses().len(), l.compute_balances(None).total()))
            .unwrap();
        assert_eq!(count, 8);
        assert!(total.is_zero());
    }
}
