//! Persistence gateway for the session ledger.
//!
//! The ledger persists as one opaque string-keyed slot holding the full
//! serialized transaction array. Every save is a whole-value overwrite of
//! that slot; there is no partial update and no transaction log. The
//! [`SlotStore`] trait abstracts the slot itself so production runs on
//! SQLite while tests inject an in-memory double.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use tracing::{debug, warn};

use crate::db::{self, DbState};
use crate::error::StorageError;
use crate::ledger::Transaction;

/// Key of the single slot holding the session snapshot.
pub const LEDGER_SLOT_KEY: &str = "sales_data";

// ---------------------------------------------------------------------------
// Slot store
// ---------------------------------------------------------------------------

/// An opaque string-keyed persistence service holding one value.
pub trait SlotStore: Send + Sync {
    /// Read the slot's raw contents; `None` when the slot is absent.
    fn read(&self) -> Result<Option<String>, StorageError>;
    /// Replace the slot's contents.
    fn write(&self, raw: &str) -> Result<(), StorageError>;
    /// Remove the slot entirely.
    fn clear(&self) -> Result<(), StorageError>;
}

/// Production slot store: one row in the `ledger_slots` table.
pub struct SqliteSlotStore {
    db: Arc<DbState>,
}

impl SqliteSlotStore {
    pub fn new(db: Arc<DbState>) -> Self {
        Self { db }
    }
}

impl SlotStore for SqliteSlotStore {
    fn read(&self) -> Result<Option<String>, StorageError> {
        let conn = self.db.conn.lock().map_err(|_| StorageError::LockPoisoned)?;
        Ok(db::get_slot(&conn, LEDGER_SLOT_KEY))
    }

    fn write(&self, raw: &str) -> Result<(), StorageError> {
        let conn = self.db.conn.lock().map_err(|_| StorageError::LockPoisoned)?;
        db::set_slot(&conn, LEDGER_SLOT_KEY, raw)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let conn = self.db.conn.lock().map_err(|_| StorageError::LockPoisoned)?;
        db::delete_slot(&conn, LEDGER_SLOT_KEY)?;
        Ok(())
    }
}

/// In-memory slot store for tests. Can be flipped unavailable to exercise
/// the failure paths without a real storage fault.
#[derive(Default)]
pub struct MemorySlotStore {
    slot: Mutex<Option<String>>,
    unavailable: AtomicBool,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose slot already holds `raw`.
    pub fn with_contents(raw: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(raw.into())),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Make every operation fail with `StorageError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Inspect the raw slot contents.
    pub fn contents(&self) -> Option<String> {
        self.slot.lock().map(|s| s.clone()).unwrap_or(None)
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("slot store offline".to_string()));
        }
        Ok(())
    }
}

impl SlotStore for MemorySlotStore {
    fn read(&self) -> Result<Option<String>, StorageError> {
        self.check_available()?;
        Ok(self.contents())
    }

    fn write(&self, raw: &str) -> Result<(), StorageError> {
        self.check_available()?;
        let mut slot = self.slot.lock().map_err(|_| StorageError::LockPoisoned)?;
        *slot = Some(raw.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.check_available()?;
        let mut slot = self.slot.lock().map_err(|_| StorageError::LockPoisoned)?;
        *slot = None;
        Ok(())
    }
}

impl<S: SlotStore + ?Sized> SlotStore for Arc<S> {
    fn read(&self) -> Result<Option<String>, StorageError> {
        (**self).read()
    }

    fn write(&self, raw: &str) -> Result<(), StorageError> {
        (**self).write(raw)
    }

    fn clear(&self) -> Result<(), StorageError> {
        (**self).clear()
    }
}

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

/// Serializes the transaction list in and out of the slot.
///
/// Loads are forgiving: an absent slot, unreadable storage, or malformed
/// contents all come back as an empty list — a prior session that cannot be
/// read is indistinguishable from no prior session.
pub struct LedgerGateway {
    store: Box<dyn SlotStore>,
}

impl LedgerGateway {
    pub fn new(store: impl SlotStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Load the persisted transaction list. Never errors.
    pub fn load(&self) -> Vec<Transaction> {
        let raw = match self.store.read() {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Ledger slot unreadable, treating as empty: {e}");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Transaction>>(&raw) {
            Ok(transactions) => {
                debug!(
                    "Loaded {} transaction(s) from the ledger slot",
                    transactions.len()
                );
                transactions
            }
            Err(e) => {
                warn!("Malformed ledger slot, treating as empty: {e}");
                Vec::new()
            }
        }
    }

    /// Serialize the full list and overwrite the slot.
    pub fn save(&self, transactions: &[Transaction]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(transactions)?;
        self.store.write(&raw)?;
        debug!(
            "Saved {} transaction(s) to the ledger slot",
            transactions.len()
        );
        Ok(())
    }

    /// Remove the slot entirely.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.clear()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::PaymentMethod;
    use rusqlite::Connection;
    use std::path::PathBuf;

    /// In-memory DbState with migrations applied (mirrors db::init).
    fn test_db() -> DbState {
        let conn = Connection::open_in_memory().expect("open in-memory db");
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;
             PRAGMA synchronous = NORMAL;",
        )
        .expect("pragma setup");
        db::run_migrations_for_test(&conn);
        DbState {
            conn: std::sync::Mutex::new(conn),
            db_path: PathBuf::from(":memory:"),
        }
    }

    fn sample_transactions() -> Vec<Transaction> {
        vec![
            Transaction {
                date: "6/1/2024, 10:30:00 AM".to_string(),
                amount: 10.0,
                method: PaymentMethod::Cash,
                tips: 2.0,
            },
            Transaction {
                date: "6/1/2024, 11:05:00 AM".to_string(),
                amount: 5.0,
                method: PaymentMethod::Card,
                tips: 0.0,
            },
        ]
    }

    // ------------------------------------------------------------------
    // SQLite store
    // ------------------------------------------------------------------

    #[test]
    fn test_sqlite_store_roundtrip() {
        let gateway = LedgerGateway::new(SqliteSlotStore::new(Arc::new(test_db())));
        let txs = sample_transactions();

        gateway.save(&txs).expect("save");
        assert_eq!(gateway.load(), txs);
    }

    #[test]
    fn test_sqlite_store_save_is_whole_value_overwrite() {
        let gateway = LedgerGateway::new(SqliteSlotStore::new(Arc::new(test_db())));
        let txs = sample_transactions();

        gateway.save(&txs).expect("save full list");
        gateway.save(&txs[..1]).expect("save shorter list");

        assert_eq!(gateway.load(), txs[..1]);
    }

    #[test]
    fn test_sqlite_store_clear_removes_slot() {
        let db = Arc::new(test_db());
        let gateway = LedgerGateway::new(SqliteSlotStore::new(db.clone()));

        gateway.save(&sample_transactions()).expect("save");
        gateway.clear().expect("clear");

        assert!(gateway.load().is_empty());
        let conn = db.conn.lock().expect("lock");
        assert_eq!(db::get_slot(&conn, LEDGER_SLOT_KEY), None);
    }

    // ------------------------------------------------------------------
    // Forgiving load
    // ------------------------------------------------------------------

    #[test]
    fn test_load_of_absent_slot_is_empty() {
        let gateway = LedgerGateway::new(MemorySlotStore::new());
        assert!(gateway.load().is_empty());
    }

    #[test]
    fn test_load_of_garbage_is_empty() {
        let gateway = LedgerGateway::new(MemorySlotStore::with_contents("not json at all"));
        assert!(gateway.load().is_empty());
    }

    #[test]
    fn test_load_of_wrong_shape_is_empty() {
        let gateway =
            LedgerGateway::new(MemorySlotStore::with_contents(r#"{"date": "6/1/2024"}"#));
        assert!(gateway.load().is_empty());
    }

    #[test]
    fn test_load_of_unknown_method_string_is_empty() {
        let raw =
            r#"[{"date": "6/1/2024, 10:30:00 AM", "amount": 1.0, "type": "Voucher", "tips": 0.0}]"#;
        let gateway = LedgerGateway::new(MemorySlotStore::with_contents(raw));
        assert!(gateway.load().is_empty());
    }

    #[test]
    fn test_load_of_unreadable_store_is_empty() {
        let store = MemorySlotStore::with_contents("[]");
        store.set_unavailable(true);
        let gateway = LedgerGateway::new(store);
        assert!(gateway.load().is_empty());
    }

    // ------------------------------------------------------------------
    // Memory store failure injection
    // ------------------------------------------------------------------

    #[test]
    fn test_unavailable_store_fails_saves() {
        let store = MemorySlotStore::new();
        store.set_unavailable(true);
        let gateway = LedgerGateway::new(store);

        let err = gateway
            .save(&sample_transactions())
            .expect_err("save should fail");
        assert!(matches!(err, StorageError::Unavailable(_)));
    }

    #[test]
    fn test_persisted_wire_format() {
        let store = Arc::new(MemorySlotStore::new());
        let gateway = LedgerGateway::new(store.clone());

        gateway.save(&sample_transactions()[..1]).expect("save");

        let raw = store.contents().expect("slot written");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
        assert_eq!(
            value,
            serde_json::json!([{
                "date": "6/1/2024, 10:30:00 AM",
                "amount": 10.0,
                "type": "Cash",
                "tips": 2.0
            }])
        );
    }
}
