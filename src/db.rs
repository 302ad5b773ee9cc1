//! Local SQLite database layer for Golden Crown Sales.
//!
//! Uses rusqlite with WAL mode. Provides schema migrations and the
//! keyed-slot helpers the persistence gateway builds on: one row per slot,
//! holding an opaque serialized value.

use rusqlite::{params, Connection};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};

use crate::error::StorageError;

/// Shared handle to the on-device database.
pub struct DbState {
    pub conn: Mutex<Connection>,
    pub db_path: PathBuf,
}

/// Current schema version. Bump when adding new migrations.
const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Initialize the database at `{data_dir}/sales.db`.
///
/// Creates the directory if needed, opens the connection, sets pragmas,
/// and runs any pending migrations. On corruption or open failure,
/// deletes the file and retries once.
pub fn init(data_dir: &Path) -> Result<DbState, StorageError> {
    fs::create_dir_all(data_dir)?;

    let db_path = data_dir.join("sales.db");
    info!("Opening database at {}", db_path.display());

    let conn = match open_and_configure(&db_path) {
        Ok(c) => c,
        Err(first_err) => {
            warn!(
                "Database open failed ({}), deleting and retrying once",
                first_err
            );
            if db_path.exists() {
                let _ = fs::remove_file(&db_path);
                // Also remove WAL/SHM files if present
                let wal = db_path.with_extension("db-wal");
                let shm = db_path.with_extension("db-shm");
                let _ = fs::remove_file(&wal);
                let _ = fs::remove_file(&shm);
            }
            open_and_configure(&db_path)?
        }
    };

    run_migrations(&conn)?;

    info!("Database initialized (schema v{CURRENT_SCHEMA_VERSION})");

    Ok(DbState {
        conn: Mutex::new(conn),
        db_path,
    })
}

/// Open the database file and apply pragmas.
fn open_and_configure(path: &Path) -> Result<Connection, rusqlite::Error> {
    let conn = Connection::open(path)?;

    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = 5000;
         PRAGMA synchronous = NORMAL;",
    )?;

    Ok(conn)
}

/// Run all pending migrations up to `CURRENT_SCHEMA_VERSION`.
fn run_migrations(conn: &Connection) -> Result<(), rusqlite::Error> {
    // Ensure schema_version table exists first
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT DEFAULT (datetime('now'))
        );",
    )?;

    let current: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current >= CURRENT_SCHEMA_VERSION {
        info!("Database schema up to date (v{current})");
        return Ok(());
    }

    info!("Migrating database from v{current} to v{CURRENT_SCHEMA_VERSION}");

    if current < 1 {
        migrate_v1(conn)?;
    }

    Ok(())
}

/// Migration v1: the keyed slot table.
fn migrate_v1(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        -- ledger_slots (opaque serialized snapshots, one row per slot key)
        CREATE TABLE IF NOT EXISTS ledger_slots (
            slot_key TEXT PRIMARY KEY,
            data TEXT NOT NULL,
            updated_at TEXT DEFAULT (datetime('now'))
        );

        INSERT INTO schema_version (version) VALUES (1);
        ",
    )
}

// ---------------------------------------------------------------------------
// Slot helpers
// ---------------------------------------------------------------------------

/// Read a slot's raw value. Missing slots read as `None`.
pub fn get_slot(conn: &Connection, key: &str) -> Option<String> {
    conn.query_row(
        "SELECT data FROM ledger_slots WHERE slot_key = ?1",
        params![key],
        |row| row.get(0),
    )
    .ok()
}

/// Write a slot's raw value, replacing any prior value.
pub fn set_slot(conn: &Connection, key: &str, value: &str) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO ledger_slots (slot_key, data, updated_at)
         VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(slot_key) DO UPDATE SET
            data = excluded.data,
            updated_at = excluded.updated_at",
        params![key, value],
    )?;
    Ok(())
}

/// Remove a slot entirely. Removing an absent slot is not an error.
pub fn delete_slot(conn: &Connection, key: &str) -> Result<(), rusqlite::Error> {
    conn.execute("DELETE FROM ledger_slots WHERE slot_key = ?1", params![key])?;
    Ok(())
}

/// Test-only hook so other modules can build a migrated in-memory database.
#[cfg(test)]
pub fn run_migrations_for_test(conn: &Connection) {
    run_migrations(conn).expect("run_migrations should succeed in test");
}

// ===========================================================================
// Tests
// ===========================================================================
