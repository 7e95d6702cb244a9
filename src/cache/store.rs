//! Durable slot storage trait and SQLite implementation.

use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Failure reading or writing durable storage.
///
/// Callers of the response cache never see this; it is logged and dropped.
#[derive(Debug, Error)]
pub enum StorageError {
  #[error("sqlite: {0}")]
  Sqlite(#[from] rusqlite::Error),
  #[error("serialization: {0}")]
  Serialize(#[from] serde_json::Error),
  #[error("io: {0}")]
  Io(#[from] std::io::Error),
  #[error("storage lock poisoned")]
  Lock,
  #[error("could not determine data directory")]
  NoDataDir,
}

/// A string-keyed store holding one string value per slot.
pub trait SlotStore: Send + Sync {
  /// Read the slot, `None` if it was never written.
  fn read(&self, slot: &str) -> Result<Option<String>, StorageError>;

  /// Overwrite the slot wholesale.
  fn write(&self, slot: &str, value: &str) -> Result<(), StorageError>;
}

/// Store that persists nothing.
/// Used when persistence is disabled - reads miss, writes are discarded.
pub struct NoopStore;

impl SlotStore for NoopStore {
  fn read(&self, _slot: &str) -> Result<Option<String>, StorageError> {
    Ok(None) // Always miss
  }

  fn write(&self, _slot: &str, _value: &str) -> Result<(), StorageError> {
    Ok(()) // Discard
  }
}

/// SQLite-backed slot store.
pub struct SqliteSlotStore {
  conn: Mutex<Connection>,
}

impl SqliteSlotStore {
  /// Open the store at the default location.
  pub fn open() -> Result<Self, StorageError> {
    Self::open_at(&Self::default_path()?)
  }

  /// Open (or create) the store at an explicit path.
  pub fn open_at(path: &Path) -> Result<Self, StorageError> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(path)?;
    Self::with_connection(conn)
  }

  /// A private, in-memory store.
  #[cfg(test)]
  pub fn in_memory() -> Result<Self, StorageError> {
    Self::with_connection(Connection::open_in_memory()?)
  }

  fn with_connection(conn: Connection) -> Result<Self, StorageError> {
    conn.execute_batch(SLOT_SCHEMA)?;
    Ok(Self {
      conn: Mutex::new(conn),
    })
  }

  /// Get the default database path.
  pub fn default_path() -> Result<PathBuf, StorageError> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or(StorageError::NoDataDir)?;

    Ok(data_dir.join("swx").join("cache.db"))
  }
}

/// Schema for the slot table.
const SLOT_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS kv_slots (
    slot TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    written_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

impl SlotStore for SqliteSlotStore {
  fn read(&self, slot: &str) -> Result<Option<String>, StorageError> {
    let conn = self.conn.lock().map_err(|_| StorageError::Lock)?;

    let value = conn
      .query_row(
        "SELECT value FROM kv_slots WHERE slot = ?",
        params![slot],
        |row| row.get(0),
      )
      .optional()?;

    Ok(value)
  }

  fn write(&self, slot: &str, value: &str) -> Result<(), StorageError> {
    let conn = self.conn.lock().map_err(|_| StorageError::Lock)?;

    conn.execute(
      "INSERT OR REPLACE INTO kv_slots (slot, value, written_at)
       VALUES (?, ?, datetime('now'))",
      params![slot, value],
    )?;

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_missing_slot_reads_none() {
    let store = SqliteSlotStore::in_memory().unwrap();
    assert_eq!(store.read("nothing").unwrap(), None);
  }

  #[test]
  fn test_write_overwrites() {
    let store = SqliteSlotStore::in_memory().unwrap();
    store.write("s", "one").unwrap();
    store.write("s", "two").unwrap();
    assert_eq!(store.read("s").unwrap().as_deref(), Some("two"));
  }

  #[test]
  fn test_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("cache.db");

    SqliteSlotStore::open_at(&path)
      .unwrap()
      .write("s", "[]")
      .unwrap();

    let reopened = SqliteSlotStore::open_at(&path).unwrap();
    assert_eq!(reopened.read("s").unwrap().as_deref(), Some("[]"));
  }

  #[test]
  fn test_noop_store() {
    let store = NoopStore;
    store.write("s", "x").unwrap();
    assert_eq!(store.read("s").unwrap(), None);
  }
}
