//! Key/value storage backends for the cache.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::StoreError;

/// A stored value with the time it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredValue {
  pub value: String,
  pub written_at: DateTime<Utc>,
}

/// Trait for cache storage backends.
///
/// Backends hold opaque string blobs under string keys; typing is layered on
/// top by [`CacheStore`](super::CacheStore).
pub trait CacheStorage: Send + Sync {
  /// Get the value stored under `key`.
  fn get(&self, key: &str) -> Result<Option<StoredValue>, StoreError>;

  /// Store `value` under `key`, replacing any prior value.
  fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;

  /// Remove `key`. Removing a missing key is not an error.
  fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Lets the backend be picked at runtime (`Box<dyn CacheStorage>`).
impl<S: CacheStorage + ?Sized> CacheStorage for Box<S> {
  fn get(&self, key: &str) -> Result<Option<StoredValue>, StoreError> {
    (**self).get(key)
  }

  fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
    (**self).put(key, value)
  }

  fn delete(&self, key: &str) -> Result<(), StoreError> {
    (**self).delete(key)
  }
}

/// Storage implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStorage;

impl CacheStorage for NoopStorage {
  fn get(&self, _key: &str) -> Result<Option<StoredValue>, StoreError> {
    Ok(None) // Always miss
  }

  fn put(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
    Ok(()) // Discard
  }

  fn delete(&self, _key: &str) -> Result<(), StoreError> {
    Ok(())
  }
}

/// Process-local storage. Contents are lost on exit.
#[derive(Default)]
pub struct MemoryStorage {
  entries: Mutex<HashMap<String, StoredValue>>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }
}

impl CacheStorage for MemoryStorage {
  fn get(&self, key: &str) -> Result<Option<StoredValue>, StoreError> {
    let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
    Ok(entries.get(key).cloned())
  }

  fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
    let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
    entries.insert(
      key.to_string(),
      StoredValue {
        value: value.to_string(),
        written_at: Utc::now(),
      },
    );
    Ok(())
  }

  fn delete(&self, key: &str) -> Result<(), StoreError> {
    let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
    entries.remove(key);
    Ok(())
  }
}

/// SQLite-based cache storage implementation.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

/// Schema for the key/value table.
const CACHE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    written_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

impl SqliteStorage {
  /// Create a new SQLite storage at the default location.
  pub fn open() -> Result<Self, StoreError> {
    Self::open_at(&Self::default_path()?)
  }

  /// Open (or create) a cache database at `path`.
  pub fn open_at(path: &Path) -> Result<Self, StoreError> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(path)?;
    Self::from_connection(conn)
  }

  /// Open a throwaway in-memory database.
  pub fn open_in_memory() -> Result<Self, StoreError> {
    Self::from_connection(Connection::open_in_memory()?)
  }

  fn from_connection(conn: Connection) -> Result<Self, StoreError> {
    conn.execute_batch(CACHE_SCHEMA)?;
    Ok(Self {
      conn: Mutex::new(conn),
    })
  }

  /// Get the default database path.
  pub fn default_path() -> Result<PathBuf, StoreError> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| {
        StoreError::Io(std::io::Error::new(
          std::io::ErrorKind::NotFound,
          "Could not determine data directory",
        ))
      })?;

    Ok(data_dir.join("recipes").join("cache.db"))
  }
}

impl CacheStorage for SqliteStorage {
  fn get(&self, key: &str) -> Result<Option<StoredValue>, StoreError> {
    let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;

    let row: Option<(String, String)> = conn
      .query_row(
        "SELECT value, written_at FROM kv WHERE key = ?",
        params![key],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .optional()?;

    Ok(row.map(|(value, written_at)| StoredValue {
      value,
      // A garbled timestamp only loses metadata, not the value itself
      written_at: parse_datetime(&written_at).unwrap_or_else(Utc::now),
    }))
  }

  fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
    let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
    conn.execute(
      "INSERT OR REPLACE INTO kv (key, value, written_at) VALUES (?, ?, datetime('now'))",
      params![key, value],
    )?;
    Ok(())
  }

  fn delete(&self, key: &str) -> Result<(), StoreError> {
    let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
    conn.execute("DELETE FROM kv WHERE key = ?", params![key])?;
    Ok(())
  }
}

/// Parse a datetime string from SQLite format.
fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
  // SQLite stores as "YYYY-MM-DD HH:MM:SS"
  chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
    .ok()
    .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn exercise(storage: &dyn CacheStorage) {
    assert_eq!(storage.get("k").unwrap(), None);

    storage.put("k", "one").unwrap();
    assert_eq!(storage.get("k").unwrap().map(|v| v.value), Some("one".to_string()));

    storage.put("k", "two").unwrap();
    assert_eq!(storage.get("k").unwrap().map(|v| v.value), Some("two".to_string()));

    storage.delete("k").unwrap();
    assert_eq!(storage.get("k").unwrap(), None);

    // Deleting twice is fine
    storage.delete("k").unwrap();
  }

  #[test]
  fn test_memory_storage() {
    exercise(&MemoryStorage::new());
  }

  #[test]
  fn test_sqlite_storage() {
    exercise(&SqliteStorage::open_in_memory().unwrap());
  }

  #[test]
  fn test_sqlite_keys_are_independent() {
    let storage = SqliteStorage::open_in_memory().unwrap();
    storage.put("a", "1").unwrap();
    storage.put("b", "2").unwrap();
    storage.delete("a").unwrap();
    assert_eq!(storage.get("b").unwrap().map(|v| v.value), Some("2".to_string()));
  }

  #[test]
  fn test_noop_storage_never_hits() {
    let storage = NoopStorage;
    storage.put("k", "v").unwrap();
    assert_eq!(storage.get("k").unwrap(), None);
  }

  #[test]
  fn test_parse_datetime() {
    assert!(parse_datetime("2024-01-02 03:04:05").is_some());
    assert!(parse_datetime("yesterday").is_none());
  }
}
