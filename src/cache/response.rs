//! In-memory response index backed by a durable slot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

use super::store::{SlotStore, StorageError};

/// Slot the whole index is persisted under.
pub const CACHE_SLOT: &str = "swapi_cache_v1";

/// A cached response body.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
  /// Normalized URL
  pub key: String,
  pub payload: Value,
  pub fetched_at: DateTime<Utc>,
}

/// On-disk shape of an entry: `{"data": ..., "ts": <epoch millis>}`.
#[derive(Deserialize)]
struct StoredEntry {
  data: Value,
  ts: i64,
}

#[derive(Serialize)]
struct StoredEntryRef<'a> {
  data: &'a Value,
  ts: i64,
}

/// Response cache keyed by normalized URL.
///
/// One instance is built at startup and shared by reference. Reads and writes
/// only touch the in-memory index; every write is followed by a flush of the
/// whole index to the slot store. Storage failures never reach callers.
pub struct ResponseCache {
  entries: RwLock<HashMap<String, CacheEntry>>,
  store: Box<dyn SlotStore>,
  /// Held from snapshot to write so flushes land in snapshot order
  flush_guard: Mutex<()>,
}

impl ResponseCache {
  /// Build the cache from whatever the store currently holds.
  ///
  /// Missing or unreadable storage yields an empty cache.
  pub fn hydrate(store: Box<dyn SlotStore>) -> Self {
    let entries = match load_entries(store.as_ref()) {
      Ok(entries) => {
        debug!(count = entries.len(), "hydrated response cache");
        entries
      }
      Err(e) => {
        warn!(error = %e, "discarding unreadable response cache");
        HashMap::new()
      }
    };

    Self {
      entries: RwLock::new(entries),
      store,
      flush_guard: Mutex::new(()),
    }
  }

  pub fn get(&self, key: &str) -> Option<CacheEntry> {
    self.read().get(key).cloned()
  }

  /// Store a payload under `key`, replacing any prior entry, then flush.
  pub fn put(&self, key: &str, payload: Value) {
    let entry = CacheEntry {
      key: key.to_string(),
      payload,
      fetched_at: Utc::now(),
    };
    self.write().insert(key.to_string(), entry);

    if let Err(e) = self.flush() {
      warn!(error = %e, key, "failed to persist response cache");
    }
  }

  /// Serialize the full index to durable storage.
  pub fn flush(&self) -> Result<(), StorageError> {
    let _guard = self.flush_guard.lock().unwrap_or_else(|e| e.into_inner());
    let serialized = {
      let entries = self.read();
      let pairs: Vec<(&str, StoredEntryRef<'_>)> = entries
        .values()
        .map(|entry| {
          (
            entry.key.as_str(),
            StoredEntryRef {
              data: &entry.payload,
              ts: entry.fetched_at.timestamp_millis(),
            },
          )
        })
        .collect();
      serde_json::to_string(&pairs)?
    };

    self.store.write(CACHE_SLOT, &serialized)
  }

  pub fn len(&self) -> usize {
    self.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.read().is_empty()
  }

  fn read(&self) -> RwLockReadGuard<'_, HashMap<String, CacheEntry>> {
    self.entries.read().unwrap_or_else(|e| e.into_inner())
  }

  fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, CacheEntry>> {
    self.entries.write().unwrap_or_else(|e| e.into_inner())
  }
}

fn load_entries(store: &dyn SlotStore) -> Result<HashMap<String, CacheEntry>, StorageError> {
  let raw = match store.read(CACHE_SLOT)? {
    Some(raw) => raw,
    None => return Ok(HashMap::new()),
  };

  let pairs: Vec<(String, StoredEntry)> = serde_json::from_str(&raw)?;

  Ok(
    pairs
      .into_iter()
      .filter_map(|(key, stored)| {
        let fetched_at = DateTime::from_timestamp_millis(stored.ts)?;
        Some((
          key.clone(),
          CacheEntry {
            key,
            payload: stored.data,
            fetched_at,
          },
        ))
      })
      .collect(),
  )
}
