//! Persistent response cache.
//!
//! This module provides a URL-keyed cache of JSON responses that:
//! - Keeps the authoritative index in memory for the process lifetime
//! - Hydrates once from a durable slot at startup (best-effort)
//! - Rewrites the durable slot after every write (best-effort)
//! - Never expires or evicts entries; freshness is the caller's decision

mod response;
mod store;

pub use response::{CacheEntry, ResponseCache};
pub use store::{NoopStore, SlotStore, SqliteSlotStore, StorageError};
