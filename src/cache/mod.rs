//! Local list cache with version-incremental sync.
//!
//! This module provides a backend-agnostic caching mechanism that:
//! - Persists the last known full list as one envelope under one key
//! - Heals itself by dropping entries that no longer parse
//! - Supports incremental fetching via `version > max cached version`
//! - Degrades to "no cache" when the storage backend fails

mod layer;
mod storage;
mod store;
mod traits;

pub use layer::{CacheLayer, MergeStrategy};
pub use storage::{CacheStorage, MemoryStorage, NoopStorage, SqliteStorage, StoredValue};
pub use store::{namespace, CacheStore};
pub use traits::{max_version, Cacheable, SyncResult, SyncSource};
