//! Core traits and types for the caching system.

use serde::{de::DeserializeOwned, Serialize};

/// Trait for records that can be kept in the list cache.
///
/// Implementors provide a stable identity and the backend-assigned version used
/// to bound incremental fetches.
pub trait Cacheable: Clone + Send + Sync + Serialize + DeserializeOwned {
  /// Unique identifier for this record (e.g., recipe id)
  fn cache_key(&self) -> &str;

  /// Opaque version marker, totally ordered under string comparison
  fn version(&self) -> &str;
}

/// Greatest version in `records` under string ordering.
///
/// The empty string is the identity, so an empty slice yields `""`.
pub fn max_version<T: Cacheable>(records: &[T]) -> &str {
  records
    .iter()
    .map(Cacheable::version)
    .fold("", |max, v| if v > max { v } else { max })
}

/// Result from a sync operation, including data and how it was obtained.
#[derive(Debug, Clone)]
pub struct SyncResult<T> {
  /// The effective record set
  pub data: T,
  /// Where the data came from
  pub source: SyncSource,
}

impl<T> SyncResult<T> {
  pub fn full(data: T) -> Self {
    Self {
      data,
      source: SyncSource::Full,
    }
  }

  pub fn incremental(data: T, fetched: usize) -> Self {
    Self {
      data,
      source: SyncSource::Incremental { fetched },
    }
  }
}

/// Indicates how a synced list was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncSource {
  /// No usable cache; the whole list came from the network
  Full,
  /// Cached list extended with `fetched` newer records
  Incremental { fetched: usize },
}
