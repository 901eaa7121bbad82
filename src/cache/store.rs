//! Typed list cache: one serialized envelope under one key.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, warn};

use super::storage::CacheStorage;
use super::traits::Cacheable;
use crate::error::StoreError;

/// The single persisted structure wrapping the cached list.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEnvelope<T> {
  recipes: Vec<T>,
}

/// Borrowing twin of [`CacheEnvelope`] so writes don't clone the list.
#[derive(Serialize)]
struct CacheEnvelopeRef<'a, T> {
  recipes: &'a [T],
}

/// Key prefix that isolates one backend's data from another's.
///
/// Two configurations pointing at different API URLs never share a cache
/// entry or a token.
pub fn namespace(base_url: &str) -> String {
  let mut hasher = Sha256::new();
  hasher.update(base_url.trim_end_matches('/').as_bytes());
  let digest = hex::encode(hasher.finalize());
  format!("recipes:{}", &digest[..12])
}

/// Read/write/clear access to the cached record list.
pub struct CacheStore<S: CacheStorage, T> {
  storage: Arc<S>,
  key: String,
  _marker: PhantomData<fn() -> T>,
}

impl<S: CacheStorage, T: Cacheable> CacheStore<S, T> {
  /// Create a store for the list cache under `namespace`.
  pub fn new(storage: Arc<S>, namespace: &str) -> Self {
    Self {
      storage,
      key: format!("{}:cache", namespace),
      _marker: PhantomData,
    }
  }

  pub fn key(&self) -> &str {
    &self.key
  }

  /// Read the cached list.
  ///
  /// Returns `None` when nothing is cached or the stored blob is unreadable.
  /// An unreadable blob is deleted so the next read starts clean.
  pub fn read(&self) -> Option<Vec<T>> {
    let stored = match self.storage.get(&self.key) {
      Ok(Some(stored)) => stored,
      Ok(None) => return None,
      Err(e) => {
        warn!(key = %self.key, error = %e, "failed to read cache");
        return None;
      }
    };

    match serde_json::from_str::<CacheEnvelope<T>>(&stored.value) {
      Ok(envelope) => {
        debug!(
          key = %self.key,
          count = envelope.recipes.len(),
          written_at = %stored.written_at,
          "cache hit"
        );
        Some(envelope.recipes)
      }
      Err(e) => {
        warn!(key = %self.key, error = %e, "dropping corrupt cache entry");
        self.clear();
        None
      }
    }
  }

  /// Persist the full list, replacing any prior value.
  pub fn write(&self, records: &[T]) -> Result<(), StoreError> {
    let blob = serde_json::to_string(&CacheEnvelopeRef { recipes: records })?;
    self.storage.put(&self.key, &blob)?;
    debug!(key = %self.key, count = records.len(), "cache written");
    Ok(())
  }

  /// Delete the cached list. Errors are logged, never returned.
  pub fn clear(&self) {
    if let Err(e) = self.storage.delete(&self.key) {
      warn!(key = %self.key, error = %e, "failed to clear cache");
    }
  }
}

impl<S: CacheStorage, T> Clone for CacheStore<S, T> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
      key: self.key.clone(),
      _marker: PhantomData,
    }
  }
}
