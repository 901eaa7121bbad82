//! Bearer token persistence.

use std::sync::Arc;
use tracing::{info, warn};

use crate::cache::CacheStorage;
use crate::error::StoreError;

/// Persists the sign-in token under its own key, next to the list cache.
pub struct TokenStore<S: CacheStorage> {
  storage: Arc<S>,
  key: String,
}

impl<S: CacheStorage> TokenStore<S> {
  pub fn new(storage: Arc<S>, namespace: &str) -> Self {
    Self {
      storage,
      key: format!("{}:auth_token", namespace),
    }
  }

  pub fn set(&self, token: &str) -> Result<(), StoreError> {
    self.storage.put(&self.key, token.trim())?;
    info!("stored auth token");
    Ok(())
  }

  /// The stored token, if any. Storage errors read as "signed out".
  pub fn get(&self) -> Option<String> {
    match self.storage.get(&self.key) {
      Ok(stored) => stored.map(|s| s.value).filter(|t| !t.is_empty()),
      Err(e) => {
        warn!(error = %e, "failed to read auth token");
        None
      }
    }
  }

  pub fn clear(&self) {
    if let Err(e) = self.storage.delete(&self.key) {
      warn!(error = %e, "failed to clear auth token");
    }
  }

  pub fn is_authenticated(&self) -> bool {
    self.get().is_some()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::MemoryStorage;

  #[test]
  fn test_token_lifecycle() {
    let tokens = TokenStore::new(Arc::new(MemoryStorage::new()), "recipes:test");
    assert!(!tokens.is_authenticated());

    tokens.set(" abc.def.ghi\n").unwrap();
    assert_eq!(tokens.get().as_deref(), Some("abc.def.ghi"));
    assert!(tokens.is_authenticated());

    tokens.clear();
    tokens.clear();
    assert_eq!(tokens.get(), None);
  }

  #[test]
  fn test_token_key_does_not_touch_cache_key() {
    let storage = Arc::new(MemoryStorage::new());
    storage.put("recipes:test:cache", "{}").unwrap();

    let tokens = TokenStore::new(Arc::clone(&storage), "recipes:test");
    tokens.set("t").unwrap();
    tokens.clear();

    assert!(storage.get("recipes:test:cache").unwrap().is_some());
  }
}
