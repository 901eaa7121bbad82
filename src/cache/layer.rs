//! Cache layer that orchestrates version-incremental sync with network fetching.

use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use super::storage::CacheStorage;
use super::store::CacheStore;
use super::traits::{max_version, Cacheable, SyncResult};
use crate::error::ApiError;

/// How newly fetched records are combined with the cached list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
  /// `cached ++ fetched`, no de-duplication
  #[default]
  Append,
  /// Collapse records sharing an id, keeping the greatest version
  Dedupe,
}

impl MergeStrategy {
  pub fn merge<T: Cacheable>(self, cached: Vec<T>, fetched: Vec<T>) -> Vec<T> {
    match self {
      MergeStrategy::Append => {
        let mut merged = cached;
        merged.extend(fetched);
        merged
      }
      MergeStrategy::Dedupe => dedupe_by_key(cached.into_iter().chain(fetched)),
    }
  }
}

/// Keep one record per key at the position of its first occurrence,
/// holding the greatest version seen (later records win ties).
fn dedupe_by_key<T: Cacheable>(records: impl Iterator<Item = T>) -> Vec<T> {
  let mut positions: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
  let mut merged: Vec<T> = Vec::new();

  for record in records {
    match positions.get(record.cache_key()) {
      Some(&index) => {
        if record.version() >= merged[index].version() {
          merged[index] = record;
        }
      }
      None => {
        positions.insert(record.cache_key().to_string(), merged.len());
        merged.push(record);
      }
    }
  }

  merged
}

/// Cache layer that manages the list cache and network fetching.
///
/// This layer sits between the application and the network client and keeps
/// network transfer down by asking only for records newer than the cache.
pub struct CacheLayer<S: CacheStorage, T> {
  store: CacheStore<S, T>,
  merge: MergeStrategy,
}

impl<S: CacheStorage, T: Cacheable> CacheLayer<S, T> {
  /// Create a new cache layer with the given storage backend.
  pub fn new(storage: Arc<S>, namespace: &str) -> Self {
    Self {
      store: CacheStore::new(storage, namespace),
      merge: MergeStrategy::default(),
    }
  }

  /// Set the merge strategy used by incremental syncs.
  pub fn with_merge(mut self, merge: MergeStrategy) -> Self {
    self.merge = merge;
    self
  }

  pub fn store(&self) -> &CacheStore<S, T> {
    &self.store
  }

  /// Persist `records`, logging instead of failing when the backend refuses.
  pub fn persist(&self, records: &[T]) {
    if let Err(e) = self.store.write(records) {
      warn!(error = %e, "failed to write cache, continuing without it");
    }
  }

  /// Sync the list with version-incremental fetching.
  ///
  /// 1. Read cache - if missing or empty, fetch everything
  /// 2. Otherwise fetch only records with a version above the cached maximum
  /// 3. Merge the new records into the cached list
  /// 4. Persist and return the merged list
  ///
  /// The fetcher receives `Some(max_version)` for incremental fetches and
  /// `None` for full ones. A fetch error aborts the sync and leaves the cache
  /// as it was.
  pub async fn sync<F, Fut>(&self, fetcher: F) -> Result<SyncResult<Vec<T>>, ApiError>
  where
    F: FnOnce(Option<String>) -> Fut,
    Fut: Future<Output = Result<Vec<T>, ApiError>>,
  {
    let cached = self.store.read().filter(|c| !c.is_empty());

    match cached {
      Some(cached) => {
        let since = max_version(&cached).to_string();
        debug!(cached = cached.len(), %since, "incremental sync");

        let fetched = fetcher(Some(since)).await?;
        let count = fetched.len();
        let merged = self.merge.merge(cached, fetched);

        self.persist(&merged);
        Ok(SyncResult::incremental(merged, count))
      }
      None => {
        debug!("no cached list, full sync");
        let data = fetcher(None).await?;
        self.persist(&data);
        Ok(SyncResult::full(data))
      }
    }
  }

  /// Drop the cache and run a full sync.
  pub async fn refresh<F, Fut>(&self, fetcher: F) -> Result<SyncResult<Vec<T>>, ApiError>
  where
    F: FnOnce(Option<String>) -> Fut,
    Fut: Future<Output = Result<Vec<T>, ApiError>>,
  {
    self.store.clear();
    self.sync(fetcher).await
  }

  /// Forget the cached list.
  pub fn invalidate(&self) {
    self.store.clear();
  }
}

impl<S: CacheStorage, T> Clone for CacheLayer<S, T> {
  fn clone(&self) -> Self {
    Self {
      store: self.store.clone(),
      merge: self.merge,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::storage::MemoryStorage;
  use crate::cache::traits::SyncSource;
  use crate::recipe::Recipe;
  use std::sync::Mutex;

  fn recipe(id: &str, version: &str) -> Recipe {
    Recipe {
      id: id.to_string(),
      title: format!("Recipe {}", id),
      version: version.to_string(),
      ..Default::default()
    }
  }

  fn layer() -> CacheLayer<MemoryStorage, Recipe> {
    CacheLayer::new(Arc::new(MemoryStorage::new()), "recipes:test")
  }

  #[tokio::test]
  async fn test_empty_cache_does_full_fetch() {
    let layer = layer();
    let seen = Mutex::new(Vec::new());

    let result = layer
      .sync(|since| {
        seen.lock().unwrap().push(since);
        async { Ok(vec![recipe("1", "10"), recipe("2", "11")]) }
      })
      .await
      .unwrap();

    assert_eq!(result.source, SyncSource::Full);
    assert_eq!(result.data.len(), 2);
    assert_eq!(*seen.lock().unwrap(), vec![None]);
    assert_eq!(layer.store().read(), Some(result.data));
  }

  #[tokio::test]
  async fn test_cached_empty_list_does_full_fetch() {
    let layer = layer();
    layer.store().write(&[]).unwrap();

    let result = layer
      .sync(|since| async move {
        assert_eq!(since, None);
        Ok(vec![recipe("1", "10")])
      })
      .await
      .unwrap();

    assert_eq!(result.source, SyncSource::Full);
  }

  #[tokio::test]
  async fn test_incremental_fetch_appends() {
    let layer = layer();
    let cached = vec![recipe("1", "10")];
    layer.store().write(&cached).unwrap();

    let result = layer
      .sync(|since| async move {
        assert_eq!(since.as_deref(), Some("10"));
        Ok(vec![recipe("2", "11"), recipe("3", "12")])
      })
      .await
      .unwrap();

    assert_eq!(result.source, SyncSource::Incremental { fetched: 2 });
    assert_eq!(result.data.len(), cached.len() + 2);
    let ids: Vec<&str> = result.data.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert_eq!(layer.store().read(), Some(result.data));
  }

  #[tokio::test]
  async fn test_max_version_uses_string_order() {
    let layer = layer();
    layer
      .store()
      .write(&[recipe("1", "9"), recipe("2", "10"), recipe("3", "")])
      .unwrap();

    layer
      .sync(|since| async move {
        // "9" > "10" as strings
        assert_eq!(since.as_deref(), Some("9"));
        Ok(Vec::new())
      })
      .await
      .unwrap();
  }

  #[tokio::test]
  async fn test_append_keeps_duplicate_ids() {
    let layer = layer();
    layer.store().write(&[recipe("1", "10")]).unwrap();

    let result = layer
      .sync(|_| async { Ok(vec![recipe("1", "11")]) })
      .await
      .unwrap();

    assert_eq!(result.data, vec![recipe("1", "10"), recipe("1", "11")]);
  }

  #[tokio::test]
  async fn test_dedupe_keeps_newest_in_place() {
    let layer = layer().with_merge(MergeStrategy::Dedupe);
    layer
      .store()
      .write(&[recipe("1", "10"), recipe("2", "10")])
      .unwrap();

    let result = layer
      .sync(|_| async { Ok(vec![recipe("1", "12"), recipe("3", "12")]) })
      .await
      .unwrap();

    assert_eq!(
      result.data,
      vec![recipe("1", "12"), recipe("2", "10"), recipe("3", "12")]
    );
  }

  #[tokio::test]
  async fn test_fetch_error_leaves_cache_untouched() {
    let layer = layer();
    let cached = vec![recipe("1", "10")];
    layer.store().write(&cached).unwrap();

    let result = layer
      .sync(|_| async {
        Err(ApiError::Http {
          status: 500,
          message: "boom".to_string(),
        })
      })
      .await;

    assert!(matches!(result, Err(ApiError::Http { status: 500, .. })));
    assert_eq!(layer.store().read(), Some(cached));
  }

  #[tokio::test]
  async fn test_refresh_ignores_cache() {
    let layer = layer();
    layer.store().write(&[recipe("1", "10")]).unwrap();

    let result = layer
      .refresh(|since| async move {
        assert_eq!(since, None);
        Ok(vec![recipe("2", "20")])
      })
      .await
      .unwrap();

    assert_eq!(result.data, vec![recipe("2", "20")]);
    assert_eq!(layer.store().read(), Some(vec![recipe("2", "20")]));
  }

  #[tokio::test]
  async fn test_corrupt_cache_falls_back_to_full() {
    let storage = Arc::new(MemoryStorage::new());
    let layer: CacheLayer<MemoryStorage, Recipe> =
      CacheLayer::new(Arc::clone(&storage), "recipes:test");
    storage.put(layer.store().key(), "garbage").unwrap();

    let result = layer
      .sync(|since| async move {
        assert_eq!(since, None);
        Ok(vec![recipe("1", "10")])
      })
      .await
      .unwrap();

    assert_eq!(result.source, SyncSource::Full);
  }

  #[test]
  fn test_merge_strategy_from_config() {
    let merge: MergeStrategy = serde_yaml::from_str("dedupe").unwrap();
    assert_eq!(merge, MergeStrategy::Dedupe);
    assert_eq!(MergeStrategy::default(), MergeStrategy::Append);
  }
}
