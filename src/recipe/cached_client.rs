//! Recipe client that wraps RecipeClient with the list cache.

use tracing::{debug, info, warn};

use crate::cache::{CacheLayer, CacheStorage, SyncResult, SyncSource};
use crate::error::{ApiError, DeleteError};

use super::client::RecipeClient;
use super::types::{Recipe, RecipeDraft};

/// Recipe client with transparent list caching.
///
/// This wraps the underlying RecipeClient and provides the same API, keeping
/// the cached list in step with every operation that changes it.
pub struct CachedRecipeClient<S: CacheStorage> {
  inner: RecipeClient,
  cache: CacheLayer<S, Recipe>,
}

impl<S: CacheStorage> CachedRecipeClient<S> {
  pub fn new(inner: RecipeClient, cache: CacheLayer<S, Recipe>) -> Self {
    Self { inner, cache }
  }

  pub fn inner(&self) -> &RecipeClient {
    &self.inner
  }

  pub fn cache(&self) -> &CacheLayer<S, Recipe> {
    &self.cache
  }

  /// Load the full recipe list, fetching only what the cache lacks.
  pub async fn recipes(&self) -> Result<SyncResult<Vec<Recipe>>, ApiError> {
    let result = self
      .cache
      .sync(|since| {
        let inner = self.inner.clone();
        async move { inner.list(since.as_deref()).await }
      })
      .await?;
    log_sync(&result);
    Ok(result)
  }

  /// Reload everything from the backend, ignoring the cache.
  pub async fn reload(&self) -> Result<SyncResult<Vec<Recipe>>, ApiError> {
    let result = self
      .cache
      .refresh(|_| {
        let inner = self.inner.clone();
        async move { inner.list(None).await }
      })
      .await?;
    log_sync(&result);
    Ok(result)
  }

  /// Get a single recipe (always from the network).
  pub async fn get(&self, id: &str) -> Result<Recipe, ApiError> {
    self.inner.get(id).await
  }

  /// Create a recipe. The cached list is dropped on success.
  pub async fn create(&self, draft: &RecipeDraft) -> Result<Recipe, ApiError> {
    let recipe = self.inner.create(draft).await?;
    self.cache.invalidate();
    Ok(recipe)
  }

  /// Update a recipe. The cached list is dropped on success.
  pub async fn update(&self, id: &str, draft: &RecipeDraft) -> Result<Recipe, ApiError> {
    let recipe = self.inner.update(id, draft).await?;
    self.cache.invalidate();
    Ok(recipe)
  }

  /// Delete a recipe and drop it from the cached list.
  ///
  /// `current` is the list the caller is showing; the remainder is written
  /// back as the new cache. On failure the list is reloaded from scratch and
  /// handed back with the error.
  pub async fn delete(&self, id: &str, current: &[Recipe]) -> Result<Vec<Recipe>, DeleteError> {
    match self.inner.delete(id).await {
      Ok(()) => {
        let remaining: Vec<Recipe> = current.iter().filter(|r| r.id != id).cloned().collect();
        self.cache.persist(&remaining);
        Ok(remaining)
      }
      Err(error) => {
        warn!(%id, %error, "delete failed, reloading recipes");
        let reloaded = match self.reload().await {
          Ok(result) => Some(result.data),
          Err(reload_err) => {
            warn!(error = %reload_err, "reload after failed delete also failed");
            None
          }
        };
        Err(DeleteError { error, reloaded })
      }
    }
  }

  /// Forget the cached list (e.g., on sign-out).
  pub fn clear_cache(&self) {
    self.cache.invalidate();
    info!("recipe cache cleared");
  }
}

fn log_sync(result: &SyncResult<Vec<Recipe>>) {
  match result.source {
    SyncSource::Full => debug!(total = result.data.len(), "loaded full recipe list"),
    SyncSource::Incremental { fetched } => {
      debug!(total = result.data.len(), fetched, "merged newer recipes into cache")
    }
  }
}

impl<S: CacheStorage> Clone for CachedRecipeClient<S> {
  fn clone(&self) -> Self {
    Self {
      inner: self.inner.clone(),
      cache: self.cache.clone(),
    }
  }
}
