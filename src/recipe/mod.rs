//! Recipe records and backend access.

pub mod api_types;
pub mod cached_client;
pub mod client;
#[cfg(test)]
mod test_server;
mod types;

use crate::cache::Cacheable;

pub use api_types::ServerConfig;
pub use cached_client::CachedRecipeClient;
pub use client::{RecipeClient, DEFAULT_API_URL};
pub use types::{split_keywords, Ingredient, Recipe, RecipeDraft, Servings, KEYWORD_SEPARATOR};

impl Cacheable for Recipe {
  fn cache_key(&self) -> &str {
    &self.id
  }

  fn version(&self) -> &str {
    &self.version
  }
}
