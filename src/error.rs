//! Error types shared by the library modules.
//!
//! The binary wraps these in `color_eyre::Report` at the edges.

use thiserror::Error;

use crate::recipe::Recipe;

/// Failure of the persistent cache backend (serialization, quota, I/O).
#[derive(Error, Debug)]
pub enum StoreError {
  #[error("Failed to serialize cache value: {0}")]
  Serialize(#[from] serde_json::Error),

  #[error("Cache backend error: {0}")]
  Backend(#[from] rusqlite::Error),

  #[error("Failed to prepare cache location: {0}")]
  Io(#[from] std::io::Error),

  #[error("Cache lock poisoned")]
  Poisoned,
}

/// Failure of a call against the recipe backend.
#[derive(Error, Debug)]
pub enum ApiError {
  #[error("Network error: {0}")]
  Network(#[source] reqwest::Error),

  #[error("HTTP {status}: {message}")]
  Http { status: u16, message: String },

  #[error("Failed to decode response: {0}")]
  Decode(String),

  #[error("Invalid URL: {0}")]
  Url(#[from] url::ParseError),
}

impl ApiError {
  /// HTTP status code when the server answered with a non-2xx response.
  pub fn status(&self) -> Option<u16> {
    match self {
      ApiError::Http { status, .. } => Some(*status),
      _ => None,
    }
  }

  pub fn is_not_found(&self) -> bool {
    self.status() == Some(404)
  }
}

/// A recipe draft that cannot be submitted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
  #[error("Please enter a title")]
  MissingTitle,

  #[error("Please add at least one step")]
  NoSteps,

  #[error("Please add at least one ingredient")]
  NoIngredients,
}

/// A delete the backend refused.
///
/// The list is reloaded after the failure; `reloaded` holds it unless the
/// reload failed too.
#[derive(Error, Debug)]
#[error("{error}")]
pub struct DeleteError {
  #[source]
  pub error: ApiError,
  pub reloaded: Option<Vec<Recipe>>,
}
