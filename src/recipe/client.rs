use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

use crate::error::ApiError;
use crate::recipe::api_types::{error_message, ApiCreated, ServerConfig};
use crate::recipe::types::{Recipe, RecipeDraft};

/// Base URL used when nothing is configured (the development backend).
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// Recipe backend API client
#[derive(Clone)]
pub struct RecipeClient {
  http: Client,
  base: Url,
  token: Option<String>,
}

impl RecipeClient {
  pub fn new(base_url: &str, timeout: Duration, token: Option<String>) -> Result<Self, ApiError> {
    let base = Url::parse(base_url)?;
    let http = Client::builder()
      .timeout(timeout)
      .build()
      .map_err(ApiError::Network)?;

    Ok(Self { http, base, token })
  }

  pub fn base_url(&self) -> &Url {
    &self.base
  }

  /// Attach the bearer token to a request when one is present.
  ///
  /// Every call goes through here so all operations authenticate the same way.
  fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
    match &self.token {
      Some(token) => request.bearer_auth(token),
      None => request,
    }
  }

  /// List recipes, optionally only those with a version greater than `since`
  pub async fn list(&self, since: Option<&str>) -> Result<Vec<Recipe>, ApiError> {
    let url = recipes_url(&self.base, None, since)?;
    debug!(%url, "listing recipes");
    let response = send(self.authorize(self.http.get(url))).await?;
    decode(response).await
  }

  /// Get a single recipe by id
  pub async fn get(&self, id: &str) -> Result<Recipe, ApiError> {
    let url = recipes_url(&self.base, Some(id), None)?;
    let response = send(self.authorize(self.http.get(url))).await?;
    decode(response).await
  }

  /// Create a recipe and return it with its server-assigned id
  pub async fn create(&self, draft: &RecipeDraft) -> Result<Recipe, ApiError> {
    let url = recipes_url(&self.base, None, None)?;
    let response = send(self.authorize(self.http.post(url).json(draft))).await?;
    let created: ApiCreated = decode(response).await?;
    info!(id = %created.id, title = %draft.title, "created recipe");
    Ok(Recipe::from_draft(created.id, draft.clone()))
  }

  /// Replace a recipe's content
  pub async fn update(&self, id: &str, draft: &RecipeDraft) -> Result<Recipe, ApiError> {
    let url = recipes_url(&self.base, Some(id), None)?;
    send(self.authorize(self.http.put(url).json(draft))).await?;
    info!(%id, title = %draft.title, "updated recipe");
    Ok(Recipe::from_draft(id.to_string(), draft.clone()))
  }

  pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
    let url = recipes_url(&self.base, Some(id), None)?;
    send(self.authorize(self.http.delete(url))).await?;
    info!(%id, "deleted recipe");
    Ok(())
  }

  /// Fetch the client-side configuration published by the backend
  pub async fn server_config(&self) -> Result<ServerConfig, ApiError> {
    let url = endpoint(&self.base, &["config"])?;
    let response = send(self.authorize(self.http.get(url))).await?;
    decode(response).await
  }
}

/// Append path segments to `base`, percent-encoding each one.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, ApiError> {
  let mut url = base.clone();
  url
    .path_segments_mut()
    .map_err(|_| ApiError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
    .pop_if_empty()
    .extend(segments);
  Ok(url)
}

/// Build `{base}/recipes[/{id}][?version={since}]`.
pub fn recipes_url(base: &Url, id: Option<&str>, since: Option<&str>) -> Result<Url, ApiError> {
  let mut url = match id {
    Some(id) => endpoint(base, &["recipes", id])?,
    None => endpoint(base, &["recipes"])?,
  };
  if let Some(version) = since {
    url.query_pairs_mut().append_pair("version", version);
  }
  Ok(url)
}

async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
  let response = request.send().await.map_err(ApiError::Network)?;
  let status = response.status();
  if status.is_success() {
    return Ok(response);
  }

  let body = response.text().await.unwrap_or_default();
  Err(ApiError::Http {
    status: status.as_u16(),
    message: error_message(&body, status.canonical_reason()),
  })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
  let bytes = response.bytes().await.map_err(ApiError::Network)?;
  serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}
