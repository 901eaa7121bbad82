//! Serde types for backend responses that are not recipes themselves.

use serde::Deserialize;

/// Response to `POST /recipes`
#[derive(Debug, Deserialize)]
pub struct ApiCreated {
  pub id: String,
}

/// Error body returned with non-2xx responses
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
  pub error: String,
}

/// Client-side configuration served by `GET /config`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
  #[serde(rename = "googleClientId", default)]
  pub google_client_id: String,
}

/// Pull a readable message out of an error response body.
///
/// Falls back to the raw body, or the status reason when the body is empty.
pub fn error_message(body: &str, reason: Option<&str>) -> String {
  if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
    return parsed.error;
  }
  let trimmed = body.trim();
  if trimmed.is_empty() {
    reason.unwrap_or("request failed").to_string()
  } else {
    trimmed.to_string()
  }
}
