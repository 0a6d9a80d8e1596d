//! Async HTTP client wrapping the school-administration JSON API.

use std::path::Path;

use campus_core::{
  envelope::Envelope,
  payload::{Part, PartValue, Payload},
};
use reqwest::{
  Client, Method, RequestBuilder, Url,
  header::{COOKIE, HeaderMap, HeaderValue},
  multipart,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ApiError;

/// Connection settings for the backend.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url:       String,
  /// Path prefix in front of every endpoint, e.g. `/api`.
  pub api_prefix:     String,
  /// Raw `Cookie` header value for an already-established session.
  pub session_cookie: Option<String>,
}

/// Async HTTP client for the backend REST API.
///
/// Every request carries the session: a cookie store picks up cookies the
/// backend sets, and a configured session cookie is sent as a default
/// header. Cheap to clone, the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
    let mut headers = HeaderMap::new();
    if let Some(cookie) = config.session_cookie.as_deref().filter(|c| !c.trim().is_empty()) {
      let value = HeaderValue::from_str(cookie)
        .map_err(|e| ApiError::Config(format!("session cookie: {e}")))?;
      headers.insert(COOKIE, value);
    }

    let client = Client::builder()
      .cookie_store(true)
      .default_headers(headers)
      .build()?;
    Ok(Self { client, config })
  }

  pub fn config(&self) -> &ApiConfig {
    &self.config
  }

  /// The endpoint URL for `segments`. Each segment is percent-encoded on
  /// its own, so an id holding `/`, `?` or `#` stays one segment.
  pub(crate) fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
    let base = &self.config.base_url;
    let mut url =
      Url::parse(base).map_err(|e| ApiError::Config(format!("base url {base:?}: {e}")))?;
    url
      .path_segments_mut()
      .map_err(|()| ApiError::Config(format!("base url {base:?} cannot carry a path")))?
      .pop_if_empty()
      .extend(self.config.api_prefix.split('/').filter(|s| !s.is_empty()))
      .extend(segments);
    Ok(url)
  }

  /// Send one request and unwrap its envelope.
  ///
  /// Non-2xx responses and `success: false` envelopes both become errors
  /// carrying the server's message when it sent one. Nothing is retried.
  pub async fn request<T: DeserializeOwned>(
    &self,
    method: Method,
    segments: &[&str],
    body: Option<Payload>,
  ) -> Result<Envelope<T>, ApiError> {
    let url = self.url(segments)?;
    let path = url.path().to_string();
    debug!(%method, %path, "request");

    let mut req = self.client.request(method.clone(), url);
    if let Some(body) = body {
      req = attach(req, body).await?;
    }

    let resp = req.send().await?;
    let status = resp.status();
    let bytes = resp.bytes().await?;

    if !status.is_success() {
      let message = serde_json::from_slice::<Envelope<serde_json::Value>>(&bytes)
        .ok()
        .and_then(|env| env.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("{method} {path} failed with status {status}"));
      return Err(ApiError::Status { status: status.as_u16(), message });
    }

    let envelope: Envelope<T> =
      serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))?;
    if !envelope.success {
      return Err(ApiError::rejected(envelope.message));
    }
    Ok(envelope)
  }
}

// ─── Bodies ───────────────────────────────────────────────────────────────────

async fn attach(req: RequestBuilder, body: Payload) -> Result<RequestBuilder, ApiError> {
  match body {
    Payload::Json(value) => Ok(req.json(&value)),
    Payload::Multipart(parts) => {
      let mut form = multipart::Form::new();
      for Part { name, value } in parts {
        form = match value {
          PartValue::Text(text) => form.text(name, text),
          PartValue::File(path) => form.part(name, file_part(&path).await?),
        };
      }
      Ok(req.multipart(form))
    }
  }
}

async fn file_part(path: &Path) -> Result<multipart::Part, ApiError> {
  let bytes = tokio::fs::read(path)
    .await
    .map_err(|source| ApiError::File { path: path.to_path_buf(), source })?;
  let file_name = path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_else(|| "upload".to_string());
  Ok(multipart::Part::bytes(bytes).file_name(file_name))
}
