//! Errors surfaced by the HTTP adapter.

use std::path::PathBuf;

use thiserror::Error;

/// Shown when a failure carries no message of its own.
pub const GENERIC_MESSAGE: &str = "An error occurred";

#[derive(Debug, Error)]
pub enum ApiError {
  /// No response was received.
  #[error("{0}")]
  Transport(String),

  /// A non-2xx response.
  #[error("{message}")]
  Status { status: u16, message: String },

  /// A 2xx response whose envelope says `success: false`.
  #[error("{0}")]
  Rejected(String),

  /// A response that does not match the expected schema.
  #[error("invalid response: {0}")]
  Decode(String),

  #[error("cannot read {path}: {source}")]
  File {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid client configuration: {0}")]
  Config(String),
}

impl ApiError {
  pub fn rejected(message: Option<String>) -> Self {
    ApiError::Rejected(non_empty(message))
  }

  /// The message a notification should show.
  pub fn user_message(&self) -> String {
    let message = self.to_string();
    if message.trim().is_empty() { GENERIC_MESSAGE.to_string() } else { message }
  }
}

pub(crate) fn non_empty(message: Option<String>) -> String {
  message
    .filter(|m| !m.trim().is_empty())
    .unwrap_or_else(|| GENERIC_MESSAGE.to_string())
}

impl From<reqwest::Error> for ApiError {
  fn from(e: reqwest::Error) -> Self {
    if e.is_decode() {
      ApiError::Decode(e.to_string())
    } else if e.is_builder() {
      ApiError::Config(e.to_string())
    } else {
      ApiError::Transport(e.to_string())
    }
  }
}
