//! The `{ success, data?, message? }` wrapper every backend response uses.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
  #[serde(default)]
  pub success: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub data:    Option<T>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
}

impl<T> Envelope<T> {
  pub fn ok(data: T) -> Self {
    Self { success: true, data: Some(data), message: None }
  }

  pub fn done(message: impl Into<String>) -> Self {
    Self { success: true, data: None, message: Some(message.into()) }
  }

  pub fn failed(message: impl Into<String>) -> Self {
    Self { success: false, data: None, message: Some(message.into()) }
  }

  pub fn with_message(mut self, message: impl Into<String>) -> Self {
    self.message = Some(message.into());
    self
  }
}

#[cfg(test)]
mod tests {
  use serde_json::{Value, json};

  use super::*;

  #[test]
  fn missing_success_reads_as_failure() {
    let env: Envelope<Value> = serde_json::from_value(json!({ "message": "nope" })).unwrap();
    assert!(!env.success);
    assert_eq!(env.message.as_deref(), Some("nope"));
    assert!(env.data.is_none());
  }

  #[test]
  fn data_is_optional_on_success() {
    let env: Envelope<Vec<Value>> =
      serde_json::from_value(json!({ "success": true, "message": "Deleted" })).unwrap();
    assert!(env.success);
    assert!(env.data.is_none());
  }
}
