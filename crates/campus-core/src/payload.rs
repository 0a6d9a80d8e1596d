//! Request bodies for create/update calls.
//!
//! Simple resources go out as JSON. As soon as a body carries a file or a
//! nested object it goes out as multipart form data instead: files become
//! file parts read from disk at send time, nested objects are
//! JSON-stringified into their own text part, and scalars become text parts.

use std::path::PathBuf;

use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
  Json(Value),
  Multipart(Vec<Part>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
  pub name:  String,
  pub value: PartValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartValue {
  Text(String),
  /// Path of a local file, read only when the request is sent.
  File(PathBuf),
}

impl Payload {
  /// Build a body from a JSON object plus any file fields.
  pub fn build(body: Value, files: Vec<(&str, PathBuf)>) -> Self {
    let fields: Map<String, Value> = match body {
      Value::Object(fields) => fields,
      other => return Payload::Json(other),
    };
    let nested = fields.values().any(|v| v.is_object() || v.is_array());
    if files.is_empty() && !nested {
      return Payload::Json(Value::Object(fields));
    }

    let mut parts: Vec<Part> = fields
      .into_iter()
      .filter_map(|(name, value)| {
        let text = match value {
          Value::Null => return None,
          Value::String(s) => s,
          other => other.to_string(),
        };
        Some(Part { name, value: PartValue::Text(text) })
      })
      .collect();
    parts.extend(files.into_iter().map(|(name, path)| Part {
      name:  name.to_string(),
      value: PartValue::File(path),
    }));
    Payload::Multipart(parts)
  }

  pub fn is_multipart(&self) -> bool {
    matches!(self, Payload::Multipart(_))
  }

  /// The text part called `name`, if any.
  pub fn text_part(&self, name: &str) -> Option<&str> {
    match self {
      Payload::Json(_) => None,
      Payload::Multipart(parts) => parts.iter().find_map(|p| match &p.value {
        PartValue::Text(t) if p.name == name => Some(t.as_str()),
        _ => None,
      }),
    }
  }
}
