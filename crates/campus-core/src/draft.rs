//! Form drafts: the edit buffer behind an open dialog.
//!
//! A [`FormDraft`] holds raw input strings keyed by field name. It never
//! reaches the network directly: [`FormSchema::validate`] turns it into a
//! [`ValidDraft`], and only a valid draft can be turned into a request body.
//!
//! [`FormSchema::validate`]: crate::schema::FormSchema::validate

use std::{collections::BTreeMap, path::PathBuf};

use chrono::NaiveDate;

use crate::{date, schema::FormSchema};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormDraft {
  values: BTreeMap<&'static str, String>,
}

impl FormDraft {
  /// A draft with every schema field present and blank.
  pub fn empty(schema: &FormSchema) -> Self {
    let values = schema.fields.iter().map(|f| (f.name, String::new())).collect();
    Self { values }
  }

  /// The current input for `field`, or `""` if it was never set.
  pub fn get(&self, field: &str) -> &str {
    self.values.get(field).map(String::as_str).unwrap_or_default()
  }

  pub fn set(&mut self, field: &'static str, value: impl Into<String>) {
    self.values.insert(field, value.into());
  }

  /// Set a date input from a parsed date; `None` leaves the input blank.
  pub fn set_date(&mut self, field: &'static str, value: Option<NaiveDate>) {
    self.set(field, value.map(date::input).unwrap_or_default());
  }
}

/// A draft that has passed its schema. Only [`FormSchema::validate`] builds
/// one.
///
/// [`FormSchema::validate`]: crate::schema::FormSchema::validate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidDraft(FormDraft);

impl ValidDraft {
  pub(crate) fn new(draft: FormDraft) -> Self {
    Self(draft)
  }

  /// Trimmed input for `field`.
  pub fn get(&self, field: &str) -> &str {
    self.0.get(field).trim()
  }

  /// Trimmed input, `None` when blank.
  pub fn text(&self, field: &str) -> Option<&str> {
    Some(self.get(field)).filter(|v| !v.is_empty())
  }

  /// The date input re-encoded as `YYYY-MM-DD`, `None` when blank.
  pub fn date(&self, field: &str) -> Option<String> {
    self
      .text(field)
      .and_then(|v| date::parse_input(v).ok())
      .map(date::input)
  }

  pub fn number(&self, field: &str) -> Option<f64> {
    self.text(field).and_then(|v| v.parse().ok())
  }

  pub fn file(&self, field: &str) -> Option<PathBuf> {
    self.text(field).map(PathBuf::from)
  }
}
