//! Declarative form schemas and the validator that runs them.
//!
//! Every resource describes its dialog as a static [`FormSchema`]: an ordered
//! list of fields, each with a kind and a list of [`Check`]s. Validation is
//! purely local and always runs before any request is built.

use std::{collections::BTreeMap, sync::LazyLock};

use regex::Regex;

use crate::{
  date,
  draft::{FormDraft, ValidDraft},
  resource::ReferenceTarget,
};

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

// ─── Field description ───────────────────────────────────────────────────────

/// What kind of input a field is edited with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
  Text,
  /// `YYYY-MM-DD` input.
  Date,
  Number,
  /// One of a fixed list of values.
  Select(&'static [&'static str]),
  /// The identifier of another record, picked from side-loaded options.
  Reference(ReferenceTarget),
  /// A local file path, uploaded as a multipart file part.
  File,
}

/// A single validation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
  Required,
  /// Minimum length in characters, after trimming.
  MinLen(usize),
  Date,
  Email,
  OneOf(&'static [&'static str]),
  Number,
}

/// A rule paired with the message shown when it fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Check {
  pub rule:    Rule,
  pub message: &'static str,
}

impl Check {
  pub const fn required(message: &'static str) -> Self {
    Self { rule: Rule::Required, message }
  }

  pub const fn min_len(n: usize, message: &'static str) -> Self {
    Self { rule: Rule::MinLen(n), message }
  }

  pub const fn date(message: &'static str) -> Self {
    Self { rule: Rule::Date, message }
  }

  pub const fn email(message: &'static str) -> Self {
    Self { rule: Rule::Email, message }
  }

  pub const fn one_of(values: &'static [&'static str], message: &'static str) -> Self {
    Self { rule: Rule::OneOf(values), message }
  }

  pub const fn number(message: &'static str) -> Self {
    Self { rule: Rule::Number, message }
  }

  fn passes(&self, value: &str) -> bool {
    let v = value.trim();
    match self.rule {
      Rule::Required => !v.is_empty(),
      Rule::MinLen(n) => v.chars().count() >= n,
      Rule::Date => date::parse_input(v).is_ok(),
      Rule::Email => EMAIL.is_match(v),
      Rule::OneOf(values) => values.contains(&v),
      Rule::Number => v.parse::<f64>().is_ok_and(f64::is_finite),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
  /// Draft key; also the request field name unless the resource remaps it.
  pub name:   &'static str,
  pub label:  &'static str,
  pub kind:   FieldKind,
  pub checks: &'static [Check],
}

impl FieldSpec {
  pub fn is_required(&self) -> bool {
    self.checks.iter().any(|c| c.rule == Rule::Required)
  }
}

// ─── Schema ──────────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
pub struct FormSchema {
  pub fields: &'static [FieldSpec],
}

impl FormSchema {
  pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
    self.fields.iter().find(|f| f.name == name)
  }

  /// The reference collections the form needs options from.
  pub fn references(&self) -> Vec<ReferenceTarget> {
    let mut targets = Vec::new();
    for field in self.fields {
      if let FieldKind::Reference(t) = field.kind
        && !targets.contains(&t)
      {
        targets.push(t);
      }
    }
    targets
  }

  /// Run every check against `draft`.
  ///
  /// Optional fields left blank skip their remaining checks. Each failing
  /// field reports the message of its first failing check.
  pub fn validate(&self, draft: &FormDraft) -> Result<ValidDraft, FieldErrors> {
    let mut errors = FieldErrors::default();
    for field in self.fields {
      let value = draft.get(field.name);
      if value.trim().is_empty() && !field.is_required() {
        continue;
      }
      if let Some(failed) = field.checks.iter().find(|c| !c.passes(value)) {
        errors.insert(field.name, failed.message);
      }
    }
    if errors.is_empty() {
      Ok(ValidDraft::new(draft.clone()))
    } else {
      Err(errors)
    }
  }
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Per-field validation messages, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
  pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
    self.0.insert(field, message.into());
  }

  pub fn get(&self, field: &str) -> Option<&str> {
    self.0.get(field).map(String::as_str)
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
    self.0.iter().map(|(k, v)| (*k, v.as_str()))
  }
}
