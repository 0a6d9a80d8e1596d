//! The `Resource` trait: everything a CRUD screen needs to know about one
//! record type.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
  draft::{FormDraft, ValidDraft},
  payload::Payload,
  role::Role,
  schema::FormSchema,
};

// ─── Identity ────────────────────────────────────────────────────────────────

/// Opaque backend identifier (`_id` on the wire). Never edited client-side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
  pub fn new(id: impl Into<String>) -> Self {
    Self(id.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for RecordId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for RecordId {
  fn from(s: &str) -> Self {
    Self(s.to_string())
  }
}

// ─── References ──────────────────────────────────────────────────────────────

/// A collection other records point into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceTarget {
  Students,
}

/// One choice for a reference field: the stored id plus what the user sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceOption {
  pub id:    RecordId,
  pub label: String,
}

/// A photo attached to a student or staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
  #[serde(default)]
  pub url: Option<String>,
}

// ─── Columns ─────────────────────────────────────────────────────────────────

/// Raw value of one table cell, before display formatting.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
  Text(String),
  Date(Option<NaiveDate>),
  /// A status badge; `settled` selects the success style.
  Status { text: String, settled: bool },
  Photo { url: Option<String>, alt: String },
}

/// A table column: header label plus accessor.
pub struct Column<R> {
  pub label:    &'static str,
  pub accessor: fn(&R) -> CellValue,
}

impl<R> Clone for Column<R> {
  fn clone(&self) -> Self {
    *self
  }
}

impl<R> Copy for Column<R> {}

impl<R> fmt::Debug for Column<R> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Column").field("label", &self.label).finish()
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// A record type managed by a CRUD screen.
pub trait Resource:
  Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
  /// Collection path segment: `GET /{COLLECTION}`, `PUT /{COLLECTION}/{id}`.
  const COLLECTION: &'static str;

  /// Singular noun used in notifications and dialog titles.
  const NOUN: &'static str;

  /// Screen title.
  const TITLE: &'static str;

  /// Text of the single row shown for an empty list.
  const EMPTY_MESSAGE: &'static str;

  /// Roles that may view the screen but are offered no mutating actions.
  const READ_ONLY: &'static [Role] = &[Role::Librarian];

  /// Re-fetch the record by id when its edit dialog opens.
  const REFETCH_ON_EDIT: bool = false;

  fn id(&self) -> &RecordId;

  fn columns() -> Vec<Column<Self>>;

  fn schema() -> &'static FormSchema;

  /// Project the record into edit-dialog inputs.
  fn project(&self) -> FormDraft;

  /// Request body for a validated draft.
  fn payload(draft: &ValidDraft) -> Payload;

  fn is_read_only(role: Role) -> bool {
    Self::READ_ONLY.contains(&role)
  }
}
