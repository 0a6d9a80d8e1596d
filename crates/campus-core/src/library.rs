//! Library borrow/return records.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
  date,
  draft::{FormDraft, ValidDraft},
  payload::Payload,
  resource::{CellValue, Column, RecordId, ReferenceTarget, Resource},
  schema::{Check, FieldKind, FieldSpec, FormSchema},
  student::StudentRef,
};

pub const LOAN_STATUSES: &[&str] = &["Borrowed", "Returned"];

/// Loan status. Values the client does not know are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LoanStatus {
  Borrowed,
  Returned,
  Other(String),
}

impl LoanStatus {
  pub fn as_str(&self) -> &str {
    match self {
      LoanStatus::Borrowed => "Borrowed",
      LoanStatus::Returned => "Returned",
      LoanStatus::Other(s) => s,
    }
  }
}

impl From<String> for LoanStatus {
  fn from(s: String) -> Self {
    match s.as_str() {
      "Borrowed" => LoanStatus::Borrowed,
      "Returned" => LoanStatus::Returned,
      _ => LoanStatus::Other(s),
    }
  }
}

impl From<LoanStatus> for String {
  fn from(s: LoanStatus) -> Self {
    s.as_str().to_string()
  }
}

impl fmt::Display for LoanStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryRecord {
  #[serde(rename = "_id")]
  pub id:          RecordId,
  pub student:     StudentRef,
  pub book_name:   String,
  #[serde(with = "date::wire")]
  pub borrow_date: NaiveDate,
  #[serde(default, with = "date::wire::option")]
  pub return_date: Option<NaiveDate>,
  pub status:      LoanStatus,
}

static SCHEMA: FormSchema = FormSchema {
  fields: &[
    FieldSpec {
      name:   "student",
      label:  "Student",
      kind:   FieldKind::Reference(ReferenceTarget::Students),
      checks: &[Check::required("Student is required")],
    },
    FieldSpec {
      name:   "bookName",
      label:  "Book Name",
      kind:   FieldKind::Text,
      checks: &[
        Check::required("Book name is required"),
        Check::min_len(2, "Book name must be at least 2 characters long"),
      ],
    },
    FieldSpec {
      name:   "borrowDate",
      label:  "Borrow Date",
      kind:   FieldKind::Date,
      checks: &[
        Check::required("Borrow date is required"),
        Check::date("Please enter a valid date."),
      ],
    },
    FieldSpec {
      name:   "returnDate",
      label:  "Return Date",
      kind:   FieldKind::Date,
      checks: &[Check::date("Please enter a valid date.")],
    },
    FieldSpec {
      name:   "status",
      label:  "Status",
      kind:   FieldKind::Select(LOAN_STATUSES),
      checks: &[
        Check::required("Status is required"),
        Check::one_of(LOAN_STATUSES, "Status is required"),
      ],
    },
  ],
};

impl Resource for LibraryRecord {
  const COLLECTION: &'static str = "library";
  const NOUN: &'static str = "Library record";
  const TITLE: &'static str = "Library History Management";
  const EMPTY_MESSAGE: &'static str = "No library records found";

  fn id(&self) -> &RecordId {
    &self.id
  }

  fn columns() -> Vec<Column<Self>> {
    vec![
      Column { label: "Photo", accessor: |r| r.student.photo_cell() },
      Column { label: "Student Name", accessor: |r| CellValue::Text(r.student.name().into()) },
      Column { label: "Book Name", accessor: |r| CellValue::Text(r.book_name.clone()) },
      Column { label: "Borrow Date", accessor: |r| CellValue::Date(Some(r.borrow_date)) },
      Column { label: "Return Date", accessor: |r| CellValue::Date(r.return_date) },
      Column {
        label:    "Status",
        accessor: |r| CellValue::Status {
          text:    r.status.to_string(),
          settled: r.status == LoanStatus::Returned,
        },
      },
    ]
  }

  fn schema() -> &'static FormSchema {
    &SCHEMA
  }

  fn project(&self) -> FormDraft {
    let mut d = FormDraft::empty(&SCHEMA);
    d.set("student", self.student.id().as_str());
    d.set("bookName", &self.book_name);
    d.set_date("borrowDate", Some(self.borrow_date));
    d.set_date("returnDate", self.return_date);
    d.set("status", self.status.as_str());
    d
  }

  fn payload(draft: &ValidDraft) -> Payload {
    Payload::build(
      json!({
        "student": draft.get("student"),
        "bookName": draft.get("bookName"),
        "borrowDate": draft.date("borrowDate"),
        "returnDate": draft.date("returnDate"),
        "status": draft.get("status"),
      }),
      Vec::new(),
    )
  }
}
