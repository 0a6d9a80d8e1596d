//! Fee records.

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

pub const FEE_STATUSES: &[&str] = &["Pending", "Paid"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FeeStatus {
  Pending,
  Paid,
  Other(String),
}

impl FeeStatus {
  pub fn as_str(&self) -> &str {
    match self {
      FeeStatus::Pending => "Pending",
      FeeStatus::Paid => "Paid",
      FeeStatus::Other(s) => s,
    }
  }
}

impl From<String> for FeeStatus {
  fn from(s: String) -> Self {
    match s.as_str() {
      "Pending" => FeeStatus::Pending,
      "Paid" => FeeStatus::Paid,
      _ => FeeStatus::Other(s),
    }
  }
}

impl From<FeeStatus> for String {
  fn from(s: FeeStatus) -> Self {
    s.as_str().to_string()
  }
}

impl fmt::Display for FeeStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeRecord {
  #[serde(rename = "_id")]
  pub id:        RecordId,
  pub student:   StudentRef,
  pub fee_type:  String,
  pub amount:    f64,
  #[serde(with = "date::wire")]
  pub due_date:  NaiveDate,
  #[serde(default, with = "date::wire::option")]
  pub paid_date: Option<NaiveDate>,
  pub status:    FeeStatus,
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
      name:   "feeType",
      label:  "Fee Type",
      kind:   FieldKind::Text,
      checks: &[
        Check::required("Fee type is required"),
        Check::min_len(2, "Fee type must be at least 2 characters long"),
      ],
    },
    FieldSpec {
      name:   "amount",
      label:  "Amount",
      kind:   FieldKind::Number,
      checks: &[Check::required("Amount is required"), Check::number("Amount must be a number")],
    },
    FieldSpec {
      name:   "dueDate",
      label:  "Due Date",
      kind:   FieldKind::Date,
      checks: &[
        Check::required("Due date is required"),
        Check::date("Please enter a valid date."),
      ],
    },
    FieldSpec {
      name:   "paidDate",
      label:  "Paid Date",
      kind:   FieldKind::Date,
      checks: &[Check::date("Please enter a valid date.")],
    },
    FieldSpec {
      name:   "status",
      label:  "Status",
      kind:   FieldKind::Select(FEE_STATUSES),
      checks: &[
        Check::required("Status is required"),
        Check::one_of(FEE_STATUSES, "Status is required"),
      ],
    },
  ],
};

impl Resource for FeeRecord {
  const COLLECTION: &'static str = "fees";
  const NOUN: &'static str = "Fee record";
  const TITLE: &'static str = "Fees Management";
  const EMPTY_MESSAGE: &'static str = "No fee records found";

  fn id(&self) -> &RecordId {
    &self.id
  }

  fn columns() -> Vec<Column<Self>> {
    vec![
      Column { label: "Student Name", accessor: |f| CellValue::Text(f.student.name().into()) },
      Column { label: "Fee Type", accessor: |f| CellValue::Text(f.fee_type.clone()) },
      Column { label: "Amount", accessor: |f| CellValue::Text(format!("{:.2}", f.amount)) },
      Column { label: "Due Date", accessor: |f| CellValue::Date(Some(f.due_date)) },
      Column { label: "Paid Date", accessor: |f| CellValue::Date(f.paid_date) },
      Column {
        label:    "Status",
        accessor: |f| CellValue::Status {
          text:    f.status.to_string(),
          settled: f.status == FeeStatus::Paid,
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
    d.set("feeType", &self.fee_type);
    d.set("amount", self.amount.to_string());
    d.set_date("dueDate", Some(self.due_date));
    d.set_date("paidDate", self.paid_date);
    d.set("status", self.status.as_str());
    d
  }

  fn payload(draft: &ValidDraft) -> Payload {
    Payload::build(
      json!({
        "student": draft.get("student"),
        "feeType": draft.get("feeType"),
        "amount": draft.number("amount"),
        "dueDate": draft.date("dueDate"),
        "paidDate": draft.date("paidDate"),
        "status": draft.get("status"),
      }),
      Vec::new(),
    )
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn amount_round_trips_through_the_draft() {
    let fee: FeeRecord = serde_json::from_value(json!({
      "_id": "f1",
      "student": "s1",
      "feeType": "Tuition",
      "amount": 1250.5,
      "dueDate": "2024-04-01T00:00:00Z",
      "status": "Pending"
    }))
    .unwrap();

    let draft = fee.project();
    assert_eq!(draft.get("amount"), "1250.5");
    let valid = FeeRecord::schema().validate(&draft).unwrap();
    let Payload::Json(body) = FeeRecord::payload(&valid) else { panic!("expected json") };
    assert_eq!(body["amount"], json!(1250.5));
    assert_eq!(body["paidDate"], json!(null));
  }

  #[test]
  fn non_numeric_amount_fails_validation() {
    let mut draft = FormDraft::empty(FeeRecord::schema());
    draft.set("student", "s1");
    draft.set("feeType", "Bus");
    draft.set("amount", "a lot");
    draft.set("dueDate", "2024-04-01");
    draft.set("status", "Paid");
    let errors = FeeRecord::schema().validate(&draft).unwrap_err();
    assert_eq!(errors.get("amount"), Some("Amount must be a number"));
  }
}
