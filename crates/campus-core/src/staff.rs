//! Staff members.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
  date,
  draft::{FormDraft, ValidDraft},
  payload::Payload,
  resource::{CellValue, Column, Photo, RecordId, Resource},
  role::Role,
  schema::{Check, FieldKind, FieldSpec, FormSchema},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
  #[serde(rename = "_id")]
  pub id:           RecordId,
  pub name:         String,
  pub email:        String,
  pub phone:        String,
  pub designation:  String,
  #[serde(with = "date::wire")]
  pub joining_date: NaiveDate,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub photo:        Option<Photo>,
}

static SCHEMA: FormSchema = FormSchema {
  fields: &[
    FieldSpec {
      name:   "name",
      label:  "Full Name",
      kind:   FieldKind::Text,
      checks: &[
        Check::required("Name must be at least 2 characters."),
        Check::min_len(2, "Name must be at least 2 characters."),
      ],
    },
    FieldSpec {
      name:   "email",
      label:  "Email",
      kind:   FieldKind::Text,
      checks: &[
        Check::required("Please enter a valid email address."),
        Check::email("Please enter a valid email address."),
      ],
    },
    FieldSpec {
      name:   "phone",
      label:  "Phone Number",
      kind:   FieldKind::Text,
      checks: &[
        Check::required("Phone number must be at least 10 digits."),
        Check::min_len(10, "Phone number must be at least 10 digits."),
      ],
    },
    FieldSpec {
      name:   "designation",
      label:  "Designation",
      kind:   FieldKind::Text,
      checks: &[Check::required("Please enter a designation.")],
    },
    FieldSpec {
      name:   "joiningDate",
      label:  "Joining Date",
      kind:   FieldKind::Date,
      checks: &[
        Check::required("Please enter a valid date."),
        Check::date("Please enter a valid date."),
      ],
    },
    FieldSpec { name: "photo", label: "Photo", kind: FieldKind::File, checks: &[] },
  ],
};

impl Resource for StaffMember {
  const COLLECTION: &'static str = "staff";
  const NOUN: &'static str = "Staff member";
  const TITLE: &'static str = "Staff Management";
  const EMPTY_MESSAGE: &'static str = "No staff data";
  const READ_ONLY: &'static [Role] = &[Role::Librarian, Role::Staff];

  fn id(&self) -> &RecordId {
    &self.id
  }

  fn columns() -> Vec<Column<Self>> {
    vec![
      Column {
        label:    "Photo",
        accessor: |s| CellValue::Photo {
          url: s.photo.as_ref().and_then(|p| p.url.clone()),
          alt: s.name.clone(),
        },
      },
      Column { label: "Name", accessor: |s| CellValue::Text(s.name.clone()) },
      Column { label: "Email", accessor: |s| CellValue::Text(s.email.clone()) },
      Column { label: "Phone", accessor: |s| CellValue::Text(s.phone.clone()) },
      Column { label: "Designation", accessor: |s| CellValue::Text(s.designation.clone()) },
      Column { label: "Joining Date", accessor: |s| CellValue::Date(Some(s.joining_date)) },
    ]
  }

  fn schema() -> &'static FormSchema {
    &SCHEMA
  }

  fn project(&self) -> FormDraft {
    let mut d = FormDraft::empty(&SCHEMA);
    d.set("name", &self.name);
    d.set("email", &self.email);
    d.set("phone", &self.phone);
    d.set("designation", &self.designation);
    d.set_date("joiningDate", Some(self.joining_date));
    d
  }

  fn payload(draft: &ValidDraft) -> Payload {
    let files = draft.file("photo").map(|p| ("photo", p)).into_iter().collect();
    Payload::build(
      json!({
        "name": draft.get("name"),
        "email": draft.get("email"),
        "phone": draft.get("phone"),
        "designation": draft.get("designation"),
        "joiningDate": draft.date("joiningDate"),
      }),
      files,
    )
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn photo_switches_the_body_to_multipart() {
    let member: StaffMember = serde_json::from_value(json!({
      "_id": "t1",
      "name": "Grace Hopper",
      "email": "grace@example.com",
      "phone": "5550001111",
      "designation": "Teacher",
      "joiningDate": "2019-08-01T00:00:00.000Z"
    }))
    .unwrap();

    let mut draft = member.project();
    let valid = StaffMember::schema().validate(&draft).unwrap();
    assert!(!StaffMember::payload(&valid).is_multipart());

    draft.set("photo", "grace.jpg");
    let valid = StaffMember::schema().validate(&draft).unwrap();
    let payload = StaffMember::payload(&valid);
    assert!(payload.is_multipart());
    assert_eq!(payload.text_part("joiningDate"), Some("2019-08-01"));
  }

  #[test]
  fn staff_role_is_read_only_here() {
    assert!(StaffMember::is_read_only(Role::Staff));
    assert!(!StaffMember::is_read_only(Role::Admin));
  }
}
