//! Student records, and the student reference other records carry.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
  date,
  draft::{FormDraft, ValidDraft},
  payload::Payload,
  resource::{CellValue, Column, Photo, RecordId, ReferenceOption, Resource},
  schema::{Check, FieldKind, FieldSpec, FormSchema},
};

pub const GENDERS: &[&str] = &["Male", "Female", "Other"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
  Male,
  Female,
  Other,
}

impl Gender {
  pub fn as_str(&self) -> &'static str {
    match self {
      Gender::Male => "Male",
      Gender::Female => "Female",
      Gender::Other => "Other",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
  pub street:      String,
  pub city:        String,
  pub state:       String,
  pub postal_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
  pub phone:   String,
  pub email:   String,
  pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guardian {
  pub name:         String,
  pub relationship: String,
  pub phone:        String,
  pub email:        String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
  #[serde(rename = "_id")]
  pub id:            RecordId,
  pub name:          String,
  #[serde(with = "date::wire")]
  pub date_of_birth: NaiveDate,
  pub gender:        Gender,
  #[serde(alias = "studentClass")]
  pub class:         String,
  pub contact_info:  ContactInfo,
  pub guardian:      Guardian,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub photo:         Option<Photo>,
}

impl Student {
  pub fn reference_option(&self) -> ReferenceOption {
    ReferenceOption { id: self.id.clone(), label: self.name.clone() }
  }
}

// ─── Reference ───────────────────────────────────────────────────────────────

/// The populated part of a referenced student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentSummary {
  #[serde(rename = "_id")]
  pub id:    RecordId,
  pub name:  String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub photo: Option<Photo>,
}

/// A student reference as the backend sends it: populated or a bare id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StudentRef {
  Populated(StudentSummary),
  Id(RecordId),
}

impl StudentRef {
  pub fn id(&self) -> &RecordId {
    match self {
      StudentRef::Populated(s) => &s.id,
      StudentRef::Id(id) => id,
    }
  }

  /// Display name; a bare reference shows its id.
  pub fn name(&self) -> &str {
    match self {
      StudentRef::Populated(s) => &s.name,
      StudentRef::Id(id) => id.as_str(),
    }
  }

  pub fn photo_cell(&self) -> CellValue {
    let url = match self {
      StudentRef::Populated(s) => s.photo.as_ref().and_then(|p| p.url.clone()),
      StudentRef::Id(_) => None,
    };
    CellValue::Photo { url, alt: self.name().to_string() }
  }
}

// ─── Resource ────────────────────────────────────────────────────────────────

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
      name:   "dateOfBirth",
      label:  "Date of Birth",
      kind:   FieldKind::Date,
      checks: &[
        Check::required("Please enter a valid date."),
        Check::date("Please enter a valid date."),
      ],
    },
    FieldSpec {
      name:   "gender",
      label:  "Gender",
      kind:   FieldKind::Select(GENDERS),
      checks: &[
        Check::required("Please select a gender."),
        Check::one_of(GENDERS, "Please select a gender."),
      ],
    },
    FieldSpec {
      name:   "class",
      label:  "Class",
      kind:   FieldKind::Text,
      checks: &[Check::required("Please enter a class.")],
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
      name:   "email",
      label:  "Email",
      kind:   FieldKind::Text,
      checks: &[
        Check::required("Please enter a valid email address."),
        Check::email("Please enter a valid email address."),
      ],
    },
    FieldSpec { name: "photo", label: "Photo", kind: FieldKind::File, checks: &[] },
    FieldSpec {
      name:   "street",
      label:  "Street Address",
      kind:   FieldKind::Text,
      checks: &[Check::required("Please enter a street address.")],
    },
    FieldSpec {
      name:   "city",
      label:  "City",
      kind:   FieldKind::Text,
      checks: &[Check::required("Please enter a city.")],
    },
    FieldSpec {
      name:   "state",
      label:  "State",
      kind:   FieldKind::Text,
      checks: &[Check::required("Please enter a state.")],
    },
    FieldSpec {
      name:   "postalCode",
      label:  "Postal Code",
      kind:   FieldKind::Text,
      checks: &[Check::required("Please enter a postal code.")],
    },
    FieldSpec {
      name:   "guardianName",
      label:  "Guardian Name",
      kind:   FieldKind::Text,
      checks: &[
        Check::required("Guardian name must be at least 2 characters."),
        Check::min_len(2, "Guardian name must be at least 2 characters."),
      ],
    },
    FieldSpec {
      name:   "guardianRelationship",
      label:  "Guardian Relationship",
      kind:   FieldKind::Text,
      checks: &[Check::required("Please enter the guardian's relationship.")],
    },
    FieldSpec {
      name:   "guardianPhone",
      label:  "Guardian Phone",
      kind:   FieldKind::Text,
      checks: &[
        Check::required("Guardian phone number must be at least 10 digits."),
        Check::min_len(10, "Guardian phone number must be at least 10 digits."),
      ],
    },
    FieldSpec {
      name:   "guardianEmail",
      label:  "Guardian Email",
      kind:   FieldKind::Text,
      checks: &[
        Check::required("Please enter a valid guardian email address."),
        Check::email("Please enter a valid guardian email address."),
      ],
    },
  ],
};

impl Resource for Student {
  const COLLECTION: &'static str = "students";
  const NOUN: &'static str = "Student";
  const TITLE: &'static str = "Student Management";
  const EMPTY_MESSAGE: &'static str = "No student data";
  const REFETCH_ON_EDIT: bool = true;

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
      Column { label: "Class", accessor: |s| CellValue::Text(s.class.clone()) },
      Column { label: "Gender", accessor: |s| CellValue::Text(s.gender.as_str().into()) },
      Column { label: "Date of Birth", accessor: |s| CellValue::Date(Some(s.date_of_birth)) },
      Column { label: "Phone", accessor: |s| CellValue::Text(s.contact_info.phone.clone()) },
      Column { label: "Guardian", accessor: |s| CellValue::Text(s.guardian.name.clone()) },
    ]
  }

  fn schema() -> &'static FormSchema {
    &SCHEMA
  }

  fn project(&self) -> FormDraft {
    let contact = &self.contact_info;
    let mut d = FormDraft::empty(&SCHEMA);
    d.set("name", &self.name);
    d.set_date("dateOfBirth", Some(self.date_of_birth));
    d.set("gender", self.gender.as_str());
    d.set("class", &self.class);
    d.set("phone", &contact.phone);
    d.set("email", &contact.email);
    d.set("street", &contact.address.street);
    d.set("city", &contact.address.city);
    d.set("state", &contact.address.state);
    d.set("postalCode", &contact.address.postal_code);
    d.set("guardianName", &self.guardian.name);
    d.set("guardianRelationship", &self.guardian.relationship);
    d.set("guardianPhone", &self.guardian.phone);
    d.set("guardianEmail", &self.guardian.email);
    d
  }

  fn payload(draft: &ValidDraft) -> Payload {
    let body = json!({
      "name": draft.get("name"),
      "email": draft.get("email"),
      "dateOfBirth": draft.date("dateOfBirth"),
      "gender": draft.get("gender"),
      "studentClass": draft.get("class"),
      "contactInfo": {
        "phone": draft.get("phone"),
        "email": draft.get("email"),
        "address": {
          "street": draft.get("street"),
          "city": draft.get("city"),
          "state": draft.get("state"),
          "postalCode": draft.get("postalCode"),
        },
      },
      "guardian": {
        "name": draft.get("guardianName"),
        "relationship": draft.get("guardianRelationship"),
        "phone": draft.get("guardianPhone"),
        "email": draft.get("guardianEmail"),
      },
    });
    let files = draft.file("photo").map(|p| ("photo", p)).into_iter().collect();
    Payload::build(body, files)
  }
}
