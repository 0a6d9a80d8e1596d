//! Caller roles.
//!
//! A role only controls which actions a screen offers. The backend enforces
//! permissions on its own; nothing in the client treats the role as an
//! authorization boundary.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// The permission class of the signed-in user.
///
/// Deserializes through [`FromStr`], so config files and environment
/// variables accept the same spellings as the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Role {
  Admin,
  Staff,
  Librarian,
  Student,
}

impl Role {
  pub const ALL: [Role; 4] = [Role::Admin, Role::Staff, Role::Librarian, Role::Student];

  pub fn as_str(&self) -> &'static str {
    match self {
      Role::Admin => "admin",
      Role::Staff => "staff",
      Role::Librarian => "librarian",
      Role::Student => "student",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Role {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let wanted = s.trim().to_ascii_lowercase();
    Role::ALL
      .into_iter()
      .find(|r| r.as_str() == wanted)
      .ok_or_else(|| Error::UnknownRole(s.to_string()))
  }
}

impl TryFrom<String> for Role {
  type Error = Error;

  fn try_from(s: String) -> Result<Self, Self::Error> {
    s.parse()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_case_insensitively() {
    assert_eq!("Librarian".parse::<Role>().unwrap(), Role::Librarian);
    assert_eq!(" admin ".parse::<Role>().unwrap(), Role::Admin);
  }

  #[test]
  fn deserializes_like_it_parses() {
    let role: Role = serde_json::from_str("\"Librarian\"").unwrap();
    assert_eq!(role, Role::Librarian);
    assert!(serde_json::from_str::<Role>("\"janitor\"").is_err());
    assert_eq!(serde_json::to_string(&Role::Staff).unwrap(), "\"staff\"");
  }

  #[test]
  fn rejects_unknown_role() {
    assert!(matches!("janitor".parse::<Role>(), Err(Error::UnknownRole(_))));
  }
}
