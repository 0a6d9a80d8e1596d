//! Calendar dates as they travel between the backend, the table, and the
//! form inputs.
//!
//! The backend sends timestamps (`2024-03-05T00:00:00.000Z`) or bare dates.
//! Tables show `DD-MM-YYYY`; date inputs hold `YYYY-MM-DD`. Only the
//! calendar date of a timestamp is kept, as written in its own offset.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::{Error, Result};

/// Format used by read-only table cells.
pub const DISPLAY_FORMAT: &str = "%d-%m-%Y";

/// Format used by date inputs and request bodies.
pub const INPUT_FORMAT: &str = "%Y-%m-%d";

/// Parse a date from a backend payload.
pub fn parse_wire(raw: &str) -> Result<NaiveDate> {
  let s = raw.trim();
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Ok(dt.date_naive());
  }
  if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
    return Ok(dt.date());
  }
  if let Ok(d) = NaiveDate::parse_from_str(s, INPUT_FORMAT) {
    return Ok(d);
  }
  // Anything else with a leading date part, e.g. a space-separated time.
  s.get(..10)
    .and_then(|head| NaiveDate::parse_from_str(head, INPUT_FORMAT).ok())
    .ok_or_else(|| Error::InvalidDate(raw.to_string()))
}

/// Parse the strict `YYYY-MM-DD` value held by a date input.
pub fn parse_input(raw: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(raw.trim(), INPUT_FORMAT)
    .map_err(|_| Error::InvalidDate(raw.to_string()))
}

pub fn display(date: NaiveDate) -> String {
  date.format(DISPLAY_FORMAT).to_string()
}

pub fn input(date: NaiveDate) -> String {
  date.format(INPUT_FORMAT).to_string()
}

// ─── Serde adapters ──────────────────────────────────────────────────────────

/// `#[serde(with = "campus_core::date::wire")]` for required date fields.
pub mod wire {
  use chrono::NaiveDate;
  use serde::{Deserialize, Deserializer, Serializer, de};

  pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&super::input(*date))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(d)?;
    super::parse_wire(&raw).map_err(de::Error::custom)
  }

  /// Optional dates: `null`, a missing key, and `""` all mean "no date".
  pub mod option {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(
      date: &Option<NaiveDate>,
      s: S,
    ) -> Result<S::Ok, S::Error> {
      match date {
        Some(d) => s.serialize_str(&super::super::input(*d)),
        None => s.serialize_none(),
      }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
      d: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
      match Option::<String>::deserialize(d)? {
        Some(raw) if !raw.trim().is_empty() => super::super::parse_wire(&raw)
          .map(Some)
          .map_err(de::Error::custom),
        _ => Ok(None),
      }
    }
  }
}
