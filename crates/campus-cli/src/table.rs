//! Resource table model.
//!
//! [`render`] turns a record snapshot into a [`TableView`]: header labels,
//! formatted cells, and whether the row actions are offered. The view knows
//! nothing about terminals; `ui::table` draws it and `campus list` prints it
//! with [`TableView::to_text`].

use campus_core::{
  date,
  resource::{CellValue, Column, RecordId, Resource},
  role::Role,
};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use unicode_width::UnicodeWidthStr;

/// Header of the trailing action column.
pub const ACTION_HEADER: &str = "Action";

// ─── View model ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
  Pending,
  Success,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
  Text(String),
  Badge { text: String, tone: Tone },
  Photo { url: Option<String>, alt: String },
}

impl Cell {
  fn from_value(value: CellValue) -> Self {
    match value {
      CellValue::Text(s) => Cell::Text(s),
      CellValue::Date(Some(d)) => Cell::Text(date::display(d)),
      CellValue::Date(None) => Cell::Text("-".into()),
      CellValue::Status { text, settled } => Cell::Badge {
        text,
        tone: if settled { Tone::Success } else { Tone::Pending },
      },
      CellValue::Photo { url, alt } => Cell::Photo { url, alt },
    }
  }

  /// Plain-text rendition.
  pub fn text(&self) -> String {
    match self {
      Cell::Text(s) => s.clone(),
      Cell::Badge { text, .. } => text.clone(),
      Cell::Photo { url: Some(_), .. } => "[photo]".into(),
      Cell::Photo { url: None, .. } => "-".into(),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
  Edit,
  Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
  pub id:    RecordId,
  pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
  Rows(Vec<Row>),
  /// A single informational row spanning `span` columns.
  Empty { message: String, span: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
  pub headers: Vec<&'static str>,
  pub body:    Body,
  /// Whether every row carries Edit/Delete.
  pub actions: bool,
}

impl TableView {
  pub fn rows(&self) -> &[Row] {
    match &self.body {
      Body::Rows(rows) => rows,
      Body::Empty { .. } => &[],
    }
  }

  /// Column-aligned plain text, one line per row, header first.
  pub fn to_text(&self) -> String {
    let lines: Vec<Vec<String>> = match &self.body {
      Body::Rows(rows) => rows
        .iter()
        .map(|r| {
          let mut line: Vec<String> = r.cells.iter().map(Cell::text).collect();
          if self.actions {
            line.push("Edit | Delete".into());
          }
          line
        })
        .collect(),
      Body::Empty { .. } => Vec::new(),
    };

    let mut widths: Vec<usize> = self.headers.iter().map(|h| h.width()).collect();
    for line in &lines {
      for (w, cell) in widths.iter_mut().zip(line) {
        *w = (*w).max(cell.width());
      }
    }

    let header: Vec<String> = self.headers.iter().map(|h| h.to_string()).collect();
    let mut out = join_padded(&header, &widths);
    out.push('\n');
    match &self.body {
      Body::Rows(_) => {
        for line in &lines {
          out.push_str(&join_padded(line, &widths));
          out.push('\n');
        }
      }
      Body::Empty { message, .. } => {
        out.push_str(message);
        out.push('\n');
      }
    }
    out
  }
}

fn join_padded(cells: &[String], widths: &[usize]) -> String {
  let mut line = String::new();
  for (i, (cell, w)) in cells.iter().zip(widths).enumerate() {
    if i > 0 {
      line.push_str("  ");
    }
    line.push_str(cell);
    if i + 1 < cells.len() {
      line.push_str(&" ".repeat(w.saturating_sub(cell.width())));
    }
  }
  line
}

// ─── Rendering ───────────────────────────────────────────────────────────────

/// Render `records` with `columns` for a viewer holding `role`.
///
/// The action column is a visibility gate only: it is present unless `role`
/// is one of the resource's read-only roles.
pub fn render<'a, R: Resource>(
  records: impl IntoIterator<Item = &'a R>,
  role: Role,
  columns: &[Column<R>],
) -> TableView {
  let actions = !R::is_read_only(role);
  let mut headers: Vec<&'static str> = columns.iter().map(|c| c.label).collect();
  if actions {
    headers.push(ACTION_HEADER);
  }

  let rows: Vec<Row> = records
    .into_iter()
    .map(|record| Row {
      id:    record.id().clone(),
      cells: columns.iter().map(|c| Cell::from_value((c.accessor)(record))).collect(),
    })
    .collect();

  let body = if rows.is_empty() {
    Body::Empty { message: R::EMPTY_MESSAGE.to_string(), span: headers.len() }
  } else {
    Body::Rows(rows)
  };
  TableView { headers, body, actions }
}

/// What a row action hands back: Edit carries the full record, Delete only
/// its identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum TableAction<R> {
  Edit(R),
  Delete(RecordId),
}

/// Resolve an action triggered on the row for `id`.
pub fn trigger<R: Resource>(records: &[R], id: &RecordId, kind: ActionKind) -> Option<TableAction<R>> {
  let record = records.iter().find(|r| r.id() == id)?;
  Some(match kind {
    ActionKind::Edit => TableAction::Edit(record.clone()),
    ActionKind::Delete => TableAction::Delete(record.id().clone()),
  })
}

/// Records whose rendered cells fuzzy-match `query`. An empty query keeps
/// everything.
pub fn filter<'a, R: Resource>(records: &'a [R], columns: &[Column<R>], query: &str) -> Vec<&'a R> {
  if query.is_empty() {
    return records.iter().collect();
  }
  let matcher = SkimMatcherV2::default();
  records
    .iter()
    .filter(|record| {
      let haystack = columns
        .iter()
        .map(|c| Cell::from_value((c.accessor)(record)).text())
        .collect::<Vec<_>>()
        .join(" ");
      matcher.fuzzy_match(&haystack, query).is_some()
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use campus_core::{fee::FeeRecord, library::LibraryRecord};
  use serde_json::json;

  use super::*;

  fn loan(id: &str, status: &str, returned: Option<&str>) -> LibraryRecord {
    serde_json::from_value(json!({
      "_id": id,
      "student": { "_id": "s1", "name": "Ada" },
      "bookName": "Emma",
      "borrowDate": "2024-03-05T00:00:00Z",
      "returnDate": returned,
      "status": status
    }))
    .unwrap()
  }

  fn status_cell(view: &TableView) -> &Cell {
    &view.rows()[0].cells[5]
  }

  #[test]
  fn settled_status_gets_success_badge() {
    let cols = LibraryRecord::columns();
    let returned = [loan("l1", "Returned", Some("2024-03-20"))];
    let view = render(&returned, Role::Admin, &cols);
    assert_eq!(status_cell(&view), &Cell::Badge { text: "Returned".into(), tone: Tone::Success });

    let borrowed = [loan("l1", "Borrowed", None)];
    let view = render(&borrowed, Role::Admin, &cols);
    assert_eq!(status_cell(&view), &Cell::Badge { text: "Borrowed".into(), tone: Tone::Pending });

    let odd = [loan("l1", "Lost", None)];
    let view = render(&odd, Role::Admin, &cols);
    assert!(matches!(status_cell(&view), Cell::Badge { tone: Tone::Pending, .. }));
  }

  #[test]
  fn read_only_role_gets_no_action_column() {
    let cols = LibraryRecord::columns();
    let records = [loan("l1", "Borrowed", None)];
    let view = render(&records, Role::Librarian, &cols);
    assert!(!view.actions);
    assert!(!view.headers.contains(&ACTION_HEADER));

    let view = render(&records, Role::Admin, &cols);
    assert!(view.actions);
    assert_eq!(view.headers.last(), Some(&ACTION_HEADER));
  }

  #[test]
  fn empty_list_is_one_row_spanning_every_column() {
    let cols = FeeRecord::columns();
    let view = render(&[] as &[FeeRecord], Role::Admin, &cols);
    assert_eq!(view.body, Body::Empty { message: "No fee records found".into(), span: 7 });

    let view = render(&[] as &[FeeRecord], Role::Librarian, &cols);
    assert_eq!(view.body, Body::Empty { message: "No fee records found".into(), span: 6 });
  }

  #[test]
  fn dates_are_day_first_and_missing_dates_dash() {
    let cols = LibraryRecord::columns();
    let records = [loan("l1", "Borrowed", None)];
    let view = render(&records, Role::Admin, &cols);
    let cells = &view.rows()[0].cells;
    assert_eq!(cells[3], Cell::Text("05-03-2024".into()));
    assert_eq!(cells[4], Cell::Text("-".into()));
  }

  #[test]
  fn actions_hand_back_record_or_id() {
    let records = [loan("l1", "Borrowed", None), loan("l2", "Returned", Some("2024-03-07"))];
    let id = RecordId::from("l2");
    assert_eq!(
      trigger(&records, &id, ActionKind::Edit),
      Some(TableAction::Edit(records[1].clone()))
    );
    assert_eq!(trigger(&records, &id, ActionKind::Delete), Some(TableAction::Delete(id)));
    assert_eq!(trigger(&records, &RecordId::from("zz"), ActionKind::Edit), None);
  }

  #[test]
  fn filter_matches_rendered_text() {
    let cols = LibraryRecord::columns();
    let records = [loan("l1", "Borrowed", None), loan("l2", "Returned", Some("2024-03-07"))];
    assert_eq!(filter(&records, &cols, "").len(), 2);
    let hits = filter(&records, &cols, "returned");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id.as_str(), "l2");
    assert!(filter(&records, &cols, "qqqqxz").is_empty());
  }

  #[test]
  fn text_output_aligns_columns() {
    let cols = LibraryRecord::columns();
    let records = [loan("l1", "Borrowed", None)];
    let text = render(&records, Role::Librarian, &cols).to_text();
    let mut lines = text.lines();
    assert!(lines.next().unwrap().starts_with("Photo"));
    let row = lines.next().unwrap();
    assert!(row.contains("Ada"));
    assert!(row.contains("05-03-2024"));
    assert!(row.ends_with("Borrowed"));
  }
}
