//! Record form: the editable state behind an add/edit dialog.

use std::collections::HashMap;

use campus_core::{
  draft::{FormDraft, ValidDraft},
  resource::{ReferenceOption, ReferenceTarget},
  schema::{FieldErrors, FieldKind, FieldSpec, FormSchema},
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key press asks the owning screen to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
  None,
  Submit,
  Cancel,
}

#[derive(Debug, Clone)]
pub struct RecordForm {
  schema:     &'static FormSchema,
  pub draft:  FormDraft,
  pub errors: FieldErrors,
  /// Index of the focused field in `schema.fields`.
  pub focus:  usize,
  references: HashMap<ReferenceTarget, Vec<ReferenceOption>>,
  /// The draft the form was opened with.
  loaded:     FormDraft,
}

impl RecordForm {
  /// A form with every field blank.
  pub fn new(schema: &'static FormSchema) -> Self {
    Self::with_draft(schema, FormDraft::empty(schema))
  }

  pub fn with_draft(schema: &'static FormSchema, draft: FormDraft) -> Self {
    Self {
      schema,
      loaded: draft.clone(),
      draft,
      errors: FieldErrors::default(),
      focus: 0,
      references: HashMap::new(),
    }
  }

  /// Whether the draft still equals the one the form was opened with.
  pub fn is_untouched(&self) -> bool {
    self.draft == self.loaded
  }

  /// Replace an untouched draft with a fresher one and clear its errors.
  /// Returns `false`, changing nothing, once the user has edited the draft.
  pub fn reload(&mut self, draft: FormDraft) -> bool {
    if !self.is_untouched() {
      return false;
    }
    self.loaded = draft.clone();
    self.draft = draft;
    self.errors = FieldErrors::default();
    true
  }

  pub fn schema(&self) -> &'static FormSchema {
    self.schema
  }

  /// Options may arrive after the dialog is open; the next render picks
  /// them up.
  pub fn set_references(&mut self, target: ReferenceTarget, options: Vec<ReferenceOption>) {
    self.references.insert(target, options);
  }

  pub fn references(&self, target: ReferenceTarget) -> &[ReferenceOption] {
    self.references.get(&target).map(Vec::as_slice).unwrap_or_default()
  }

  pub fn focused(&self) -> &'static FieldSpec {
    &self.schema.fields[self.focus]
  }

  /// `(value, label)` choices for a select or reference field.
  pub fn choices(&self, field: &FieldSpec) -> Vec<(String, String)> {
    match field.kind {
      FieldKind::Select(values) => values.iter().map(|v| (v.to_string(), v.to_string())).collect(),
      FieldKind::Reference(target) => self
        .references(target)
        .iter()
        .map(|o| (o.id.to_string(), o.label.clone()))
        .collect(),
      _ => Vec::new(),
    }
  }

  /// What the dialog shows for `field`: the label of a chosen reference,
  /// the raw input otherwise.
  pub fn display_value(&self, field: &FieldSpec) -> String {
    let raw = self.draft.get(field.name);
    if let FieldKind::Reference(target) = field.kind
      && let Some(option) = self.references(target).iter().find(|o| o.id.as_str() == raw)
    {
      return option.label.clone();
    }
    raw.to_string()
  }

  // ── Editing ───────────────────────────────────────────────────────────────

  pub fn next_field(&mut self) {
    self.focus = (self.focus + 1) % self.schema.fields.len();
  }

  pub fn prev_field(&mut self) {
    let n = self.schema.fields.len();
    self.focus = (self.focus + n - 1) % n;
  }

  fn is_typed(field: &FieldSpec) -> bool {
    !matches!(field.kind, FieldKind::Select(_) | FieldKind::Reference(_))
  }

  pub fn insert_char(&mut self, c: char) {
    let field = self.focused();
    if Self::is_typed(field) {
      let mut value = self.draft.get(field.name).to_string();
      value.push(c);
      self.draft.set(field.name, value);
    }
  }

  pub fn backspace(&mut self) {
    let field = self.focused();
    let mut value = self.draft.get(field.name).to_string();
    if Self::is_typed(field) {
      value.pop();
    } else {
      value.clear();
    }
    self.draft.set(field.name, value);
  }

  /// Step the focused select/reference field through its choices.
  pub fn cycle(&mut self, forward: bool) {
    let field = self.focused();
    let choices = self.choices(field);
    if choices.is_empty() {
      return;
    }
    let current = self.draft.get(field.name);
    let n = choices.len();
    let next = match choices.iter().position(|(v, _)| v == current) {
      Some(i) if forward => (i + 1) % n,
      Some(i) => (i + n - 1) % n,
      None if forward => 0,
      None => n - 1,
    };
    self.draft.set(field.name, choices[next].0.clone());
  }

  /// Validate the draft, recording field errors on failure.
  pub fn validate(&mut self) -> Option<ValidDraft> {
    match self.schema.validate(&self.draft) {
      Ok(valid) => {
        self.errors = FieldErrors::default();
        Some(valid)
      }
      Err(errors) => {
        self.errors = errors;
        None
      }
    }
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> FormAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
      KeyCode::Char('s') if ctrl => return FormAction::Submit,
      KeyCode::Esc => return FormAction::Cancel,
      KeyCode::Tab | KeyCode::Down => self.next_field(),
      KeyCode::BackTab | KeyCode::Up => self.prev_field(),
      KeyCode::Left => self.cycle(false),
      KeyCode::Right => self.cycle(true),
      KeyCode::Backspace => self.backspace(),
      KeyCode::Char(c) if !ctrl => self.insert_char(c),
      _ => {}
    }
    FormAction::None
  }
}

#[cfg(test)]
mod tests {
  use campus_core::{library::LibraryRecord, resource::Resource};

  use super::*;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn type_str(form: &mut RecordForm, s: &str) {
    for c in s.chars() {
      form.handle_key(key(KeyCode::Char(c)));
    }
  }

  fn students() -> Vec<ReferenceOption> {
    vec![
      ReferenceOption { id: "s1".into(), label: "Ada".into() },
      ReferenceOption { id: "s2".into(), label: "Grace".into() },
    ]
  }

  #[test]
  fn reference_options_can_arrive_late() {
    let mut form = RecordForm::new(LibraryRecord::schema());
    form.draft.set("student", "s2");
    let field = form.focused();
    assert_eq!(field.name, "student");
    assert_eq!(form.display_value(field), "s2");

    form.set_references(ReferenceTarget::Students, students());
    assert_eq!(form.display_value(field), "Grace");
  }

  #[test]
  fn cycling_walks_choices_and_wraps() {
    let mut form = RecordForm::new(LibraryRecord::schema());
    form.set_references(ReferenceTarget::Students, students());
    form.handle_key(key(KeyCode::Right));
    assert_eq!(form.draft.get("student"), "s1");
    form.handle_key(key(KeyCode::Right));
    form.handle_key(key(KeyCode::Right));
    assert_eq!(form.draft.get("student"), "s1");
    form.handle_key(key(KeyCode::Left));
    assert_eq!(form.draft.get("student"), "s2");
  }

  #[test]
  fn typing_edits_text_fields_only() {
    let mut form = RecordForm::new(LibraryRecord::schema());
    type_str(&mut form, "abc");
    assert_eq!(form.draft.get("student"), "");

    form.handle_key(key(KeyCode::Tab));
    type_str(&mut form, "Emmaa");
    form.handle_key(key(KeyCode::Backspace));
    assert_eq!(form.draft.get("bookName"), "Emma");
  }

  #[test]
  fn failed_validation_records_errors() {
    let mut form = RecordForm::new(LibraryRecord::schema());
    assert!(form.validate().is_none());
    assert_eq!(form.errors.get("student"), Some("Student is required"));
    assert_eq!(form.errors.get("bookName"), Some("Book name is required"));
  }

  #[test]
  fn ctrl_s_submits_and_esc_cancels() {
    let mut form = RecordForm::new(LibraryRecord::schema());
    let submit = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
    assert_eq!(form.handle_key(submit), FormAction::Submit);
    assert_eq!(form.handle_key(key(KeyCode::Esc)), FormAction::Cancel);
    assert_eq!(form.draft.get("bookName"), "");
  }

  #[test]
  fn reload_only_replaces_an_untouched_draft() {
    let mut form = RecordForm::new(LibraryRecord::schema());
    assert!(form.validate().is_none());

    let mut fresh = FormDraft::empty(LibraryRecord::schema());
    fresh.set("bookName", "Emma");
    assert!(form.reload(fresh.clone()));
    assert_eq!(form.draft.get("bookName"), "Emma");
    assert_eq!(form.errors, FieldErrors::default());
    assert!(form.is_untouched());

    form.draft.set("bookName", "Emma, vol. 2");
    fresh.set("bookName", "Persuasion");
    assert!(!form.reload(fresh));
    assert_eq!(form.draft.get("bookName"), "Emma, vol. 2");
  }

  #[test]
  fn focus_wraps_both_ways() {
    let mut form = RecordForm::new(LibraryRecord::schema());
    form.prev_field();
    assert_eq!(form.focused().name, "status");
    form.next_field();
    assert_eq!(form.focused().name, "student");
  }
}
