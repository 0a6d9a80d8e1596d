//! Screen controller tests against an in-memory backend.

use std::{
  collections::HashMap,
  sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
  },
  time::Duration,
};

use campus_client::{Ack, ApiError, ListSnapshot, ReferenceLookup, ResourceBackend};
use campus_core::{
  library::LibraryRecord,
  payload::{PartValue, Payload},
  resource::{RecordId, ReferenceOption, ReferenceTarget, Resource},
  role::Role,
  student::Student,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde_json::{Map, Value, json};

use crate::{
  app::{App, ResourceKind},
  notify::{NoticeKind, Notifier},
  screen::{Dialog, DialogMode, ListState, Screen, ScreenContext},
  table::{Body, Cell},
};

// ─── Fake backend ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct FakeBackend {
  data:          Mutex<HashMap<&'static str, Vec<Value>>>,
  calls:         Mutex<Vec<String>>,
  reject_create: Mutex<Option<String>>,
  fail_list:     AtomicBool,
  next_id:       AtomicUsize,
}

impl FakeBackend {
  fn seed(&self, collection: &'static str, records: Vec<Value>) {
    self.data.lock().unwrap().insert(collection, records);
  }

  fn log(&self, call: String) {
    self.calls.lock().unwrap().push(call);
  }

  fn count(&self, call: &str) -> usize {
    self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
  }

  fn edit(&self, collection: &str, id: &str, field: &str, value: Value) {
    let mut data = self.data.lock().unwrap();
    let record = data
      .get_mut(collection)
      .and_then(|rs| rs.iter_mut().find(|r| r["_id"] == id))
      .unwrap();
    record[field] = value;
  }
}

/// Flatten a request body back into record fields.
fn fields(payload: Payload) -> Map<String, Value> {
  match payload {
    Payload::Json(Value::Object(map)) => map,
    Payload::Json(_) => Map::new(),
    Payload::Multipart(parts) => parts
      .into_iter()
      .map(|part| {
        let value = match part.value {
          PartValue::Text(text) => match serde_json::from_str::<Value>(&text) {
            Ok(v @ (Value::Object(_) | Value::Array(_))) => v,
            _ => Value::String(text),
          },
          PartValue::File(path) => json!({ "url": path.display().to_string() }),
        };
        (part.name, value)
      })
      .collect(),
  }
}

fn not_found() -> ApiError {
  ApiError::Status { status: 404, message: "Record not found".into() }
}

impl ReferenceLookup for FakeBackend {
  async fn reference_options(
    &self,
    target: ReferenceTarget,
  ) -> Result<Vec<ReferenceOption>, ApiError> {
    match target {
      ReferenceTarget::Students => {
        let students = self.list::<Student>().await?;
        Ok(students.records.iter().map(Student::reference_option).collect())
      }
    }
  }
}

impl ResourceBackend for FakeBackend {
  async fn list<R: Resource>(&self) -> Result<ListSnapshot<R>, ApiError> {
    self.log(format!("list {}", R::COLLECTION));
    if self.fail_list.load(Ordering::SeqCst) {
      return Err(ApiError::Transport("connection refused".into()));
    }
    let values = self.data.lock().unwrap().get(R::COLLECTION).cloned().unwrap_or_default();
    Ok(ListSnapshot::decode(values))
  }

  async fn get<R: Resource>(&self, id: &RecordId) -> Result<R, ApiError> {
    self.log(format!("get {} {id}", R::COLLECTION));
    let value = self
      .data
      .lock()
      .unwrap()
      .get(R::COLLECTION)
      .and_then(|rs| rs.iter().find(|r| r["_id"] == id.as_str()).cloned())
      .ok_or_else(not_found)?;
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
  }

  async fn create<R: Resource>(&self, payload: Payload) -> Result<Ack, ApiError> {
    self.log(format!("create {}", R::COLLECTION));
    if let Some(message) = self.reject_create.lock().unwrap().clone() {
      return Err(ApiError::Rejected(message));
    }
    let mut record = fields(payload);
    let id = format!("n{}", self.next_id.fetch_add(1, Ordering::SeqCst));
    record.insert("_id".into(), json!(id));
    self
      .data
      .lock()
      .unwrap()
      .entry(R::COLLECTION)
      .or_default()
      .push(Value::Object(record));
    Ok(Ack { message: None })
  }

  async fn update<R: Resource>(&self, id: &RecordId, payload: Payload) -> Result<Ack, ApiError> {
    self.log(format!("update {} {id}", R::COLLECTION));
    let mut data = self.data.lock().unwrap();
    let record = data
      .get_mut(R::COLLECTION)
      .and_then(|rs| rs.iter_mut().find(|r| r["_id"] == id.as_str()))
      .and_then(Value::as_object_mut)
      .ok_or_else(not_found)?;
    record.extend(fields(payload));
    Ok(Ack { message: Some("Updated".into()) })
  }

  async fn delete<R: Resource>(&self, id: &RecordId) -> Result<Ack, ApiError> {
    self.log(format!("delete {} {id}", R::COLLECTION));
    let mut data = self.data.lock().unwrap();
    let records = data.get_mut(R::COLLECTION).ok_or_else(not_found)?;
    let before = records.len();
    records.retain(|r| r["_id"] != id.as_str());
    if records.len() == before {
      return Err(not_found());
    }
    Ok(Ack { message: Some("Deleted".into()) })
  }
}

// ─── Fixtures ─────────────────────────────────────────────────────────────────

fn loan(id: &str, book: &str) -> Value {
  json!({
    "_id": id,
    "student": "s1",
    "bookName": book,
    "borrowDate": "2024-03-05T00:00:00Z",
    "returnDate": null,
    "status": "Borrowed"
  })
}

fn student(id: &str, name: &str) -> Value {
  json!({
    "_id": id,
    "name": name,
    "dateOfBirth": "2010-12-10T00:00:00.000Z",
    "gender": "Female",
    "class": "8B",
    "contactInfo": {
      "phone": "0123456789",
      "email": "ada@example.com",
      "address": { "street": "1 Main St", "city": "London", "state": "LDN", "postalCode": "12345" }
    },
    "guardian": { "name": "Anne", "relationship": "Mother", "phone": "0987654321", "email": "anne@example.com" }
  })
}

fn context(role: Role) -> ScreenContext {
  ScreenContext {
    role,
    notifier: Notifier::new(Duration::from_secs(60)),
    close_delay: Duration::ZERO,
  }
}

type LibraryScreen = Screen<LibraryRecord, FakeBackend>;

async fn library_screen(role: Role, seed: Vec<Value>) -> (Arc<FakeBackend>, LibraryScreen, Notifier) {
  let backend = Arc::new(FakeBackend::default());
  backend.seed("library", seed);
  let ctx = context(role);
  let notifier = ctx.notifier.clone();
  let mut screen = Screen::new(backend.clone(), ctx);
  screen.mount();
  screen.settle().await;
  (backend, screen, notifier)
}

fn notices(notifier: &Notifier) -> Vec<(NoticeKind, String)> {
  notifier.all().into_iter().map(|n| (n.kind, n.message)).collect()
}

fn fill_valid_loan(screen: &mut LibraryScreen) {
  let form = screen.form_mut().unwrap();
  form.draft.set("student", "s1");
  form.draft.set("bookName", "Emma");
  form.draft.set("borrowDate", "2024-03-05");
  form.draft.set("status", "Borrowed");
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn single_record_renders_one_row_with_day_first_dates() {
  let (_, screen, _) = library_screen(Role::Admin, vec![loan("l1", "Emma")]).await;
  assert_eq!(screen.list_state(), ListState::Loaded);

  let view = screen.table();
  assert_eq!(view.rows().len(), 1);
  assert_eq!(view.rows()[0].cells[3], Cell::Text("05-03-2024".into()));
  assert_eq!(view.rows()[0].cells[4], Cell::Text("-".into()));
}

#[tokio::test]
async fn empty_list_renders_one_spanning_row() {
  let (_, screen, _) = library_screen(Role::Admin, Vec::new()).await;
  assert_eq!(
    screen.table().body,
    Body::Empty { message: "No library records found".into(), span: 7 }
  );
}

#[tokio::test]
async fn read_only_role_gets_no_actions() {
  let (backend, mut screen, _) = library_screen(Role::Librarian, vec![loan("l1", "Emma")]).await;
  assert!(!screen.table().actions);

  screen.open_add();
  assert!(matches!(screen.dialog(), Dialog::Closed));
  screen.delete(RecordId::from("l1"));
  screen.settle().await;
  assert_eq!(backend.count("delete library l1"), 0);
  assert_eq!(screen.records().len(), 1);
}

#[tokio::test]
async fn edit_prefills_dates_in_input_format() {
  let (_, mut screen, _) = library_screen(Role::Admin, vec![loan("l1", "Emma")]).await;
  let record = screen.records()[0].clone();
  screen.open_edit(&record);
  let form = screen.form_mut().unwrap();
  assert_eq!(form.draft.get("borrowDate"), "2024-03-05");
  assert_eq!(form.draft.get("returnDate"), "");
  assert_eq!(form.draft.get("student"), "s1");
}

#[tokio::test]
async fn unchanged_edit_round_trips_to_an_equal_record() {
  let (backend, mut screen, notifier) = library_screen(Role::Admin, vec![loan("l1", "Emma")]).await;
  let original = screen.records()[0].clone();

  screen.open_edit(&original);
  screen.submit();
  screen.settle().await;

  assert_eq!(backend.count("update library l1"), 1);
  assert!(matches!(screen.dialog(), Dialog::Closed));
  assert_eq!(screen.records(), &[original]);
  assert_eq!(notices(&notifier), vec![(NoticeKind::Success, "Updated".to_string())]);
}

#[tokio::test]
async fn rejected_create_keeps_the_dialog_open() {
  let (backend, mut screen, notifier) = library_screen(Role::Admin, Vec::new()).await;
  *backend.reject_create.lock().unwrap() = Some("Duplicate entry".into());
  let lists = backend.count("list library");

  screen.open_add();
  fill_valid_loan(&mut screen);
  screen.submit();
  screen.settle().await;

  assert_eq!(backend.count("create library"), 1);
  assert_eq!(backend.count("list library"), lists);
  assert_eq!(notices(&notifier), vec![(NoticeKind::Error, "Duplicate entry".to_string())]);
  let form = screen.form_mut().expect("dialog stays open");
  assert_eq!(form.draft.get("bookName"), "Emma");
}

#[tokio::test]
async fn successful_add_notifies_closes_and_refreshes() {
  let (backend, mut screen, notifier) = library_screen(Role::Admin, Vec::new()).await;
  let lists = backend.count("list library");

  screen.open_add();
  fill_valid_loan(&mut screen);
  screen.submit();
  screen.settle().await;

  assert!(matches!(screen.dialog(), Dialog::Closed));
  assert_eq!(backend.count("list library"), lists + 1);
  assert_eq!(screen.records().len(), 1);
  assert_eq!(screen.records()[0].book_name, "Emma");
  assert_eq!(
    notices(&notifier),
    vec![(NoticeKind::Success, "Library record added successfully".to_string())]
  );
}

#[tokio::test]
async fn earlier_edit_success_leaves_a_newer_dialog_open() {
  let (backend, mut screen, notifier) = library_screen(Role::Admin, vec![loan("l1", "Emma")]).await;
  let lists = backend.count("list library");
  let original = screen.records()[0].clone();

  screen.open_edit(&original);
  screen.submit();
  screen.close_dialog();
  screen.open_add();
  screen.form_mut().unwrap().draft.set("bookName", "Half typed");
  screen.settle().await;

  assert!(matches!(screen.dialog(), Dialog::Open { mode: DialogMode::Add, .. }));
  assert_eq!(screen.form_mut().unwrap().draft.get("bookName"), "Half typed");
  assert_eq!(backend.count("update library l1"), 1);
  assert_eq!(backend.count("list library"), lists + 1);
  assert_eq!(notices(&notifier), vec![(NoticeKind::Success, "Updated".to_string())]);
}

#[tokio::test]
async fn invalid_draft_sends_nothing() {
  let (backend, mut screen, notifier) = library_screen(Role::Admin, Vec::new()).await;
  screen.open_add();
  screen.form_mut().unwrap().draft.set("bookName", "E");
  screen.submit();
  screen.settle().await;

  assert_eq!(backend.count("create library"), 0);
  assert!(notices(&notifier).is_empty());
  let form = screen.form_mut().unwrap();
  assert_eq!(form.errors.get("bookName"), Some("Book name must be at least 2 characters long"));
  assert_eq!(form.errors.get("student"), Some("Student is required"));
}

#[tokio::test]
async fn delete_notifies_and_refreshes() {
  let (backend, mut screen, notifier) =
    library_screen(Role::Admin, vec![loan("l1", "Emma"), loan("l2", "Persuasion")]).await;

  screen.delete(RecordId::from("l1"));
  screen.settle().await;

  assert_eq!(notices(&notifier), vec![(NoticeKind::Success, "Deleted".to_string())]);
  let ids: Vec<_> = screen.records().iter().map(|r| r.id.as_str()).collect();
  assert_eq!(ids, ["l2"]);
  assert_eq!(backend.count("list library"), 2);
}

#[tokio::test]
async fn failed_delete_leaves_the_snapshot_alone() {
  let (backend, mut screen, notifier) = library_screen(Role::Admin, vec![loan("l1", "Emma")]).await;
  screen.delete(RecordId::from("zz"));
  screen.settle().await;

  assert_eq!(notices(&notifier), vec![(NoticeKind::Error, "Record not found".to_string())]);
  assert_eq!(screen.records().len(), 1);
  assert_eq!(backend.count("list library"), 1);
}

#[tokio::test]
async fn failed_fetch_keeps_the_previous_snapshot() {
  let (backend, mut screen, notifier) = library_screen(Role::Admin, vec![loan("l1", "Emma")]).await;
  backend.fail_list.store(true, Ordering::SeqCst);

  screen.refresh();
  assert_eq!(screen.list_state(), ListState::Loading);
  screen.settle().await;

  assert_eq!(screen.list_state(), ListState::Loaded);
  assert_eq!(screen.records().len(), 1);
  assert_eq!(notices(&notifier), vec![(NoticeKind::Error, "connection refused".to_string())]);
}

#[tokio::test]
async fn completions_after_unmount_are_dropped() {
  let backend = Arc::new(FakeBackend::default());
  backend.seed("library", vec![loan("l1", "Emma")]);
  let mut screen: LibraryScreen = Screen::new(backend.clone(), context(Role::Admin));

  screen.mount();
  screen.unmount();
  screen.settle().await;

  assert_eq!(backend.count("list library"), 1);
  assert!(screen.records().is_empty());
  assert_eq!(screen.list_state(), ListState::Idle);
}

#[tokio::test]
async fn reference_options_reach_a_dialog_opened_before_they_load() {
  let backend = Arc::new(FakeBackend::default());
  backend.seed("students", vec![student("s1", "Ada Lovelace")]);
  let mut screen: LibraryScreen = Screen::new(backend.clone(), context(Role::Admin));

  screen.mount();
  screen.open_add();
  screen.settle().await;

  let form = screen.form_mut().unwrap();
  let options = form.references(ReferenceTarget::Students);
  assert_eq!(options.len(), 1);
  assert_eq!(options[0].label, "Ada Lovelace");
}

#[tokio::test]
async fn student_edit_reloads_the_profile() {
  let backend = Arc::new(FakeBackend::default());
  backend.seed("students", vec![student("s1", "Ada Lovelace")]);
  let mut screen: Screen<Student, FakeBackend> = Screen::new(backend.clone(), context(Role::Admin));
  screen.mount();
  screen.settle().await;

  let listed = screen.records()[0].clone();
  backend.edit("students", "s1", "name", json!("Ada King"));
  screen.open_edit(&listed);
  screen.settle().await;

  assert_eq!(backend.count("get students s1"), 1);
  assert_eq!(screen.form_mut().unwrap().draft.get("name"), "Ada King");
}

#[tokio::test]
async fn student_reload_keeps_what_the_user_typed() {
  let backend = Arc::new(FakeBackend::default());
  backend.seed("students", vec![student("s1", "Ada Lovelace")]);
  let mut screen: Screen<Student, FakeBackend> = Screen::new(backend.clone(), context(Role::Admin));
  screen.mount();
  screen.settle().await;

  let listed = screen.records()[0].clone();
  backend.edit("students", "s1", "name", json!("Ada King"));
  screen.open_edit(&listed);
  screen.form_mut().unwrap().draft.set("name", "Augusta Ada");
  screen.settle().await;

  assert_eq!(backend.count("get students s1"), 1);
  assert_eq!(screen.form_mut().unwrap().draft.get("name"), "Augusta Ada");
}

#[tokio::test]
async fn malformed_records_are_skipped_with_a_warning() {
  let backend = Arc::new(FakeBackend::default());
  backend.seed("students", vec![student("s1", "Ada Lovelace"), json!({ "_id": "s2" })]);
  let ctx = context(Role::Admin);
  let notifier = ctx.notifier.clone();
  let mut screen: Screen<Student, FakeBackend> = Screen::new(backend, ctx);
  screen.mount();
  screen.settle().await;

  assert_eq!(screen.records().len(), 1);
  assert_eq!(
    notices(&notifier),
    vec![(NoticeKind::Warning, "Skipped 1 malformed student record(s)".to_string())]
  );
}

#[tokio::test]
async fn dialog_captures_keys_before_global_bindings() {
  let backend = Arc::new(FakeBackend::default());
  let mut app = App::new(backend, context(Role::Admin), ResourceKind::Library);
  assert_eq!(app.active, 1);

  let key = |c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
  assert!(app.handle_key(key('a')));
  assert!(app.screen().dialog_view().is_some());
  assert!(app.handle_key(key('q')));
  assert!(app.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
  assert!(app.screen().dialog_view().is_none());

  assert!(app.handle_key(key('3')));
  assert_eq!(app.active, 2);
  assert!(!app.handle_key(key('q')));
}
