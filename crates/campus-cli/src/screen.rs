//! Screen controller: one CRUD screen over one resource collection.
//!
//! A [`Screen`] owns its record snapshot and its dialog. Network calls run
//! on spawned tasks and report back as [`Event`]s over an unbounded channel;
//! [`Screen::pump`] drains it from the UI loop and [`Screen::settle`] awaits
//! everything outstanding. Every event carries the epoch it was issued
//! under; [`Screen::unmount`] bumps the epoch so late completions from a
//! screen that is no longer shown are dropped.

use std::{collections::HashMap, sync::Arc, time::Duration};

use campus_client::{Ack, ApiError, ListSnapshot, ResourceBackend};
use campus_core::{
  resource::{Column, RecordId, ReferenceOption, ReferenceTarget, Resource},
  role::Role,
};
use crossterm::event::{KeyCode, KeyEvent};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::{
  form::{FormAction, RecordForm},
  notify::Notifier,
  table::{self, ActionKind, TableAction, TableView},
};

// ─── States ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListState {
  Idle,
  Loading,
  Loaded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogMode {
  Add,
  Edit(RecordId),
}

#[derive(Debug, Clone)]
pub enum Dialog {
  Closed,
  Open { mode: DialogMode, form: RecordForm },
  /// A submit succeeded; the dialog closes once the delay runs out.
  Closing { mode: DialogMode },
}

/// Settings shared by every screen.
#[derive(Debug, Clone)]
pub struct ScreenContext {
  pub role:        Role,
  pub notifier:    Notifier,
  /// Pause between a successful submit and the dialog closing.
  pub close_delay: Duration,
}

// ─── Events ──────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum Completion<R> {
  Listed(Result<ListSnapshot<R>, ApiError>),
  References(ReferenceTarget, Result<Vec<ReferenceOption>, ApiError>),
  Fetched(RecordId, Result<R, ApiError>),
  Submitted(DialogMode, Result<Ack, ApiError>),
  Deleted(RecordId, Result<Ack, ApiError>),
  CloseDue,
}

#[derive(Debug)]
pub struct Event<R> {
  pub epoch:      u64,
  pub completion: Completion<R>,
}

// ─── Screen ──────────────────────────────────────────────────────────────────

pub struct Screen<R: Resource, B: ResourceBackend> {
  backend:        Arc<B>,
  ctx:            ScreenContext,
  columns:        Vec<Column<R>>,
  list_state:     ListState,
  records:        Vec<R>,
  references:     HashMap<ReferenceTarget, Vec<ReferenceOption>>,
  dialog:         Dialog,
  filter:         String,
  filter_active:  bool,
  cursor:         usize,
  pending_delete: Option<RecordId>,
  epoch:          u64,
  in_flight:      usize,
  tx:             mpsc::UnboundedSender<Event<R>>,
  rx:             mpsc::UnboundedReceiver<Event<R>>,
}

impl<R: Resource, B: ResourceBackend> Screen<R, B> {
  pub fn new(backend: Arc<B>, ctx: ScreenContext) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    Self {
      backend,
      ctx,
      columns: R::columns(),
      list_state: ListState::Idle,
      records: Vec::new(),
      references: HashMap::new(),
      dialog: Dialog::Closed,
      filter: String::new(),
      filter_active: false,
      cursor: 0,
      pending_delete: None,
      epoch: 0,
      in_flight: 0,
      tx,
      rx,
    }
  }

  // ── Accessors ─────────────────────────────────────────────────────────────

  pub fn list_state(&self) -> ListState {
    self.list_state
  }

  pub fn records(&self) -> &[R] {
    &self.records
  }

  pub fn dialog(&self) -> &Dialog {
    &self.dialog
  }

  /// The open dialog's form, if any.
  pub fn form_mut(&mut self) -> Option<&mut RecordForm> {
    match &mut self.dialog {
      Dialog::Open { form, .. } => Some(form),
      _ => None,
    }
  }

  pub fn read_only(&self) -> bool {
    R::is_read_only(self.ctx.role)
  }

  fn visible(&self) -> Vec<&R> {
    table::filter(self.records(), &self.columns, &self.filter)
  }

  pub fn table(&self) -> TableView {
    table::render(self.visible(), self.ctx.role, &self.columns)
  }

  // ── Tasks ─────────────────────────────────────────────────────────────────

  fn spawn<F>(&mut self, task: F)
  where
    F: Future<Output = Completion<R>> + Send + 'static,
  {
    let tx = self.tx.clone();
    let epoch = self.epoch;
    self.in_flight += 1;
    tokio::spawn(async move {
      let completion = task.await;
      // The receiver lives as long as the screen; a send can only fail
      // after the screen is gone.
      let _ = tx.send(Event { epoch, completion });
    });
  }

  // ── Lifecycle ─────────────────────────────────────────────────────────────

  /// Fetch the list and any reference data the form needs.
  pub fn mount(&mut self) {
    debug!(collection = R::COLLECTION, epoch = self.epoch, "mount");
    self.refresh();
    for target in R::schema().references() {
      let backend = self.backend.clone();
      self.spawn(async move {
        Completion::References(target, backend.reference_options(target).await)
      });
    }
  }

  pub fn refresh(&mut self) {
    self.list_state = ListState::Loading;
    let backend = self.backend.clone();
    self.spawn(async move { Completion::Listed(backend.list::<R>().await) });
  }

  /// Stop listening: anything still in flight is ignored when it lands.
  pub fn unmount(&mut self) {
    self.epoch += 1;
    self.list_state = ListState::Idle;
    self.dialog = Dialog::Closed;
    self.pending_delete = None;
    debug!(collection = R::COLLECTION, epoch = self.epoch, "unmount");
  }

  // ── Dialog ────────────────────────────────────────────────────────────────

  fn new_form(&self, form: RecordForm) -> RecordForm {
    let mut form = form;
    for (target, options) in &self.references {
      form.set_references(*target, options.clone());
    }
    form
  }

  pub fn open_add(&mut self) {
    if self.read_only() {
      return;
    }
    let form = self.new_form(RecordForm::new(R::schema()));
    self.dialog = Dialog::Open { mode: DialogMode::Add, form };
  }

  pub fn open_edit(&mut self, record: &R) {
    if self.read_only() {
      return;
    }
    let id = record.id().clone();
    let form = self.new_form(RecordForm::with_draft(R::schema(), record.project()));
    self.dialog = Dialog::Open { mode: DialogMode::Edit(id.clone()), form };

    if R::REFETCH_ON_EDIT {
      let backend = self.backend.clone();
      self.spawn(async move {
        let result = backend.get::<R>(&id).await;
        Completion::Fetched(id, result)
      });
    }
  }

  pub fn close_dialog(&mut self) {
    self.dialog = Dialog::Closed;
  }

  /// Validate and send the open dialog's draft.
  ///
  /// A draft that fails validation only records field errors; nothing is
  /// sent and no notification is raised.
  pub fn submit(&mut self) {
    if self.read_only() {
      return;
    }
    let Dialog::Open { mode, form } = &mut self.dialog else {
      return;
    };
    let Some(valid) = form.validate() else {
      debug!(collection = R::COLLECTION, errors = form.errors.len(), "draft rejected");
      return;
    };
    let payload = R::payload(&valid);
    let mode = mode.clone();
    let backend = self.backend.clone();
    self.spawn(async move {
      let result = match &mode {
        DialogMode::Add => backend.create::<R>(payload).await,
        DialogMode::Edit(id) => backend.update::<R>(id, payload).await,
      };
      Completion::Submitted(mode, result)
    });
  }

  pub fn delete(&mut self, id: RecordId) {
    if self.read_only() {
      return;
    }
    let backend = self.backend.clone();
    self.spawn(async move {
      let result = backend.delete::<R>(&id).await;
      Completion::Deleted(id, result)
    });
  }

  // ── Completions ───────────────────────────────────────────────────────────

  /// Apply every completion that has already arrived.
  pub fn pump(&mut self) -> bool {
    let mut changed = false;
    while let Ok(event) = self.rx.try_recv() {
      self.apply(event);
      changed = true;
    }
    changed
  }

  /// Wait until nothing is in flight, applying completions as they land.
  pub async fn settle(&mut self) {
    while self.in_flight > 0 {
      match self.rx.recv().await {
        Some(event) => self.apply(event),
        None => break,
      }
    }
  }

  fn apply(&mut self, event: Event<R>) {
    self.in_flight = self.in_flight.saturating_sub(1);
    if event.epoch != self.epoch {
      debug!(collection = R::COLLECTION, stale = event.epoch, current = self.epoch, "dropping stale completion");
      return;
    }

    match event.completion {
      Completion::Listed(Ok(snapshot)) => {
        self.records = snapshot.records;
        self.list_state = ListState::Loaded;
        self.cursor = self.cursor.min(self.visible().len().saturating_sub(1));
        if snapshot.rejected > 0 {
          self.ctx.notifier.warning(format!(
            "Skipped {} malformed {} record(s)",
            snapshot.rejected,
            R::NOUN.to_lowercase()
          ));
        }
      }
      Completion::Listed(Err(e)) => {
        warn!(collection = R::COLLECTION, error = %e, "list failed");
        self.list_state = ListState::Loaded;
        self.ctx.notifier.error(e.user_message());
      }

      Completion::References(target, Ok(options)) => {
        if let Dialog::Open { form, .. } = &mut self.dialog {
          form.set_references(target, options.clone());
        }
        self.references.insert(target, options);
      }
      Completion::References(target, Err(e)) => {
        warn!(collection = R::COLLECTION, ?target, error = %e, "reference fetch failed");
      }

      Completion::Fetched(id, Ok(record)) => {
        if let Dialog::Open { mode: DialogMode::Edit(open), form } = &mut self.dialog
          && *open == id
          && !form.reload(record.project())
        {
          debug!(collection = R::COLLECTION, %id, "draft already edited, keeping it");
        }
      }
      Completion::Fetched(id, Err(e)) => {
        warn!(collection = R::COLLECTION, %id, error = %e, "re-fetch for edit failed");
        self.ctx.notifier.error(e.user_message());
      }

      Completion::Submitted(mode, Ok(ack)) => {
        let fallback = match mode {
          DialogMode::Add => format!("{} added successfully", R::NOUN),
          DialogMode::Edit(_) => format!("{} updated successfully", R::NOUN),
        };
        self.ctx.notifier.success(ack.message.unwrap_or(fallback));
        // Only the dialog that was submitted closes; one opened since then
        // keeps its draft.
        if matches!(&self.dialog, Dialog::Open { mode: open, .. } if *open == mode) {
          self.dialog = Dialog::Closing { mode };
          let delay = self.ctx.close_delay;
          self.spawn(async move {
            tokio::time::sleep(delay).await;
            Completion::CloseDue
          });
        } else {
          self.refresh();
        }
      }
      Completion::Submitted(_, Err(e)) => {
        self.ctx.notifier.error(e.user_message());
      }

      Completion::CloseDue => {
        if matches!(self.dialog, Dialog::Closing { .. }) {
          self.dialog = Dialog::Closed;
        }
        self.refresh();
      }

      Completion::Deleted(_, Ok(ack)) => {
        self
          .ctx
          .notifier
          .success(ack.message.unwrap_or_else(|| format!("{} deleted successfully", R::NOUN)));
        self.refresh();
      }
      Completion::Deleted(id, Err(e)) => {
        warn!(collection = R::COLLECTION, %id, error = %e, "delete failed");
        self.ctx.notifier.error(e.user_message());
      }
    }
  }

  // ── Keys ──────────────────────────────────────────────────────────────────

  fn cursor_id(&self) -> Option<RecordId> {
    self.visible().get(self.cursor).map(|r| r.id().clone())
  }

  fn trigger(&mut self, kind: ActionKind) {
    if self.read_only() {
      return;
    }
    let Some(id) = self.cursor_id() else { return };
    match table::trigger(&self.records, &id, kind) {
      Some(TableAction::Edit(record)) => self.open_edit(&record),
      Some(TableAction::Delete(id)) => self.pending_delete = Some(id),
      None => {}
    }
  }

  fn handle_filter_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
      }
      KeyCode::Enter => self.filter_active = false,
      KeyCode::Backspace => {
        self.filter.pop();
      }
      KeyCode::Char(c) => self.filter.push(c),
      _ => {}
    }
    self.cursor = 0;
  }

  fn handle_list_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Down | KeyCode::Char('j') => {
        if self.cursor + 1 < self.visible().len() {
          self.cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => self.cursor = self.cursor.saturating_sub(1),
      KeyCode::Char('a') => self.open_add(),
      KeyCode::Char('e') | KeyCode::Enter => self.trigger(ActionKind::Edit),
      KeyCode::Char('d') => self.trigger(ActionKind::Delete),
      KeyCode::Char('r') => self.refresh(),
      KeyCode::Char('/') => {
        self.filter_active = true;
        self.filter.clear();
        self.cursor = 0;
      }
      _ => {}
    }
  }
}

// ─── Object-safe view for the app shell ──────────────────────────────────────

/// What the UI needs to draw an open dialog.
pub enum DialogView<'a> {
  Open { title: String, form: &'a RecordForm },
  Closing { title: String },
}

/// A screen with its resource type erased, so the app can hold one per tab.
pub trait ScreenView {
  fn title(&self) -> &'static str;
  fn mount(&mut self);
  fn unmount(&mut self);
  fn pump(&mut self) -> bool;
  fn handle_key(&mut self, key: KeyEvent);
  /// Whether keys should bypass the global bindings.
  fn captures_input(&self) -> bool;
  fn table(&self) -> TableView;
  fn cursor(&self) -> usize;
  fn list_state(&self) -> ListState;
  /// The filter query and whether it is being typed.
  fn filter(&self) -> (&str, bool);
  fn pending_delete(&self) -> Option<&RecordId>;
  fn dialog_view(&self) -> Option<DialogView<'_>>;
}

fn dialog_title<R: Resource>(mode: &DialogMode) -> String {
  match mode {
    DialogMode::Add => format!("Add {}", R::NOUN),
    DialogMode::Edit(_) => format!("Edit {}", R::NOUN),
  }
}

impl<R: Resource, B: ResourceBackend> ScreenView for Screen<R, B> {
  fn title(&self) -> &'static str {
    R::TITLE
  }

  fn mount(&mut self) {
    Screen::mount(self);
  }

  fn unmount(&mut self) {
    Screen::unmount(self);
  }

  fn pump(&mut self) -> bool {
    Screen::pump(self)
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if let Some(id) = self.pending_delete.take() {
      if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
        self.delete(id);
      }
      return;
    }
    if matches!(self.dialog(), Dialog::Closing { .. }) {
      return;
    }
    match self.form_mut().map(|form| form.handle_key(key)) {
      Some(FormAction::Submit) => self.submit(),
      Some(FormAction::Cancel) => self.close_dialog(),
      Some(FormAction::None) => {}
      None if self.filter_active => self.handle_filter_key(key),
      None => self.handle_list_key(key),
    }
  }

  fn captures_input(&self) -> bool {
    self.filter_active || self.pending_delete.is_some() || !matches!(self.dialog, Dialog::Closed)
  }

  fn table(&self) -> TableView {
    Screen::table(self)
  }

  fn cursor(&self) -> usize {
    self.cursor
  }

  fn list_state(&self) -> ListState {
    self.list_state
  }

  fn filter(&self) -> (&str, bool) {
    (&self.filter, self.filter_active)
  }

  fn pending_delete(&self) -> Option<&RecordId> {
    self.pending_delete.as_ref()
  }

  fn dialog_view(&self) -> Option<DialogView<'_>> {
    match &self.dialog {
      Dialog::Closed => None,
      Dialog::Open { mode, form } => Some(DialogView::Open { title: dialog_title::<R>(mode), form }),
      Dialog::Closing { mode } => Some(DialogView::Closing { title: dialog_title::<R>(mode) }),
    }
  }
}
