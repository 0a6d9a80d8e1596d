//! Application shell: one screen per resource tab.

use std::sync::Arc;

use campus_client::ResourceBackend;
use campus_core::{
  fee::FeeRecord, library::LibraryRecord, role::Role, staff::StaffMember, student::Student,
};
use clap::ValueEnum;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::{
  notify::Notifier,
  screen::{Screen, ScreenContext, ScreenView},
};

/// The resource collections, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResourceKind {
  Students,
  Library,
  Staff,
  Fees,
}

impl ResourceKind {
  pub const ALL: [ResourceKind; 4] =
    [ResourceKind::Students, ResourceKind::Library, ResourceKind::Staff, ResourceKind::Fees];

  pub fn label(self) -> &'static str {
    match self {
      ResourceKind::Students => "Students",
      ResourceKind::Library => "Library",
      ResourceKind::Staff => "Staff",
      ResourceKind::Fees => "Fees",
    }
  }

  fn index(self) -> usize {
    Self::ALL.iter().position(|k| *k == self).unwrap_or_default()
  }

  fn screen<B: ResourceBackend>(self, backend: &Arc<B>, ctx: &ScreenContext) -> Box<dyn ScreenView> {
    let (b, c) = (backend.clone(), ctx.clone());
    match self {
      ResourceKind::Students => Box::new(Screen::<Student, B>::new(b, c)),
      ResourceKind::Library => Box::new(Screen::<LibraryRecord, B>::new(b, c)),
      ResourceKind::Staff => Box::new(Screen::<StaffMember, B>::new(b, c)),
      ResourceKind::Fees => Box::new(Screen::<FeeRecord, B>::new(b, c)),
    }
  }
}

/// Top-level application state.
pub struct App {
  pub tabs:     Vec<Box<dyn ScreenView>>,
  /// Index of the visible tab; only that screen is mounted.
  pub active:   usize,
  pub role:     Role,
  pub notifier: Notifier,
}

impl App {
  pub fn new<B: ResourceBackend>(backend: Arc<B>, ctx: ScreenContext, start: ResourceKind) -> Self {
    let tabs = ResourceKind::ALL.iter().map(|k| k.screen(&backend, &ctx)).collect();
    let mut app = Self { tabs, active: start.index(), role: ctx.role, notifier: ctx.notifier };
    app.tabs[app.active].mount();
    app
  }

  pub fn screen(&self) -> &dyn ScreenView {
    self.tabs[self.active].as_ref()
  }

  /// Unmount the visible screen and mount the one at `index`.
  pub fn switch_to(&mut self, index: usize) {
    if index == self.active || index >= self.tabs.len() {
      return;
    }
    self.tabs[self.active].unmount();
    self.active = index;
    self.tabs[self.active].mount();
  }

  /// Apply finished network work. Returns whether anything changed.
  pub fn pump(&mut self) -> bool {
    self.tabs[self.active].pump()
  }

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub fn handle_key(&mut self, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return false;
    }

    let screen = &mut self.tabs[self.active];
    if screen.captures_input() {
      screen.handle_key(key);
      return true;
    }

    match key.code {
      KeyCode::Char('q') => return false,
      KeyCode::Char(c @ '1'..='4') => {
        let index = c as usize - '1' as usize;
        self.switch_to(index);
      }
      _ => screen.handle_key(key),
    }
    true
  }
}
