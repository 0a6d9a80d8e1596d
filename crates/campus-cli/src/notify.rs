//! Transient notifications shared between screens and the renderer.

use std::{
  sync::{Arc, Mutex, MutexGuard, PoisonError},
  time::{Duration, Instant},
};

/// How long a notification stays visible by default.
pub const DEFAULT_TTL: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
  Success,
  /// Something was skipped but the screen is still usable.
  Warning,
  Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
  pub kind:       NoticeKind,
  pub message:    String,
  pub created_at: Instant,
}

/// Handle onto the notification queue. Clones share one queue.
///
/// Several notices may be visible at once; the newest is appended last and
/// each expires on its own after the configured interval.
#[derive(Debug, Clone)]
pub struct Notifier {
  queue: Arc<Mutex<Vec<Notice>>>,
  ttl:   Duration,
}

impl Default for Notifier {
  fn default() -> Self {
    Self::new(DEFAULT_TTL)
  }
}

impl Notifier {
  pub fn new(ttl: Duration) -> Self {
    Self { queue: Arc::default(), ttl }
  }

  fn queue(&self) -> MutexGuard<'_, Vec<Notice>> {
    self.queue.lock().unwrap_or_else(PoisonError::into_inner)
  }

  pub fn notify(&self, kind: NoticeKind, message: impl Into<String>) {
    let message = message.into();
    tracing::debug!(?kind, %message, "notice");
    self.queue().push(Notice { kind, message, created_at: Instant::now() });
  }

  pub fn success(&self, message: impl Into<String>) {
    self.notify(NoticeKind::Success, message);
  }

  pub fn warning(&self, message: impl Into<String>) {
    self.notify(NoticeKind::Warning, message);
  }

  pub fn error(&self, message: impl Into<String>) {
    self.notify(NoticeKind::Error, message);
  }

  /// Notices still visible now, oldest first.
  pub fn active(&self) -> Vec<Notice> {
    self.prune_at(Instant::now());
    self.queue().clone()
  }

  /// Every notice ever queued and not yet pruned, regardless of age.
  pub fn all(&self) -> Vec<Notice> {
    self.queue().clone()
  }

  /// Drop notices that have expired by `now`.
  pub fn prune_at(&self, now: Instant) {
    let ttl = self.ttl;
    self.queue().retain(|n| now.saturating_duration_since(n.created_at) < ttl);
  }
}
