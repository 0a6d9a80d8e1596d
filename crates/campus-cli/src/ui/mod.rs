//! TUI rendering, orchestrating all panes.

pub mod dialog;
pub mod table;
pub mod toasts;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Clear, Paragraph},
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, ResourceKind};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();

  // Vertical stack: header, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  table::draw(f, rows[1], app.screen());
  draw_status(f, rows[2], app);

  let screen = app.screen();
  if let Some(view) = screen.dialog_view() {
    dialog::draw(f, rows[1], &view);
  } else if let Some(id) = screen.pending_delete() {
    draw_confirm(f, rows[1], &format!("Delete record {id}? [y/n]"));
  }

  toasts::draw(f, area, &app.notifier.active());
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let mut spans = vec![Span::styled(
    " campus ",
    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
  )];
  for (i, kind) in ResourceKind::ALL.iter().enumerate() {
    let style = if i == app.active {
      Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(Color::White)
    };
    spans.push(Span::raw(" "));
    spans.push(Span::styled(format!(" {} {} ", i + 1, kind.label()), style));
  }

  let right = format!("{}  {} ", app.role, Local::now().format("%d-%m-%Y"));
  let used: usize = spans.iter().map(|s| s.content.width()).sum();
  let pad = (area.width as usize).saturating_sub(used + right.width());
  spans.push(Span::raw(" ".repeat(pad)));
  spans.push(Span::styled(right, Style::default().fg(Color::Gray)));

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(Line::from(spans)), inner);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let screen = app.screen();
  let (filter, typing) = screen.filter();
  let actions = screen.table().actions;

  let (mode_label, hints) = if screen.dialog_view().is_some() {
    ("EDIT", "Tab/↑↓ move  ←→ choose  Ctrl-S save  Esc cancel")
  } else if screen.pending_delete().is_some() {
    ("CONFIRM", "y delete  any other key keeps the record")
  } else if typing {
    ("SEARCH", "Type to filter  Esc clear  Enter done")
  } else if actions {
    ("NORMAL", "1-4 tabs  ↑↓ move  a add  e edit  d delete  r refresh  / search  q quit")
  } else {
    ("VIEW", "1-4 tabs  ↑↓ move  r refresh  / search  q quit")
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD),
  );
  let mut spans = vec![mode_span, Span::styled(format!("  {hints}"), Style::default().fg(Color::DarkGray))];
  if !filter.is_empty() && !typing {
    spans.push(Span::styled(format!("  /{filter}"), Style::default().fg(Color::Yellow)));
  }

  f.render_widget(
    Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black)),
    area,
  );
}

// ─── Popups ───────────────────────────────────────────────────────────────────

/// A rectangle of at most `width` x `height` centred in `area`.
pub(crate) fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let width = width.min(area.width);
  let height = height.min(area.height);
  Rect {
    x: area.x + (area.width - width) / 2,
    y: area.y + (area.height - height) / 2,
    width,
    height,
  }
}

fn draw_confirm(f: &mut Frame, area: Rect, message: &str) {
  let width = message.width() as u16 + 4;
  let popup = centered(area, width, 3);
  let block = Block::bordered()
    .title(" Confirm ")
    .border_style(Style::default().fg(Color::Red));
  f.render_widget(Clear, popup);
  f.render_widget(Paragraph::new(message).block(block), popup);
}
