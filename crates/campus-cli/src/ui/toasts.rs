//! Notification overlay, stacked in the bottom-right corner with the newest
//! at the bottom.

use ratatui::{
  Frame,
  layout::{Alignment, Rect},
  style::{Color, Style},
  widgets::{Block, Borders, Clear, Paragraph},
};
use unicode_width::UnicodeWidthStr;

use crate::notify::{Notice, NoticeKind};

pub fn draw(f: &mut Frame, area: Rect, notices: &[Notice]) {
  let height = 3;
  let mut bottom = area.bottom().saturating_sub(2);

  for notice in notices.iter().rev() {
    if bottom < area.y + height {
      break;
    }
    let width = (notice.message.width() as u16 + 4).min(area.width.saturating_sub(4));
    let x = area.right().saturating_sub(width + 2);
    let y = bottom - height;
    let toast = Rect::new(x, y, width, height);

    let color = match notice.kind {
      NoticeKind::Success => Color::Green,
      NoticeKind::Warning => Color::Yellow,
      NoticeKind::Error => Color::Red,
    };
    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(color))
      .style(Style::default().bg(Color::Black));
    let text = Paragraph::new(notice.message.as_str())
      .alignment(Alignment::Center)
      .style(Style::default().fg(Color::White))
      .block(block);

    f.render_widget(Clear, toast);
    f.render_widget(text, toast);
    bottom = y;
  }
}
