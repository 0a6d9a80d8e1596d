//! Add/edit dialog overlay.

use campus_core::schema::FieldKind;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Clear, Paragraph},
};

use crate::screen::DialogView;

pub fn draw(f: &mut Frame, area: Rect, view: &DialogView<'_>) {
  match view {
    DialogView::Closing { title } => {
      let popup = super::centered(area, 40, 3);
      let block = Block::bordered()
        .title(format!(" {title} "))
        .border_style(Style::default().fg(Color::Green));
      f.render_widget(Clear, popup);
      f.render_widget(Paragraph::new("Saved.").block(block), popup);
    }
    DialogView::Open { title, form } => {
      let mut lines: Vec<Line> = Vec::new();
      for (i, field) in form.schema().fields.iter().enumerate() {
        let focused = i == form.focus;
        let label_style = if focused {
          Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
          Style::default().fg(Color::Cyan)
        };
        let marker = if field.is_required() { "*" } else { "" };

        let value = form.display_value(field);
        let value = match field.kind {
          FieldKind::Select(_) | FieldKind::Reference(_) => format!("‹ {value} ›"),
          FieldKind::Date if value.is_empty() => "YYYY-MM-DD".into(),
          _ if focused => format!("{value}_"),
          _ => value,
        };

        lines.push(Line::from(vec![
          Span::styled(format!(" {:<22}", format!("{}{marker}", field.label)), label_style),
          Span::raw(" "),
          Span::raw(value),
        ]));
        if let Some(error) = form.errors.get(field.name) {
          lines.push(Line::from(Span::styled(
            format!("   {error}"),
            Style::default().fg(Color::Red),
          )));
        }
      }

      let height = lines.len() as u16 + 2;
      let popup = super::centered(area, 72, height);
      let block = Block::bordered()
        .title(format!(" {title} "))
        .border_style(Style::default().fg(Color::Cyan));
      f.render_widget(Clear, popup);
      f.render_widget(Paragraph::new(lines).block(block), popup);
    }
  }
}
