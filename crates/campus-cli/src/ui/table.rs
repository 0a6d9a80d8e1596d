//! Resource table pane.

use ratatui::{
  Frame,
  layout::{Constraint, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Row, Table, TableState},
};

use crate::{
  screen::{ListState, ScreenView},
  table::{Body, Cell, Tone},
};

fn cell_span(cell: &Cell) -> Span<'static> {
  match cell {
    Cell::Text(s) => Span::raw(s.clone()),
    Cell::Badge { text, tone } => {
      let bg = match tone {
        Tone::Success => Color::Green,
        Tone::Pending => Color::Yellow,
      };
      Span::styled(format!(" {text} "), Style::default().fg(Color::Black).bg(bg))
    }
    Cell::Photo { url: Some(_), .. } => Span::styled("[photo]", Style::default().fg(Color::Cyan)),
    Cell::Photo { url: None, alt } => {
      let initial = alt.chars().next().map(String::from).unwrap_or_else(|| "-".into());
      Span::styled(format!("({initial})"), Style::default().fg(Color::DarkGray))
    }
  }
}

/// Render the visible screen's table into `area`.
pub fn draw(f: &mut Frame, area: Rect, screen: &dyn ScreenView) {
  let view = screen.table();
  let suffix = match screen.list_state() {
    ListState::Loading => " (loading…)".to_string(),
    _ => format!(" ({})", view.rows().len()),
  };

  let block = Block::default()
    .title(format!(" {}{suffix} ", screen.title()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let header = Row::new(view.headers.iter().copied())
    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

  let rows: Vec<Row> = match &view.body {
    Body::Rows(rows) => rows
      .iter()
      .map(|row| {
        let mut cells: Vec<Line> = row.cells.iter().map(|c| Line::from(cell_span(c))).collect();
        if view.actions {
          cells.push(Line::from(Span::styled("Edit | Delete", Style::default().fg(Color::DarkGray))));
        }
        Row::new(cells)
      })
      .collect(),
    Body::Empty { message, .. } => {
      // The message sits in the first column and the rest stay blank, so
      // it reads as one row across the table.
      let p = Paragraph::new(message.as_str()).style(Style::default().fg(Color::DarkGray));
      let below = Rect { y: inner.y + 1, height: inner.height.saturating_sub(1), ..inner };
      f.render_widget(Table::new(Vec::<Row>::new(), widths(view.headers.len())).header(header), inner);
      f.render_widget(p, below);
      return;
    }
  };

  let mut state = TableState::default();
  state.select((!rows.is_empty()).then_some(screen.cursor()));

  let table = Table::new(rows, widths(view.headers.len()))
    .header(header)
    .row_highlight_style(Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD));
  f.render_stateful_widget(table, inner, &mut state);
}

fn widths(n: usize) -> Vec<Constraint> {
  vec![Constraint::Fill(1); n.max(1)]
}
