//! Call list pane, left panel.

use chrono::Utc;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::app::{App, elapsed};

/// Render the call list into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let filtered = app.filtered_calls();
  let total = app.calls.len();

  let title = if app.filter_active || !app.filter.is_empty() {
    format!(" Calls ({}/{}) ", filtered.len(), total)
  } else {
    format!(" Calls ({total}) ")
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let mut inner_area = block.inner(area);
  f.render_widget(block, area);

  if (app.filter_active || !app.filter.is_empty()) && inner_area.height > 2 {
    let filter_area = Rect {
      y: inner_area.y + inner_area.height - 1,
      height: 1,
      ..inner_area
    };
    inner_area.height -= 1;

    let filter_text = if app.filter_active {
      format!("/{}_", app.filter)
    } else {
      format!("/{}", app.filter)
    };
    f.render_widget(
      Paragraph::new(filter_text).style(Style::default().fg(Color::Yellow)),
      filter_area,
    );
  }

  if filtered.is_empty() {
    let msg = if total == 0 {
      "No active calls."
    } else {
      "No calls match the filter."
    };
    f.render_widget(
      Paragraph::new(msg).style(Style::default().fg(Color::DarkGray)),
      inner_area,
    );
    return;
  }

  let now = Utc::now();
  let items: Vec<ListItem> = filtered
    .iter()
    .map(|call| {
      let selection = call
        .record
        .ivr_selection
        .map(|s| s.to_string())
        .unwrap_or_else(|| "menu".to_string());

      ListItem::new(Line::from(vec![
        Span::raw(format!("{:<16}", call.record.from_address)),
        Span::styled(
          format!("{selection:<7}"),
          Style::default().fg(Color::Cyan),
        ),
        Span::styled(
          elapsed(call, now),
          Style::default().fg(Color::DarkGray),
        ),
      ]))
    })
    .collect();

  let mut state = ListState::default();
  state.select(Some(app.list_cursor));

  f.render_stateful_widget(
    List::new(items).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    inner_area,
    &mut state,
  );
}
