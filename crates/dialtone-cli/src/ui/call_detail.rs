//! Detail pane for the call under the cursor, right panel.

use chrono::{Local, Utc};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::app::{App, elapsed};

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let call = app.cursor_call();

  let title = match call {
    Some(c) => format!(" {} ", c.record.call_id),
    None => " Detail ".to_string(),
  };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let Some(call) = call else {
    f.render_widget(
      Paragraph::new("Select a call with j/k.")
        .style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  };

  let record = &call.record;
  let started = record
    .start_time
    .with_timezone(&Local)
    .format("%Y-%m-%d %H:%M:%S")
    .to_string();
  let selection = record
    .ivr_selection
    .map(|s| s.to_string())
    .unwrap_or_else(|| "(in menu)".to_string());

  let rows = [
    ("Call ID", record.call_id.clone()),
    ("From", record.from_address.clone()),
    ("To", record.to_address.clone()),
    ("Selection", selection),
    ("Started", started),
    ("Elapsed", elapsed(call, Utc::now())),
  ];

  let lines: Vec<Line> = rows
    .into_iter()
    .map(|(label, value)| {
      Line::from(vec![
        Span::styled(
          format!("{label:<12}"),
          Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
        ),
        Span::raw(value),
      ])
    })
    .collect();

  f.render_widget(Paragraph::new(lines), inner);
}
