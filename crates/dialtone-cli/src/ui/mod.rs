//! Dashboard rendering: header, load chart, call list, detail pane and
//! status bar.

pub mod call_detail;
pub mod call_list;

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Sparkline},
};

use crate::app::{App, HISTORY_LEN};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Length(4), // chart
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(f.area());

  draw_header(f, rows[0], app);
  draw_chart(f, rows[1], app);
  draw_body(f, rows[2], app);
  draw_status(f, rows[3], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let load = if app.count >= app.limit {
    Color::Red
  } else if app.count * 4 >= app.limit * 3 {
    Color::Yellow
  } else {
    Color::Green
  };

  let left = vec![
    Span::styled(
      " dialtone  ",
      Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    Span::styled(
      format!("{}/{} active", app.count, app.limit),
      Style::default().fg(load).add_modifier(Modifier::BOLD),
    ),
  ];
  let right = Span::styled(
    match app.last_updated {
      Some(at) => format!(
        "{}  updated {} ",
        app.client.base_url(),
        at.format("%H:%M:%S")
      ),
      None => format!("{}  connecting… ", app.client.base_url()),
    },
    Style::default().fg(Color::Gray),
  );

  let left_width: usize = left.iter().map(|s| s.content.chars().count()).sum();
  let pad = (area.width as usize)
    .saturating_sub(left_width)
    .saturating_sub(right.content.chars().count());

  let mut spans = left;
  spans.push(Span::raw(" ".repeat(pad)));
  spans.push(right);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(Line::from(spans)), inner);
}

// ─── Chart ────────────────────────────────────────────────────────────────────

/// Recent active-call counts, scaled so a full bar is the admission limit.
fn draw_chart(f: &mut Frame, area: Rect, app: &App) {
  let block = Block::default()
    .borders(Borders::ALL)
    .title(format!(" Active calls (last {HISTORY_LEN}) "));
  let chart = Sparkline::default()
    .block(block)
    .data(&app.history)
    .max(app.limit as u64)
    .style(Style::default().fg(Color::Cyan));
  f.render_widget(chart, area);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body(f: &mut Frame, area: Rect, app: &App) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
    .split(area);

  call_list::draw(f, cols[0], app);
  call_detail::draw(f, cols[1], app);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = if app.filter_active {
    ("SEARCH", "Type to filter  Esc cancel  Enter keep")
  } else {
    ("NORMAL", "↑↓/jk navigate  / search  r refresh  q quit")
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let status_style = if app.status_msg.is_empty() {
    Style::default().fg(Color::DarkGray)
  } else {
    Style::default().fg(Color::Red)
  };

  let line = Line::from(vec![
    mode_span,
    Span::styled(format!("  {status}"), status_style),
  ]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}
