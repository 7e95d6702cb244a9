pub mod components;
pub mod renderfns;
pub mod view;
pub mod views;

use crate::app::{App, Focus};
use crate::ui::view::View;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Panes
      Constraint::Length(1), // Status bar
    ])
    .split(frame.area());

  let shortcuts = app.shortcuts();
  renderfns::draw_header(
    frame,
    chunks[0],
    app.base_url(),
    app.cached_entries(),
    &shortcuts,
  );

  let panes = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
    .split(chunks[1]);

  let focus = app.focus();
  let (list, detail) = app.panes();
  list.render(frame, panes[0], focus == Focus::List);
  detail.render(frame, panes[1], focus == Focus::Detail);

  draw_status_bar(frame, chunks[2], app);
}

fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
  let (content, style) = if app.is_editing() {
    (
      " typing searches after a short pause  Enter:search now  Esc:done",
      Style::default().fg(Color::Yellow),
    )
  } else {
    (
      " /:search  j/k:nav  Enter:open  n/p:page  Tab:switch pane  Ctrl-C:quit",
      Style::default().fg(Color::DarkGray),
    )
  };

  frame.render_widget(Paragraph::new(content).style(style), area);
}
