use crate::pipeline::Selection;
use crate::query::QueryState;
use crate::swapi::types::{Film, PersonDetail};
use crate::ui::renderfns::{ensure_valid_selection, or_unknown, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use std::time::Instant;

/// The selected person with homeworld, films, starships and co-cast
pub struct PersonDetailView {
  selection: Selection,
  co_cast_state: ListState,
}

impl PersonDetailView {
  pub fn new(selection: Selection) -> Self {
    Self {
      selection,
      co_cast_state: ListState::default(),
    }
  }

  pub fn select(&mut self, url: &str) {
    self.co_cast_state.select(None);
    self.selection.select(url);
  }

  pub fn deselect(&mut self) {
    self.co_cast_state.select(None);
    self.selection.deselect();
  }

  pub fn is_open(&self) -> bool {
    self.selection.selected().is_some()
  }

  fn highlighted_url(&self) -> Option<String> {
    let detail = self.selection.detail()?;
    let index = self.co_cast_state.selected()?;
    detail.co_cast.get(index).map(|member| member.url.clone())
  }

  fn move_highlight(&mut self, delta: i32) -> ViewAction {
    let len = self.selection.detail().map(|d| d.co_cast.len()).unwrap_or(0);
    if len == 0 {
      return ViewAction::None;
    }
    let next = match self.co_cast_state.selected() {
      Some(current) => (current as i32 + delta).rem_euclid(len as i32) as usize,
      None => 0,
    };
    self.co_cast_state.select(Some(next));
    self
      .highlighted_url()
      .map(ViewAction::Prefetch)
      .unwrap_or(ViewAction::None)
  }

  fn title(&self) -> String {
    match self.selection.state() {
      QueryState::Idle => " Detail ".to_string(),
      QueryState::Loading => " Detail (loading...) ".to_string(),
      QueryState::Error(_) => " Detail (error) ".to_string(),
      QueryState::Success(detail) => format!(" {} ", detail.person.name),
    }
  }

  fn render_detail(&mut self, frame: &mut Frame, area: Rect, focused: bool) {
    let detail = match self.selection.state() {
      QueryState::Idle => {
        let paragraph = Paragraph::new("Highlight a person and press Enter.")
          .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(paragraph, area);
        return;
      }
      QueryState::Loading => {
        let paragraph =
          Paragraph::new("Resolving relations...").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(paragraph, area);
        return;
      }
      QueryState::Error(e) => {
        let paragraph = Paragraph::new(format!("Error: {}\n\nPress 'r' to retry.", e))
          .style(Style::default().fg(Color::Red));
        frame.render_widget(paragraph, area);
        return;
      }
      QueryState::Success(detail) => detail,
    };

    let lines = summary_lines(detail);
    let summary_height = lines.len() as u16;
    let co_cast: Vec<ListItem> = detail
      .co_cast
      .iter()
      .map(|member| ListItem::new(truncate(&member.name, 40)))
      .collect();
    let co_cast_title = format!(" Appears with ({}) ", detail.co_cast.len());

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(summary_height), // Attributes and relations
        Constraint::Min(3),                 // Co-cast
      ])
      .split(area);

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), chunks[0]);

    let len = co_cast.len();
    if focused {
      ensure_valid_selection(&mut self.co_cast_state, len);
    }
    let list = List::new(co_cast)
      .block(
        Block::default()
          .title(co_cast_title)
          .borders(Borders::TOP)
          .border_style(Style::default().fg(Color::DarkGray)),
      )
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");
    frame.render_stateful_widget(list, chunks[1], &mut self.co_cast_state);
  }
}

/// "Ep 4  A New Hope (1977)"
fn film_label(film: &Film) -> String {
  match film.release_year() {
    Some(year) => format!("Ep {}  {} ({})", film.episode_id, film.title, year),
    None => format!("Ep {}  {}", film.episode_id, film.title),
  }
}

fn field<'a>(label: &'a str, value: &'a str) -> Line<'a> {
  Line::from(vec![
    Span::styled(format!("{:<11}", label), Style::default().fg(Color::DarkGray)),
    Span::raw(or_unknown(value)),
  ])
}

fn summary_lines(detail: &PersonDetail) -> Vec<Line<'_>> {
  let person = &detail.person;
  let mut lines = vec![
    field("Height", &person.height),
    field("Mass", &person.mass),
    field("Born", &person.birth_year),
    field("Eyes", &person.eye_color),
    field("Gender", &person.gender),
    field(
      "Homeworld",
      detail.homeworld.as_ref().map(|p| p.name.as_str()).unwrap_or(""),
    ),
    Line::raw(""),
    Line::styled(
      format!("Films ({})", detail.films.len()),
      Style::default().fg(Color::Yellow),
    ),
  ];
  lines.extend(detail.films.iter().map(|f| Line::raw(format!("  {}", film_label(f)))));

  lines.push(Line::raw(""));
  lines.push(Line::styled(
    format!("Starships ({})", detail.starships.len()),
    Style::default().fg(Color::Yellow),
  ));
  lines.extend(detail.starships.iter().map(|s| {
    Line::from(vec![
      Span::raw(format!("  {}", s.name)),
      Span::styled(format!("  {}", s.model), Style::default().fg(Color::DarkGray)),
    ])
  }));
  lines
}

impl View for PersonDetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.move_highlight(1),
      KeyCode::Char('k') | KeyCode::Up => self.move_highlight(-1),
      KeyCode::Enter => self
        .highlighted_url()
        .map(ViewAction::Select)
        .unwrap_or(ViewAction::None),
      KeyCode::Char('r') => match self.selection.selected().map(str::to_string) {
        Some(url) => ViewAction::Select(url),
        None => ViewAction::None,
      },
      KeyCode::Esc => ViewAction::Deselect,
      KeyCode::Char('q') => ViewAction::Quit,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect, focused: bool) {
    let border = if focused { Color::Blue } else { Color::DarkGray };
    let block = Block::default()
      .title(self.title())
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(border));

    let inner = block.inner(area);
    frame.render_widget(block, area);
    self.render_detail(frame, inner, focused);
  }

  fn tick(&mut self, _now: Instant) -> bool {
    self.selection.tick()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("j/k", "co-cast").with_priority(10),
      ShortcutInfo::new("enter", "open").with_priority(20),
      ShortcutInfo::new("r", "reload").with_priority(30),
      ShortcutInfo::new("esc", "close").with_priority(40),
      ShortcutInfo::new("tab", "list").with_priority(50),
      ShortcutInfo::new("q", "quit").with_priority(90),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::swapi::resolver::Resolver;
  use crate::swapi::testing::{gateway_for, FakeTransport};
  use crossterm::event::KeyModifiers;
  use serde_json::json;
  use std::time::Duration;

  const API: &str = "https://swapi.py4e.com/api/";

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn url(path: &str) -> String {
    format!("{}{}", API, path)
  }

  #[test]
  fn test_film_label() {
    let film = Film {
      title: "A New Hope".to_string(),
      episode_id: 4,
      release_date: "1977-05-25".to_string(),
      ..Default::default()
    };
    assert_eq!(film_label(&film), "Ep 4  A New Hope (1977)");

    let undated = Film {
      title: "The Phantom Menace".to_string(),
      episode_id: 1,
      ..Default::default()
    };
    assert_eq!(film_label(&undated), "Ep 1  The Phantom Menace");
  }

  #[tokio::test]
  async fn test_co_cast_navigation() {
    let fake = FakeTransport::new();
    fake.json(
      &url("people/1/"),
      json!({ "name": "Luke Skywalker", "films": [url("films/1/")], "url": url("people/1/") }),
    );
    fake.json(
      &url("films/1/"),
      json!({ "title": "A New Hope", "episode_id": 4, "characters": [url("people/1/"), url("people/2/"), url("people/3/")] }),
    );
    fake.json(&url("people/2/"), json!({ "name": "C-3PO" }));
    fake.json(&url("people/3/"), json!({ "name": "R2-D2" }));

    let mut view = PersonDetailView::new(Selection::new(Resolver::new(gateway_for(&fake))));
    assert_eq!(view.handle_key(key(KeyCode::Down)), ViewAction::None);

    view.select(&url("people/1/"));
    tokio::time::sleep(Duration::from_millis(50)).await;
    view.tick(Instant::now());
    assert!(view.is_open());

    assert_eq!(view.handle_key(key(KeyCode::Down)), ViewAction::Prefetch(url("people/2/")));
    assert_eq!(view.handle_key(key(KeyCode::Down)), ViewAction::Prefetch(url("people/3/")));
    assert_eq!(view.handle_key(key(KeyCode::Enter)), ViewAction::Select(url("people/3/")));
    assert_eq!(view.handle_key(key(KeyCode::Char('r'))), ViewAction::Select(url("people/1/")));

    view.deselect();
    assert!(!view.is_open());
    assert_eq!(view.handle_key(key(KeyCode::Enter)), ViewAction::None);
  }
}
