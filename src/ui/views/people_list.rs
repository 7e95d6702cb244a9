use crate::pipeline::SearchPipeline;
use crate::query::QueryState;
use crate::swapi::types::Person;
use crate::ui::components::{InputResult, TextInput};
use crate::ui::renderfns::{ensure_valid_selection, or_unknown, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use std::time::Instant;

/// Search box plus the current page of people
pub struct PeopleListView {
  search: SearchPipeline,
  input: TextInput,
  editing: bool,
  list_state: ListState,
}

impl PeopleListView {
  pub fn new(search: SearchPipeline) -> Self {
    Self {
      search,
      input: TextInput::new(),
      editing: false,
      list_state: ListState::default(),
    }
  }

  /// Load the first page for `query` right away.
  pub fn start(&mut self, query: &str) {
    self.input = TextInput::with_value(query);
    self.search.start(query);
  }

  fn people(&self) -> &[Person] {
    self.search.results()
  }

  fn highlighted(&self) -> Option<&Person> {
    self.list_state.selected().and_then(|i| self.people().get(i))
  }

  fn move_highlight(&mut self, delta: i32) -> ViewAction {
    let len = self.people().len();
    if len == 0 {
      return ViewAction::None;
    }
    let next = match self.list_state.selected() {
      Some(current) => (current as i32 + delta).rem_euclid(len as i32) as usize,
      None => 0,
    };
    self.list_state.select(Some(next));
    self.hover()
  }

  fn hover(&self) -> ViewAction {
    match self.highlighted() {
      Some(person) if !person.url.is_empty() => ViewAction::Hover(person.url.clone()),
      _ => ViewAction::None,
    }
  }

  fn handle_input_key(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match self.input.handle_key(key) {
      InputResult::Changed => {
        self.search.set_text(self.input.value(), Instant::now());
        Some(ViewAction::None)
      }
      InputResult::Consumed => Some(ViewAction::None),
      InputResult::Submitted(_) => {
        self.editing = false;
        self.search.submit();
        Some(ViewAction::None)
      }
      InputResult::Cancelled => {
        self.editing = false;
        Some(ViewAction::None)
      }
      InputResult::NotHandled => None,
    }
  }

  fn title(&self) -> String {
    match self.search.state() {
      QueryState::Loading => " People (loading...) ".to_string(),
      QueryState::Error(e) => format!(" People (error: {}) ", e),
      QueryState::Success(page) => format!(
        " People p.{} ({} matching) ",
        self.search.page_number(),
        page.count
      ),
      QueryState::Idle => " People ".to_string(),
    }
  }

  fn render_search_box(&self, frame: &mut Frame, area: Rect) {
    let style = if self.editing {
      Style::default().fg(Color::Yellow)
    } else {
      Style::default().fg(Color::DarkGray)
    };
    let mut spans = vec![
      Span::styled(" / ", Style::default().fg(Color::Cyan)),
      Span::styled(self.input.value(), style),
    ];
    if self.search.is_pending() || self.search.is_loading() {
      spans.push(Span::styled(" ...", Style::default().fg(Color::DarkGray)));
    }
    let line = Line::from(spans);
    frame.render_widget(Paragraph::new(line), area);

    if self.editing {
      let x = area.x + 3 + self.input.cursor_position() as u16;
      frame.set_cursor_position((x.min(area.right().saturating_sub(1)), area.y));
    }
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    // Results are hidden while a load is in flight
    let message = match self.search.state() {
      QueryState::Loading => Some("Searching...".to_string()),
      QueryState::Error(e) => Some(format!("Error: {}\n\nPress 'r' to retry.", e)),
      QueryState::Success(page) if page.results.is_empty() => Some("No people found.".to_string()),
      QueryState::Idle => Some("Press / to search.".to_string()),
      QueryState::Success(_) => None,
    };

    if let Some(message) = message {
      let paragraph = Paragraph::new(message).style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let len = self.people().len();
    ensure_valid_selection(&mut self.list_state, len);

    let items: Vec<ListItem> = self
      .people()
      .iter()
      .map(|person| {
        ListItem::new(Line::from(vec![
          Span::styled(
            format!("{:<24}", truncate(&person.name, 24)),
            Style::default().fg(Color::Cyan),
          ),
          Span::raw(" "),
          Span::styled(
            truncate(or_unknown(&person.birth_year), 10),
            Style::default().fg(Color::DarkGray),
          ),
        ]))
      })
      .collect();

    let list = List::new(items)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);
  }
}

impl View for PeopleListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.editing {
      if let Some(action) = self.handle_input_key(key) {
        return action;
      }
    }

    match key.code {
      KeyCode::Char('/') => {
        self.editing = true;
        ViewAction::None
      }
      KeyCode::Char('j') | KeyCode::Down => self.move_highlight(1),
      KeyCode::Char('k') | KeyCode::Up => self.move_highlight(-1),
      KeyCode::Char('n') | KeyCode::Right => {
        if self.search.next_page() {
          self.list_state.select(None);
        }
        ViewAction::None
      }
      KeyCode::Char('p') | KeyCode::Left => {
        if self.search.previous_page() {
          self.list_state.select(None);
        }
        ViewAction::None
      }
      KeyCode::Char('r') => {
        self.search.reload();
        ViewAction::None
      }
      KeyCode::Enter => match self.highlighted() {
        Some(person) if !person.url.is_empty() => ViewAction::Select(person.url.clone()),
        _ => ViewAction::None,
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

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1), // Search box
        Constraint::Min(1),    // Results
      ])
      .split(inner);

    self.render_search_box(frame, chunks[0]);
    self.render_list(frame, chunks[1]);
  }

  fn tick(&mut self, now: Instant) -> bool {
    self.search.tick(now)
  }

  fn is_editing(&self) -> bool {
    self.editing
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    if self.editing {
      return vec![
        ShortcutInfo::new("enter", "search").with_priority(10),
        ShortcutInfo::new("esc", "done").with_priority(20),
      ];
    }
    vec![
      ShortcutInfo::new("/", "search").with_priority(10),
      ShortcutInfo::new("enter", "open").with_priority(20),
      ShortcutInfo::new("n/p", "page").with_priority(30),
      ShortcutInfo::new("r", "reload").with_priority(40),
      ShortcutInfo::new("tab", "detail").with_priority(50),
      ShortcutInfo::new("q", "quit").with_priority(90),
    ]
  }
}
