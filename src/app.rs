use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::pipeline::{SearchPipeline, Selection};
use crate::swapi::gateway::Gateway;
use crate::swapi::prefetch::Prefetcher;
use crate::swapi::resolver::Resolver;
use crate::ui;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::{PeopleListView, PersonDetailView};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::{Duration, Instant};
use tracing::info;

/// Which pane receives keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
  List,
  Detail,
}

/// Main application state
pub struct App {
  list: PeopleListView,
  detail: PersonDetailView,
  prefetcher: Prefetcher,
  gateway: Gateway,
  base_url: String,
  focus: Focus,
  should_quit: bool,
}

impl App {
  pub fn new(config: &Config, gateway: Gateway) -> Self {
    let search = SearchPipeline::new(
      gateway.clone(),
      config.api.base_url.clone(),
      config.search.debounce(),
    );
    let resolver = Resolver::new(gateway.clone()).with_co_cast_limit(config.detail.co_cast_limit);

    Self {
      list: PeopleListView::new(search),
      detail: PersonDetailView::new(Selection::new(resolver)),
      prefetcher: Prefetcher::new(gateway.clone(), config.detail.prefetch_films),
      gateway,
      base_url: config.api.base_url.clone(),
      focus: Focus::List,
      should_quit: false,
    }
  }

  pub async fn run(&mut self, initial_query: &str) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = self.event_loop(&mut terminal, initial_query).await;

    // Cleanup terminal, even if the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop<B: Backend>(
    &mut self,
    terminal: &mut Terminal<B>,
    initial_query: &str,
  ) -> Result<()> {
    let mut events = EventHandler::new(Duration::from_millis(100));
    info!(query = initial_query, "starting");
    self.list.start(initial_query);

    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(Event::Key(key)) => self.handle_key(key),
        Some(Event::Resize) | Some(Event::Tick) => {}
        None => break,
      }
      // Keystrokes can starve ticks, so advance the clocks after every event
      self.tick(Instant::now());
    }

    Ok(())
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    let editing = self.focus == Focus::List && self.list.is_editing();
    if matches!(key.code, KeyCode::Tab | KeyCode::BackTab) && !editing {
      self.toggle_focus();
      return;
    }

    let action = match self.focus {
      Focus::List => self.list.handle_key(key),
      Focus::Detail => self.detail.handle_key(key),
    };
    self.apply(action);
  }

  fn toggle_focus(&mut self) {
    self.focus = match self.focus {
      Focus::List if self.detail.is_open() => Focus::Detail,
      _ => Focus::List,
    };
  }

  fn apply(&mut self, action: ViewAction) {
    match action {
      ViewAction::None => {}
      ViewAction::Hover(url) => self.prefetcher.prefetch_person(&url),
      ViewAction::Prefetch(url) => self.prefetcher.prefetch(&url),
      ViewAction::Select(url) => self.detail.select(&url),
      ViewAction::Deselect => {
        self.detail.deselect();
        self.focus = Focus::List;
      }
      ViewAction::Quit => self.should_quit = true,
    }
  }

  fn tick(&mut self, now: Instant) {
    self.list.tick(now);
    self.detail.tick(now);
  }

  // Accessors for UI rendering
  pub fn focus(&self) -> Focus {
    self.focus
  }

  pub fn panes(&mut self) -> (&mut PeopleListView, &mut PersonDetailView) {
    (&mut self.list, &mut self.detail)
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  /// Number of cached responses, `None` while the cache is empty
  pub fn cached_entries(&self) -> Option<usize> {
    let cache = self.gateway.cache();
    if cache.is_empty() {
      None
    } else {
      Some(cache.len())
    }
  }

  pub fn is_editing(&self) -> bool {
    self.focus == Focus::List && self.list.is_editing()
  }

  pub fn shortcuts(&self) -> Vec<ShortcutInfo> {
    match self.focus {
      Focus::List => self.list.shortcuts(),
      Focus::Detail => self.detail.shortcuts(),
    }
  }
}
