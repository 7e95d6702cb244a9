//! Debounced people search with pagination.

use std::time::{Duration, Instant};
use tracing::info;

use crate::debounce::Debouncer;
use crate::query::{Query, QueryState};
use crate::swapi::gateway::{Freshness, Gateway};
use crate::swapi::types::{ListPage, Person};
use crate::swapi::url::{page_number, people_page};

/// Search text → settled query → list URL → current page.
pub struct SearchPipeline {
  gateway: Gateway,
  base_url: String,
  debouncer: Debouncer,
  /// URL of the page currently shown or loading
  cursor: String,
  list: Query<ListPage>,
}

impl SearchPipeline {
  pub fn new(gateway: Gateway, base_url: impl Into<String>, debounce: Duration) -> Self {
    let base_url = base_url.into();
    let cursor = people_page(&base_url, 1, "");
    Self {
      gateway,
      base_url,
      debouncer: Debouncer::new(debounce),
      cursor,
      list: Query::new(),
    }
  }

  /// Load the first page for `initial` without waiting for the debounce.
  pub fn start(&mut self, initial: &str) {
    self.debouncer.set(initial, Instant::now());
    self.submit();
  }

  /// New search text; the list follows once typing pauses.
  pub fn set_text(&mut self, text: &str, now: Instant) {
    self.debouncer.set(text, now);
  }

  /// Search for the current text right away.
  pub fn submit(&mut self) {
    let query = self.debouncer.flush().to_string();
    self.goto(people_page(&self.base_url, 1, &query));
  }

  /// Go to the next page; no-op unless a loaded page links one.
  pub fn next_page(&mut self) -> bool {
    match self.page().and_then(|p| p.next.clone()) {
      Some(next) => {
        self.goto(next);
        true
      }
      None => false,
    }
  }

  /// Go to the previous page; no-op unless a loaded page links one.
  pub fn previous_page(&mut self) -> bool {
    match self.page().and_then(|p| p.previous.clone()) {
      Some(previous) => {
        self.goto(previous);
        true
      }
      None => false,
    }
  }

  /// Re-issue the current page request.
  pub fn reload(&mut self) {
    self.load();
  }

  /// Advance the debounce clock and apply arrived results.
  ///
  /// Returns `true` if anything visible changed.
  pub fn tick(&mut self, now: Instant) -> bool {
    let mut changed = false;

    if let Some(settled) = self.debouncer.poll(now).map(str::to_string) {
      self.goto(people_page(&self.base_url, 1, &settled));
      changed = true;
    }

    self.list.poll() || changed
  }

  pub fn state(&self) -> &QueryState<ListPage> {
    self.list.state()
  }

  pub fn page(&self) -> Option<&ListPage> {
    self.list.data()
  }

  pub fn results(&self) -> &[Person] {
    self.page().map(|p| p.results.as_slice()).unwrap_or(&[])
  }

  pub fn is_loading(&self) -> bool {
    self.list.is_loading()
  }

  /// Page number of the current cursor.
  pub fn page_number(&self) -> u32 {
    page_number(&self.cursor)
  }

  /// Typed text has not settled into a search yet.
  pub fn is_pending(&self) -> bool {
    self.debouncer.is_waiting()
  }

  fn goto(&mut self, url: String) {
    self.cursor = url;
    self.load();
  }

  fn load(&mut self) {
    info!(url = %self.cursor, "loading people");
    let gateway = self.gateway.clone();
    let url = self.cursor.clone();
    self.list.start(async move {
      gateway
        .fetch_as::<ListPage>(&url, Freshness::Revalidate)
        .await
        .map_err(|e| e.to_string())
    });
  }
}
