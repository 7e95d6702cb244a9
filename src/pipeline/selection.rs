//! The currently selected person and its resolved detail.

use tracing::info;

use crate::query::{Query, QueryState};
use crate::swapi::resolver::Resolver;
use crate::swapi::types::PersonDetail;

pub struct Selection {
  resolver: Resolver,
  selected: Option<String>,
  detail: Query<PersonDetail>,
}

impl Selection {
  pub fn new(resolver: Resolver) -> Self {
    Self {
      resolver,
      selected: None,
      detail: Query::new(),
    }
  }

  /// Select a person, replacing any previous selection and abandoning its
  /// resolution.
  pub fn select(&mut self, url: &str) {
    info!(url, "selected");
    self.selected = Some(url.to_string());

    let resolver = self.resolver.clone();
    let url = url.to_string();
    self.detail.start(async move {
      resolver.resolve(&url).await.map_err(|e| e.to_string())
    });
  }

  pub fn deselect(&mut self) {
    self.selected = None;
    self.detail.clear();
  }

  /// Apply an arrived resolution. Returns `true` if the detail changed.
  pub fn tick(&mut self) -> bool {
    self.detail.poll()
  }

  pub fn selected(&self) -> Option<&str> {
    self.selected.as_deref()
  }

  pub fn state(&self) -> &QueryState<PersonDetail> {
    self.detail.state()
  }

  pub fn detail(&self) -> Option<&PersonDetail> {
    self.detail.data()
  }
}
