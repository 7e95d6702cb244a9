//! Speculative cache warming.
//!
//! Everything here is detached and best-effort: no handle is returned, no
//! error is reported, and nothing ever touches view state. Removing every
//! call site would only make the UI slower.

use futures::future::join_all;
use tracing::debug;

use super::gateway::{Freshness, Gateway};
use super::types::Person;

#[derive(Clone)]
pub struct Prefetcher {
  gateway: Gateway,
  related_films: usize,
}

impl Prefetcher {
  pub fn new(gateway: Gateway, related_films: usize) -> Self {
    Self {
      gateway,
      related_films,
    }
  }

  /// Refresh a single resource in the background.
  pub fn prefetch(&self, url: &str) {
    let gateway = self.gateway.clone();
    let url = url.to_string();
    tokio::spawn(async move {
      warm(&gateway, &url, Freshness::Revalidate).await;
    });
  }

  /// Refresh a person in the background, then warm its homeworld and
  /// first few films.
  pub fn prefetch_person(&self, url: &str) {
    let gateway = self.gateway.clone();
    let url = url.to_string();
    let related_films = self.related_films;

    tokio::spawn(async move {
      let person = match gateway.fetch_as::<Person>(&url, Freshness::Revalidate).await {
        Ok(person) => Some(person),
        Err(e) => {
          debug!(%url, error = %e, "prefetch failed");
          gateway.cached_as::<Person>(&url)
        }
      };

      let person = match person {
        Some(person) => person,
        None => return,
      };

      let related = person
        .homeworld
        .iter()
        .filter(|u| !u.is_empty())
        .chain(person.films.iter().take(related_films));
      join_all(related.map(|u| warm(&gateway, u, Freshness::Revalidate))).await;
    });
  }
}

async fn warm(gateway: &Gateway, url: &str, freshness: Freshness) {
  if let Err(e) = gateway.fetch(url, freshness).await {
    debug!(url, error = %e, "prefetch failed");
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::swapi::testing::{gateway_for, FakeTransport};
  use serde_json::json;
  use std::time::Duration;

  const LUKE: &str = "https://swapi.py4e.com/api/people/1/";
  const TATOOINE: &str = "https://swapi.py4e.com/api/planets/1/";

  fn film(id: usize) -> String {
    format!("https://swapi.py4e.com/api/films/{}/", id)
  }

  async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
  }

  #[tokio::test]
  async fn test_prefetch_warms_cache() {
    let fake = FakeTransport::new();
    fake.json(TATOOINE, json!({ "name": "Tatooine" }));
    let gateway = gateway_for(&fake);
    let prefetcher = Prefetcher::new(gateway.clone(), 3);

    prefetcher.prefetch(TATOOINE);
    settle().await;

    assert!(gateway.cache().get(TATOOINE).is_some());
  }

  #[tokio::test]
  async fn test_prefetch_person_warms_relations() {
    let fake = FakeTransport::new();
    let films: Vec<String> = (1..=5).map(film).collect();
    fake.json(
      LUKE,
      json!({ "name": "Luke", "homeworld": TATOOINE, "films": films }),
    );
    fake.json(TATOOINE, json!({ "name": "Tatooine" }));
    for url in &films {
      fake.json(url, json!({ "title": url }));
    }
    let gateway = gateway_for(&fake);
    let prefetcher = Prefetcher::new(gateway.clone(), 3);

    prefetcher.prefetch_person(LUKE);
    settle().await;

    assert!(gateway.cache().get(LUKE).is_some());
    assert!(gateway.cache().get(TATOOINE).is_some());
    assert_eq!(fake.hits(&film(1)), 1);
    assert_eq!(fake.hits(&film(3)), 1);
    assert_eq!(fake.hits(&film(4)), 0);
  }

  #[tokio::test]
  async fn test_prefetch_person_falls_back_to_cached_payload() {
    let fake = FakeTransport::new();
    fake.status(LUKE, 500);
    fake.json(TATOOINE, json!({ "name": "Tatooine" }));
    let gateway = gateway_for(&fake);
    gateway
      .cache()
      .put(LUKE, json!({ "name": "Luke", "homeworld": TATOOINE }));
    let prefetcher = Prefetcher::new(gateway.clone(), 3);

    prefetcher.prefetch_person(LUKE);
    settle().await;

    assert_eq!(fake.hits(TATOOINE), 1);
    assert!(gateway.cache().get(TATOOINE).is_some());
  }

  #[tokio::test]
  async fn test_prefetch_person_refreshes_cached_relations() {
    let fake = FakeTransport::new();
    fake.json(LUKE, json!({ "name": "Luke", "homeworld": TATOOINE }));
    fake.json(TATOOINE, json!({ "name": "Tatooine", "climate": "arid" }));
    let gateway = gateway_for(&fake);
    gateway.cache().put(TATOOINE, json!({ "name": "Tatooine" }));
    let prefetcher = Prefetcher::new(gateway.clone(), 3);

    prefetcher.prefetch_person(LUKE);
    settle().await;

    assert_eq!(fake.hits(TATOOINE), 1);
    assert_eq!(gateway.cache().get(TATOOINE).unwrap().payload["climate"], json!("arid"));
  }

  #[tokio::test]
  async fn test_failures_are_silent() {
    let fake = FakeTransport::new();
    let gateway = gateway_for(&fake);
    let prefetcher = Prefetcher::new(gateway.clone(), 3);

    // Nothing is routed: every request answers 404
    prefetcher.prefetch(TATOOINE);
    prefetcher.prefetch_person(LUKE);
    settle().await;

    assert_eq!(gateway.cache().len(), 0);
    assert_eq!(fake.total_hits(), 2);
  }
}
