//! Relational resolution of a selected person.

use futures::future::join_all;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use tracing::{debug, info};

use super::gateway::{FetchError, Freshness, Gateway};
use super::types::{CoCastMember, Film, Person, PersonDetail, Planet, Starship};

/// Upper bound on co-cast members resolved for one person.
pub const CO_CAST_LIMIT: usize = 24;

/// Assembles a [`PersonDetail`] from one person URL.
#[derive(Clone)]
pub struct Resolver {
  gateway: Gateway,
  co_cast_limit: usize,
}

impl Resolver {
  pub fn new(gateway: Gateway) -> Self {
    Self {
      gateway,
      co_cast_limit: CO_CAST_LIMIT,
    }
  }

  /// Lower the co-cast limit. Values above [`CO_CAST_LIMIT`] are clamped.
  pub fn with_co_cast_limit(mut self, limit: usize) -> Self {
    self.co_cast_limit = limit.min(CO_CAST_LIMIT);
    self
  }

  /// Resolve a person and the graph around it.
  ///
  /// Only a failure to obtain the person itself is an error. Homeworld,
  /// films, starships and co-cast members that fail to load are left out.
  pub async fn resolve(&self, url: &str) -> Result<PersonDetail, FetchError> {
    let person: Person = self.gateway.fetch_as(url, Freshness::Revalidate).await?;
    info!(name = %person.name, "resolving relations");

    let homeworld = async {
      match person.homeworld.as_deref() {
        Some(url) if !url.is_empty() => self.related::<Planet>(url).await,
        _ => None,
      }
    };
    let films = join_all(person.films.iter().map(|url| self.related::<Film>(url)));
    let starships = join_all(person.starships.iter().map(|url| self.related::<Starship>(url)));

    let (homeworld, films, starships) = tokio::join!(homeworld, films, starships);

    let mut films: Vec<Film> = films.into_iter().flatten().collect();
    films.sort_by_key(|film| film.episode_id);
    let starships: Vec<Starship> = starships.into_iter().flatten().collect();

    // One request at a time: this is the widest fan-out in the graph
    let mut co_cast = Vec::new();
    for url in self.co_cast_candidates(&films, &[url, person.url.as_str()]) {
      if let Some(member) = self.related::<Person>(&url).await {
        co_cast.push(CoCastMember {
          name: member.name,
          url,
        });
      }
    }

    Ok(PersonDetail {
      person,
      homeworld,
      films,
      starships,
      co_cast,
    })
  }

  /// Characters of `films`, normalized and deduplicated in first-seen order,
  /// excluding `exclude`, capped at the co-cast limit.
  fn co_cast_candidates(&self, films: &[Film], exclude: &[&str]) -> Vec<String> {
    let mut seen: HashSet<String> = exclude
      .iter()
      .filter(|url| !url.is_empty())
      .map(|url| self.gateway.normalize(url))
      .collect();

    films
      .iter()
      .flat_map(|film| film.characters.iter())
      .filter(|url| !url.is_empty())
      .map(|url| self.gateway.normalize(url))
      .filter(|key| seen.insert(key.clone()))
      .take(self.co_cast_limit)
      .collect()
  }

  /// Cache-first fetch of a related entity, absent on any failure.
  async fn related<T: DeserializeOwned>(&self, url: &str) -> Option<T> {
    match self.gateway.fetch_as(url, Freshness::CacheFirst).await {
      Ok(entity) => Some(entity),
      Err(e) => {
        debug!(url, error = %e, "dropping unresolved relation");
        None
      }
    }
  }
}
