//! Serde views over SWAPI payloads.
//!
//! The cache stores raw JSON; these types are derived from it at use sites so
//! unknown fields are ignored and missing ones fall back to defaults.

use serde::{Deserialize, Serialize};

// ============================================================================
// Entities
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Person {
  pub name: String,
  pub height: String,
  pub mass: String,
  pub birth_year: String,
  pub eye_color: String,
  pub gender: String,
  pub homeworld: Option<String>,
  pub films: Vec<String>,
  pub starships: Vec<String>,
  pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Film {
  pub title: String,
  pub episode_id: u32,
  pub release_date: String,
  pub characters: Vec<String>,
  pub url: String,
}

impl Film {
  /// Release year parsed from `release_date` (`YYYY-MM-DD`).
  pub fn release_year(&self) -> Option<i32> {
    chrono::NaiveDate::parse_from_str(&self.release_date, "%Y-%m-%d")
      .ok()
      .map(|d| chrono::Datelike::year(&d))
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Planet {
  pub name: String,
  pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Starship {
  pub name: String,
  pub model: String,
  pub url: String,
}

// ============================================================================
// List endpoint response
// ============================================================================

/// One page of the people list.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ListPage {
  pub results: Vec<Person>,
  pub next: Option<String>,
  pub previous: Option<String>,
  pub count: u64,
}

// ============================================================================
// Resolved detail
// ============================================================================

/// A person who shares at least one film with the selected person.
#[derive(Debug, Clone, PartialEq)]
pub struct CoCastMember {
  pub name: String,
  pub url: String,
}

/// Detail view model assembled by the resolver for one selected person.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonDetail {
  pub person: Person,
  pub homeworld: Option<Planet>,
  /// Sorted by episode ascending
  pub films: Vec<Film>,
  pub starships: Vec<Starship>,
  pub co_cast: Vec<CoCastMember>,
}
