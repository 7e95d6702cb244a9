//! URL canonicalization and SWAPI request URLs.
//!
//! Every cache key and every cross-entity reference goes through
//! [`Normalizer::normalize`] so that `http://swapi.dev/api/people/1/` and
//! `https://swapi.py4e.com/api/people/1/` land on the same cache entry.

use url::Url;

use crate::config::ApiConfig;

/// Rewrites entity URLs to their canonical form.
#[derive(Debug, Clone)]
pub struct Normalizer {
  canonical_host: String,
  deprecated_hosts: Vec<String>,
  upgrade_insecure: bool,
}

impl Normalizer {
  pub fn new(
    canonical_host: impl Into<String>,
    deprecated_hosts: Vec<String>,
    upgrade_insecure: bool,
  ) -> Self {
    Self {
      canonical_host: canonical_host.into(),
      deprecated_hosts: deprecated_hosts
        .into_iter()
        .map(|h| h.to_lowercase())
        .collect(),
      upgrade_insecure,
    }
  }

  pub fn from_config(api: &ApiConfig) -> Self {
    Self::new(
      api.canonical_host.clone(),
      api.deprecated_hosts.clone(),
      api.upgrade_insecure,
    )
  }

  /// Canonicalize a URL.
  ///
  /// Input that does not parse as an absolute URL is returned unchanged.
  pub fn normalize(&self, raw: &str) -> String {
    let mut url = match Url::parse(raw) {
      Ok(url) => url,
      Err(_) => return raw.to_string(),
    };

    if self.upgrade_insecure && url.scheme() == "http" && url.set_scheme("https").is_err() {
      return raw.to_string();
    }

    let deprecated = url
      .host_str()
      .map(|host| self.deprecated_hosts.iter().any(|d| d == host))
      .unwrap_or(false);
    if deprecated && url.set_host(Some(&self.canonical_host)).is_err() {
      return raw.to_string();
    }

    url.into()
  }
}

impl Default for Normalizer {
  fn default() -> Self {
    Self::from_config(&ApiConfig::default())
  }
}

/// Build the people list URL for a page and an optional search term.
///
/// The search parameter is omitted when the trimmed query is empty.
pub fn people_page(base: &str, page: u32, query: &str) -> String {
  let people = Url::parse(base).and_then(|b| b.join("people/"));
  let mut url = match people {
    Ok(url) => url,
    Err(_) => {
      // Fall back to plain concatenation for a base we cannot parse
      let q = query.trim();
      return if q.is_empty() {
        format!("{}people/?page={}", base, page)
      } else {
        format!("{}people/?search={}&page={}", base, q, page)
      };
    }
  };

  {
    let mut pairs = url.query_pairs_mut();
    let q = query.trim();
    if !q.is_empty() {
      pairs.append_pair("search", q);
    }
    pairs.append_pair("page", &page.to_string());
  }

  url.into()
}

/// Extract the `page` parameter of a list URL, defaulting to 1.
pub fn page_number(list_url: &str) -> u32 {
  Url::parse(list_url)
    .ok()
    .and_then(|url| {
      url
        .query_pairs()
        .find(|(k, _)| k == "page")
        .and_then(|(_, v)| v.parse().ok())
    })
    .filter(|page| *page > 0)
    .unwrap_or(1)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_upgrades_scheme_and_host() {
    let n = Normalizer::default();
    assert_eq!(
      n.normalize("http://swapi.dev/api/people/1/"),
      "https://swapi.py4e.com/api/people/1/"
    );
  }

  #[test]
  fn test_variants_share_a_key() {
    let n = Normalizer::default();
    let variants = [
      "http://swapi.dev/api/films/2/",
      "https://swapi.dev/api/films/2/",
      "http://swapi.py4e.com/api/films/2/",
      "https://swapi.py4e.com/api/films/2/",
    ];
    for v in variants {
      assert_eq!(n.normalize(v), "https://swapi.py4e.com/api/films/2/");
    }
  }

  #[test]
  fn test_normalize_is_idempotent() {
    let n = Normalizer::default();
    let inputs = [
      "http://swapi.dev/api/people/1/",
      "https://swapi.py4e.com/api/people/?search=luke&page=2",
      "HTTP://SWAPI.DEV/api/planets/1/",
      "https://example.com",
      "not a url",
      "",
      "/api/people/1/",
    ];
    for input in inputs {
      let once = n.normalize(input);
      assert_eq!(n.normalize(&once), once, "input: {:?}", input);
    }
  }

  #[test]
  fn test_malformed_input_passes_through() {
    let n = Normalizer::default();
    assert_eq!(n.normalize("not a url"), "not a url");
    assert_eq!(n.normalize("/api/people/1/"), "/api/people/1/");
  }

  #[test]
  fn test_other_hosts_keep_their_host() {
    let n = Normalizer::default();
    assert_eq!(
      n.normalize("http://example.com/api/people/1/"),
      "https://example.com/api/people/1/"
    );
  }

  #[test]
  fn test_scheme_upgrade_can_be_disabled() {
    let n = Normalizer::new("swapi.py4e.com", vec![], false);
    assert_eq!(
      n.normalize("http://127.0.0.1:8080/api/people/1/"),
      "http://127.0.0.1:8080/api/people/1/"
    );
  }

  #[test]
  fn test_people_page_with_search() {
    let url = people_page("https://swapi.py4e.com/api/", 1, "  vader ");
    assert_eq!(
      url,
      "https://swapi.py4e.com/api/people/?search=vader&page=1"
    );
  }

  #[test]
  fn test_people_page_without_search() {
    let url = people_page("https://swapi.py4e.com/api/", 3, "   ");
    assert_eq!(url, "https://swapi.py4e.com/api/people/?page=3");
  }

  #[test]
  fn test_page_number() {
    assert_eq!(
      page_number("https://swapi.py4e.com/api/people/?search=a&page=4"),
      4
    );
    assert_eq!(page_number("https://swapi.py4e.com/api/people/"), 1);
    assert_eq!(page_number("garbage"), 1);
  }
}
