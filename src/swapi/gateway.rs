//! Cache-aware retrieval of SWAPI resources.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::cache::ResponseCache;

use super::transport::Transport;
use super::url::Normalizer;

/// Failure to obtain a payload.
///
/// `Status` and `Unreachable` are both network failures; they are kept
/// apart only for the message shown to the user and say nothing about
/// whether a retry could succeed.
#[derive(Debug, Error)]
pub enum FetchError {
  #[error("HTTP {0}")]
  Status(u16),
  #[error("network error: {0}")]
  Unreachable(String),
  #[error("malformed payload: {0}")]
  Parse(#[from] serde_json::Error),
}

/// How a fetch may use the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
  /// Serve a cached payload without touching the network when one exists
  CacheFirst,
  /// Always go to the network, then write the result through the cache
  Revalidate,
}

/// Network access with read-through / write-through caching.
///
/// Cheap to clone; all clones share one cache and one transport.
#[derive(Clone)]
pub struct Gateway {
  cache: Arc<ResponseCache>,
  transport: Arc<dyn Transport>,
  normalizer: Normalizer,
}

impl Gateway {
  pub fn new(
    cache: Arc<ResponseCache>,
    transport: Arc<dyn Transport>,
    normalizer: Normalizer,
  ) -> Self {
    Self {
      cache,
      transport,
      normalizer,
    }
  }

  /// Fetch the JSON payload at `url`.
  ///
  /// 1. Normalize the URL into its cache key
  /// 2. With `CacheFirst`, return a cached payload if there is one
  /// 3. Otherwise retrieve it; a non-success status is an error
  /// 4. Store the parsed payload and return it
  ///
  /// Failures leave the cache untouched.
  pub async fn fetch(&self, url: &str, freshness: Freshness) -> Result<Value, FetchError> {
    let key = self.normalizer.normalize(url);

    if freshness == Freshness::CacheFirst {
      if let Some(entry) = self.cache.get(&key) {
        debug!(%key, "cache hit");
        return Ok(entry.payload);
      }
    }

    debug!(%key, ?freshness, "fetching");
    let response = self.transport.get(&key).await?;
    if !response.is_success() {
      return Err(FetchError::Status(response.status));
    }

    let payload: Value = serde_json::from_str(&response.body)?;
    self.cache.put(&key, payload.clone());

    Ok(payload)
  }

  /// Fetch and deserialize into a typed view.
  pub async fn fetch_as<T: DeserializeOwned>(
    &self,
    url: &str,
    freshness: Freshness,
  ) -> Result<T, FetchError> {
    let payload = self.fetch(url, freshness).await?;
    Ok(serde_json::from_value(payload)?)
  }

  /// Typed view of a cached payload, without any network access.
  pub fn cached_as<T: DeserializeOwned>(&self, url: &str) -> Option<T> {
    let entry = self.cache.get(&self.normalizer.normalize(url))?;
    serde_json::from_value(entry.payload).ok()
  }

  pub fn normalize(&self, url: &str) -> String {
    self.normalizer.normalize(url)
  }

  pub fn cache(&self) -> &ResponseCache {
    &self.cache
  }
}
