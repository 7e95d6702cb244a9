//! In-process transport for exercising the data layer without a server.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::cache::{NoopStore, ResponseCache};

use super::gateway::{FetchError, Gateway};
use super::transport::{RawResponse, Transport};
use super::url::Normalizer;

#[derive(Clone)]
struct Route {
  status: u16,
  body: String,
  delay: Duration,
}

/// Transport answering from a fixed route table.
///
/// Unknown URLs answer 404. Every request is recorded.
#[derive(Default)]
pub struct FakeTransport {
  routes: Mutex<HashMap<String, Route>>,
  hits: Mutex<Vec<String>>,
  in_flight: AtomicUsize,
  peak: AtomicUsize,
}

impl FakeTransport {
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  pub fn json(&self, url: &str, body: Value) {
    self.json_delayed(url, body, Duration::ZERO);
  }

  pub fn json_delayed(&self, url: &str, body: Value, delay: Duration) {
    self.route(url, 200, body.to_string(), delay);
  }

  pub fn status(&self, url: &str, status: u16) {
    self.route(url, status, String::new(), Duration::ZERO);
  }

  pub fn raw(&self, url: &str, status: u16, body: &str) {
    self.route(url, status, body.to_string(), Duration::ZERO);
  }

  fn route(&self, url: &str, status: u16, body: String, delay: Duration) {
    self
      .routes
      .lock()
      .unwrap()
      .insert(url.to_string(), Route { status, body, delay });
  }

  pub fn hits(&self, url: &str) -> usize {
    self.hits.lock().unwrap().iter().filter(|u| *u == url).count()
  }

  pub fn total_hits(&self) -> usize {
    self.hits.lock().unwrap().len()
  }

  /// Highest number of requests that were in flight at once.
  pub fn peak_in_flight(&self) -> usize {
    self.peak.load(Ordering::SeqCst)
  }

  /// Requests in the order they were issued.
  pub fn requests(&self) -> Vec<String> {
    self.hits.lock().unwrap().clone()
  }
}

#[async_trait]
impl Transport for FakeTransport {
  async fn get(&self, url: &str) -> Result<RawResponse, FetchError> {
    self.hits.lock().unwrap().push(url.to_string());
    let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    self.peak.fetch_max(now, Ordering::SeqCst);

    let route = self.routes.lock().unwrap().get(url).cloned();
    let route = route.unwrap_or(Route {
      status: 404,
      body: r#"{"detail":"Not found"}"#.to_string(),
      delay: Duration::ZERO,
    });

    if !route.delay.is_zero() {
      tokio::time::sleep(route.delay).await;
    }
    self.in_flight.fetch_sub(1, Ordering::SeqCst);

    Ok(RawResponse {
      status: route.status,
      body: route.body,
    })
  }
}

/// Gateway over `fake` with a fresh, non-persistent cache.
pub fn gateway_for(fake: &Arc<FakeTransport>) -> Gateway {
  Gateway::new(
    Arc::new(ResponseCache::hydrate(Box::new(NoopStore))),
    fake.clone(),
    Normalizer::default(),
  )
}
