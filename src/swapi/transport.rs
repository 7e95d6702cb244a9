use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};

use super::gateway::FetchError;

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct RawResponse {
  pub status: u16,
  pub body: String,
}

impl RawResponse {
  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }
}

/// Performs plain GET retrievals.
///
/// Only failures to complete the exchange are errors here; non-success
/// statuses come back as a normal [`RawResponse`].
#[async_trait]
pub trait Transport: Send + Sync {
  async fn get(&self, url: &str) -> Result<RawResponse, FetchError>;
}

/// reqwest-backed transport
#[derive(Clone)]
pub struct HttpTransport {
  client: reqwest::Client,
}

impl HttpTransport {
  pub fn new() -> Result<Self> {
    let client = reqwest::Client::builder()
      .user_agent(concat!("swx/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { client })
  }
}

#[async_trait]
impl Transport for HttpTransport {
  async fn get(&self, url: &str) -> Result<RawResponse, FetchError> {
    let response = self
      .client
      .get(url)
      .header(reqwest::header::ACCEPT, "application/json")
      .send()
      .await
      .map_err(|e| FetchError::Unreachable(e.to_string()))?;

    let status = response.status().as_u16();
    let body = response
      .text()
      .await
      .map_err(|e| FetchError::Unreachable(e.to_string()))?;

    Ok(RawResponse { status, body })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use httpmock::prelude::*;

  #[tokio::test]
  async fn test_returns_status_and_body() {
    let server = MockServer::start_async().await;
    let mock = server
      .mock_async(|when, then| {
        when.method(GET).path("/api/planets/1/");
        then
          .status(200)
          .header("content-type", "application/json")
          .body(r#"{"name":"Tatooine"}"#);
      })
      .await;

    let transport = HttpTransport::new().unwrap();
    let response = transport.get(&server.url("/api/planets/1/")).await.unwrap();

    mock.assert_async().await;
    assert!(response.is_success());
    assert_eq!(response.body, r#"{"name":"Tatooine"}"#);
  }

  #[tokio::test]
  async fn test_error_status_is_not_a_transport_error() {
    let server = MockServer::start_async().await;
    server
      .mock_async(|when, then| {
        when.method(GET).path("/api/people/999/");
        then.status(404).body(r#"{"detail":"Not found"}"#);
      })
      .await;

    let transport = HttpTransport::new().unwrap();
    let response = transport
      .get(&server.url("/api/people/999/"))
      .await
      .unwrap();

    assert_eq!(response.status, 404);
    assert!(!response.is_success());
  }

  #[tokio::test]
  async fn test_unreachable_host() {
    let transport = HttpTransport::new().unwrap();
    // Port 9 (discard) on localhost is not expected to accept HTTP
    let result = transport.get("http://127.0.0.1:9/api/").await;
    assert!(matches!(result, Err(FetchError::Unreachable(_))));
  }
}
