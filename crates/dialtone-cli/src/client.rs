//! Async HTTP client wrapping the Dialtone read API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use dialtone_core::call::CallSummary;
use reqwest::Client;
use serde::Deserialize;

#[derive(Deserialize)]
struct CountBody {
  count: usize,
}

/// Async HTTP client for the `/api` routes of a Dialtone server.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client:   Client,
  base_url: String,
}

impl ApiClient {
  pub fn new(base_url: impl Into<String>) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(5))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, base_url: base_url.into() })
  }

  pub fn base_url(&self) -> &str { &self.base_url }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.base_url.trim_end_matches('/'), path)
  }

  /// `GET /api/calls`
  pub async fn list_calls(&self) -> Result<Vec<CallSummary>> {
    let resp = self
      .client
      .get(self.url("/calls"))
      .send()
      .await
      .context("GET /calls failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET /calls → {}", resp.status()));
    }
    resp.json().await.context("deserialising calls")
  }

  /// `GET /api/call_count`
  pub async fn call_count(&self) -> Result<usize> {
    let resp = self
      .client
      .get(self.url("/call_count"))
      .send()
      .await
      .context("GET /call_count failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET /call_count → {}", resp.status()));
    }
    let body: CountBody = resp.json().await.context("deserialising count")?;
    Ok(body.count)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn api_paths_are_prefixed() {
    let client = ApiClient::new("http://localhost:5000/").unwrap();
    assert_eq!(client.url("/calls"), "http://localhost:5000/api/calls");
    assert_eq!(client.base_url(), "http://localhost:5000/");
  }
}
