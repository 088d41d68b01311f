//! KuCoin HTTP Client - Signed, Throttled REST Client
//!
//! Wraps reqwest with KuCoin request signing and a local request
//! throttle. Every request is sent exactly once: retry policy belongs
//! to the caller.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use super::auth::KucoinAuth;
use crate::ports::order_client::OrderClientError;

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Configuration for the KuCoin HTTP client.
#[derive(Debug, Clone)]
pub struct KucoinClientConfig {
  /// Base URL for the REST API.
  pub base_url: String,
  /// Request timeout.
  pub timeout: Duration,
  /// Local ceiling on requests per second, kept below the exchange limit.
  pub requests_per_second: u32,
}

impl Default for KucoinClientConfig {
  fn default() -> Self {
    Self {
      base_url: "https://api.kucoin.com".to_string(),
      timeout: Duration::from_secs(10),
      requests_per_second: 30,
    }
  }
}

/// Status and body of a reply, before interpretation.
#[derive(Debug, Clone)]
pub struct RawReply {
  pub status: StatusCode,
  pub body: String,
}

/// Signed HTTP client for the KuCoin REST API.
///
/// Shared by every worker task of a batch; reqwest pools connections
/// internally and the limiter is lock-free.
pub struct KucoinClient {
  http: Client,
  auth: Arc<KucoinAuth>,
  config: KucoinClientConfig,
  limiter: DirectLimiter,
}

impl KucoinClient {
  /// Create a new KuCoin client.
  pub fn new(auth: Arc<KucoinAuth>, config: KucoinClientConfig) -> Result<Self> {
    let rps = NonZeroU32::new(config.requests_per_second)
      .context("requests_per_second must be greater than zero")?;

    let http = Client::builder()
      .timeout(config.timeout)
      .build()
      .context("Failed to build HTTP client")?;

    Ok(Self {
      http,
      auth,
      config,
      limiter: RateLimiter::direct(Quota::per_second(rps)),
    })
  }

  pub fn base_url(&self) -> &str {
    &self.config.base_url
  }

  /// Send a signed POST with a JSON body.
  ///
  /// Waits for the local throttle first. Any HTTP status is returned as
  /// a [`RawReply`]; only failures to get a reply at all are errors.
  pub async fn post(&self, endpoint: &str, body: &str) -> Result<RawReply, OrderClientError> {
    self.limiter.until_ready().await;

    let url = format!("{}{}", self.config.base_url, endpoint);
    let headers = self.auth.auth_headers("POST", endpoint, body);

    let response = self
      .http
      .post(&url)
      .header("Content-Type", "application/json")
      .header("KC-API-KEY", headers.key)
      .header("KC-API-SIGN", headers.signature)
      .header("KC-API-TIMESTAMP", headers.timestamp)
      .header("KC-API-PASSPHRASE", headers.passphrase)
      .header("KC-API-KEY-VERSION", headers.key_version)
      .body(body.to_string())
      .send()
      .await
      .map_err(transport_error)?;

    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
      warn!(endpoint, "Throttled by KuCoin");
    }

    let body = response.text().await.map_err(transport_error)?;
    debug!(endpoint, status = status.as_u16(), "KuCoin reply received");

    Ok(RawReply { status, body })
  }
}

fn transport_error(e: reqwest::Error) -> OrderClientError {
  OrderClientError::Transport {
    timed_out: e.is_timeout(),
    message: e.to_string(),
  }
}
