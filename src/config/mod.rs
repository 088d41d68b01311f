//! Configuration Module - TOML-based Bot Configuration
//!
//! Loads and validates configuration from `config.toml`. API
//! credentials are NOT part of the file; they come from environment
//! variables (see `adapters::kucoin::auth`).

pub mod loader;

use std::time::Duration;

use serde::Deserialize;

use crate::adapters::kucoin::KucoinClientConfig;
use crate::domain::order::OrderTemplate;
use crate::usecases::bulk_submitter::{BulkPlan, EngineOptions};

/// Top-level bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Bot identity and metadata.
  pub bot: BotConfig,
  /// The order every attempt submits.
  pub order: OrderTemplate,
  /// Batch size, pacing and limits.
  #[serde(default)]
  pub bulk: BulkConfig,
  /// KuCoin API endpoint settings.
  #[serde(default)]
  pub api: ApiConfig,
  /// Dry-run simulation settings.
  #[serde(default)]
  pub paper: PaperConfig,
}

/// Bot identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
  /// Human-readable bot name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// Enable dry-run mode (no real orders).
  #[serde(default)]
  pub dry_run: bool,
}

/// Bulk run configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkConfig {
  /// Number of orders to submit.
  #[serde(default = "default_count")]
  pub count: usize,
  /// Minimum gap between dispatches (milliseconds).
  #[serde(default = "default_pacing_ms")]
  pub pacing_ms: u64,
  /// Whole-batch deadline (seconds). Unset = wait for every attempt.
  #[serde(default)]
  pub deadline_secs: Option<u64>,
  /// Cap on attempts in flight. Unset = unbounded.
  #[serde(default)]
  pub max_in_flight: Option<usize>,
  /// Tag prepended to client order ids.
  #[serde(default)]
  pub oid_prefix: Option<String>,
}

impl Default for BulkConfig {
  fn default() -> Self {
    Self {
      count: default_count(),
      pacing_ms: default_pacing_ms(),
      deadline_secs: None,
      max_in_flight: None,
      oid_prefix: None,
    }
  }
}

/// API endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// REST API base URL.
  #[serde(default = "default_base_url")]
  pub base_url: String,
  /// Request timeout in milliseconds.
  #[serde(default = "default_timeout_ms")]
  pub timeout_ms: u64,
  /// Local request throttle.
  #[serde(default = "default_requests_per_second")]
  pub requests_per_second: u32,
  /// API key version (2 signs the passphrase).
  #[serde(default = "default_key_version")]
  pub key_version: u8,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: default_base_url(),
      timeout_ms: default_timeout_ms(),
      requests_per_second: default_requests_per_second(),
      key_version: default_key_version(),
    }
  }
}

/// Paper trading configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PaperConfig {
  /// Simulated per-order latency (milliseconds).
  #[serde(default = "default_paper_latency_ms")]
  pub latency_ms: u64,
}

impl Default for PaperConfig {
  fn default() -> Self {
    Self {
      latency_ms: default_paper_latency_ms(),
    }
  }
}

impl AppConfig {
  /// The bulk run described by this config.
  pub fn plan(&self) -> BulkPlan {
    BulkPlan {
      template: self.order.clone(),
      count: self.bulk.count,
      pacing: Duration::from_millis(self.bulk.pacing_ms),
      deadline: self.bulk.deadline_secs.map(Duration::from_secs),
    }
  }

  pub fn engine_options(&self) -> EngineOptions {
    EngineOptions {
      max_in_flight: self.bulk.max_in_flight,
      oid_prefix: self.bulk.oid_prefix.clone(),
    }
  }

  pub fn client_config(&self) -> KucoinClientConfig {
    KucoinClientConfig {
      base_url: self.api.base_url.clone(),
      timeout: Duration::from_millis(self.api.timeout_ms),
      requests_per_second: self.api.requests_per_second,
    }
  }
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

const fn default_count() -> usize {
  1000
}

const fn default_pacing_ms() -> u64 {
  100
}

fn default_base_url() -> String {
  "https://api.kucoin.com".to_string()
}

const fn default_timeout_ms() -> u64 {
  10_000
}

const fn default_requests_per_second() -> u32 {
  30
}

const fn default_key_version() -> u8 {
  2
}

const fn default_paper_latency_ms() -> u64 {
  50
}
