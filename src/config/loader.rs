//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    symbol = %config.order.symbol,
    count = config.bulk.count,
    pacing_ms = config.bulk.pacing_ms,
    dry_run = config.bot.dry_run,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig =
    toml::from_str(content).with_context(|| "Failed to parse config.toml")?;
  validate_config(&config)?;
  Ok(config)
}

/// Validate all configuration parameters.
fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(!config.bot.name.is_empty(), "bot.name must not be empty");

  config
    .order
    .validate()
    .context("Invalid [order] section")?;

  // Bulk validation
  anyhow::ensure!(
    config.bulk.count > 0,
    "bulk.count must be positive, got {}",
    config.bulk.count
  );
  if let Some(cap) = config.bulk.max_in_flight {
    anyhow::ensure!(cap > 0, "bulk.max_in_flight must be positive when set");
  }
  if let Some(secs) = config.bulk.deadline_secs {
    anyhow::ensure!(secs > 0, "bulk.deadline_secs must be positive when set");
  }

  // API validation
  anyhow::ensure!(!config.api.base_url.is_empty(), "api.base_url must not be empty");
  anyhow::ensure!(config.api.timeout_ms > 0, "api.timeout_ms must be positive");
  anyhow::ensure!(
    config.api.requests_per_second > 0,
    "api.requests_per_second must be positive"
  );
  anyhow::ensure!(
    (1..=3).contains(&config.api.key_version),
    "api.key_version must be 1, 2 or 3, got {}",
    config.api.key_version
  );

  Ok(())
}
