//! KuCoin Snipe Bot — Entry Point
//!
//! Runs one bulk submission and exits.
//!
//! Wiring sequence:
//! 1. Load config (path from argv[1], default config.toml) + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Build the order client: paper in dry-run, KuCoin otherwise
//!    (credentials from KUCOIN_API_KEY, KUCOIN_API_SECRET, KUCOIN_API_PASSPHRASE)
//! 4. Run the BulkSubmitter over the configured plan
//! 5. Log every outcome in attempt order, then a summary

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use kucoin_snipe_bot::adapters::kucoin::{KucoinAuth, KucoinClient, KucoinOrderClient};
use kucoin_snipe_bot::adapters::paper::PaperOrderClient;
use kucoin_snipe_bot::config::{self, AppConfig};
use kucoin_snipe_bot::domain::outcome::{BulkReport, OrderOutcome};
use kucoin_snipe_bot::ports::OrderClient;
use kucoin_snipe_bot::usecases::BulkSubmitter;

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration ───────────────────────────────
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());
    let config = config::loader::load_config(&path).context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.bot.log_level)),
        )
        .json()
        .init();

    info!(
        name = %config.bot.name,
        version = env!("CARGO_PKG_VERSION"),
        dry_run = config.bot.dry_run,
        symbol = %config.order.symbol,
        side = %config.order.side,
        kind = %config.order.kind,
        count = config.bulk.count,
        "Starting KuCoin snipe bot"
    );

    // ── 3. Order client ─────────────────────────────────────
    let client = build_client(&config)?;

    // ── 4. Bulk run ─────────────────────────────────────────
    let engine = BulkSubmitter::with_options(client, config.engine_options());
    let report = engine
        .run(&config.plan())
        .await
        .context("Bulk submission rejected")?;

    // ── 5. Report ───────────────────────────────────────────
    log_report(&report);

    Ok(())
}

/// Paper client in dry-run mode, signed KuCoin client otherwise.
fn build_client(config: &AppConfig) -> Result<Arc<dyn OrderClient>> {
    if config.bot.dry_run {
        warn!("Dry-run mode — orders are simulated, nothing is sent to KuCoin");
        return Ok(Arc::new(PaperOrderClient::new(Duration::from_millis(
            config.paper.latency_ms,
        ))));
    }

    let auth = Arc::new(
        KucoinAuth::from_env(config.api.key_version)
            .context("Failed to load KuCoin credentials from env")?,
    );
    let http = KucoinClient::new(auth, config.client_config())
        .context("Failed to create KuCoin client")?;
    Ok(Arc::new(KucoinOrderClient::new(Arc::new(http))))
}

fn log_report(report: &BulkReport) {
    for outcome in &report.outcomes {
        match outcome {
            OrderOutcome::Success(ack) => info!(
                attempt = ack.attempt,
                client_oid = %ack.client_oid,
                order_id = %ack.order_id,
                "Order placed"
            ),
            OrderOutcome::Failure(f) => error!(
                attempt = f.attempt,
                kind = ?f.kind,
                code = %f.code,
                "{} - {}",
                f.code,
                f.message
            ),
        }
    }

    let by_code = report.failures_by_code();
    info!(
        started_at = %report.started_at,
        succeeded = report.success_count(),
        failed = report.failure_count(),
        dispatch_ms = report.dispatch_span.as_millis() as u64,
        elapsed_ms = report.elapsed.as_millis() as u64,
        failures_by_code = ?by_code,
        "Bulk run summary"
    );
}
