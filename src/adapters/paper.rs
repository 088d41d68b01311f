//! Paper Order Client — Dry-Run Adapter
//!
//! Accepts every order after a fixed simulated latency and hands out
//! synthetic order ids. Nothing leaves the process.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::order::OrderAttempt;
use crate::domain::outcome::OrderAck;
use crate::ports::order_client::{OrderClient, OrderClientError};

/// Simulated exchange for dry runs.
#[derive(Debug)]
pub struct PaperOrderClient {
  latency: Duration,
  next_id: AtomicU64,
}

impl PaperOrderClient {
  pub const fn new(latency: Duration) -> Self {
    Self {
      latency,
      next_id: AtomicU64::new(1),
    }
  }

  /// Orders accepted so far.
  pub fn accepted(&self) -> u64 {
    self.next_id.load(Ordering::Relaxed) - 1
  }
}

#[async_trait]
impl OrderClient for PaperOrderClient {
  async fn create_order(&self, attempt: &OrderAttempt) -> Result<OrderAck, OrderClientError> {
    if !self.latency.is_zero() {
      tokio::time::sleep(self.latency).await;
    }
    let n = self.next_id.fetch_add(1, Ordering::Relaxed);
    debug!(attempt = attempt.index, client_oid = %attempt.client_oid, "Paper order filled");
    Ok(OrderAck {
      attempt: attempt.index,
      client_oid: attempt.client_oid.clone(),
      order_id: format!("paper-{n}"),
    })
  }

  fn name(&self) -> &'static str {
    "paper"
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use rust_decimal_macros::dec;

  use super::*;
  use crate::domain::order::{OrderSide, OrderTemplate};

  #[tokio::test(start_paused = true)]
  async fn test_paper_orders_get_sequential_ids() {
    let client = PaperOrderClient::new(Duration::from_millis(50));
    let template = Arc::new(OrderTemplate::market("KCS-USDT", OrderSide::Buy, dec!(600)));

    for i in 0..3 {
      let attempt = OrderAttempt::new(i, format!("oid{i}"), Arc::clone(&template));
      let ack = client.create_order(&attempt).await.unwrap();
      assert_eq!(ack.order_id, format!("paper-{}", i + 1));
      assert_eq!(ack.client_oid, format!("oid{i}"));
    }
    assert_eq!(client.accepted(), 3);
  }
}
