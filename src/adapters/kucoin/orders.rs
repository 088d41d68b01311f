//! KuCoin Order Client — Adapter for Order Creation
//!
//! Implements the `OrderClient` port on top of the shared signed
//! `KucoinClient`. One HTTP request per attempt, no retries.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, instrument, warn};

use super::client::KucoinClient;
use super::types::{parse_create_order_reply, CreateOrderRequest};
use crate::domain::order::{OrderAttempt, MAX_CLIENT_OID_LEN};
use crate::domain::outcome::OrderAck;
use crate::ports::order_client::{OrderClient, OrderClientError};

/// Spot order placement endpoint.
pub const ORDERS_ENDPOINT: &str = "/api/v1/orders";

/// KuCoin order client backed by the shared signed HTTP client.
pub struct KucoinOrderClient {
    client: Arc<KucoinClient>,
}

impl KucoinOrderClient {
    pub fn new(client: Arc<KucoinClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OrderClient for KucoinOrderClient {
    #[instrument(skip(self, attempt), fields(attempt = attempt.index, client_oid = %attempt.client_oid))]
    async fn create_order(&self, attempt: &OrderAttempt) -> Result<OrderAck, OrderClientError> {
        let request = CreateOrderRequest::from_attempt(attempt);
        let body = encode_body(&request)?;

        let reply = self.client.post(ORDERS_ENDPOINT, &body).await?;

        match parse_create_order_reply(reply.status, &reply.body) {
            Ok(order_id) => {
                info!(order_id = %order_id, "Order accepted by KuCoin");
                Ok(OrderAck {
                    attempt: attempt.index,
                    client_oid: attempt.client_oid.clone(),
                    order_id,
                })
            }
            Err(e) => {
                warn!(error = %e, status = reply.status.as_u16(), "Order not accepted");
                Err(e)
            }
        }
    }

    fn preflight(&self, attempt: &OrderAttempt) -> Result<(), OrderClientError> {
        if attempt.client_oid.is_empty() || attempt.client_oid.len() > MAX_CLIENT_OID_LEN {
            return Err(OrderClientError::Rejected(format!(
                "clientOid must be 1..={MAX_CLIENT_OID_LEN} chars, got {}",
                attempt.client_oid.len()
            )));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "kucoin"
    }
}

/// JSON request body. An encoding failure is local, so it surfaces as a
/// transport fault rather than an exchange rejection.
fn encode_body<T: Serialize>(request: &T) -> Result<String, OrderClientError> {
    serde_json::to_string(request)
        .map_err(|e| OrderClientError::transport(format!("could not serialize order body: {e}")))
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::adapters::kucoin::auth::KucoinAuth;
    use crate::adapters::kucoin::client::KucoinClientConfig;
    use crate::domain::order::{OrderSide, OrderTemplate};

    fn order_client() -> KucoinOrderClient {
        let auth = Arc::new(KucoinAuth::new("k", "s", "p", 2));
        let client = KucoinClient::new(auth, KucoinClientConfig::default()).unwrap();
        KucoinOrderClient::new(Arc::new(client))
    }

    fn attempt_with_oid(oid: &str) -> OrderAttempt {
        OrderAttempt::new(
            0,
            oid.to_string(),
            Arc::new(OrderTemplate::market("BTC-USDT", OrderSide::Buy, dec!(10))),
        )
    }

    #[test]
    fn test_encode_body_failure_is_transport() {
        // JSON object keys must be strings.
        let mut bad = std::collections::HashMap::new();
        bad.insert((1u8, 2u8), "funds");

        let err = encode_body(&bad).unwrap_err();
        assert!(matches!(err, OrderClientError::Transport { timed_out: false, .. }));
        assert!(err.to_string().contains("could not serialize order body"));

        let failure = err.into_failure(4);
        assert_eq!(failure.kind, crate::domain::outcome::FailureKind::Transport);
        assert_eq!(failure.code, "transport");
    }

    #[test]
    fn test_encode_body_matches_request_json() {
        let attempt = attempt_with_oid("abc");
        let request = CreateOrderRequest::from_attempt(&attempt);
        let body = encode_body(&request).unwrap();
        assert!(body.contains("\"clientOid\":\"abc\""));
    }

    #[test]
    fn test_preflight_accepts_uuid_oid() {
        let oid = "0f8fad5bd9cb469fa16570867728950e";
        assert!(order_client().preflight(&attempt_with_oid(oid)).is_ok());
    }

    #[test]
    fn test_preflight_rejects_long_oid() {
        let oid = "x".repeat(MAX_CLIENT_OID_LEN + 1);
        let err = order_client().preflight(&attempt_with_oid(&oid)).unwrap_err();
        assert!(matches!(err, OrderClientError::Rejected(_)));
    }

    #[test]
    fn test_preflight_rejects_empty_oid() {
        assert!(order_client().preflight(&attempt_with_oid("")).is_err());
    }
}
