//! KuCoin API Request/Response Types
//!
//! Serialization types for the spot order endpoint and the mapping
//! from raw HTTP replies to order ids or typed errors.

use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::order::{OrderAttempt, OrderKind};
use crate::ports::order_client::OrderClientError;

/// Business code KuCoin returns on success.
pub const SUCCESS_CODE: &str = "200000";

/// Body of `POST /api/v1/orders`. Decimals serialize as strings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest<'a> {
  pub client_oid: &'a str,
  pub side: &'static str,
  pub symbol: &'a str,
  #[serde(rename = "type")]
  pub order_type: &'static str,
  pub trade_type: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub funds: Option<Decimal>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub size: Option<Decimal>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub price: Option<Decimal>,
}

impl<'a> CreateOrderRequest<'a> {
  /// Build the request for one attempt.
  ///
  /// Market orders are sized by funds when funds are positive, by size
  /// otherwise. Limit orders carry price and size.
  pub fn from_attempt(attempt: &'a OrderAttempt) -> Self {
    let t = attempt.template.as_ref();
    let (funds, size, price) = match t.kind {
      OrderKind::Market if t.funds > Decimal::ZERO => (Some(t.funds), None, None),
      OrderKind::Market => (None, t.size, None),
      OrderKind::Limit => (None, t.size, t.price),
    };
    Self {
      client_oid: &attempt.client_oid,
      side: t.side.as_str(),
      symbol: &t.symbol,
      order_type: t.kind.as_str(),
      trade_type: t.trade_type.as_str(),
      funds,
      size,
      price,
    }
  }
}

/// Standard KuCoin response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
  #[serde(deserialize_with = "code_as_string")]
  pub code: String,
  #[serde(default)]
  pub msg: Option<String>,
  pub data: Option<T>,
}

/// `data` of a successful order creation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderData {
  pub order_id: String,
}

/// KuCoin documents `code` as a string but some gateways send a number.
fn code_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Code {
    Text(String),
    Number(i64),
  }

  Ok(match Code::deserialize(deserializer)? {
    Code::Text(s) => s,
    Code::Number(n) => n.to_string(),
  })
}

/// Interpret an order-creation reply.
///
/// - envelope with code 200000 → exchange order id
/// - any other envelope → [`OrderClientError::Api`] with code and msg verbatim
/// - unreadable 4xx body → `Api` keyed by the HTTP status
/// - anything else unreadable → [`OrderClientError::Transport`]
pub fn parse_create_order_reply(status: StatusCode, body: &str) -> Result<String, OrderClientError> {
  match serde_json::from_str::<ApiEnvelope<CreateOrderData>>(body) {
    Ok(envelope) if envelope.code == SUCCESS_CODE => envelope
      .data
      .map(|d| d.order_id)
      .filter(|id| !id.is_empty())
      .ok_or_else(|| OrderClientError::transport("success reply without orderId")),
    Ok(envelope) => {
      let message = envelope
        .msg
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
      Err(OrderClientError::api(envelope.code, message))
    }
    Err(_) if status.is_client_error() => {
      let text = body.trim();
      let message = if text.is_empty() {
        status.canonical_reason().unwrap_or("client error").to_string()
      } else {
        text.to_string()
      };
      Err(OrderClientError::api(status.as_u16().to_string(), message))
    }
    Err(e) => Err(OrderClientError::transport(format!(
      "unreadable reply (HTTP {status}): {e}"
    ))),
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use rust_decimal_macros::dec;

  use super::*;
  use crate::domain::order::{OrderSide, OrderTemplate};

  fn attempt(template: OrderTemplate) -> OrderAttempt {
    OrderAttempt::new(0, "abc123".to_string(), Arc::new(template))
  }

  #[test]
  fn test_market_request_serialization() {
    let a = attempt(OrderTemplate::market("KCS-USDT", OrderSide::Buy, dec!(600)));
    let json = serde_json::to_value(CreateOrderRequest::from_attempt(&a)).unwrap();

    assert_eq!(json["clientOid"], "abc123");
    assert_eq!(json["side"], "buy");
    assert_eq!(json["symbol"], "KCS-USDT");
    assert_eq!(json["type"], "market");
    assert_eq!(json["tradeType"], "TRADE");
    assert_eq!(json["funds"], "600");
    assert!(json.get("size").is_none());
    assert!(json.get("price").is_none());
  }

  #[test]
  fn test_limit_request_serialization() {
    let a = attempt(OrderTemplate::limit("ETH-USDT", OrderSide::Sell, dec!(2500.50), dec!(0.25)));
    let json = serde_json::to_value(CreateOrderRequest::from_attempt(&a)).unwrap();

    assert_eq!(json["type"], "limit");
    assert_eq!(json["price"], "2500.50");
    assert_eq!(json["size"], "0.25");
    assert!(json.get("funds").is_none());
  }

  #[test]
  fn test_success_reply() {
    let body = r#"{"code":"200000","data":{"orderId":"5bd6e9286d99522a52e458de"}}"#;
    let id = parse_create_order_reply(StatusCode::OK, body).unwrap();
    assert_eq!(id, "5bd6e9286d99522a52e458de");
  }

  #[test]
  fn test_business_error_reply() {
    let body = r#"{"code":"400100","msg":"Balance insufficient!"}"#;
    let err = parse_create_order_reply(StatusCode::OK, body).unwrap_err();
    assert_eq!(err, OrderClientError::api("400100", "Balance insufficient!"));
  }

  #[test]
  fn test_numeric_code_reply() {
    let body = r#"{"code":429000,"msg":"Too Many Requests"}"#;
    let err = parse_create_order_reply(StatusCode::TOO_MANY_REQUESTS, body).unwrap_err();
    assert_eq!(err, OrderClientError::api("429000", "Too Many Requests"));
  }

  #[test]
  fn test_unstructured_client_error() {
    let err = parse_create_order_reply(StatusCode::BAD_REQUEST, "").unwrap_err();
    assert_eq!(err, OrderClientError::api("400", "Bad Request"));
  }

  #[test]
  fn test_unstructured_server_error_is_transport() {
    let err =
      parse_create_order_reply(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>").unwrap_err();
    assert!(matches!(err, OrderClientError::Transport { timed_out: false, .. }));
  }

  #[test]
  fn test_success_without_order_id_is_transport() {
    let err = parse_create_order_reply(StatusCode::OK, r#"{"code":"200000"}"#).unwrap_err();
    assert!(matches!(err, OrderClientError::Transport { .. }));
  }
}
