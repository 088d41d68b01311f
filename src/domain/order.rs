//! Order domain types.
//!
//! Defines the immutable order template a bulk run is built from, the
//! per-dispatch attempt derived from it, and client order id generation.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// KuCoin rejects client order ids longer than this.
pub const MAX_CLIENT_OID_LEN: usize = 40;

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Wire value expected by the exchange.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    /// Fills immediately against the book, sized by funds or size.
    Market,
    /// Rests on the book at `price` for `size`.
    Limit,
}

impl OrderKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::Limit => "limit",
        }
    }
}

impl std::fmt::Display for OrderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account the order trades against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeType {
    /// Spot trading.
    #[default]
    Trade,
    /// Cross margin trading.
    MarginTrade,
}

impl TradeType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trade => "TRADE",
            Self::MarginTrade => "MARGIN_TRADE",
        }
    }
}

/// Why a template cannot be submitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("symbol must look like BASE-QUOTE, got {0:?}")]
    MalformedSymbol(String),
    #[error("funds must not be negative, got {0}")]
    NegativeFunds(Decimal),
    #[error("market order needs positive funds or size")]
    MarketOrderUnsized,
    #[error("limit order needs positive price and size")]
    LimitOrderIncomplete,
}

/// Immutable description of the order every attempt in a batch submits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTemplate {
    /// Trading pair, e.g. `BTC-USDT`.
    pub symbol: String,
    pub side: OrderSide,
    pub kind: OrderKind,
    #[serde(default)]
    pub trade_type: TradeType,
    /// Quote currency amount to spend (market orders).
    #[serde(default)]
    pub funds: Decimal,
    /// Limit price.
    #[serde(default)]
    pub price: Option<Decimal>,
    /// Base currency amount.
    #[serde(default)]
    pub size: Option<Decimal>,
}

impl OrderTemplate {
    /// Market order spending `funds` of the quote currency.
    pub fn market(symbol: impl Into<String>, side: OrderSide, funds: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            kind: OrderKind::Market,
            trade_type: TradeType::Trade,
            funds,
            price: None,
            size: None,
        }
    }

    /// Limit order for `size` at `price`.
    pub fn limit(
        symbol: impl Into<String>,
        side: OrderSide,
        price: Decimal,
        size: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            kind: OrderKind::Limit,
            trade_type: TradeType::Trade,
            funds: Decimal::ZERO,
            price: Some(price),
            size: Some(size),
        }
    }

    /// Check the template is something the exchange could accept.
    ///
    /// # Errors
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), TemplateError> {
        let well_formed = self
            .symbol
            .split_once('-')
            .is_some_and(|(base, quote)| {
                !base.is_empty() && !quote.is_empty() && !quote.contains('-')
            });
        if !well_formed || self.symbol.chars().any(char::is_whitespace) {
            return Err(TemplateError::MalformedSymbol(self.symbol.clone()));
        }

        if self.funds < Decimal::ZERO {
            return Err(TemplateError::NegativeFunds(self.funds));
        }

        let positive = |v: Option<Decimal>| v.is_some_and(|d| d > Decimal::ZERO);

        match self.kind {
            OrderKind::Market => {
                if self.funds <= Decimal::ZERO && !positive(self.size) {
                    return Err(TemplateError::MarketOrderUnsized);
                }
            }
            OrderKind::Limit => {
                if !positive(self.price) || !positive(self.size) {
                    return Err(TemplateError::LimitOrderIncomplete);
                }
            }
        }

        Ok(())
    }
}

/// One dispatch of the template, tagged with a unique client order id.
#[derive(Debug, Clone)]
pub struct OrderAttempt {
    /// Position in the batch (0-based dispatch order).
    pub index: usize,
    /// Process-unique id the exchange deduplicates on.
    pub client_oid: String,
    pub template: Arc<OrderTemplate>,
}

impl OrderAttempt {
    pub fn new(index: usize, client_oid: String, template: Arc<OrderTemplate>) -> Self {
        Self {
            index,
            client_oid,
            template,
        }
    }
}

/// Generates client order ids.
///
/// Ids are random v4 UUIDs in simple form (32 hex chars), so attempts
/// dispatched within the same clock tick never collide.
#[derive(Debug, Clone, Default)]
pub struct ClientOidGenerator {
    prefix: Option<String>,
}

impl ClientOidGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix ids with a short tag. The tag is truncated so the id stays
    /// within [`MAX_CLIENT_OID_LEN`].
    pub fn with_prefix(prefix: &str) -> Self {
        let room = MAX_CLIENT_OID_LEN - 32 - 1;
        let tag: String = prefix
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .take(room)
            .collect();
        Self {
            prefix: (!tag.is_empty()).then_some(tag),
        }
    }

    pub fn next_oid(&self) -> String {
        let id = Uuid::new_v4().simple().to_string();
        match &self.prefix {
            Some(tag) => format!("{tag}-{id}"),
            None => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_market_template_validates() {
        let t = OrderTemplate::market("BTC-USDT", OrderSide::Buy, dec!(600));
        assert!(t.validate().is_ok());
        assert_eq!(t.trade_type, TradeType::Trade);
    }

    #[test]
    fn test_malformed_symbol_rejected() {
        for symbol in ["", "BTCUSDT", "-USDT", "BTC-", "BTC-USDT-X", "BTC -USDT"] {
            let t = OrderTemplate::market(symbol, OrderSide::Buy, dec!(1));
            assert_eq!(
                t.validate(),
                Err(TemplateError::MalformedSymbol(symbol.to_string())),
                "symbol {symbol:?}"
            );
        }
    }

    #[test]
    fn test_negative_funds_rejected() {
        let t = OrderTemplate::market("BTC-USDT", OrderSide::Buy, dec!(-5));
        assert_eq!(t.validate(), Err(TemplateError::NegativeFunds(dec!(-5))));
    }

    #[test]
    fn test_market_order_needs_funds_or_size() {
        let mut t = OrderTemplate::market("BTC-USDT", OrderSide::Sell, Decimal::ZERO);
        assert_eq!(t.validate(), Err(TemplateError::MarketOrderUnsized));

        t.size = Some(dec!(0.5));
        assert!(t.validate().is_ok());
    }

    #[test]
    fn test_limit_order_needs_price_and_size() {
        let mut t = OrderTemplate::limit("ETH-USDT", OrderSide::Buy, dec!(2500.10), dec!(0.1));
        assert!(t.validate().is_ok());

        t.price = None;
        assert_eq!(t.validate(), Err(TemplateError::LimitOrderIncomplete));
    }

    #[test]
    fn test_client_oids_are_unique() {
        let generator = ClientOidGenerator::new();
        let ids: HashSet<String> = (0..10_000).map(|_| generator.next_oid()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_prefixed_oid_fits_exchange_limit() {
        let generator = ClientOidGenerator::with_prefix("snipe-bot-with-a-long-name");
        let oid = generator.next_oid();
        assert!(oid.len() <= MAX_CLIENT_OID_LEN, "{oid} too long");
        assert!(oid.starts_with("snipebo-"));
    }

    #[test]
    fn test_enum_wire_values() {
        assert_eq!(OrderSide::Buy.to_string(), "buy");
        assert_eq!(OrderKind::Limit.to_string(), "limit");
        assert_eq!(TradeType::MarginTrade.as_str(), "MARGIN_TRADE");
    }
}
