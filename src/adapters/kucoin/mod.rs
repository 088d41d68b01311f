//! KuCoin REST API Adapter
//!
//! Sub-modules:
//! - `auth`: HMAC-SHA256 request signing
//! - `client`: Signed HTTP client with a local request throttle
//! - `orders`: `OrderClient` port implementation
//! - `types`: Request/response types and reply interpretation

pub mod auth;
pub mod client;
pub mod orders;
pub mod types;

pub use auth::KucoinAuth;
pub use client::{KucoinClient, KucoinClientConfig};
pub use orders::KucoinOrderClient;
