//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies.
//!
//! Adapter categories:
//! - `kucoin`: KuCoin REST API client, signing and order creation
//! - `paper`: In-process simulated exchange for dry runs

pub mod kucoin;
pub mod paper;
