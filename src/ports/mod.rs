//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer
//! requires from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `OrderClient`: Order creation on the exchange

pub mod order_client;

pub use order_client::{OrderClient, OrderClientError};
