//! Domain layer - Core order and outcome types.
//!
//! Pure types with no I/O (hexagonal architecture inner ring).
//! Everything here is testable in isolation.

pub mod order;
pub mod outcome;

// Re-export core types for convenience
pub use order::{
    ClientOidGenerator, OrderAttempt, OrderKind, OrderSide, OrderTemplate, TemplateError,
    TradeType,
};
pub use outcome::{BulkReport, FailureKind, OrderAck, OrderFailure, OrderOutcome};
