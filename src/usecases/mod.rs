//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain types with the order client port.
//!
//! Use cases:
//! - `BulkSubmitter`: Paced concurrent submission of one order template
//! - `PacingGate`: Minimum spacing between dispatches

pub mod bulk_submitter;
pub mod pacing;

pub use bulk_submitter::{BulkError, BulkPlan, BulkSubmitter, EngineOptions};
pub use pacing::PacingGate;
