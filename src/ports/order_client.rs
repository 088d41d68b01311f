//! Order Client Port - Exchange Order Creation Interface
//!
//! The single capability the bulk engine needs from an exchange:
//! create one order for one attempt. Implementations are shared across
//! every worker task of a batch, so they must be `Send + Sync` and
//! safe to call concurrently with the same credentials.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::order::OrderAttempt;
use crate::domain::outcome::{FailureKind, OrderAck, OrderFailure};

/// Errors an order client can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderClientError {
  /// The exchange processed the call and answered with a business error.
  #[error("{code} - {message}")]
  Api {
    /// Exchange error code, verbatim.
    code: String,
    /// Exchange error message, verbatim.
    message: String,
  },

  /// Network failure, timeout or an unreadable reply.
  #[error("transport error: {message}")]
  Transport {
    message: String,
    /// The request timed out.
    timed_out: bool,
  },

  /// Refused locally before any network call.
  #[error("rejected before dispatch: {0}")]
  Rejected(String),
}

impl OrderClientError {
  pub fn api(code: impl Into<String>, message: impl Into<String>) -> Self {
    Self::Api {
      code: code.into(),
      message: message.into(),
    }
  }

  pub fn transport(message: impl Into<String>) -> Self {
    Self::Transport {
      message: message.into(),
      timed_out: false,
    }
  }

  /// Convert into the failure record for `attempt`.
  pub fn into_failure(self, attempt: usize) -> OrderFailure {
    match self {
      Self::Api { code, message } => {
        OrderFailure::new(attempt, FailureKind::RemoteApi, code, message)
      }
      Self::Transport { message, timed_out } => {
        let code = if timed_out {
          FailureKind::Timeout.generic_code()
        } else {
          FailureKind::Transport.generic_code()
        };
        OrderFailure::new(attempt, FailureKind::Transport, code, message)
      }
      Self::Rejected(reason) => OrderFailure::generic(attempt, FailureKind::Dispatch, reason),
    }
  }
}

/// Trait for exchange order clients.
#[async_trait]
pub trait OrderClient: Send + Sync + 'static {
  /// Submit one order for `attempt`.
  ///
  /// # Errors
  /// [`OrderClientError::Api`] when the exchange refuses the order,
  /// [`OrderClientError::Transport`] when no usable answer came back.
  async fn create_order(&self, attempt: &OrderAttempt) -> Result<OrderAck, OrderClientError>;

  /// Synchronous check run on the dispatch path before a task is spawned.
  ///
  /// # Errors
  /// [`OrderClientError::Rejected`] if the attempt must not be sent.
  fn preflight(&self, _attempt: &OrderAttempt) -> Result<(), OrderClientError> {
    Ok(())
  }

  /// Short name for logs.
  fn name(&self) -> &'static str {
    "order-client"
  }
}
