//! Per-attempt outcomes and the batch report.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Acknowledgement of an order the exchange accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderAck {
    pub attempt: usize,
    pub client_oid: String,
    /// Exchange-assigned order id.
    pub order_id: String,
}

/// Where in an attempt's life the failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Rejected before any network call (preflight, pool exhausted).
    Dispatch,
    /// The exchange answered with a business error.
    RemoteApi,
    /// Network failure, timeout inside the client, undecodable reply.
    Transport,
    /// The batch deadline passed before the attempt finished.
    Timeout,
    /// The worker task panicked or was cancelled.
    TaskAborted,
}

impl FailureKind {
    /// Code used when no exchange code is available.
    pub const fn generic_code(self) -> &'static str {
        match self {
            Self::Dispatch => "dispatch",
            Self::RemoteApi => "remote_api",
            Self::Transport => "transport",
            Self::Timeout => "timeout",
            Self::TaskAborted => "task_aborted",
        }
    }
}

/// A failed attempt. `message` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderFailure {
    pub attempt: usize,
    pub kind: FailureKind,
    /// Exchange error code for [`FailureKind::RemoteApi`], a generic code otherwise.
    pub code: String,
    pub message: String,
}

impl OrderFailure {
    pub fn new(
        attempt: usize,
        kind: FailureKind,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let mut message = message.into();
        if message.trim().is_empty() {
            message = format!("{} failure without detail", kind.generic_code());
        }
        let mut code = code.into();
        if code.trim().is_empty() {
            code = kind.generic_code().to_string();
        }
        Self {
            attempt,
            kind,
            code,
            message,
        }
    }

    /// Failure carrying the generic code for its kind.
    pub fn generic(attempt: usize, kind: FailureKind, message: impl Into<String>) -> Self {
        Self::new(attempt, kind, kind.generic_code(), message)
    }
}

/// Result of a single attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OrderOutcome {
    Success(OrderAck),
    Failure(OrderFailure),
}

impl OrderOutcome {
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub const fn attempt(&self) -> usize {
        match self {
            Self::Success(ack) => ack.attempt,
            Self::Failure(failure) => failure.attempt,
        }
    }

    pub const fn as_failure(&self) -> Option<&OrderFailure> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(failure),
        }
    }
}

/// Everything a bulk run produced.
#[derive(Debug, Clone, Serialize)]
pub struct BulkReport {
    /// Outcome `i` belongs to attempt `i`.
    pub outcomes: Vec<OrderOutcome>,
    pub started_at: DateTime<Utc>,
    /// Time from the first pacing wait to the last dispatch.
    pub dispatch_span: Duration,
    /// Time from start until every task was joined.
    pub elapsed: Duration,
}

impl BulkReport {
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.len() - self.success_count()
    }

    /// Failure counts keyed by error code.
    pub fn failures_by_code(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for failure in self.outcomes.iter().filter_map(OrderOutcome::as_failure) {
            *counts.entry(failure.code.clone()).or_insert(0) += 1;
        }
        counts
    }

    pub fn into_outcomes(self) -> Vec<OrderOutcome> {
        self.outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ack(attempt: usize) -> OrderOutcome {
        OrderOutcome::Success(OrderAck {
            attempt,
            client_oid: format!("oid-{attempt}"),
            order_id: format!("ex-{attempt}"),
        })
    }

    #[test]
    fn test_empty_message_degrades_to_generic() {
        let f = OrderFailure::new(3, FailureKind::Transport, "", "  ");
        assert_eq!(f.code, "transport");
        assert!(!f.message.trim().is_empty());
    }

    #[test]
    fn test_remote_code_kept_verbatim() {
        let f = OrderFailure::new(0, FailureKind::RemoteApi, "400100", "Balance insufficient");
        assert_eq!(f.code, "400100");
        assert_eq!(f.message, "Balance insufficient");
    }

    #[test]
    fn test_report_counts() {
        let report = BulkReport {
            outcomes: vec![
                ack(0),
                OrderOutcome::Failure(OrderFailure::new(1, FailureKind::RemoteApi, "400", "bad")),
                ack(2),
                OrderOutcome::Failure(OrderFailure::new(3, FailureKind::RemoteApi, "400", "bad")),
                OrderOutcome::Failure(OrderFailure::generic(4, FailureKind::Timeout, "deadline")),
            ],
            started_at: Utc::now(),
            dispatch_span: Duration::ZERO,
            elapsed: Duration::ZERO,
        };

        assert_eq!(report.success_count(), 2);
        assert_eq!(report.failure_count(), 3);

        let by_code = report.failures_by_code();
        assert_eq!(by_code.get("400"), Some(&2));
        assert_eq!(by_code.get("timeout"), Some(&1));
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let json = serde_json::to_string(&ack(7)).unwrap();
        assert!(json.contains(r#""status":"success""#));
        assert!(json.contains(r#""order_id":"ex-7""#));
    }
}
