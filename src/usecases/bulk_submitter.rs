//! Bulk Submitter - Paced Fire-All-Then-Collect Order Engine
//!
//! Dispatches `count` copies of one order template against an
//! [`OrderClient`], one tokio task per attempt, and returns one outcome
//! per attempt in dispatch order.
//!
//! Two phases:
//! - Dispatch: sequential and paced. Builds the attempt, waits on the
//!   [`PacingGate`], spawns the worker. Rejections are settled on the spot.
//! - Collect: awaits every worker handle in dispatch order. Slot `i`
//!   is owned by attempt `i` alone, so no collector lock is needed.
//!
//! No retries. An optional batch deadline turns unfinished attempts
//! into timeout failures; every spawned task is joined before return.
//! Dropping the call aborts every worker still in flight.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, instrument, warn};

use super::pacing::PacingGate;
use crate::domain::order::{ClientOidGenerator, OrderAttempt, OrderTemplate, TemplateError};
use crate::domain::outcome::{BulkReport, FailureKind, OrderAck, OrderFailure, OrderOutcome};
use crate::ports::order_client::{OrderClient, OrderClientError};

/// Input errors. Raised before anything is dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BulkError {
  #[error("attempt count must be greater than zero")]
  InvalidCount,
  #[error("invalid order template: {0}")]
  InvalidTemplate(#[from] TemplateError),
}

/// Engine tuning.
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
  /// Cap on attempts in flight. `None` = one task per attempt, no cap.
  /// When the cap is hit the attempt fails at dispatch instead of waiting.
  pub max_in_flight: Option<usize>,
  /// Tag prepended to every client order id.
  pub oid_prefix: Option<String>,
}

/// One bulk run.
#[derive(Debug, Clone)]
pub struct BulkPlan {
  pub template: OrderTemplate,
  pub count: usize,
  /// Minimum gap between dispatches.
  pub pacing: Duration,
  /// Whole-batch deadline measured from the start of the run.
  pub deadline: Option<Duration>,
}

type WorkerResult = Result<OrderAck, OrderClientError>;

/// Per-attempt collector slot.
enum Slot {
  /// Settled at dispatch time (rejected, or deadline passed before dispatch).
  Settled(OrderOutcome),
  /// Worker still owns the result.
  Pending(Worker),
}

/// Handle to a spawned attempt. Aborts the task when dropped, so a
/// cancelled `run` leaves nothing running behind it.
struct Worker(JoinHandle<WorkerResult>);

impl Drop for Worker {
  fn drop(&mut self) {
    self.0.abort();
  }
}

/// Bulk order submission engine.
///
/// Owns its client and options; nothing is process-global. Generic over
/// the client so both concrete adapters and `dyn OrderClient` work.
pub struct BulkSubmitter<C: OrderClient + ?Sized> {
  client: Arc<C>,
  options: EngineOptions,
  oids: ClientOidGenerator,
}

impl<C: OrderClient + ?Sized> BulkSubmitter<C> {
  pub fn new(client: Arc<C>) -> Self {
    Self::with_options(client, EngineOptions::default())
  }

  pub fn with_options(client: Arc<C>, options: EngineOptions) -> Self {
    let oids = options
      .oid_prefix
      .as_deref()
      .map_or_else(ClientOidGenerator::new, ClientOidGenerator::with_prefix);
    Self {
      client,
      options,
      oids,
    }
  }

  /// Submit `count` copies of `template`, `pacing` apart.
  ///
  /// The returned vector always holds exactly `count` outcomes, index
  /// `i` belonging to the `i`-th dispatched attempt.
  ///
  /// # Errors
  /// [`BulkError`] if `count` is zero or the template is malformed.
  pub async fn submit_bulk(
    &self,
    template: &OrderTemplate,
    count: usize,
    pacing: Duration,
  ) -> Result<Vec<OrderOutcome>, BulkError> {
    let plan = BulkPlan {
      template: template.clone(),
      count,
      pacing,
      deadline: None,
    };
    self.run(&plan).await.map(BulkReport::into_outcomes)
  }

  /// [`submit_bulk`](Self::submit_bulk) with a whole-batch deadline.
  ///
  /// Attempts still unfinished (or never dispatched) when the deadline
  /// passes are reported as [`FailureKind::Timeout`].
  ///
  /// # Errors
  /// Same as [`submit_bulk`](Self::submit_bulk).
  pub async fn submit_bulk_with_deadline(
    &self,
    template: &OrderTemplate,
    count: usize,
    pacing: Duration,
    deadline: Duration,
  ) -> Result<Vec<OrderOutcome>, BulkError> {
    let plan = BulkPlan {
      template: template.clone(),
      count,
      pacing,
      deadline: Some(deadline),
    };
    self.run(&plan).await.map(BulkReport::into_outcomes)
  }

  /// Execute `plan` and return the full report.
  ///
  /// # Errors
  /// [`BulkError`] if `count` is zero or the template is malformed.
  #[instrument(
    skip(self, plan),
    fields(
      client = self.client.name(),
      symbol = %plan.template.symbol,
      count = plan.count,
      pacing_ms = plan.pacing.as_millis() as u64,
    )
  )]
  pub async fn run(&self, plan: &BulkPlan) -> Result<BulkReport, BulkError> {
    if plan.count == 0 {
      return Err(BulkError::InvalidCount);
    }
    plan.template.validate()?;

    let template = Arc::new(plan.template.clone());
    let started_at = Utc::now();
    let start = Instant::now();
    // A deadline too far out to represent is no deadline.
    let deadline = plan.deadline.and_then(|d| start.checked_add(d));
    let in_flight = self
      .options
      .max_in_flight
      .map(|n| Arc::new(Semaphore::new(n)));

    // ── Dispatch phase ──────────────────────────────────────
    let mut gate = PacingGate::new(plan.pacing);
    let mut slots: Vec<Slot> = Vec::with_capacity(plan.count);

    for index in 0..plan.count {
      let attempt = OrderAttempt::new(index, self.oids.next_oid(), Arc::clone(&template));

      let released = match deadline {
        Some(at) => gate.wait_until_or(at).await,
        None => {
          gate.wait().await;
          true
        }
      };

      if !released {
        warn!(
          dispatched = index,
          remaining = plan.count - index,
          "Batch deadline reached during dispatch"
        );
        slots.extend((index..plan.count).map(|i| {
          Slot::Settled(OrderOutcome::Failure(OrderFailure::generic(
            i,
            FailureKind::Timeout,
            "batch deadline passed before dispatch",
          )))
        }));
        break;
      }

      slots.push(self.dispatch(attempt, in_flight.as_ref()));
    }

    let dispatch_span = start.elapsed();
    debug!(span_ms = dispatch_span.as_millis() as u64, "Dispatch phase complete");

    // ── Collect phase ───────────────────────────────────────
    let mut outcomes = Vec::with_capacity(plan.count);
    for (index, slot) in slots.into_iter().enumerate() {
      let outcome = match slot {
        Slot::Settled(outcome) => outcome,
        Slot::Pending(worker) => collect(index, worker, deadline).await,
      };
      outcomes.push(outcome);
    }

    let report = BulkReport {
      outcomes,
      started_at,
      dispatch_span,
      elapsed: start.elapsed(),
    };

    info!(
      succeeded = report.success_count(),
      failed = report.failure_count(),
      elapsed_ms = report.elapsed.as_millis() as u64,
      "Bulk submission finished"
    );

    Ok(report)
  }

  /// Hand one attempt to a worker task, or settle it as a dispatch failure.
  fn dispatch(&self, attempt: OrderAttempt, in_flight: Option<&Arc<Semaphore>>) -> Slot {
    let index = attempt.index;

    if let Err(e) = self.client.preflight(&attempt) {
      warn!(attempt = index, error = %e, "Attempt rejected before dispatch");
      return Slot::Settled(OrderOutcome::Failure(OrderFailure::generic(
        index,
        FailureKind::Dispatch,
        e.to_string(),
      )));
    }

    let permit = match in_flight
      .map(|sem| Arc::clone(sem).try_acquire_owned())
      .transpose()
    {
      Ok(permit) => permit,
      Err(e) => {
        warn!(attempt = index, error = %e, "Worker pool exhausted");
        return Slot::Settled(OrderOutcome::Failure(OrderFailure::generic(
          index,
          FailureKind::Dispatch,
          format!("worker pool exhausted: {e}"),
        )));
      }
    };

    let client = Arc::clone(&self.client);
    debug!(attempt = index, client_oid = %attempt.client_oid, "Dispatching attempt");

    Slot::Pending(Worker(tokio::spawn(async move {
      let _permit = permit;
      client.create_order(&attempt).await
    })))
  }
}

/// Await one worker and turn whatever it produced into an outcome.
async fn collect(
  index: usize,
  mut worker: Worker,
  deadline: Option<Instant>,
) -> OrderOutcome {
  let handle = &mut worker.0;
  let joined = match deadline {
    None => handle.await,
    Some(at) => match timeout_at(at, &mut *handle).await {
      Ok(joined) => joined,
      Err(_) => {
        handle.abort();
        match handle.await {
          Err(e) if e.is_cancelled() => {
            return OrderOutcome::Failure(OrderFailure::generic(
              index,
              FailureKind::Timeout,
              "batch deadline passed before the attempt completed",
            ));
          }
          // Finished between the deadline and the abort.
          other => other,
        }
      }
    },
  };

  match joined {
    Ok(Ok(ack)) => OrderOutcome::Success(ack),
    Ok(Err(e)) => OrderOutcome::Failure(e.into_failure(index)),
    Err(e) => OrderOutcome::Failure(join_failure(index, &e)),
  }
}

fn join_failure(index: usize, e: &JoinError) -> OrderFailure {
  let message = if e.is_panic() {
    "worker task panicked"
  } else {
    "worker task was cancelled"
  };
  warn!(attempt = index, error = %e, "Worker task did not complete");
  OrderFailure::generic(index, FailureKind::TaskAborted, message)
}
