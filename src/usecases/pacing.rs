//! Pacing Gate - Dispatch Rate Control
//!
//! Spaces successive dispatches at least `interval` apart so the
//! batch stays under the exchange's order-placement throttle. Only the
//! dispatching path waits here; worker tasks never touch the gate.

use std::time::Duration;

use tokio::time::{sleep, sleep_until, Instant};

/// Enforces a minimum gap between releases.
#[derive(Debug)]
pub struct PacingGate {
  interval: Duration,
  last_release: Instant,
}

impl PacingGate {
  /// Create a gate. The first release waits one full interval,
  /// measured from construction.
  pub fn new(interval: Duration) -> Self {
    Self {
      interval,
      last_release: Instant::now(),
    }
  }

  pub const fn interval(&self) -> Duration {
    self.interval
  }

  /// Wait until `interval` has passed since the previous release.
  pub async fn wait(&mut self) {
    if self.interval.is_zero() {
      return;
    }
    match self.last_release.checked_add(self.interval) {
      Some(due) => sleep_until(due).await,
      None => sleep(self.interval).await,
    }
    self.last_release = Instant::now();
  }

  /// Like [`wait`](Self::wait), but give up at `deadline`.
  ///
  /// Returns `false` if the deadline comes first; the gate is not
  /// released in that case.
  pub async fn wait_until_or(&mut self, deadline: Instant) -> bool {
    if Instant::now() >= deadline {
      return false;
    }
    if self.interval.is_zero() {
      return true;
    }
    let due = match self.last_release.checked_add(self.interval) {
      Some(due) if due <= deadline => due,
      // Unrepresentable release times are past any deadline.
      _ => {
        sleep_until(deadline).await;
        return false;
      }
    };
    sleep_until(due).await;
    self.last_release = Instant::now();
    true
  }
}
