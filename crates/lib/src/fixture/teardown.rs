//! Accumulating teardown step runner.
//!
//! Teardown is an unconditional list of cleanup actions. A failing action is
//! recorded and logged but never prevents the remaining actions from
//! running; the caller gets every failure back in one report.

use tracing::error;

use crate::error::HarnessError;

/// One failed teardown step.
#[derive(Debug)]
pub struct TeardownFailure {
  pub step: &'static str,
  pub error: HarnessError,
}

/// Outcome of a teardown run.
#[derive(Debug, Default)]
pub struct TeardownReport {
  pub failures: Vec<TeardownFailure>,
}

impl TeardownReport {
  /// True when every step completed.
  pub fn is_clean(&self) -> bool {
    self.failures.is_empty()
  }

  /// Turn the report into a result, listing every failed step.
  pub fn into_result(self) -> Result<(), HarnessError> {
    if self.failures.is_empty() {
      return Ok(());
    }
    let summary = self
      .failures
      .iter()
      .map(|f| format!("{}: {}", f.step, f.error))
      .collect::<Vec<_>>()
      .join("; ");
    Err(HarnessError::Teardown { summary })
  }
}

/// Collects teardown step failures without aborting on the first one.
#[derive(Debug, Default)]
pub(crate) struct CleanupSteps {
  failures: Vec<TeardownFailure>,
}

impl CleanupSteps {
  /// Run one step; on failure, log it and keep going.
  pub fn run(&mut self, step: &'static str, action: impl FnOnce() -> Result<(), HarnessError>) {
    if let Err(err) = action() {
      error!(step, error = %err, "teardown step failed");
      self.failures.push(TeardownFailure { step, error: err });
    }
  }

  pub fn into_report(self) -> TeardownReport {
    TeardownReport {
      failures: self.failures,
    }
  }
}
