//! Build trigger and backend seam.
//!
//! A test names targets (modules or artifacts); the trigger dispatches them
//! to a [`BuildService`] and blocks until completion, then applies one
//! failure policy to the delivered messages: warnings are logged and never
//! fatal, and any error-severity message fails the call with the first such
//! message as the reason.

mod engine;
mod latch;
mod service;
mod types;

use tracing::{debug, error, warn};

pub use engine::LocalBuildEngine;
pub use latch::CompletionLatch;
pub use service::{BuildService, CompletionFn, run_build};
pub use types::{
  BuildConfig, BuildError, BuildOutcome, BuildRequest, CompileScope, CompilerMessage, Severity, TargetKind,
};

/// Apply the message failure policy.
///
/// Every message is inspected: errors are logged and remembered, warnings
/// logged, info/statistics traced. If any error-severity message exists the
/// call fails with the *first* one as its reason. Scanning continues past
/// it so every error is logged, but a single error always fails the whole
/// call.
pub fn fail_on_errors(messages: &[CompilerMessage]) -> Result<(), BuildError> {
  let mut first_error: Option<&CompilerMessage> = None;

  for message in messages {
    match message.severity {
      Severity::Error => {
        error!(%message, "compilation error");
        if first_error.is_none() {
          first_error = Some(message);
        }
      }
      Severity::Warning => warn!(%message, "compilation warning"),
      Severity::Info | Severity::Statistics => debug!(%message),
    }
  }

  match first_error {
    Some(message) => Err(BuildError::Failed {
      message: message.text.clone(),
    }),
    None => Ok(()),
  }
}
