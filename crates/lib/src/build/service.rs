//! The seam between the harness and a build backend.

use std::sync::{Arc, Mutex};

use crate::project::Project;

use super::latch::CompletionLatch;
use super::types::{BuildError, BuildOutcome, BuildRequest, CompileScope, CompilerMessage};

/// Completion callback a build service must invoke exactly once.
pub type CompletionFn = Box<dyn FnOnce(Result<BuildOutcome, BuildError>) + Send + 'static>;

/// A build backend the fixture can drive.
///
/// Infrastructure failures (I/O, dead workers) surface as `Err`; compile
/// diagnostics travel as [`CompilerMessage`]s inside a successful result.
pub trait BuildService: Send + Sync {
  /// Issue an asynchronous build of `request`.
  ///
  /// `on_complete` must be invoked exactly once, from any thread, when the
  /// build finishes or fails.
  fn build(&self, project: &Project, request: BuildRequest, on_complete: CompletionFn);

  /// Synchronously compile a scope, returning every emitted message.
  fn compile(&self, project: &Project, scope: &CompileScope) -> Result<Vec<CompilerMessage>, BuildError>;
}

/// Issue an asynchronous build and block until its completion callback fires.
///
/// The calling thread parks on a [`CompletionLatch`] counted down by the
/// callback; the wait is unbounded and cancellation is not supported.
pub fn run_build(
  service: &dyn BuildService,
  project: &Project,
  request: BuildRequest,
) -> Result<BuildOutcome, BuildError> {
  let latch = Arc::new(CompletionLatch::new(1));
  let slot: Arc<Mutex<Option<Result<BuildOutcome, BuildError>>>> = Arc::new(Mutex::new(None));

  let callback_latch = Arc::clone(&latch);
  let callback_slot = Arc::clone(&slot);
  service.build(
    project,
    request,
    Box::new(move |result| {
      *callback_slot.lock().unwrap() = Some(result);
      callback_latch.count_down();
    }),
  );

  latch.wait();

  let result = slot.lock().unwrap().take();
  result.unwrap_or(Err(BuildError::Aborted))
}
