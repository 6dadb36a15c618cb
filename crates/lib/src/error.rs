//! Crate-level error aggregation.
//!
//! Each module defines its own error enum; `HarnessError` collects them for
//! callers that drive the whole fixture lifecycle.

use thiserror::Error;

use crate::build::BuildError;
use crate::fixture::SetupError;
use crate::project::ProjectError;
use crate::workspace::WorkspaceError;

/// Errors surfaced by harness operations.
#[derive(Debug, Error)]
pub enum HarnessError {
  /// Project model error (lookup, validation, config parsing).
  #[error("project error: {0}")]
  Project(#[from] ProjectError),

  /// Workspace file operation failed.
  #[error("workspace error: {0}")]
  Workspace(#[from] WorkspaceError),

  /// Build trigger or build service failure.
  #[error("build error: {0}")]
  Build(#[from] BuildError),

  /// Platform probe failure.
  #[error("platform error: {0}")]
  Platform(#[from] rig_platform::PlatformError),

  /// I/O error outside any more specific operation.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  /// Fixture setup failed.
  #[error("setup error: {0}")]
  Setup(#[from] SetupError),

  /// One or more teardown steps failed; `summary` lists every one.
  #[error("teardown failed: {summary}")]
  Teardown { summary: String },

  /// An operation needed the project, but none was configured yet.
  #[error("fixture has no project configured")]
  NoProject,

  /// The current environment cannot run this test; report it as skipped.
  #[error("unsupported environment: {reason}")]
  Unsupported { reason: String },
}
