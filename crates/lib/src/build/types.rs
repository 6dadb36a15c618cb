//! Requests, messages, and configuration for the build trigger.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::project::ProjectError;
use crate::workspace::WorkspaceError;

/// What kind of targets a request names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
  Modules,
  Artifacts,
}

/// An ordered set of target names plus the kind of build to run.
///
/// Transient; exists only for the duration of one build call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
  pub targets: Vec<String>,
  pub kind: TargetKind,
}

impl BuildRequest {
  /// Request a build of the named modules.
  pub fn modules<I, S>(names: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      targets: names.into_iter().map(Into::into).collect(),
      kind: TargetKind::Modules,
    }
  }

  /// Request a build of the named artifacts.
  pub fn artifacts<I, S>(names: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      targets: names.into_iter().map(Into::into).collect(),
      kind: TargetKind::Artifacts,
    }
  }
}

/// Argument of the legacy synchronous compile path: the targets plus the
/// build mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileScope {
  pub request: BuildRequest,

  /// When set, target output from previous builds is cleared first.
  pub rebuild: bool,
}

impl CompileScope {
  pub fn new(request: BuildRequest) -> Self {
    Self {
      request,
      rebuild: false,
    }
  }
}

/// Message severity, in decreasing order of weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
  Error,
  Warning,
  Info,
  Statistics,
}

impl Severity {
  pub const fn as_str(&self) -> &'static str {
    match self {
      Severity::Error => "error",
      Severity::Warning => "warning",
      Severity::Info => "info",
      Severity::Statistics => "statistics",
    }
  }
}

/// One message emitted by a build backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerMessage {
  pub severity: Severity,
  pub text: String,
  pub path: Option<PathBuf>,
}

impl CompilerMessage {
  pub fn new(severity: Severity, text: impl Into<String>) -> Self {
    Self {
      severity,
      text: text.into(),
      path: None,
    }
  }

  pub fn error(text: impl Into<String>) -> Self {
    Self::new(Severity::Error, text)
  }

  pub fn warning(text: impl Into<String>) -> Self {
    Self::new(Severity::Warning, text)
  }

  pub fn info(text: impl Into<String>) -> Self {
    Self::new(Severity::Info, text)
  }

  pub fn statistics(text: impl Into<String>) -> Self {
    Self::new(Severity::Statistics, text)
  }

  pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
    self.path = Some(path.into());
    self
  }
}

impl fmt::Display for CompilerMessage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.path {
      Some(path) => write!(f, "{}: {} ({})", self.severity.as_str(), self.text, path.display()),
      None => write!(f, "{}: {}", self.severity.as_str(), self.text),
    }
  }
}

/// Everything a completed build delivered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOutcome {
  pub messages: Vec<CompilerMessage>,
}

impl BuildOutcome {
  pub fn new(messages: Vec<CompilerMessage>) -> Self {
    Self { messages }
  }

  /// The first error-severity message, if any.
  pub fn first_error(&self) -> Option<&CompilerMessage> {
    self.messages.iter().find(|m| m.severity == Severity::Error)
  }

  /// All error-severity messages.
  pub fn errors(&self) -> impl Iterator<Item = &CompilerMessage> {
    self.messages.iter().filter(|m| m.severity == Severity::Error)
  }

  /// True when no error-severity message was emitted.
  pub fn is_success(&self) -> bool {
    self.first_error().is_none()
  }
}

/// Errors from the build trigger and build services.
#[derive(Debug, Error)]
pub enum BuildError {
  /// The build emitted an error-severity message; `message` is the first one.
  #[error("compilation failed with error: {message}")]
  Failed { message: String },

  /// Target lookup or validation failed.
  #[error("project error: {0}")]
  Project(#[from] ProjectError),

  /// Artifact assembly failed at the container level.
  #[error("workspace error: {0}")]
  Workspace(#[from] WorkspaceError),

  /// I/O failure inside the build backend.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  /// A build task died before producing a result.
  #[error("build task failed: {0}")]
  Task(String),

  /// The service dropped the completion callback without invoking it.
  #[error("build service dropped the completion callback")]
  Aborted,
}

/// Configuration for the reference build engine.
#[derive(Debug, Clone)]
pub struct BuildConfig {
  /// Maximum number of targets built in parallel.
  pub parallelism: usize,
}

impl Default for BuildConfig {
  fn default() -> Self {
    Self {
      parallelism: num_cpus(),
    }
  }
}

/// Get the number of CPUs for default parallelism.
fn num_cpus() -> usize {
  std::thread::available_parallelism().map(|p| p.get()).unwrap_or(4)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn request_constructors() {
    let request = BuildRequest::modules(["app", "util"]);
    assert_eq!(request.kind, TargetKind::Modules);
    assert_eq!(request.targets, vec!["app".to_string(), "util".to_string()]);

    let request = BuildRequest::artifacts(["app-jar"]);
    assert_eq!(request.kind, TargetKind::Artifacts);
  }

  #[test]
  fn outcome_error_accessors() {
    let outcome = BuildOutcome::new(vec![
      CompilerMessage::warning("slow"),
      CompilerMessage::error("first"),
      CompilerMessage::error("second"),
    ]);

    assert!(!outcome.is_success());
    assert_eq!(outcome.first_error().unwrap().text, "first");
    assert_eq!(outcome.errors().count(), 2);
  }

  #[test]
  fn outcome_without_errors_succeeds() {
    let outcome = BuildOutcome::new(vec![
      CompilerMessage::warning("w"),
      CompilerMessage::info("i"),
      CompilerMessage::statistics("s"),
    ]);
    assert!(outcome.is_success());
  }

  #[test]
  fn message_display_includes_path() {
    let message = CompilerMessage::error("boom").with_path("src/a.rs");
    assert_eq!(format!("{message}"), "error: boom (src/a.rs)");
  }

  #[test]
  fn build_config_default_parallelism() {
    assert!(BuildConfig::default().parallelism >= 1);
  }
}
