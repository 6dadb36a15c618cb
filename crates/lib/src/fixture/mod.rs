//! Per-test lifecycle management.
//!
//! A [`Fixture`] owns everything one test touches: a fresh test directory
//! under the scratch root, the project abstraction, the registered config
//! files, and the build service handle. It is constructed in `set_up`,
//! consumed by `tear_down`, and never reused across tests. A panicking test
//! body still gets its teardown through `Drop`.

mod teardown;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::assert::FileTreeSpec;
use crate::build::{self, BuildRequest, BuildService, CompileScope};
use crate::consts::{OUTPUT_DIR, PROJECT_CONFIG_FILE, PROJECT_DIR, SCRATCH_DIR_ENV};
use crate::error::HarnessError;
use crate::project::{ArtifactKind, Project, ProjectSpec};
use crate::workspace::{Stamp, Workspace};

use teardown::CleanupSteps;

pub use teardown::{TeardownFailure, TeardownReport};

/// Errors from fixture setup.
#[derive(Debug, Error)]
pub enum SetupError {
  /// The test directory could not be created fresh.
  #[error("failed to prepare test directory '{path}': {source}")]
  TestDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// The user-supplied configure step failed. Teardown already ran
  /// best-effort; this carries the original failure.
  #[error("project configuration step failed: {source}")]
  Configure {
    #[source]
    source: Box<HarnessError>,
  },
}

/// Per-test configuration.
///
/// The scratch root is an explicit parameter: the given path wins, then the
/// `TESTRIG_SCRATCH_DIR` environment variable, then the system temp dir.
#[derive(Debug, Clone)]
pub struct FixtureConfig {
  pub name: String,
  pub scratch_root: Option<PathBuf>,

  /// Route builds through the asynchronous task-runner path instead of the
  /// legacy synchronous compile path.
  pub use_task_runner: bool,
}

impl FixtureConfig {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      scratch_root: None,
      use_task_runner: false,
    }
  }

  pub fn scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
    self.scratch_root = Some(root.into());
    self
  }

  pub fn use_task_runner(mut self, on: bool) -> Self {
    self.use_task_runner = on;
    self
  }

  fn resolve_scratch_root(&self) -> PathBuf {
    if let Some(root) = &self.scratch_root {
      return root.clone();
    }
    if let Ok(root) = std::env::var(SCRATCH_DIR_ENV)
      && !root.is_empty()
    {
      return PathBuf::from(root);
    }
    std::env::temp_dir()
  }
}

/// The isolated per-test environment.
pub struct Fixture {
  name: String,
  test_dir: PathBuf,
  workspace: Workspace,
  project: Option<Project>,
  service: Arc<dyn BuildService>,
  config_files: Vec<PathBuf>,
  allowed_roots: Vec<PathBuf>,
  use_task_runner: bool,
  torn_down: bool,
}

impl std::fmt::Debug for Fixture {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Fixture")
      .field("name", &self.name)
      .field("test_dir", &self.test_dir)
      .field("workspace", &self.workspace)
      .field("project", &self.project)
      .field("service", &format_args!("<dyn BuildService>"))
      .field("config_files", &self.config_files)
      .field("allowed_roots", &self.allowed_roots)
      .field("use_task_runner", &self.use_task_runner)
      .field("torn_down", &self.torn_down)
      .finish()
  }
}

impl Fixture {
  /// Set up a fixture: fresh empty test directory, project root, then the
  /// user-supplied configure step.
  ///
  /// If the configure step fails, teardown runs best-effort first (its
  /// failures on this rescue path are logged, never raised) and the
  /// original failure propagates as [`SetupError::Configure`].
  pub fn set_up<F>(
    config: FixtureConfig,
    service: Arc<dyn BuildService>,
    configure: F,
  ) -> Result<Self, SetupError>
  where
    F: FnOnce(&mut Fixture) -> Result<(), HarnessError>,
  {
    let test_dir = config.resolve_scratch_root().join(&config.name);

    // The test directory must exist and be empty.
    if test_dir.exists() {
      fs::remove_dir_all(&test_dir).map_err(|source| SetupError::TestDir {
        path: test_dir.clone(),
        source,
      })?;
    }
    let project_root = test_dir.join(PROJECT_DIR);
    fs::create_dir_all(&project_root).map_err(|source| SetupError::TestDir {
      path: test_dir.clone(),
      source,
    })?;

    info!(test = %config.name, dir = %test_dir.display(), "fixture set up");

    let mut fixture = Self {
      name: config.name,
      test_dir,
      workspace: Workspace::new(project_root),
      project: None,
      service,
      config_files: Vec::new(),
      allowed_roots: Vec::new(),
      use_task_runner: config.use_task_runner,
      torn_down: false,
    };

    if let Err(source) = configure(&mut fixture) {
      let report = fixture.tear_down();
      if !report.is_clean() {
        error!(
          failures = report.failures.len(),
          "teardown failures while rescuing failed setup"
        );
      }
      return Err(SetupError::Configure {
        source: Box::new(source),
      });
    }

    Ok(fixture)
  }

  /// Test name this fixture belongs to.
  pub fn name(&self) -> &str {
    &self.name
  }

  /// The per-test directory holding the project root.
  pub fn test_dir(&self) -> &Path {
    &self.test_dir
  }

  /// File helpers rooted at the project directory.
  pub fn workspace(&self) -> &Workspace {
    &self.workspace
  }

  /// The configured project.
  pub fn project(&self) -> Result<&Project, HarnessError> {
    self.project.as_ref().ok_or(HarnessError::NoProject)
  }

  /// Install a project spec directly.
  pub fn init_project(&mut self, spec: ProjectSpec) -> Result<(), HarnessError> {
    self.project = Some(Project::new(self.workspace.root(), spec)?);
    Ok(())
  }

  /// Load the project from `project.json` in the project root.
  pub fn load_project(&mut self) -> Result<(), HarnessError> {
    let config_path = self.workspace.path(PROJECT_CONFIG_FILE);
    self.project = Some(Project::from_config(self.workspace.root(), &config_path)?);
    Ok(())
  }

  /// Write `project.json` with an advanced timestamp and register it for
  /// cleanup.
  pub fn create_project_config(&mut self, json: &str) -> Result<PathBuf, HarnessError> {
    self.create_config_file(PROJECT_CONFIG_FILE, json)
  }

  /// Write any config file with an advanced timestamp and register it for
  /// cleanup.
  pub fn create_config_file(
    &mut self,
    relative: impl AsRef<Path>,
    content: &str,
  ) -> Result<PathBuf, HarnessError> {
    let path = self.workspace.write_file(relative, content, Stamp::Advance)?;
    if !self.config_files.contains(&path) {
      self.config_files.push(path.clone());
    }
    Ok(path)
  }

  /// Config files registered so far.
  pub fn config_files(&self) -> &[PathBuf] {
    &self.config_files
  }

  /// Register a filesystem root this test is permitted to touch.
  pub fn allow_root(&mut self, root: impl Into<PathBuf>) {
    self.allowed_roots.push(root.into());
  }

  /// Roots registered during setup.
  pub fn allowed_roots(&self) -> &[PathBuf] {
    &self.allowed_roots
  }

  /// Build the named modules and block until completion.
  pub fn compile_modules<I, S>(&self, names: I) -> Result<(), HarnessError>
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.run_targets(BuildRequest::modules(names))
  }

  /// Build the named artifacts and block until completion.
  pub fn build_artifacts<I, S>(&self, names: I) -> Result<(), HarnessError>
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.run_targets(BuildRequest::artifacts(names))
  }

  fn run_targets(&self, request: BuildRequest) -> Result<(), HarnessError> {
    let project = self.project()?;

    let messages = if self.use_task_runner {
      build::run_build(&*self.service, project, request)?.messages
    } else {
      self.service.compile(project, &CompileScope::new(request))?
    };

    build::fail_on_errors(&messages)?;
    Ok(())
  }

  /// Assert a named artifact resolves to the expected output location,
  /// compared under platform path normalization.
  pub fn assert_artifact_output_path(
    &self,
    artifact: &str,
    expected: impl AsRef<Path>,
  ) -> Result<(), HarnessError> {
    let actual = self.project()?.artifact_output_path(artifact)?;
    let sensitivity = rig_platform::default_case_sensitivity();
    assert!(
      rig_platform::paths_equal(&actual, expected.as_ref(), sensitivity),
      "artifact '{artifact}' output path\nexpected: {}\nactual: {}",
      expected.as_ref().display(),
      actual.display()
    );
    Ok(())
  }

  /// Assert a named artifact produced output matching `expected`.
  ///
  /// Panics with a layout diff on mismatch; lookup failures are errors.
  pub fn assert_artifact_output(
    &self,
    artifact: &str,
    expected: &FileTreeSpec,
  ) -> Result<(), HarnessError> {
    let project = self.project()?;
    let kind = project.artifact(artifact)?.kind;
    let output = project.artifact_output_path(artifact)?;

    assert!(
      output.exists(),
      "artifact '{artifact}' produced no output at {}",
      output.display()
    );

    match kind {
      ArtifactKind::Archive => expected.assert_matches_archive(&output),
      ArtifactKind::Exploded => expected.assert_matches_dir(&output),
    }
    Ok(())
  }

  /// Run the unconditional cleanup steps.
  ///
  /// Every step runs even when earlier ones fail; all failures come back in
  /// the report (and are logged). A second call is a no-op.
  pub fn tear_down(&mut self) -> TeardownReport {
    if self.torn_down {
      return TeardownReport::default();
    }
    self.torn_down = true;
    info!(test = %self.name, "tearing down fixture");

    let mut steps = CleanupSteps::default();

    let config_files = std::mem::take(&mut self.config_files);
    for file in &config_files {
      steps.run("remove config file", || remove_file_if_exists(file));
    }

    let out_dir = self.workspace.path(OUTPUT_DIR);
    steps.run("remove build output", || remove_dir_if_exists(&out_dir));

    steps.run("release project", || {
      self.project = None;
      Ok(())
    });

    let test_dir = self.test_dir.clone();
    steps.run("remove test directory", || remove_dir_if_exists(&test_dir));

    steps.into_report()
  }
}

impl Drop for Fixture {
  fn drop(&mut self) {
    if !self.torn_down {
      let report = self.tear_down();
      if !report.is_clean() {
        error!(
          test = %self.name,
          failures = report.failures.len(),
          "teardown reported failures during drop"
        );
      }
    }
  }
}

/// Run a test body that may discover the environment cannot support it.
///
/// `HarnessError::Unsupported` reports the test as skipped with its reason
/// and returns `None`; any other error fails the test; success returns the
/// body's value.
pub fn run_skippable<T, F>(name: &str, body: F) -> Option<T>
where
  F: FnOnce() -> Result<T, HarnessError>,
{
  match body() {
    Ok(value) => Some(value),
    Err(HarnessError::Unsupported { reason }) => {
      warn!(test = name, %reason, "test skipped");
      println!("Ignored, because {reason}: {name}");
      None
    }
    Err(error) => panic!("{name}: {error}"),
  }
}

fn remove_file_if_exists(path: &Path) -> Result<(), HarnessError> {
  match fs::remove_file(path) {
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
    other => Ok(other?),
  }
}

fn remove_dir_if_exists(path: &Path) -> Result<(), HarnessError> {
  match fs::remove_dir_all(path) {
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
    other => Ok(other?),
  }
}
