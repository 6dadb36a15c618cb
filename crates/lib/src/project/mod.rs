//! The project/module abstraction a fixture owns.
//!
//! A [`Project`] binds a validated [`ProjectSpec`] to a project root
//! directory and answers the lookups the build trigger and the layout
//! assertions need: module and artifact definitions by name, and the output
//! locations each target produces into.

mod types;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::consts::{ARTIFACT_OUTPUT_DIR, MODULE_OUTPUT_DIR};

pub use types::{ArtifactDef, ArtifactEntry, ArtifactInput, ArtifactKind, ModuleDef, ProjectSpec};

/// Errors from project configuration and lookups.
#[derive(Debug, Error)]
pub enum ProjectError {
  /// Config file missing.
  #[error("project config not found: {0}")]
  ConfigNotFound(PathBuf),

  /// Config file could not be parsed.
  #[error("invalid project config: {0}")]
  Parse(#[from] serde_json::Error),

  /// I/O failure while reading the config.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  /// No module with the given name.
  #[error("module not found: {0}")]
  ModuleNotFound(String),

  /// No artifact with the given name.
  #[error("artifact not found: {0}")]
  ArtifactNotFound(String),

  /// Two targets share a name.
  #[error("duplicate target name: {0}")]
  DuplicateTarget(String),

  /// A target was declared with an empty name.
  #[error("target name must not be empty")]
  EmptyTargetName,

  /// An artifact entry references a module that is not declared.
  #[error("artifact '{artifact}' references unknown module '{module}'")]
  UnknownEntryModule { artifact: String, module: String },
}

impl ProjectSpec {
  /// Parse a spec from JSON text.
  pub fn from_json(text: &str) -> Result<Self, ProjectError> {
    Ok(serde_json::from_str(text)?)
  }

  /// Read a spec from a JSON config file.
  pub fn from_file(path: &Path) -> Result<Self, ProjectError> {
    if !path.exists() {
      return Err(ProjectError::ConfigNotFound(path.to_path_buf()));
    }
    Self::from_json(&std::fs::read_to_string(path)?)
  }
}

/// A resolved project bound to its root directory.
///
/// Owned exclusively by the fixture; destroyed at teardown and never shared
/// across tests.
#[derive(Debug, Clone)]
pub struct Project {
  root: PathBuf,
  spec: ProjectSpec,
}

impl Project {
  /// Bind `spec` to `root`, validating target names and entry references.
  pub fn new(root: impl Into<PathBuf>, spec: ProjectSpec) -> Result<Self, ProjectError> {
    validate(&spec)?;
    let root = root.into();
    debug!(
      project = %spec.name,
      root = %root.display(),
      modules = spec.modules.len(),
      artifacts = spec.artifacts.len(),
      "project configured"
    );
    Ok(Self { root, spec })
  }

  /// Load a project from a JSON config file.
  pub fn from_config(root: impl Into<PathBuf>, config_path: &Path) -> Result<Self, ProjectError> {
    Self::new(root, ProjectSpec::from_file(config_path)?)
  }

  /// The project root directory.
  pub fn root(&self) -> &Path {
    &self.root
  }

  /// The project name.
  pub fn name(&self) -> &str {
    &self.spec.name
  }

  /// All declared modules.
  pub fn modules(&self) -> &[ModuleDef] {
    &self.spec.modules
  }

  /// All declared artifacts.
  pub fn artifacts(&self) -> &[ArtifactDef] {
    &self.spec.artifacts
  }

  /// Look up a module by name.
  pub fn module(&self, name: &str) -> Result<&ModuleDef, ProjectError> {
    self
      .spec
      .modules
      .iter()
      .find(|m| m.name == name)
      .ok_or_else(|| ProjectError::ModuleNotFound(name.to_string()))
  }

  /// Look up an artifact by name.
  pub fn artifact(&self, name: &str) -> Result<&ArtifactDef, ProjectError> {
    self
      .spec
      .artifacts
      .iter()
      .find(|a| a.name == name)
      .ok_or_else(|| ProjectError::ArtifactNotFound(name.to_string()))
  }

  /// The source root of a module, absolute.
  pub fn module_source_dir(&self, name: &str) -> Result<PathBuf, ProjectError> {
    let module = self.module(name)?;
    Ok(self.root.join(&module.source_dir))
  }

  /// Where a module's compiled output lands: `<root>/out/production/<name>`.
  pub fn module_out_dir(&self, name: &str) -> Result<PathBuf, ProjectError> {
    let module = self.module(name)?;
    Ok(self.root.join(MODULE_OUTPUT_DIR).join(&module.name))
  }

  /// Where an artifact is produced.
  ///
  /// The declared `output` override wins; otherwise archives land at
  /// `<root>/out/artifacts/<name>.jar` and exploded artifacts at
  /// `<root>/out/artifacts/<name>`.
  pub fn artifact_output_path(&self, name: &str) -> Result<PathBuf, ProjectError> {
    let artifact = self.artifact(name)?;
    if let Some(output) = &artifact.output {
      return Ok(self.root.join(output));
    }
    let base = self.root.join(ARTIFACT_OUTPUT_DIR);
    Ok(match artifact.kind {
      ArtifactKind::Archive => base.join(format!("{}.jar", artifact.name)),
      ArtifactKind::Exploded => base.join(&artifact.name),
    })
  }
}

fn validate(spec: &ProjectSpec) -> Result<(), ProjectError> {
  let mut seen = std::collections::HashSet::new();
  for name in spec
    .modules
    .iter()
    .map(|m| &m.name)
    .chain(spec.artifacts.iter().map(|a| &a.name))
  {
    if name.is_empty() {
      return Err(ProjectError::EmptyTargetName);
    }
    if !seen.insert(name.as_str()) {
      return Err(ProjectError::DuplicateTarget(name.clone()));
    }
  }

  for artifact in &spec.artifacts {
    for entry in &artifact.entries {
      if let ArtifactInput::Module { module } = &entry.input
        && !spec.modules.iter().any(|m| &m.name == module)
      {
        return Err(ProjectError::UnknownEntryModule {
          artifact: artifact.name.clone(),
          module: module.clone(),
        });
      }
    }
  }

  Ok(())
}
