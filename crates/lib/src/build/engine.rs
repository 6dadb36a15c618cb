//! Reference build backend running entirely in-process.
//!
//! `LocalBuildEngine` is what integration tests drive when no external build
//! host is wired in. "Compiling" a module copies its source tree into
//! `out/production/<module>`; building an artifact assembles the declared
//! entries into a jar or an exploded directory. Targets run concurrently on
//! a tokio runtime, bounded by a semaphore at the configured parallelism.
//!
//! Diagnostics (missing source roots, missing module output) are delivered
//! as error-severity messages; infrastructure failures (I/O, dead tasks)
//! are `Err`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::runtime::Runtime;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::project::{ArtifactInput, ArtifactKind, Project};
use crate::workspace::ArchiveEntry;
use crate::workspace::archive;

use super::service::{BuildService, CompletionFn};
use super::types::{
  BuildConfig, BuildError, BuildOutcome, BuildRequest, CompileScope, CompilerMessage, Severity, TargetKind,
};

/// In-process build service over a private tokio runtime.
pub struct LocalBuildEngine {
  runtime: Runtime,
  config: BuildConfig,
}

impl LocalBuildEngine {
  pub fn new() -> Result<Self, BuildError> {
    Self::with_config(BuildConfig::default())
  }

  pub fn with_config(config: BuildConfig) -> Result<Self, BuildError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
      .worker_threads(2)
      .thread_name("testrig-build")
      .enable_all()
      .build()?;
    Ok(Self { runtime, config })
  }
}

impl BuildService for LocalBuildEngine {
  fn build(&self, project: &Project, request: BuildRequest, on_complete: CompletionFn) {
    let project = project.clone();
    let config = self.config.clone();
    info!(targets = ?request.targets, kind = ?request.kind, "build requested");

    // Detached on purpose; completion travels through the callback.
    let _ = self.runtime.spawn(async move {
      let result = run_request(project, request, config).await;
      on_complete(result);
    });
  }

  fn compile(&self, project: &Project, scope: &CompileScope) -> Result<Vec<CompilerMessage>, BuildError> {
    if scope.rebuild {
      clear_outputs(project, &scope.request)?;
    }

    let outcome = self
      .runtime
      .block_on(run_request(project.clone(), scope.request.clone(), self.config.clone()))?;
    Ok(outcome.messages)
  }
}

/// Delete previous output for every target in the request.
fn clear_outputs(project: &Project, request: &BuildRequest) -> Result<(), BuildError> {
  for name in &request.targets {
    let path = match request.kind {
      TargetKind::Modules => project.module_out_dir(name)?,
      TargetKind::Artifacts => project.artifact_output_path(name)?,
    };
    remove_any(&path)?;
  }
  Ok(())
}

fn remove_any(path: &Path) -> std::io::Result<()> {
  let result = if path.is_dir() {
    fs::remove_dir_all(path)
  } else {
    fs::remove_file(path)
  };
  match result {
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
    other => other,
  }
}

async fn run_request(
  project: Project,
  request: BuildRequest,
  config: BuildConfig,
) -> Result<BuildOutcome, BuildError> {
  // Unknown target names fail the call itself, not the outcome.
  for name in &request.targets {
    match request.kind {
      TargetKind::Modules => {
        project.module(name)?;
      }
      TargetKind::Artifacts => {
        project.artifact(name)?;
      }
    }
  }

  let project = Arc::new(project);
  let semaphore = Arc::new(Semaphore::new(config.parallelism.max(1)));
  let mut tasks = JoinSet::new();

  for name in request.targets.clone() {
    let project = Arc::clone(&project);
    let semaphore = Arc::clone(&semaphore);
    let kind = request.kind;

    tasks.spawn(async move {
      let _permit = semaphore.acquire_owned().await.map_err(|_| BuildError::Aborted)?;
      match kind {
        TargetKind::Modules => compile_module(&project, &name),
        TargetKind::Artifacts => build_artifact(&project, &name),
      }
    });
  }

  let mut messages = Vec::new();
  while let Some(joined) = tasks.join_next().await {
    let target_messages = joined.map_err(|e| BuildError::Task(e.to_string()))??;
    messages.extend(target_messages);
  }

  Ok(BuildOutcome::new(messages))
}

/// Copy a module's source tree into its output directory.
fn compile_module(project: &Project, name: &str) -> Result<Vec<CompilerMessage>, BuildError> {
  let source_dir = project.module_source_dir(name)?;
  let out_dir = project.module_out_dir(name)?;
  let mut messages = Vec::new();

  if !source_dir.is_dir() {
    messages.push(
      CompilerMessage::error(format!("module '{name}': source root missing")).with_path(source_dir),
    );
    return Ok(messages);
  }

  fs::create_dir_all(&out_dir)?;

  let mut copied = 0usize;
  for entry in WalkDir::new(&source_dir) {
    let entry = entry.map_err(std::io::Error::from)?;
    if !entry.file_type().is_file() {
      continue;
    }
    let Ok(relative) = entry.path().strip_prefix(&source_dir) else {
      continue;
    };

    let dest = out_dir.join(relative);
    if let Some(parent) = dest.parent() {
      fs::create_dir_all(parent)?;
    }
    fs::copy(entry.path(), &dest)?;
    copied += 1;
  }

  if copied == 0 {
    messages.push(CompilerMessage::warning(format!("module '{name}' has no sources")));
  }
  messages.push(CompilerMessage::statistics(format!(
    "module '{name}': copied {copied} source file(s)"
  )));

  debug!(module = name, copied, out = %out_dir.display(), "module built");
  Ok(messages)
}

/// Assemble an artifact's entries into its output location.
fn build_artifact(project: &Project, name: &str) -> Result<Vec<CompilerMessage>, BuildError> {
  let artifact = project.artifact(name)?.clone();
  let output = project.artifact_output_path(name)?;
  let mut messages = Vec::new();

  // (destination inside the artifact, source file) pairs
  let mut files: Vec<(String, PathBuf)> = Vec::new();

  for entry in &artifact.entries {
    match &entry.input {
      ArtifactInput::Module { module } => {
        let module_out = project.module_out_dir(module)?;
        if !module_out.is_dir() {
          messages.push(
            CompilerMessage::error(format!(
              "artifact '{name}': no compiled output for module '{module}'"
            ))
            .with_path(module_out),
          );
          continue;
        }

        for file in WalkDir::new(&module_out) {
          let file = file.map_err(std::io::Error::from)?;
          if !file.file_type().is_file() {
            continue;
          }
          let Ok(relative) = file.path().strip_prefix(&module_out) else {
            continue;
          };
          files.push((join_entry_path(&entry.at, relative), file.path().to_path_buf()));
        }
      }
      ArtifactInput::File { file } => {
        let source = project.root().join(file);
        if !source.is_file() {
          messages.push(
            CompilerMessage::error(format!("artifact '{name}': file entry missing: {file}"))
              .with_path(source),
          );
          continue;
        }
        let dest = if entry.at.is_empty() {
          source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.clone())
        } else {
          entry.at.clone()
        };
        files.push((dest, source));
      }
    }
  }

  // A failed artifact produces diagnostics and no output.
  if messages.iter().any(|m| m.severity == Severity::Error) {
    return Ok(messages);
  }

  match artifact.kind {
    ArtifactKind::Archive => {
      if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
      }
      let mut entries = Vec::with_capacity(files.len());
      for (dest, source) in &files {
        entries.push(ArchiveEntry::new(dest.clone(), fs::read(source)?));
      }
      archive::write_archive(&output, &entries)?;
    }
    ArtifactKind::Exploded => {
      fs::create_dir_all(&output)?;
      for (dest, source) in &files {
        let dest = output.join(dest);
        if let Some(parent) = dest.parent() {
          fs::create_dir_all(parent)?;
        }
        fs::copy(source, &dest)?;
      }
    }
  }

  messages.push(CompilerMessage::statistics(format!(
    "artifact '{name}': packed {} entr{}",
    files.len(),
    if files.len() == 1 { "y" } else { "ies" }
  )));

  debug!(artifact = name, entries = files.len(), out = %output.display(), "artifact built");
  Ok(messages)
}

/// Join an entry prefix and a relative file path with portable separators.
fn join_entry_path(at: &str, relative: &Path) -> String {
  let portable = rig_platform::to_portable(relative);
  if at.is_empty() {
    portable
  } else {
    format!("{}/{}", at.trim_end_matches('/'), portable)
  }
}
