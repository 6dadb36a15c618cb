//! Serde-backed project description types.
//!
//! A project is described by a JSON config file (`project.json`) naming the
//! modules (source roots) and artifacts (assembled outputs) a test builds.

use serde::{Deserialize, Serialize};

/// A named source root, relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDef {
  /// Unique target name.
  pub name: String,

  /// Source directory, relative to the project root.
  pub source_dir: String,
}

/// How an artifact is materialized on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
  /// A jar container holding the entries.
  Archive,
  /// A plain directory tree holding the entries.
  Exploded,
}

/// What an artifact entry is sourced from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArtifactInput {
  /// The compiled output tree of a module.
  Module { module: String },
  /// A single file, relative to the project root.
  File { file: String },
}

/// Place `input` under the relative path `at` inside the artifact.
///
/// For a module input, `at` is the directory the module's output tree is
/// copied under (empty string means the artifact root). For a file input,
/// `at` is the full destination path of the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactEntry {
  #[serde(flatten)]
  pub input: ArtifactInput,

  #[serde(default)]
  pub at: String,
}

/// A named, assembled build output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactDef {
  /// Unique target name.
  pub name: String,

  /// Materialization kind.
  pub kind: ArtifactKind,

  /// Entries assembled into the artifact. May be empty.
  #[serde(default)]
  pub entries: Vec<ArtifactEntry>,

  /// Output location override, relative to the project root.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub output: Option<String>,
}

/// The full project description as read from `project.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectSpec {
  pub name: String,

  #[serde(default)]
  pub modules: Vec<ModuleDef>,

  #[serde(default)]
  pub artifacts: Vec<ArtifactDef>,
}
