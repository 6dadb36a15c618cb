//! File and directory helpers under the fixture's project root.
//!
//! All mutation helpers run synchronously on the calling thread; within one
//! test, workspace writes are sequenced, never concurrent. Paths are always
//! given relative to the workspace root.

pub mod archive;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::consts::STAMP_ADVANCE_SECS;

pub use archive::ArchiveEntry;

/// Errors from workspace file operations.
#[derive(Debug, Error)]
pub enum WorkspaceError {
  /// I/O failure.
  #[error("io error: {0}")]
  Io(#[from] io::Error),

  /// A file could not be created and does not already exist.
  #[error("unable to create file '{path}': {source}")]
  CreateFailed {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// Archive paths must use a `jar` or `zip` extension.
  #[error("archive path must use a jar or zip extension: '{path}'")]
  UnsupportedArchiveExtension { path: PathBuf },

  /// Underlying zip container failure.
  #[error("archive error: {0}")]
  Archive(#[from] zip::result::ZipError),

  /// A named entry is not present in the archive.
  #[error("entry '{entry}' not found in archive '{archive}'")]
  EntryNotFound { archive: PathBuf, entry: String },
}

/// Whether a write should advance the file's timestamp.
///
/// `Advance` bumps the mtime a few seconds past its current value after
/// writing, so file watchers keyed on timestamps observe the change even
/// when writes land within the same clock tick. Used for configuration
/// files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stamp {
  #[default]
  Preserve,
  Advance,
}

/// File helpers rooted at one directory.
#[derive(Debug, Clone)]
pub struct Workspace {
  root: PathBuf,
}

impl Workspace {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  /// The workspace root directory.
  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Absolute path for a workspace-relative path.
  pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
    self.root.join(relative)
  }

  /// Ensure a directory exists, creating parents as needed.
  pub fn create_dir(&self, relative: impl AsRef<Path>) -> Result<PathBuf, WorkspaceError> {
    let path = self.path(relative);
    fs::create_dir_all(&path)?;
    Ok(path)
  }

  /// Ensure several directories exist.
  pub fn create_dirs<I, P>(&self, relative: I) -> Result<(), WorkspaceError>
  where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
  {
    for path in relative {
      self.create_dir(path)?;
    }
    Ok(())
  }

  /// Create an empty file, creating parent directories as needed.
  ///
  /// A file that already exists is left alone; any other creation failure
  /// is an error.
  pub fn create_file(&self, relative: impl AsRef<Path>) -> Result<PathBuf, WorkspaceError> {
    let path = self.path(relative);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent)?;
    }

    match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
      Ok(_) => {}
      // A directory at the target path also reports AlreadyExists.
      Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_file() => {}
      Err(source) => return Err(WorkspaceError::CreateFailed { path, source }),
    }
    Ok(path)
  }

  /// Create or overwrite a file with UTF-8 text content.
  pub fn write_file(
    &self,
    relative: impl AsRef<Path>,
    content: &str,
    stamp: Stamp,
  ) -> Result<PathBuf, WorkspaceError> {
    let path = self.create_file(relative)?;

    // The advanced stamp is relative to the stamp before this write, so
    // repeated stamped writes keep moving forward even within one clock tick.
    let prior = match stamp {
      Stamp::Advance => Some(fs::metadata(&path)?.modified()?),
      Stamp::Preserve => None,
    };

    fs::write(&path, content)?;

    if let Some(prior) = prior {
      set_mtime(&path, prior + Duration::from_secs(STAMP_ADVANCE_SECS))?;
    }

    debug!(path = %path.display(), bytes = content.len(), ?stamp, "wrote file");
    Ok(path)
  }

  /// Read a workspace file as UTF-8 text.
  pub fn read_to_string(&self, relative: impl AsRef<Path>) -> Result<String, WorkspaceError> {
    Ok(fs::read_to_string(self.path(relative))?)
  }

  /// Whether a workspace-relative path exists.
  pub fn exists(&self, relative: impl AsRef<Path>) -> bool {
    self.path(relative).exists()
  }

  /// Assemble a zip/jar archive from `entries`, creating parents as needed.
  ///
  /// The target path must carry a `jar` or `zip` extension; anything else is
  /// a test-setup error. Returns the archive path.
  pub fn create_archive(
    &self,
    relative: impl AsRef<Path>,
    entries: &[ArchiveEntry],
  ) -> Result<PathBuf, WorkspaceError> {
    let path = self.path(relative);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent)?;
    }
    archive::write_archive(&path, entries)?;
    Ok(path)
  }
}

fn set_mtime(path: &Path, to: std::time::SystemTime) -> Result<(), WorkspaceError> {
  let file = fs::OpenOptions::new().write(true).open(path)?;
  file.set_modified(to)?;
  Ok(())
}
