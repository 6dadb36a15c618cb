//! Zip/jar archive assembly and inspection.
//!
//! Archives are the only wire format the harness defines: a standard zip
//! container of (relative path, byte content) entries. Jar archives get a
//! `META-INF/MANIFEST.MF` as their first entry.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use tracing::debug;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::consts::{ARCHIVE_EXTENSIONS, JAR_MANIFEST, JAR_MANIFEST_PATH};

use super::WorkspaceError;

/// One archive entry: byte content under a relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
  pub path: String,
  pub content: Vec<u8>,
}

impl ArchiveEntry {
  pub fn new(path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
    Self {
      path: path.into(),
      content: content.into(),
    }
  }
}

/// Whether `path` carries an extension archives may use.
pub fn has_archive_extension(path: &Path) -> bool {
  path
    .extension()
    .and_then(|e| e.to_str())
    .is_some_and(|e| ARCHIVE_EXTENSIONS.iter().any(|known| e.eq_ignore_ascii_case(known)))
}

/// Write a zip/jar archive containing `entries` at `path`.
///
/// The path must already satisfy [`has_archive_extension`]; violating that
/// is a test-setup error, not a runtime fault.
pub fn write_archive(path: &Path, entries: &[ArchiveEntry]) -> Result<(), WorkspaceError> {
  if !has_archive_extension(path) {
    return Err(WorkspaceError::UnsupportedArchiveExtension {
      path: path.to_path_buf(),
    });
  }

  let file = File::create(path)?;
  let mut writer = ZipWriter::new(file);
  let options = SimpleFileOptions::default();

  if is_jar(path) {
    writer.start_file(JAR_MANIFEST_PATH, options)?;
    writer.write_all(JAR_MANIFEST.as_bytes())?;
  }

  for entry in entries {
    writer.start_file(entry.path.replace('\\', "/"), options)?;
    writer.write_all(&entry.content)?;
  }

  writer.finish()?;
  debug!(path = %path.display(), entries = entries.len(), "wrote archive");
  Ok(())
}

/// All entry names in an archive, in container order.
pub fn entry_names(path: &Path) -> Result<Vec<String>, WorkspaceError> {
  let archive = ZipArchive::new(File::open(path)?)?;
  Ok(archive.file_names().map(str::to_string).collect())
}

/// Read one entry's bytes out of an archive.
pub fn read_entry(path: &Path, entry: &str) -> Result<Vec<u8>, WorkspaceError> {
  let mut archive = ZipArchive::new(File::open(path)?)?;
  let mut file = match archive.by_name(entry) {
    Ok(file) => file,
    Err(ZipError::FileNotFound) => {
      return Err(WorkspaceError::EntryNotFound {
        archive: path.to_path_buf(),
        entry: entry.to_string(),
      });
    }
    Err(e) => return Err(e.into()),
  };

  let mut content = Vec::new();
  file.read_to_end(&mut content)?;
  Ok(content)
}

fn is_jar(path: &Path) -> bool {
  path
    .extension()
    .and_then(|e| e.to_str())
    .is_some_and(|e| e.eq_ignore_ascii_case("jar"))
}
