//! Expected file-tree descriptions and layout matching.
//!
//! A [`FileTreeSpec`] describes the shape a build target should have
//! produced; matching compares it against a real directory tree or a
//! zip/jar container and fails with the full set of missing entries,
//! unexpected entries, and content mismatches. Only files participate in
//! matching; directories exist implicitly through their files.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use rig_platform::{default_case_sensitivity, path_key, to_portable};

use crate::consts::JAR_MANIFEST_PATH;
use crate::workspace::archive;

/// One expected entry: a file (optionally with exact content) or a
/// directory of further entries.
#[derive(Debug, Clone)]
pub enum TreeEntry {
  File {
    name: String,
    content: Option<Vec<u8>>,
  },
  Dir {
    name: String,
    children: Vec<TreeEntry>,
  },
}

/// An expected file, matched by presence only.
pub fn file(name: impl Into<String>) -> TreeEntry {
  TreeEntry::File {
    name: name.into(),
    content: None,
  }
}

/// An expected file with exact byte content.
pub fn file_with(name: impl Into<String>, content: impl Into<Vec<u8>>) -> TreeEntry {
  TreeEntry::File {
    name: name.into(),
    content: Some(content.into()),
  }
}

/// An expected directory.
pub fn dir(name: impl Into<String>, children: Vec<TreeEntry>) -> TreeEntry {
  TreeEntry::Dir {
    name: name.into(),
    children,
  }
}

/// An expected file-tree shape.
#[derive(Debug, Clone)]
pub struct FileTreeSpec {
  entries: Vec<TreeEntry>,
}

impl FileTreeSpec {
  pub fn new(entries: Vec<TreeEntry>) -> Self {
    Self { entries }
  }

  /// Assert a directory tree matches this spec.
  pub fn assert_matches_dir(&self, root: &Path) {
    let mut actual = BTreeMap::new();
    for entry in WalkDir::new(root) {
      let entry = entry.unwrap_or_else(|e| panic!("cannot walk '{}': {e}", root.display()));
      if !entry.file_type().is_file() {
        continue;
      }
      let Ok(relative) = entry.path().strip_prefix(root) else {
        continue;
      };
      let content = fs::read(entry.path())
        .unwrap_or_else(|e| panic!("cannot read '{}': {e}", entry.path().display()));
      actual.insert(to_portable(relative), content);
    }

    self.assert_matches(&root.display().to_string(), actual);
  }

  /// Assert a zip/jar container matches this spec.
  ///
  /// The manifest entries the harness writes into jar containers are
  /// excluded from matching.
  pub fn assert_matches_archive(&self, path: &Path) {
    let names = archive::entry_names(path)
      .unwrap_or_else(|e| panic!("cannot open archive '{}': {e}", path.display()));

    let mut actual = BTreeMap::new();
    for name in names {
      if name.ends_with('/') || name == JAR_MANIFEST_PATH {
        continue;
      }
      let content = archive::read_entry(path, &name)
        .unwrap_or_else(|e| panic!("cannot read '{name}' from '{}': {e}", path.display()));
      actual.insert(name, content);
    }

    self.assert_matches(&path.display().to_string(), actual);
  }

  fn assert_matches(&self, described: &str, actual: BTreeMap<String, Vec<u8>>) {
    let sensitivity = default_case_sensitivity();
    let key = |path: &str| path_key(Path::new(path), sensitivity);

    let mut expected = BTreeMap::new();
    collect(&self.entries, "", &mut expected);

    let expected_keyed: BTreeMap<String, (&String, &Option<Vec<u8>>)> = expected
      .iter()
      .map(|(path, content)| (key(path), (path, content)))
      .collect();
    let actual_keyed: BTreeMap<String, (&String, &Vec<u8>)> = actual
      .iter()
      .map(|(path, content)| (key(path), (path, content)))
      .collect();

    let missing: Vec<&str> = expected_keyed
      .iter()
      .filter(|(k, _)| !actual_keyed.contains_key(*k))
      .map(|(_, (path, _))| path.as_str())
      .collect();

    let unexpected: Vec<&str> = actual_keyed
      .iter()
      .filter(|(k, _)| !expected_keyed.contains_key(*k))
      .map(|(_, (path, _))| path.as_str())
      .collect();

    let mismatched: Vec<&str> = expected_keyed
      .iter()
      .filter_map(|(k, (path, content))| {
        let expected_content = content.as_ref()?;
        let (_, actual_content) = actual_keyed.get(k)?;
        (expected_content != *actual_content).then_some(path.as_str())
      })
      .collect();

    if missing.is_empty() && unexpected.is_empty() && mismatched.is_empty() {
      return;
    }

    panic!(
      "file tree mismatch for {described}:\n  missing: {missing:?}\n  unexpected: {unexpected:?}\n  content mismatch: {mismatched:?}"
    );
  }
}

fn collect(entries: &[TreeEntry], prefix: &str, out: &mut BTreeMap<String, Option<Vec<u8>>>) {
  for entry in entries {
    match entry {
      TreeEntry::File { name, content } => {
        out.insert(join(prefix, name), content.clone());
      }
      TreeEntry::Dir { name, children } => {
        collect(children, &join(prefix, name), out);
      }
    }
  }
}

fn join(prefix: &str, name: &str) -> String {
  if prefix.is_empty() {
    name.to_string()
  } else {
    format!("{prefix}/{name}")
  }
}
