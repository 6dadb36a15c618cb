//! Path normalization and comparison keys

use crate::platform::CaseSensitivity;
use std::path::{Path, PathBuf};

/// Render a path in system-independent form, with `/` separators
///
/// # Examples
///
/// ```
/// use rig_platform::to_portable;
/// use std::path::Path;
///
/// assert_eq!(to_portable(Path::new("a/b/c.txt")), "a/b/c.txt");
/// ```
pub fn to_portable(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Normalize a path by resolving `.` and `..` components without requiring the path to exist
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            std::path::Component::ParentDir => {
                // Pop the last component if possible
                if !components.is_empty() {
                    components.pop();
                }
            }
            std::path::Component::CurDir => {
                // Skip . components
            }
            other => {
                components.push(other);
            }
        }
    }

    components.iter().collect()
}

/// Canonical comparison key for a path
///
/// Separators become `/` everywhere; under [`CaseSensitivity::Insensitive`]
/// the key is lowercased so that `Foo.TXT` and `foo.txt` compare equal.
pub fn path_key(path: &Path, sensitivity: CaseSensitivity) -> String {
    let portable = to_portable(&normalize_path(path));
    if sensitivity.is_insensitive() {
        portable.to_lowercase()
    } else {
        portable
    }
}

/// Compare two paths under the given case-sensitivity
pub fn paths_equal(a: &Path, b: &Path, sensitivity: CaseSensitivity) -> bool {
    path_key(a, sensitivity) == path_key(b, sensitivity)
}
