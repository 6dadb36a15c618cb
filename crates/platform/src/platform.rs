//! OS detection and file-system case-sensitivity

use crate::error::PlatformError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Operating system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Linux,
    Darwin,
    Windows,
}

impl Os {
    /// Detect the current operating system at compile time
    #[cfg(target_os = "linux")]
    pub const fn current() -> Self {
        Os::Linux
    }

    #[cfg(target_os = "macos")]
    pub const fn current() -> Self {
        Os::Darwin
    }

    #[cfg(target_os = "windows")]
    pub const fn current() -> Self {
        Os::Windows
    }

    /// Returns the OS name as used in platform strings
    pub const fn as_str(&self) -> &'static str {
        match self {
            Os::Linux => "linux",
            Os::Darwin => "darwin",
            Os::Windows => "windows",
        }
    }

    /// Check if running on Linux
    pub const fn is_linux(&self) -> bool {
        matches!(self, Os::Linux)
    }

    /// Check if running on macOS
    pub const fn is_darwin(&self) -> bool {
        matches!(self, Os::Darwin)
    }

    /// Check if running on Windows
    pub const fn is_windows(&self) -> bool {
        matches!(self, Os::Windows)
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a file system distinguishes paths by letter case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseSensitivity {
    Sensitive,
    Insensitive,
}

impl CaseSensitivity {
    pub const fn is_insensitive(&self) -> bool {
        matches!(self, CaseSensitivity::Insensitive)
    }
}

/// The conventional case-sensitivity for the current OS
///
/// Windows and macOS file systems are case-insensitive by default; everything
/// else is treated as case-sensitive. Use [`probe_case_sensitivity`] when the
/// actual mount matters (e.g. a case-sensitive APFS volume).
pub const fn default_case_sensitivity() -> CaseSensitivity {
    match Os::current() {
        Os::Linux => CaseSensitivity::Sensitive,
        Os::Darwin | Os::Windows => CaseSensitivity::Insensitive,
    }
}

/// Probe the case-sensitivity of the file system holding `dir`
///
/// Creates a mixed-case marker file in `dir` and checks whether its
/// lowercased name resolves to the same file. The marker is removed before
/// returning.
pub fn probe_case_sensitivity(dir: &Path) -> Result<CaseSensitivity, PlatformError> {
    let marker = dir.join(".CaseProbe-Marker");
    fs::write(&marker, b"probe").map_err(|source| PlatformError::ProbeFailed {
        path: marker.display().to_string(),
        source,
    })?;

    let lowered = dir.join(".caseprobe-marker");
    let sensitivity = if lowered.exists() {
        CaseSensitivity::Insensitive
    } else {
        CaseSensitivity::Sensitive
    };

    let _ = fs::remove_file(&marker);

    debug!(dir = %dir.display(), ?sensitivity, "probed case sensitivity");
    Ok(sensitivity)
}
