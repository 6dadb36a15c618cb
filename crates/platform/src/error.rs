//! Error types for rig-platform

use thiserror::Error;

/// Errors that can occur in platform operations
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("case-sensitivity probe failed for '{path}': {source}")]
    ProbeFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
