//! Platform detection and path abstractions for testrig
//!
//! This crate provides cross-platform primitives the harness builds on:
//! - OS detection
//! - File-system case-sensitivity (compile-time default and runtime probe)
//! - Path normalization and comparison keys

mod error;
mod paths;
mod platform;

pub use error::PlatformError;
pub use paths::{normalize_path, path_key, paths_equal, to_portable};
pub use platform::{CaseSensitivity, Os, default_case_sensitivity, probe_case_sensitivity};
