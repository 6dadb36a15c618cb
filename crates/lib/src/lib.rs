//! testrig-lib: Build-fixture harness for integration tests
//!
//! This crate provides the pieces a build-oriented integration test needs:
//! - `Fixture`: isolated per-test workspace with guaranteed teardown
//! - `Workspace`: file, directory, and archive helpers under the project root
//! - `BuildService`: the seam to a build backend, plus `LocalBuildEngine`,
//!   a self-contained reference implementation
//! - `assert`: ordered/unordered/path-set assertions and file-tree layout
//!   matching for build outputs

pub mod assert;
pub mod build;
pub mod consts;
pub mod error;
pub mod fixture;
pub mod logging;
pub mod project;
pub mod workspace;
