//! Shared test helpers for harness integration tests.

use std::sync::Arc;

use tempfile::TempDir;

use testrig_lib::build::LocalBuildEngine;
use testrig_lib::fixture::{Fixture, FixtureConfig};
use testrig_lib::workspace::Stamp;

/// Project config used by most tests: two real modules, one empty module,
/// one module with a missing source root, and two artifacts over them.
pub const DEMO_PROJECT_JSON: &str = r#"{
  "name": "demo",
  "modules": [
    { "name": "app", "source_dir": "app/src" },
    { "name": "util", "source_dir": "util/src" },
    { "name": "empty", "source_dir": "empty/src" },
    { "name": "broken", "source_dir": "missing/src" }
  ],
  "artifacts": [
    {
      "name": "app-jar",
      "kind": "archive",
      "entries": [
        { "module": "app", "at": "classes" },
        { "file": "notes.txt", "at": "docs/notes.txt" }
      ]
    },
    {
      "name": "bundle",
      "kind": "exploded",
      "entries": [
        { "module": "app", "at": "app" },
        { "module": "util", "at": "util" }
      ]
    }
  ]
}"#;

/// Isolated test environment: scratch directory plus a configured fixture
/// over the demo project.
pub struct TestEnv {
  pub scratch: TempDir,
  pub fixture: Fixture,
}

impl TestEnv {
  /// Demo project on the legacy synchronous compile path.
  pub fn demo(name: &str) -> Self {
    Self::with_task_runner(name, false)
  }

  /// Demo project, optionally routed through the asynchronous task-runner
  /// path.
  pub fn with_task_runner(name: &str, use_task_runner: bool) -> Self {
    testrig_lib::logging::init();

    let scratch = TempDir::new().unwrap();
    let engine = Arc::new(LocalBuildEngine::new().unwrap());
    let config = FixtureConfig::new(name)
      .scratch_root(scratch.path())
      .use_task_runner(use_task_runner);

    let fixture = Fixture::set_up(config, engine, |f| {
      f.create_project_config(DEMO_PROJECT_JSON)?;
      f.load_project()?;

      f.workspace().write_file("app/src/Main.txt", "main", Stamp::Preserve)?;
      f.workspace()
        .write_file("app/src/pkg/Helper.txt", "helper", Stamp::Preserve)?;
      f.workspace().write_file("util/src/Util.txt", "util", Stamp::Preserve)?;
      f.workspace().write_file("notes.txt", "notes", Stamp::Preserve)?;
      f.workspace().create_dir("empty/src")?;
      Ok(())
    })
    .unwrap();

    Self { scratch, fixture }
  }
}
