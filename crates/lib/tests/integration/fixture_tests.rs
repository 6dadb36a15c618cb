//! Fixture lifecycle integration tests.

use std::fs;
use std::sync::Arc;

use serial_test::serial;
use tempfile::TempDir;

use testrig_lib::build::LocalBuildEngine;
use testrig_lib::consts::SCRATCH_DIR_ENV;
use testrig_lib::error::HarnessError;
use testrig_lib::fixture::{Fixture, FixtureConfig, SetupError};
use testrig_lib::workspace::Stamp;

use super::common::{DEMO_PROJECT_JSON, TestEnv};

fn engine() -> Arc<LocalBuildEngine> {
  Arc::new(LocalBuildEngine::new().unwrap())
}

#[test]
fn set_up_creates_project_root_inside_scratch() {
  let env = TestEnv::demo("set_up_creates_project_root");

  let scratch = dunce::canonicalize(env.scratch.path()).unwrap();
  let test_dir = dunce::canonicalize(env.fixture.test_dir()).unwrap();

  assert!(test_dir.starts_with(&scratch));
  assert!(env.fixture.workspace().root().is_dir());
  assert!(env.fixture.workspace().exists("project.json"));
}

#[test]
fn set_up_starts_from_an_empty_test_dir() {
  let scratch = TempDir::new().unwrap();

  // Leftovers from a previous run must not survive setup.
  let stale = scratch.path().join("reused-name/leftover.txt");
  fs::create_dir_all(stale.parent().unwrap()).unwrap();
  fs::write(&stale, "stale").unwrap();

  let config = FixtureConfig::new("reused-name").scratch_root(scratch.path());
  let fixture = Fixture::set_up(config, engine(), |_| Ok(())).unwrap();

  assert!(!stale.exists());
  drop(fixture);
}

#[test]
fn tear_down_removes_the_test_dir_and_runs_once() {
  let mut env = TestEnv::demo("tear_down_runs_once");
  let test_dir = env.fixture.test_dir().to_path_buf();
  assert!(test_dir.exists());

  let report = env.fixture.tear_down();
  assert!(report.is_clean());
  assert!(!test_dir.exists());

  // Second call is a no-op, not a second pass over missing paths.
  let report = env.fixture.tear_down();
  assert!(report.is_clean());
}

#[test]
fn drop_tears_down_when_the_test_body_never_did() {
  let scratch = TempDir::new().unwrap();
  let test_dir = scratch.path().join("dropped");

  {
    let config = FixtureConfig::new("dropped").scratch_root(scratch.path());
    let _fixture = Fixture::set_up(config, engine(), |_| Ok(())).unwrap();
    assert!(test_dir.exists());
  }

  assert!(!test_dir.exists());
}

#[test]
fn failed_configure_step_tears_down_and_propagates() {
  let scratch = TempDir::new().unwrap();
  let test_dir = scratch.path().join("failing-setup");

  let config = FixtureConfig::new("failing-setup").scratch_root(scratch.path());
  let result = Fixture::set_up(config, engine(), |f| {
    f.workspace().write_file("half-done.txt", "x", Stamp::Preserve)?;
    Err(HarnessError::NoProject)
  });

  let err = result.unwrap_err();
  assert!(matches!(err, SetupError::Configure { .. }));
  // The original failure is preserved as the cause.
  assert!(err.to_string().contains("configuration step failed"));

  // Best-effort teardown already ran.
  assert!(!test_dir.exists());
}

// `teardown_failure_does_not_stop_remaining_steps` lives in its own test
// binary (`tests/traced.rs`): `#[traced_test]` installs a process-global
// tracing subscriber that conflicts with the fmt subscriber this binary sets
// up via `logging::init()`.

#[test]
fn config_files_are_registered_during_setup() {
  let mut env = TestEnv::demo("config_registry");

  env.fixture.create_config_file("conf/watcher.json", "{}").unwrap();

  let registered = env.fixture.config_files();
  assert_eq!(registered.len(), 2);
  assert!(registered[0].ends_with("project.json"));
  assert!(registered[1].ends_with("conf/watcher.json"));

  // Re-registering the same file does not duplicate it.
  env.fixture.create_config_file("conf/watcher.json", "{ }").unwrap();
  assert_eq!(env.fixture.config_files().len(), 2);
}

#[test]
fn allowed_roots_are_retained() {
  let scratch = TempDir::new().unwrap();
  let extra_root = scratch.path().join("extra");

  let config = FixtureConfig::new("allowed-roots").scratch_root(scratch.path());
  let fixture = Fixture::set_up(config, engine(), |f| {
    f.allow_root(f.test_dir().join("project"));
    Ok(())
  })
  .unwrap();

  assert_eq!(fixture.allowed_roots().len(), 1);
  assert!(!fixture.allowed_roots().contains(&extra_root));
}

#[test]
fn operations_before_project_init_report_no_project() {
  let scratch = TempDir::new().unwrap();
  let config = FixtureConfig::new("no-project").scratch_root(scratch.path());
  let fixture = Fixture::set_up(config, engine(), |_| Ok(())).unwrap();

  let err = fixture.compile_modules(["app"]).unwrap_err();
  assert!(matches!(err, HarnessError::NoProject));
}

#[test]
#[serial]
fn scratch_root_env_var_is_honored() {
  let scratch = TempDir::new().unwrap();

  temp_env::with_var(SCRATCH_DIR_ENV, Some(scratch.path().as_os_str()), || {
    let config = FixtureConfig::new("env-scratch");
    let mut fixture = Fixture::set_up(config, engine(), |_| Ok(())).unwrap();

    assert!(fixture.test_dir().starts_with(scratch.path()));
    assert!(fixture.tear_down().is_clean());
  });
}

#[test]
fn project_config_write_advances_timestamps() {
  let mut env = TestEnv::demo("stamped_config");

  let path = env.fixture.create_project_config(DEMO_PROJECT_JSON).unwrap();
  let first = fs::metadata(&path).unwrap().modified().unwrap();

  let path = env.fixture.create_project_config(DEMO_PROJECT_JSON).unwrap();
  let second = fs::metadata(&path).unwrap().modified().unwrap();

  // Rewrites keep moving the stamp forward so file watchers notice.
  assert!(second > first);
}
