//! Build trigger integration tests, over both compile paths.

use testrig_lib::assert::{FileTreeSpec, dir, file, file_with};
use testrig_lib::build::BuildError;
use testrig_lib::error::HarnessError;

use super::common::TestEnv;

#[test]
fn compile_modules_produces_output() {
  let env = TestEnv::demo("compile_modules_ok");

  env.fixture.compile_modules(["app", "util"]).unwrap();

  let ws = env.fixture.workspace();
  assert!(ws.exists("out/production/app/Main.txt"));
  assert!(ws.exists("out/production/app/pkg/Helper.txt"));
  assert!(ws.exists("out/production/util/Util.txt"));
}

#[test]
fn compile_fails_on_missing_source_root() {
  let env = TestEnv::demo("compile_missing_root");

  let err = env.fixture.compile_modules(["broken"]).unwrap_err();
  match err {
    HarnessError::Build(BuildError::Failed { message }) => {
      assert!(message.contains("broken"), "unexpected reason: {message}");
    }
    other => panic!("unexpected error: {other}"),
  }
}

#[test]
fn warnings_do_not_fail_the_build() {
  let env = TestEnv::demo("compile_warnings_ok");

  // The empty module emits a warning and statistics, no errors.
  env.fixture.compile_modules(["empty"]).unwrap();
}

#[test]
fn one_error_among_many_targets_fails_the_call() {
  let env = TestEnv::demo("one_error_fails_all");

  let err = env.fixture.compile_modules(["app", "empty", "broken"]).unwrap_err();
  assert!(matches!(err, HarnessError::Build(BuildError::Failed { .. })));
}

#[test]
fn unknown_module_name_is_a_lookup_error() {
  let env = TestEnv::demo("unknown_module");

  let err = env.fixture.compile_modules(["nope"]).unwrap_err();
  assert!(matches!(err, HarnessError::Build(BuildError::Project(_))));
}

#[test]
fn task_runner_path_builds_modules() {
  let env = TestEnv::with_task_runner("task_runner_ok", true);

  env.fixture.compile_modules(["app"]).unwrap();
  assert!(env.fixture.workspace().exists("out/production/app/Main.txt"));
}

#[test]
fn task_runner_path_applies_the_same_failure_policy() {
  let env = TestEnv::with_task_runner("task_runner_fails", true);

  let err = env.fixture.compile_modules(["broken"]).unwrap_err();
  assert!(matches!(err, HarnessError::Build(BuildError::Failed { .. })));
}

#[test]
fn artifact_jar_layout() {
  let env = TestEnv::demo("artifact_jar_layout");

  env.fixture.compile_modules(["app"]).unwrap();
  env.fixture.build_artifacts(["app-jar"]).unwrap();

  let expected = FileTreeSpec::new(vec![
    dir(
      "classes",
      vec![
        file_with("Main.txt", "main"),
        dir("pkg", vec![file_with("Helper.txt", "helper")]),
      ],
    ),
    dir("docs", vec![file_with("notes.txt", "notes")]),
  ]);
  env.fixture.assert_artifact_output("app-jar", &expected).unwrap();
}

#[test]
fn exploded_artifact_layout() {
  let env = TestEnv::demo("artifact_exploded_layout");

  env.fixture.compile_modules(["app", "util"]).unwrap();
  env.fixture.build_artifacts(["bundle"]).unwrap();

  let expected = FileTreeSpec::new(vec![
    dir(
      "app",
      vec![file("Main.txt"), dir("pkg", vec![file("Helper.txt")])],
    ),
    dir("util", vec![file_with("Util.txt", "util")]),
  ]);
  env.fixture.assert_artifact_output("bundle", &expected).unwrap();
}

#[test]
fn artifact_output_path_resolves_under_the_project_root() {
  let env = TestEnv::demo("artifact_output_path");

  let root = env.fixture.workspace().root();
  env
    .fixture
    .assert_artifact_output_path("app-jar", root.join("out/artifacts/app-jar.jar"))
    .unwrap();
  env
    .fixture
    .assert_artifact_output_path("bundle", root.join("out/artifacts/bundle"))
    .unwrap();
}

#[test]
fn artifact_fails_before_its_modules_are_built() {
  let env = TestEnv::demo("artifact_needs_modules");

  let err = env.fixture.build_artifacts(["app-jar"]).unwrap_err();
  match err {
    HarnessError::Build(BuildError::Failed { message }) => {
      assert!(message.contains("app"), "unexpected reason: {message}");
    }
    other => panic!("unexpected error: {other}"),
  }

  // A failed artifact build produces no output.
  assert!(!env.fixture.workspace().exists("out/artifacts/app-jar.jar"));
}

#[test]
#[should_panic(expected = "file tree mismatch")]
fn layout_assertion_reports_a_diff() {
  let env = TestEnv::demo("artifact_layout_diff");

  env.fixture.compile_modules(["app"]).unwrap();
  env.fixture.build_artifacts(["app-jar"]).unwrap();

  let wrong = FileTreeSpec::new(vec![dir("classes", vec![file("Absent.txt")])]);
  env.fixture.assert_artifact_output("app-jar", &wrong).unwrap();
}
