//! Archive helper integration tests.

use testrig_lib::workspace::{ArchiveEntry, WorkspaceError, archive};

use super::common::TestEnv;

#[test]
fn jar_round_trips_entries() {
  let env = TestEnv::demo("jar_round_trip");

  let jar = env
    .fixture
    .workspace()
    .create_archive(
      "lib/dep.jar",
      &[
        ArchiveEntry::new("a.txt", "x"),
        ArchiveEntry::new("b/c.txt", "y"),
      ],
    )
    .unwrap();

  assert_eq!(archive::read_entry(&jar, "a.txt").unwrap(), b"x");
  assert_eq!(archive::read_entry(&jar, "b/c.txt").unwrap(), b"y");

  // Jar containers always start with their manifest.
  let names = archive::entry_names(&jar).unwrap();
  assert_eq!(names[0], "META-INF/MANIFEST.MF");
}

#[test]
fn archive_requires_jar_or_zip_extension() {
  let env = TestEnv::demo("archive_extension");

  let err = env
    .fixture
    .workspace()
    .create_archive("lib/dep.txt", &[ArchiveEntry::new("a.txt", "x")])
    .unwrap_err();

  assert!(matches!(err, WorkspaceError::UnsupportedArchiveExtension { .. }));
}

#[test]
fn empty_archive_is_legal() {
  let env = TestEnv::demo("empty_archive");

  let zip = env.fixture.workspace().create_archive("empty.zip", &[]).unwrap();
  assert!(archive::entry_names(&zip).unwrap().is_empty());
}
