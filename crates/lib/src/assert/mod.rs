//! Assertion helpers for collections, path sets, and output layouts.
//!
//! All helpers panic with a diff-style message on mismatch, so a failing
//! assertion fails the surrounding test with both sides visible.

mod layout;

use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;
use std::path::Path;

use rig_platform::{CaseSensitivity, default_case_sensitivity, path_key};

pub use layout::{FileTreeSpec, TreeEntry, dir, file, file_with};

/// Assert two sequences are equal element-by-element.
///
/// Fails when the lengths differ or any positional element differs; the
/// message names both sequences.
pub fn assert_ordered_eq<T: PartialEq + Debug>(actual: &[T], expected: &[T]) {
  if expected.len() != actual.len() {
    panic!("element count differs\nexpected: {expected:?}\nactual: {actual:?}");
  }
  for (index, (expected_element, actual_element)) in expected.iter().zip(actual).enumerate() {
    if expected_element != actual_element {
      panic!("element {index} differs\nexpected: {expected:?}\nactual: {actual:?}");
    }
  }
}

/// Assert two collections hold the same elements, ignoring order.
pub fn assert_unordered_eq<T: Eq + Hash + Debug>(actual: &[T], expected: &[T]) {
  let actual_set: HashSet<&T> = actual.iter().collect();
  let expected_set: HashSet<&T> = expected.iter().collect();
  if actual_set != expected_set {
    panic!(
      "\nexpected: {}\nactual: {}",
      sorted_debug(expected),
      sorted_debug(actual)
    );
  }
}

/// Assert two path collections are equal as sets under platform path
/// normalization: `/` separators everywhere, case-insensitive exactly where
/// the file system is.
pub fn assert_unordered_paths_eq<P: AsRef<Path>>(actual: &[P], expected: &[P]) {
  assert_unordered_paths_eq_with(actual, expected, default_case_sensitivity());
}

/// Path-set equality under an explicit case-sensitivity.
pub fn assert_unordered_paths_eq_with<P: AsRef<Path>>(
  actual: &[P],
  expected: &[P],
  sensitivity: CaseSensitivity,
) {
  let keys = |paths: &[P]| -> HashSet<String> {
    paths
      .iter()
      .map(|p| path_key(p.as_ref(), sensitivity))
      .collect()
  };

  let actual_keys = keys(actual);
  let expected_keys = keys(expected);
  if actual_keys != expected_keys {
    panic!(
      "\nexpected: {}\nactual: {}",
      sorted_strings(&expected_keys),
      sorted_strings(&actual_keys)
    );
  }
}

/// Assert `actual` contains every element of `expected`.
pub fn assert_contains<T: PartialEq + Debug>(actual: &[T], expected: &[T]) {
  let all_present = expected.iter().all(|e| actual.contains(e));
  assert!(
    all_present,
    "\nexpected to contain: {expected:?}\nactual: {actual:?}"
  );
}

/// Assert `actual` contains none of `unexpected`.
pub fn assert_not_contains<T: PartialEq + Debug>(actual: &[T], unexpected: &[T]) {
  let none_present = unexpected.iter().all(|u| !actual.contains(u));
  assert!(
    none_present,
    "\nexpected not to contain: {unexpected:?}\nactual: {actual:?}"
  );
}

fn sorted_debug<T: Debug>(items: &[T]) -> String {
  let mut rendered: Vec<String> = items.iter().map(|item| format!("{item:?}")).collect();
  rendered.sort();
  format!("[{}]", rendered.join(", "))
}

fn sorted_strings(items: &HashSet<String>) -> String {
  let mut rendered: Vec<&str> = items.iter().map(String::as_str).collect();
  rendered.sort_unstable();
  format!("[{}]", rendered.join(", "))
}
