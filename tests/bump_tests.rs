mod common;

use common::{commit, note, pipeline, pipeline_with};
use cronaca::{
  bump::{BumpLevel, infer_bump},
  commit::RawCommit,
  pipeline::TransformOptions,
};

#[test]
fn fixes_and_internal_changes_are_patches() {
  let entries = pipeline()
    .transform_all(&[commit("Fix: Foo."), commit("Docs: Bar."), commit("Feature Baz")])
    .expect("transform");

  assert_eq!(infer_bump(&entries), BumpLevel::Patch);
  assert_eq!(infer_bump(&[]), BumpLevel::Patch);
}

#[test]
fn features_are_minor() {
  let entries = pipeline()
    .transform_all(&[commit("Fix: Foo."), commit("Feature: Bar.")])
    .expect("transform");

  assert_eq!(infer_bump(&entries), BumpLevel::Minor);
  assert_eq!(BumpLevel::Minor.as_str(), "minor");
}

#[test]
fn breaking_changes_follow_their_group() {
  let raw = RawCommit {
    notes: vec![note("MINOR BREAKING CHANGE", "Renamed foo.")],
    ..commit("Fix: Foo.")
  };

  let explicit = pipeline_with(TransformOptions {
    use_explicit_breaking_change_groups: true,
    ..TransformOptions::default()
  });
  let entries = explicit.transform_all([&raw]).expect("transform");
  assert_eq!(infer_bump(&entries), BumpLevel::Minor);

  // Flattened groups no longer tell minor from major.
  let entries = pipeline().transform_all([&raw]).expect("transform");
  assert_eq!(infer_bump(&entries), BumpLevel::Major);
}

#[test]
fn major_breaking_changes_are_major() {
  let raw = RawCommit {
    notes: vec![note("BREAKING CHANGE", "Removed foo.")],
    ..commit("Internal: Foo.")
  };

  let entries = pipeline().transform_all([&raw]).expect("transform");
  assert_eq!(infer_bump(&entries), BumpLevel::Major);

  let demoted = pipeline_with(TransformOptions {
    treat_major_as_minor_breaking_change: true,
    use_explicit_breaking_change_groups: true,
  });
  let entries = demoted.transform_all([&raw]).expect("transform");
  assert_eq!(infer_bump(&entries), BumpLevel::Minor);
}
