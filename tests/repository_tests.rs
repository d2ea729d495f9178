use std::fs;

use cronaca::repository::{normalize_repository_url, resolve_repository_url};
use tempfile::TempDir;

#[test]
fn normalizes_repository_spellings() {
  let expected = "https://github.com/ckeditor/ckeditor5";

  for raw in [
    "https://github.com/ckeditor/ckeditor5",
    "https://github.com/ckeditor/ckeditor5/",
    "https://github.com/ckeditor/ckeditor5.git",
    "git+https://github.com/ckeditor/ckeditor5.git",
    "git@github.com:ckeditor/ckeditor5.git",
    "git://github.com/ckeditor/ckeditor5.git",
    "github:ckeditor/ckeditor5",
    "ckeditor/ckeditor5",
    "https://github.com/ckeditor/ckeditor5/issues",
  ] {
    assert_eq!(normalize_repository_url(raw), expected, "{raw}");
  }
}

#[test]
fn keeps_other_hosts() {
  assert_eq!(
    normalize_repository_url("git@gitlab.com:group/project.git"),
    "https://gitlab.com/group/project"
  );
}

#[test]
fn resolves_from_package_json_string() {
  let temp = TempDir::new().expect("temp dir");
  fs::write(
    temp.path().join("package.json"),
    r#"{ "name": "x", "repository": "ckeditor/ckeditor5-dev" }"#,
  )
  .expect("write package.json");

  assert_eq!(
    resolve_repository_url(temp.path()).expect("url"),
    "https://github.com/ckeditor/ckeditor5-dev"
  );
}

#[test]
fn resolves_from_package_json_object() {
  let temp = TempDir::new().expect("temp dir");
  fs::write(
    temp.path().join("package.json"),
    r#"{ "repository": { "type": "git", "url": "git+https://github.com/ckeditor/ckeditor5.git" } }"#,
  )
  .expect("write package.json");

  assert_eq!(
    resolve_repository_url(temp.path()).expect("url"),
    "https://github.com/ckeditor/ckeditor5"
  );
}

#[test]
fn falls_back_to_cargo_manifest() {
  let temp = TempDir::new().expect("temp dir");
  fs::write(temp.path().join("package.json"), r#"{ "name": "no-repository" }"#).expect("write package.json");
  fs::write(
    temp.path().join("Cargo.toml"),
    "[workspace.package]\nrepository = \"https://github.com/octo/repo\"\n",
  )
  .expect("write Cargo.toml");

  assert_eq!(resolve_repository_url(temp.path()).expect("url"), "https://github.com/octo/repo");
}

#[test]
fn fails_without_repository_field() {
  let temp = TempDir::new().expect("temp dir");

  let error = resolve_repository_url(temp.path()).expect_err("should fail");
  assert!(error.to_string().contains("No repository field found"));
}

#[test]
fn fails_on_invalid_package_json() {
  let temp = TempDir::new().expect("temp dir");
  fs::write(temp.path().join("package.json"), "{").expect("write package.json");

  let error = resolve_repository_url(temp.path()).expect_err("should fail");
  assert!(error.to_string().contains("Invalid JSON"));
}
