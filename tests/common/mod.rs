#![allow(dead_code)]

use std::{fs, path::Path, process::Command};

use anyhow::Result;
use cronaca::{
  commit::{RawCommit, RawNote},
  patterns::parse_header,
  pipeline::{Pipeline, TransformOptions},
  types::TypeTable,
};
use tempfile::TempDir;

pub const REPOSITORY_URL: &str = "https://github.com/ckeditor/ckeditor5-dev";
pub const HASH: &str = "76b9e058fb1c3fa00b50059cdc684997d0eb2eca";

pub fn touched_files(_hash: &str) -> Result<Vec<String>> {
  Ok(vec!["packages/ckeditor5-dev-release-tools/lib/index.js".to_string()])
}

pub fn no_files(_hash: &str) -> Result<Vec<String>> { Ok(Vec::new()) }

pub fn pipeline() -> Pipeline { pipeline_with(TransformOptions::default()) }

pub fn pipeline_with(options: TransformOptions) -> Pipeline {
  Pipeline::new(options, TypeTable::default(), touched_files, REPOSITORY_URL).expect("pipeline")
}

/// A raw commit as the message parser would produce it for a one-line message.
pub fn commit(header: &str) -> RawCommit {
  let parsed = parse_header(header);

  RawCommit {
    hash: Some(HASH.to_string()),
    header: header.to_string(),
    kind: parsed.as_ref().map(|parsed| parsed.kind.clone()),
    subject: parsed.map(|parsed| parsed.subject),
    ..RawCommit::default()
  }
}

pub fn note(title: &str, text: &str) -> RawNote {
  RawNote {
    title: title.to_string(),
    text: text.to_string(),
  }
}

pub fn git(dir: &Path, args: &[&str]) -> String {
  let output = Command::new("git")
    .current_dir(dir)
    .args(args)
    .output()
    .expect("failed to run git");

  assert!(
    output.status.success(),
    "git {:?} failed: {}",
    args,
    String::from_utf8_lossy(&output.stderr)
  );

  String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn init_repo() -> TempDir {
  let temp = TempDir::new().expect("temp dir");
  git(temp.path(), &["init", "-q"]);
  git(temp.path(), &["config", "user.email", "tests@example.com"]);
  git(temp.path(), &["config", "user.name", "Tests"]);
  temp
}

pub fn create_repo() -> TempDir {
  let temp = init_repo();

  fs::write(
    temp.path().join("package.json"),
    "{\n  \"name\": \"fixture\",\n  \"version\": \"0.1.0\",\n  \"repository\": \"https://github.com/octo/repo.git\"\n}\n",
  )
  .expect("write package.json");

  fs::create_dir_all(temp.path().join("src")).expect("create src dir");
  fs::write(temp.path().join("src/index.js"), "export const a = 1;\n").expect("write src/index.js");

  commit_with_date(temp.path(), "Internal: Init.", "2026-01-01T00:00:00Z");
  git(temp.path(), &["tag", "v0.1.0"]);

  temp
}

pub fn commit_with_date(dir: &Path, message: &str, date: &str) {
  git(dir, &["add", "."]);

  let output = Command::new("git")
    .current_dir(dir)
    .env("GIT_AUTHOR_DATE", date)
    .env("GIT_COMMITTER_DATE", date)
    .args(["commit", "-m", message])
    .output()
    .expect("failed to run git commit");

  assert!(
    output.status.success(),
    "git commit failed: {}",
    String::from_utf8_lossy(&output.stderr)
  );
}

pub fn head(dir: &Path) -> String { git(dir, &["rev-parse", "HEAD"]).trim().to_string() }
