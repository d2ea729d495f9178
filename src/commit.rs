use std::sync::Arc;

use serde::Serialize;

use crate::types::DisplayType;

/// Sorted, deduplicated package scopes. Absence is `None`, never an empty list.
pub type Scope = Option<Vec<String>>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawNote {
  pub title: String,
  pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reference {
  pub action: Option<String>,
  pub owner: Option<String>,
  pub repository: Option<String>,
  pub issue: String,
  pub raw: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Revert {
  pub header: String,
  pub hash: Option<String>,
}

/// A commit as produced by the message parser. `kind` is everything before the
/// header colon, scope decoration included (e.g. `Fix (engine)`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCommit {
  pub hash: Option<String>,
  pub header: String,
  pub kind: Option<String>,
  pub subject: Option<String>,
  pub body: Option<String>,
  pub footer: Option<String>,
  pub notes: Vec<RawNote>,
  pub merge: Option<String>,
  pub references: Vec<Reference>,
  pub mentions: Vec<String>,
  pub revert: Option<Revert>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
  pub title: String,
  pub text: String,
  pub scope: Scope,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
  pub hash: String,
  pub raw_type: Option<String>,
  #[serde(rename = "type")]
  pub kind: Option<DisplayType>,
  pub header: String,
  pub subject: String,
  pub body: Option<String>,
  pub footer: Option<String>,
  pub notes: Vec<Note>,
  pub scope: Scope,
  pub files: Arc<[String]>,
  pub repository_url: String,
  pub is_public_commit: bool,
  pub mentions: Vec<String>,
  pub revert: Option<Revert>,
  pub merge: Option<String>,
}

/// Fields replaced when cloning an entry for another scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneOverrides {
  pub scope: Scope,
  pub keep_notes: bool,
}

impl Entry {
  /// Deep copy of the entry. Only `files` is shared with the source.
  pub fn clone_with(&self, overrides: CloneOverrides) -> Self {
    Self {
      hash: self.hash.clone(),
      raw_type: self.raw_type.clone(),
      kind: self.kind,
      header: self.header.clone(),
      subject: self.subject.clone(),
      body: self.body.clone(),
      footer: self.footer.clone(),
      notes: if overrides.keep_notes {
        self.notes.clone()
      } else {
        Vec::new()
      },
      scope: overrides.scope,
      files: Arc::clone(&self.files),
      repository_url: self.repository_url.clone(),
      is_public_commit: self.is_public_commit,
      mentions: self.mentions.clone(),
      revert: self.revert.clone(),
      merge: self.merge.clone(),
    }
  }
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<String> {
  value.map(str::trim).filter(|text| !text.is_empty()).map(ToOwned::to_owned)
}
