use anyhow::Result;
use serde::Deserialize;

use crate::{
  commit::{Entry, RawCommit},
  git::ChangedFiles,
  normalizer::Normalizer,
  patterns::EntryMarkers,
  splitter::{split_by_scope, split_entries},
  types::{NoteTitles, TypeTable},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct TransformOptions {
  /// Report every major breaking change as a minor one.
  #[serde(default)]
  pub treat_major_as_minor_breaking_change: bool,
  /// Keep `MAJOR`/`MINOR` breaking-change groups instead of a single one.
  #[serde(default)]
  pub use_explicit_breaking_change_groups: bool,
}

impl From<TransformOptions> for NoteTitles {
  fn from(options: TransformOptions) -> Self {
    Self {
      treat_major_as_minor_breaking_change: options.treat_major_as_minor_breaking_change,
      use_explicit_breaking_change_groups: options.use_explicit_breaking_change_groups,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transformed {
  /// Internal merge, or a commit that touched no files.
  Discarded,
  Single(Entry),
  Multiple(Vec<Entry>),
}

impl Transformed {
  fn from_entries(mut entries: Vec<Entry>) -> Self {
    match entries.len() {
      0 => Self::Discarded,
      1 => entries.pop().map(Self::Single).unwrap_or(Self::Discarded),
      _ => Self::Multiple(entries),
    }
  }

  pub fn is_discarded(&self) -> bool { matches!(self, Self::Discarded) }

  pub fn into_entries(self) -> Vec<Entry> {
    match self {
      Self::Discarded => Vec::new(),
      Self::Single(entry) => vec![entry],
      Self::Multiple(entries) => entries,
    }
  }
}

/// Turns raw commits into finished changelog entries: normalize, split
/// multi-entry bodies, link, then split multi-scope entries.
pub struct Pipeline {
  types: TypeTable,
  titles: NoteTitles,
  markers: EntryMarkers,
  files: Box<dyn ChangedFiles>,
  repository_url: String,
}

impl Pipeline {
  pub fn new(
    options: TransformOptions,
    types: TypeTable,
    files: impl ChangedFiles + 'static,
    repository_url: impl Into<String>,
  ) -> Result<Self> {
    let markers = EntryMarkers::new(types.labels())?;

    Ok(Self {
      titles: options.into(),
      types,
      markers,
      files: Box::new(files),
      repository_url: repository_url.into(),
    })
  }

  pub fn types(&self) -> &TypeTable { &self.types }

  pub fn repository_url(&self) -> &str { &self.repository_url }

  pub fn normalizer(&self) -> Normalizer<'_> {
    Normalizer::new(&self.types, self.titles, self.files.as_ref(), &self.repository_url)
  }

  /// Errors only come from the changed-files lookup.
  pub fn transform(&self, raw: &RawCommit) -> Result<Transformed> {
    let normalizer = self.normalizer();

    let Some(entry) = normalizer.prepare(raw)? else {
      return Ok(Transformed::Discarded);
    };

    let entries = split_entries(entry, &self.types, &self.markers)
      .into_iter()
      .map(|entry| normalizer.finish(entry))
      .flat_map(split_by_scope)
      .collect::<Vec<_>>();

    Ok(Transformed::from_entries(entries))
  }

  pub fn transform_all<'a>(&self, commits: impl IntoIterator<Item = &'a RawCommit>) -> Result<Vec<Entry>> {
    let mut entries = Vec::new();

    for commit in commits {
      entries.extend(self.transform(commit)?.into_entries());
    }

    Ok(entries)
  }
}
