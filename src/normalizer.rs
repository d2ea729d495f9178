use anyhow::{Context, Result};
use tracing::debug;

use crate::{
  commit::{Entry, Note, RawCommit, RawNote, non_empty},
  git::ChangedFiles,
  linker::{link_all, merge_closes},
  patterns::{Header, MERGE_MARKER, NoteScope, ScopedType, is_internal_merge, parse_header, parse_note_scope, strip_ci_skip},
  types::{NoteTitles, TypeTable},
};

pub const SHORT_HASH_LENGTH: usize = 7;

/// Repairs, classifies and cleans a single raw commit.
///
/// The work is split in two halves so the multi-entry splitter can run on the
/// raw body: [`Normalizer::prepare`] handles everything up to subject cleanup
/// and note canonicalization, [`Normalizer::finish`] does the linking and body
/// indentation.
pub struct Normalizer<'a> {
  types: &'a TypeTable,
  titles: NoteTitles,
  files: &'a dyn ChangedFiles,
  repository_url: &'a str,
}

impl<'a> Normalizer<'a> {
  pub fn new(types: &'a TypeTable, titles: NoteTitles, files: &'a dyn ChangedFiles, repository_url: &'a str) -> Self {
    Self {
      types,
      titles,
      files,
      repository_url,
    }
  }

  /// Returns `Ok(None)` for internal merges and commits without changed files.
  pub fn normalize(&self, raw: &RawCommit) -> Result<Option<Entry>> {
    Ok(self.prepare(raw)?.map(|entry| self.finish(entry)))
  }

  pub fn prepare(&self, raw: &RawCommit) -> Result<Option<Entry>> {
    let internal_merge = raw
      .merge
      .as_deref()
      .into_iter()
      .chain([raw.header.as_str()])
      .find(|message| is_internal_merge(message));

    if let Some(merge) = internal_merge {
      debug!(merge, "Skipping internal merge commit");
      return Ok(None);
    }

    let mut body = non_empty(raw.body.as_deref());
    let mut footer = strip_note_lines(non_empty(raw.footer.as_deref()), &raw.notes);

    // Web merge UIs store the description in the footer.
    if body.is_none() {
      body = footer.take();
    }

    let mut header = raw.header.clone();
    let mut kind = raw.kind.clone();
    let mut subject = raw.subject.clone();

    let title = if raw.header.starts_with(MERGE_MARKER) {
      body.as_deref().and_then(extract_title)
    } else {
      None
    };

    if let Some((line, parsed, rest)) = title {
      header = line;
      kind = Some(parsed.kind);
      subject = Some(parsed.subject);
      body = rest;
    }

    let Some(full_hash) = raw.hash.as_deref() else {
      debug!(header = %header, "Skipping commit without hash");
      return Ok(None);
    };

    let (raw_type, scope) = match kind.as_deref().map(ScopedType::from_prefix) {
      Some(ScopedType { raw_type, scope }) => (Some(raw_type), scope),
      None => (None, None),
    };

    let is_public_commit = raw_type.as_deref().is_some_and(|label| self.types.is_public(label));

    let files = self
      .files
      .changed_files(full_hash)
      .with_context(|| format!("Cannot read files changed by commit {full_hash}"))?;

    if files.is_empty() {
      debug!(hash = full_hash, "Skipping commit without changed files");
      return Ok(None);
    }

    let mut subject = subject.unwrap_or_else(|| header.clone());

    if is_public_commit {
      subject = clean_subject(&subject);
    }

    let notes = raw.notes.iter().map(|note| self.note(note)).collect();

    Ok(Some(Entry {
      hash: short_hash(full_hash),
      kind: raw_type.as_deref().and_then(|label| self.types.display_type(label)),
      raw_type,
      header,
      subject,
      body,
      footer,
      notes,
      scope,
      files: files.into(),
      repository_url: self.repository_url.to_string(),
      is_public_commit,
      mentions: raw.mentions.clone(),
      revert: raw.revert.clone(),
      merge: raw.merge.clone(),
    }))
  }

  pub fn finish(&self, entry: Entry) -> Entry {
    if !entry.is_public_commit {
      return entry;
    }

    let repository_url = self.repository_url;

    Entry {
      subject: link_all(&entry.subject, repository_url),
      body: entry.body.map(|body| indent(&link_all(&body, repository_url))),
      notes: entry
        .notes
        .into_iter()
        .map(|note| {
          Note {
            text: link_all(&note.text, repository_url),
            ..note
          }
        })
        .collect(),
      ..entry
    }
  }

  fn note(&self, note: &RawNote) -> Note {
    let title = self.titles.canonicalize(&note.title);

    match parse_note_scope(&note.text) {
      Some(NoteScope { scope, text }) => {
        Note {
          title,
          text,
          scope: Some(scope),
        }
      }
      None => {
        Note {
          title,
          text: note.text.trim().to_string(),
          scope: None,
        }
      }
    }
  }
}

/// Drops the CI marker, ensures a final period and merges `Closes` clauses.
pub fn clean_subject(subject: &str) -> String {
  let subject = strip_ci_skip(subject).trim();

  if subject.is_empty() {
    return String::new();
  }

  if subject.ends_with('.') {
    merge_closes(subject)
  } else {
    merge_closes(&format!("{subject}."))
  }
}

pub fn short_hash(hash: &str) -> String { hash.get(..SHORT_HASH_LENGTH).unwrap_or(hash).to_string() }

/// Indents every non-blank line by two spaces so the body nests under its list item.
pub fn indent(body: &str) -> String {
  body
    .lines()
    .map(|line| {
      if line.trim().is_empty() {
        String::new()
      } else {
        format!("  {line}")
      }
    })
    .collect::<Vec<_>>()
    .join("\n")
}

/// Splits a squash-merge body into its structured first line and the rest.
fn extract_title(body: &str) -> Option<(String, Header, Option<String>)> {
  let (first, rest) = body.split_once('\n').unwrap_or((body, ""));
  let parsed = parse_header(first)?;

  Some((first.trim().to_string(), parsed, non_empty(Some(rest))))
}

/// Removes footer paragraphs and lines that repeat a note already captured.
fn strip_note_lines(footer: Option<String>, notes: &[RawNote]) -> Option<String> {
  let footer = footer?;

  let is_duplicate = |text: &str| {
    let text = text.trim();
    notes
      .iter()
      .any(|note| text.starts_with(note.title.as_str()) && text.ends_with(note.text.trim()))
  };

  let paragraphs = footer
    .split("\n\n")
    .filter(|paragraph| !is_duplicate(*paragraph))
    .map(|paragraph| {
      paragraph
        .lines()
        .filter(|line| !is_duplicate(*line))
        .collect::<Vec<_>>()
        .join("\n")
    })
    .filter(|paragraph| !paragraph.trim().is_empty())
    .collect::<Vec<_>>();

  non_empty(Some(paragraphs.join("\n\n").as_str()))
}
