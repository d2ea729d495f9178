use std::sync::Arc;

use crate::{
  commit::{CloneOverrides, Entry, non_empty},
  normalizer::clean_subject,
  patterns::{EntryMarker, EntryMarkers, ScopedType, find_mentions},
  types::TypeTable,
};

/// Materializes the extra `<Label>: <subject>` changes packed into an entry
/// body.
///
/// Text before the first marker stays with the original entry, which comes
/// first unless it has no type of its own. An untyped original is dropped and
/// its notes move to the first synthetic entry. The body must not be linked
/// yet.
pub fn split_entries(entry: Entry, types: &TypeTable, markers: &EntryMarkers) -> Vec<Entry> {
  let Some(body) = entry.body.as_deref() else {
    return vec![entry];
  };

  let found = markers.find(body);
  let Some(first) = found.first() else {
    return vec![entry];
  };

  let preamble = non_empty(Some(&body[..first.start]));
  let mut synthetic = found
    .iter()
    .enumerate()
    .map(|(index, marker)| {
      let end = found.get(index + 1).map(|next| next.start).unwrap_or(body.len());
      synthetic_entry(&entry, types, marker, &body[marker.end..end])
    })
    .collect::<Vec<_>>();

  if entry.raw_type.is_none() {
    // The untyped wrapper is dropped, its notes are not.
    if let Some(first) = synthetic.first_mut() {
      first.notes = entry.notes;
    }
    return synthetic;
  }

  let mut entries = Vec::with_capacity(synthetic.len() + 1);
  entries.push(Entry {
    body: preamble,
    ..entry
  });
  entries.extend(synthetic);
  entries
}

fn synthetic_entry(parent: &Entry, types: &TypeTable, marker: &EntryMarker, segment: &str) -> Entry {
  let ScopedType { raw_type, scope } = ScopedType::from_prefix(&marker.kind);
  let is_public_commit = types.is_public(&raw_type);

  let (subject, body) = segment.split_once('\n').unwrap_or((segment, ""));
  let subject = subject.trim();

  Entry {
    hash: parent.hash.clone(),
    kind: types.display_type(&raw_type),
    header: format!("{}: {subject}", marker.kind),
    subject: if is_public_commit {
      clean_subject(subject)
    } else {
      subject.to_string()
    },
    body: non_empty(Some(body)),
    footer: None,
    notes: Vec::new(),
    scope,
    files: Arc::clone(&parent.files),
    repository_url: parent.repository_url.clone(),
    is_public_commit,
    mentions: find_mentions(segment),
    revert: None,
    merge: None,
    raw_type: Some(raw_type),
  }
}

/// One entry per scope, where only the first one keeps the notes.
pub fn split_by_scope(entry: Entry) -> Vec<Entry> { split_by_scope_with(entry, |index| index == 0) }

/// Like [`split_by_scope`], with `keeps_notes` deciding which clones (by
/// position) carry the notes.
pub fn split_by_scope_with(entry: Entry, keeps_notes: impl Fn(usize) -> bool) -> Vec<Entry> {
  let scopes = match entry.scope.as_deref() {
    Some(scopes) if scopes.len() > 1 => scopes.to_vec(),
    _ => return vec![entry],
  };

  scopes
    .into_iter()
    .enumerate()
    .map(|(index, scope)| {
      entry.clone_with(CloneOverrides {
        scope: Some(vec![scope]),
        keep_notes: keeps_notes(index),
      })
    })
    .collect()
}
