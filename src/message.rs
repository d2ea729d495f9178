//! Turns a raw git commit message into a [`RawCommit`].
//!
//! The footer starts at the first line opening a note (`BREAKING CHANGE: ...`)
//! or carrying a closing reference (`Closes #12`) that is not followed by more
//! `<Label>: <subject>` paragraphs. A note runs until the next note or
//! reference line.

use crate::{
  commit::{RawCommit, RawNote, Reference, Revert, non_empty},
  patterns::{
    MERGE_MARKER, find_issue_references, find_mentions, is_reference_line, parse_header, parse_note_line,
    parse_revert_header, parse_reverted_hash,
  },
};

pub fn parse_message(hash: Option<&str>, message: &str) -> RawCommit {
  let message = message.replace("\r\n", "\n");
  let mut lines = message.lines();
  let header = lines.next().unwrap_or_default().trim().to_string();
  let rest = lines.collect::<Vec<_>>();

  let footer_start = rest
    .iter()
    .enumerate()
    .position(|(index, line)| {
      parse_note_line(line).is_some() || (is_reference_line(line) && !body_resumes(&rest[index..]))
    })
    .unwrap_or(rest.len());

  let body = non_empty(Some(rest[..footer_start].join("\n").as_str()));
  let footer = non_empty(Some(rest[footer_start..].join("\n").as_str()));
  let notes = footer.as_deref().map(parse_notes).unwrap_or_default();

  let parsed = parse_header(&header);
  let merge = header
    .starts_with(&format!("{MERGE_MARKER} "))
    .then(|| header.clone());

  let revert = parse_revert_header(&header).map(|reverted| {
    Revert {
      header: reverted.to_string(),
      hash: body.as_deref().and_then(parse_reverted_hash).map(ToOwned::to_owned),
    }
  });

  let references = find_issue_references(&message)
    .into_iter()
    .map(|found| {
      Reference {
        action: found.action,
        owner: found.owner,
        repository: found.repository,
        issue: found.issue,
        raw: found.raw,
      }
    })
    .collect();

  let mut mentions = Vec::new();
  for mention in find_mentions(&message) {
    if !mentions.contains(&mention) {
      mentions.push(mention);
    }
  }

  RawCommit {
    hash: hash.map(ToOwned::to_owned),
    kind: parsed.as_ref().map(|parsed| parsed.kind.clone()),
    subject: parsed.map(|parsed| parsed.subject),
    header,
    body,
    footer,
    notes,
    merge,
    references,
    mentions,
    revert,
  }
}

/// A `<Label>: <subject>` paragraph after a closing reference means the body
/// goes on, as in squash merges listing several changes.
fn body_resumes(lines: &[&str]) -> bool {
  lines
    .windows(2)
    .take_while(|pair| parse_note_line(pair[1]).is_none())
    .any(|pair| pair[0].trim().is_empty() && !is_reference_line(pair[1]) && parse_header(pair[1]).is_some())
}

fn parse_notes(footer: &str) -> Vec<RawNote> {
  let mut notes = Vec::new();
  let mut current: Option<RawNote> = None;

  for line in footer.lines() {
    if let Some(note) = parse_note_line(line) {
      notes.extend(current.take());
      current = Some(RawNote {
        title: note.title.to_string(),
        text: note.text.to_string(),
      });
    } else if is_reference_line(line) {
      notes.extend(current.take());
    } else if let Some(note) = current.as_mut() {
      note.text.push('\n');
      note.text.push_str(line);
    }
  }

  notes.extend(current);

  notes
    .into_iter()
    .map(|note| {
      RawNote {
        title: note.title,
        text: note.text.trim().to_string(),
      }
    })
    .collect()
}
