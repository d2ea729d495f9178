//! Parsing rules applied to free-form commit text.
//!
//! Every rule is a pure function returning `Some(match)` or `None`, so each
//! one can be exercised on its own.

use std::{collections::BTreeSet, sync::LazyLock};

use anyhow::{Context, Result};
use regex::Regex;

use crate::commit::Scope;

/// Headers starting with this marker come from merge commits.
pub const MERGE_MARKER: &str = "Merge";

/// Footer keywords that open a note, longest first.
pub const NOTE_KEYWORDS: [&str; 7] = [
  "MAJOR BREAKING CHANGES",
  "MAJOR BREAKING CHANGE",
  "MINOR BREAKING CHANGES",
  "MINOR BREAKING CHANGE",
  "BREAKING CHANGES",
  "BREAKING CHANGE",
  "NOTE",
];

/// Keywords that turn an issue reference into a closing reference.
pub const REFERENCE_ACTIONS: [&str; 9] = [
  "Close", "Closes", "Closed", "Fix", "Fixes", "Fixed", "Resolve", "Resolves", "Resolved",
];

static HEADER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([^:]+): (.*)$").expect("header regex must compile"));

static SCOPED_TYPE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^(?P<label>[^(]+?) \((?P<scope>[^)]*)\)$").expect("scoped type regex must compile")
});

static INTERNAL_MERGES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
  [
    r"^Merge (?:branch )?'(?:master|release|stable)'(?: of \S+)?(?: into '?(?:master|release|stable)'?)?$",
    r"^Merge remote-tracking branch '(?:origin/)?master'(?: into \S+)?$",
  ]
  .iter()
  .map(|pattern| Regex::new(pattern).expect("internal merge regex must compile"))
  .collect()
});

static CI_SKIP: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)\s*\[(?:skip ci|ci skip)\]\s*$").expect("ci skip regex must compile"));

static NOTE_SCOPE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?s)^\((?P<scope>[^)]+)\):\s*(?P<text>.*)$").expect("note scope regex must compile"));

static NOTE_LINE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(&format!(r"^(?P<title>{})[:\s]+(?P<text>.*)$", NOTE_KEYWORDS.join("|")))
    .expect("note line regex must compile")
});

static REFERENCE_LINE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)^(?:close[sd]?|fix(?:es|ed)?|resolve[sd]?)\s+(?:[\w.-]+/[\w.-]+)?#\d+")
    .expect("reference line regex must compile")
});

static ISSUE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?:(?P<owner>[\w.-]+)/(?P<repository>[\w.-]+))?#(?P<issue>\d+)").expect("issue regex must compile")
});

static MENTION: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?:^|[\s(])@(?P<handle>[\w-]+)").expect("mention regex must compile"));

static REVERT_HEADER: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r#"^Revert "(?P<header>.+)"$"#).expect("revert regex must compile"));

static REVERTED_HASH: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"This reverts commit (?P<hash>[0-9a-fA-F]+)\.").expect("reverted hash regex must compile")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
  pub kind: String,
  pub subject: String,
}

/// Matches `<label>: <subject>`.
pub fn parse_header(line: &str) -> Option<Header> {
  let captures = HEADER.captures(line.trim())?;

  Some(Header {
    kind: captures[1].trim().to_string(),
    subject: captures[2].trim().to_string(),
  })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedType {
  pub raw_type: String,
  pub scope: Scope,
}

impl ScopedType {
  /// Like [`parse_scoped_type`], but a prefix without scope decoration is kept
  /// whole as the raw type.
  pub fn from_prefix(prefix: &str) -> Self {
    parse_scoped_type(prefix).unwrap_or_else(|| Self {
      raw_type: prefix.trim().to_string(),
      scope: None,
    })
  }
}

/// Matches `<Label> (<scope1>, <scope2>, ...)`.
pub fn parse_scoped_type(prefix: &str) -> Option<ScopedType> {
  let captures = SCOPED_TYPE.captures(prefix.trim())?;

  Some(ScopedType {
    raw_type: captures["label"].trim().to_string(),
    scope: parse_scope_list(&captures["scope"]),
  })
}

pub fn parse_scope_list(list: &str) -> Scope {
  let scopes = list
    .split(',')
    .map(str::trim)
    .filter(|scope| !scope.is_empty())
    .map(ToOwned::to_owned)
    .collect::<BTreeSet<_>>();

  if scopes.is_empty() {
    None
  } else {
    Some(scopes.into_iter().collect())
  }
}

/// Branch-sync merges between the release branches carry no change of their own.
pub fn is_internal_merge(message: &str) -> bool {
  let message = message.trim();
  INTERNAL_MERGES.iter().any(|pattern| pattern.is_match(message))
}

pub fn strip_ci_skip(subject: &str) -> &str {
  match CI_SKIP.find(subject) {
    Some(found) => &subject[..found.start()],
    None => subject,
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteScope {
  pub scope: Vec<String>,
  pub text: String,
}

/// Matches a leading `(scope1, scope2):` in a note text.
///
/// Any parenthesized group followed by a colon at the very start is taken as a
/// scope list, even when the author meant something else.
pub fn parse_note_scope(text: &str) -> Option<NoteScope> {
  let captures = NOTE_SCOPE.captures(text.trim())?;
  let scope = parse_scope_list(&captures["scope"])?;

  Some(NoteScope {
    scope,
    text: captures["text"].trim().to_string(),
  })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteLine<'a> {
  pub title: &'a str,
  pub text: &'a str,
}

/// Matches a footer line opening a note, e.g. `BREAKING CHANGE: ...` or
/// `MINOR BREAKING CHANGE (engine): ...`. A scope list stays in the text.
pub fn parse_note_line(line: &str) -> Option<NoteLine<'_>> {
  let captures = NOTE_LINE.captures(line)?;

  Some(NoteLine {
    title: captures.name("title")?.as_str(),
    text: captures.name("text")?.as_str(),
  })
}

/// Matches a footer line such as `Closes #12` or `Fixes owner/repo#3`.
pub fn is_reference_line(line: &str) -> bool { REFERENCE_LINE.is_match(line.trim()) }

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueMatch {
  pub action: Option<String>,
  pub owner: Option<String>,
  pub repository: Option<String>,
  pub issue: String,
  pub raw: String,
}

/// Every `#id` / `owner/repo#id` in the text, with the action keyword directly
/// preceding it (if any).
pub fn find_issue_references(text: &str) -> Vec<IssueMatch> {
  ISSUE_REFERENCE
    .captures_iter(text)
    .filter_map(|captures| {
      let whole = captures.get(0)?;
      let action = text[..whole.start()]
        .trim_end()
        .rsplit(|character: char| !character.is_alphanumeric())
        .next()
        .filter(|word| {
          REFERENCE_ACTIONS
            .iter()
            .any(|action| action.eq_ignore_ascii_case(word))
        })
        .map(ToOwned::to_owned);

      Some(IssueMatch {
        action,
        owner: captures.name("owner").map(|owner| owner.as_str().to_string()),
        repository: captures
          .name("repository")
          .map(|repository| repository.as_str().to_string()),
        issue: captures["issue"].to_string(),
        raw: whole.as_str().to_string(),
      })
    })
    .collect()
}

pub fn find_mentions(text: &str) -> Vec<String> {
  MENTION
    .captures_iter(text)
    .map(|captures| captures["handle"].to_string())
    .collect()
}

/// Matches `Revert "<original header>"`.
pub fn parse_revert_header(header: &str) -> Option<&str> {
  REVERT_HEADER
    .captures(header.trim())
    .and_then(|captures| captures.name("header"))
    .map(|header| header.as_str())
}

/// Matches `This reverts commit <hash>.`.
pub fn parse_reverted_hash(body: &str) -> Option<&str> {
  REVERTED_HASH
    .captures(body)
    .and_then(|captures| captures.name("hash"))
    .map(|hash| hash.as_str())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMarker {
  /// Byte offset of the line holding the marker.
  pub start: usize,
  /// Byte offset right after `<Label>: `.
  pub end: usize,
  /// The label with its scope decoration, e.g. `Fix (engine)`.
  pub kind: String,
}

/// Detects `<Label>[ (scope)]: ` at the start of body lines, one per extra
/// logical change packed into a commit.
#[derive(Debug, Clone)]
pub struct EntryMarkers {
  pattern: Option<Regex>,
}

impl EntryMarkers {
  pub fn new<'a>(labels: impl IntoIterator<Item = &'a str>) -> Result<Self> {
    let alternatives = labels.into_iter().map(regex::escape).collect::<Vec<_>>();

    if alternatives.is_empty() {
      return Ok(Self { pattern: None });
    }

    let pattern = format!(
      r"(?m)^(?P<kind>(?:{})(?: \([^)\n]*\))?): ",
      alternatives.join("|")
    );

    Ok(Self {
      pattern: Some(Regex::new(&pattern).context("Cannot build multi-entry marker pattern")?),
    })
  }

  pub fn find(&self, text: &str) -> Vec<EntryMarker> {
    let Some(pattern) = &self.pattern else {
      return Vec::new();
    };

    pattern
      .captures_iter(text)
      .filter_map(|captures| {
        let whole = captures.get(0)?;

        Some(EntryMarker {
          start: whole.start(),
          end: whole.end(),
          kind: captures["kind"].to_string(),
        })
      })
      .collect()
  }
}
