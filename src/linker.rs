//! Markdown link rewriting for user mentions and issue references.

use std::sync::LazyLock;

use regex::{Captures, Regex};

const PROFILE_BASE_URL: &str = "https://github.com";

static USER: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?P<before>^|[\s(])@(?P<handle>[\w-]+)").expect("user regex must compile"));

static ISSUE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?P<repository>[\w.-]+/[\w.-]+)?#(?P<issue>\d+)").expect("issue link regex must compile")
});

static CLOSES: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"\b(?i:closes) (?P<reference>(?:[\w.-]+/[\w.-]+)?#\d+)\.").expect("closes regex must compile")
});

/// Characters allowed right after an issue number for it to count as a reference.
fn ends_reference(next: Option<char>) -> bool {
  match next {
    None => true,
    Some(character) => character.is_whitespace() || matches!(character, ',' | '.' | ')' | ']' | ':' | ';' | '!' | '?'),
  }
}

/// Rewrites `@handle` into a link to the user profile.
pub fn link_users(text: &str) -> String {
  USER
    .replace_all(text, |captures: &Captures| {
      let end = captures.get(0).map(|found| found.end()).unwrap_or_default();

      // `@scope/package` names are not mentions.
      if text[end..].starts_with('/') {
        return captures[0].to_string();
      }

      let handle = &captures["handle"];
      format!("{}[@{handle}]({PROFILE_BASE_URL}/{handle})", &captures["before"])
    })
    .into_owned()
}

/// Rewrites `#id` into a link to the issue in `repository_url` and
/// `owner/repo#id` into a link to the issue in that repository. Every bare
/// id linked is appended to `sink`.
pub fn link_issues(text: &str, repository_url: &str, mut sink: Option<&mut Vec<String>>) -> String {
  let repository_url = repository_url.trim_end_matches('/');

  ISSUE
    .replace_all(text, |captures: &Captures| {
      let Some(whole) = captures.get(0) else {
        return String::new();
      };

      let before = text[..whole.start()].chars().next_back();
      let after = text[whole.end()..].chars().next();

      if matches!(before, Some('[' | '/')) || !ends_reference(after) {
        return whole.as_str().to_string();
      }

      let issue = &captures["issue"];

      match captures.name("repository") {
        Some(repository) => {
          let repository = repository.as_str();
          format!("[{repository}#{issue}]({PROFILE_BASE_URL}/{repository}/issues/{issue})")
        }
        None => {
          if let Some(sink) = sink.as_deref_mut() {
            sink.push(issue.to_string());
          }

          format!("[#{issue}]({repository_url}/issues/{issue})")
        }
      }
    })
    .into_owned()
}

/// Applies [`link_users`] then [`link_issues`].
pub fn link_all(text: &str, repository_url: &str) -> String { link_issues(&link_users(text), repository_url, None) }

/// Collapses every `Closes <ref>.` clause of a subject into a single
/// `Closes <ref1>, <ref2>, ....` clause placed where the first one was.
///
/// Must run on raw text, before any linking.
pub fn merge_closes(subject: &str) -> String {
  let mut references = Vec::new();
  let mut output = String::with_capacity(subject.len());
  let mut placeholder: Option<usize> = None;
  let mut last = 0;

  for captures in CLOSES.captures_iter(subject) {
    let Some(whole) = captures.get(0) else {
      continue;
    };

    output.push_str(&subject[last..whole.start()]);

    match placeholder {
      None => placeholder = Some(output.len()),
      Some(position) => {
        let trimmed = output.trim_end().len().max(position);
        output.truncate(trimmed);
      }
    }

    references.push(captures["reference"].to_string());
    last = whole.end();
  }

  let Some(position) = placeholder else {
    return subject.to_string();
  };

  output.push_str(&subject[last..]);
  output.insert_str(position, &format!("Closes {}.", references.join(", ")));
  output
}
