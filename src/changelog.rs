use std::{
  collections::{BTreeMap, HashSet},
  fs,
  path::Path,
};

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use git2::{Repository, Signature, StatusOptions};
use regex::Regex;
use semver::Version;
use tracing::{debug, info, warn};

use crate::{
  bump::{BumpLevel, infer_bump},
  cli::{ChangelogArgs, EntriesArgs, SemverArgs},
  commit::{Entry, Note},
  config::EffectiveConfig,
  git::{GitCommit, RepositoryFiles, read_commits, read_tags},
  pipeline::Pipeline,
  repository::{normalize_repository_url, resolve_repository_url},
  types::{DisplayType, TypeTable, note_rank},
};

const INTERNAL_CHANGES_ONLY: &str = "Internal changes only (updated dependencies, documentation, etc.).";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterOptions {
  pub skip_commits_link: bool,
  pub skip_compare_link: bool,
}

pub struct ChangelogSection<'a> {
  pub date: String,
  pub version: String,
  pub previous_tag: Option<String>,
  pub repository_url: String,
  pub entries: &'a [Entry],
}

/// Entries and context gathered for the next release.
pub struct Release {
  pub entries: Vec<Entry>,
  pub latest_tag: Option<String>,
  pub latest_version: Option<Version>,
  pub repository_url: String,
  pub date: String,
}

pub fn normalize_tag_version(tag_name: &str) -> Option<Version> { Version::parse(tag_name.trim_start_matches('v')).ok() }

pub fn bump_version(current: Option<Version>, bump: BumpLevel) -> Version {
  let mut next = current.unwrap_or_else(|| Version::new(0, 0, 0));

  match bump {
    BumpLevel::Major => {
      next.major += 1;
      next.minor = 0;
      next.patch = 0;
    }
    BumpLevel::Minor => {
      next.minor += 1;
      next.patch = 0;
    }
    BumpLevel::Patch => {
      next.patch += 1;
    }
  }

  next.pre = semver::Prerelease::EMPTY;
  next
}

fn resolve_changelog_target(
  current: Option<Version>,
  target: Option<&str>,
  detected_bump: BumpLevel,
) -> Result<Version> {
  let Some(raw_target) = target else {
    return Ok(bump_version(current, detected_bump));
  };

  match raw_target.to_ascii_lowercase().as_str() {
    "major" => Ok(bump_version(current, BumpLevel::Major)),
    "minor" => Ok(bump_version(current, BumpLevel::Minor)),
    "patch" => Ok(bump_version(current, BumpLevel::Patch)),
    _ => {
      let version = raw_target.trim_start_matches('v');
      Version::parse(version).map_err(|_| anyhow!("Invalid changelog target version '{raw_target}'"))
    }
  }
}

fn commit_changelog(commit_message: &str) -> Result<()> {
  let repo = Repository::discover(".").context("Failed to discover git repository")?;
  let mut options = StatusOptions::new();
  options.include_untracked(true).recurse_untracked_dirs(false);

  let statuses = repo.statuses(Some(&mut options)).context("Failed to read git status")?;

  let changed_paths = statuses
    .iter()
    .filter_map(|entry| entry.path().map(|path| path.to_string()))
    .collect::<Vec<_>>();

  if changed_paths != vec!["CHANGELOG.md".to_string()] {
    info!(files = ?changed_paths, "Skipping auto-commit: CHANGELOG.md is not the only changed file");
    return Ok(());
  }

  let mut index = repo.index().context("Cannot open git index")?;
  index
    .add_path(Path::new("CHANGELOG.md"))
    .context("Cannot stage CHANGELOG.md")?;
  index.write().context("Cannot write git index")?;

  let tree_id = index.write_tree().context("Cannot write git tree")?;
  let tree = repo.find_tree(tree_id).context("Cannot find git tree")?;

  let signature = repo
    .signature()
    .or_else(|_| Signature::now("cronaca", "cronaca@localhost"))
    .context("Cannot build git signature")?;

  let parent = match repo.head().ok().and_then(|head| head.target()) {
    Some(oid) => Some(repo.find_commit(oid).context("Cannot find HEAD commit")?),
    None => None,
  };

  repo
    .commit(
      Some("HEAD"),
      &signature,
      &signature,
      commit_message,
      &tree,
      &parent.iter().collect::<Vec<_>>(),
    )
    .context("Cannot create git commit")?;

  Ok(())
}

pub fn extract_versions(markdown: &str) -> HashSet<String> {
  let re = Regex::new(r"(?m)^##\s+\[?([0-9]+\.[0-9]+\.[0-9]+[^\]\s]*)\]?").expect("version regex must compile");

  re.captures_iter(markdown)
    .filter_map(|capture| capture.get(1).map(|m| m.as_str().to_string()))
    .collect::<HashSet<_>>()
}

pub fn format_date(timestamp: i64) -> String {
  DateTime::<Utc>::from_timestamp(timestamp, 0)
    .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    .format("%Y-%m-%d")
    .to_string()
}

fn render_scope(scope: Option<&[String]>) -> String {
  match scope {
    Some(scope) if !scope.is_empty() => format!("**{}**: ", scope.join(", ")),
    _ => String::new(),
  }
}

/// Continuation lines of a list item are indented under its bullet.
fn render_item(text: &str) -> String {
  let mut lines = text.lines();
  let mut output = format!("* {}", lines.next().unwrap_or_default());

  for line in lines {
    output.push('\n');
    if !line.trim().is_empty() {
      output.push_str("  ");
      output.push_str(line);
    }
  }

  output
}

fn render_note(note: &Note) -> String { render_item(&format!("{}{}", render_scope(note.scope.as_deref()), note.text)) }

fn render_entry(entry: &Entry, options: WriterOptions) -> String {
  let mut output = format!("* {}{}", render_scope(entry.scope.as_deref()), entry.subject);

  if !options.skip_commits_link {
    output.push_str(&format!(
      " ([commit]({}/commit/{}))",
      entry.repository_url.trim_end_matches('/'),
      entry.hash
    ));
  }

  if let Some(body) = &entry.body {
    output.push_str("\n\n");
    output.push_str(body);
  }

  output
}

fn render_heading(section: &ChangelogSection, options: WriterOptions) -> String {
  match &section.previous_tag {
    Some(previous_tag) if !options.skip_compare_link => {
      format!(
        "## [{version}]({url}/compare/{previous_tag}...v{version}) ({date})",
        version = section.version,
        url = section.repository_url.trim_end_matches('/'),
        date = section.date
      )
    }
    _ => format!("## {} ({})", section.version, section.date),
  }
}

/// Renders one release: notes grouped by title (breaking changes first), then
/// public entries grouped by type.
pub fn render_section(section: &ChangelogSection, options: WriterOptions) -> String {
  let mut notes: BTreeMap<((u8, u8), &str), Vec<&Note>> = BTreeMap::new();
  let mut groups: BTreeMap<DisplayType, Vec<&Entry>> = BTreeMap::new();

  for entry in section.entries {
    for note in &entry.notes {
      notes
        .entry((note_rank(&note.title), note.title.as_str()))
        .or_default()
        .push(note);
    }

    if entry.is_public_commit
      && let Some(kind) = entry.kind
    {
      groups.entry(kind).or_default().push(entry);
    }
  }

  let mut blocks = vec![render_heading(section, options)];

  if notes.is_empty() && groups.is_empty() {
    blocks.push(INTERNAL_CHANGES_ONLY.to_string());
  }

  for ((_, title), notes) in notes {
    blocks.push(format!("### {title}"));
    blocks.push(notes.into_iter().map(render_note).collect::<Vec<_>>().join("\n"));
  }

  for (kind, entries) in groups {
    blocks.push(format!("### {}", kind.as_str()));
    blocks.push(
      entries
        .into_iter()
        .map(|entry| render_entry(entry, options))
        .collect::<Vec<_>>()
        .join("\n"),
    );
  }

  blocks.join("\n\n").trim().to_string()
}

pub fn with_prepended_section(existing: &str, section_markdown: &str) -> String {
  let existing = existing.trim();
  if existing.is_empty() {
    return format!("{section_markdown}\n");
  }

  format!("{section_markdown}\n\n{existing}\n")
}

/// Runs every commit through the pipeline, flagging the ones whose type is not
/// part of the convention.
pub fn transform_commits(pipeline: &Pipeline, commits: &[GitCommit]) -> Result<Vec<Entry>> {
  let mut entries = Vec::new();

  for commit in commits {
    let transformed = pipeline.transform(&commit.to_raw())?;

    if transformed.is_discarded() {
      debug!(hash = %commit.hash, "Commit discarded");
      continue;
    }

    for entry in transformed.into_entries() {
      let known = entry
        .raw_type
        .as_deref()
        .is_some_and(|label| pipeline.types().is_known(label));

      if !known {
        warn!(hash = %entry.hash, header = %entry.header, "Commit does not follow the commit message convention");
      }

      entries.push(entry);
    }
  }

  Ok(entries)
}

pub fn collect_release(from_tag: Option<&str>, config: &EffectiveConfig) -> Result<Release> {
  let repository_url = match &config.repository_url {
    Some(url) => normalize_repository_url(url),
    None => resolve_repository_url(Path::new("."))?,
  };

  let latest_tag = match from_tag {
    Some(tag) => Some(tag.to_string()),
    None => read_tags(&config.tag_pattern)?.first().map(|tag| tag.name.clone()),
  };

  let commits = read_commits(from_tag, &config.tag_pattern)?;
  debug!(count = commits.len(), since = ?latest_tag, "Read commits");

  let pipeline = Pipeline::new(
    config.transform_options(),
    TypeTable::default(),
    RepositoryFiles::discover(Path::new("."))?,
    repository_url.clone(),
  )?;

  let entries = transform_commits(&pipeline, &commits)?;

  Ok(Release {
    entries,
    latest_version: latest_tag.as_deref().and_then(normalize_tag_version),
    latest_tag,
    repository_url,
    date: format_date(commits.first().map(|commit| commit.time).unwrap_or_default()),
  })
}

pub fn execute_changelog_command(changelog_args: &ChangelogArgs, config: &EffectiveConfig) -> Result<()> {
  let changelog_path = Path::new("CHANGELOG.md");
  let existing = fs::read_to_string(changelog_path).unwrap_or_default();
  let existing_versions = extract_versions(&existing);

  let release = collect_release(changelog_args.from_tag.as_deref(), config)?;

  if release.entries.is_empty() {
    info!("No changelog entries found. CHANGELOG.md not updated.");
    return Ok(());
  }

  let next_version = resolve_changelog_target(
    release.latest_version.clone(),
    changelog_args.target.as_deref(),
    infer_bump(&release.entries),
  )?;
  let next_version_string = next_version.to_string();

  if existing_versions.contains(&next_version_string) {
    info!(version = %next_version_string, "Version already exists in CHANGELOG.md");
    return Ok(());
  }

  let section = ChangelogSection {
    date: release.date.clone(),
    version: next_version_string,
    previous_tag: release.latest_tag.clone(),
    repository_url: release.repository_url.clone(),
    entries: &release.entries,
  };

  let section_markdown = render_section(&section, config.writer_options());
  let output = with_prepended_section(&existing, &section_markdown);

  if changelog_args.dry_run {
    println!("{output}");
    return Ok(());
  }

  fs::write(changelog_path, output).context("Failed to write CHANGELOG.md")?;

  if changelog_args.commit {
    let commit_message = changelog_args
      .commit_message
      .as_deref()
      .unwrap_or("Docs: Changelog. [skip ci]");
    commit_changelog(commit_message)?;
  }

  Ok(())
}

pub fn execute_entries_command(entries_args: &EntriesArgs, config: &EffectiveConfig) -> Result<()> {
  let release = collect_release(entries_args.from_tag.as_deref(), config)?;
  let json = serde_json::to_string_pretty(&release.entries).context("Cannot serialize changelog entries")?;

  println!("{json}");
  Ok(())
}

pub fn execute_semver_command(semver_args: &SemverArgs, config: &EffectiveConfig) -> Result<()> {
  let release = collect_release(semver_args.from_tag.as_deref(), config)?;

  println!("{}", infer_bump(&release.entries).as_str());
  Ok(())
}
