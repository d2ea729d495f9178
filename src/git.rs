use std::path::Path;

use anyhow::{Context, Result};
use git2::{ObjectType, Oid, Repository, Sort};
use regex::Regex;

use crate::{commit::RawCommit, message::parse_message};

pub struct GitTag {
  pub name: String,
  pub oid: Oid,
  pub time: i64,
}

pub struct GitCommit {
  pub hash: String,
  pub message: String,
  pub time: i64,
}

impl GitCommit {
  pub fn to_raw(&self) -> RawCommit { parse_message(Some(&self.hash), &self.message) }
}

/// Lists the repository-relative paths touched by a commit.
pub trait ChangedFiles {
  fn changed_files(&self, hash: &str) -> Result<Vec<String>>;
}

impl<F> ChangedFiles for F
where
  F: Fn(&str) -> Result<Vec<String>>,
{
  fn changed_files(&self, hash: &str) -> Result<Vec<String>> { self(hash) }
}

/// [`ChangedFiles`] backed by a local repository.
///
/// Commits are diffed against their first parent only, so a merge reports the
/// files brought in by the merged branch. Root commits are diffed against the
/// empty tree.
pub struct RepositoryFiles {
  repo: Repository,
}

impl RepositoryFiles {
  pub fn discover(path: &Path) -> Result<Self> {
    let repo = Repository::discover(path).context("Failed to discover git repository")?;
    Ok(Self { repo })
  }
}

impl ChangedFiles for RepositoryFiles {
  fn changed_files(&self, hash: &str) -> Result<Vec<String>> {
    let commit = self
      .repo
      .revparse_single(hash)
      .context(format!("Cannot resolve commit {hash}"))?
      .peel_to_commit()
      .context(format!("Object {hash} is not a commit"))?;

    let tree = commit.tree().context(format!("Cannot read tree of commit {hash}"))?;
    let parent_tree = if commit.parent_count() > 0 {
      Some(
        commit
          .parent(0)
          .and_then(|parent| parent.tree())
          .context(format!("Cannot read first parent of commit {hash}"))?,
      )
    } else {
      None
    };

    let diff = self
      .repo
      .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)
      .context(format!("Cannot diff commit {hash}"))?;

    let files = diff
      .deltas()
      .filter_map(|delta| delta.new_file().path().or_else(|| delta.old_file().path()))
      .map(|path| path.to_string_lossy().replace('\\', "/"))
      .collect::<Vec<_>>();

    Ok(files)
  }
}

pub fn read_tags(tag_pattern: &str) -> Result<Vec<GitTag>> {
  let repo = Repository::discover(".").context("Failed to discover git repository")?;
  let tag_regex = Regex::new(tag_pattern).context(format!("Invalid tag regex pattern: {tag_pattern}"))?;

  let mut tags = repo
    .tag_names(None)
    .context("Cannot read git tag names")?
    .iter()
    .flatten()
    .filter(|name| tag_regex.is_match(name))
    .filter_map(|name| {
      let object = repo.revparse_single(&format!("refs/tags/{name}")).ok()?;
      let commit = if object.kind() == Some(ObjectType::Commit) {
        object.into_commit().ok()?
      } else {
        object.peel_to_commit().ok()?
      };

      Some(GitTag {
        name: name.to_string(),
        oid: commit.id(),
        time: commit.time().seconds(),
      })
    })
    .collect::<Vec<_>>();

  tags.sort_by_key(|b| std::cmp::Reverse(b.time));
  Ok(tags)
}

fn read_commits_since(start_oid: Option<Oid>) -> Result<Vec<GitCommit>> {
  let repo = Repository::discover(".").context("Failed to discover git repository")?;

  let end_oid = repo
    .head()
    .context("Cannot read git HEAD")?
    .target()
    .context("HEAD is not pointing to a direct commit")?;

  let mut revwalk = repo.revwalk().context("Cannot create git revwalk")?;
  revwalk
    .set_sorting(Sort::TIME)
    .context("Cannot configure git revwalk sorting")?;
  revwalk.push(end_oid).context("Cannot push HEAD into revwalk")?;

  if let Some(start_oid) = start_oid {
    revwalk
      .hide(start_oid)
      .context(format!("Cannot hide start commit {start_oid}"))?;
  }

  let mut commits = Vec::new();

  for oid_result in revwalk {
    let oid = oid_result.context("Failed iterating git history")?;
    let commit = repo.find_commit(oid).context(format!("Cannot find commit {oid}"))?;
    let message = commit.message().unwrap_or_default().trim().to_string();

    if !message.is_empty() {
      commits.push(GitCommit {
        hash: oid.to_string(),
        message,
        time: commit.time().seconds(),
      });
    }
  }

  Ok(commits)
}

/// Commits reachable from HEAD but not from `from_tag` (or the latest tag
/// matching `tag_pattern`), newest first.
pub fn read_commits(from_tag: Option<&str>, tag_pattern: &str) -> Result<Vec<GitCommit>> {
  let start_oid = if let Some(tag) = from_tag {
    let repo = Repository::discover(".").context("Failed to discover git repository")?;
    Some(
      repo
        .revparse_single(tag)
        .context(format!("Cannot resolve tag '{tag}'"))?
        .peel_to_commit()
        .context(format!("Tag '{tag}' does not resolve to a commit"))?
        .id(),
    )
  } else {
    read_tags(tag_pattern)?.first().map(|tag| tag.oid)
  };

  read_commits_since(start_oid)
}
