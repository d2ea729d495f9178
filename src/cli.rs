use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(clap::Args, Debug, Default)]
pub struct ChangelogArgs {
  /// Optional explicit changelog target (major|minor|patch or a semver like
  /// 1.2.3 / v1.2.3).
  pub target: Option<String>,

  /// Override start tag instead of auto-detecting latest version tag.
  #[arg(long, short = 'f')]
  pub from_tag: Option<String>,

  /// Auto-commit if CHANGELOG.md is the only changed file.
  #[arg(long, short = 'o', conflicts_with = "dry_run")]
  pub commit: bool,

  /// Custom commit message (requires --commit).
  #[arg(long, short = 'm', requires = "commit", value_name = "MESSAGE")]
  pub commit_message: Option<String>,

  /// Preview changes without writing files.
  #[arg(long, short = 'd', conflicts_with = "commit")]
  pub dry_run: bool,
}

#[derive(clap::Args, Debug, Default)]
pub struct EntriesArgs {
  /// Override start tag instead of auto-detecting latest version tag.
  #[arg(long, short = 'f')]
  pub from_tag: Option<String>,
}

#[derive(clap::Args, Debug, Default)]
pub struct SemverArgs {
  /// Override start tag instead of auto-detecting latest version tag.
  #[arg(long, short = 'f')]
  pub from_tag: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Prepend the next release section to CHANGELOG.md.
  #[command(alias = "c")]
  Changelog(ChangelogArgs),
  /// Print the changelog entries of the next release as JSON.
  #[command(alias = "e")]
  Entries(EntriesArgs),
  /// Print the semantic bump implied by the next release entries.
  #[command(alias = "s")]
  Semver(SemverArgs),
}

impl Command {
  pub fn name(&self) -> &'static str {
    match self {
      Self::Changelog(_) => "changelog",
      Self::Entries(_) => "entries",
      Self::Semver(_) => "semver",
    }
  }
}

#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
  /// Optional explicit config file path.
  #[arg(long, short = 'c', global = true)]
  pub config: Option<PathBuf>,

  /// Override the release tag matcher regex.
  #[arg(long, short = 'p', global = true)]
  pub tag_pattern: Option<String>,

  /// Override the repository URL used for links.
  #[arg(long, short = 'u', global = true)]
  pub repository_url: Option<String>,

  /// Enable verbose output.
  #[arg(long, short, global = true)]
  pub verbose: bool,

  #[command(subcommand)]
  pub command: Command,
}
