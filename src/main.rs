use std::collections::HashMap;

use anyhow::Result;
use clap::Parser;
use cronaca::{
  changelog::{execute_changelog_command, execute_entries_command, execute_semver_command},
  cli::{Args, Command},
  config::{ConfigOverrides, EffectiveConfig, load_file},
};
use tracing::{Level, debug};
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
  let default_level = if verbose { Level::DEBUG } else { Level::WARN };

  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_target(false)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy(),
    )
    .init();
}

fn main() -> Result<()> {
  let args = match Args::try_parse() {
    Ok(opts) => opts,
    Err(e) => {
      match e.kind() {
        clap::error::ErrorKind::DisplayVersion => {
          println!("{}", env!("CARGO_PKG_VERSION"));
          return Ok(());
        }
        _ => {
          e.exit();
        }
      }
    }
  };

  let file_cfg = load_file(args.config.as_deref())?;

  let overrides = ConfigOverrides {
    tag_pattern: args.tag_pattern.clone(),
    repository_url: args.repository_url.clone(),
    verbose: Some(args.verbose),
  };

  let config = EffectiveConfig::from_sources(file_cfg, &HashMap::from_iter(std::env::vars()), overrides);
  init_logging(config.verbose);

  debug!(command = args.command.name(), "Configuration loaded");

  match &args.command {
    Command::Changelog(changelog_args) => execute_changelog_command(changelog_args, &config)?,
    Command::Entries(entries_args) => execute_entries_command(entries_args, &config)?,
    Command::Semver(semver_args) => execute_semver_command(semver_args, &config)?,
  }

  Ok(())
}
