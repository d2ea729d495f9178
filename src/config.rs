use std::{
  collections::HashMap,
  fs,
  path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::{changelog::WriterOptions, pipeline::TransformOptions};

const DEFAULT_TAG_PATTERN: &str = r"^v\d+\.\d+\.\d+$";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct FileConfig {
  pub tag_pattern: Option<String>,
  pub repository_url: Option<String>,
  pub treat_major_as_minor_breaking_change: Option<bool>,
  pub use_explicit_breaking_change_groups: Option<bool>,
  pub skip_commits_link: Option<bool>,
  pub skip_compare_link: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
  pub tag_pattern: Option<String>,
  pub repository_url: Option<String>,
  pub verbose: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveConfig {
  pub tag_pattern: String,
  pub repository_url: Option<String>,
  pub treat_major_as_minor_breaking_change: bool,
  pub use_explicit_breaking_change_groups: bool,
  pub skip_commits_link: bool,
  pub skip_compare_link: bool,
  pub verbose: bool,
}

fn parse_flag(value: &str) -> bool { matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes") }

impl EffectiveConfig {
  pub fn from_sources(config: Option<FileConfig>, env: &HashMap<String, String>, flags: ConfigOverrides) -> Self {
    let config = config.unwrap_or_default();

    let env_var = |key: &str| env.get(key).cloned();
    let env_flag = |key: &str| env.get(key).map(|value| parse_flag(value));

    let tag_pattern = flags
      .tag_pattern
      .or_else(|| env_var("CRONACA_TAG_PATTERN"))
      .or(config.tag_pattern)
      .unwrap_or_else(|| DEFAULT_TAG_PATTERN.to_string());

    let repository_url = flags
      .repository_url
      .or_else(|| env_var("CRONACA_REPOSITORY_URL"))
      .or(config.repository_url);

    let treat_major_as_minor_breaking_change = env_flag("CRONACA_TREAT_MAJOR_AS_MINOR_BREAKING_CHANGE")
      .or(config.treat_major_as_minor_breaking_change)
      .unwrap_or(false);

    let use_explicit_breaking_change_groups = env_flag("CRONACA_USE_EXPLICIT_BREAKING_CHANGE_GROUPS")
      .or(config.use_explicit_breaking_change_groups)
      .unwrap_or(false);

    let skip_commits_link = env_flag("CRONACA_SKIP_COMMITS_LINK")
      .or(config.skip_commits_link)
      .unwrap_or(false);

    let skip_compare_link = env_flag("CRONACA_SKIP_COMPARE_LINK")
      .or(config.skip_compare_link)
      .unwrap_or(false);

    let verbose = flags
      .verbose
      .filter(|verbose| *verbose)
      .or_else(|| env_flag("CRONACA_VERBOSE"))
      .unwrap_or(false);

    Self {
      tag_pattern,
      repository_url,
      treat_major_as_minor_breaking_change,
      use_explicit_breaking_change_groups,
      skip_commits_link,
      skip_compare_link,
      verbose,
    }
  }

  pub fn transform_options(&self) -> TransformOptions {
    TransformOptions {
      treat_major_as_minor_breaking_change: self.treat_major_as_minor_breaking_change,
      use_explicit_breaking_change_groups: self.use_explicit_breaking_change_groups,
    }
  }

  pub fn writer_options(&self) -> WriterOptions {
    WriterOptions {
      skip_commits_link: self.skip_commits_link,
      skip_compare_link: self.skip_compare_link,
    }
  }
}

fn read_config(path: &Path) -> Result<FileConfig> {
  let content = fs::read_to_string(path).with_context(|| format!("Cannot read config file: {}", path.display()))?;
  serde_yaml::from_str::<FileConfig>(&content)
    .with_context(|| format!("Invalid YAML in config file: {}", path.display()))
}

pub fn load_file(config_path_override: Option<&Path>) -> Result<Option<FileConfig>> {
  if let Some(path) = config_path_override {
    return read_config(path).map(Some);
  }

  let global = if let Some(home) = std::env::var_os("HOME") {
    PathBuf::from(home).join(".config/cronaca.yml")
  } else {
    PathBuf::from(".config/cronaca.yml")
  };

  let local = PathBuf::from("cronaca.yml");

  let mut result = if global.exists() {
    Some(read_config(&global)?)
  } else {
    None
  };

  if local.exists() {
    let overlay = read_config(&local)?;
    let mut merged = result.unwrap_or_default();

    merged.tag_pattern = overlay.tag_pattern.or(merged.tag_pattern);
    merged.repository_url = overlay.repository_url.or(merged.repository_url);
    merged.treat_major_as_minor_breaking_change = overlay
      .treat_major_as_minor_breaking_change
      .or(merged.treat_major_as_minor_breaking_change);
    merged.use_explicit_breaking_change_groups = overlay
      .use_explicit_breaking_change_groups
      .or(merged.use_explicit_breaking_change_groups);
    merged.skip_commits_link = overlay.skip_commits_link.or(merged.skip_commits_link);
    merged.skip_compare_link = overlay.skip_compare_link.or(merged.skip_compare_link);

    result = Some(merged);
  }

  Ok(result)
}
