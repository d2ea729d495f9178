use std::{fs, path::Path};

use anyhow::{Context, Result, anyhow};

const GITHUB_BASE_URL: &str = "https://github.com";

/// Turns the many accepted spellings of a repository location into
/// `https://host/owner/repo`.
pub fn normalize_repository_url(raw: &str) -> String {
  let mut url = raw.trim().trim_start_matches("git+").to_string();

  if let Some(path) = url.strip_prefix("github:") {
    url = format!("{GITHUB_BASE_URL}/{path}");
  } else if let Some(rest) = url.strip_prefix("git@") {
    url = format!("https://{}", rest.replacen(':', "/", 1));
  } else if let Some(rest) = url.strip_prefix("git://") {
    url = format!("https://{rest}");
  } else if !url.contains("://") && url.split('/').count() == 2 {
    url = format!("{GITHUB_BASE_URL}/{url}");
  }

  let url = url.trim_end_matches('/');
  let url = url.strip_suffix(".git").unwrap_or(url);
  let url = url.strip_suffix("/issues").unwrap_or(url);

  url.to_string()
}

fn from_package_json(path: &Path) -> Result<Option<String>> {
  let content = fs::read_to_string(path).context(format!("Cannot read {}", path.display()))?;
  let json: serde_json::Value = serde_json::from_str(&content).context(format!("Invalid JSON in {}", path.display()))?;

  let Some(repository) = json.get("repository") else {
    return Ok(None);
  };

  let url = repository
    .as_str()
    .or_else(|| repository.get("url").and_then(serde_json::Value::as_str));

  Ok(url.map(normalize_repository_url))
}

fn from_cargo_toml(path: &Path) -> Result<Option<String>> {
  let content = fs::read_to_string(path).context(format!("Cannot read {}", path.display()))?;
  let parsed: toml::Value = toml::from_str(&content).context(format!("Invalid TOML in {}", path.display()))?;

  let url = parsed
    .get("package")
    .and_then(|package| package.get("repository"))
    .or_else(|| {
      parsed
        .get("workspace")
        .and_then(|workspace| workspace.get("package"))
        .and_then(|package| package.get("repository"))
    })
    .and_then(toml::Value::as_str);

  Ok(url.map(normalize_repository_url))
}

/// Reads the repository URL from the package manifest found in `dir`:
/// `package.json` first, then `Cargo.toml`.
pub fn resolve_repository_url(dir: &Path) -> Result<String> {
  let package_json = dir.join("package.json");
  if package_json.exists()
    && let Some(url) = from_package_json(&package_json)?
  {
    return Ok(url);
  }

  let cargo_toml = dir.join("Cargo.toml");
  if cargo_toml.exists()
    && let Some(url) = from_cargo_toml(&cargo_toml)?
  {
    return Ok(url);
  }

  Err(anyhow!(
    "No repository field found in package.json or Cargo.toml in {}",
    dir.display()
  ))
}
