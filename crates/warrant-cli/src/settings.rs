//! `warrant.toml` settings.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/warrant/warrant.db") }

fn default_count() -> usize { 20 }

#[derive(Debug, Clone, Deserialize)]
pub struct WarrantConfig {
  #[serde(default = "default_store_path")]
  pub store_path:    PathBuf,
  /// Page size when `--count` is not given.
  #[serde(default = "default_count")]
  pub default_count: usize,
  /// Hydrate writ quote URLs on every read.
  #[serde(default)]
  pub include_urls:  bool,
}

impl WarrantConfig {
  /// Layer the optional config file under `WARRANT_*` environment variables.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("WARRANT"))
      .build()
      .context("failed to read config file")?;

    let mut cfg: Self = settings
      .try_deserialize()
      .context("failed to deserialise WarrantConfig")?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    Ok(cfg)
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
