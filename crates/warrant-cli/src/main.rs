//! `warrant` binary.
//!
//! Reads `warrant.toml` (or the path given with `--config`), opens the SQLite
//! argument store, and prints query results as JSON.

mod settings;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use warrant_core::{
  query::{ReadJustificationsRequest, SortDescription, parse_filter_arg},
  store::ArgumentStore,
};
use warrant_store_sqlite::SqliteStore;

use crate::settings::WarrantConfig;

#[derive(Parser)]
#[command(author, version, about = "Warrant argument store")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "warrant.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Create the store and its schema if they do not exist.
  Init,

  /// Print a page of justifications.
  Justifications {
    /// `name=v1,v2`, e.g. `propositionId=4`. Repeat to widen the result.
    #[arg(long = "filter", value_name = "NAME=VALUES")]
    filters: Vec<String>,

    /// `property[:asc|desc[:value]]`. Repeat for secondary sorts.
    #[arg(long = "sort", value_name = "SORT")]
    sorts: Vec<String>,

    #[arg(long)]
    count: Option<usize>,

    /// Read strictly after the boundary values given with `--sort`.
    #[arg(long)]
    continuation: bool,

    /// Hydrate writ quote URLs and their confirmed targets.
    #[arg(long)]
    include_urls: bool,
  },

  /// Print the derived auto-confirmation status of a URL locator.
  LocatorStatus { url_locator_id: i64 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = WarrantConfig::load(&cli.config)?;

  let store = SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;

  match cli.command {
    Command::Init => {
      tracing::info!(path = ?cfg.store_path, "store initialised");
    }
    Command::Justifications { filters, sorts, count, continuation, include_urls } => {
      let mut request = ReadJustificationsRequest::new(count.unwrap_or(cfg.default_count));
      for arg in &filters {
        let (name, value) =
          parse_filter_arg(arg).with_context(|| format!("bad --filter {arg:?}"))?;
        request = request.with_filter(name, value);
      }
      for arg in &sorts {
        let sort = SortDescription::parse_arg(arg).with_context(|| format!("bad --sort {arg:?}"))?;
        request = request.with_sort(sort);
      }
      request.is_continuation = continuation;
      request.include_urls = include_urls || cfg.include_urls;

      let page = store
        .read_justifications(&request)
        .await
        .context("failed to read justifications")?;
      tracing::info!(count = page.len(), "read justifications");
      print_json(&page)?;
    }
    Command::LocatorStatus { url_locator_id } => {
      let status = store
        .read_auto_confirmation_status(url_locator_id)
        .await
        .with_context(|| format!("failed to read status of url locator {url_locator_id}"))?;
      print_json(&status)?;
    }
  }

  Ok(())
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("failed to serialise output")?;
  println!("{json}");
  Ok(())
}
