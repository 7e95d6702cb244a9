mod app;
mod cache;
mod config;
mod debounce;
mod event;
mod logging;
mod pipeline;
mod query;
mod swapi;
mod ui;

use cache::{NoopStore, ResponseCache, SlotStore, SqliteSlotStore};
use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use std::sync::Arc;
use swapi::gateway::Gateway;
use swapi::transport::HttpTransport;
use swapi::url::Normalizer;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "swx")]
#[command(about = "A terminal explorer for the Star Wars API")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./swx.yaml or $XDG_CONFIG_HOME/swx/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Initial search text
  #[arg(short, long, default_value = "")]
  query: String,

  /// Keep the response cache in memory only
  #[arg(long)]
  ephemeral: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let _log_guard = logging::init()?;

  // Load configuration
  let config = config::Config::load(args.config.as_deref())?;
  info!(base_url = %config.api.base_url, "configuration loaded");

  let store = open_store(&config, args.ephemeral);
  let cache = Arc::new(ResponseCache::hydrate(store));
  info!(entries = cache.len(), "cache hydrated");

  let gateway = Gateway::new(
    cache,
    Arc::new(HttpTransport::new()?),
    Normalizer::from_config(&config.api),
  );

  // Initialize and run the app
  let mut app = app::App::new(&config, gateway);
  app.run(&args.query).await?;

  Ok(())
}

/// Durable backing for the response cache. An unusable database degrades to
/// an in-memory cache rather than refusing to start.
fn open_store(config: &config::Config, ephemeral: bool) -> Box<dyn SlotStore> {
  if ephemeral || !config.cache.persist {
    return Box::new(NoopStore);
  }

  let opened = match &config.cache.path {
    Some(path) => SqliteSlotStore::open_at(path),
    None => SqliteSlotStore::open(),
  };

  match opened {
    Ok(store) => Box::new(store),
    Err(e) => {
      warn!(error = %e, "cache database unavailable, not persisting");
      Box::new(NoopStore)
    }
  }
}
