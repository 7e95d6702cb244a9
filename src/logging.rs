use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_ENV: &str = "SWX_LOG";

/// Install the global subscriber, writing to a daily log file.
///
/// The terminal belongs to the UI, so nothing is logged to stdout. Keep the
/// returned guard alive until exit or buffered lines are lost.
pub fn init() -> Result<WorkerGuard> {
  let dir = log_dir();
  std::fs::create_dir_all(&dir)
    .wrap_err_with(|| format!("Failed to create log directory: {}", dir.display()))?;

  let appender = tracing_appender::rolling::daily(&dir, "swx.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::registry()
    .with(env_filter())
    .with(fmt::layer().with_writer(writer).with_ansi(false).with_target(true))
    .try_init()
    .map_err(|e| eyre!("Failed to install tracing subscriber: {}", e))?;

  Ok(guard)
}

/// `SWX_LOG`, then `RUST_LOG`, then `info`.
fn env_filter() -> EnvFilter {
  EnvFilter::try_from_env(LOG_ENV)
    .or_else(|_| EnvFilter::try_from_default_env())
    .unwrap_or_else(|_| EnvFilter::new("info"))
}

fn log_dir() -> PathBuf {
  dirs::data_dir()
    .unwrap_or_else(std::env::temp_dir)
    .join("swx")
    .join("logs")
}
