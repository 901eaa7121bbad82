//! Tracing setup. Logs go to a daily file so stdout stays free for output.

use color_eyre::{eyre::eyre, Result};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

/// Environment variable holding a filter directive, e.g. "recipes=debug"
pub const LOG_ENV: &str = "RECIPES_LOG";

/// Directory for log files.
pub fn log_dir() -> Result<PathBuf> {
  let data_dir = dirs::data_dir()
    .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
    .ok_or_else(|| eyre!("Could not determine data directory"))?;

  Ok(data_dir.join("recipes").join("logs"))
}

/// Build the filter: RECIPES_LOG wins, then the configured level, then "info".
fn env_filter(default_level: Option<&str>) -> EnvFilter {
  EnvFilter::try_from_env(LOG_ENV)
    .or_else(|_| EnvFilter::try_new(default_level.unwrap_or("info")))
    .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Daily-rolling writer under `dir`, creating the directory as needed.
fn file_writer(dir: &Path) -> Result<(NonBlocking, WorkerGuard)> {
  std::fs::create_dir_all(dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;

  let appender = RollingFileAppender::builder()
    .rotation(Rotation::DAILY)
    .filename_prefix("recipes")
    .filename_suffix("log")
    .build(dir)
    .map_err(|e| eyre!("Failed to open log file in {}: {}", dir.display(), e))?;

  Ok(tracing_appender::non_blocking(appender))
}

/// Install the global subscriber.
///
/// Keep the returned guard alive for the whole run; dropping it flushes and
/// stops the background writer. When no log file can be opened, warnings go
/// to stderr instead and there is no guard.
pub fn init(default_level: Option<&str>) -> Result<Option<WorkerGuard>> {
  let file = log_dir().and_then(|dir| file_writer(&dir));

  match file {
    Ok((writer, guard)) => {
      tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_level))
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| eyre!("Failed to install log subscriber: {}", e))?;
      Ok(Some(guard))
    }
    Err(e) => {
      tracing_subscriber::fmt()
        .with_env_filter(env_filter(Some("warn")))
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| eyre!("Failed to install log subscriber: {}", e))?;
      tracing::warn!(error = %e, "logging to stderr");
      Ok(None)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_file_writer_creates_directory() {
    let dir = std::env::temp_dir()
      .join(format!("recipes-log-{}", std::process::id()))
      .join("logs");
    let _ = std::fs::remove_dir_all(&dir);

    let (_writer, _guard) = file_writer(&dir).unwrap();
    assert!(dir.is_dir());

    let _ = std::fs::remove_dir_all(dir.parent().unwrap());
  }

  #[test]
  fn test_file_writer_fails_when_directory_is_blocked() {
    let blocker = std::env::temp_dir().join(format!("recipes-log-file-{}", std::process::id()));
    std::fs::write(&blocker, "not a directory").unwrap();

    let err = file_writer(&blocker.join("logs"))
      .err()
      .expect("a file in the way must fail");
    assert!(err.to_string().contains("Failed to create log directory"));

    let _ = std::fs::remove_file(blocker);
  }
}
