//! Process-wide tracing setup.
//!
//! Records go to stdout and to an append-only log file. The file writer is
//! non-blocking; the returned [`WorkerGuard`] must live until the process
//! exits or buffered lines are lost.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

/// Install the global subscriber. Call once, before anything logs.
pub fn init(cfg: &Config) -> anyhow::Result<WorkerGuard> {
    let env_filter = build_filter(&cfg.log_level);

    let (dir, file_name) = split_log_path(&cfg.log_file)?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;
    let appender = tracing_appender::rolling::never(&dir, &file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let registry = tracing_subscriber::registry().with(env_filter);

    if cfg.log_json {
        registry
            .with(fmt::layer().json().with_target(true))
            .with(fmt::layer().json().with_writer(file_writer))
            .try_init()?;
    } else {
        registry
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(file_writer),
            )
            .try_init()?;
    }

    Ok(guard)
}

/// `RUST_LOG` wins; otherwise the configured level, warning loudly if it is
/// not a valid filter expression.
fn build_filter(log_level: &str) -> EnvFilter {
    match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => match log_level.parse::<EnvFilter>() {
            Ok(f) => f,
            Err(e) => {
                eprintln!(
                    "WARN: TUBEAUDIO_LOG='{log_level}' is not a valid tracing filter ({e}); \
                     falling back to 'info'"
                );
                EnvFilter::new("info")
            }
        },
    }
}

fn split_log_path(path: &Path) -> anyhow::Result<(PathBuf, PathBuf)> {
    let file_name = path
        .file_name()
        .with_context(|| format!("log file path {} has no file name", path.display()))?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, PathBuf::from(file_name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_file_name_logs_to_cwd() {
        let (dir, name) = split_log_path(Path::new("server.log")).unwrap();
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(name, PathBuf::from("server.log"));
    }

    #[test]
    fn nested_path_is_split() {
        let (dir, name) = split_log_path(Path::new("/var/log/tubeaudio/server.log")).unwrap();
        assert_eq!(dir, PathBuf::from("/var/log/tubeaudio"));
        assert_eq!(name, PathBuf::from("server.log"));
    }

    #[test]
    fn directory_only_path_is_rejected() {
        assert!(split_log_path(Path::new("/")).is_err());
    }
}
