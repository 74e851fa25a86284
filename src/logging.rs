//! File logging. The terminal belongs to the UI, so nothing goes to stdout.
//!
//! Filter priority: `STAT_CONSOLE_LOG` > `RUST_LOG` > `warn,stat_console=info`.
//! Default file: `<data_local_dir>/stat-console/logs/stat-console.log`.

use std::{env, path::{Path, PathBuf}};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

use crate::config;
use crate::errors::ConsoleError;

const FILE_NAME: &str = "stat-console.log";
const DEFAULT_FILTER: &str = "warn,stat_console=info";

/// Keeps the background writer alive; dropping it flushes the log
pub struct LogGuard {
    _file_guard: WorkerGuard,
    pub log_file: PathBuf,
}

pub fn init(log_file: Option<PathBuf>) -> Result<LogGuard, ConsoleError> {
    let (dir, name) = resolve_log_path(log_file)?;
    std::fs::create_dir_all(&dir)?;

    let file_appender = tracing_appender::rolling::never(&dir, &name);
    let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(create_filter());

    Registry::default()
        .with(file_layer)
        .try_init()
        .map_err(|e| ConsoleError::Logging(e.to_string()))?;

    Ok(LogGuard { _file_guard: file_guard, log_file: dir.join(name) })
}

fn resolve_log_path(override_path: Option<PathBuf>) -> Result<(PathBuf, String), ConsoleError> {
    match override_path {
        Some(path) if path.extension().is_some() => {
            let dir = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| FILE_NAME.to_string());
            Ok((dir, name))
        }
        Some(dir) => Ok((dir, FILE_NAME.to_string())),
        None => Ok((config::log_dir()?, FILE_NAME.to_string())),
    }
}

fn create_filter() -> EnvFilter {
    env::var("STAT_CONSOLE_LOG")
        .or_else(|_| env::var("RUST_LOG"))
        .map(EnvFilter::new)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_with_extension_is_a_file() {
        let (dir, name) = resolve_log_path(Some(PathBuf::from("/tmp/logs/console.log"))).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/logs"));
        assert_eq!(name, "console.log");
    }

    #[test]
    fn override_without_extension_is_a_directory() {
        let (dir, name) = resolve_log_path(Some(PathBuf::from("/tmp/logs"))).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/logs"));
        assert_eq!(name, FILE_NAME);
    }
}
