//! Logging bootstrap for the `pagetext` binary and its tests.
//!
//! [`init_logging`] installs one global subscriber: an `EnvFilter`, a daily
//! rolling file sink and, when asked, a copy of every event on stderr.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

const LOG_DIR_ENV: &str = "PAGETEXT_LOG_DIR";

type Filtered = Layered<EnvFilter, Registry>;
type BoxedLayer = Box<dyn Layer<Filtered> + Send + Sync>;

/// Encoding of each log line, selected by `logging.format`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Stem of the log file name and of the default directory.
    pub app_name: &'static str,
    /// Explicit directory; otherwise `PAGETEXT_LOG_DIR`, then
    /// `~/.local/share/<app_name>`.
    pub log_dir: Option<PathBuf>,
    pub emit_stderr: bool,
    pub format: LogFormat,
    /// Used when `RUST_LOG` is unset or invalid.
    pub default_filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            app_name: "pagetext",
            log_dir: None,
            emit_stderr: false,
            format: LogFormat::Text,
            default_filter: "info".to_string(),
        }
    }
}

impl LogConfig {
    fn file_prefix(&self) -> String {
        format!("{}.log", self.app_name)
    }
}

/// Install the global subscriber and return today's log file.
///
/// Only the first call installs anything; later calls return the path
/// resolved by the first one.
pub fn init_logging(config: LogConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = LOG_PATH.get() {
        return Ok(path.clone());
    }

    let dir = resolve_log_dir(config.app_name, config.log_dir.as_deref());
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory: {}", dir.display()))?;

    let prefix = config.file_prefix();
    let path = dated_log_path(&dir, &prefix, Utc::now());
    let (writer, guard) = tracing_appender::non_blocking(rolling::daily(&dir, &prefix));
    let _ = LOG_GUARD.set(guard);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let mut layers: Vec<BoxedLayer> = vec![format_layer(config.format, writer, false)];
    if config.emit_stderr {
        layers.push(format_layer(config.format, std::io::stderr, true));
    }

    tracing_subscriber::registry()
        .with(filter)
        .with(layers)
        .try_init()
        .context("tracing setup failed")?;

    let _ = LOG_PATH.set(path.clone());
    Ok(path)
}

fn format_layer<S, W>(format: LogFormat, writer: W, ansi: bool) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Text => fmt::layer().with_writer(writer).with_ansi(ansi).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
    }
}

/// `rolling::daily` suffixes the prefix with the UTC date.
fn dated_log_path(dir: &Path, prefix: &str, now: DateTime<Utc>) -> PathBuf {
    dir.join(format!("{prefix}.{}", now.format("%Y-%m-%d")))
}

fn resolve_log_dir(app_name: &str, explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(dir) => expand_home(dir),
        None => match std::env::var_os(LOG_DIR_ENV) {
            Some(dir) => expand_home(Path::new(&dir)),
            None => default_data_dir(app_name),
        },
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

fn default_data_dir(app_name: &str) -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".local").join("share"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(app_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn explicit_dir_wins() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve_log_dir("pagetext", Some(dir.path())), dir.path());
    }

    #[test]
    fn default_dir_ends_with_app_name() {
        assert!(default_data_dir("pagetext").ends_with("pagetext"));
    }

    #[test]
    fn tilde_expands_to_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(expand_home(Path::new("~/logs")), home.join("logs"));
        assert_eq!(expand_home(Path::new("/var/log/x")), PathBuf::from("/var/log/x"));
    }

    #[test]
    fn log_path_uses_utc_date() {
        let just_before_midnight = Utc.with_ymd_and_hms(2024, 3, 9, 23, 59, 59).unwrap();
        let path = dated_log_path(Path::new("/tmp/pt"), "pagetext.log", just_before_midnight);
        assert_eq!(path, PathBuf::from("/tmp/pt/pagetext.log.2024-03-09"));
    }

    #[test]
    fn file_prefix_follows_app_name() {
        assert_eq!(LogConfig::default().file_prefix(), "pagetext.log");
    }
}
