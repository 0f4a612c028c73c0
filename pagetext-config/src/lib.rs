//! Loader for pagetext configuration with YAML + environment overlays.
//!
//! Sources are merged in the order they are added; `PAGETEXT__SECTION__KEY`
//! environment variables always win. Every key is optional, so an empty file
//! (or no file at all) yields [`PagetextConfig::default`]. String values may
//! reference environment variables as `${VAR}` or `$VAR`.
//!
//! ```yaml
//! fetch:
//!   user_agent: "Mozilla/5.0 ..."
//!   timeout_secs: 10
//! output:
//!   file_name: webpage_content.txt
//!   preview_chars: 1000
//! logging:
//!   dir: ~/.local/share/pagetext
//!   format: text
//!   stderr: false
//!   filter: info
//! ```
use config::{Config, ConfigError, Environment, File};
use pagetext_common::observability::{LogConfig, LogFormat};
use pagetext_common::{DEFAULT_ARTIFACT_NAME, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "PAGETEXT";
const CONFIG_FILE_NAME: &str = "pagetext.yaml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PagetextConfig {
    pub fetch: FetchSettings,
    pub output: OutputSettings,
    pub logging: LoggingSettings,
}

/// How the single page request is issued.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl FetchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Presentation of a successful extraction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub file_name: String,
    pub preview_chars: usize,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_ARTIFACT_NAME.to_string(),
            preview_chars: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub dir: Option<String>,
    pub format: LogFormat,
    pub stderr: bool,
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            dir: None,
            format: LogFormat::Text,
            stderr: false,
            filter: "info".to_string(),
        }
    }
}

impl LoggingSettings {
    /// Translate into the shape `init_logging` expects.
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            log_dir: self
                .dir
                .as_deref()
                .map(|d| PathBuf::from(shellexpand::tilde(d).into_owned())),
            emit_stderr: self.stderr,
            format: self.format,
            default_filter: self.filter.clone(),
            ..LogConfig::default()
        }
    }
}

/// `<config_dir>/pagetext/pagetext.yaml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pagetext").join(CONFIG_FILE_NAME))
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct PagetextConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for PagetextConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PagetextConfigLoader {
    /// Start with no files and `PAGETEXT__` env overrides.
    ///
    /// ```
    /// use pagetext_config::PagetextConfigLoader;
    ///
    /// let config = PagetextConfigLoader::new()
    ///     .with_yaml_str("fetch:\n  timeout_secs: 3")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.fetch.timeout_secs, 3);
    /// assert_eq!(config.output.file_name, "webpage_content.txt");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Like [`with_file`](Self::with_file) but silently skipped when the file is missing.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// ```
    /// use pagetext_config::PagetextConfigLoader;
    ///
    /// unsafe { std::env::set_var("PAGETEXT_DOC_UA", "doc-agent/1.0"); }
    ///
    /// let config = PagetextConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// fetch:
    ///   user_agent: "${PAGETEXT_DOC_UA}"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(config.fetch.user_agent, "doc-agent/1.0");
    /// assert_eq!(config.fetch.timeout_secs, 10);
    ///
    /// unsafe { std::env::remove_var("PAGETEXT_DOC_UA"); }
    /// ```
    pub fn load(self) -> Result<PagetextConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: PagetextConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}
