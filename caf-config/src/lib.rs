//! Run configuration: built-in defaults, optional YAML, `CAF__` env overlays.
//!
//! Precedence, lowest first:
//!
//! 1. defaults on [`ScrapeConfig`] (a plain run needs nothing else)
//! 2. files and inline YAML, in the order they were added
//! 3. `CAF__`-prefixed environment variables, `__` between nested keys
//!    (`CAF__HTTP__TIMEOUT_SECS=5`)
//! 4. explicit overrides, which is where CLI flags land
//!
//! `${VAR}` and a leading `~` in string values are expanded after merging.
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use caf_common::CafError;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "CAF";

pub const DEFAULT_SOURCE_URL: &str =
    "https://www.ncsc.gov.uk/collection/cyber-assessment-framework";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScrapeConfig {
    pub source_url: String,
    pub mode: Mode,
    /// Output files are `<stem>.json` and `<stem>.log`.
    pub output_stem: PathBuf,
    pub http: HttpSettings,
    pub log: LogSettings,
}

/// Which page layout to read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Whole framework in one document.
    #[default]
    Page,
    /// Collection page linking to objective and principle pages.
    Crawl,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogSettings {
    pub format: LogFormat,
    /// Mirror log events to stderr as well as the log file.
    pub stderr: bool,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            mode: Mode::default(),
            output_stem: PathBuf::from("output"),
            http: HttpSettings::default(),
            log: LogSettings::default(),
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: concat!("caf-scrape/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            stderr: true,
            filter: "info".to_string(),
        }
    }
}

impl ScrapeConfig {
    pub fn output_path(&self) -> PathBuf {
        with_suffix(&self.output_stem, ".json")
    }

    pub fn log_path(&self) -> PathBuf {
        with_suffix(&self.output_stem, ".log")
    }

    pub fn source_url(&self) -> Result<Url, LoadError> {
        Url::parse(&self.source_url).map_err(|e| LoadError::Invalid {
            field: "source_url",
            reason: format!("{:?}: {e}", self.source_url),
        })
    }

    fn validate(&self) -> Result<(), LoadError> {
        self.source_url()?;
        if self.output_stem.as_os_str().is_empty() {
            return Err(LoadError::Invalid {
                field: "output_stem",
                reason: "must not be empty".to_string(),
            });
        }
        if self.http.timeout_secs == 0 {
            return Err(LoadError::Invalid {
                field: "http.timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.http.connect_timeout_secs == 0 {
            return Err(LoadError::Invalid {
                field: "http.connect_timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// `output` + `.json` → `output.json`; unlike `Path::with_extension` this
/// keeps dots already in the stem.
fn with_suffix(stem: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(stem.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl From<LoadError> for CafError {
    fn from(err: LoadError) -> Self {
        CafError::Config(err.to_string())
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') || s.starts_with('~') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::full(&cur) {
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

/// Builder hiding the `config` crate wiring.
pub struct ScrapeConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    overrides: Vec<(String, config::Value)>,
}

impl Default for ScrapeConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrapeConfigLoader {
    /// Nothing but defaults until sources are added.
    ///
    /// ```
    /// use caf_config::{Mode, ScrapeConfigLoader};
    ///
    /// let cfg = ScrapeConfigLoader::new()
    ///     .with_yaml_str("mode: crawl\nhttp:\n  timeout_secs: 5")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(cfg.mode, Mode::Crawl);
    /// assert_eq!(cfg.http.timeout_secs, 5);
    /// assert_eq!(cfg.http.connect_timeout_secs, 10);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
            overrides: Vec::new(),
        }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Highest-precedence value for a dotted key such as `log.format`.
    pub fn with_override(mut self, key: &str, value: impl Into<config::Value>) -> Self {
        self.overrides.push((key.to_string(), value.into()));
        self
    }

    /// Merge every source, expand `${VAR}`/`~`, and check the result.
    pub fn load(self) -> Result<ScrapeConfig, LoadError> {
        let mut builder = self.builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );
        for (key, value) in self.overrides {
            builder = builder.set_override(key, value)?;
        }
        let cfg = builder.build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: ScrapeConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        typed.validate()?;
        Ok(typed)
    }
}
