//! Configuration types for dbflow.
//!
//! [`Config::load`] reads `~/.config/dbflow/config.toml`, creating it with
//! hardcoded defaults if it does not yet exist. [`Config::defaults`] returns
//! the same defaults without touching the filesystem (useful in tests).

use serde::Deserialize;
use std::num::NonZeroU64;
use std::path::{Path, PathBuf};

use crate::export::OutputFormat;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[window]
period_secs = 7200
limit       = 5000

[adapter]
message_prefix = "SQL "
context_prefix = "php"

[[adapter.database_aliases]]
from = "uportal.mysql"
to   = "mysql"

[[adapter.database_aliases]]
from = "default"
to   = "mysql"

[source]
required_field = "@context.rows"

[output]
dir      = "output"
basename = "database"
formats  = ["tsv", "graphviz"]
"#;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("window.period_secs must be greater than zero")]
    ZeroPeriod,
}

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level application configuration, loaded from `~/.config/dbflow/config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub adapter: AdapterConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[window]` section: how much of the log is read.
#[derive(Debug, Clone, Deserialize)]
pub struct WindowConfig {
    /// Observation window in seconds, also the QPS divisor.
    #[serde(default = "default_period_secs")]
    pub period_secs: u64,
    /// Maximum number of rows fetched.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_period_secs() -> u64 { 7200 }
fn default_limit() -> usize { 5000 }

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            period_secs: default_period_secs(),
            limit: default_limit(),
        }
    }
}

/// `[adapter]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct AdapterConfig {
    #[serde(default = "default_message_prefix")]
    pub message_prefix: String,
    #[serde(default = "default_context_prefix")]
    pub context_prefix: String,
    #[serde(default = "default_database_aliases")]
    pub database_aliases: Vec<DatabaseAlias>,
}

/// One `[[adapter.database_aliases]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseAlias {
    pub from: String,
    pub to: String,
}

fn default_message_prefix() -> String { "SQL ".to_string() }
fn default_context_prefix() -> String { "php".to_string() }
fn default_database_aliases() -> Vec<DatabaseAlias> {
    ["uportal.mysql", "default"]
        .into_iter()
        .map(|from| DatabaseAlias {
            from: from.to_string(),
            to: "mysql".to_string(),
        })
        .collect()
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            message_prefix: default_message_prefix(),
            context_prefix: default_context_prefix(),
            database_aliases: default_database_aliases(),
        }
    }
}

/// `[source]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Dotted path that must exist on a document for it to count as an SQL
    /// log row. Empty disables the check.
    #[serde(default = "default_required_field")]
    pub required_field: String,
}

fn default_required_field() -> String { "@context.rows".to_string() }

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            required_field: default_required_field(),
        }
    }
}

/// `[output]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_basename")]
    pub basename: String,
    #[serde(default = "default_formats")]
    pub formats: Vec<OutputFormat>,
}

fn default_output_dir() -> PathBuf { PathBuf::from("output") }
fn default_basename() -> String { "database".to_string() }
fn default_formats() -> Vec<OutputFormat> { vec![OutputFormat::Tsv, OutputFormat::Graphviz] }

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            basename: default_basename(),
            formats: default_formats(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `~/.config/dbflow/config.toml`. Creates the file with defaults if it does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, DEFAULT_CONFIG.trim_start())?;
        }

        Self::load_from(&path)
    }

    /// Load `path`; keys it leaves out take their built-in default. A missing
    /// file yields the defaults.
    ///
    /// Defaults come from the serde attributes, not a layered source. Layered
    /// arrays merge element by element.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }

    /// Observation window, rejected when zero.
    pub fn period(&self) -> Result<NonZeroU64, ConfigError> {
        NonZeroU64::new(self.window.period_secs).ok_or(ConfigError::ZeroPeriod)
    }

    /// Required document field, `None` when the check is disabled.
    pub fn required_field(&self) -> Option<&str> {
        Some(self.source.required_field.as_str()).filter(|f| !f.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("dbflow")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
