use std::fs::{File, OpenOptions};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to open config file {path}: {message}")]
    Open { path: String, message: String },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Failed to open trace file {path}: {message}")]
    TraceFile { path: String, message: String },
    #[error("Invalid trace filter \"{filter}\": {message}")]
    Filter { filter: String, message: String },
    #[error("Failed to install tracing subscriber: {0}")]
    Subscriber(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings for the `kensa` front-end. Every field has a default, so an empty
/// JSON object is a valid configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct KensaConfig {
    #[serde(default)]
    pub trace: TraceConfig,

    /// Rule files loaded on start.
    #[serde(default)]
    pub rule_files: Vec<PathBuf>,

    /// Rules executed after loading.
    #[serde(default)]
    pub entry_rules: Vec<String>,
}

impl KensaConfig {
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        from_file(path)
    }

    pub fn from_json(content: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TraceTarget {
    #[default]
    None,
    Stdout,
    File,
    Both,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraceConfig {
    #[serde(default)]
    pub target: TraceTarget,

    #[serde(default = "default_trace_file")]
    pub file: PathBuf,

    /// `EnvFilter` directive, e.g. `kensa=debug`.
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            target: TraceTarget::default(),
            file: default_trace_file(),
            filter: default_filter(),
        }
    }
}

impl TraceConfig {
    /// Installs the global subscriber this configuration describes. A `none`
    /// target installs nothing.
    pub fn init(&self) -> ConfigResult<()> {
        let writes_stdout = matches!(self.target, TraceTarget::Stdout | TraceTarget::Both);
        let writes_file = matches!(self.target, TraceTarget::File | TraceTarget::Both);
        if !writes_stdout && !writes_file {
            return Ok(());
        }

        let filter = EnvFilter::try_new(&self.filter).map_err(|e| ConfigError::Filter {
            filter: self.filter.clone(),
            message: e.to_string(),
        })?;

        let stdout_layer = writes_stdout.then(|| fmt::layer().with_target(false).boxed());
        let file_layer = if writes_file {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.file)
                .map_err(|e| ConfigError::TraceFile {
                    path: self.file.display().to_string(),
                    message: e.to_string(),
                })?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Arc::new(file))
                    .boxed(),
            )
        } else {
            None
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(stdout_layer)
            .with(file_layer)
            .try_init()
            .map_err(|e| ConfigError::Subscriber(e.to_string()))
    }
}

pub fn from_file<T: for<'de> Deserialize<'de>, P: AsRef<Path>>(path: P) -> ConfigResult<T> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| ConfigError::Open {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}

fn default_trace_file() -> PathBuf {
    PathBuf::from("kensa.trace")
}

fn default_filter() -> String {
    "kensa=debug".to_string()
}
