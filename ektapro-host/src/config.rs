//! `ektapro.toml`
//!
//! ```toml
//! [timing]
//! fade_s = 2
//! interval_s = 8
//! cycle = true
//!
//! [link]
//! baud_rate = 9600
//! read_timeout_ms = 5000
//! ports = ["/dev/ttyUSB0", "/dev/ttyUSB1"]
//!
//! [log]
//! level = "info"
//! ```
//!
//! Every section and key is optional.

use std::fs;
use std::path::{Path, PathBuf};

use ektapro_core::{ConfigError, TimingConfig};
use ektapro_hal::UartConfig;
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "ektapro.toml";

#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid timing: {0}")]
    Timing(ConfigError),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub baud_rate: u32,
    pub read_timeout_ms: u32,
    /// Explicit port list; empty means probe what the system reports
    pub ports: Vec<String>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        let uart = UartConfig::default();
        Self {
            baud_rate: uart.baudrate,
            read_timeout_ms: uart.read_timeout_ms,
            ports: Vec::new(),
        }
    }
}

impl LinkConfig {
    pub fn uart(&self) -> UartConfig {
        UartConfig {
            baudrate: self.baud_rate,
            read_timeout_ms: self.read_timeout_ms,
            ..UartConfig::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `env_logger` filter, overridden by `RUST_LOG`
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub timing: TimingConfig,
    pub link: LinkConfig,
    pub log: LogConfig,
}

impl HostConfig {
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigFileError> {
        let config: HostConfig = toml::from_str(text).map_err(|source| ConfigFileError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.timing.validate().map_err(ConfigFileError::Timing)?;
        Ok(config)
    }

    /// Load `path`, or `ektapro.toml` next to the executable
    ///
    /// A missing default file yields the defaults; a missing explicit file
    /// is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigFileError> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (default_path(), false),
        };

        match fs::read_to_string(&path) {
            Ok(text) => Self::parse(&text, &path),
            Err(e) if !explicit && e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigFileError::Read { path, source }),
        }
    }
}

fn default_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(CONFIG_FILE_NAME)))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}
