// src/config/model.rs

use std::str::FromStr;

use serde::Deserialize;

use crate::errors::{Result, TeexecError};
use crate::logging::LogLevel;

/// Default read size of the capture workers.
pub const DEFAULT_CHUNK_SIZE: usize = 32 * 1024;

/// Largest accepted `chunk_size`.
pub const MAX_CHUNK_SIZE: usize = 16 * 1024 * 1024;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [runner]
/// chunk_size = 65536
/// flush_sinks = false
///
/// [logging]
/// level = "debug"
/// ```
///
/// Both sections are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub runner: RunnerConfig,

    #[serde(default)]
    pub logging: LoggingSection,
}

/// `[runner]` section: how captured channels are pumped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunnerConfig {
    /// Bytes read from a child pipe per chunk.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Flush the external sink after every chunk.
    ///
    /// Keeps line-buffered sinks such as `io::stdout()` streaming live.
    #[serde(default = "default_flush_sinks")]
    pub flush_sinks: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            flush_sinks: true,
        }
    }
}

impl RunnerConfig {
    /// Parse and validate a `[runner]`-level TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: ConfigFile = toml::from_str(s)?;
        crate::config::validate_runner_config(&cfg.runner)?;
        Ok(cfg.runner)
    }
}

impl FromStr for RunnerConfig {
    type Err = TeexecError;

    fn from_str(s: &str) -> Result<Self> {
        RunnerConfig::from_toml_str(s)
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// Overrides `TEEXEC_LOG` when set.
    #[serde(default)]
    pub level: Option<LogLevel>,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_flush_sinks() -> bool {
    true
}
