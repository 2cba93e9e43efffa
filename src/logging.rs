// src/logging.rs

//! Logging setup for programs using `teexec`, via `tracing` +
//! `tracing-subscriber`.
//!
//! The library itself only emits `debug`/`trace` events; installing a
//! subscriber is up to the embedding program, and [`init_logging`] is a
//! ready-made one.
//!
//! Priority for determining the log level:
//! 1. explicit level (e.g. from `[logging].level` in the config file)
//! 2. `TEEXEC_LOG` environment variable (e.g. "info", "debug")
//! 3. default to `info`
//!
//! Logs are sent to STDERR so that stdout stays free for teed child output.

use std::str::FromStr;

use anyhow::anyhow;
use serde::Deserialize;
use tracing_subscriber::fmt;

use crate::errors::Result;

/// Environment variable consulted when no explicit level is given.
pub const LOG_ENV_VAR: &str = "TEEXEC_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[serde(alias = "warning")]
    Warn,
    Info,
    Debug,
    Trace,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!(
                "invalid log level: {other} (expected error, warn, info, debug or trace)"
            )),
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(lvl: LogLevel) -> Self {
        match lvl {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Resolve the effective level from an explicit choice and an environment
/// value, falling back to `info`.
pub fn resolve_level(explicit: Option<LogLevel>, env_value: Option<&str>) -> tracing::Level {
    explicit
        .or_else(|| env_value.and_then(|s| s.parse().ok()))
        .map(tracing::Level::from)
        .unwrap_or(tracing::Level::INFO)
}

/// Initialise the global logging subscriber.
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(level: Option<LogLevel>) -> Result<()> {
    let env_value = std::env::var(LOG_ENV_VAR).ok();
    let level = resolve_level(level, env_value.as_deref());

    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("installing tracing subscriber: {e}"))?;

    Ok(())
}
