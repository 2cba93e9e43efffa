// src/config/validate.rs

use crate::config::model::{ConfigFile, MAX_CHUNK_SIZE, RunnerConfig};
use crate::errors::{Result, TeexecError};

/// Check the invariants serde cannot express.
pub fn validate_runner_config(cfg: &RunnerConfig) -> Result<()> {
    if cfg.chunk_size == 0 {
        return Err(TeexecError::ConfigError(
            "[runner].chunk_size must be >= 1 (got 0)".to_string(),
        ));
    }

    if cfg.chunk_size > MAX_CHUNK_SIZE {
        return Err(TeexecError::ConfigError(format!(
            "[runner].chunk_size must be <= {MAX_CHUNK_SIZE} (got {})",
            cfg.chunk_size
        )));
    }

    Ok(())
}

pub(crate) fn validate_config(cfg: &ConfigFile) -> Result<()> {
    validate_runner_config(&cfg.runner)
}
