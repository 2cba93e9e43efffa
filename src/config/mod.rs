// src/config/mod.rs

//! Configuration loading and validation for teexec.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate runner limits (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{ConfigFile, LoggingSection, RunnerConfig};
pub use validate::validate_runner_config;
