// src/errors.rs

//! Crate-wide error types.
//!
//! - [`ExecError`] describes why running a child process failed.
//! - [`Failure`] pairs an [`ExecError`] with whatever output was captured, so
//!   callers can always inspect output-on-error.
//! - [`TeexecError`] covers everything that is not a process run (config
//!   loading, logging setup).

use std::fmt;
use std::io;
use std::process::ExitStatus;

use thiserror::Error;

use crate::types::Stream;

/// Failure points of a single process run.
#[derive(Error, Debug)]
pub enum ExecError {
    /// The executable could not be launched.
    #[error("exec: {program:?}: {reason}")]
    Start {
        program: String,
        reason: String,
        #[source]
        source: io::Error,
    },

    /// The process started but waiting on it failed.
    #[error("exec: {program:?}: waiting for process: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The process exited unsuccessfully or was killed by a signal.
    #[error("exec: {program:?}: {status}")]
    Exit { program: String, status: ExitStatus },

    /// Reading a captured channel failed after the process ran.
    #[error("exec: {program:?}: reading captured {stream}: {source}")]
    Drain {
        program: String,
        stream: Stream,
        #[source]
        source: io::Error,
    },

    /// Writing to the caller's sink failed. Capture into the buffer continued.
    #[error("exec: {program:?}: writing {stream} to sink: {source}")]
    Sink {
        program: String,
        stream: Stream,
        #[source]
        source: io::Error,
    },
}

impl ExecError {
    pub(crate) fn start(program: impl Into<String>, source: io::Error) -> Self {
        let program = program.into();
        let reason = if source.kind() == io::ErrorKind::NotFound {
            if program.contains(std::path::MAIN_SEPARATOR) || program.contains('/') {
                "no such file or directory".to_string()
            } else {
                "executable file not found in $PATH".to_string()
            }
        } else {
            source.to_string()
        };

        ExecError::Start {
            program,
            reason,
            source,
        }
    }

    /// Name of the program the error refers to.
    pub fn program(&self) -> &str {
        match self {
            ExecError::Start { program, .. }
            | ExecError::Wait { program, .. }
            | ExecError::Exit { program, .. }
            | ExecError::Drain { program, .. }
            | ExecError::Sink { program, .. } => program,
        }
    }

    pub fn is_start(&self) -> bool {
        matches!(self, ExecError::Start { .. })
    }

    /// Exit status for [`ExecError::Exit`], `None` otherwise.
    pub fn exit_status(&self) -> Option<ExitStatus> {
        match self {
            ExecError::Exit { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A failed run together with the output captured before and during the
/// failure.
pub struct Failure<T> {
    pub output: T,
    pub error: ExecError,
}

impl<T> Failure<T> {
    pub fn new(output: T, error: ExecError) -> Self {
        Self { output, error }
    }

    pub fn map_output<U>(self, f: impl FnOnce(T) -> U) -> Failure<U> {
        Failure {
            output: f(self.output),
            error: self.error,
        }
    }

    pub fn into_parts(self) -> (T, ExecError) {
        (self.output, self.error)
    }
}

impl<T: Default> From<ExecError> for Failure<T> {
    fn from(error: ExecError) -> Self {
        Failure::new(T::default(), error)
    }
}

impl<T: fmt::Debug> fmt::Debug for Failure<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Failure")
            .field("output", &self.output)
            .field("error", &self.error)
            .finish()
    }
}

impl<T> fmt::Display for Failure<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl<T: fmt::Debug> std::error::Error for Failure<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Result of a process run: the output on success, or the output plus the
/// first error encountered.
pub type ExecResult<T> = std::result::Result<T, Failure<T>>;

/// Errors outside of process runs.
#[derive(Error, Debug)]
pub enum TeexecError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, TeexecError>;
