// src/lib.rs

//! Run external programs and get their output back, optionally teeing it
//! live to a sink on the way.
//!
//! ```no_run
//! // Combined stdout + stderr.
//! let out = teexec::run("echo", ["foo"])?;
//!
//! // Same, streaming to our own stdout as the child writes.
//! let out = teexec::run_tee(std::io::stdout(), "echo", ["foo"])?;
//!
//! // Start now, collect later.
//! let handle = teexec::fork("sh", ["./main.sh"])?;
//! println!("waiting...");
//! let out = handle.wait()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Every operation returns the captured output even when the run fails: the
//! error side of [`ExecResult`] is a [`Failure`] carrying both the output
//! and the [`ExecError`].
//!
//! The free functions use [`Runner::default()`]; build a [`Runner`] from a
//! [`config::RunnerConfig`] to tune capture behaviour.

pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod types;

use std::ffi::OsStr;
use std::io::Write;

pub use crate::errors::{ExecError, ExecResult, Failure};
pub use crate::exec::{Forked, ForkedSplit, Invocation, Runner, discard};
pub use crate::types::{SplitOutput, Stream};

/// Run `program` to completion and return stdout and stderr combined.
pub fn run<P, I, S>(program: P, args: I) -> ExecResult<Vec<u8>>
where
    P: AsRef<OsStr>,
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    Runner::default().run(program, args)
}

/// Like [`run`], also writing both channels live to `sink`.
pub fn run_tee<W, P, I, S>(sink: W, program: P, args: I) -> ExecResult<Vec<u8>>
where
    W: Write + Send + 'static,
    P: AsRef<OsStr>,
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    Runner::default().run_tee(sink, program, args)
}

/// Run `program` to completion and return stdout and stderr separately.
pub fn run_split<P, I, S>(program: P, args: I) -> ExecResult<SplitOutput>
where
    P: AsRef<OsStr>,
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    Runner::default().run_split(program, args)
}

/// Like [`run_split`], also writing each channel live to its own sink.
pub fn run_split_tee<O, E, P, I, S>(
    out_sink: O,
    err_sink: E,
    program: P,
    args: I,
) -> ExecResult<SplitOutput>
where
    O: Write + Send + 'static,
    E: Write + Send + 'static,
    P: AsRef<OsStr>,
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    Runner::default().run_split_tee(out_sink, err_sink, program, args)
}

/// Start `program` and return a handle to collect its combined output later.
///
/// The handle may be dropped to fire and forget.
pub fn fork<P, I, S>(program: P, args: I) -> Result<Forked, ExecError>
where
    P: AsRef<OsStr>,
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    Runner::default().fork(program, args)
}

/// Like [`fork`], also writing both channels live to `sink`.
pub fn fork_tee<W, P, I, S>(sink: W, program: P, args: I) -> Result<Forked, ExecError>
where
    W: Write + Send + 'static,
    P: AsRef<OsStr>,
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    Runner::default().fork_tee(sink, program, args)
}

/// Start `program` and return a handle to collect stdout and stderr
/// separately later.
pub fn fork_split<P, I, S>(program: P, args: I) -> Result<ForkedSplit, ExecError>
where
    P: AsRef<OsStr>,
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    Runner::default().fork_split(program, args)
}

/// Like [`fork_split`], also writing each channel live to its own sink.
pub fn fork_split_tee<O, E, P, I, S>(
    out_sink: O,
    err_sink: E,
    program: P,
    args: I,
) -> Result<ForkedSplit, ExecError>
where
    O: Write + Send + 'static,
    E: Write + Send + 'static,
    P: AsRef<OsStr>,
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    Runner::default().fork_split_tee(out_sink, err_sink, program, args)
}

/// Run a whole command line such as `"echo foo"` and return the combined
/// output as text.
///
/// The line is split at its first space only: everything after it reaches
/// the program as one argument, with no quoting or escaping support.
pub fn run_line(line: &str) -> ExecResult<String> {
    Runner::default().run_line(line)
}
