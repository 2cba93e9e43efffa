// src/exec/runner.rs

//! The process runner: builds the child, wires its output channels through
//! pipes into capture workers and hands back either the finished result
//! (`run*`) or a deferred handle (`fork*`).
//!
//! Every synchronous operation is its fork counterpart followed by an
//! immediate `wait`, so both timings share one code path.

use std::ffi::OsStr;
use std::io::{self, PipeReader, Read, Write};
use std::process::{Child, ChildStderr, ChildStdout, Command, Stdio};

use tracing::debug;

use crate::config::{RunnerConfig, validate_runner_config};
use crate::errors::{ExecError, ExecResult, Result};
use crate::exec::forked::{Forked, ForkedSplit};
use crate::exec::invocation::Invocation;
use crate::exec::sink::{boxed, discard};
use crate::exec::tee::{CaptureWorker, Tee};
use crate::types::{SplitOutput, Stream};

/// Runs external programs with captured, optionally teed, output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Runner {
    config: RunnerConfig,
}

impl Runner {
    /// Create a runner with a validated config.
    pub fn new(config: RunnerConfig) -> Result<Self> {
        validate_runner_config(&config)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run to completion; stdout and stderr come back interleaved in one
    /// buffer.
    pub fn run<P, I, S>(&self, program: P, args: I) -> ExecResult<Vec<u8>>
    where
        P: AsRef<OsStr>,
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.run_tee(discard(), program, args)
    }

    /// Like [`Runner::run`], also writing both channels live to `sink`.
    pub fn run_tee<W, P, I, S>(&self, sink: W, program: P, args: I) -> ExecResult<Vec<u8>>
    where
        W: Write + Send + 'static,
        P: AsRef<OsStr>,
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.fork_tee(sink, program, args)?.wait()
    }

    /// Run to completion, capturing stdout and stderr separately.
    pub fn run_split<P, I, S>(&self, program: P, args: I) -> ExecResult<SplitOutput>
    where
        P: AsRef<OsStr>,
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.run_split_tee(discard(), discard(), program, args)
    }

    /// Like [`Runner::run_split`], also writing stdout live to `out_sink` and
    /// stderr live to `err_sink`.
    pub fn run_split_tee<O, E, P, I, S>(
        &self,
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
        self.fork_split_tee(out_sink, err_sink, program, args)?.wait()
    }

    /// Start the program and return a deferred handle for the combined output.
    ///
    /// Only start failures are reported here; everything else surfaces from
    /// [`Forked::wait`].
    pub fn fork<P, I, S>(&self, program: P, args: I) -> std::result::Result<Forked, ExecError>
    where
        P: AsRef<OsStr>,
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.fork_tee(discard(), program, args)
    }

    /// Like [`Runner::fork`], also writing both channels live to `sink`.
    pub fn fork_tee<W, P, I, S>(
        &self,
        sink: W,
        program: P,
        args: I,
    ) -> std::result::Result<Forked, ExecError>
    where
        W: Write + Send + 'static,
        P: AsRef<OsStr>,
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.fork_invocation(&Invocation::new(program, args), sink)
    }

    /// Start the program and return a deferred handle for split output.
    pub fn fork_split<P, I, S>(
        &self,
        program: P,
        args: I,
    ) -> std::result::Result<ForkedSplit, ExecError>
    where
        P: AsRef<OsStr>,
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.fork_split_tee(discard(), discard(), program, args)
    }

    /// Like [`Runner::fork_split`], also writing each channel live to its sink.
    pub fn fork_split_tee<O, E, P, I, S>(
        &self,
        out_sink: O,
        err_sink: E,
        program: P,
        args: I,
    ) -> std::result::Result<ForkedSplit, ExecError>
    where
        O: Write + Send + 'static,
        E: Write + Send + 'static,
        P: AsRef<OsStr>,
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.fork_split_invocation(&Invocation::new(program, args), out_sink, err_sink)
    }

    /// Run a single command line, split naively at its first space (see
    /// [`crate::exec::split_command_line`]), and return its combined output
    /// as text.
    pub fn run_line(&self, line: &str) -> ExecResult<String> {
        let invocation = Invocation::from_command_line(line);
        self.fork_invocation(&invocation, discard())?
            .wait()
            .map(lossy)
            .map_err(|f| f.map_output(lossy))
    }

    /// Combined-mode fork of a prepared [`Invocation`].
    ///
    /// stdout and stderr share one pipe, so the capture sees the bytes in
    /// the order the child wrote them.
    pub fn fork_invocation<W>(
        &self,
        invocation: &Invocation,
        sink: W,
    ) -> std::result::Result<Forked, ExecError>
    where
        W: Write + Send + 'static,
    {
        let program = invocation.program_name();
        let (mut child, reader) = spawn_combined(invocation)?;

        let tee = Tee::new(Stream::Combined, boxed(sink), self.config.flush_sinks);
        let worker = self.start_worker(&program, &mut child, reader, tee)?;

        Ok(Forked::new(program, child, worker))
    }

    /// Split-mode fork of a prepared [`Invocation`].
    pub fn fork_split_invocation<O, E>(
        &self,
        invocation: &Invocation,
        out_sink: O,
        err_sink: E,
    ) -> std::result::Result<ForkedSplit, ExecError>
    where
        O: Write + Send + 'static,
        E: Write + Send + 'static,
    {
        let program = invocation.program_name();
        let (mut child, stdout, stderr) = spawn_split(invocation)?;

        let flush = self.config.flush_sinks;
        let out_tee = Tee::new(Stream::Stdout, boxed(out_sink), flush);
        let err_tee = Tee::new(Stream::Stderr, boxed(err_sink), flush);

        let out_worker = self.start_worker(&program, &mut child, stdout, out_tee)?;
        let err_worker = match self.start_worker(&program, &mut child, stderr, err_tee) {
            Ok(w) => w,
            Err(e) => {
                // The child is gone, so the stdout worker hits end-of-file.
                let _ = out_worker.join();
                return Err(e);
            }
        };

        Ok(ForkedSplit::new(program, child, out_worker, err_worker))
    }

    fn start_worker<R>(
        &self,
        program: &str,
        child: &mut Child,
        reader: R,
        tee: Tee,
    ) -> std::result::Result<CaptureWorker, ExecError>
    where
        R: Read + Send + 'static,
    {
        CaptureWorker::spawn(reader, tee, self.config.chunk_size)
            .map_err(|e| abandon(program, child, e))
    }
}

/// Spawn `invocation` with stdout and stderr both writing into one new pipe
/// and stdin closed. Returns the child and the pipe's read end.
fn spawn_combined(invocation: &Invocation) -> std::result::Result<(Child, PipeReader), ExecError> {
    let program = invocation.program_name();
    debug!(cmd = %invocation, mode = "combined", "starting process");

    let (reader, writer) = io::pipe().map_err(|e| ExecError::start(program.clone(), e))?;
    let writer_err = writer
        .try_clone()
        .map_err(|e| ExecError::start(program.clone(), e))?;

    let mut cmd: Command = invocation.to_command();
    cmd.stdin(Stdio::null())
        .stdout(Stdio::from(writer))
        .stderr(Stdio::from(writer_err));

    let spawned = cmd.spawn();
    // `cmd` holds our copies of the write end; the reader only sees
    // end-of-file once they are closed.
    drop(cmd);

    let child = spawned.map_err(|e| ExecError::start(program.clone(), e))?;
    debug!(program = %program, pid = child.id(), "process spawned");

    Ok((child, reader))
}

/// Spawn `invocation` with each output channel on its own pipe and stdin
/// closed.
fn spawn_split(
    invocation: &Invocation,
) -> std::result::Result<(Child, ChildStdout, ChildStderr), ExecError> {
    let program = invocation.program_name();
    debug!(cmd = %invocation, mode = "split", "starting process");

    let mut cmd: Command = invocation.to_command();
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = cmd
        .spawn()
        .map_err(|e| ExecError::start(program.clone(), e))?;

    debug!(program = %program, pid = child.id(), "process spawned");

    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        return Err(abandon(
            &program,
            &mut child,
            io::Error::other("child output pipes were not created"),
        ));
    };

    Ok((child, stdout, stderr))
}

/// Give up on a child that started but cannot be captured: kill and reap it,
/// and report the cause as a start failure.
fn abandon(program: &str, child: &mut Child, cause: io::Error) -> ExecError {
    debug!(program, pid = child.id(), error = %cause, "abandoning started process");
    let _ = child.kill();
    let _ = child.wait();
    ExecError::start(program, cause)
}

fn lossy(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}
