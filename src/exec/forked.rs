// src/exec/forked.rs

//! Deferred wait handles returned by the `fork*` operations.
//!
//! A handle owns the child process and its capture workers. `wait` consumes
//! it, so the wait-then-drain sequence runs exactly once per forked process.
//!
//! Dropping a handle without waiting is allowed (fire and forget). The
//! workers keep capturing until the child closes its pipes and then discard
//! the bytes; the child itself is never reaped by this crate.

use std::io;
use std::process::{Child, ExitStatus};

use tracing::debug;

use crate::errors::{ExecError, ExecResult, Failure};
use crate::exec::tee::{CaptureWorker, Tee};
use crate::types::{SplitOutput, Stream};

/// Deferred handle for a combined-stream fork.
pub struct Forked {
    program: String,
    child: Child,
    worker: CaptureWorker,
}

impl Forked {
    pub(crate) fn new(program: String, child: Child, worker: CaptureWorker) -> Self {
        Self {
            program,
            child,
            worker,
        }
    }

    /// OS process id of the child.
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Block until the child exits, then return everything it wrote to
    /// either channel, in write order.
    pub fn wait(self) -> ExecResult<Vec<u8>> {
        let Forked {
            program,
            mut child,
            worker,
        } = self;

        let status = child.wait();
        log_exit(&program, child.id(), &status);

        let stream = worker.stream();
        let (tee, res) = worker.join();
        let (bytes, sink_error) = tee.map(Tee::into_parts).unwrap_or_default();

        match settle(&program, status, [(stream, res)], sink_error) {
            None => Ok(bytes),
            Some(error) => Err(Failure::new(bytes, error)),
        }
    }

    /// [`Forked::wait`] on tokio's blocking pool.
    pub async fn wait_async(self) -> ExecResult<Vec<u8>> {
        let program = self.program.clone();
        match tokio::task::spawn_blocking(move || self.wait()).await {
            Ok(res) => res,
            Err(e) => Err(Failure::from(ExecError::Wait {
                program,
                source: io::Error::other(e),
            })),
        }
    }
}

impl std::fmt::Debug for Forked {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Forked")
            .field("program", &self.program)
            .field("pid", &self.child.id())
            .finish_non_exhaustive()
    }
}

/// Deferred handle for a split-stream fork.
pub struct ForkedSplit {
    program: String,
    child: Child,
    stdout: CaptureWorker,
    stderr: CaptureWorker,
}

impl ForkedSplit {
    pub(crate) fn new(
        program: String,
        child: Child,
        stdout: CaptureWorker,
        stderr: CaptureWorker,
    ) -> Self {
        Self {
            program,
            child,
            stdout,
            stderr,
        }
    }

    /// OS process id of the child.
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Block until the child exits, then return stdout and stderr separately.
    ///
    /// A drain failure on one channel still returns the other channel's bytes.
    pub fn wait(self) -> ExecResult<SplitOutput> {
        let ForkedSplit {
            program,
            mut child,
            stdout,
            stderr,
        } = self;

        let status = child.wait();
        log_exit(&program, child.id(), &status);

        let (out_tee, out_res) = stdout.join();
        let (err_tee, err_res) = stderr.join();

        let (out_bytes, out_sink_err) = out_tee.map(Tee::into_parts).unwrap_or_default();
        let (err_bytes, err_sink_err) = err_tee.map(Tee::into_parts).unwrap_or_default();

        let output = SplitOutput::new(out_bytes, err_bytes);
        let drains = [(Stream::Stdout, out_res), (Stream::Stderr, err_res)];

        match settle(&program, status, drains, out_sink_err.or(err_sink_err)) {
            None => Ok(output),
            Some(error) => Err(Failure::new(output, error)),
        }
    }

    /// [`ForkedSplit::wait`] on tokio's blocking pool.
    pub async fn wait_async(self) -> ExecResult<SplitOutput> {
        let program = self.program.clone();
        match tokio::task::spawn_blocking(move || self.wait()).await {
            Ok(res) => res,
            Err(e) => Err(Failure::from(ExecError::Wait {
                program,
                source: io::Error::other(e),
            })),
        }
    }
}

impl std::fmt::Debug for ForkedSplit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForkedSplit")
            .field("program", &self.program)
            .field("pid", &self.child.id())
            .finish_non_exhaustive()
    }
}

fn log_exit(program: &str, pid: u32, status: &io::Result<ExitStatus>) {
    match status {
        Ok(status) => debug!(
            program,
            pid,
            exit_code = status.code(),
            success = status.success(),
            "process exited"
        ),
        Err(e) => debug!(program, pid, error = %e, "waiting for process failed"),
    }
}

/// Pick the error to report, if any.
///
/// Precedence: wait/exit status, then drains in the order given, then the
/// sink.
fn settle(
    program: &str,
    status: io::Result<ExitStatus>,
    drains: impl IntoIterator<Item = (Stream, io::Result<()>)>,
    sink_error: Option<(Stream, io::Error)>,
) -> Option<ExecError> {
    match status {
        Err(source) => {
            return Some(ExecError::Wait {
                program: program.to_string(),
                source,
            });
        }
        Ok(status) if !status.success() => {
            return Some(ExecError::Exit {
                program: program.to_string(),
                status,
            });
        }
        Ok(_) => {}
    }

    for (stream, res) in drains {
        if let Err(source) = res {
            return Some(ExecError::Drain {
                program: program.to_string(),
                stream,
                source,
            });
        }
    }

    sink_error.map(|(stream, source)| ExecError::Sink {
        program: program.to_string(),
        stream,
        source,
    })
}
