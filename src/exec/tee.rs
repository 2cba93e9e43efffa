// src/exec/tee.rs

//! Stream duplication: every chunk a child writes lands in an in-memory
//! capture buffer *and* in the caller's sink.
//!
//! A capture worker thread owns the read end of one pipe. It reads until
//! end-of-file, which only happens once the child (and anything that
//! inherited the write end) has exited, so the buffer handed back from
//! [`CaptureWorker::join`] is always complete.
//!
//! - Split mode gives each channel its own pipe, worker and [`Tee`].
//! - Combined mode points both of the child's channels at one pipe, so a
//!   single worker sees the bytes in the order the child wrote them.

use std::io::{self, Read};
use std::thread::{self, JoinHandle};

use tracing::{debug, trace};

use crate::exec::sink::BoxSink;
use crate::types::Stream;

/// Capture buffer plus optional external sink.
///
/// The sink sees exactly the bytes appended to the buffer, in order, until a
/// write or flush to it fails. From then on the sink is detached, the error
/// is kept for reporting and capturing continues.
pub struct Tee {
    stream: Stream,
    buffer: Vec<u8>,
    sink: Option<BoxSink>,
    flush: bool,
    sink_error: Option<(Stream, io::Error)>,
}

impl Tee {
    pub fn new(stream: Stream, sink: BoxSink, flush: bool) -> Self {
        Self {
            stream,
            buffer: Vec::new(),
            sink: Some(sink),
            flush,
            sink_error: None,
        }
    }

    /// A tee with no sink at all, capturing only.
    pub fn capture_only(stream: Stream) -> Self {
        Self {
            stream,
            buffer: Vec::new(),
            sink: None,
            flush: false,
            sink_error: None,
        }
    }

    pub fn stream(&self) -> Stream {
        self.stream
    }

    /// Append `chunk` to the buffer and forward it to the sink.
    pub fn write_chunk(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);

        let Some(sink) = self.sink.as_mut() else {
            return;
        };

        let mut res = sink.write_all(chunk);
        if res.is_ok() && self.flush {
            res = sink.flush();
        }

        if let Err(e) = res {
            self.detach_sink(e);
        }
    }

    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub fn sink_error(&self) -> Option<&(Stream, io::Error)> {
        self.sink_error.as_ref()
    }

    /// Consume the tee, returning the captured bytes and the sink failure, if
    /// any. The sink is flushed one last time and dropped; a failing final
    /// flush counts as a sink failure.
    pub fn into_parts(mut self) -> (Vec<u8>, Option<(Stream, io::Error)>) {
        if let Some(mut sink) = self.sink.take() {
            if let Err(e) = sink.flush() {
                self.detach_sink(e);
            }
        }
        (self.buffer, self.sink_error)
    }

    fn detach_sink(&mut self, e: io::Error) {
        debug!(stream = %self.stream, error = %e, "sink write failed; detaching sink");
        self.sink = None;
        if self.sink_error.is_none() {
            self.sink_error = Some((self.stream, e));
        }
    }
}

impl std::fmt::Debug for Tee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tee")
            .field("stream", &self.stream)
            .field("captured", &self.buffer.len())
            .field("has_sink", &self.sink.is_some())
            .field("flush", &self.flush)
            .field("sink_error", &self.sink_error)
            .finish()
    }
}

/// Handle to a running capture worker.
pub(crate) struct CaptureWorker {
    stream: Stream,
    handle: JoinHandle<(Tee, io::Result<()>)>,
}

impl CaptureWorker {
    /// Start pumping `reader` into `tee` on a dedicated thread.
    pub(crate) fn spawn<R>(reader: R, tee: Tee, chunk_size: usize) -> io::Result<Self>
    where
        R: Read + Send + 'static,
    {
        let stream = tee.stream();
        let handle = thread::Builder::new()
            .name(format!("teexec-{stream}"))
            .spawn(move || pump(reader, tee, chunk_size))?;

        Ok(Self { stream, handle })
    }

    pub(crate) fn stream(&self) -> Stream {
        self.stream
    }

    /// Wait for end-of-file (or a read error) and hand the tee back.
    ///
    /// A panicking worker loses its tee and is reported as a read error.
    pub(crate) fn join(self) -> (Option<Tee>, io::Result<()>) {
        match self.handle.join() {
            Ok((tee, res)) => (Some(tee), res),
            Err(_) => (
                None,
                Err(io::Error::other(format!(
                    "{} capture worker panicked",
                    self.stream
                ))),
            ),
        }
    }
}

fn pump<R: Read>(mut reader: R, mut tee: Tee, chunk_size: usize) -> (Tee, io::Result<()>) {
    let stream = tee.stream();
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut total = 0usize;

    let res = loop {
        match reader.read(&mut buf) {
            Ok(0) => break Ok(()),
            Ok(n) => {
                total += n;
                trace!(%stream, bytes = n, "captured chunk");
                tee.write_chunk(&buf[..n]);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => break Err(e),
        }
    };

    debug!(%stream, total, ok = res.is_ok(), "capture worker finished");
    (tee, res)
}
