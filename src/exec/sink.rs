// src/exec/sink.rs

//! External destinations for teed output.

use std::io::{self, Write};

/// Boxed external sink. Moved into capture workers, hence `Send + 'static`.
pub type BoxSink = Box<dyn Write + Send + 'static>;

/// A sink that accepts and drops every byte.
///
/// Stateless: every call returns an equivalent value, nothing to tear down.
pub fn discard() -> io::Sink {
    io::sink()
}

pub(crate) fn boxed<W>(sink: W) -> BoxSink
where
    W: Write + Send + 'static,
{
    Box::new(sink)
}
