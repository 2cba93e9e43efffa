use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use teexec::exec::BoxSink;

/// A cloneable in-memory sink.
///
/// Hand one clone to the runner (it needs `'static`), keep the other to
/// inspect what arrived.
#[derive(Debug, Clone, Default)]
pub struct SharedSink {
    bytes: Arc<Mutex<Vec<u8>>>,
    fail_after: Option<usize>,
    fail_flush: bool,
}

impl SharedSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that accepts `limit` bytes and then fails every write.
    pub fn failing_after(limit: usize) -> Self {
        Self {
            fail_after: Some(limit),
            ..Self::default()
        }
    }

    /// A sink that accepts every write but fails every flush, like a
    /// `BufWriter` whose underlying writer went away.
    pub fn failing_flush() -> Self {
        Self {
            fail_flush: true,
            ..Self::default()
        }
    }

    pub fn boxed(&self) -> BoxSink {
        Box::new(self.clone())
    }

    pub fn contents(&self) -> Vec<u8> {
        self.bytes.lock().unwrap().clone()
    }

    pub fn contents_lossy(&self) -> String {
        String::from_utf8_lossy(&self.contents()).into_owned()
    }
}

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut bytes = self.bytes.lock().unwrap();
        if let Some(limit) = self.fail_after {
            if bytes.len() + buf.len() > limit {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink full"));
            }
        }
        bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.fail_flush {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "flush failed"));
        }
        Ok(())
    }
}
