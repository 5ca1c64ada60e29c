//! Console handle with swappable sink and scoped capture
//!
//! `Console` is a cheap clonable handle; all clones share one sink slot.
//! `Console::capture` swaps a buffer into that slot and returns a `CaptureGuard`
//! that puts the previous sink back when finished or dropped, including on
//! early returns and unwinding.

use std::fmt;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::trace;

use crate::infrastructure::traits::{BufferSink, ConsoleSink, SharedBuffer, StdoutSink};

type SinkSlot = Arc<Mutex<Box<dyn ConsoleSink>>>;

/// Handle to the console output of an application.
#[derive(Clone)]
pub struct Console {
    sink: SinkSlot,
}

impl Console {
    pub fn new(sink: impl ConsoleSink + 'static) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(sink))),
        }
    }

    /// Console writing to the process's stdout.
    pub fn stdout() -> Self {
        Self::new(StdoutSink)
    }

    /// Console writing into a buffer; returns the buffer for reading.
    pub fn buffered() -> (Self, SharedBuffer) {
        let buffer = SharedBuffer::new();
        (Self::new(BufferSink::new(buffer.clone())), buffer)
    }

    pub fn write(&self, text: &str) -> io::Result<()> {
        self.lock().write_str(text)
    }

    pub fn writeln(&self, text: &str) -> io::Result<()> {
        let mut sink = self.lock();
        sink.write_str(text)?;
        sink.write_str("\n")
    }

    pub fn flush(&self) -> io::Result<()> {
        self.lock().flush()
    }

    /// Redirect output into a fresh buffer until the guard is finished or dropped.
    pub fn capture(&self) -> CaptureGuard {
        let buffer = SharedBuffer::new();
        let previous = self.replace(Box::new(BufferSink::new(buffer.clone())));
        trace!("console capture started");
        CaptureGuard {
            console: self.clone(),
            buffer,
            previous: Some(previous),
        }
    }

    fn replace(&self, sink: Box<dyn ConsoleSink>) -> Box<dyn ConsoleSink> {
        std::mem::replace(&mut *self.lock(), sink)
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn ConsoleSink>> {
        self.sink.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::stdout()
    }
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console").finish_non_exhaustive()
    }
}

/// Active output capture. Restores the previous sink exactly once.
#[must_use = "dropping the guard immediately ends the capture"]
pub struct CaptureGuard {
    console: Console,
    buffer: SharedBuffer,
    previous: Option<Box<dyn ConsoleSink>>,
}

impl CaptureGuard {
    /// Output captured so far.
    pub fn output(&self) -> String {
        self.buffer.contents()
    }

    /// End the capture and return everything written during it.
    pub fn finish(mut self) -> String {
        self.restore();
        self.buffer.take()
    }

    fn restore(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.console.replace(previous);
            trace!("console capture ended");
        }
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        self.restore();
    }
}

impl fmt::Debug for CaptureGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureGuard")
            .field("active", &self.previous.is_some())
            .finish_non_exhaustive()
    }
}
