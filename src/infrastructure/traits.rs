//! I/O boundary traits for testability
//!
//! Console output goes through a `ConsoleSink` so that it can be captured
//! in tests instead of being written to the process's stdout.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// Destination for console output.
pub trait ConsoleSink: Send {
    /// Write text as-is (no newline added).
    fn write_str(&mut self, text: &str) -> io::Result<()>;

    /// Flush buffered output.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real sink writing to the process's stdout.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl ConsoleSink for StdoutSink {
    fn write_str(&mut self, text: &str) -> io::Result<()> {
        io::stdout().lock().write_all(text.as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().lock().flush()
    }
}

// ============================================================
// IN-MEMORY IMPLEMENTATIONS
// ============================================================

/// Shared text buffer, cloned between a `BufferSink` and its reader.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<String>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current contents.
    pub fn contents(&self) -> String {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Take the contents, leaving the buffer empty.
    pub fn take(&self) -> String {
        std::mem::take(&mut *self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn push_str(&self, text: &str) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_str(text);
    }
}

/// Sink appending to a `SharedBuffer`.
#[derive(Debug, Clone, Default)]
pub struct BufferSink {
    buffer: SharedBuffer,
}

impl BufferSink {
    pub fn new(buffer: SharedBuffer) -> Self {
        Self { buffer }
    }

    pub fn buffer(&self) -> &SharedBuffer {
        &self.buffer
    }
}

impl ConsoleSink for BufferSink {
    fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.buffer.push_str(text);
        Ok(())
    }
}
