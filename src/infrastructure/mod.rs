//! Infrastructure layer: console output boundary
//!
//! This layer implements the I/O boundary traits used by the application layer.

pub mod console;
pub mod traits;

pub use console::{CaptureGuard, Console};
pub use traits::{BufferSink, ConsoleSink, SharedBuffer, StdoutSink};
