//! Error conversion helpers for console I/O
//!
//! Provides an extension trait for attaching context to console write failures.

use std::io;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Add context to a console I/O error.
    ///
    /// # Example
    /// ```ignore
    /// console.writeln(&line).with_console_context("write usage")?;
    /// ```
    fn with_console_context(self, action: &str) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_console_context(self, action: &str) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::Console {
            context: action.to_string(),
            source: e,
        })
    }
}
