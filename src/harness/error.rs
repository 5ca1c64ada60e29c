//! Harness errors

use thiserror::Error;

use crate::application::ApplicationError;

/// Message for status code assertions outside the console status domain.
pub const STATUS_DOMAIN_MESSAGE: &str =
    "Console status code assert value must be 0 (valid) or 1 (error)";

/// Errors raised by `ConsoleTestCase`.
#[derive(Error, Debug)]
pub enum HarnessError {
    /// Harness used without (or with out-of-order) application config.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Assertion called with an argument outside its domain.
    #[error("{0}")]
    Usage(String),

    /// Captured state did not match the expectation.
    #[error("{0}")]
    Assertion(String),

    /// Error raised by the application during dispatch.
    #[error(transparent)]
    Application(#[from] ApplicationError),
}

impl HarnessError {
    pub fn is_assertion(&self) -> bool {
        matches!(self, HarnessError::Assertion(_))
    }

    pub fn is_usage(&self) -> bool {
        matches!(self, HarnessError::Usage(_))
    }
}

/// Result type for harness operations.
pub type HarnessResult<T> = Result<T, HarnessError>;
