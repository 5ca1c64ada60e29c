//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add routing and console context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("duplicate route name: {0}")]
    DuplicateRoute(String),

    #[error("unknown route: {0}")]
    UnknownRoute(String),

    #[error("console output failed: {context}")]
    Console {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("handler for route '{route}' failed: {message}")]
    Handler { route: String, message: String },
}

impl ApplicationError {
    /// Create a handler failure for `route`.
    pub fn handler(route: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Handler {
            route: route.into(),
            message: message.into(),
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
