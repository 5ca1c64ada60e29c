//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent malformed route definitions.
/// Argument parsing itself never fails.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid route '{pattern}': {reason}")]
    InvalidRoute { pattern: String, reason: String },

    #[error("duplicate parameter '{name}' in route '{pattern}'")]
    DuplicateParameter { pattern: String, name: String },
}

impl DomainError {
    pub(crate) fn invalid_route(pattern: &str, reason: impl Into<String>) -> Self {
        Self::InvalidRoute {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}
