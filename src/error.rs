//! Error taxonomy for import session operations.
//!
//! Every session operation reports failures synchronously through
//! [`ReconcileError`]. Pre-submission problems are not errors; they are
//! returned as [`crate::validate::Violation`] values.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// Malformed or inconsistent data supplied to an operation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Operation invoked before the session holds the state it needs.
    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    /// Reference to a mapping entry or stored schema that does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

impl ReconcileError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        ReconcileError::InvalidInput(message.into())
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        ReconcileError::PreconditionFailed(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ReconcileError::NotFound(message.into())
    }
}

pub type Result<T, E = ReconcileError> = std::result::Result<T, E>;
