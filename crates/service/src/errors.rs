use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Rejected input. Never reaches storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::EmptyTitle => "EMPTY_TITLE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageFailure {
    /// The collaborator could not be reached or rejected the call.
    Unavailable,
    /// The caller's deadline elapsed before storage answered.
    Timeout,
    /// The collaborator answered with something that violates its contract.
    UnexpectedShape,
}

impl fmt::Display for StorageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StorageFailure::Unavailable => "unavailable",
            StorageFailure::Timeout => "timeout",
            StorageFailure::UnexpectedShape => "unexpected response",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Error)]
#[error("storage {kind} during {op}: {message}")]
pub struct StorageError {
    pub op: &'static str,
    pub kind: StorageFailure,
    pub message: String,
}

impl StorageError {
    pub fn unavailable(op: &'static str, err: impl fmt::Display) -> Self {
        Self { op, kind: StorageFailure::Unavailable, message: err.to_string() }
    }

    pub fn timeout(op: &'static str, after: Duration) -> Self {
        Self { op, kind: StorageFailure::Timeout, message: format!("no answer within {}ms", after.as_millis()) }
    }

    pub fn unexpected(op: &'static str, message: impl Into<String>) -> Self {
        Self { op, kind: StorageFailure::UnexpectedShape, message: message.into() }
    }
}

/// Failure of a single store operation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl fmt::Display) -> Self {
        Self::NotFound { entity, id: id.to_string() }
    }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            StoreError::Validation(_) => 1001,
            StoreError::NotFound { .. } => 1003,
            StoreError::Storage(_) => 1200,
        }
    }
}
