//! Error types for driverstore
//!
//! Provides a unified error type for all operations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::CorruptRecord;

/// Result type alias using DriverStoreError
pub type Result<T> = std::result::Result<T, DriverStoreError>;

/// Machine-readable code for technical (store-side) failures
pub const TECHNICAL_FAILURE: &str = "technical.failure";

/// Machine-readable code for rejected caller input
pub const BAD_REQUEST: &str = "bad.request";

/// Unified error type for driverstore operations
#[derive(Debug, Error)]
pub enum DriverStoreError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Record Errors
    // -------------------------------------------------------------------------
    #[error("Corrupt record at line {line}: {reason}")]
    CorruptRecord { line: usize, reason: CorruptRecord },

    #[error("Corrupt tail record: {0}")]
    CorruptTail(CorruptRecord),

    // -------------------------------------------------------------------------
    // Caller Errors
    // -------------------------------------------------------------------------
    #[error("Invalid input data: {0}")]
    BadInput(String),

    // -------------------------------------------------------------------------
    // Runtime Errors
    // -------------------------------------------------------------------------
    #[error("Background task failed: {0}")]
    Task(String),
}

/// Coarse classification of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// File could not be created, opened, read or appended to
    IoFailure,

    /// A line did not decode into a valid record
    CorruptRecord,

    /// The caller supplied invalid data; the store was not touched
    BadInput,
}

impl DriverStoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DriverStoreError::Io(_) | DriverStoreError::Task(_) => ErrorKind::IoFailure,
            DriverStoreError::CorruptRecord { .. } | DriverStoreError::CorruptTail(_) => {
                ErrorKind::CorruptRecord
            }
            DriverStoreError::BadInput(_) => ErrorKind::BadInput,
        }
    }

    /// Machine-readable code, stable across messages
    pub fn code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::IoFailure | ErrorKind::CorruptRecord => TECHNICAL_FAILURE,
            ErrorKind::BadInput => BAD_REQUEST,
        }
    }

    /// True for failures the caller caused rather than the store
    pub fn is_bad_input(&self) -> bool {
        self.kind() == ErrorKind::BadInput
    }

    pub fn to_error_msg(&self) -> ErrorMsg {
        ErrorMsg {
            code: self.code().to_string(),
            message: self.to_string(),
        }
    }
}

/// Serializable `{code, message}` pair handed to outer layers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMsg {
    pub code: String,
    pub message: String,
}

impl From<&DriverStoreError> for ErrorMsg {
    fn from(err: &DriverStoreError) -> Self {
        err.to_error_msg()
    }
}
