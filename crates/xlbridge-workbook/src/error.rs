use std::fmt;

use thiserror::Error;
use xlbridge_common::RangeError;

/// Error returned by every document and worksheet operation.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Malformed cell or range notation, or an argument outside the
    /// accepted vocabulary.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// A sheet, defined name or other addressed object does not exist.
    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    #[error("operation '{operation}' is not supported by the {backend} backend")]
    UnsupportedOperation {
        backend: &'static str,
        operation: &'static str,
    },

    /// The live host application could not be attached or launched.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An engine-reported failure that is not plain I/O.
    #[error("{backend} backend error: {message}")]
    Backend {
        backend: &'static str,
        message: String,
    },
}

/// Coarse classification of [`BridgeError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidFormat,
    NotFound,
    UnsupportedOperation,
    BackendUnavailable,
    IoFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::InvalidFormat => "InvalidFormat",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::UnsupportedOperation => "UnsupportedOperation",
            ErrorKind::BackendUnavailable => "BackendUnavailable",
            ErrorKind::IoFailure => "IOFailure",
        };
        f.write_str(s)
    }
}

impl BridgeError {
    pub fn from_backend(backend: &'static str, err: impl fmt::Display) -> Self {
        BridgeError::Backend {
            backend,
            message: err.to_string(),
        }
    }

    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        BridgeError::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn unsupported(backend: &'static str, operation: &'static str) -> Self {
        BridgeError::UnsupportedOperation { backend, operation }
    }

    /// Engine failures are reported as I/O failures.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::InvalidFormat(_) => ErrorKind::InvalidFormat,
            BridgeError::NotFound { .. } => ErrorKind::NotFound,
            BridgeError::UnsupportedOperation { .. } => ErrorKind::UnsupportedOperation,
            BridgeError::BackendUnavailable(_) => ErrorKind::BackendUnavailable,
            BridgeError::Io(_) | BridgeError::Backend { .. } => ErrorKind::IoFailure,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl From<RangeError> for BridgeError {
    fn from(err: RangeError) -> Self {
        BridgeError::InvalidFormat(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
