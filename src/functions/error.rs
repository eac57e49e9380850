use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Error codes a callable function can report to its client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FunctionsErrorCode {
    Unauthenticated,
    InvalidArgument,
    Internal,
}

impl FunctionsErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FunctionsErrorCode::Unauthenticated => "unauthenticated",
            FunctionsErrorCode::InvalidArgument => "invalid-argument",
            FunctionsErrorCode::Internal => "internal",
        }
    }

    /// The canonical status name used on the wire by the callable protocol.
    pub fn status(&self) -> &'static str {
        match self {
            FunctionsErrorCode::Unauthenticated => "UNAUTHENTICATED",
            FunctionsErrorCode::InvalidArgument => "INVALID_ARGUMENT",
            FunctionsErrorCode::Internal => "INTERNAL",
        }
    }

    pub fn http_status(&self) -> http::StatusCode {
        match self {
            FunctionsErrorCode::Unauthenticated => http::StatusCode::UNAUTHORIZED,
            FunctionsErrorCode::InvalidArgument => http::StatusCode::BAD_REQUEST,
            FunctionsErrorCode::Internal => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for FunctionsErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A client-facing error raised by a callable function.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct CallableError {
    pub code: FunctionsErrorCode,
    pub message: String,
}

impl CallableError {
    pub fn new(code: FunctionsErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(FunctionsErrorCode::Unauthenticated, message)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(FunctionsErrorCode::InvalidArgument, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(FunctionsErrorCode::Internal, message)
    }
}
