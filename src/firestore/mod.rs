//! Cloud Firestore module.
//!
//! Models for the REST representation of documents, conversion of typed field
//! values into plain JSON, and the document-path patterns used to route
//! document change events.

pub mod convert;
pub mod models;
pub mod path;

#[cfg(test)]
mod tests;

use thiserror::Error;

pub use self::path::{relative_document_path, DocumentPattern};

/// Errors that can occur while decoding Firestore data.
#[derive(Error, Debug)]
pub enum FirestoreError {
    /// An `integerValue` that does not fit an `i64`.
    #[error("Failed to parse integer string '{0}'")]
    InvalidInteger(String),
    /// A malformed document path pattern.
    #[error("Invalid document pattern: {0}")]
    InvalidPattern(String),
    /// Wrapper for `serde_json::Error`.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
