//! Error types and result types for expression serialization and execution.
//!
//! Building expressions never fails. Errors only appear when an expression is encoded to bytes,
//! when a strict update serialization meets a payload it does not understand, or when a database
//! adapter reports a failure. Use [`QueryResult<T>`] as the return type for fallible operations.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all errors that can occur while serializing or executing expressions.
#[derive(Error, Debug)]
pub enum QueryError {
    /// The expression could not be encoded into the wire format.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Bytes or values could not be decoded back into a document.
    #[error("Deserialization error: {0}")]
    Deserialization(String),
    /// An update expression contained a payload that is not an update operator.
    /// The argument is a rendering of the offending payload.
    #[error("Unrecognized update payload: {0}")]
    UnrecognizedUpdate(String),
    /// Error during client initialization or connection setup.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// The database rejected or failed to execute an expression.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// A specialized `Result` type for expression serialization and execution.
pub type QueryResult<T> = Result<T, QueryError>;

impl From<BsonError> for QueryError {
    fn from(err: BsonError) -> Self {
        QueryError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for QueryError {
    fn from(err: SerdeJsonError) -> Self {
        QueryError::Serialization(err.to_string())
    }
}
