//! JSON document error types

use thiserror::Error;

/// Result type for JSON document operations
pub type JsonResult<T> = std::result::Result<T, JsonError>;

/// Errors that can occur reading or writing JSON workbook documents
#[derive(Debug, Error)]
pub enum JsonError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON syntax error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Structural error in the document
    #[error("Document error: {0}")]
    Document(String),

    /// Model error
    #[error("Model error: {0}")]
    Model(#[from] rowforge_model::Error),
}

impl JsonError {
    /// Create a document error with a custom message
    pub fn document<S: Into<String>>(message: S) -> Self {
        JsonError::Document(message.into())
    }
}
