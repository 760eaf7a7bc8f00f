//! Error types for rowforge-engine

use thiserror::Error;

/// Result type alias using [`EngineError`]
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Errors that can occur while configuring or running a batch
#[derive(Debug, Error)]
pub enum EngineError {
    /// The mapping sheet contains no non-blank rows
    #[error("Mapping sheet appears empty")]
    EmptyMappingSheet,

    /// The named mapping sheet does not exist in the template
    #[error("Mapping sheet not found: {0}")]
    MappingSheetNotFound(String),

    /// No mapping has been loaded into the session
    #[error("No mapping loaded")]
    MappingNotLoaded,

    /// The loaded mapping has no data rows
    #[error("No rows found in mapping sheet")]
    NoRows,

    /// Naming configuration is incomplete
    #[error("Missing naming rule: provide {0}")]
    MissingNamingRule(String),

    /// A target names a sheet that does not exist or is the mapping sheet
    #[error("Invalid target sheet '{sheet}' for header '{header}'")]
    InvalidTargetSheet { header: String, sheet: String },

    /// A target address does not parse as a cell reference
    #[error("Invalid target address '{address}' for header '{header}'")]
    InvalidTargetAddress { header: String, address: String },

    /// Headers without targets were not confirmed by the operator
    #[error("Headers without targets: {0:?}")]
    UnmappedHeaders(Vec<String>),

    /// A header name does not match any mapping column
    #[error("Unknown header: '{0}'")]
    UnknownHeader(String),

    /// Row index out of bounds
    #[error("Row index {0} out of bounds (count: {1})")]
    RowOutOfBounds(usize, usize),

    /// Target index out of bounds for a header
    #[error("Target index {1} out of bounds for header '{0}' (count: {2})")]
    TargetOutOfBounds(String, usize, usize),

    /// Every sink in the chain failed for one output
    #[error("All output sinks failed for '{name}': {reason}")]
    AllSinksFailed { name: String, reason: String },

    /// Workbook serialization failed
    #[error("Serialization failed: {0}")]
    Serialize(String),

    /// Model error
    #[error("Model error: {0}")]
    Model(#[from] rowforge_model::Error),
}
