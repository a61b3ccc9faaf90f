//! Error types for the tessella table-finding pipeline.

use thiserror::Error;

/// Primary error type for table-finding operations.
///
/// Every error is terminal for the current call; the pipeline never
/// returns a partial table list alongside an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("{field} must be non-negative, got {value}")]
    InvalidSettings { field: &'static str, value: f64 },

    #[error("page is {state}, expected primitives to be extracted")]
    InvalidPageState { state: &'static str },

    #[error("a page is required when extract_text is true")]
    MissingPage,

    #[error("table search cancelled")]
    Cancelled,
}

/// Convenience Result type alias for TableError.
pub type Result<T> = std::result::Result<T, TableError>;
