//! Error types for sociome.
//!
//! Structural misuse (calling `query` on a join-only function, a missing
//! column, misaligned tables) fails the whole call. Data-quality conditions
//! such as an unmatched subdivision or an empty kernel window are not errors:
//! they become `Value::Null` in the affected row.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SociomeError {
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Column already exists: {0}")]
    DuplicateColumn(String),

    #[error("Shape mismatch: expected {expected} rows, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Expected {expected} geometry at row {row}, found {found}")]
    GeometryKind {
        row: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{0} is not a pointwise function; use eval instead of query")]
    NotPointwise(&'static str),

    #[error("Matcher not configured: {0}")]
    MatcherNotConfigured(String),

    #[error("Column {column} holds non-numeric value at row {row}")]
    NonNumeric { column: String, row: usize },

    #[error("Column {0} has no non-missing values")]
    EmptyColumn(String),

    #[error("Linear solver failed: {0}")]
    Solver(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SociomeError>;
