//! Shared error types for the summarization pipeline

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("missing required field: {field}")]
    MissingField { field: String },

    #[error("field {field} has unexpected type (expected {expected})")]
    FieldType { field: String, expected: &'static str },
}

pub type SharedResult<T> = Result<T, SharedError>;
