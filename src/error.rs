//! Error type shared by every loader, transformation and writer in the crate.

use thiserror::Error;

/// Errors surfaced to the caller of any post-processing operation.
///
/// Nothing is retried or recovered internally: a failing call returns one of
/// these and produces no partial output.
#[derive(Debug, Error)]
pub enum Error {
    /// A run root or one of its expected files does not exist.
    #[error("missing file: {location}")]
    MissingFile { location: String },

    /// A required source column is absent from a loaded table.
    #[error("missing column `{column}` in {table}")]
    MissingColumn { table: String, column: String },

    /// A required value is malformed or out of range.
    #[error("invalid data in row {row}: {message}")]
    Validation { row: usize, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn missing_file(location: impl ToString) -> Self {
        Error::MissingFile {
            location: location.to_string(),
        }
    }

    pub fn missing_column(table: &str, column: &str) -> Self {
        Error::MissingColumn {
            table: table.to_string(),
            column: column.to_string(),
        }
    }

    pub fn validation(row: usize, message: impl Into<String>) -> Self {
        Error::Validation {
            row,
            message: message.into(),
        }
    }
}

/// Alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
