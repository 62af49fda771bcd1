//! Error types for the CSV reader.
//!
//! The hierarchy follows the point at which a failure can happen:
//!
//! - [`SourceError`] - opening and tokenizing the underlying file
//! - [`ConfigError`] - rejected configuration calls
//! - [`RowError`] - failures raised lazily while a row is transformed
//! - [`Error`] - top-level error wrapping all of the above
//!
//! Conversion is automatic via `From` implementations, so `?` works across
//! layers.

use std::path::PathBuf;

use thiserror::Error;

// =============================================================================
// Source Errors
// =============================================================================

/// Errors from opening or reading the underlying CSV source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The file does not exist.
    #[error("File {} does not exist", .0.display())]
    FileNotFound(PathBuf),

    /// The file exists but has zero length.
    #[error("Empty file: {}", .0.display())]
    EmptyFile(PathBuf),

    /// Delimiter, enclosure and escape must be single ASCII characters.
    #[error("Dialect character '{0}' is not ASCII")]
    NonAsciiDialect(char),

    /// Failed to read or rewind the source.
    #[error("Failed to read source: {0}")]
    Io(#[from] std::io::Error),

    /// The tokenizer rejected a record.
    #[error("Invalid CSV record: {0}")]
    Csv(#[from] csv::Error),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// A configuration call was rejected. Prior configuration is left unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Some requested columns are not present in the active column-name set.
    #[error("The following column(s) are not present in the source file: {}", .columns.join(", "))]
    UnknownColumn { columns: Vec<String> },

    /// Header or column mapping changed after rows were produced.
    #[error("Column mapping can't be changed after CSV processing has been started")]
    AlreadyStarted,

    /// `skip_to_column` was given something that is not an integer.
    #[error("Only numbers are allowed for skip to column, got '{0}'")]
    InvalidColumnIndex(String),

    /// `skip_to_column` was given a negative integer.
    #[error("Please use numbers larger than zero for skip to column, got {0}")]
    NegativeColumnIndex(i64),
}

// =============================================================================
// Row Errors
// =============================================================================

/// Errors raised while a row passes through the transformer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowError {
    /// The start column is not a position of the current row.
    #[error("Start column {start} must be between {min} and {max}")]
    ColumnRange { start: usize, min: usize, max: usize },

    /// The declared source encoding is not a known charset label.
    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),
}

// =============================================================================
// Top-level Error
// =============================================================================

/// Any error surfaced by [`crate::CsvFile`].
#[derive(Debug, Error)]
pub enum Error {
    /// Source error.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Row error.
    #[error(transparent)]
    Row(#[from] RowError),
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Source(SourceError::Csv(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Source(SourceError::Io(err))
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for source operations.
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Result type for configuration calls.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type for reader operations.
pub type Result<T> = std::result::Result<T, Error>;
