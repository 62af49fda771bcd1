//! # csvfile - CSV rows with headers, renaming and column skipping
//!
//! `csvfile` reads a CSV file row by row and reshapes each row on the way
//! out: the first row can serve as the header, columns can be renamed or
//! narrowed to a subset, skipped by position, and the whole file can be
//! normalized from a legacy charset to UTF-8.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌────────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│  CsvSource  │────▶│ RowTransformer │────▶│     Row     │
//! │ (any enc.)  │     │ (tokenizer) │     │ (name + skip)  │     │ (UTF-8)     │
//! └─────────────┘     └─────────────┘     └────────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use csvfile::CsvFile;
//!
//! let mut csv = CsvFile::open("people.csv")?;
//! csv.use_first_row_as_header()?;
//! csv.set_column_names([("Last Name", "lname"), ("Address", "address")])?;
//!
//! for row in csv.to_array()? {
//!     println!("{:?}", row.get("lname"));
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`columns`] - Column keys, column-name sets and narrowing
//! - [`encoding`] - Charset resolution, transcoding and detection
//! - [`transformer`] - The row transformation pipeline
//! - [`source`] - Tokenizer-backed raw row source
//! - [`reader`] - `CsvFile`, iteration and materialization
//! - [`options`] - Serializable reader configuration

// Core modules
pub mod error;
pub mod row;

// Columns and charsets
pub mod columns;
pub mod encoding;

// Transformation
pub mod transformer;

// Reading
pub mod reader;
pub mod source;

// Configuration
pub mod options;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ConfigError, Error, Result, RowError, SourceError};

// =============================================================================
// Re-exports - Reader
// =============================================================================

pub use reader::{CsvFile, Rows};
pub use row::Row;
pub use source::{CsvSource, Dialect, RawRow, RowSource};

// =============================================================================
// Re-exports - Columns and transformation
// =============================================================================

pub use columns::{narrow, ColumnIndexArg, ColumnKey, ColumnMapping, ColumnNames};
pub use transformer::RowTransformer;

// =============================================================================
// Re-exports - Encoding
// =============================================================================

pub use encoding::{detect_delimiter, detect_encoding, Transcoder, DEFAULT_ENCODING};

// =============================================================================
// Re-exports - Options
// =============================================================================

pub use options::{OptionsError, ReaderOptions};
