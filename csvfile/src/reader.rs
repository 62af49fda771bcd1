//! CSV file reader: iteration over a [`RowSource`] through a [`RowTransformer`].
//!
//! # Example
//!
//! ```rust,ignore
//! use csvfile::CsvFile;
//!
//! let mut csv = CsvFile::open("people.csv")?;
//! csv.use_first_row_as_header()?;
//! csv.set_column_names([("Last Name", "lname"), ("Address", "address")])?;
//!
//! for row in csv.rows() {
//!     let (index, row) = row?;
//!     println!("{}: {:?}", index, row.get("lname"));
//! }
//! ```

use std::fs::File;
use std::io::Cursor;
use std::path::Path;

use tracing::debug;

use crate::columns::{ColumnIndexArg, ColumnKey, ColumnMapping, ColumnNames};
use crate::error::{ConfigResult, Result};
use crate::row::Row;
use crate::source::{CsvSource, Dialect, RowSource};
use crate::transformer::RowTransformer;

/// A CSV file with header, renaming and column skipping applied to every row.
///
/// Not meant to be shared between threads; use one reader per file handle.
pub struct CsvFile<S = CsvSource<File>> {
    source: S,
    transformer: RowTransformer,
}

impl CsvFile<CsvSource<File>> {
    /// Open a file with the default dialect (`,` `"` `\`).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, Dialect::default())
    }

    /// Open a file with a custom dialect.
    pub fn open_with(path: impl AsRef<Path>, dialect: Dialect) -> Result<Self> {
        let path = path.as_ref();
        let source = CsvSource::open(path, dialect)?;
        debug!(path = %path.display(), "opened csv file");
        Ok(Self::from_source(source))
    }
}

impl CsvFile<CsvSource<Cursor<Vec<u8>>>> {
    /// Reader over in-memory CSV data.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>, dialect: Dialect) -> Self {
        Self::from_source(CsvSource::from_bytes(bytes, dialect))
    }
}

impl<S: RowSource> CsvFile<S> {
    pub fn from_source(source: S) -> Self {
        Self {
            source,
            transformer: RowTransformer::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Configuration
    // -------------------------------------------------------------------------

    /// Declare the charset of the file. Rows are converted to UTF-8.
    pub fn set_encoding(&mut self, label: impl Into<String>) {
        self.transformer.set_encoding(label);
    }

    /// Consume the row at the current offset as the header.
    ///
    /// Must be called before any row is read, and before `set_column_names`
    /// if the mapping refers to header names.
    pub fn use_first_row_as_header(&mut self) -> Result<()> {
        self.transformer.ensure_not_started()?;

        self.source.seek(self.transformer.offset_row())?;
        match self.source.next_raw_row()? {
            Some(raw) => self.transformer.adopt_header(&raw)?,
            None => debug!("no header row to adopt"),
        }

        self.rewind()
    }

    /// Map columns to output field names.
    ///
    /// Keys are positions (`1usize`) or, after a header or an earlier mapping,
    /// names currently published (`"Last Name"`). A second call narrows the
    /// earlier one.
    pub fn set_column_names<I, K, V>(&mut self, mapping: I) -> ConfigResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<ColumnKey>,
        V: Into<String>,
    {
        let mapping: ColumnMapping = mapping.into_iter().collect();
        self.transformer.set_column_names(&mapping)
    }

    /// Start data at row `row` (0-based, counted in raw rows).
    pub fn skip_to_row(&mut self, row: usize) -> Result<()> {
        self.transformer.skip_to_row(row);
        self.rewind()
    }

    /// Drop columns by their position in the raw row. Cumulative.
    pub fn skip_columns<I>(&mut self, columns: I)
    where
        I: IntoIterator<Item = usize>,
    {
        self.transformer.skip_columns(columns);
    }

    /// Start at column `index`, dropping all columns before it.
    pub fn skip_to_column<A: ColumnIndexArg>(&mut self, index: A) -> ConfigResult<()> {
        self.transformer.skip_to_column(index)
    }

    // -------------------------------------------------------------------------
    // Iteration
    // -------------------------------------------------------------------------

    /// Go back to the first data row.
    pub fn rewind(&mut self) -> Result<()> {
        let offset = self.transformer.offset_row();
        self.source.seek(offset)?;
        self.transformer.rewind();
        debug!(offset_row = offset, "rewound");
        Ok(())
    }

    /// Read and transform the next row.
    pub fn next_row(&mut self) -> Result<Option<Row>> {
        match self.source.next_raw_row()? {
            Some(raw) => Ok(Some(self.transformer.transform(&raw)?)),
            None => Ok(None),
        }
    }

    /// Zero-based index of the last row returned in the current pass, counted
    /// from the row offset. Every rewind restarts it at 0 and the header row
    /// is never counted.
    pub fn row_key(&self) -> Option<usize> {
        self.transformer.row_key()
    }

    /// Iterate from the first data row. Yields `(row_key, row)`.
    pub fn rows(&mut self) -> Rows<'_, S> {
        Rows {
            file: self,
            state: RowsState::Pending,
        }
    }

    /// Read every row from the first data row on.
    pub fn to_array(&mut self) -> Result<Vec<Row>> {
        self.rows().map(|row| row.map(|(_, row)| row)).collect()
    }

    /// Number of data rows.
    ///
    /// This reads and transforms the whole file, same as `to_array`.
    pub fn count(&mut self) -> Result<usize> {
        Ok(self.to_array()?.len())
    }

    // -------------------------------------------------------------------------
    // State
    // -------------------------------------------------------------------------

    /// The active column-name set, if any.
    pub fn headers(&self) -> Option<&ColumnNames> {
        self.transformer.column_names()
    }

    pub fn transformer(&self) -> &RowTransformer {
        &self.transformer
    }
}

enum RowsState {
    Pending,
    Running,
    Done,
}

/// Iterator returned by [`CsvFile::rows`]. Stops after the first error.
pub struct Rows<'a, S> {
    file: &'a mut CsvFile<S>,
    state: RowsState,
}

impl<S: RowSource> Iterator for Rows<'_, S> {
    type Item = Result<(usize, Row)>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.state {
            RowsState::Done => return None,
            RowsState::Pending => {
                self.state = RowsState::Running;
                if let Err(e) = self.file.rewind() {
                    self.state = RowsState::Done;
                    return Some(Err(e));
                }
            }
            RowsState::Running => {}
        }

        match self.file.next_row() {
            Ok(Some(row)) => {
                let key = self.file.row_key().unwrap_or_default();
                Some(Ok((key, row)))
            }
            Ok(None) => {
                self.state = RowsState::Done;
                None
            }
            Err(e) => {
                self.state = RowsState::Done;
                Some(Err(e))
            }
        }
    }
}
