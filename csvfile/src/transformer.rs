//! Row transformation pipeline.
//!
//! [`RowTransformer`] owns every piece of reader configuration and turns a
//! raw row into the row a caller sees. Each call to [`RowTransformer::transform`]
//! runs the same fixed sequence:
//!
//! ```text
//! count -> start column check -> transcode -> key -> restrict -> skip -> shape
//! ```
//!
//! Configuration preconditions:
//!
//! - header adoption must happen before any row is produced;
//! - header adoption must precede `set_column_names` for the mapping to refer
//!   to header names;
//! - skipped columns accumulate and are never cleared; `skip_to_column`
//!   only ever raises the leading-column watermark.

use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::columns::{narrow, ColumnIndexArg, ColumnMapping, ColumnNames};
use crate::encoding::{Transcoder, DEFAULT_ENCODING};
use crate::error::{ConfigError, ConfigResult, RowError};
use crate::row::Row;
use crate::source::RawRow;

/// Configuration state and the transform applied to every produced row.
#[derive(Debug, Clone)]
pub struct RowTransformer {
    encoding: String,
    transcoder: Option<Transcoder>,
    column_names: Option<ColumnNames>,
    columns_to_skip: BTreeSet<usize>,
    /// Every position below this one is skipped.
    skip_before: usize,
    start_column: usize,
    offset_row: usize,
    row_counter: usize,
    pass_counter: usize,
}

impl RowTransformer {
    pub fn new() -> Self {
        Self {
            encoding: DEFAULT_ENCODING.to_string(),
            transcoder: Some(Transcoder::canonical()),
            column_names: None,
            columns_to_skip: BTreeSet::new(),
            skip_before: 0,
            start_column: 0,
            offset_row: 0,
            row_counter: 0,
            pass_counter: 0,
        }
    }

    // -------------------------------------------------------------------------
    // Configuration
    // -------------------------------------------------------------------------

    /// Declare the source charset. Resolved on the next transcoded row.
    pub fn set_encoding(&mut self, label: impl Into<String>) {
        self.encoding = label.into();
        self.transcoder = None;
        debug!(encoding = %self.encoding, "source encoding set");
    }

    /// Install or narrow the active column-name set.
    ///
    /// The first call adopts `mapping` by position. Later calls match keys
    /// against the names currently published and keep only those columns.
    pub fn set_column_names(&mut self, mapping: &ColumnMapping) -> ConfigResult<()> {
        let names = match &self.column_names {
            None => ColumnNames::from_mapping(mapping)?,
            Some(existing) => narrow(existing, mapping)?,
        };

        debug!(columns = names.len(), "column names set");
        self.column_names = Some(names);
        Ok(())
    }

    /// Fails once any row has gone through the transformer.
    pub fn ensure_not_started(&self) -> ConfigResult<()> {
        if self.row_counter != 0 {
            return Err(ConfigError::AlreadyStarted);
        }
        Ok(())
    }

    /// Consume `raw` as the header row: its values become the active
    /// column-name set keyed by original position, and data starts one row
    /// later. Skipped columns are not applied to the header.
    pub fn adopt_header(&mut self, raw: &RawRow) -> Result<(), RowError> {
        let values = self.begin_row(raw)?;
        debug!(columns = values.len(), offset_row = self.offset_row, "header row adopted");

        self.column_names = Some(ColumnNames::from_header(values));
        self.offset_row += 1;
        Ok(())
    }

    pub fn skip_to_row(&mut self, row: usize) {
        self.offset_row = row;
    }

    /// Add original positions to the skip set.
    pub fn skip_columns<I>(&mut self, columns: I)
    where
        I: IntoIterator<Item = usize>,
    {
        self.columns_to_skip.extend(columns);
        debug!(skipped = ?self.columns_to_skip, "columns to skip");
    }

    /// Start from `index`, skipping every column before it. Index 0 skips
    /// column 0.
    pub fn skip_to_column<A: ColumnIndexArg>(&mut self, index: A) -> ConfigResult<()> {
        let index = index.to_column_index()?;
        if index < 0 {
            return Err(ConfigError::NegativeColumnIndex(index));
        }
        let index = usize::try_from(index)
            .map_err(|_| ConfigError::InvalidColumnIndex(index.to_string()))?;

        self.start_column = index;
        self.skip_before = self.skip_before.max(index.max(1));
        debug!(start_column = index, skip_before = self.skip_before, "skip to column");
        Ok(())
    }

    /// Restart the per-pass row index.
    pub fn rewind(&mut self) {
        self.pass_counter = 0;
    }

    // -------------------------------------------------------------------------
    // Transform
    // -------------------------------------------------------------------------

    /// Turn a raw row into the output row.
    pub fn transform(&mut self, raw: &RawRow) -> Result<Row, RowError> {
        let values = self.begin_row(raw)?;
        self.pass_counter += 1;

        let row = match &self.column_names {
            None => Row::Indexed(
                values
                    .into_iter()
                    .enumerate()
                    .filter(|(position, _)| !self.is_skipped(*position))
                    .map(|(_, value)| value)
                    .collect(),
            ),
            Some(names) => {
                let mut values: Vec<Option<String>> = values.into_iter().map(Some).collect();
                let mut row = Row::Named(Vec::with_capacity(names.len()));
                for (position, name) in names.iter() {
                    if self.is_skipped(position) {
                        continue;
                    }
                    // Rows shorter than the column set simply lack the field.
                    if let Some(value) = values.get_mut(position).and_then(Option::take) {
                        row.push_named(name.to_string(), value);
                    }
                }
                row
            }
        };

        trace!(row = self.pass_counter - 1, fields = row.len(), "row transformed");
        Ok(row)
    }

    /// Whether the column at original `position` is left out of data rows.
    pub fn is_skipped(&self, position: usize) -> bool {
        position < self.skip_before || self.columns_to_skip.contains(&position)
    }

    /// Count the row, check the start column and transcode every field.
    fn begin_row(&mut self, raw: &RawRow) -> Result<Vec<String>, RowError> {
        self.row_counter += 1;

        if self.start_column >= raw.len() {
            return Err(RowError::ColumnRange {
                start: self.start_column,
                min: 0,
                max: raw.len().saturating_sub(1),
            });
        }

        let transcoder = self.transcoder()?;
        Ok(raw.iter().map(|field| transcoder.decode(field)).collect())
    }

    fn transcoder(&mut self) -> Result<Transcoder, RowError> {
        if let Some(transcoder) = self.transcoder {
            return Ok(transcoder);
        }
        let transcoder = Transcoder::for_label(&self.encoding)?;
        self.transcoder = Some(transcoder);
        Ok(transcoder)
    }

    // -------------------------------------------------------------------------
    // State
    // -------------------------------------------------------------------------

    /// Zero-based index of the last data row produced in the current pass.
    /// Restarts on [`rewind`](Self::rewind); the header row is never counted.
    pub fn row_key(&self) -> Option<usize> {
        self.pass_counter.checked_sub(1)
    }

    /// Rows pulled through the transformer since construction, header included.
    pub fn rows_read(&self) -> usize {
        self.row_counter
    }

    pub fn offset_row(&self) -> usize {
        self.offset_row
    }

    pub fn start_column(&self) -> usize {
        self.start_column
    }

    pub fn column_names(&self) -> Option<&ColumnNames> {
        self.column_names.as_ref()
    }

    pub fn columns_to_skip(&self) -> &BTreeSet<usize> {
        &self.columns_to_skip
    }
}

impl Default for RowTransformer {
    fn default() -> Self {
        Self::new()
    }
}
