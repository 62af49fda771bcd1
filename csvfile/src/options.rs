//! Reader options: the whole reader configuration as one serializable value.
//!
//! Options are applied in the order the reader expects them: encoding, row
//! offset, start column, header, column names and finally skipped columns.
//!
//! ```json
//! {
//!   "delimiter": ";",
//!   "encoding": "windows-1251",
//!   "header": true,
//!   "columns": { "Last Name": "lname", "Address": "address" }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::columns::ColumnKey;
use crate::error::{Result, SourceResult};
use crate::reader::CsvFile;
use crate::source::{CsvSource, Dialect, RowSource};

/// Errors loading an options file.
#[derive(Error, Debug)]
pub enum OptionsError {
    #[error("Failed to read options file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid options JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Everything needed to open and configure a [`CsvFile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderOptions {
    /// Field delimiter.
    pub delimiter: char,

    /// Quote character around fields.
    pub enclosure: char,

    /// Escape character inside quoted fields.
    pub escape: char,

    /// Source charset label, UTF-8 when absent.
    pub encoding: Option<String>,

    /// Use the first data row as header.
    pub header: bool,

    /// Row at which data (or the header) starts.
    pub skip_to_row: Option<usize>,

    /// Column at which data starts.
    pub skip_to_column: Option<i64>,

    /// Columns dropped from every data row, by raw position.
    pub skip_columns: Vec<usize>,

    /// Column renames. All-digit keys are positions.
    pub columns: BTreeMap<String, String>,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            enclosure: '"',
            escape: '\\',
            encoding: None,
            header: false,
            skip_to_row: None,
            skip_to_column: None,
            skip_columns: Vec::new(),
            columns: BTreeMap::new(),
        }
    }
}

impl ReaderOptions {
    /// Load options from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> std::result::Result<Self, OptionsError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }

    pub fn dialect(&self) -> SourceResult<Dialect> {
        Dialect::from_chars(self.delimiter, self.enclosure, self.escape)
    }

    /// Open `path` and apply every option.
    pub fn open(&self, path: impl AsRef<Path>) -> Result<CsvFile<CsvSource<File>>> {
        let mut csv = CsvFile::open_with(path, self.dialect()?)?;
        self.apply(&mut csv)?;
        Ok(csv)
    }

    /// Apply the configuration part of the options to an open reader.
    pub fn apply<S: RowSource>(&self, csv: &mut CsvFile<S>) -> Result<()> {
        if let Some(encoding) = &self.encoding {
            csv.set_encoding(encoding.clone());
        }
        if let Some(row) = self.skip_to_row {
            csv.skip_to_row(row)?;
        }
        if let Some(column) = self.skip_to_column {
            csv.skip_to_column(column)?;
        }
        if self.header {
            csv.use_first_row_as_header()?;
        }
        if !self.columns.is_empty() {
            csv.set_column_names(
                self.columns
                    .iter()
                    .map(|(key, target)| (ColumnKey::parse(key), target.clone())),
            )?;
        }
        if !self.skip_columns.is_empty() {
            csv.skip_columns(self.skip_columns.iter().copied());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, Error};
    use crate::row::Row;
    use tempfile::tempdir;

    const INFO: &str = "\
First Name;Last Name;Company Name;Address
John;Doe;Funny Company Name;Addr A
Jane;Dove;Nice Company Name;Addr B
";

    #[test]
    fn test_defaults_match_default_dialect() {
        let options = ReaderOptions::default();
        assert_eq!(options.dialect().unwrap(), Dialect::default());
    }

    #[test]
    fn test_parse_partial_json() {
        let options: ReaderOptions = serde_json::from_str(
            r#"{ "delimiter": ";", "header": true, "columns": { "Address": "address" } }"#,
        )
        .unwrap();

        assert_eq!(options.delimiter, ';');
        assert_eq!(options.enclosure, '"');
        assert!(options.header);
        assert_eq!(options.columns.get("Address").map(String::as_str), Some("address"));
    }

    #[test]
    fn test_apply_header_and_mapping() {
        let options = ReaderOptions {
            delimiter: ';',
            header: true,
            columns: [("Last Name", "lname"), ("Address", "address")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        };

        let mut csv = CsvFile::from_bytes(INFO, options.dialect().unwrap());
        options.apply(&mut csv).unwrap();

        assert_eq!(
            csv.to_array().unwrap(),
            vec![
                Row::named([("lname", "Doe"), ("address", "Addr A")]),
                Row::named([("lname", "Dove"), ("address", "Addr B")]),
            ]
        );
    }

    #[test]
    fn test_apply_positional_mapping_and_skips() {
        let options = ReaderOptions {
            delimiter: ';',
            skip_to_row: Some(1),
            skip_to_column: Some(1),
            skip_columns: vec![2],
            ..Default::default()
        };

        let mut csv = CsvFile::from_bytes(INFO, options.dialect().unwrap());
        options.apply(&mut csv).unwrap();

        assert_eq!(
            csv.to_array().unwrap(),
            vec![Row::indexed(["Doe", "Addr A"]), Row::indexed(["Dove", "Addr B"])]
        );
    }

    #[test]
    fn test_apply_rejects_negative_start_column() {
        let options = ReaderOptions {
            skip_to_column: Some(-1),
            ..Default::default()
        };

        let mut csv = CsvFile::from_bytes(INFO, Dialect::default());
        let err = options.apply(&mut csv).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::NegativeColumnIndex(-1))));
    }

    #[test]
    fn test_open_from_json_file() {
        let dir = tempdir().unwrap();
        let data = dir.path().join("info.csv");
        let config = dir.path().join("options.json");
        std::fs::write(&data, INFO).unwrap();
        std::fs::write(&config, r#"{ "delimiter": ";", "header": true }"#).unwrap();

        let options = ReaderOptions::from_json_file(&config).unwrap();
        let mut csv = options.open(&data).unwrap();
        assert_eq!(csv.count().unwrap(), 2);
    }

    #[test]
    fn test_invalid_json_file() {
        let dir = tempdir().unwrap();
        let config = dir.path().join("options.json");
        std::fs::write(&config, "{ not json").unwrap();

        let err = ReaderOptions::from_json_file(&config).unwrap_err();
        assert!(matches!(err, OptionsError::JsonError(_)));
    }
}
