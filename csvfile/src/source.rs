//! Raw row source: the CSV tokenizer behind the reader.
//!
//! Quoting, escaping and record splitting are left entirely to the `csv`
//! crate. This module only opens the input, applies the dialect and offers
//! rewind-and-skip positioning by row number.

use std::fs::{self, File};
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use crate::error::{SourceError, SourceResult};

/// One tokenized record, fields still in the source charset.
pub type RawRow = csv::ByteRecord;

/// Supplies raw rows in file order.
pub trait RowSource {
    /// Position the source so that the next row returned is `row` (0-based).
    fn seek(&mut self, row: usize) -> SourceResult<()>;

    /// The next raw row, or `None` at end of input.
    fn next_raw_row(&mut self) -> SourceResult<Option<RawRow>>;
}

/// Delimiter, enclosure and escape characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub delimiter: u8,
    pub enclosure: u8,
    pub escape: u8,
}

impl Dialect {
    /// Build a dialect from characters. The tokenizer works on single bytes,
    /// so every character must be ASCII.
    pub fn from_chars(delimiter: char, enclosure: char, escape: char) -> SourceResult<Self> {
        Ok(Self {
            delimiter: ascii_byte(delimiter)?,
            enclosure: ascii_byte(enclosure)?,
            escape: ascii_byte(escape)?,
        })
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    fn builder(&self) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .quote(self.enclosure)
            .escape(Some(self.escape));
        builder
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            delimiter: b',',
            enclosure: b'"',
            escape: b'\\',
        }
    }
}

fn ascii_byte(c: char) -> SourceResult<u8> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        Err(SourceError::NonAsciiDialect(c))
    }
}

/// `RowSource` over the `csv` crate.
pub struct CsvSource<R> {
    reader: csv::Reader<R>,
}

impl CsvSource<File> {
    /// Open a file. Missing and zero-length files are rejected up front.
    pub fn open(path: impl AsRef<Path>, dialect: Dialect) -> SourceResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SourceError::FileNotFound(path.to_path_buf()));
        }
        if fs::metadata(path)?.len() == 0 {
            return Err(SourceError::EmptyFile(path.to_path_buf()));
        }

        let file = File::open(path)?;
        Ok(Self::from_reader(file, dialect))
    }
}

impl CsvSource<Cursor<Vec<u8>>> {
    /// In-memory source.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>, dialect: Dialect) -> Self {
        Self::from_reader(Cursor::new(bytes.into()), dialect)
    }
}

impl<R: Read + Seek> CsvSource<R> {
    pub fn from_reader(inner: R, dialect: Dialect) -> Self {
        Self {
            reader: dialect.builder().from_reader(inner),
        }
    }
}

impl<R: Read + Seek> RowSource for CsvSource<R> {
    fn seek(&mut self, row: usize) -> SourceResult<()> {
        self.reader.seek(csv::Position::new())?;

        let mut scratch = csv::ByteRecord::new();
        for _ in 0..row {
            if !self.reader.read_byte_record(&mut scratch)? {
                break;
            }
        }
        Ok(())
    }

    fn next_raw_row(&mut self) -> SourceResult<Option<RawRow>> {
        let mut record = csv::ByteRecord::new();
        if self.reader.read_byte_record(&mut record)? {
            Ok(Some(record))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn fields(row: &RawRow) -> Vec<String> {
        row.iter()
            .map(|f| String::from_utf8_lossy(f).into_owned())
            .collect()
    }

    #[test]
    fn test_reads_rows_in_order() {
        let mut source = CsvSource::from_bytes("a,b\n1,2\n", Dialect::default());
        assert_eq!(fields(&source.next_raw_row().unwrap().unwrap()), vec!["a", "b"]);
        assert_eq!(fields(&source.next_raw_row().unwrap().unwrap()), vec!["1", "2"]);
        assert!(source.next_raw_row().unwrap().is_none());
    }

    #[test]
    fn test_seek_rewinds_and_skips() {
        let mut source = CsvSource::from_bytes("r0\nr1\nr2\n", Dialect::default());
        source.next_raw_row().unwrap();
        source.next_raw_row().unwrap();

        source.seek(1).unwrap();
        assert_eq!(fields(&source.next_raw_row().unwrap().unwrap()), vec!["r1"]);

        source.seek(0).unwrap();
        assert_eq!(fields(&source.next_raw_row().unwrap().unwrap()), vec!["r0"]);
    }

    #[test]
    fn test_seek_past_end_yields_nothing() {
        let mut source = CsvSource::from_bytes("r0\nr1\n", Dialect::default());
        source.seek(10).unwrap();
        assert!(source.next_raw_row().unwrap().is_none());
    }

    #[test]
    fn test_quoted_fields_and_custom_delimiter() {
        let dialect = Dialect::default().with_delimiter(b';');
        let mut source = CsvSource::from_bytes("\"Addr 2; 123\";x\n", dialect);
        assert_eq!(
            fields(&source.next_raw_row().unwrap().unwrap()),
            vec!["Addr 2; 123", "x"]
        );
    }

    #[test]
    fn test_rows_of_different_length_are_accepted() {
        let mut source = CsvSource::from_bytes("a,b,c\n1\n", Dialect::default());
        assert_eq!(source.next_raw_row().unwrap().unwrap().len(), 3);
        assert_eq!(source.next_raw_row().unwrap().unwrap().len(), 1);
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempdir().unwrap();
        let err = CsvSource::open(dir.path().join("missing.csv"), Dialect::default())
            .err()
            .unwrap();
        assert!(matches!(err, SourceError::FileNotFound(_)));
    }

    #[test]
    fn test_open_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::File::create(&path).unwrap();

        let err = CsvSource::open(&path, Dialect::default()).err().unwrap();
        assert!(matches!(err, SourceError::EmptyFile(_)));
    }

    #[test]
    fn test_open_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "x,y").unwrap();

        let mut source = CsvSource::open(&path, Dialect::default()).unwrap();
        assert_eq!(fields(&source.next_raw_row().unwrap().unwrap()), vec!["x", "y"]);
    }

    #[test]
    fn test_non_ascii_dialect_is_rejected() {
        let err = Dialect::from_chars('§', '"', '\\').unwrap_err();
        assert!(matches!(err, SourceError::NonAsciiDialect('§')));
    }
}
