//! Charset handling: label resolution, field transcoding and detection.
//!
//! Every row is normalized to UTF-8 before any other transformation. Source
//! charsets are named by label (`"windows-1251"`, `"cp1251"`, `"latin1"`, ...)
//! and resolved through `encoding_rs`.

use encoding_rs::{Encoding, UTF_8};

use crate::error::RowError;

/// The charset every row is normalized to.
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Resolve a charset label to an `encoding_rs` encoding.
///
/// Besides the WHATWG labels, spellings with separators such as `cp-1251`
/// or `latin-1` are accepted.
pub fn resolve_encoding(label: &str) -> Option<&'static Encoding> {
    let label = label.trim().to_lowercase();
    Encoding::for_label(label.as_bytes()).or_else(|| {
        let compact: String = label.chars().filter(|c| *c != '-' && *c != '_').collect();
        Encoding::for_label(compact.as_bytes())
    })
}

/// Whether a label names the canonical charset.
pub fn is_canonical(label: &str) -> bool {
    let label = label.trim();
    label.eq_ignore_ascii_case(DEFAULT_ENCODING) || resolve_encoding(label) == Some(UTF_8)
}

/// Decodes raw field bytes from a declared source charset into UTF-8.
#[derive(Debug, Clone, Copy)]
pub struct Transcoder {
    encoding: Option<&'static Encoding>,
}

impl Transcoder {
    /// Transcoder for a source label. Fails for labels that name no charset.
    pub fn for_label(label: &str) -> Result<Self, RowError> {
        if is_canonical(label) {
            return Ok(Self::canonical());
        }

        resolve_encoding(label)
            .map(|encoding| Self { encoding: Some(encoding) })
            .ok_or_else(|| RowError::UnknownEncoding(label.to_string()))
    }

    /// Pass-through transcoder for data that already is UTF-8.
    pub fn canonical() -> Self {
        Self { encoding: None }
    }

    pub fn is_canonical(&self) -> bool {
        self.encoding.is_none()
    }

    /// Decode one field. Invalid sequences become U+FFFD.
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self.encoding {
            None => String::from_utf8_lossy(bytes).into_owned(),
            Some(encoding) => encoding.decode_without_bom_handling(bytes).0.into_owned(),
        }
    }
}

impl Default for Transcoder {
    fn default() -> Self {
        Self::canonical()
    }
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => DEFAULT_ENCODING.to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        "windows-1251" | "cp1251" => "windows-1251".to_string(),
        other => other.to_string(),
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}
