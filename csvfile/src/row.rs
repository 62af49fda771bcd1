//! The row a caller observes.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// One output row.
///
/// Without a column-name set rows are plain ordered values; once names are
/// in use they are ordered `(name, value)` pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    Indexed(Vec<String>),
    Named(Vec<(String, String)>),
}

impl Row {
    /// Build an indexed row.
    pub fn indexed<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Row::Indexed(values.into_iter().map(Into::into).collect())
    }

    /// Build a named row. A repeated name overwrites the earlier value in
    /// place.
    pub fn named<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut row = Row::Named(Vec::new());
        for (name, value) in fields {
            row.push_named(name.into(), value.into());
        }
        row
    }

    pub(crate) fn push_named(&mut self, name: String, value: String) {
        if let Row::Named(fields) = self {
            match fields.iter_mut().find(|(n, _)| *n == name) {
                Some(field) => field.1 = value,
                None => fields.push((name, value)),
            }
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Row::Indexed(values) => values.len(),
            Row::Named(fields) => fields.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_named(&self) -> bool {
        matches!(self, Row::Named(_))
    }

    /// Value by output name. Always `None` for indexed rows.
    pub fn get(&self, name: &str) -> Option<&str> {
        match self {
            Row::Indexed(_) => None,
            Row::Named(fields) => fields
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str()),
        }
    }

    /// Value by output position (after skipping).
    pub fn get_index(&self, index: usize) -> Option<&str> {
        match self {
            Row::Indexed(values) => values.get(index).map(String::as_str),
            Row::Named(fields) => fields.get(index).map(|(_, v)| v.as_str()),
        }
    }

    /// Values in output order, dropping names.
    pub fn values(&self) -> Vec<&str> {
        match self {
            Row::Indexed(values) => values.iter().map(String::as_str).collect(),
            Row::Named(fields) => fields.iter().map(|(_, v)| v.as_str()).collect(),
        }
    }

    /// Output names, empty for indexed rows.
    pub fn names(&self) -> Vec<&str> {
        match self {
            Row::Indexed(_) => Vec::new(),
            Row::Named(fields) => fields.iter().map(|(n, _)| n.as_str()).collect(),
        }
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Row::Indexed(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
            Row::Named(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (name, value) in fields {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
        }
    }
}
