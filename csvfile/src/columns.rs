//! Column keys, the active column-name set and its narrowing rules.
//!
//! A column is addressed either by its position in the raw row or, once a
//! header has been adopted, by a header-derived name. The active set always
//! resolves down to `original position -> output name`; names are only a
//! layer over the positions of the raw row.

use std::collections::HashMap;
use std::fmt;

use crate::error::{ConfigError, ConfigResult};

/// Identifies a source column in a caller mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnKey {
    /// Position in the raw row.
    Index(usize),
    /// Name from the active column-name set (usually a header value).
    Name(String),
}

impl ColumnKey {
    /// Parse a textual key; all-digit keys become positions.
    pub fn parse(key: &str) -> Self {
        match key.parse::<usize>() {
            Ok(index) if key.chars().all(|c| c.is_ascii_digit()) => ColumnKey::Index(index),
            _ => ColumnKey::Name(key.to_string()),
        }
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKey::Index(index) => write!(f, "{}", index),
            ColumnKey::Name(name) => f.write_str(name),
        }
    }
}

impl From<usize> for ColumnKey {
    fn from(index: usize) -> Self {
        ColumnKey::Index(index)
    }
}

impl From<&str> for ColumnKey {
    fn from(name: &str) -> Self {
        ColumnKey::Name(name.to_string())
    }
}

impl From<String> for ColumnKey {
    fn from(name: String) -> Self {
        ColumnKey::Name(name)
    }
}

/// A caller-supplied mapping from column keys to output field names.
///
/// Keys are unique: inserting an existing key replaces its target but keeps
/// its original place in the mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    entries: Vec<(ColumnKey, String)>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<ColumnKey>, target: impl Into<String>) {
        let key = key.into();
        let target = target.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = target,
            None => self.entries.push((key, target)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ColumnKey, &str)> {
        self.entries.iter().map(|(k, v)| (k, v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for ColumnMapping
where
    K: Into<ColumnKey>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut mapping = ColumnMapping::new();
        for (key, target) in iter {
            mapping.insert(key, target);
        }
        mapping
    }
}

/// The active column-name set: original position -> output field name.
///
/// Entries are kept ordered by position with at most one name per position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnNames {
    entries: Vec<(usize, String)>,
}

impl ColumnNames {
    /// Every value of a header row, keyed by its position.
    pub fn from_header<I>(values: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            entries: values.into_iter().enumerate().collect(),
        }
    }

    /// Adopt a first mapping verbatim. Only positional keys can be resolved
    /// without a header.
    pub fn from_mapping(mapping: &ColumnMapping) -> ConfigResult<Self> {
        let mut pairs = Vec::with_capacity(mapping.len());
        let mut unresolved = Vec::new();

        for (key, target) in mapping.iter() {
            match key {
                ColumnKey::Index(index) => pairs.push((*index, target.to_string())),
                ColumnKey::Name(name) => unresolved.push(name.clone()),
            }
        }

        if !unresolved.is_empty() {
            return Err(ConfigError::UnknownColumn { columns: unresolved });
        }

        Ok(Self::from_pairs(pairs))
    }

    fn from_pairs(pairs: Vec<(usize, String)>) -> Self {
        let mut entries: Vec<(usize, String)> = Vec::with_capacity(pairs.len());
        for (position, name) in pairs {
            match entries.iter_mut().find(|(p, _)| *p == position) {
                Some(entry) => entry.1 = name,
                None => entries.push((position, name)),
            }
        }
        entries.sort_by_key(|(position, _)| *position);
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Output name of an original position, if that position is mapped.
    pub fn get(&self, position: usize) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| *p == position)
            .map(|(_, name)| name.as_str())
    }

    /// Original position currently published under `name`. With duplicate
    /// names the last position wins.
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .rev()
            .find(|(_, n)| n == name)
            .map(|(position, _)| *position)
    }

    pub fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().map(|(position, _)| *position)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, name)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.entries.iter().map(|(p, n)| (*p, n.as_str()))
    }
}

/// Narrow an active column-name set with a new mapping.
///
/// Keys of `mapping` are matched against the names `existing` publishes, not
/// against positions. Every matched key keeps the original position of its
/// column and takes the new target name; columns not referenced by `mapping`
/// are dropped. Any key that matches nothing makes the whole call fail.
pub fn narrow(existing: &ColumnNames, mapping: &ColumnMapping) -> ConfigResult<ColumnNames> {
    let mut lookup: HashMap<&str, usize> = HashMap::with_capacity(existing.len());
    for (position, name) in existing.iter() {
        lookup.insert(name, position);
    }

    let mut pairs = Vec::with_capacity(mapping.len());
    let mut missing = Vec::new();

    for (key, target) in mapping.iter() {
        let name = key.to_string();
        match lookup.get(name.as_str()) {
            Some(position) => pairs.push((*position, target.to_string())),
            None => missing.push(name),
        }
    }

    if !missing.is_empty() {
        return Err(ConfigError::UnknownColumn { columns: missing });
    }

    Ok(ColumnNames::from_pairs(pairs))
}

/// Argument accepted by `skip_to_column`. Only integers are valid; text and
/// floats are rejected even when they look like a number.
pub trait ColumnIndexArg {
    fn to_column_index(&self) -> ConfigResult<i64>;
}

macro_rules! impl_column_index_arg {
    ($($ty:ty),*) => {
        $(
            impl ColumnIndexArg for $ty {
                fn to_column_index(&self) -> ConfigResult<i64> {
                    i64::try_from(*self)
                        .map_err(|_| ConfigError::InvalidColumnIndex(self.to_string()))
                }
            }
        )*
    };
}

impl_column_index_arg!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl ColumnIndexArg for &str {
    fn to_column_index(&self) -> ConfigResult<i64> {
        Err(ConfigError::InvalidColumnIndex(self.to_string()))
    }
}

impl ColumnIndexArg for String {
    fn to_column_index(&self) -> ConfigResult<i64> {
        Err(ConfigError::InvalidColumnIndex(self.clone()))
    }
}

impl ColumnIndexArg for f64 {
    fn to_column_index(&self) -> ConfigResult<i64> {
        Err(ConfigError::InvalidColumnIndex(self.to_string()))
    }
}
