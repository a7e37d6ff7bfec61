//! Stored values and the shapes lookups return.

use std::fmt;

use bytes::Bytes;
use tracing::warn;

use crate::{EchtError, EchtResult, Name};

/// An opaque value, meaningful only to the caller (e.g. a hosting network name).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Value(Bytes);

impl Value {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for Value {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Bytes> for Value {
    fn from(bytes: Bytes) -> Self {
        Self(bytes)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Bytes::from(bytes))
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(bytes))
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self(Bytes::copy_from_slice(text.as_bytes()))
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Self(Bytes::from(text.into_bytes()))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", String::from_utf8_lossy(&self.0))
    }
}

// =============================================================================
// ValueSet
// =============================================================================

/// Values stored under one name.
///
/// Insertion de-duplicates by byte equality and keeps the order in which each
/// value was first seen.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct ValueSet {
    values: Vec<Value>,
}

/// The legacy lookup shape: a lone value is handed out by itself, anything
/// else as the whole collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collapsed<'a> {
    One(&'a Value),
    Many(&'a [Value]),
}

impl ValueSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values<'a>(values: impl IntoIterator<Item = &'a Value>) -> Self {
        let mut set = Self::new();
        set.union(values);
        set
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.values.contains(value)
    }

    /// Append `value` unless already present. Returns whether it was added.
    pub fn insert(&mut self, value: Value) -> bool {
        if self.contains(&value) {
            return false;
        }
        self.values.push(value);
        true
    }

    /// Append every value not already present. Returns how many were added.
    pub fn union<'a>(&mut self, values: impl IntoIterator<Item = &'a Value>) -> usize {
        let mut added = 0;
        for value in values {
            if self.insert(value.clone()) {
                added += 1;
            }
        }
        added
    }

    /// Returns whether `value` was present.
    pub fn remove(&mut self, value: &Value) -> bool {
        match self.values.iter().position(|v| v == value) {
            Some(idx) => {
                self.values.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.values
    }

    pub fn collapse(&self) -> Collapsed<'_> {
        match self.values.as_slice() {
            [one] => Collapsed::One(one),
            many => Collapsed::Many(many),
        }
    }

    /// Apply `removal` to the values stored under `name`, all or nothing.
    pub(crate) fn apply_removal(&mut self, name: &Name, removal: Removal<'_>) -> EchtResult<()> {
        let targets = match removal {
            Removal::All => {
                self.clear();
                return Ok(());
            }
            Removal::Values(targets) => targets,
        };
        if let Some(missing) = targets.iter().find(|v| !self.contains(v)) {
            warn!(name = %name, value = ?missing, "refusing to remove a value that is not stored");
            return Err(EchtError::ValueNotPresent {
                name: name.clone(),
                value: missing.clone(),
            });
        }
        for target in targets {
            self.remove(target);
        }
        Ok(())
    }
}

impl fmt::Debug for ValueSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.values.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a ValueSet {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Value> for ValueSet {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

// =============================================================================
// Entries and lookup results
// =============================================================================

/// A name together with the values to store under it, as fed to bulk loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: Name,
    pub values: Vec<Value>,
}

impl Entry {
    pub fn new(name: Name, values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            name,
            values: values.into_iter().collect(),
        }
    }
}

/// Which values `remove` takes away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal<'a> {
    All,
    Values(&'a [Value]),
}

/// The answer to a longest-prefix-match query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixMatch<'a> {
    /// The stored name that matched; always a prefix of the query.
    pub prefix: Name,
    pub values: &'a ValueSet,
}
