//! Simple BTreeMap-based backend as a baseline.
//!
//! Full names map straight to their value sets. There is no prefix sharing,
//! so longest-prefix matching probes every prefix of the query, longest
//! first. It's not as compact as a trie, but it's obviously correct and gives
//! the trie backends something to be compared against.

use std::collections::btree_map;
use std::collections::BTreeMap;

use tracing::trace;

use crate::encoding::{bytes_size, encode_bytes, encode_varint, varint_size};
use crate::{EchtResult, Name, PrefixMatch, Removal, TrieStats, Value, ValueSet};

/// Flat name → value set dictionary.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    map: BTreeMap<Name, ValueSet>,
    stats: TrieStats,
}

impl Dictionary {
    /// Create a new empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Counters; `total_nodes` counts entries created.
    pub fn stats(&self) -> TrieStats {
        self.stats
    }

    /// Merge `values` into the entry for `key`.
    pub fn add(&mut self, key: &Name, values: &[Value]) {
        self.stats.processed_entries += 1;
        if key.is_empty() {
            trace!("add of the empty name ignored");
            return;
        }
        self.stats.total_components += key.len();
        match self.map.entry(key.clone()) {
            btree_map::Entry::Occupied(mut slot) => {
                slot.get_mut().union(values);
            }
            btree_map::Entry::Vacant(slot) => {
                slot.insert(ValueSet::from_values(values));
                self.stats.total_nodes += 1;
            }
        }
    }

    /// Replace the entry for `key` with exactly `values`.
    pub fn set(&mut self, key: &Name, values: &[Value]) {
        if key.is_empty() {
            trace!("set of the empty name ignored");
            return;
        }
        match self.map.entry(key.clone()) {
            btree_map::Entry::Occupied(mut slot) => {
                slot.insert(ValueSet::from_values(values));
            }
            btree_map::Entry::Vacant(slot) => {
                slot.insert(ValueSet::from_values(values));
                self.stats.total_nodes += 1;
            }
        }
    }

    /// Get the values for an exact name.
    pub fn get(&self, key: &Name) -> Option<&ValueSet> {
        self.map.get(key)
    }

    /// Probe `key` and then each shorter prefix.
    pub fn longest_prefix_match(&self, key: &Name) -> Option<PrefixMatch<'_>> {
        (1..=key.len()).rev().find_map(|len| {
            let prefix = key.prefix(len);
            let values = self.map.get(&prefix).filter(|v| !v.is_empty())?;
            Some(PrefixMatch { prefix, values })
        })
    }

    /// Remove values from an entry, keeping the entry.
    pub fn remove(&mut self, key: &Name, removal: Removal<'_>) -> EchtResult<Option<&ValueSet>> {
        let Some(values) = self.map.get_mut(key) else {
            return Ok(None);
        };
        values.apply_removal(key, removal)?;
        Ok(Some(&*values))
    }

    /// Check if a name is stored.
    pub fn is_entry(&self, key: &Name) -> bool {
        self.map.contains_key(key)
    }

    /// Length of the longest stored name.
    pub fn depth(&self) -> usize {
        self.map.keys().map(Name::len).max().unwrap_or(0)
    }

    /// Entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&Name, &ValueSet)> + '_ {
        self.map.iter()
    }

    /// Size of [`Self::to_canonical_bytes`].
    pub fn approximate_size(&self) -> usize {
        let entries: usize = self
            .map
            .iter()
            .map(|(name, values)| {
                varint_size(name.len() as u64)
                    + name.iter().map(|c| bytes_size(c.len())).sum::<usize>()
                    + varint_size(values.len() as u64)
                    + values.iter().map(|v| bytes_size(v.len())).sum::<usize>()
            })
            .sum();
        varint_size(self.map.len() as u64) + entries
    }

    /// Entry count, then each entry in name order: component count and
    /// length-prefixed components, value count and length-prefixed values.
    pub fn to_canonical_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.approximate_size());
        encode_varint(self.map.len() as u64, &mut buf);
        for (name, values) in &self.map {
            encode_varint(name.len() as u64, &mut buf);
            for component in name {
                encode_bytes(component.as_bytes(), &mut buf);
            }
            encode_varint(values.len() as u64, &mut buf);
            for value in values {
                encode_bytes(value.as_bytes(), &mut buf);
            }
        }
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(uri: &str) -> Name {
        Name::parse(uri).unwrap()
    }

    fn values(items: &[&str]) -> Vec<Value> {
        items.iter().map(|s| Value::from(*s)).collect()
    }

    #[test]
    fn test_dictionary() {
        let mut d = Dictionary::new();

        d.add(&name("/hello"), &values(&["1"]));
        d.add(&name("/hello/world"), &values(&["2"]));

        assert_eq!(d.get(&name("/hello")).unwrap().as_slice(), values(&["1"]));
        assert_eq!(d.get(&name("/hello/world")).unwrap().as_slice(), values(&["2"]));
        assert_eq!(d.get(&name("/foo")), None);
        assert_eq!(d.len(), 2);
        assert_eq!(d.stats().total_nodes, 2);
        assert_eq!(d.stats().total_components, 3);

        d.set(&name("/hello/world"), &values(&["3"]));
        d.set(&name("/bye"), &values(&["4"]));
        assert_eq!(d.stats().total_components, 3);
        assert_eq!(d.stats().total_nodes, 3);
        assert_eq!(d.stats().processed_entries, 2);
    }

    #[test]
    fn test_prefix_probe() {
        let mut d = Dictionary::new();
        d.add(&name("/user"), &values(&["a"]));
        d.add(&name("/user/1001/posts"), &values(&["b"]));

        let hit = d.longest_prefix_match(&name("/user/1001/posts/7")).unwrap();
        assert_eq!(hit.prefix, name("/user/1001/posts"));

        let hit = d.longest_prefix_match(&name("/user/1001")).unwrap();
        assert_eq!(hit.prefix, name("/user"));

        assert_eq!(d.longest_prefix_match(&name("/post")), None);
        assert_eq!(d.longest_prefix_match(&Name::new()), None);
    }

    #[test]
    fn test_canonical_size() {
        let mut d = Dictionary::new();
        assert_eq!(d.to_canonical_bytes(), vec![0]);

        d.add(&name("/a/b"), &values(&["x", "y"]));
        d.add(&name("/c"), &[]);
        assert_eq!(d.approximate_size(), d.to_canonical_bytes().len());
        assert_eq!(d.depth(), 2);
    }
}
