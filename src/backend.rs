//! The operation set shared by every lookup structure.
//!
//! Callers (a service loop, the benchmark harness) are written once against
//! [`Backend`]; [`BackendKind`] picks the concrete structure when it is built.

use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;

use tracing::debug;

use crate::{
    ComponentTrie, Dictionary, EchtError, EchtResult, Entry, Keying, LoadRecord, MetricsSink,
    Name, NamedTrie, PrefixMatch, Removal, TextTrie, TrieStats, Value, ValueSet,
};

// =============================================================================
// Selection and configuration
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BackendKind {
    /// Trie over raw binary name components.
    Named,
    /// Trie over UTF-8 text components.
    Text,
    /// Flat map from whole names, no prefix sharing.
    Dictionary,
}

/// How a backend sees name components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyingStrategy {
    Utf,
    Named,
}

impl BackendKind {
    pub const ALL: [BackendKind; 3] = [
        BackendKind::Named,
        BackendKind::Text,
        BackendKind::Dictionary,
    ];

    /// Stable identity, used to label measurements.
    pub fn name(self) -> &'static str {
        match self {
            BackendKind::Named => "ECHT",
            BackendKind::Text => "ComponentTextTrie",
            BackendKind::Dictionary => "SimpleDictionary",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            BackendKind::Named => "Encoded Component Hashed Trie",
            BackendKind::Text => "Component Text Trie",
            BackendKind::Dictionary => "Simple Dictionary",
        }
    }

    pub fn keying(self) -> KeyingStrategy {
        match self {
            BackendKind::Named | BackendKind::Dictionary => KeyingStrategy::Named,
            BackendKind::Text => KeyingStrategy::Utf,
        }
    }

    pub fn build(self, config: &Config) -> Box<dyn Backend> {
        match self {
            BackendKind::Named => Box::new(NamedTrie::with_config(config)),
            BackendKind::Text => Box::new(TextTrie::with_config(config)),
            BackendKind::Dictionary => Box::new(Dictionary::new()),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackendKind {
    type Err = EchtError;

    fn from_str(s: &str) -> EchtResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "echt" | "named" => Ok(BackendKind::Named),
            "text" | "utf" | "componenttexttrie" => Ok(BackendKind::Text),
            "dictionary" | "simple" | "simpledictionary" => Ok(BackendKind::Dictionary),
            _ => Err(EchtError::UnknownBackend(s.into())),
        }
    }
}

/// Configuration handed to backend constructors and the bulk loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub backend: BackendKind,
    /// Initial capacity of the trie root's child map.
    pub root_capacity: usize,
    /// Entries per bulk-load batch; `0` loads everything as one batch.
    pub load_batch_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::Named,
            root_capacity: 0,
            load_batch_size: 10_000,
        }
    }
}

impl Config {
    /// Build the backend this configuration selects.
    pub fn build(&self) -> Box<dyn Backend> {
        self.backend.build(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Nothing has ever been stored.
    Empty,
    /// At least one name was stored. Removal and compaction never go back.
    Populated,
}

// =============================================================================
// The contract
// =============================================================================

/// A name → value-set lookup structure.
///
/// Every operation is synchronous. Implementations are not safe for
/// concurrent mutation; callers serialize access to one instance.
pub trait Backend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Stable identity of the concrete backend, used to label measurements.
    fn describe(&self) -> &'static str {
        self.kind().name()
    }

    /// Union-merge `values` into the entry for `key`. The empty name is a no-op.
    fn add(&mut self, key: &Name, values: &[Value]);

    /// Overwrite the entry for `key` with `values`. The empty name is a no-op.
    fn set(&mut self, key: &Name, values: &[Value]);

    fn get(&self, key: &Name) -> Option<&ValueSet>;

    fn longest_prefix_match(&self, key: &Name) -> Option<PrefixMatch<'_>>;

    /// `Ok(None)` if `key` is not an entry. Otherwise the remaining values.
    fn remove(&mut self, key: &Name, removal: Removal<'_>) -> EchtResult<Option<&ValueSet>>;

    fn is_entry(&self, key: &Name) -> bool;

    /// Serialized footprint, for reporting only.
    fn approximate_size(&self) -> usize;

    fn stats(&self) -> TrieStats;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn depth(&self) -> usize;

    fn entries(&self) -> Box<dyn Iterator<Item = (Name, &ValueSet)> + '_>;

    /// Adds of the empty name store nothing and leave a backend `Empty`.
    fn lifecycle(&self) -> Lifecycle {
        if self.stats().total_nodes == 0 {
            Lifecycle::Empty
        } else {
            Lifecycle::Populated
        }
    }

    /// Drop structure that no longer holds values. Returns what was pruned.
    fn compact(&mut self) -> EchtResult<usize> {
        Err(EchtError::Unsupported {
            backend: self.kind(),
            operation: "compact",
        })
    }

    /// `add` every entry in order and report the batch to `sink`.
    fn bulk_load(&mut self, entries: &[Entry], sink: &mut dyn MetricsSink) -> usize {
        let started = SystemTime::now();
        for entry in entries {
            self.add(&entry.name, &entry.values);
        }
        let finished = SystemTime::now();
        let record = LoadRecord {
            backend: self.kind(),
            batch_size: entries.len(),
            started,
            finished,
        };
        debug!(
            backend = %record.backend,
            batch_size = record.batch_size,
            elapsed = ?record.duration(),
            "bulk load batch applied"
        );
        sink.record_load(record);
        entries.len()
    }
}

impl<S: Keying> Backend for ComponentTrie<S> {
    fn kind(&self) -> BackendKind {
        S::KIND
    }

    fn add(&mut self, key: &Name, values: &[Value]) {
        ComponentTrie::add(self, key, values)
    }

    fn set(&mut self, key: &Name, values: &[Value]) {
        ComponentTrie::set(self, key, values)
    }

    fn get(&self, key: &Name) -> Option<&ValueSet> {
        ComponentTrie::get(self, key)
    }

    fn longest_prefix_match(&self, key: &Name) -> Option<PrefixMatch<'_>> {
        ComponentTrie::longest_prefix_match(self, key)
    }

    fn remove(&mut self, key: &Name, removal: Removal<'_>) -> EchtResult<Option<&ValueSet>> {
        ComponentTrie::remove(self, key, removal)
    }

    fn is_entry(&self, key: &Name) -> bool {
        ComponentTrie::is_entry(self, key)
    }

    fn approximate_size(&self) -> usize {
        ComponentTrie::approximate_size(self)
    }

    fn stats(&self) -> TrieStats {
        ComponentTrie::stats(self)
    }

    fn len(&self) -> usize {
        ComponentTrie::len(self)
    }

    fn depth(&self) -> usize {
        ComponentTrie::depth(self)
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (Name, &ValueSet)> + '_> {
        Box::new(ComponentTrie::entries(self))
    }

    fn compact(&mut self) -> EchtResult<usize> {
        Ok(ComponentTrie::compact(self))
    }
}

impl Backend for Dictionary {
    fn kind(&self) -> BackendKind {
        BackendKind::Dictionary
    }

    fn add(&mut self, key: &Name, values: &[Value]) {
        Dictionary::add(self, key, values)
    }

    fn set(&mut self, key: &Name, values: &[Value]) {
        Dictionary::set(self, key, values)
    }

    fn get(&self, key: &Name) -> Option<&ValueSet> {
        Dictionary::get(self, key)
    }

    fn longest_prefix_match(&self, key: &Name) -> Option<PrefixMatch<'_>> {
        Dictionary::longest_prefix_match(self, key)
    }

    fn remove(&mut self, key: &Name, removal: Removal<'_>) -> EchtResult<Option<&ValueSet>> {
        Dictionary::remove(self, key, removal)
    }

    fn is_entry(&self, key: &Name) -> bool {
        Dictionary::is_entry(self, key)
    }

    fn approximate_size(&self) -> usize {
        Dictionary::approximate_size(self)
    }

    fn stats(&self) -> TrieStats {
        Dictionary::stats(self)
    }

    fn len(&self) -> usize {
        Dictionary::len(self)
    }

    fn depth(&self) -> usize {
        Dictionary::depth(self)
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (Name, &ValueSet)> + '_> {
        Box::new(self.iter().map(|(name, values)| (name.clone(), values)))
    }
}
