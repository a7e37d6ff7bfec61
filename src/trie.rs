//! The component trie.
//!
//! One node per distinct name prefix ever inserted. Edges are keyed by
//! component (through a [`Keying`] strategy), so names sharing a prefix share
//! the nodes along it. A node is a stored entry iff its terminal marker is
//! present; removal only shrinks the value set and never drops the marker or
//! any node. [`ComponentTrie::compact`] is the only operation that deletes
//! structure.

use std::collections::hash_map;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::mem;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::encoding::{bytes_size, encode_bytes, encode_varint, varint_size};
use crate::{
    BackendKind, BinaryKeying, Config, EchtResult, Keying, Name, PrefixMatch, Removal, Utf8Keying,
    Value, ValueSet,
};

/// Trie over raw binary components.
pub type NamedTrie = ComponentTrie<BinaryKeying>;

/// Trie over UTF-8 text components.
pub type TextTrie = ComponentTrie<Utf8Keying>;

/// Bookkeeping counters. All of them only ever grow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrieStats {
    /// Nodes created, one per new prefix.
    pub total_nodes: usize,
    /// Components walked by `add`, revisits included. `set` walks are not
    /// counted.
    pub total_components: usize,
    /// Completed `add` calls.
    pub processed_entries: usize,
}

#[derive(Clone)]
struct Node<K> {
    children: FxHashMap<K, Node<K>>,
    /// `None`: only ever an intermediate hop. `Some`: a stored entry, possibly
    /// with every value removed.
    terminal: Option<ValueSet>,
}

impl<K> Node<K> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            children: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            terminal: None,
        }
    }

    #[inline]
    fn is_dead(&self) -> bool {
        self.children.is_empty() && self.terminal.as_ref().map_or(true, ValueSet::is_empty)
    }
}

// =============================================================================
// ComponentTrie
// =============================================================================

/// Maps names to value sets with exact and longest-prefix lookups.
///
/// ```rust
/// use echt::{Name, NamedTrie, Value};
///
/// let mut trie = NamedTrie::new();
/// let host: Name = "/org/dept/host".parse().unwrap();
/// trie.add(&host, &[Value::from("/AS2")]);
///
/// let query: Name = "/org/dept/host/extra".parse().unwrap();
/// let hit = trie.longest_prefix_match(&query).unwrap();
/// assert_eq!(hit.prefix, host);
/// assert!(trie.get(&query).is_none());
/// ```
#[derive(Clone)]
pub struct ComponentTrie<S: Keying> {
    root: Node<S::Key>,
    /// Nodes whose terminal marker is present.
    len: usize,
    stats: TrieStats,
    _keying: PhantomData<S>,
}

impl<S: Keying> ComponentTrie<S> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_config(config: &Config) -> Self {
        Self::with_capacity(config.root_capacity)
    }

    /// Pre-size the root's child map for `root_capacity` first components.
    pub fn with_capacity(root_capacity: usize) -> Self {
        Self {
            root: Node::with_capacity(root_capacity),
            len: 0,
            stats: TrieStats::default(),
            _keying: PhantomData,
        }
    }

    pub fn kind(&self) -> BackendKind {
        S::KIND
    }

    /// Number of stored entries, including ones whose values were all removed.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn stats(&self) -> TrieStats {
        self.stats
    }

    /// Walk `key` from `root`, creating every missing node on the way.
    fn grow<'t>(
        root: &'t mut Node<S::Key>,
        stats: &mut TrieStats,
        key: &Name,
    ) -> &'t mut Node<S::Key> {
        let mut node = root;
        for component in key {
            node = match node.children.entry(S::encode(component)) {
                hash_map::Entry::Occupied(slot) => slot.into_mut(),
                hash_map::Entry::Vacant(slot) => {
                    stats.total_nodes += 1;
                    slot.insert(Node::with_capacity(0))
                }
            };
        }
        node
    }

    fn find(&self, key: &Name) -> Option<&Node<S::Key>> {
        let mut node = &self.root;
        for component in key {
            node = S::find(&node.children, component)?;
        }
        Some(node)
    }

    fn find_mut(&mut self, key: &Name) -> Option<&mut Node<S::Key>> {
        let mut node = &mut self.root;
        for component in key {
            node = S::find_mut(&mut node.children, component)?;
        }
        Some(node)
    }

    /// Store `values` under `key`, merging with whatever is already there.
    ///
    /// New values are appended in order; values already present are skipped.
    /// The empty name stores nothing.
    pub fn add(&mut self, key: &Name, values: &[Value]) {
        self.stats.processed_entries += 1;
        if key.is_empty() {
            trace!("add of the empty name ignored");
            return;
        }

        self.stats.total_components += key.len();
        let node = Self::grow(&mut self.root, &mut self.stats, key);
        if let Some(existing) = node.terminal.as_mut() {
            existing.union(values);
        } else {
            node.terminal = Some(ValueSet::from_values(values));
            self.len += 1;
        }
    }

    /// Store exactly `values` under `key`, discarding what was there.
    pub fn set(&mut self, key: &Name, values: &[Value]) {
        if key.is_empty() {
            trace!("set of the empty name ignored");
            return;
        }

        let node = Self::grow(&mut self.root, &mut self.stats, key);
        if node.terminal.replace(ValueSet::from_values(values)).is_none() {
            self.len += 1;
        }
    }

    /// Exact-match lookup. `Some` with an empty set means the entry exists but
    /// holds no values.
    pub fn get(&self, key: &Name) -> Option<&ValueSet> {
        self.find(key)?.terminal.as_ref()
    }

    /// The longest stored prefix of `key` that still holds values.
    pub fn longest_prefix_match(&self, key: &Name) -> Option<PrefixMatch<'_>> {
        let mut node = &self.root;
        let mut best: Option<(usize, &ValueSet)> = None;
        for (depth, component) in key.iter().enumerate() {
            match S::find(&node.children, component) {
                Some(child) => node = child,
                None => break,
            }
            if let Some(values) = node.terminal.as_ref().filter(|v| !v.is_empty()) {
                best = Some((depth + 1, values));
            }
        }
        best.map(|(len, values)| PrefixMatch {
            prefix: key.prefix(len),
            values,
        })
    }

    /// Take values away from the entry at `key` and return what is left.
    ///
    /// Returns `Ok(None)` when `key` is not a stored entry. Listing a value the
    /// entry does not hold fails with [`crate::EchtError::ValueNotPresent`] and leaves
    /// the entry untouched. The entry itself stays, even when emptied.
    pub fn remove(&mut self, key: &Name, removal: Removal<'_>) -> EchtResult<Option<&ValueSet>> {
        let Some(values) = self.find_mut(key).and_then(|node| node.terminal.as_mut()) else {
            return Ok(None);
        };

        values.apply_removal(key, removal)?;
        Ok(Some(&*values))
    }

    pub fn is_entry(&self, key: &Name) -> bool {
        self.find(key).is_some_and(|node| node.terminal.is_some())
    }

    /// Length of the longest path from the root.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(&self.root, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.children.values().map(|child| (child, depth + 1)));
        }
        deepest
    }

    /// Nodes currently reachable, the root excluded.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            count += node.children.len();
            stack.extend(node.children.values());
        }
        count
    }

    pub fn entries(&self) -> Entries<'_, S> {
        Entries {
            stack: vec![(Name::new(), &self.root)],
        }
    }

    /// Prune childless nodes that hold no values, bottom-up.
    ///
    /// Entries emptied by `remove` disappear here. Returns the number of nodes
    /// pruned. `stats().total_nodes` is left alone.
    pub fn compact(&mut self) -> usize {
        let (pruned, dropped_entries) = prune(&mut self.root);
        self.len -= dropped_entries;
        debug!(pruned, dropped_entries, kind = %S::KIND, "compacted trie");
        pruned
    }

    /// Footprint of [`Self::to_canonical_bytes`], computed without encoding.
    pub fn approximate_size(&self) -> usize {
        node_size::<S>(&self.root)
    }

    /// Deterministic serialization of the whole node graph.
    ///
    /// Per node: terminal tag (0 absent, 1 present), then for present markers
    /// the value count and each value length-prefixed, then the child count and
    /// each child as length-prefixed key followed by the child node. Children
    /// are sorted by key bytes.
    pub fn to_canonical_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.approximate_size());
        encode_node::<S>(&self.root, &mut buf);
        buf
    }
}

impl<S: Keying> Default for ComponentTrie<S> {
    fn default() -> Self {
        Self::new()
    }
}

// Deep names would otherwise recurse once per level while dropping.
impl<S: Keying> Drop for ComponentTrie<S> {
    fn drop(&mut self) {
        let mut stack = vec![mem::take(&mut self.root.children)];
        while let Some(children) = stack.pop() {
            for (_, mut child) in children {
                stack.push(mem::take(&mut child.children));
            }
        }
    }
}

impl<S: Keying> fmt::Debug for ComponentTrie<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries()).finish()
    }
}

/// A node taken out of the tree, with the children still to visit.
struct Detached<K> {
    key: Option<K>,
    node: Node<K>,
    pending: hash_map::IntoIter<K, Node<K>>,
}

impl<K> Detached<K> {
    fn new(key: Option<K>, mut node: Node<K>) -> Self {
        let pending = mem::take(&mut node.children).into_iter();
        node.children = FxHashMap::with_capacity_and_hasher(pending.len(), Default::default());
        Self { key, node, pending }
    }
}

/// Post-order rebuild of the tree under `root`, leaving out dead nodes.
/// Returns the nodes pruned and how many of them were entries.
fn prune<K: Eq + Hash>(root: &mut Node<K>) -> (usize, usize) {
    let mut pruned = 0;
    let mut dropped_entries = 0;
    let mut stack = vec![Detached::new(None, mem::replace(root, Node::with_capacity(0)))];

    while let Some(top) = stack.last_mut() {
        if let Some((key, child)) = top.pending.next() {
            stack.push(Detached::new(Some(key), child));
            continue;
        }
        let Some(Detached { key, node, .. }) = stack.pop() else {
            break;
        };
        match (key, stack.last_mut()) {
            (Some(key), Some(parent)) => {
                if !node.is_dead() {
                    parent.node.children.insert(key, node);
                    continue;
                }
                pruned += 1;
                if node.terminal.is_some() {
                    dropped_entries += 1;
                }
            }
            _ => *root = node,
        }
    }
    (pruned, dropped_entries)
}

// =============================================================================
// Canonical encoding
// =============================================================================

fn sorted_children<S: Keying>(node: &Node<S::Key>) -> Vec<(&S::Key, &Node<S::Key>)> {
    let mut children: Vec<_> = node.children.iter().collect();
    children.sort_unstable_by(|a, b| S::key_bytes(a.0).cmp(S::key_bytes(b.0)));
    children
}

enum Emit<'a, K> {
    Key(&'a K),
    Node(&'a Node<K>),
}

/// Pre-order: a node, then for each child its key and its subtree.
fn encode_node<S: Keying>(root: &Node<S::Key>, buf: &mut Vec<u8>) {
    let mut stack = vec![Emit::Node(root)];
    while let Some(step) = stack.pop() {
        let node = match step {
            Emit::Key(key) => {
                encode_bytes(S::key_bytes(key), buf);
                continue;
            }
            Emit::Node(node) => node,
        };
        match &node.terminal {
            None => encode_varint(0, buf),
            Some(values) => {
                encode_varint(1, buf);
                encode_varint(values.len() as u64, buf);
                for value in values {
                    encode_bytes(value.as_bytes(), buf);
                }
            }
        }
        encode_varint(node.children.len() as u64, buf);
        for (key, child) in sorted_children::<S>(node).into_iter().rev() {
            stack.push(Emit::Node(child));
            stack.push(Emit::Key(key));
        }
    }
}

fn node_size<S: Keying>(root: &Node<S::Key>) -> usize {
    let mut size = 0;
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        size += match &node.terminal {
            None => 1,
            Some(values) => {
                1 + varint_size(values.len() as u64)
                    + values.iter().map(|v| bytes_size(v.len())).sum::<usize>()
            }
        };
        size += varint_size(node.children.len() as u64);
        for (key, child) in &node.children {
            size += bytes_size(S::key_bytes(key).len());
            stack.push(child);
        }
    }
    size
}

// =============================================================================
// Iteration
// =============================================================================

/// Every stored entry, in no particular order.
pub struct Entries<'a, S: Keying> {
    stack: Vec<(Name, &'a Node<S::Key>)>,
}

impl<'a, S: Keying> Iterator for Entries<'a, S> {
    type Item = (Name, &'a ValueSet);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((name, node)) = self.stack.pop() {
            for (key, child) in &node.children {
                self.stack.push((name.with_component(S::decode(key)), child));
            }
            if let Some(values) = &node.terminal {
                return Some((name, values));
            }
        }
        None
    }
}
