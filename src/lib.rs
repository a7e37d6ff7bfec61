//! # echt
//!
//! Encoded Component Hashed Trie: a name → value-set lookup structure keyed by
//! hierarchical names, answering exact-match and longest-prefix-match queries.
//!
//! Names are sequences of opaque components (`/org/dept/host`). Each trie node
//! maps one component to a child, so names sharing a prefix share the nodes
//! for it. A node that terminates a stored name carries the values stored
//! under that name; intermediate nodes carry nothing and are not entries.
//!
//! ## Example
//!
//! ```rust
//! use echt::{Backend, BackendKind, Config, Name, Value};
//!
//! let mut backend = BackendKind::Named.build(&Config::default());
//! let dept: Name = "/org/dept".parse().unwrap();
//! let host: Name = "/org/dept/host".parse().unwrap();
//!
//! backend.add(&dept, &[Value::from("AS1")]);
//! backend.add(&host, &[Value::from("AS2"), Value::from("AS3")]);
//!
//! assert_eq!(backend.get(&dept).unwrap().as_slice(), &[Value::from("AS1")]);
//!
//! let hit = backend
//!     .longest_prefix_match(&"/org/dept/host/extra".parse().unwrap())
//!     .unwrap();
//! assert_eq!(hit.prefix, host);
//! assert!(backend.longest_prefix_match(&"/org/other".parse().unwrap()).is_none());
//! ```
//!
//! ## Backends
//!
//! - [`NamedTrie`] keys children by raw component bytes.
//! - [`TextTrie`] keys children by each component's escaped UTF-8 text.
//! - [`Dictionary`] maps whole names; a baseline with no prefix sharing.
//!
//! All three implement [`Backend`] and are selected by [`BackendKind`].

mod backend;
pub mod encoding;
mod entry;
mod error;
mod keying;
mod loader;
mod name;
mod query;
mod simple;
mod sink;
mod trie;

pub use backend::{Backend, BackendKind, Config, KeyingStrategy, Lifecycle};
pub use entry::{Collapsed, Entry, PrefixMatch, Removal, Value, ValueSet};
pub use error::{EchtError, EchtResult};
pub use keying::{BinaryKeying, Keying, Utf8Keying};
pub use loader::{BulkLoader, LoadSummary};
pub use name::{Component, Name};
pub use query::{answer, respond, Operation, Reply, Request};
pub use simple::Dictionary;
pub use sink::{LoadRecord, MetricsSink, NoopSink, ResolveKind, ResolveRecord};
pub use trie::{ComponentTrie, Entries, NamedTrie, TextTrie, TrieStats};

#[cfg(test)]
mod proptests;
