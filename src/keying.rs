//! How a trie keys its edges.
//!
//! Every trie backend walks names one component at a time; the keying
//! strategy decides what a component turns into on an edge. [`BinaryKeying`]
//! keeps raw bytes, [`Utf8Keying`] stores the percent-escaped text form, the
//! way string-keyed backends see names.

use std::fmt::Debug;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::name::{escape_into, unescape};
use crate::{BackendKind, Component};

pub trait Keying: Send + Sync + 'static {
    type Key: Clone + Eq + Hash + Debug + Send + Sync;

    /// The backend identity a trie with this keying reports.
    const KIND: BackendKind;

    fn encode(component: &Component) -> Self::Key;

    fn decode(key: &Self::Key) -> Component;

    /// Bytes of `key` as written by the canonical encoding.
    fn key_bytes(key: &Self::Key) -> &[u8];

    /// Look up the edge for `component` without allocating an owned key when
    /// the keying allows it.
    fn find<'m, V>(map: &'m FxHashMap<Self::Key, V>, component: &Component) -> Option<&'m V>;

    fn find_mut<'m, V>(
        map: &'m mut FxHashMap<Self::Key, V>,
        component: &Component,
    ) -> Option<&'m mut V>;
}

/// Raw binary components.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryKeying;

impl Keying for BinaryKeying {
    type Key = Component;

    const KIND: BackendKind = BackendKind::Named;

    #[inline]
    fn encode(component: &Component) -> Component {
        component.clone()
    }

    #[inline]
    fn decode(key: &Component) -> Component {
        key.clone()
    }

    #[inline]
    fn key_bytes(key: &Component) -> &[u8] {
        key.as_bytes()
    }

    #[inline]
    fn find<'m, V>(map: &'m FxHashMap<Component, V>, component: &Component) -> Option<&'m V> {
        map.get(component.as_bytes())
    }

    #[inline]
    fn find_mut<'m, V>(
        map: &'m mut FxHashMap<Component, V>,
        component: &Component,
    ) -> Option<&'m mut V> {
        map.get_mut(component.as_bytes())
    }
}

/// UTF-8 text components. Bytes outside the unreserved set are percent-escaped,
/// which keeps distinct binary components distinct.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Keying;

fn escaped(component: &Component) -> String {
    let mut text = String::with_capacity(component.len());
    escape_into(component.as_bytes(), &mut text);
    text
}

impl Keying for Utf8Keying {
    type Key = Box<str>;

    const KIND: BackendKind = BackendKind::Text;

    fn encode(component: &Component) -> Box<str> {
        escaped(component).into_boxed_str()
    }

    fn decode(key: &Box<str>) -> Component {
        // Keys only ever come from `encode`, so the escapes are well formed.
        Component::from(unescape(key).unwrap_or_else(|_| key.as_bytes().to_vec()))
    }

    #[inline]
    fn key_bytes(key: &Box<str>) -> &[u8] {
        key.as_bytes()
    }

    fn find<'m, V>(map: &'m FxHashMap<Box<str>, V>, component: &Component) -> Option<&'m V> {
        map.get(escaped(component).as_str())
    }

    fn find_mut<'m, V>(
        map: &'m mut FxHashMap<Box<str>, V>,
        component: &Component,
    ) -> Option<&'m mut V> {
        map.get_mut(escaped(component).as_str())
    }
}
