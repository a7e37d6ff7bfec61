//! Hierarchical names.
//!
//! A [`Name`] is an ordered sequence of opaque byte-string [`Component`]s,
//! written in URI form as `/org/dept/host`. Components are compared
//! byte-exactly; the textual form percent-escapes every byte outside the
//! unreserved set so that rendering and parsing are exact inverses.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use smallvec::SmallVec;

use crate::{EchtError, EchtResult};

/// Inline capacity for name components. Names deeper than this spill to the heap.
const INLINE_COMPONENTS: usize = 8;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

// =============================================================================
// Component
// =============================================================================

/// One opaque segment of a [`Name`].
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Component(Bytes);

impl Component {
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

    /// Lossless text form of this component, as used in name URIs.
    pub fn to_escaped(&self) -> String {
        let mut out = String::with_capacity(self.len());
        escape_into(self.as_bytes(), &mut out);
        out
    }
}

impl Borrow<[u8]> for Component {
    fn borrow(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for Component {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Bytes> for Component {
    fn from(bytes: Bytes) -> Self {
        Self(bytes)
    }
}

impl From<Vec<u8>> for Component {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Bytes::from(bytes))
    }
}

impl From<&[u8]> for Component {
    fn from(bytes: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(bytes))
    }
}

impl<const N: usize> From<&[u8; N]> for Component {
    fn from(bytes: &[u8; N]) -> Self {
        Self(Bytes::copy_from_slice(bytes))
    }
}

impl From<&str> for Component {
    fn from(text: &str) -> Self {
        Self(Bytes::copy_from_slice(text.as_bytes()))
    }
}

impl From<String> for Component {
    fn from(text: String) -> Self {
        Self(Bytes::from(text.into_bytes()))
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_escaped())
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({})", self)
    }
}

// =============================================================================
// Name
// =============================================================================

/// An ordered sequence of components. The empty name is a valid key.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Name {
    components: SmallVec<[Component; INLINE_COMPONENTS]>,
}

impl Name {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_components<C: Into<Component>>(components: impl IntoIterator<Item = C>) -> Self {
        Self {
            components: components.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a URI-style name such as `/org/dept/host`.
    ///
    /// Empty segments are skipped, so `/`, `` and `//` all denote the empty
    /// name. `%XX` escapes are decoded; any other `%` is rejected.
    pub fn parse(uri: &str) -> EchtResult<Self> {
        let mut name = Self::new();
        for segment in uri.split('/').filter(|s| !s.is_empty()) {
            name.push(Component::from(unescape(segment)?));
        }
        Ok(name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    #[inline]
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Component> {
        self.components.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Component> {
        self.components.get(index)
    }

    pub fn push(&mut self, component: impl Into<Component>) {
        self.components.push(component.into());
    }

    /// The first `len` components (the whole name if `len` exceeds it).
    pub fn prefix(&self, len: usize) -> Name {
        let len = len.min(self.len());
        Self {
            components: self.components[..len].iter().cloned().collect(),
        }
    }

    pub fn is_prefix_of(&self, other: &Name) -> bool {
        other.components.starts_with(&self.components)
    }

    /// A copy of this name with one more trailing component.
    pub fn with_component(&self, component: impl Into<Component>) -> Name {
        let mut name = self.clone();
        name.push(component);
        name
    }

    /// `self` followed by every component of `suffix`.
    pub fn join(&self, suffix: &Name) -> Name {
        let mut name = self.clone();
        name.components.extend(suffix.iter().cloned());
        name
    }
}

impl<C: Into<Component>> FromIterator<C> for Name {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        Self::from_components(iter)
    }
}

impl<'a> IntoIterator for &'a Name {
    type Item = &'a Component;
    type IntoIter = std::slice::Iter<'a, Component>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromStr for Name {
    type Err = EchtError;

    fn from_str(s: &str) -> EchtResult<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("/");
        }
        let mut out = String::new();
        for component in self.iter() {
            out.push('/');
            escape_into(component.as_bytes(), &mut out);
        }
        f.write_str(&out)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self)
    }
}

// =============================================================================
// Percent escaping
// =============================================================================

#[inline]
fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~')
}

pub(crate) fn escape_into(bytes: &[u8], out: &mut String) {
    for &b in bytes {
        if is_unreserved(b) {
            out.push(b as char);
        } else {
            out.push('%');
            out.push(HEX_DIGITS[(b >> 4) as usize] as char);
            out.push(HEX_DIGITS[(b & 0x0F) as usize] as char);
        }
    }
}

#[inline]
fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

pub(crate) fn unescape(segment: &str) -> EchtResult<Vec<u8>> {
    let bytes = segment.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        let digits = bytes
            .get(i + 1..i + 3)
            .and_then(|d| Some((hex_value(d[0])?, hex_value(d[1])?)));
        let Some((hi, lo)) = digits else {
            return Err(EchtError::MalformedName(
                format!("bad percent escape in segment {segment:?}").into(),
            ));
        };
        out.push((hi << 4) | lo);
        i += 3;
    }
    Ok(out)
}
