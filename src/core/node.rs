//! Document node tree.
//!
//! A [`Node`] is one value of a generic hierarchical document. Trees are
//! single-owned: every transform consumes its input and builds a new tree.

use std::fmt;

/// Numeric scalar, kept as integer or float as it was read.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// Value promoted to `f64`.
    #[inline]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{:?}", x),
        }
    }
}

/// Rendering hint for sequences, consumed by the text emitter only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Style {
    /// One item per line (`- a`)
    #[default]
    Block,
    /// Inline (`[a, b, c]`)
    Flow,
}

/// Ordered list of nodes plus its rendering hint.
///
/// Equality compares items only; the style never carries value.
#[derive(Clone, Debug, Default)]
pub struct Sequence {
    pub items: Vec<Node>,
    pub style: Style,
}

impl Sequence {
    pub fn new(items: Vec<Node>) -> Self {
        Self { items, style: Style::Block }
    }

    pub fn with_style(items: Vec<Node>, style: Style) -> Self {
        Self { items, style }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.items.iter()
    }
}

impl PartialEq for Sequence {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

/// Ordered mapping from unique string keys to nodes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mapping {
    entries: Vec<(String, Node)>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing (in place) any previous value for `key`.
    /// Returns the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Node) -> Option<Node> {
        let key = key.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(&mut slot.1, value));
        }
        self.entries.push((key, value));
        None
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl IntoIterator for Mapping {
    type Item = (String, Node);
    type IntoIter = std::vec::IntoIter<(String, Node)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Node)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, Node)>>(iter: I) -> Self {
        let mut map = Mapping::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// One node of a document tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    Sequence(Sequence),
    Mapping(Mapping),
    /// Framed array payload. Produced only by the compressor.
    Blob(Vec<u8>),
}

impl Node {
    /// Block-style sequence node.
    pub fn seq(items: Vec<Node>) -> Self {
        Self::Sequence(Sequence::new(items))
    }

    pub fn float(v: f64) -> Self {
        Self::Number(Number::Float(v))
    }

    pub fn int(v: i64) -> Self {
        Self::Number(Number::Int(v))
    }

    /// Sequence of floats.
    pub fn floats(values: &[f64]) -> Self {
        Self::seq(values.iter().map(|&v| Self::float(v)).collect())
    }

    /// True for everything except sequences and mappings.
    #[inline]
    pub fn is_scalar(&self) -> bool {
        !self.is_container()
    }

    #[inline]
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Sequence(_) | Self::Mapping(_))
    }

    #[inline]
    pub fn is_blob(&self) -> bool {
        matches!(self, Self::Blob(_))
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().map(Number::as_f64)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Self::Sequence(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Self::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Look up a mapping value by key.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_mapping().and_then(|m| m.get(key))
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::Text(_) => "text",
            Self::Sequence(_) => "sequence",
            Self::Mapping(_) => "mapping",
            Self::Blob(_) => "blob",
        }
    }

    /// Number of blob nodes anywhere in the tree.
    pub fn count_blobs(&self) -> usize {
        match self {
            Self::Blob(_) => 1,
            Self::Sequence(s) => s.iter().map(Node::count_blobs).sum(),
            Self::Mapping(m) => m.iter().map(|(_, v)| v.count_blobs()).sum(),
            _ => 0,
        }
    }
}

impl From<f64> for Node {
    fn from(v: f64) -> Self {
        Self::float(v)
    }
}

impl From<i64> for Node {
    fn from(v: i64) -> Self {
        Self::int(v)
    }
}

impl From<bool> for Node {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Node {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Node {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<Node>> for Node {
    fn from(v: Vec<Node>) -> Self {
        Self::seq(v)
    }
}

impl From<Mapping> for Node {
    fn from(m: Mapping) -> Self {
        Self::Mapping(m)
    }
}
