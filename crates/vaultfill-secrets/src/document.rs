//! Format-independent document tree
//!
//! Any serde format (YAML, JSON, TOML) can be read into a [`Node`] and written
//! back out of one. Mapping keys keep their source order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A node of a structured configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    /// String-keyed mapping, in source order
    Mapping(IndexMap<String, Node>),

    /// Ordered list of nodes
    Sequence(Vec<Node>),

    /// Leaf value
    Scalar(Scalar),
}

/// A leaf value of a document
///
/// This is also the output type of reference resolution: a resolved leaf is
/// always one of `String`, `Bool` or `Int`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
}

impl Node {
    /// Shorthand for a string leaf
    pub fn string(value: impl Into<String>) -> Self {
        Node::Scalar(Scalar::String(value.into()))
    }

    /// Get the kind name for logging/errors
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Mapping(_) => "mapping",
            Node::Sequence(_) => "sequence",
            Node::Scalar(_) => "scalar",
        }
    }

    /// Look up a direct child of a mapping
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Mapping(entries) => entries.get(key),
            _ => None,
        }
    }

    /// The string content of a string leaf
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Number of leaves below (and including) this node
    pub fn leaf_count(&self) -> usize {
        match self {
            Node::Mapping(entries) => entries.values().map(Node::leaf_count).sum(),
            Node::Sequence(items) => items.iter().map(Node::leaf_count).sum(),
            Node::Scalar(_) => 1,
        }
    }
}

impl From<Scalar> for Node {
    fn from(scalar: Scalar) -> Self {
        Node::Scalar(scalar)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::string(value)
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Scalar(Scalar::Bool(value))
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Node::Scalar(Scalar::Int(value))
    }
}

impl From<Vec<Node>> for Node {
    fn from(items: Vec<Node>) -> Self {
        Node::Sequence(items)
    }
}

impl<K: Into<String>> FromIterator<(K, Node)> for Node {
    fn from_iter<T: IntoIterator<Item = (K, Node)>>(iter: T) -> Self {
        Node::Mapping(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
