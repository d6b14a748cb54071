//! Skeleton node types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a node in the document skeleton.
///
/// Wraps the node's string id and implements `Ord` for deterministic ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create a new NodeId.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::borrow::Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Semantic type tag of a skeleton node.
///
/// Only `claim` and `result` carry meaning for key-node extraction; every other
/// tag is preserved verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    /// A claim made by the document.
    Claim,
    /// A result reported by the document.
    Result,
    /// Any other tag (premise, method, background, ...).
    Other(String),
}

impl NodeType {
    /// Parse a node type from its tag. Never fails; unknown tags become `Other`.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "claim" => Self::Claim,
            "result" => Self::Result,
            _ => Self::Other(s.to_string()),
        }
    }

    /// Whether this type is semantically pivotal (claim or result).
    pub fn is_pivotal(&self) -> bool {
        matches!(self, Self::Claim | Self::Result)
    }
}

impl Default for NodeType {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for NodeType {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<NodeType> for String {
    fn from(t: NodeType) -> Self {
        t.to_string()
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Claim => write!(f, "claim"),
            Self::Result => write!(f, "result"),
            Self::Other(tag) => write!(f, "{}", tag),
        }
    }
}

/// A content node of the skeleton: a short gist plus its expanded detail.
///
/// Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkeletonNode {
    /// Unique node identifier.
    pub id: NodeId,
    /// Semantic type tag.
    #[serde(rename = "type", default)]
    pub node_type: NodeType,
    /// Short summary text.
    #[serde(default)]
    pub gist: String,
    /// Expanded explanatory text.
    #[serde(default)]
    pub detail: String,
}

impl SkeletonNode {
    /// Create a new skeleton node.
    pub fn new(
        id: impl Into<NodeId>,
        node_type: NodeType,
        gist: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            node_type,
            gist: gist.into(),
            detail: detail.into(),
        }
    }

    /// The node's corpus entry: gist and detail joined by a space, trimmed.
    pub fn corpus_text(&self) -> String {
        format!("{} {}", self.gist, self.detail).trim().to_string()
    }
}
