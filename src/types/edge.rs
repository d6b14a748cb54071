//! Dependency edge types for the skeleton graph.

use serde::{Deserialize, Serialize};
use super::node::NodeId;

/// Default dependency kind when the input omits one.
pub const DEFAULT_DEPENDENCY_KIND: &str = "reference";

fn default_dependency_kind() -> String {
    DEFAULT_DEPENDENCY_KIND.to_string()
}

/// Directed dependency edge between two skeleton nodes.
///
/// Implements `Ord` for deterministic ordering: (from, to, dep).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkeletonEdge {
    /// Source node.
    pub from: NodeId,
    /// Target node.
    pub to: NodeId,
    /// Free-form dependency kind (e.g. "reference").
    #[serde(default = "default_dependency_kind")]
    pub dep: String,
}

impl SkeletonEdge {
    /// Create a new edge.
    pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>, dep: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            dep: dep.into(),
        }
    }

    /// Create a `reference` edge.
    pub fn reference(from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        Self::new(from, to, DEFAULT_DEPENDENCY_KIND)
    }
}

// Canonical ordering: from, then to, then dep
impl PartialOrd for SkeletonEdge {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SkeletonEdge {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.from
            .cmp(&other.from)
            .then_with(|| self.to.cmp(&other.to))
            .then_with(|| self.dep.cmp(&other.dep))
    }
}
