//! Key-node extraction (V*).
//!
//! A node is key if any of the following holds:
//!
//! | Rule | Condition | Reading |
//! |------|-----------|---------|
//! | Semantic | type is `claim` or `result` | the document's pivots |
//! | Branching | out-degree >= 2 | structure fans out here |
//! | Root | in-degree == 0 | an entry point of the document |

use std::collections::BTreeSet;

use super::SkeletonGraph;
use crate::types::NodeId;

/// Minimum out-degree for a node to count as branching.
pub const BRANCHING_OUT_DEGREE: usize = 2;

/// The derived set of key nodes. Recomputed per graph, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyNodeSet {
    nodes: BTreeSet<NodeId>,
}

impl KeyNodeSet {
    /// Number of key nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether there are no key nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Membership test.
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains(id)
    }

    /// Key node ids in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.iter()
    }
}

impl FromIterator<NodeId> for KeyNodeSet {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}

/// Derives V* from a skeleton graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyNodeExtractor;

impl KeyNodeExtractor {
    /// Compute the key-node set of a graph.
    pub fn extract(graph: &SkeletonGraph) -> KeyNodeSet {
        (0..graph.len())
            .filter(|&i| Self::is_key(graph, i))
            .map(|i| graph.node_at(i).id.clone())
            .collect()
    }

    fn is_key(graph: &SkeletonGraph, idx: usize) -> bool {
        graph.node_at(idx).node_type.is_pivotal()
            || graph.out_degree_at(idx) >= BRANCHING_OUT_DEGREE
            || graph.in_degree_at(idx) == 0
    }
}
