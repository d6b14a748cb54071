//! Q4: anchor guidance.
//!
//! `G_a = baseline - with_anchors`, where `baseline` is the mean shortest-path
//! length from every node to every key node and `with_anchors` is the same
//! statistic over anchor sources only. Positive means anchors sit closer to
//! important content than a typical node.

use serde::{Deserialize, Serialize};

use super::{key_path_lengths, mean_usize};
use crate::graph::{KeyNodeExtractor, SkeletonGraph};
use crate::types::{Anchors, Skeleton};

/// Pair counts behind a Q4 score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidanceDetails {
    /// |V*|.
    pub num_key_nodes: usize,
    /// Distinct resolved anchors.
    pub num_anchors: usize,
    /// Reachable (node, key node) pairs behind `baseline`.
    pub baseline_pairs: usize,
    /// Reachable (anchor, key node) pairs behind `with_anchors`.
    pub anchor_pairs: usize,
    /// Anchor transitions whose reference did not resolve.
    pub unresolved_anchors: usize,
}

/// Q4 output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorGuidance {
    /// Guidance gain.
    #[serde(rename = "G_a")]
    pub g_a: f64,
    /// Mean path from any node to a key node.
    pub baseline: f64,
    /// Mean path from an anchor to a key node.
    pub with_anchors: f64,
    /// Diagnostics.
    pub details: GuidanceDetails,
}

/// Compute Q4 for a skeleton and its anchors.
///
/// `G_a` is 0 when there are no resolved anchors, no key nodes, or no
/// anchor reaches a key node.
pub fn compute_q4(skeleton: &Skeleton, anchors: &Anchors) -> AnchorGuidance {
    let graph = SkeletonGraph::from_skeleton(skeleton);
    let key_nodes = KeyNodeExtractor::extract(&graph);
    let resolution = anchors.resolve(|id| graph.contains(id));

    let all = key_path_lengths(&graph, 0..graph.len(), &key_nodes);
    let baseline = mean_usize(&all).unwrap_or(0.0);

    let sources = resolution.resolved.iter().filter_map(|id| graph.index_of(id.as_str()));
    let from_anchors = key_path_lengths(&graph, sources, &key_nodes);

    // No anchor-to-key-node path leaves guidance undefined; report 0
    let (with_anchors, g_a) = match mean_usize(&from_anchors) {
        Some(mean) if !key_nodes.is_empty() => (mean, baseline - mean),
        _ => (0.0, 0.0),
    };

    AnchorGuidance {
        g_a,
        baseline,
        with_anchors,
        details: GuidanceDetails {
            num_key_nodes: key_nodes.len(),
            num_anchors: resolution.resolved.len(),
            baseline_pairs: all.len(),
            anchor_pairs: from_anchors.len(),
            unresolved_anchors: resolution.unresolved,
        },
    }
}
