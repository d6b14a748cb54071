//! Q2: skeleton-anchor agreement.
//!
//! ```text
//! coverage       = |covered ∩ V*| / max(1, |V*|)     covered = ∪ (descendants(a) ∪ {a})
//! mean_path_norm = mean_path / safe_diameter
//! A_sa           = alpha * coverage - beta * mean_path_norm
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{key_path_lengths, mean_usize, MetricsConfig};
use crate::graph::{safe_diameter, KeyNodeExtractor, SkeletonGraph};
use crate::types::{Anchors, NodeId, Skeleton};

/// Diagnostic counts behind a Q2 score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgreementDetails {
    /// |V*|.
    pub num_key_nodes: usize,
    /// Distinct resolved anchors.
    pub num_anchors: usize,
    /// Mean anchor-to-key-node path length before normalization.
    pub raw_mean_path: f64,
    /// Safe diameter used as the normalizer.
    pub diameter: usize,
    /// Anchor transitions whose reference did not resolve.
    pub unresolved_anchors: usize,
}

/// Q2 output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkeletonAnchorAgreement {
    /// Weighted agreement score.
    #[serde(rename = "A_sa")]
    pub a_sa: f64,
    /// Fraction of key nodes reachable from (or equal to) some anchor.
    pub coverage: f64,
    /// Mean path normalized by the safe diameter.
    #[serde(rename = "mean_path")]
    pub mean_path_norm: f64,
    /// Diagnostics.
    pub details: AgreementDetails,
}

/// Compute Q2 for a skeleton and its anchors.
pub fn compute_q2(skeleton: &Skeleton, anchors: &Anchors, config: &MetricsConfig) -> SkeletonAnchorAgreement {
    let graph = SkeletonGraph::from_skeleton(skeleton);
    let key_nodes = KeyNodeExtractor::extract(&graph);
    let resolution = anchors.resolve(|id| graph.contains(id));

    let mut covered: BTreeSet<NodeId> = BTreeSet::new();
    for anchor in &resolution.resolved {
        covered.extend(graph.descendants(anchor.as_str()));
        covered.insert(anchor.clone());
    }
    let covered_key = key_nodes.iter().filter(|id| covered.contains(*id)).count();
    let coverage = covered_key as f64 / key_nodes.len().max(1) as f64;

    let sources = resolution.resolved.iter().filter_map(|id| graph.index_of(id.as_str()));
    let lengths = key_path_lengths(&graph, sources, &key_nodes);
    let raw_mean_path = mean_usize(&lengths).unwrap_or(config.missing_path_default);

    let diameter = safe_diameter(&graph);
    let mean_path_norm = raw_mean_path / diameter as f64;
    let a_sa = config.alpha * coverage - config.beta * mean_path_norm;

    SkeletonAnchorAgreement {
        a_sa,
        coverage,
        mean_path_norm,
        details: AgreementDetails {
            num_key_nodes: key_nodes.len(),
            num_anchors: resolution.resolved.len(),
            raw_mean_path,
            diameter,
            unresolved_anchors: resolution.unresolved,
        },
    }
}
