//! Q3: change visibility at anchors.
//!
//! At each resolved anchor the node's gist vector is compared with its
//! gist/detail union vector as probability distributions. A large divergence
//! means the detail layer shifts emphasis at that transition.

use serde::{Deserialize, Serialize};

use super::mean_f64;
use crate::encoder::{EncodedVector, EncoderError, VocabularyEncoder};
use crate::graph::SkeletonGraph;
use crate::types::{Anchors, Skeleton};

/// Smoothing added to every bin before normalization.
pub const KL_EPS: f64 = 1e-10;

/// Q3 output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeVisibility {
    /// Mean divergence over resolved anchors, 0 if none.
    #[serde(rename = "V_ch")]
    pub v_ch: f64,
    /// Per-anchor divergences in anchor order.
    pub deltas: Vec<f64>,
    /// Number of resolved anchors evaluated.
    pub num_transitions: usize,
    /// Anchor transitions whose reference did not resolve.
    pub unresolved_anchors: usize,
}

/// `KL(P || Q)` between two vectors after smoothing both into distributions.
///
/// Vectors of different dimension are compared over the longer one, the
/// shorter padded with zeros.
pub fn kl_divergence(p: &EncodedVector, q: &EncodedVector) -> f64 {
    let dim = p.len().max(q.len());
    if dim == 0 {
        return 0.0;
    }
    let p = pad(p, dim).to_distribution(KL_EPS);
    let q = pad(q, dim).to_distribution(KL_EPS);

    p.iter()
        .zip(q.iter())
        .map(|(pi, qi)| pi * (pi / qi).ln())
        .sum::<f64>()
        .max(0.0)
}

fn pad(v: &EncodedVector, dim: usize) -> EncodedVector {
    if v.len() == dim {
        return v.clone();
    }
    v.union(&EncodedVector::zeros(dim))
}

/// Compute Q3 over the anchors of a skeleton.
///
/// When a node id appears more than once the last record wins.
pub fn compute_q3(
    anchors: &Anchors,
    skeleton: &Skeleton,
    encoder: &VocabularyEncoder,
) -> Result<ChangeVisibility, EncoderError> {
    let graph = SkeletonGraph::from_skeleton(skeleton);
    let resolution = anchors.resolve(|id| graph.contains(id));

    let mut deltas = Vec::with_capacity(resolution.resolved.len());
    for id in &resolution.resolved {
        let Some(node) = graph.node(id.as_str()) else {
            continue;
        };
        let gist = encoder.transform(&node.gist)?;
        let union = encoder.encode_union(&node.gist, &node.detail)?;
        deltas.push(kl_divergence(&gist, &union));
    }

    Ok(ChangeVisibility {
        v_ch: mean_f64(&deltas).unwrap_or(0.0),
        num_transitions: deltas.len(),
        deltas,
        unresolved_anchors: resolution.unresolved,
    })
}
