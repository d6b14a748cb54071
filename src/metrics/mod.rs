//! The four meta-document metrics.
//!
//! | Metric | Question | Inputs |
//! |--------|----------|--------|
//! | Q1 rate-distortion | how much is lost reading the short view? | encoder, B/T views |
//! | Q2 skeleton-anchor agreement | do anchors sit on important nodes? | graph, V*, diameter |
//! | Q3 change visibility | does detail say something new at anchors? | encoder, node records |
//! | Q4 anchor guidance | do anchors shorten the way to important nodes? | graph, V* |
//!
//! Every engine is a pure function of its inputs. Graphs and key-node sets are
//! rebuilt per call; the encoder is passed in already fitted.
//!
//! ## Degenerate inputs
//!
//! Empty anchor sets, empty key-node sets, unreachable pairs, disconnected
//! graphs and zero vectors are not errors. Each metric falls back to an
//! explicit default (0.0 for means, 1 for the diameter).

pub mod config;
pub mod q1_rate_distortion;
pub mod q2_skeleton_anchor;
pub mod q3_change_visibility;
pub mod q4_anchor_guidance;

pub use config::{default_rate_grid, MetricsConfig};
pub use q1_rate_distortion::{compute_q1, decay_constant, estimate_distortion, RateDistortion};
pub use q2_skeleton_anchor::{compute_q2, AgreementDetails, SkeletonAnchorAgreement};
pub use q3_change_visibility::{compute_q3, kl_divergence, ChangeVisibility};
pub use q4_anchor_guidance::{compute_q4, AnchorGuidance, GuidanceDetails};

use crate::graph::{KeyNodeSet, SkeletonGraph};

/// Shortest-path lengths from each source to each reachable key node.
///
/// Only pairs of distinct nodes count; a node's zero-length path to itself is
/// not a path to "another" important node.
pub(crate) fn key_path_lengths<I>(graph: &SkeletonGraph, sources: I, key_nodes: &KeyNodeSet) -> Vec<usize>
where
    I: IntoIterator<Item = usize>,
{
    let targets: Vec<usize> = key_nodes
        .iter()
        .filter_map(|id| graph.index_of(id.as_str()))
        .collect();

    let mut lengths = Vec::new();
    for src in sources {
        let dist = graph.distances_from(src);
        for &dst in &targets {
            if dst == src {
                continue;
            }
            if let Some(d) = dist[dst] {
                lengths.push(d);
            }
        }
    }
    lengths
}

/// Arithmetic mean, `None` for an empty slice.
pub(crate) fn mean_usize(values: &[usize]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<usize>() as f64 / values.len() as f64)
}

/// Arithmetic mean, `None` for an empty slice.
pub(crate) fn mean_f64(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
