//! Safe graph diameter for distance normalization.
//!
//! Document skeletons are DAGs, so the textbook diameter (which requires strong
//! connectivity) is undefined on almost every real input. This module defines
//! a diameter that exists for every graph:
//!
//! | Graph | Diameter |
//! |-------|----------|
//! | 0 or 1 node | 1 |
//! | weakly connected | longest shortest path, direction ignored |
//! | disconnected | longest finite directed shortest path over ordered pairs, or 1 if none |
//! | internal failure | node count |
//!
//! The result is always >= 1, so it can be used as a divisor directly.

use super::{GraphError, SkeletonGraph};

/// Compute the safe diameter. Never fails.
pub fn safe_diameter(graph: &SkeletonGraph) -> usize {
    or_node_count(try_diameter(graph), graph.len())
}

fn or_node_count(result: Result<usize, GraphError>, node_count: usize) -> usize {
    match result {
        Ok(d) => d.max(1),
        Err(e) => {
            tracing::warn!(error = %e, node_count, "diameter computation failed, using node count");
            node_count.max(1)
        }
    }
}

fn try_diameter(graph: &SkeletonGraph) -> Result<usize, GraphError> {
    if graph.len() <= 1 {
        return Ok(1);
    }
    if graph.is_weakly_connected() {
        undirected_diameter(graph)
    } else {
        Ok(longest_directed_path(graph).unwrap_or(1))
    }
}

fn undirected_diameter(graph: &SkeletonGraph) -> Result<usize, GraphError> {
    let mut diameter = 0;
    for src in 0..graph.len() {
        for (dst, d) in graph.undirected_distances_from(src).into_iter().enumerate() {
            match d {
                Some(d) => diameter = diameter.max(d),
                None => {
                    return Err(GraphError::Unreachable {
                        source_id: graph.node_at(src).id.clone(),
                        target_id: graph.node_at(dst).id.clone(),
                    })
                }
            }
        }
    }
    Ok(diameter)
}

/// Longest finite shortest path between distinct nodes, if any pair is connected.
fn longest_directed_path(graph: &SkeletonGraph) -> Option<usize> {
    (0..graph.len())
        .flat_map(|src| {
            graph
                .distances_from(src)
                .into_iter()
                .enumerate()
                .filter(move |(dst, _)| *dst != src)
                .filter_map(|(_, d)| d)
        })
        .max()
}
