//! In-memory skeleton graph with reachability and shortest-path queries.
//!
//! The graph owns its adjacency lists and answers every query with plain BFS.
//! Nothing assumes strong connectivity, weak connectivity, or the absence of
//! isolated nodes: unreachable targets simply yield `None`.
//!
//! ## Construction rules
//!
//! - Node ids are unique; a repeated id replaces the earlier record in place.
//! - Edges whose endpoints are not declared nodes are dropped (and counted).
//! - Parallel edges collapse into one adjacency entry.
//!
//! Adjacency uses `BTreeSet`s of node indices so iteration order is
//! deterministic.

pub mod key_nodes;
pub mod diameter;

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::types::{NodeId, Skeleton, SkeletonEdge, SkeletonNode};

pub use key_nodes::{KeyNodeExtractor, KeyNodeSet};
pub use diameter::safe_diameter;

/// Internal graph inconsistencies.
///
/// These never escape the crate's public metric API; the diameter computation
/// turns them into its node-count fallback.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A traversal that should cover the whole graph missed a node.
    #[error("Traversal from {source_id} did not reach {target_id}")]
    Unreachable {
        /// Traversal source.
        source_id: NodeId,
        /// First node not reached.
        target_id: NodeId,
    },
}

/// Directed graph over skeleton nodes.
#[derive(Debug, Clone, Default)]
pub struct SkeletonGraph {
    nodes: Vec<SkeletonNode>,
    index: BTreeMap<NodeId, usize>,
    successors: Vec<BTreeSet<usize>>,
    predecessors: Vec<BTreeSet<usize>>,
    dropped_edges: usize,
}

impl SkeletonGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from skeleton records.
    pub fn from_skeleton(skeleton: &Skeleton) -> Self {
        let mut graph = Self::new();
        for node in &skeleton.nodes {
            graph.add_node(node.clone());
        }
        for edge in &skeleton.edges {
            graph.add_edge(edge);
        }
        graph
    }

    /// Add a node, replacing any existing node with the same id.
    pub fn add_node(&mut self, node: SkeletonNode) {
        if let Some(&idx) = self.index.get(&node.id) {
            self.nodes[idx] = node;
            return;
        }
        let idx = self.nodes.len();
        self.index.insert(node.id.clone(), idx);
        self.nodes.push(node);
        self.successors.push(BTreeSet::new());
        self.predecessors.push(BTreeSet::new());
    }

    /// Add an edge. Returns `false` (and counts a drop) if an endpoint is unknown.
    pub fn add_edge(&mut self, edge: &SkeletonEdge) -> bool {
        let (Some(&from), Some(&to)) = (self.index.get(&edge.from), self.index.get(&edge.to)) else {
            tracing::debug!(from = %edge.from, to = %edge.to, "dropping edge with unknown endpoint");
            self.dropped_edges += 1;
            return false;
        };
        self.successors[from].insert(to);
        self.predecessors[to].insert(from);
        true
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of distinct edges.
    pub fn edge_count(&self) -> usize {
        self.successors.iter().map(BTreeSet::len).sum()
    }

    /// Number of edges dropped for referencing unknown nodes.
    pub fn dropped_edges(&self) -> usize {
        self.dropped_edges
    }

    /// Whether a node id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Index of a node id.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Node record by id.
    pub fn node(&self, id: &str) -> Option<&SkeletonNode> {
        self.index_of(id).map(|i| &self.nodes[i])
    }

    /// Node record by index.
    pub fn node_at(&self, idx: usize) -> &SkeletonNode {
        &self.nodes[idx]
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &SkeletonNode> {
        self.nodes.iter()
    }

    /// Successor ids of a node (empty for unknown ids).
    pub fn successors(&self, id: &str) -> Vec<&NodeId> {
        self.neighbors(id, &self.successors)
    }

    /// Predecessor ids of a node (empty for unknown ids).
    pub fn predecessors(&self, id: &str) -> Vec<&NodeId> {
        self.neighbors(id, &self.predecessors)
    }

    fn neighbors<'a>(&'a self, id: &str, adjacency: &'a [BTreeSet<usize>]) -> Vec<&'a NodeId> {
        self.index_of(id)
            .map(|i| adjacency[i].iter().map(|&j| &self.nodes[j].id).collect())
            .unwrap_or_default()
    }

    /// Out-degree by index.
    pub fn out_degree_at(&self, idx: usize) -> usize {
        self.successors[idx].len()
    }

    /// In-degree by index.
    pub fn in_degree_at(&self, idx: usize) -> usize {
        self.predecessors[idx].len()
    }

    /// Out-degree (0 for unknown ids).
    pub fn out_degree(&self, id: &str) -> usize {
        self.index_of(id).map(|i| self.out_degree_at(i)).unwrap_or(0)
    }

    /// In-degree (0 for unknown ids).
    pub fn in_degree(&self, id: &str) -> usize {
        self.index_of(id).map(|i| self.in_degree_at(i)).unwrap_or(0)
    }

    /// Directed BFS distances from a node index. `None` marks unreachable nodes.
    pub fn distances_from(&self, src: usize) -> Vec<Option<usize>> {
        self.bfs(src, false)
    }

    /// BFS distances from a node index ignoring edge direction.
    pub fn undirected_distances_from(&self, src: usize) -> Vec<Option<usize>> {
        self.bfs(src, true)
    }

    fn bfs(&self, src: usize, undirected: bool) -> Vec<Option<usize>> {
        let mut dist = vec![None; self.nodes.len()];
        let mut queue = VecDeque::new();
        dist[src] = Some(0);
        queue.push_back(src);

        while let Some(u) = queue.pop_front() {
            let d = dist[u].unwrap_or(0) + 1;
            let forward = self.successors[u].iter();
            let backward = self.predecessors[u].iter().filter(|_| undirected);
            for &v in forward.chain(backward) {
                if dist[v].is_none() {
                    dist[v] = Some(d);
                    queue.push_back(v);
                }
            }
        }
        dist
    }

    /// All nodes reachable from `id`, excluding `id` itself.
    pub fn descendants(&self, id: &str) -> BTreeSet<NodeId> {
        let Some(src) = self.index_of(id) else {
            return BTreeSet::new();
        };
        self.distances_from(src)
            .into_iter()
            .enumerate()
            .filter(|(j, d)| *j != src && d.is_some())
            .map(|(j, _)| self.nodes[j].id.clone())
            .collect()
    }

    /// Whether a directed path leads from `a` to `b`. Every node reaches itself.
    pub fn has_path(&self, a: &str, b: &str) -> bool {
        self.shortest_path_length(a, b).is_some()
    }

    /// Number of edges on a shortest directed path from `a` to `b`.
    ///
    /// `None` if either id is unknown or `b` is unreachable from `a`.
    pub fn shortest_path_length(&self, a: &str, b: &str) -> Option<usize> {
        let src = self.index_of(a)?;
        let dst = self.index_of(b)?;
        self.distances_from(src)[dst]
    }

    /// Whether every node reaches every other when direction is ignored.
    ///
    /// The empty graph is not weakly connected.
    pub fn is_weakly_connected(&self) -> bool {
        if self.nodes.is_empty() {
            return false;
        }
        self.undirected_distances_from(0).iter().all(Option::is_some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeType;

    fn node(id: &str) -> SkeletonNode {
        SkeletonNode::new(id, NodeType::default(), "", "")
    }

    fn graph(ids: &[&str], edges: &[(&str, &str)]) -> SkeletonGraph {
        let skeleton = Skeleton::new(
            ids.iter().map(|id| node(id)).collect(),
            edges.iter().map(|(a, b)| SkeletonEdge::reference(*a, *b)).collect(),
        );
        SkeletonGraph::from_skeleton(&skeleton)
    }

    #[test]
    fn test_adjacency_and_degrees() {
        let g = graph(&["a", "b", "c"], &[("a", "b"), ("a", "c"), ("b", "c")]);
        assert_eq!(g.len(), 3);
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.out_degree("a"), 2);
        assert_eq!(g.in_degree("c"), 2);
        assert_eq!(g.in_degree("a"), 0);
        assert_eq!(g.successors("a"), vec![&NodeId::from("b"), &NodeId::from("c")]);
        assert_eq!(g.predecessors("c"), vec![&NodeId::from("a"), &NodeId::from("b")]);
    }

    #[test]
    fn test_dangling_edges_are_dropped() {
        let g = graph(&["a", "b"], &[("a", "b"), ("a", "ghost"), ("ghost", "b")]);
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.dropped_edges(), 2);
        assert!(!g.contains("ghost"));
    }

    #[test]
    fn test_parallel_edges_collapse() {
        let g = graph(&["a", "b"], &[("a", "b"), ("a", "b")]);
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.out_degree("a"), 1);
    }

    #[test]
    fn test_duplicate_node_replaces_record() {
        let mut g = SkeletonGraph::new();
        g.add_node(SkeletonNode::new("a", NodeType::default(), "old", ""));
        g.add_node(SkeletonNode::new("a", NodeType::Claim, "new", ""));
        assert_eq!(g.len(), 1);
        assert_eq!(g.node("a").map(|n| n.gist.as_str()), Some("new"));
    }

    #[test]
    fn test_descendants_exclude_source() {
        let g = graph(&["a", "b", "c", "d"], &[("a", "b"), ("b", "c")]);
        let desc = g.descendants("a");
        assert_eq!(desc.len(), 2);
        assert!(desc.contains("b"));
        assert!(desc.contains("c"));
        assert!(g.descendants("d").is_empty());
        assert!(g.descendants("ghost").is_empty());
    }

    #[test]
    fn test_shortest_path_respects_direction() {
        let g = graph(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("a", "c")]);
        assert_eq!(g.shortest_path_length("a", "c"), Some(1));
        assert_eq!(g.shortest_path_length("a", "a"), Some(0));
        assert_eq!(g.shortest_path_length("c", "a"), None);
        assert!(g.has_path("a", "c"));
        assert!(!g.has_path("c", "a"));
        assert!(!g.has_path("a", "ghost"));
    }

    #[test]
    fn test_weak_connectivity() {
        assert!(graph(&["a", "b", "c"], &[("a", "b"), ("c", "b")]).is_weakly_connected());
        assert!(!graph(&["a", "b", "c"], &[("a", "b")]).is_weakly_connected());
        assert!(graph(&["solo"], &[]).is_weakly_connected());
        assert!(!SkeletonGraph::new().is_weakly_connected());
    }

    #[test]
    fn test_undirected_distances() {
        let g = graph(&["a", "b", "c"], &[("a", "b"), ("c", "b")]);
        let src = g.index_of("a").unwrap();
        let dst = g.index_of("c").unwrap();
        assert_eq!(g.undirected_distances_from(src)[dst], Some(2));
        assert_eq!(g.distances_from(src)[dst], None);
    }
}
