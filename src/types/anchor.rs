//! Anchor (transition) types.
//!
//! Anchors are reader-guidance waypoints overlaid on the skeleton. Every metric
//! treats them as a set of graph entry points, so resolution happens once here
//! and the metrics only ever see node ids that exist.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::node::NodeId;

/// A single anchor transition referencing a skeleton node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnchorTransition {
    /// Referenced node id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<NodeId>,
    /// Auxiliary metadata (labels, kinds, ...). Not used by the metrics.
    #[serde(flatten)]
    pub meta: BTreeMap<String, serde_json::Value>,
}

impl AnchorTransition {
    /// Create a transition at a node.
    pub fn at(id: impl Into<NodeId>) -> Self {
        Self {
            at: Some(id.into()),
            meta: BTreeMap::new(),
        }
    }

    /// Attach a metadata field.
    pub fn with_meta(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.meta.insert(key.into(), value);
        self
    }
}

/// Ordered sequence of anchor transitions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Anchors {
    /// Transitions in document order.
    #[serde(default)]
    pub transitions: Vec<AnchorTransition>,
}

impl Anchors {
    /// Create from a list of transitions.
    pub fn new(transitions: Vec<AnchorTransition>) -> Self {
        Self { transitions }
    }

    /// Convenience constructor: one transition per node id.
    pub fn at_nodes<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<NodeId>,
    {
        Self::new(ids.into_iter().map(AnchorTransition::at).collect())
    }

    /// Resolve anchor references against the set of known node ids.
    ///
    /// Missing or empty `at` references and ids rejected by `exists` are
    /// dropped and counted. Duplicates collapse to their first occurrence.
    pub fn resolve<F>(&self, exists: F) -> AnchorResolution
    where
        F: Fn(&str) -> bool,
    {
        let mut seen: BTreeSet<&NodeId> = BTreeSet::new();
        let mut resolved = Vec::new();
        let mut unresolved = 0usize;

        for t in &self.transitions {
            match &t.at {
                Some(id) if !id.is_empty() && exists(id.as_str()) => {
                    if seen.insert(id) {
                        resolved.push(id.clone());
                    }
                }
                _ => {
                    tracing::debug!(at = ?t.at, "dropping unresolved anchor");
                    unresolved += 1;
                }
            }
        }

        AnchorResolution { resolved, unresolved }
    }
}

/// Result of resolving anchors against a skeleton.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnchorResolution {
    /// Distinct resolvable anchor node ids, in first-occurrence order.
    pub resolved: Vec<NodeId>,
    /// Number of transitions that could not be resolved.
    pub unresolved: usize,
}

impl AnchorResolution {
    /// Whether no anchor resolved.
    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_drops_missing_and_unknown() {
        let anchors = Anchors::new(vec![
            AnchorTransition::at("a"),
            AnchorTransition::default(),
            AnchorTransition::at(""),
            AnchorTransition::at("ghost"),
            AnchorTransition::at("b"),
        ]);

        let res = anchors.resolve(|id| id == "a" || id == "b");
        assert_eq!(res.resolved, vec![NodeId::from("a"), NodeId::from("b")]);
        assert_eq!(res.unresolved, 3);
    }

    #[test]
    fn test_resolve_dedups_preserving_order() {
        let anchors = Anchors::at_nodes(["b", "a", "b"]);
        let res = anchors.resolve(|_| true);
        assert_eq!(res.resolved, vec![NodeId::from("b"), NodeId::from("a")]);
        assert_eq!(res.unresolved, 0);
    }

    #[test]
    fn test_transition_keeps_metadata() {
        let t: AnchorTransition =
            serde_json::from_str(r#"{"at": "n2", "kind": "pivot", "label": "shift"}"#).unwrap();
        assert_eq!(t.at, Some(NodeId::from("n2")));
        assert_eq!(t.meta["kind"], "pivot");
        assert_eq!(t.meta.len(), 2);
    }
}
