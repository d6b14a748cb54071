//! Document-level input records.
//!
//! `DocumentInput` is the typed view of one loaded meta-document. Validation
//! (see [`crate::preflight`]) runs on the raw tree before this decoding step.

use serde::{Deserialize, Serialize};

use super::anchor::Anchors;
use super::edge::SkeletonEdge;
use super::node::SkeletonNode;
use crate::canonical_content::{compute_content_hash, normalize_text};

/// Document identity and language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    /// Document identifier.
    pub id: String,
    /// Language tag selecting the tokenizer (`en`, `ja`).
    pub lang: String,
}

/// Preregistered evaluation settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Preregistration {
    /// Evaluation mode; must be `union_k` to pass the gate.
    #[serde(default)]
    pub eval_mode: Option<String>,
    /// Reversible post-processing operations declared up front.
    #[serde(default)]
    pub phi_preserve: Vec<String>,
}

/// Run log identifying how the document was produced.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunLog {
    /// Seed of the producing run.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Producing model identifier.
    #[serde(default)]
    pub model_id: Option<String>,
    /// Content hash recorded by the producer.
    #[serde(default)]
    pub hash: Option<String>,
    /// Prompt, if recorded.
    #[serde(default)]
    pub prompt: Option<String>,
}

/// The skeleton layer: nodes and dependency edges.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Skeleton {
    /// Content nodes.
    #[serde(default)]
    pub nodes: Vec<SkeletonNode>,
    /// Dependency edges.
    #[serde(default)]
    pub edges: Vec<SkeletonEdge>,
}

impl Skeleton {
    /// Create a skeleton from nodes and edges.
    pub fn new(nodes: Vec<SkeletonNode>, edges: Vec<SkeletonEdge>) -> Self {
        Self { nodes, edges }
    }

    /// Encoder training corpus: one entry per node, gist and detail joined.
    pub fn corpus(&self) -> Vec<String> {
        self.nodes.iter().map(SkeletonNode::corpus_text).collect()
    }

    /// All gists joined by single spaces.
    pub fn gist_all(&self) -> String {
        join_trimmed(self.nodes.iter().map(|n| n.gist.as_str()))
    }

    /// All details joined by single spaces.
    pub fn detail_all(&self) -> String {
        join_trimmed(self.nodes.iter().map(|n| n.detail.as_str()))
    }

    /// SHA-256 over the canonical node texts and edge triples.
    ///
    /// Nodes are sorted by id and edges canonically, so input order does not
    /// affect the hash.
    pub fn content_hash(&self) -> String {
        let mut nodes: Vec<&SkeletonNode> = self.nodes.iter().collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        let mut edges: Vec<&SkeletonEdge> = self.edges.iter().collect();
        edges.sort();

        let mut canonical = String::new();
        for n in nodes {
            canonical.push_str(&format!(
                "node\t{}\t{}\t{}\t{}\n",
                n.id,
                n.node_type,
                normalize_text(&n.gist),
                normalize_text(&n.detail),
            ));
        }
        for e in edges {
            canonical.push_str(&format!("edge\t{}\t{}\t{}\n", e.from, e.to, e.dep));
        }
        compute_content_hash(&canonical)
    }
}

fn join_trimmed<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts.collect::<Vec<_>>().join(" ").trim().to_string()
}

/// One fully loaded meta-document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInput {
    /// Identity and language.
    pub document: DocumentMeta,
    /// Preregistration block.
    #[serde(default)]
    pub preregister: Option<Preregistration>,
    /// Run log.
    #[serde(default)]
    pub log: RunLog,
    /// Skeleton layer.
    #[serde(default)]
    pub skeleton: Skeleton,
    /// Anchor layer.
    #[serde(default)]
    pub anchors: Anchors,
}

impl DocumentInput {
    /// Decode a raw input tree.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

/// A gist/detail text pair, the unit compared by the rate-distortion metric.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextPair {
    /// Short layer.
    pub gist: String,
    /// Expanded layer.
    pub detail: String,
}

impl TextPair {
    /// Create a text pair.
    pub fn new(gist: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            gist: gist.into(),
            detail: detail.into(),
        }
    }

    /// Gist and detail joined by a space.
    pub fn joined(&self) -> String {
        format!("{} {}", self.gist, self.detail)
    }
}

/// Composition of the reduced view B used by the rate-distortion metric.
///
/// The full view T is always every gist plus every detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReducedView {
    /// B carries only the gists (detail left empty).
    #[default]
    GistOnly,
    /// B carries gists and details, identical to T.
    GistAndDetail,
}

impl ReducedView {
    /// Parse a view name (`gist_only`, `gist-and-detail`, ...).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "gist_only" | "gist" => Some(Self::GistOnly),
            "gist_and_detail" | "full" => Some(Self::GistAndDetail),
            _ => None,
        }
    }

    /// Build the (B, T) pair for a skeleton.
    pub fn views(&self, skeleton: &Skeleton) -> (TextPair, TextPair) {
        let gist_all = skeleton.gist_all();
        let detail_all = skeleton.detail_all();
        let full = TextPair::new(gist_all.clone(), detail_all);
        let reduced = match self {
            Self::GistOnly => TextPair::new(gist_all, ""),
            Self::GistAndDetail => full.clone(),
        };
        (reduced, full)
    }
}

impl std::fmt::Display for ReducedView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GistOnly => write!(f, "gist_only"),
            Self::GistAndDetail => write!(f, "gist_and_detail"),
        }
    }
}
