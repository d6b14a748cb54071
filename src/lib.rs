//! # gor-kernel
//!
//! Deterministic measurement of two-layer meta-documents.
//!
//! A meta-document has a **skeleton** (a directed graph of nodes, each with a
//! short gist and an expanded detail) and an **anchor** overlay (transitions
//! pointing at skeleton nodes). The kernel answers four questions about it:
//!
//! | Metric | Question |
//! |--------|----------|
//! | Q1 | How much meaning is lost reading only the reduced view? |
//! | Q2 | Do the anchors sit on, and reach, the structurally important nodes? |
//! | Q3 | Does the detail layer say something new at the anchors? |
//! | Q4 | Do anchors shorten the way to important nodes compared to a typical node? |
//!
//! ## Architecture
//!
//! ```text
//! raw input → Preflight → DocumentInput → VocabularyEncoder (fit once)
//!                                   ↓                ↓
//!                       SkeletonGraph + V*    Q1, Q3 (vector space)
//!                                   ↓
//!                            Q2, Q4 (graph)  →  MetricsReport
//! ```
//!
//! ## Determinism Guarantees
//!
//! - Same document + same config → identical report (and `report_hash`)
//! - Vocabulary columns are assigned in lexicographic term order
//! - Graph traversal and key-node sets are ordered by node id

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod encoder;
pub mod graph;
pub mod metrics;
pub mod preflight;
pub mod io;
pub mod pipeline;
pub mod canonical;
pub mod canonical_content;

// Re-exports
pub use types::{
    AnchorTransition, Anchors, AnchorResolution, DocumentInput, DocumentMeta, NodeId, NodeType,
    Preregistration, ReducedView, RunLog, Skeleton, SkeletonEdge, SkeletonNode, TextPair,
};
pub use encoder::{
    cosine_similarity, EncodedVector, EncoderError, Language, MorphAnalyzer, Morpheme,
    MorphologicalTokenizer, Tokenizer, VocabularyEncoder, WordBoundaryTokenizer, ENCODER_ID,
};
pub use graph::{safe_diameter, GraphError, KeyNodeExtractor, KeyNodeSet, SkeletonGraph};
pub use metrics::{
    compute_q1, compute_q2, compute_q3, compute_q4, AnchorGuidance, ChangeVisibility,
    MetricsConfig, RateDistortion, SkeletonAnchorAgreement,
};
pub use preflight::{Preflight, PreflightError, PreflightReport};
pub use io::{load_document, load_value, results_path_for, write_report, LoadError};
pub use pipeline::{DocumentEvaluator, MetricsReport, PipelineError};
pub use canonical::{to_canonical_bytes, canonical_hash, canonical_hash_hex};
pub use canonical_content::{
    normalize_text, canonical_content, compute_content_hash, CANONICAL_CONTENT_VERSION,
};

/// Schema version for all kernel record types.
/// Increment on breaking changes to any schema type.
pub const GOR_KERNEL_SCHEMA_VERSION: &str = "1.0.0";

/// Default metrics config version identifier.
pub const DEFAULT_CONFIG_VERSION: &str = "metrics_config_v1";

/// Version string written into every report.
pub const REPORT_VERSION: &str = concat!("gor-kernel-", env!("CARGO_PKG_VERSION"));
