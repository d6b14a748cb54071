//! Core types for the meta-document kernel.

pub mod node;
pub mod edge;
pub mod anchor;
pub mod document;

pub use node::{NodeId, NodeType, SkeletonNode};
pub use edge::{SkeletonEdge, DEFAULT_DEPENDENCY_KIND};
pub use anchor::{AnchorTransition, Anchors, AnchorResolution};
pub use document::{
    DocumentInput, DocumentMeta, Preregistration, RunLog, Skeleton, TextPair, ReducedView,
};
