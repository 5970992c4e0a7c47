//! Error types for graph processing and matrix extraction.
//!
//! All fallible operations in this crate return [`TcmResult`]. The variants
//! carry enough context to identify the offending node or annotation without
//! holding references into the graph.

use thiserror::Error;

/// Result type alias for graph and matrix operations.
pub type TcmResult<T> = Result<T, TcmError>;

/// Error type for the Mapper-graph-to-matrices pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TcmError {
    /// A node's member entry or an edge endpoint cannot be resolved against
    /// the graph schema at all (wrong type or out of the valid domain).
    ///
    /// Members that are merely absent from the supplied time index set are
    /// not an error — they are excluded from the matrices. This variant is
    /// reserved for entries that could never resolve: negative or
    /// non-integral member indices, and links naming node keys the graph
    /// does not contain.
    #[error("schema mismatch at node `{node}`: {detail}")]
    SchemaMismatch {
        /// Key of the node (or link endpoint) that failed to resolve.
        node: String,
        /// Human-readable description of the incompatibility.
        detail: String,
    },

    /// A sequence-shaped annotation did not cover the annotated set exactly.
    ///
    /// Scalar annotations broadcast and keyed annotations are partial by
    /// design; a plain sequence must supply exactly one value per entity.
    #[error("annotation `{name}` supplies {supplied} values for {expected} entries")]
    AnnotationLength {
        /// Attribute name being assigned.
        name: String,
        /// Number of values supplied by the caller.
        supplied: usize,
        /// Number of entities the annotation must cover.
        expected: usize,
    },

    /// A session query or transform was issued before any successful `fit`.
    #[error("no fitted state: call fit() before {0}")]
    NotFitted(&'static str),

    /// `annotate_members` was called but the member co-occurrence graph was
    /// not built during `fit` (see `SessionConfig::build_member_graph`).
    #[error("member graph was not built; enable build_member_graph in SessionConfig")]
    MemberGraphUnavailable,
}

impl TcmError {
    /// Construct a [`TcmError::SchemaMismatch`] for a node key.
    pub fn schema(node: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            node: node.into(),
            detail: detail.into(),
        }
    }
}
