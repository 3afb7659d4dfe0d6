//! Error types for graph construction
//!
//! Every failure here means the caller handed the graph something inconsistent: a name
//! that is already taken, a handle from another graph, a reference that does not resolve.

use thiserror::Error;

use crate::model::{NodeId, ValueId};

/// Errors raised by [`Graph`](crate::Graph) construction and lookup.
#[derive(Error, Debug)]
pub enum GraphError {
    /// A node with this name already exists
    #[error("duplicate node name: {0}")]
    DuplicateName(String),

    /// Node handle does not belong to this graph
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    /// Value handle does not belong to this graph
    #[error("unknown value: {0}")]
    UnknownValue(ValueId),

    /// A `name` or `name:index` reference that does not resolve
    #[error("unresolved reference: {0}")]
    UnknownReference(String),

    /// `capture` called on a graph that is not function-scoped
    #[error("graph is not function-scoped; cannot capture {0}")]
    NotFunctionScoped(ValueId),

    /// Default value does not match the placeholder it feeds
    #[error("invalid default for placeholder `{name}`: {reason}")]
    InvalidDefault {
        /// Placeholder name
        name: String,
        /// What was wrong
        reason: String,
    },
}

/// Result type alias for graph operations
pub type GraphResult<T> = Result<T, GraphError>;
