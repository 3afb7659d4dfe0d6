//! Error types for lifting subgraphs between graphs

use graft_core::{GraphError, NodeId, TopologyError};
use thiserror::Error;

use crate::target::LiftTarget;

/// Errors raised by [`lift`](crate::lift).
///
/// Only [`LiftError::Unliftable`] describes a property of the data being lifted. The
/// remaining variants mean a graph or the engine's own bookkeeping is inconsistent and
/// point at a bug in the caller.
#[derive(Error, Debug)]
pub enum LiftError {
    /// The target depends on a placeholder that may not be lifted
    #[error("unable to lift `{target_name}` because it depends transitively on placeholder `{placeholder_name}`")]
    Unliftable {
        /// Target whose traversal hit the placeholder
        target: LiftTarget,
        /// Target as spelled in the source graph
        target_name: String,
        /// Offending node in the source graph
        placeholder: NodeId,
        /// Offending node's name
        placeholder_name: String,
    },

    /// A graph rejected a lookup or construction
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// A node was about to be copied before one of its dependencies
    #[error(transparent)]
    Topology(#[from] TopologyError),

    /// The copy order does not cover the extracted subgraph
    #[error("copy order covers {ordered} of {discovered} extracted nodes")]
    IncompleteOrder {
        /// Nodes placed in the copy order
        ordered: usize,
        /// Non-boundary nodes found by traversal
        discovered: usize,
    },
}

/// Result type alias for lift operations
pub type LiftResult<T> = Result<T, LiftError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unliftable_display() {
        let err = LiftError::Unliftable {
            target: LiftTarget::Node(NodeId(3)),
            target_name: "loss".to_string(),
            placeholder: NodeId(0),
            placeholder_name: "labels".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("loss"));
        assert!(message.contains("labels"));
    }

    #[test]
    fn test_incomplete_order_display() {
        let err = LiftError::IncompleteOrder {
            ordered: 2,
            discovered: 3,
        };
        assert_eq!(err.to_string(), "copy order covers 2 of 3 extracted nodes");
    }
}
