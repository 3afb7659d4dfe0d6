//! What a lift starts from

use std::fmt;

use graft_core::{Graph, GraphError, NodeId, ValueId};

use crate::error::LiftResult;

/// Something to lift: a whole node, or one value whose producer is lifted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiftTarget {
    Node(NodeId),
    Value(ValueId),
}

impl LiftTarget {
    /// The node traversal starts from.
    pub fn node(&self, graph: &Graph) -> LiftResult<NodeId> {
        match *self {
            LiftTarget::Node(id) => {
                graph.node(id).ok_or(GraphError::UnknownNode(id))?;
                Ok(id)
            }
            LiftTarget::Value(id) => Ok(graph.value(id).ok_or(GraphError::UnknownValue(id))?.node),
        }
    }

    /// Spelling of the target in `graph`, for messages.
    pub fn name(&self, graph: &Graph) -> String {
        match *self {
            LiftTarget::Node(id) => graph
                .node(id)
                .map_or_else(|| id.to_string(), |n| n.name.clone()),
            LiftTarget::Value(id) => graph.value_name(id),
        }
    }
}

impl From<NodeId> for LiftTarget {
    fn from(id: NodeId) -> Self {
        LiftTarget::Node(id)
    }
}

impl From<ValueId> for LiftTarget {
    fn from(id: ValueId) -> Self {
        LiftTarget::Value(id)
    }
}

impl fmt::Display for LiftTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiftTarget::Node(id) => write!(f, "{}", id),
            LiftTarget::Value(id) => write!(f, "{}", id),
        }
    }
}
