//! Creation-order check for graphs

use std::collections::HashSet;

use thiserror::Error;

use crate::graph::Graph;
use crate::model::NodeId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// A node refers to something that did not exist when it was created.
    #[error("node `{node}` depends on `{dependency}` before it exists")]
    ForwardReference { node: String, dependency: String },
}

/// Check that every node's inputs and control inputs were created before the node itself.
pub fn validate_topology(graph: &Graph) -> Result<(), TopologyError> {
    let mut available: HashSet<NodeId> = HashSet::new();

    for node in graph.nodes() {
        for dep in graph.dependencies(node.id) {
            if !available.contains(&dep.node) {
                let dependency = match dep.value {
                    Some(value) => graph.value_name(value),
                    None => graph
                        .node(dep.node)
                        .map_or_else(|| dep.node.to_string(), |n| n.name.clone()),
                };
                return Err(TopologyError::ForwardReference {
                    node: node.name.clone(),
                    dependency,
                });
            }
        }
        available.insert(node.id);
    }

    Ok(())
}
