//! Copy order for an extracted subgraph

use graft_core::{Graph, NodeId};
use indexmap::IndexSet;

use crate::error::{LiftError, LiftResult};
use crate::mapper::TraversalContext;

/// Order the extracted nodes so that every node comes after all of its recorded
/// consumers. Reversing the result gives an order in which every node follows its
/// dependencies.
///
/// Nodes owning a boundary value are left out; they are replaced rather than copied.
/// Simultaneously ready nodes are taken in discovery order, so the result only depends
/// on the graph and the traversal.
pub fn reverse_topological_order(
    graph: &Graph,
    targets: &[NodeId],
    boundary_nodes: &IndexSet<NodeId>,
    ctx: &TraversalContext,
) -> LiftResult<Vec<NodeId>> {
    let all_consumers_marked = |node: NodeId, marked: &IndexSet<NodeId>| {
        ctx.consumers_of(node)
            .is_none_or(|consumers| consumers.iter().all(|c| marked.contains(c)))
    };

    let mut order = Vec::new();
    let mut marked: IndexSet<NodeId> = IndexSet::new();
    let mut ready: Vec<NodeId> = targets
        .iter()
        .copied()
        .filter(|&t| ctx.consumers_of(t).is_none_or(|c| c.is_empty()))
        .collect();
    // Pop in target order.
    ready.reverse();

    while let Some(id) = ready.pop() {
        if boundary_nodes.contains(&id) || !marked.insert(id) {
            continue;
        }
        order.push(id);

        for dep in graph.dependencies(id) {
            if boundary_nodes.contains(&dep.node) || marked.contains(&dep.node) {
                continue;
            }
            if all_consumers_marked(dep.node, &marked) {
                ready.push(dep.node);
            }
        }
    }

    let discovered = ctx
        .visited()
        .filter(|node| !boundary_nodes.contains(node))
        .count();
    if order.len() != discovered {
        return Err(LiftError::IncompleteOrder {
            ordered: order.len(),
            discovered,
        });
    }

    Ok(order)
}
