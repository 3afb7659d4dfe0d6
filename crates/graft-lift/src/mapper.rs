//! Backward traversal discovering the subgraph a target depends on

use std::collections::HashSet;

use graft_core::{Graph, GraphError, NodeId, ValueId};
use indexmap::{IndexMap, IndexSet};

use crate::error::{LiftError, LiftResult};
use crate::target::LiftTarget;

/// Traversal state shared by every target of one lift.
///
/// `visited` holds nodes already inspected; `consumers` records, for each node, the
/// visited nodes that read one of its outputs or depend on it through a control edge.
/// Both are insertion-ordered so the copy order is reproducible.
#[derive(Debug, Default)]
pub struct TraversalContext {
    visited: IndexSet<NodeId>,
    consumers: IndexMap<NodeId, IndexSet<NodeId>>,
}

impl TraversalContext {
    /// Start a traversal in which the producers of `sources` count as already visited.
    pub fn seeded(graph: &Graph, sources: &IndexSet<ValueId>) -> LiftResult<Self> {
        let mut ctx = TraversalContext::default();
        for &source in sources {
            let value = graph.value(source).ok_or(GraphError::UnknownValue(source))?;
            ctx.visited.insert(value.node);
        }
        Ok(ctx)
    }

    pub fn is_visited(&self, node: NodeId) -> bool {
        self.visited.contains(&node)
    }

    /// Nodes inspected so far, in visit order.
    pub fn visited(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.visited.iter().copied()
    }

    /// Consumers of `node` recorded so far.
    pub fn consumers_of(&self, node: NodeId) -> Option<&IndexSet<NodeId>> {
        self.consumers.get(&node)
    }

    fn record_edge(&mut self, producer: NodeId, consumer: NodeId) {
        self.consumers.entry(producer).or_default().insert(consumer);
    }
}

/// Placeholder policy for a traversal.
#[derive(Debug, Clone, Copy)]
pub struct PlaceholderPolicy<'a> {
    /// When set, exactly these nodes are rejected and any other placeholder becomes a
    /// boundary. When unset, every placeholder is rejected unless `add_sources` is set.
    pub disallowed: Option<&'a HashSet<NodeId>>,
    pub add_sources: bool,
}

/// Walk backwards from `target`, recording every edge in `ctx`, and stop at `sources`.
///
/// Returns the outputs of the placeholders reached on the way; they were not named as
/// sources but will be boundary values of the copy. Fails with
/// [`LiftError::Unliftable`] on the first placeholder the policy rejects.
pub fn map_subgraph(
    graph: &Graph,
    target: LiftTarget,
    sources: &IndexSet<ValueId>,
    policy: PlaceholderPolicy<'_>,
    ctx: &mut TraversalContext,
) -> LiftResult<IndexSet<ValueId>> {
    let mut to_visit = vec![target.node(graph)?];
    let mut extra_sources = IndexSet::new();

    while let Some(id) = to_visit.pop() {
        if !ctx.visited.insert(id) {
            continue;
        }
        let node = graph.node(id).ok_or(GraphError::UnknownNode(id))?;

        let should_raise = match policy.disallowed {
            Some(disallowed) if disallowed.contains(&id) => true,
            _ if node.is_placeholder() => {
                extra_sources.extend(node.outputs.iter().copied());
                policy.disallowed.is_none() && !policy.add_sources
            }
            _ => false,
        };
        if should_raise {
            return Err(LiftError::Unliftable {
                target,
                target_name: target.name(graph),
                placeholder: id,
                placeholder_name: node.name.clone(),
            });
        }

        for dep in graph.dependencies(id) {
            ctx.record_edge(dep.node, id);
            let at_boundary = dep
                .value
                .is_some_and(|v| sources.contains(&v) || extra_sources.contains(&v));
            if !at_boundary && !ctx.is_visited(dep.node) {
                to_visit.push(dep.node);
            }
        }
    }

    tracing::trace!(
        "mapped {} ({} nodes visited, {} new boundary values)",
        target.name(graph),
        ctx.visited.len(),
        extra_sources.len()
    );
    Ok(extra_sources)
}
