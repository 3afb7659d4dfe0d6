//! Lift orchestration: map every target, order, then copy

use std::collections::HashSet;

use graft_core::{Graph, GraphError, NodeId, ValueId};
use indexmap::IndexSet;

use crate::captures::CaptureIndex;
use crate::error::LiftResult;
use crate::mapper::{PlaceholderPolicy, TraversalContext, map_subgraph};
use crate::op_map::OpMap;
use crate::order::reverse_topological_order;
use crate::target::LiftTarget;
use crate::transplant::Transplanter;

/// Knobs for a single [`lift`] call.
#[derive(Debug, Clone, Default)]
pub struct LiftOptions {
    /// Values at which extraction stops; each is replaced by a placeholder.
    pub sources: Vec<ValueId>,
    /// When set, the nodes that may not be lifted. Placeholders outside the set become
    /// boundary values. When unset, any placeholder fails the lift unless
    /// `add_sources` is set.
    pub disallowed_placeholders: Option<HashSet<NodeId>>,
    /// Turn placeholders reached during traversal into boundary values.
    pub add_sources: bool,
    /// Between two function-scoped graphs, re-capture captured values instead of
    /// creating plain placeholders for them.
    pub handle_captures: bool,
}

impl LiftOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sources(mut self, sources: impl IntoIterator<Item = ValueId>) -> Self {
        self.sources.extend(sources);
        self
    }

    pub fn disallow(mut self, nodes: impl IntoIterator<Item = NodeId>) -> Self {
        self.disallowed_placeholders
            .get_or_insert_with(HashSet::new)
            .extend(nodes);
        self
    }

    pub fn add_sources(mut self, add_sources: bool) -> Self {
        self.add_sources = add_sources;
        self
    }

    pub fn handle_captures(mut self, handle_captures: bool) -> Self {
        self.handle_captures = handle_captures;
        self
    }
}

/// Copy `targets` and everything they transitively depend on from `source` into
/// `destination`, stopping at the configured sources.
///
/// Boundary values (the sources plus any placeholders accepted along the way) are
/// recreated first, then the remaining nodes are copied dependencies-first. The
/// returned [`OpMap`] relates every touched source node and value to its copy.
///
/// On error the destination may already hold some copied nodes; they are consistent
/// but unreferenced. `source` is never modified.
pub fn lift(
    source: &Graph,
    targets: &[LiftTarget],
    destination: &mut Graph,
    options: &LiftOptions,
) -> LiftResult<OpMap> {
    let mut sources: IndexSet<ValueId> = options.sources.iter().copied().collect();
    let mut ctx = TraversalContext::seeded(source, &sources)?;
    let policy = PlaceholderPolicy {
        disallowed: options.disallowed_placeholders.as_ref(),
        add_sources: options.add_sources,
    };

    let targets: IndexSet<LiftTarget> = targets.iter().copied().collect();
    let mut target_nodes = Vec::with_capacity(targets.len());
    for &target in &targets {
        let extra = map_subgraph(source, target, &sources, policy, &mut ctx)?;
        sources.extend(extra);
        target_nodes.push(target.node(source)?);
    }

    let boundary_nodes = sources
        .iter()
        .map(|&v| source.value(v).map(|value| value.node).ok_or(GraphError::UnknownValue(v)))
        .collect::<Result<IndexSet<NodeId>, _>>()?;
    let order = reverse_topological_order(source, &target_nodes, &boundary_nodes, &ctx)?;
    tracing::debug!(
        "extracted {} nodes behind {} boundary values for {} targets",
        order.len(),
        sources.len(),
        targets.len()
    );

    let captures = CaptureIndex::build(source, destination);
    tracing::debug!("{} captured values resolvable in the destination", captures.len());
    let mut transplanter = Transplanter::new(source, destination, captures, options.handle_captures)
        .with_boundaries(sources.iter().copied());
    for &boundary in &sources {
        transplanter.copy_boundary(boundary)?;
    }
    for &node in order.iter().rev() {
        if boundary_nodes.contains(&node) {
            continue;
        }
        transplanter.copy_node(node)?;
    }

    let op_map = transplanter.into_op_map();
    tracing::debug!(
        "lift copied {} nodes and mapped {} values",
        op_map.node_count(),
        op_map.value_count()
    );
    Ok(op_map)
}
