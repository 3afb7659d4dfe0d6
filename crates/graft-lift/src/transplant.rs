//! Node-by-node copy of an extracted subgraph into the destination graph

use graft_core::{Graph, GraphError, Node, NodeId, OpDef, TopologyError, Value, ValueId, ValueRef};
use indexmap::IndexSet;

use crate::captures::CaptureIndex;
use crate::error::LiftResult;
use crate::op_map::OpMap;

/// How a boundary value is recreated in the destination graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryKind {
    /// Re-capture the outer value the source placeholder stands for.
    Capture(ValueRef),
    /// Copy the constant default and rebuild the placeholder-with-default around it.
    ConstDefault { default: ValueId },
    /// Fresh placeholder with the value's type and shape.
    Plain,
}

/// True when every dependency of `node` is a `Const` without control inputs.
pub fn constant_inputs(graph: &Graph, node: &Node) -> bool {
    graph.dependencies(node.id).iter().all(|dep| {
        graph
            .node(dep.node)
            .is_some_and(|n| n.is_const() && n.control_inputs.is_empty())
    })
}

/// Copies nodes and boundary values from `source` into `destination`, recording every
/// copy in an [`OpMap`].
pub struct Transplanter<'a> {
    source: &'a Graph,
    destination: &'a mut Graph,
    captures: CaptureIndex,
    handle_captures: bool,
    boundaries: IndexSet<ValueId>,
    op_map: OpMap,
}

impl<'a> Transplanter<'a> {
    pub fn new(
        source: &'a Graph,
        destination: &'a mut Graph,
        captures: CaptureIndex,
        handle_captures: bool,
    ) -> Self {
        Transplanter {
            source,
            destination,
            captures,
            handle_captures,
            boundaries: IndexSet::new(),
            op_map: OpMap::new(),
        }
    }

    /// Declare every value of the lift that is replaced rather than copied. A constant
    /// default that is itself one of them is not copied through its
    /// placeholder-with-default.
    pub fn with_boundaries(mut self, boundaries: impl IntoIterator<Item = ValueId>) -> Self {
        self.boundaries.extend(boundaries);
        self
    }

    pub fn op_map(&self) -> &OpMap {
        &self.op_map
    }

    pub fn into_op_map(self) -> OpMap {
        self.op_map
    }

    /// Decide how the boundary value `value` is recreated.
    pub fn classify_boundary(&self, value: &Value) -> LiftResult<BoundaryKind> {
        if self.handle_captures {
            if let Some(outer) = self.captures.outer(value.id) {
                return Ok(BoundaryKind::Capture(outer));
            }
        }

        let owner = self
            .source
            .node(value.node)
            .ok_or(GraphError::UnknownNode(value.node))?;
        if owner.is_placeholder_with_default() && constant_inputs(self.source, owner) {
            if let Some(&default) = owner.inputs.first() {
                if !self.boundaries.contains(&default) {
                    return Ok(BoundaryKind::ConstDefault { default });
                }
            }
        }

        Ok(BoundaryKind::Plain)
    }

    /// Recreate a boundary value in the destination and map it.
    ///
    /// Resource-handle metadata of the source value is copied onto the replacement. When
    /// the value is the only output of its producer, the producer is mapped to the
    /// replacement's node too, so control dependencies on it resolve.
    pub fn copy_boundary(&mut self, id: ValueId) -> LiftResult<ValueId> {
        if let Some(copy) = self.op_map.value(id) {
            return Ok(copy);
        }

        let source = self.source;
        let value = source.value(id).ok_or(GraphError::UnknownValue(id))?;
        let owner = source
            .node(value.node)
            .ok_or(GraphError::UnknownNode(value.node))?;
        let name = if value.index == 0 {
            owner.name.clone()
        } else {
            format!("{}_{}", owner.name, value.index)
        };
        let device = owner.device.as_deref();

        let kind = self.classify_boundary(value)?;
        let copy = match kind {
            BoundaryKind::Capture(outer) => self.destination.capture(outer, value.spec(), &name)?,
            BoundaryKind::ConstDefault { default } => {
                let default_node = source
                    .value(default)
                    .ok_or(GraphError::UnknownValue(default))?
                    .node;
                self.copy_node(default_node)?;
                let copied_default = self
                    .op_map
                    .value(default)
                    .ok_or(GraphError::UnknownValue(default))?;
                let placeholder = self.destination.create_placeholder_with_default(
                    copied_default,
                    value.shape.clone(),
                    device,
                    &name,
                )?;
                self.destination.output(placeholder, 0)?
            }
            BoundaryKind::Plain => {
                let placeholder = self
                    .destination
                    .create_placeholder(value.spec(), device, &name)?;
                self.destination.output(placeholder, 0)?
            }
        };

        if let Some(data) = value.handle_data.as_ref().filter(|d| !d.is_empty()) {
            self.destination.set_handle_data(copy, data.clone())?;
        }

        tracing::trace!(
            "boundary {} -> {} ({:?})",
            source.value_name(id),
            self.destination.value_name(copy),
            kind
        );
        self.op_map.insert_value(id, copy);
        if owner.outputs.len() == 1 && !self.op_map.contains_node(owner.id) {
            let replacement = self
                .destination
                .value(copy)
                .ok_or(GraphError::UnknownValue(copy))?
                .node;
            self.op_map.insert_node(owner.id, replacement);
        }
        Ok(copy)
    }

    /// Copy one node whose inputs and control inputs are already mapped.
    ///
    /// Type, attributes and device are reproduced verbatim. A node that was already
    /// copied is returned from the map instead.
    pub fn copy_node(&mut self, id: NodeId) -> LiftResult<NodeId> {
        if let Some(copy) = self.op_map.node(id) {
            return Ok(copy);
        }

        let source = self.source;
        let node = source.node(id).ok_or(GraphError::UnknownNode(id))?;

        let inputs = node
            .inputs
            .iter()
            .map(|&input| {
                self.op_map.value(input).ok_or_else(|| TopologyError::ForwardReference {
                    node: node.name.clone(),
                    dependency: source.value_name(input),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let control_inputs = node
            .control_inputs
            .iter()
            .map(|&dep| {
                self.op_map.node(dep).ok_or_else(|| TopologyError::ForwardReference {
                    node: node.name.clone(),
                    dependency: source
                        .node(dep)
                        .map_or_else(|| dep.to_string(), |n| n.name.clone()),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let outputs: Vec<&Value> = node.outputs.iter().filter_map(|&v| source.value(v)).collect();
        let def = OpDef::new(node.op_type.clone(), node.name.clone())
            .inputs(inputs)
            .outputs(outputs.iter().map(|v| v.spec()))
            .attrs(node.attrs.clone());

        let device = node.device.as_deref();
        let copy = self
            .destination
            .with_control_dependencies(&control_inputs, |graph| {
                graph.with_device(device, |graph| graph.create_node(def))
            })?;

        self.op_map.insert_node(id, copy);
        for (index, value) in outputs.iter().enumerate() {
            let copied = self.destination.output(copy, index)?;
            if let Some(data) = value.handle_data.as_ref().filter(|d| !d.is_empty()) {
                self.destination.set_handle_data(copied, data.clone())?;
            }
            self.op_map.insert_value(value.id, copied);
        }

        tracing::trace!("copied {} ({})", node.name, node.op_type);
        Ok(copy)
    }
}
