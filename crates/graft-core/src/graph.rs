//! Graph wrapper using petgraph::StableDiGraph with arena handles for nodes and values

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use indexmap::IndexMap;
use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;

use crate::error::{GraphError, GraphResult};
use crate::model::*;

static GRAPH_ID_COUNTER: AtomicU32 = AtomicU32::new(0);

/// A computational dependency graph.
///
/// Nodes are stored in a `StableDiGraph` whose edges point from producer to consumer;
/// values live in a side arena indexed by [`ValueId`]. Node names are unique. Handles
/// are allocated in creation order and never reused, so a node's handle is always
/// greater than the handles of everything it depends on.
pub struct Graph {
    id: GraphId,
    kind: GraphKind,
    inner: StableDiGraph<Node, Edge>,
    values: Vec<Value>,
    names: HashMap<String, NodeId>,
    /// Outer value -> internal placeholder value. Function-scoped graphs only.
    captures: IndexMap<ValueRef, ValueId>,
    /// `None` entries clear the device for the duration of the scope.
    device_stack: Vec<Option<String>>,
    control_stack: Vec<Vec<NodeId>>,
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("node_count", &self.inner.node_count())
            .field("value_count", &self.values.len())
            .field("capture_count", &self.captures.len())
            .finish()
    }
}

/// Renders one line per node in creation order:
/// `name = Op(producer:index, ...) ^control @device`.
impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in self.nodes() {
            write!(f, "{} = {}(", node.name, node.op_type)?;
            for (i, input) in node.inputs.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                f.write_str(&self.value_name(*input))?;
            }
            f.write_str(")")?;
            if !node.control_inputs.is_empty() {
                let names: Vec<&str> = node
                    .control_inputs
                    .iter()
                    .filter_map(|id| self.node(*id).map(|n| n.name.as_str()))
                    .collect();
                write!(f, " ^{}", names.join(","))?;
            }
            if let Some(device) = &node.device {
                write!(f, " @{}", device)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Graph {
    /// Create an empty top-level graph.
    pub fn new() -> Self {
        Self::with_kind(GraphKind::Root)
    }

    /// Create an empty function-scoped graph, able to capture outer values.
    pub fn function() -> Self {
        Self::with_kind(GraphKind::Function)
    }

    pub fn with_kind(kind: GraphKind) -> Self {
        Graph {
            id: GraphId(GRAPH_ID_COUNTER.fetch_add(1, Ordering::Relaxed)),
            kind,
            inner: StableDiGraph::new(),
            values: Vec::new(),
            names: HashMap::new(),
            captures: IndexMap::new(),
            device_stack: Vec::new(),
            control_stack: Vec::new(),
        }
    }

    pub fn id(&self) -> GraphId {
        self.id
    }

    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    pub fn is_function(&self) -> bool {
        self.kind == GraphKind::Function
    }

    /// Qualify a value handle of this graph for use from another graph.
    pub fn value_ref(&self, value: ValueId) -> ValueRef {
        ValueRef {
            graph: self.id,
            value,
        }
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Add a node. Fails on a duplicate name or on handles that do not belong to this
    /// graph; nothing is modified in that case.
    pub fn create_node(&mut self, def: OpDef) -> GraphResult<NodeId> {
        if self.names.contains_key(&def.name) {
            return Err(GraphError::DuplicateName(def.name));
        }
        for &input in &def.inputs {
            self.value(input).ok_or(GraphError::UnknownValue(input))?;
        }

        let mut control_inputs = def.control_inputs;
        for &dep in self.control_stack.iter().flatten() {
            if !control_inputs.contains(&dep) {
                control_inputs.push(dep);
            }
        }
        for &dep in &control_inputs {
            self.node(dep).ok_or(GraphError::UnknownNode(dep))?;
        }

        let device = def.device.or_else(|| self.current_device());

        let idx = self.inner.add_node(Node {
            id: NodeId::default(),
            name: def.name.clone(),
            op_type: def.op_type,
            inputs: def.inputs.clone(),
            control_inputs: control_inputs.clone(),
            outputs: Vec::new(),
            device,
            attrs: def.attrs,
        });
        let id = NodeId(idx.index() as u32);

        let mut outputs = Vec::with_capacity(def.outputs.len());
        for (index, spec) in def.outputs.into_iter().enumerate() {
            let value_id = ValueId(self.values.len() as u32);
            self.values.push(Value {
                id: value_id,
                node: id,
                index,
                dtype: spec.dtype,
                shape: spec.shape,
                handle_data: None,
            });
            outputs.push(value_id);
        }
        if let Some(node) = self.inner.node_weight_mut(idx) {
            node.id = id;
            node.outputs = outputs;
        }

        for (slot, input) in def.inputs.iter().enumerate() {
            let producer = &self.values[input.0 as usize];
            let edge = Edge::Data {
                output: producer.index,
                slot,
            };
            self.inner.add_edge(Self::index(producer.node), idx, edge);
        }
        for dep in control_inputs {
            self.inner.add_edge(Self::index(dep), idx, Edge::Control);
        }

        self.names.insert(def.name, id);
        Ok(id)
    }

    /// Add a `Placeholder` node producing one value of the given type and shape.
    pub fn create_placeholder(
        &mut self,
        spec: TensorSpec,
        device: Option<&str>,
        name: &str,
    ) -> GraphResult<NodeId> {
        let def = OpDef::new(op_types::PLACEHOLDER, name)
            .attr("dtype", AttrValue::Type(spec.dtype))
            .attr("shape", AttrValue::Shape(spec.shape.clone()))
            .output(spec);
        self.with_device(device, |graph| graph.create_node(def))
    }

    /// Add a `PlaceholderWithDefault` node reading `default` when it is not fed.
    pub fn create_placeholder_with_default(
        &mut self,
        default: ValueId,
        shape: Shape,
        device: Option<&str>,
        name: &str,
    ) -> GraphResult<NodeId> {
        let value = self.value(default).ok_or(GraphError::UnknownValue(default))?;
        if let (Some(expected), Some(actual)) = (shape.rank(), value.shape.rank()) {
            if expected != actual {
                return Err(GraphError::InvalidDefault {
                    name: name.to_string(),
                    reason: format!("default has shape {}, placeholder expects {}", value.shape, shape),
                });
            }
        }
        let dtype = value.dtype;
        let def = OpDef::new(op_types::PLACEHOLDER_WITH_DEFAULT, name)
            .input(default)
            .attr("dtype", AttrValue::Type(dtype))
            .attr("shape", AttrValue::Shape(shape.clone()))
            .output(TensorSpec::new(dtype, shape));
        self.with_device(device, |graph| graph.create_node(def))
    }

    /// Make an outer value available inside this function-scoped graph.
    ///
    /// Returns the internal placeholder standing in for `outer`, creating it on first
    /// use. A value that already belongs to this graph is returned unchanged.
    pub fn capture(&mut self, outer: ValueRef, spec: TensorSpec, name: &str) -> GraphResult<ValueId> {
        if outer.graph == self.id {
            self.value(outer.value)
                .ok_or(GraphError::UnknownValue(outer.value))?;
            return Ok(outer.value);
        }
        if !self.is_function() {
            return Err(GraphError::NotFunctionScoped(outer.value));
        }
        if let Some(&inner) = self.captures.get(&outer) {
            return Ok(inner);
        }

        // Captured placeholders are created outside any control scope.
        let saved = std::mem::take(&mut self.control_stack);
        let created = self.create_placeholder(spec, None, name);
        self.control_stack = saved;

        let node = created?;
        let inner = self.output(node, 0)?;
        tracing::debug!("captured {:?} as {} in {:?}", outer, name, self.id);
        self.captures.insert(outer, inner);
        Ok(inner)
    }

    /// Outer value -> internal placeholder, in capture order.
    pub fn captures(&self) -> &IndexMap<ValueRef, ValueId> {
        &self.captures
    }

    pub fn handle_data(&self, value: ValueId) -> Option<&ResourceHandleData> {
        self.value(value).and_then(|v| v.handle_data.as_ref())
    }

    /// Attach resource-handle metadata to a value, replacing any previous metadata.
    pub fn set_handle_data(&mut self, value: ValueId, data: ResourceHandleData) -> GraphResult<()> {
        let slot = self
            .values
            .get_mut(value.0 as usize)
            .ok_or(GraphError::UnknownValue(value))?;
        slot.handle_data = Some(data);
        Ok(())
    }

    // ========================================================================
    // Scopes
    // ========================================================================

    /// Run `f` with `device` as the default device of new nodes. `None` clears the
    /// default for the duration of the scope.
    pub fn with_device<R>(&mut self, device: Option<&str>, f: impl FnOnce(&mut Self) -> R) -> R {
        self.device_stack.push(device.map(str::to_string));
        let result = f(self);
        self.device_stack.pop();
        result
    }

    /// Run `f` with `deps` added as control inputs of every node it creates. Scopes nest.
    pub fn with_control_dependencies<R>(
        &mut self,
        deps: &[NodeId],
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        self.control_stack.push(deps.to_vec());
        let result = f(self);
        self.control_stack.pop();
        result
    }

    fn current_device(&self) -> Option<String> {
        self.device_stack.last().cloned().flatten()
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.inner.node_weight(Self::index(id))
    }

    pub fn value(&self, id: ValueId) -> Option<&Value> {
        self.values.get(id.0 as usize)
    }

    /// Owning node of a value.
    pub fn producer(&self, value: ValueId) -> Option<&Node> {
        self.value(value).and_then(|v| self.node(v.node))
    }

    /// The `index`-th output of `node`.
    pub fn output(&self, node: NodeId, index: usize) -> GraphResult<ValueId> {
        self.node(node)
            .ok_or(GraphError::UnknownNode(node))?
            .outputs
            .get(index)
            .copied()
            .ok_or_else(|| GraphError::UnknownReference(format!("{}:{}", node, index)))
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    /// Iterate over all nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.inner
            .node_indices()
            .filter_map(move |idx| self.inner.node_weight(idx))
    }

    pub fn find_node_by_name(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    /// Resolve `name:index`, or a bare `name` meaning output 0.
    pub fn find_value(&self, reference: &str) -> Option<ValueId> {
        let (name, index) = match reference.rsplit_once(':') {
            Some((name, index)) => (name, index.parse::<usize>().ok()?),
            None => (reference, 0),
        };
        let node = self.find_node_by_name(name)?;
        self.output(node, index).ok()
    }

    /// `producer:index` spelling of a value.
    pub fn value_name(&self, value: ValueId) -> String {
        match self.value(value) {
            Some(v) => match self.node(v.node) {
                Some(node) => format!("{}:{}", node.name, v.index),
                None => value.to_string(),
            },
            None => value.to_string(),
        }
    }

    /// Upstream nodes of `node`: producers of its inputs in input order, then its
    /// control inputs.
    pub fn dependencies(&self, node: NodeId) -> Vec<Dependency> {
        let Some(n) = self.node(node) else {
            return Vec::new();
        };
        let data = n.inputs.iter().filter_map(|&value| {
            self.value(value).map(|v| Dependency {
                node: v.node,
                value: Some(value),
            })
        });
        let control = n.control_inputs.iter().map(|&dep| Dependency {
            node: dep,
            value: None,
        });
        data.chain(control).collect()
    }

    /// Nodes reading any output of `node`, or depending on it through a control edge.
    pub fn consumers(&self, node: NodeId) -> Vec<NodeId> {
        let mut consumers: Vec<NodeId> = self
            .inner
            .edges_directed(Self::index(node), Direction::Outgoing)
            .map(|edge| NodeId(edge.target().index() as u32))
            .collect();
        consumers.sort();
        consumers.dedup();
        consumers
    }

    /// Nodes reading `value` through a data edge.
    pub fn value_consumers(&self, value: ValueId) -> Vec<NodeId> {
        let Some(v) = self.value(value) else {
            return Vec::new();
        };
        let mut consumers: Vec<NodeId> = self
            .inner
            .edges_directed(Self::index(v.node), Direction::Outgoing)
            .filter(|edge| matches!(edge.weight(), Edge::Data { output, .. } if *output == v.index))
            .map(|edge| NodeId(edge.target().index() as u32))
            .collect();
        consumers.sort();
        consumers.dedup();
        consumers
    }

    fn index(id: NodeId) -> NodeIndex {
        NodeIndex::new(id.0 as usize)
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}
