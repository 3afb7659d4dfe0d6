//! Core data structures for the dependency graph

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Op type tags the lift engine gives special meaning to.
pub mod op_types {
    /// An external input with no producer.
    pub const PLACEHOLDER: &str = "Placeholder";
    /// An external input that falls back to its single input when not fed.
    pub const PLACEHOLDER_WITH_DEFAULT: &str = "PlaceholderWithDefault";
    /// A literal value stored in the `value` attribute.
    pub const CONST: &str = "Const";
}

/// Process-unique identifier of a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GraphId(pub u32);

/// Handle of a node inside its owning graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct NodeId(pub u32);

/// Handle of a value (one node output) inside its owning graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct ValueId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "value#{}", self.0)
    }
}

/// A value qualified by the graph that owns it.
///
/// Handles are only meaningful inside one graph, so anything that points across graph
/// boundaries (captures) carries one of these instead of a bare [`ValueId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueRef {
    pub graph: GraphId,
    pub value: ValueId,
}

/// Whether a graph is a top-level graph or the body of a function that can capture
/// values from an enclosing graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GraphKind {
    #[default]
    Root,
    Function,
}

/// Element type of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DType {
    Bool,
    Int32,
    Int64,
    Float16,
    Float32,
    Float64,
    String,
    /// Handle to a resource living outside the graph (variables, tables, ...).
    Resource,
    Variant,
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::Bool => "bool",
            DType::Int32 => "i32",
            DType::Int64 => "i64",
            DType::Float16 => "f16",
            DType::Float32 => "f32",
            DType::Float64 => "f64",
            DType::String => "string",
            DType::Resource => "resource",
            DType::Variant => "variant",
        };
        f.write_str(name)
    }
}

/// Possibly partial shape. `None` means the rank itself is unknown; a `None` dimension
/// means that dimension is unknown.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Shape(pub Option<Vec<Option<u64>>>);

impl Shape {
    pub fn unknown() -> Self {
        Shape(None)
    }

    pub fn scalar() -> Self {
        Shape(Some(Vec::new()))
    }

    /// Fully known shape.
    pub fn known(dims: &[u64]) -> Self {
        Shape(Some(dims.iter().map(|&d| Some(d)).collect()))
    }

    pub fn rank(&self) -> Option<usize> {
        self.0.as_ref().map(Vec::len)
    }

    pub fn is_fully_defined(&self) -> bool {
        self.0
            .as_ref()
            .is_some_and(|dims| dims.iter().all(Option::is_some))
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(dims) = &self.0 else {
            return f.write_str("?");
        };
        f.write_str("[")?;
        for (i, dim) in dims.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            match dim {
                Some(d) => write!(f, "{}", d)?,
                None => f.write_str("?")?,
            }
        }
        f.write_str("]")
    }
}

/// Data type and shape of a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TensorSpec {
    pub dtype: DType,
    #[serde(default)]
    pub shape: Shape,
}

impl TensorSpec {
    pub fn new(dtype: DType, shape: Shape) -> Self {
        TensorSpec { dtype, shape }
    }

    pub fn scalar(dtype: DType) -> Self {
        TensorSpec::new(dtype, Shape::scalar())
    }
}

/// Opaque attribute value. The graph never interprets these; the lift engine copies them
/// verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Type(DType),
    Shape(Shape),
    Ints(Vec<i64>),
    Floats(Vec<f64>),
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Bool(v) => write!(f, "{}", v),
            AttrValue::Int(v) => write!(f, "{}", v),
            AttrValue::Float(v) => write!(f, "{}", v),
            AttrValue::Str(v) => write!(f, "{:?}", v),
            AttrValue::Type(v) => write!(f, "{}", v),
            AttrValue::Shape(v) => write!(f, "{}", v),
            AttrValue::Ints(v) => write!(f, "{:?}", v),
            AttrValue::Floats(v) => write!(f, "{:?}", v),
        }
    }
}

/// Node attributes, ordered by key.
pub type Attrs = BTreeMap<String, AttrValue>;

/// One (shape, dtype) entry describing the resource behind a handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandleShapeAndType {
    pub shape: Shape,
    pub dtype: DType,
}

/// Metadata attached to resource-handle values. Propagated as-is, never recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct ResourceHandleData {
    pub shapes_and_types: Vec<HandleShapeAndType>,
}

impl ResourceHandleData {
    pub fn new(entries: impl IntoIterator<Item = (Shape, DType)>) -> Self {
        ResourceHandleData {
            shapes_and_types: entries
                .into_iter()
                .map(|(shape, dtype)| HandleShapeAndType { shape, dtype })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.shapes_and_types.is_empty()
    }
}

/// A single output slot of a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub id: ValueId,
    /// Owning node.
    pub node: NodeId,
    /// Position among the owning node's outputs.
    pub index: usize,
    pub dtype: DType,
    pub shape: Shape,
    pub handle_data: Option<ResourceHandleData>,
}

impl Value {
    pub fn spec(&self) -> TensorSpec {
        TensorSpec::new(self.dtype, self.shape.clone())
    }
}

/// A single node in the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub op_type: String,
    pub inputs: Vec<ValueId>,
    pub control_inputs: Vec<NodeId>,
    pub outputs: Vec<ValueId>,
    pub device: Option<String>,
    pub attrs: Attrs,
}

impl Node {
    pub fn is_placeholder(&self) -> bool {
        self.op_type == op_types::PLACEHOLDER
    }

    pub fn is_placeholder_with_default(&self) -> bool {
        self.op_type == op_types::PLACEHOLDER_WITH_DEFAULT
    }

    pub fn is_const(&self) -> bool {
        self.op_type == op_types::CONST
    }
}

/// Relationship recorded on a graph edge, from producer to consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    /// Output `output` of the producer feeds input `slot` of the consumer.
    Data { output: usize, slot: usize },
    /// The consumer must run after the producer.
    Control,
}

/// An upstream node a consumer depends on, with the value that links them when the
/// dependency is a data dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependency {
    pub node: NodeId,
    pub value: Option<ValueId>,
}

/// Everything needed to create a node.
///
/// Control inputs and device given here are combined with any active
/// [`Graph::with_control_dependencies`](crate::Graph::with_control_dependencies) and
/// [`Graph::with_device`](crate::Graph::with_device) scopes.
#[derive(Debug, Clone, PartialEq)]
pub struct OpDef {
    pub op_type: String,
    pub name: String,
    pub inputs: Vec<ValueId>,
    pub control_inputs: Vec<NodeId>,
    pub outputs: Vec<TensorSpec>,
    pub attrs: Attrs,
    pub device: Option<String>,
}

impl OpDef {
    pub fn new(op_type: impl Into<String>, name: impl Into<String>) -> Self {
        OpDef {
            op_type: op_type.into(),
            name: name.into(),
            inputs: Vec::new(),
            control_inputs: Vec::new(),
            outputs: Vec::new(),
            attrs: Attrs::new(),
            device: None,
        }
    }

    pub fn input(mut self, value: ValueId) -> Self {
        self.inputs.push(value);
        self
    }

    pub fn inputs(mut self, values: impl IntoIterator<Item = ValueId>) -> Self {
        self.inputs.extend(values);
        self
    }

    pub fn control_input(mut self, node: NodeId) -> Self {
        self.control_inputs.push(node);
        self
    }

    pub fn output(mut self, spec: TensorSpec) -> Self {
        self.outputs.push(spec);
        self
    }

    pub fn outputs(mut self, specs: impl IntoIterator<Item = TensorSpec>) -> Self {
        self.outputs.extend(specs);
        self
    }

    pub fn attr(mut self, key: impl Into<String>, value: AttrValue) -> Self {
        self.attrs.insert(key.into(), value);
        self
    }

    pub fn attrs(mut self, attrs: Attrs) -> Self {
        self.attrs.extend(attrs);
        self
    }

    pub fn device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }
}
