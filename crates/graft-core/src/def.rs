//! Serializable graph definition used for graph files
//!
//! Values are referenced as `producer:index` (a bare `producer` means output 0) and
//! control inputs by node name, so a definition stays readable and hand-editable.

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};
use crate::graph::Graph;
use crate::model::*;

/// A whole graph, nodes listed in creation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GraphDef {
    #[serde(default)]
    pub kind: GraphKind,
    pub nodes: Vec<NodeDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDef {
    pub name: String,
    pub op: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub control_inputs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<OutputDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    pub attrs: Attrs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputDef {
    pub dtype: DType,
    #[serde(default)]
    pub shape: Shape,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle_data: Option<ResourceHandleData>,
}

impl Graph {
    /// Build a graph from its definition. Nodes must be listed after everything they
    /// reference.
    pub fn from_def(def: &GraphDef) -> GraphResult<Graph> {
        let mut graph = Graph::with_kind(def.kind);

        for node in &def.nodes {
            let inputs = node
                .inputs
                .iter()
                .map(|reference| {
                    graph
                        .find_value(reference)
                        .ok_or_else(|| GraphError::UnknownReference(reference.clone()))
                })
                .collect::<GraphResult<Vec<_>>>()?;
            let control_inputs = node
                .control_inputs
                .iter()
                .map(|name| {
                    graph
                        .find_node_by_name(name.trim_start_matches('^'))
                        .ok_or_else(|| GraphError::UnknownReference(name.clone()))
                })
                .collect::<GraphResult<Vec<_>>>()?;

            let mut op = OpDef::new(node.op.clone(), node.name.clone())
                .inputs(inputs)
                .outputs(
                    node.outputs
                        .iter()
                        .map(|out| TensorSpec::new(out.dtype, out.shape.clone())),
                )
                .attrs(node.attrs.clone());
            op.control_inputs = control_inputs;
            op.device = node.device.clone();

            let id = graph.create_node(op)?;
            for (index, out) in node.outputs.iter().enumerate() {
                if let Some(data) = &out.handle_data {
                    let value = graph.output(id, index)?;
                    graph.set_handle_data(value, data.clone())?;
                }
            }
        }

        Ok(graph)
    }

    /// Describe this graph as a definition. Captures are not part of the definition.
    pub fn to_def(&self) -> GraphDef {
        let nodes = self
            .nodes()
            .map(|node| NodeDef {
                name: node.name.clone(),
                op: node.op_type.clone(),
                inputs: node.inputs.iter().map(|&v| self.value_name(v)).collect(),
                control_inputs: node
                    .control_inputs
                    .iter()
                    .filter_map(|&id| self.node(id).map(|n| n.name.clone()))
                    .collect(),
                outputs: node
                    .outputs
                    .iter()
                    .filter_map(|&v| self.value(v))
                    .map(|v| OutputDef {
                        dtype: v.dtype,
                        shape: v.shape.clone(),
                        handle_data: v.handle_data.clone(),
                    })
                    .collect(),
                device: node.device.clone(),
                attrs: node.attrs.clone(),
            })
            .collect();

        GraphDef {
            kind: self.kind(),
            nodes,
        }
    }
}
