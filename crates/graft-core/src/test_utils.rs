//! Test utilities for graft-core

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use crate::graph::Graph;
use crate::model::*;

/// Add a scalar f32 `Const` node.
pub fn constant(graph: &mut Graph, name: &str, value: f64) -> NodeId {
    graph
        .create_node(
            OpDef::new(op_types::CONST, name)
                .attr("value", AttrValue::Float(value))
                .output(TensorSpec::scalar(DType::Float32)),
        )
        .unwrap()
}

/// Add a single-output f32 node reading `inputs`.
pub fn op(graph: &mut Graph, op_type: &str, name: &str, inputs: &[NodeId]) -> NodeId {
    let inputs: Vec<ValueId> = inputs
        .iter()
        .map(|&node| graph.output(node, 0).unwrap())
        .collect();
    graph
        .create_node(
            OpDef::new(op_type, name)
                .inputs(inputs)
                .output(TensorSpec::scalar(DType::Float32)),
        )
        .unwrap()
}

/// `x = Placeholder`, `two = Const`, `y = Mul(x, two)`, `z = Identity(y) ^two`.
pub const SAMPLE_GRAPH: &str = r#"
{
  "nodes": [
    { "name": "x", "op": "Placeholder",
      "outputs": [{ "dtype": "float32", "shape": [2, null] }],
      "attrs": { "dtype": { "type": "float32" } } },
    { "name": "two", "op": "Const",
      "outputs": [{ "dtype": "float32", "shape": [] }],
      "attrs": { "value": { "float": 2.0 } } },
    { "name": "y", "op": "Mul", "inputs": ["x:0", "two"],
      "outputs": [{ "dtype": "float32", "shape": [2, null] }], "device": "cpu:0" },
    { "name": "z", "op": "Identity", "inputs": ["y:0"], "control_inputs": ["two"],
      "outputs": [{ "dtype": "float32", "shape": [2, null] }] }
  ]
}
"#;

/// Write `contents` to `name` inside a fresh temporary directory.
pub fn write_graph_file(name: &str, contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(name);
    fs::write(&path, contents).unwrap();
    (temp_dir, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_graph_file() {
        let (_dir, path) = write_graph_file("graph.json", SAMPLE_GRAPH);
        assert!(path.exists());
    }
}
