//! Graph builders shared by the lift tests

use graft_core::*;

/// Scalar f32 `Const`.
pub fn constant(graph: &mut Graph, name: &str, value: f64) -> NodeId {
    graph
        .create_node(
            OpDef::new(op_types::CONST, name)
                .attr("value", AttrValue::Float(value))
                .attr("dtype", AttrValue::Type(DType::Float32))
                .output(TensorSpec::scalar(DType::Float32)),
        )
        .unwrap()
}

/// Scalar f32 `Placeholder`.
pub fn placeholder(graph: &mut Graph, name: &str) -> NodeId {
    graph
        .create_placeholder(TensorSpec::scalar(DType::Float32), None, name)
        .unwrap()
}

/// Single-output f32 node reading output 0 of each of `inputs`.
pub fn op(graph: &mut Graph, op_type: &str, name: &str, inputs: &[NodeId]) -> NodeId {
    let inputs: Vec<ValueId> = inputs.iter().map(|&node| out(graph, node)).collect();
    graph
        .create_node(
            OpDef::new(op_type, name)
                .inputs(inputs)
                .output(TensorSpec::scalar(DType::Float32)),
        )
        .unwrap()
}

/// Output 0 of `node`.
pub fn out(graph: &Graph, node: NodeId) -> ValueId {
    graph.output(node, 0).unwrap()
}

/// `a = Const`, `b = Neg(a)`, `c = Exp(b)`.
pub fn chain() -> (Graph, NodeId, NodeId, NodeId) {
    let mut graph = Graph::new();
    let a = constant(&mut graph, "a", 1.0);
    let b = op(&mut graph, "Neg", "b", &[a]);
    let c = op(&mut graph, "Exp", "c", &[b]);
    (graph, a, b, c)
}

/// `a = Const`, `b = Neg(a)`, `c = Exp(a)`, `d = Add(b, c)`.
pub fn diamond() -> (Graph, [NodeId; 4]) {
    let mut graph = Graph::new();
    let a = constant(&mut graph, "a", 1.0);
    let b = op(&mut graph, "Neg", "b", &[a]);
    let c = op(&mut graph, "Exp", "c", &[a]);
    let d = op(&mut graph, "Add", "d", &[b, c]);
    (graph, [a, b, c, d])
}

/// Names of all nodes of `graph`, in creation order.
pub fn node_names(graph: &Graph) -> Vec<String> {
    graph.nodes().map(|n| n.name.clone()).collect()
}
