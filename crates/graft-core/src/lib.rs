//! Graft Core — dependency graph model, construction API and graph files

pub mod def;
pub mod error;
pub mod graph;
pub mod model;
pub mod snapshot;
pub mod topology;


#[cfg(test)]
pub mod test_utils;

pub use def::{GraphDef, NodeDef, OutputDef};
pub use error::{GraphError, GraphResult};
pub use graph::Graph;
pub use model::{
    AttrValue, Attrs, DType, Dependency, Edge, GraphId, GraphKind, HandleShapeAndType, Node,
    NodeId, OpDef, ResourceHandleData, Shape, TensorSpec, Value, ValueId, ValueRef, op_types,
};
pub use snapshot::{GRAPH_EXTENSION, load_graph, save_graph};
pub use topology::{TopologyError, validate_topology};
