//! Reading and writing graph files

use std::path::Path;

use anyhow::Context;

use crate::def::GraphDef;
use crate::graph::Graph;

/// Extension used for graph files.
pub const GRAPH_EXTENSION: &str = "json";

/// Load a graph from a JSON [`GraphDef`] file.
pub fn load_graph(path: &Path) -> anyhow::Result<Graph> {
    let json_str = std::fs::read_to_string(path)
        .with_context(|| format!("reading graph file {}", path.display()))?;
    let def: GraphDef = serde_json::from_str(&json_str)
        .with_context(|| format!("parsing graph file {}", path.display()))?;
    let graph = Graph::from_def(&def)
        .with_context(|| format!("building graph from {}", path.display()))?;

    tracing::debug!(
        "Loaded graph with {} nodes from: {}",
        graph.node_count(),
        path.display()
    );
    Ok(graph)
}

/// Write a graph as a pretty-printed JSON [`GraphDef`], creating parent directories.
pub fn save_graph(graph: &Graph, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let json_str = serde_json::to_string_pretty(&graph.to_def())?;
    std::fs::write(path, json_str)
        .with_context(|| format!("writing graph file {}", path.display()))?;

    tracing::debug!("Graph saved: {}", path.display());
    Ok(())
}
