//! CLI command implementations

use std::path::{Path, PathBuf};

use anyhow::Context;
use graft_core::{Graph, load_graph, save_graph, validate_topology};
use graft_lift::LiftTarget;

use crate::config::{LiftConfig, resolve_target, resolve_value};

pub struct LiftArgs {
    pub graph: PathBuf,
    pub targets: Vec<String>,
    pub sources: Vec<String>,
    pub config: Option<PathBuf>,
    pub add_sources: bool,
    pub out: Option<PathBuf>,
    pub print_map: bool,
}

pub fn lift(args: LiftArgs) -> anyhow::Result<()> {
    let source = load_graph(&args.graph)?;

    let config = match &args.config {
        Some(path) => LiftConfig::load(path)?,
        None => LiftConfig::default(),
    };
    let mut options = config.resolve(&source)?;
    for reference in &args.sources {
        options.sources.push(resolve_value(&source, reference)?);
    }
    options.add_sources |= args.add_sources;

    let targets = args
        .targets
        .iter()
        .map(|reference| resolve_target(&source, reference))
        .collect::<anyhow::Result<Vec<LiftTarget>>>()?;

    let mut destination = Graph::new();
    let op_map = graft_lift::lift(&source, &targets, &mut destination, &options)
        .with_context(|| format!("lifting from {}", args.graph.display()))?;

    tracing::info!(
        "Lifted {} targets: {} nodes copied, {} values mapped",
        targets.len(),
        op_map.node_count(),
        op_map.value_count()
    );

    match &args.out {
        Some(path) => {
            save_graph(&destination, path)?;
            tracing::info!("Wrote {}", path.display());
        }
        None => print!("{}", destination),
    }

    if args.print_map {
        for (from, to) in op_map.value_names(&source, &destination) {
            println!("{} -> {}", from, to);
        }
    }

    Ok(())
}

pub fn show(path: &Path) -> anyhow::Result<()> {
    let graph = load_graph(path)?;
    print!("{}", graph);
    Ok(())
}

pub fn check(path: &Path) -> anyhow::Result<()> {
    let graph = load_graph(path)?;
    validate_topology(&graph).with_context(|| format!("checking {}", path.display()))?;

    tracing::info!("{} nodes, topologically sound", graph.node_count());
    println!("ok: {} nodes", graph.node_count());
    Ok(())
}
