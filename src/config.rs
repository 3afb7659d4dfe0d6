//! Lift options read from a TOML file

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, bail};
use graft_core::{Graph, ValueId};
use graft_lift::{LiftOptions, LiftTarget};
use serde::{Deserialize, Serialize};

/// On-disk form of [`LiftOptions`], with nodes and values spelled by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiftConfig {
    /// Values (`name:index`, or `name` for output 0) at which extraction stops
    pub sources: Vec<String>,
    /// Node names that may not be lifted
    pub disallowed_placeholders: Option<Vec<String>>,
    pub add_sources: bool,
    pub handle_captures: bool,
}

impl LiftConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading lift config {}", path.display()))?;
        let config = toml::from_str(&contents)
            .with_context(|| format!("parsing lift config {}", path.display()))?;
        tracing::debug!("Loaded lift config: {}", path.display());
        Ok(config)
    }

    /// Resolve every name against `graph`.
    pub fn resolve(&self, graph: &Graph) -> anyhow::Result<LiftOptions> {
        let sources = self
            .sources
            .iter()
            .map(|name| resolve_value(graph, name))
            .collect::<anyhow::Result<Vec<ValueId>>>()?;

        let disallowed_placeholders = match &self.disallowed_placeholders {
            Some(names) => Some(
                names
                    .iter()
                    .map(|name| {
                        graph
                            .find_node_by_name(name)
                            .with_context(|| format!("no node named `{}`", name))
                    })
                    .collect::<anyhow::Result<HashSet<_>>>()?,
            ),
            None => None,
        };

        Ok(LiftOptions {
            sources,
            disallowed_placeholders,
            add_sources: self.add_sources,
            handle_captures: self.handle_captures,
        })
    }
}

pub fn resolve_value(graph: &Graph, reference: &str) -> anyhow::Result<ValueId> {
    graph
        .find_value(reference)
        .with_context(|| format!("no value `{}`", reference))
}

/// `name:index` names a value, a bare `name` names a node.
pub fn resolve_target(graph: &Graph, reference: &str) -> anyhow::Result<LiftTarget> {
    if reference.contains(':') {
        return resolve_value(graph, reference).map(LiftTarget::Value);
    }
    match graph.find_node_by_name(reference) {
        Some(node) => Ok(LiftTarget::Node(node)),
        None => bail!("no node named `{}`", reference),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_core::{DType, OpDef, TensorSpec, op_types};

    fn sample() -> Graph {
        let mut graph = Graph::new();
        let x = graph
            .create_placeholder(TensorSpec::scalar(DType::Float32), None, "x")
            .unwrap();
        let x_out = graph.output(x, 0).unwrap();
        graph
            .create_node(
                OpDef::new(op_types::CONST, "k").output(TensorSpec::scalar(DType::Float32)),
            )
            .unwrap();
        graph
            .create_node(
                OpDef::new("Neg", "y")
                    .input(x_out)
                    .output(TensorSpec::scalar(DType::Float32)),
            )
            .unwrap();
        graph
    }

    #[test]
    fn test_parse_config() {
        let config: LiftConfig = toml::from_str(
            r#"
            sources = ["x:0"]
            disallowed_placeholders = ["k"]
            handle_captures = true
            "#,
        )
        .unwrap();

        assert_eq!(config.sources, vec!["x:0"]);
        assert_eq!(config.disallowed_placeholders, Some(vec!["k".to_string()]));
        assert!(!config.add_sources);
        assert!(config.handle_captures);
    }

    #[test]
    fn test_empty_config_is_default() {
        let config: LiftConfig = toml::from_str("").unwrap();
        assert_eq!(config, LiftConfig::default());
    }

    #[test]
    fn test_resolve_names() {
        let graph = sample();
        let config = LiftConfig {
            sources: vec!["x".to_string()],
            disallowed_placeholders: Some(vec!["k".to_string()]),
            add_sources: true,
            handle_captures: false,
        };

        let options = config.resolve(&graph).unwrap();

        assert_eq!(options.sources, vec![graph.find_value("x:0").unwrap()]);
        let disallowed = options.disallowed_placeholders.unwrap();
        assert!(disallowed.contains(&graph.find_node_by_name("k").unwrap()));
        assert!(options.add_sources);
    }

    #[test]
    fn test_resolve_unknown_name() {
        let graph = sample();
        let config = LiftConfig {
            sources: vec!["missing:0".to_string()],
            ..LiftConfig::default()
        };

        let err = config.resolve(&graph).unwrap_err();
        assert!(err.to_string().contains("missing:0"));
    }

    #[test]
    fn test_resolve_target() {
        let graph = sample();
        let y = graph.find_node_by_name("y").unwrap();

        assert_eq!(resolve_target(&graph, "y").unwrap(), LiftTarget::Node(y));
        assert_eq!(
            resolve_target(&graph, "y:0").unwrap(),
            LiftTarget::Value(graph.output(y, 0).unwrap())
        );
        assert!(resolve_target(&graph, "y:3").is_err());
        assert!(resolve_target(&graph, "nope").is_err());
    }
}
