//! Source -> destination correspondence produced by a lift

use std::collections::BTreeMap;

use graft_core::{Graph, NodeId, ValueId};
use indexmap::IndexMap;

/// Maps every source node and value touched by a lift to its copy in the destination.
///
/// Entries are written once; a second insert for the same key is a bug in the engine.
/// Boundary values map to the placeholder (or capture) that replaces them. A producer
/// whose only output is a boundary value maps to that replacement's node; producers
/// with several outputs do not appear as node keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpMap {
    nodes: IndexMap<NodeId, NodeId>,
    values: IndexMap<ValueId, ValueId>,
}

impl OpMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, source: NodeId) -> Option<NodeId> {
        self.nodes.get(&source).copied()
    }

    pub fn value(&self, source: ValueId) -> Option<ValueId> {
        self.values.get(&source).copied()
    }

    pub fn contains_node(&self, source: NodeId) -> bool {
        self.nodes.contains_key(&source)
    }

    pub fn contains_value(&self, source: ValueId) -> bool {
        self.values.contains_key(&source)
    }

    pub(crate) fn insert_node(&mut self, source: NodeId, copy: NodeId) {
        let previous = self.nodes.insert(source, copy);
        debug_assert!(previous.is_none(), "{} copied twice", source);
    }

    pub(crate) fn insert_value(&mut self, source: ValueId, copy: ValueId) {
        let previous = self.values.insert(source, copy);
        debug_assert!(previous.is_none(), "{} mapped twice", source);
    }

    /// Node pairs in the order they were copied.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.nodes.iter().map(|(&k, &v)| (k, v))
    }

    /// Value pairs in the order they were mapped.
    pub fn values(&self) -> impl Iterator<Item = (ValueId, ValueId)> + '_ {
        self.values.iter().map(|(&k, &v)| (k, v))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.values.is_empty()
    }

    /// Value mapping spelled as `producer:index` on both sides.
    pub fn value_names(&self, source: &Graph, destination: &Graph) -> BTreeMap<String, String> {
        self.values
            .iter()
            .map(|(&from, &to)| (source.value_name(from), destination.value_name(to)))
            .collect()
    }
}
