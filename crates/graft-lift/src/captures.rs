//! Resolution of captured values between function-scoped graphs

use std::collections::HashMap;

use graft_core::{Graph, ValueId, ValueRef};

/// Inverse of a source graph's capture table: internal placeholder value -> the outer
/// value it stands for.
///
/// Only populated when both the source and the destination are function-scoped; in any
/// other pairing captured placeholders are lifted like ordinary placeholders.
#[derive(Debug, Clone, Default)]
pub struct CaptureIndex {
    inverse: HashMap<ValueId, ValueRef>,
}

impl CaptureIndex {
    pub fn build(source: &Graph, destination: &Graph) -> Self {
        if !(source.is_function() && destination.is_function()) {
            return Self::default();
        }
        let inverse = source
            .captures()
            .iter()
            .map(|(&outer, &inner)| (inner, outer))
            .collect();
        CaptureIndex { inverse }
    }

    /// Outer value captured by `inner`, if any.
    pub fn outer(&self, inner: ValueId) -> Option<ValueRef> {
        self.inverse.get(&inner).copied()
    }

    pub fn len(&self) -> usize {
        self.inverse.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inverse.is_empty()
    }
}
