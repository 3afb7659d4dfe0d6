//! Graft Lift — copies the subgraph behind a set of values into another graph
//!
//! A lift runs in four steps:
//!
//! 1. [`mapper`] walks backwards from each target, stopping at source values, and
//!    records which nodes consume which;
//! 2. [`order`] turns the discovered nodes into a copy order;
//! 3. [`captures`] resolves captured values when both graphs are function-scoped;
//! 4. [`transplant`] recreates boundary values as placeholders and copies the rest.
//!
//! [`lift()`] runs all four and returns the resulting [`OpMap`].

pub mod captures;
pub mod error;
pub mod lift;
pub mod mapper;
pub mod op_map;
pub mod order;
pub mod target;
pub mod transplant;


#[cfg(test)]
pub mod test_utils;

pub use captures::CaptureIndex;
pub use error::{LiftError, LiftResult};
pub use lift::{LiftOptions, lift};
pub use mapper::{PlaceholderPolicy, TraversalContext, map_subgraph};
pub use op_map::OpMap;
pub use order::reverse_topological_order;
pub use target::LiftTarget;
pub use transplant::{BoundaryKind, Transplanter, constant_inputs};
