//! Compilation of the declarative monitoring tree
//!
//! Operators describe which directory entries and attributes to watch as a
//! nested tree. This module resolves that tree, once and ahead of time, into a
//! flat list of [`StatisticDef`]s: every DN, metric name, query scope, and
//! per-database copy is worked out before the first poll.
//!
//! # Implementation Model
//!
//! A [`Transformer`] is a pure `tree -> tree` pass. A [`TransformationChain`]
//! owns an ordered list of them and folds a tree through every stage in the
//! order the stages were registered. Stages never see each other; they only
//! communicate through the fields they write into the tree.
//!
//! [`default_chain`] builds the standard pipeline:
//!
//! 1. [`NormalizeKeys`]: rewrite field names to `snake_case`
//! 2. [`ComputeDn`]: derive `computed_dn` from the `rdn` chain
//! 3. [`DuplicateTargets`]: copy subtrees once per listed database
//! 4. [`FlattenChildren`]: turn `objects` and `attributes` maps into `children`
//! 5. [`InterpolateNames`]: resolve `{field}` placeholders
//! 6. [`ComputeMetricName`]: derive hierarchical `metric_name`s
//! 7. [`ComputeQueryScope`]: derive the `query_dn` each node is fetched under
//!
//! Every stage walks the tree the same way: a value (DN suffix, name prefix,
//! query scope, ...) flows from parent to child, siblings all receive the
//! same value, and nodes without an `rdn` or `attribute` pass the value on to
//! their children untouched without being stamped themselves.
//!
//! Finally, [`extract_definitions`] pulls one [`StatisticDef`] out of every
//! attribute leaf of the compiled tree.

mod chain;
mod definitions;
mod error;
mod stages;

pub use chain::{CompileOptions, TransformationChain, Transformer, default_chain};
pub use definitions::{StatisticDef, StatisticKind, extract_definitions, group_by_target};
pub use error::CompileError;
pub use stages::{
    ComputeDn, ComputeMetricName, ComputeQueryScope, DuplicateTargets, FlattenChildren, InterpolateNames, NormalizeKeys,
};
