//! The declarative monitoring tree
//!
//! Operators describe what to monitor as a nested tree of maps and lists that
//! terminates in scalars. The tree carries no schema of its own: meaning is
//! assigned to a handful of well-known fields (see [`keys`]) by the compiler
//! stages in [`crate::compile`].
//!
//! # Implementation Model
//!
//! [`ConfigNode`] is a tagged variant over maps, lists, and scalars. A map node
//! classifies itself through [`ConfigMap::role`] into an object (carries an
//! `rdn`), an attribute leaf (carries an `attribute` but no `rdn`), or a
//! transparent container. Stages match on the [`Role`] instead of probing for
//! keys ad hoc.
//!
//! Trees are values: every stage reads one tree and builds a new one, and
//! cloning a subtree is always a deep copy.

pub mod keys;
mod node;
mod path;

pub use node::{ConfigMap, ConfigNode, Role, Scalar};
pub use path::TreePath;
