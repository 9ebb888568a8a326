//! Access to the directory server being monitored
//!
//! The collection engine only needs one operation from a directory: "give me
//! every entry at or below this DN, with its attributes". [`DirectoryClient`]
//! is that seam. A failed query is an `Err`; a base DN that matches nothing is
//! an empty `Ok`, which the engine treats as entries being temporarily absent.
//!
//! [`SnapshotClient`] serves queries from a YAML dump of the server's monitor
//! backend, which is how the tool runs without a live server.

mod client;
mod snapshot;

pub use client::{DirectoryClient, Entry};
pub use snapshot::SnapshotClient;
