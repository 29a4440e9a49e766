//! bellman-core: Single-source shortest paths with negative edge weights.
//!
//! A pure Rust library that holds a directed weighted graph in memory and
//! runs Bellman-Ford over it: minimum-cost distances from one source,
//! detection of negative-weight cycles reachable from that source, and
//! path reconstruction through predecessor links.
//! No I/O: loading and presentation live in the `bellman-cli` crate.

mod bellman_ford;
mod error;
mod graph;

pub use bellman_ford::{shortest_paths, Route, ShortestPaths};
pub use error::PathError;
pub use graph::{Edge, EdgeRecord, EdgeRef, Graph, NodeIndex};
