/// Failure modes of a shortest-path query.
///
/// An unreachable destination is not an error; see [`crate::Route::Unreachable`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PathError {
    #[error("source node '{0}' not found in graph")]
    InvalidSource(String),

    /// `cycle` lists the nodes of one offending cycle in traversal order;
    /// the last node has an edge back to the first.
    #[error(
        "graph contains a negative weight cycle reachable from '{origin}': {}",
        .cycle.join(" -> ")
    )]
    NegativeCycle { origin: String, cycle: Vec<String> },

    /// A path sum left the finite `f64` range while relaxing the edge into
    /// `node`. Distances past that point are meaningless, so none are returned.
    #[error("distance from '{origin}' to '{node}' overflows the f64 range")]
    DistanceOverflow { origin: String, node: String },
}
