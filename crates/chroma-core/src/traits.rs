//! Graph-query contract consumed by the evolutionary search.

/// Read-only view of an undirected graph.
///
/// The search only ever asks two questions of a graph: how many vertices it
/// has and whether two vertices are joined by an edge. Both are called
/// O(V²) times per fitness evaluation, so implementations should be cheap,
/// and must return the same answers for the whole lifetime of a search run.
///
/// `is_adjacent` must be symmetric. `is_adjacent(v, v)` is never asked.
pub trait ColoringGraph {
    /// Number of vertices; valid vertex ids are `0..vertex_count()`.
    fn vertex_count(&self) -> usize;

    /// Whether `u` and `v` share an edge.
    fn is_adjacent(&self, u: usize, v: usize) -> bool;
}

impl<G: ColoringGraph + ?Sized> ColoringGraph for &G {
    fn vertex_count(&self) -> usize {
        (**self).vertex_count()
    }

    fn is_adjacent(&self, u: usize, v: usize) -> bool {
        (**self).is_adjacent(u, v)
    }
}
