//! Core graph types.

use crate::errors::ChromaError;
use crate::traits::ColoringGraph;
use serde::{Deserialize, Serialize};

/// Vertex ID type alias for clarity.
pub type VertexId = usize;

/// Undirected simple graph.
///
/// Keeps both sorted adjacency lists (for neighbourhood walks and edge
/// enumeration) and a dense row-major adjacency matrix so that
/// [`ColoringGraph::is_adjacent`] is a single lookup. The graph is built once
/// and then shared read-only with the search.
///
/// Serializes as a vertex count plus an edge list; the matrix is rebuilt on
/// deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GraphData", into = "GraphData")]
pub struct Graph {
    num_vertices: usize,
    num_edges: usize,
    adjacency: Vec<Vec<VertexId>>,
    matrix: Vec<bool>,
}

impl Graph {
    /// Creates an edgeless graph with `num_vertices` vertices.
    pub fn new(num_vertices: usize) -> Self {
        Self {
            num_vertices,
            num_edges: 0,
            adjacency: vec![Vec::new(); num_vertices],
            matrix: vec![false; num_vertices * num_vertices],
        }
    }

    /// Builds a graph from an edge list, rejecting out-of-range endpoints.
    ///
    /// Self-loops and duplicate edges are dropped.
    pub fn from_edges(
        num_vertices: usize,
        edges: &[(VertexId, VertexId)],
    ) -> Result<Self, ChromaError> {
        let mut graph = Self::new(num_vertices);
        for &(u, v) in edges {
            if u >= num_vertices || v >= num_vertices {
                return Err(ChromaError::validation(format!(
                    "Edge ({}, {}) out of range for {} vertices",
                    u, v, num_vertices
                )));
            }
            graph.add_edge(u, v);
        }
        Ok(graph)
    }

    /// Adds an undirected edge between two vertices.
    ///
    /// Returns `false` (and leaves the graph untouched) for self-loops,
    /// out-of-range vertices and edges that already exist.
    pub fn add_edge(&mut self, u: VertexId, v: VertexId) -> bool {
        if u == v || u >= self.num_vertices || v >= self.num_vertices || self.has_edge(u, v) {
            return false;
        }

        let n = self.num_vertices;
        self.matrix[u * n + v] = true;
        self.matrix[v * n + u] = true;

        let pos = self.adjacency[u].binary_search(&v).unwrap_or_else(|p| p);
        self.adjacency[u].insert(pos, v);
        let pos = self.adjacency[v].binary_search(&u).unwrap_or_else(|p| p);
        self.adjacency[v].insert(pos, u);

        self.num_edges += 1;
        true
    }

    /// Whether `u` and `v` are joined by an edge. Out-of-range ids are never adjacent.
    pub fn has_edge(&self, u: VertexId, v: VertexId) -> bool {
        u < self.num_vertices && v < self.num_vertices && self.matrix[u * self.num_vertices + v]
    }

    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    /// Sorted neighbour list of `vertex`.
    pub fn neighbors(&self, vertex: VertexId) -> &[VertexId] {
        &self.adjacency[vertex]
    }

    /// Returns the degree of a vertex.
    pub fn degree(&self, vertex: VertexId) -> usize {
        self.adjacency[vertex].len()
    }

    /// Largest vertex degree (0 for an empty graph).
    pub fn max_degree(&self) -> usize {
        self.adjacency.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Graph density: |E| / (|V| * (|V| - 1) / 2)
    pub fn density(&self) -> f64 {
        if self.num_vertices <= 1 {
            return 0.0;
        }
        (2.0 * self.num_edges as f64) / (self.num_vertices * (self.num_vertices - 1)) as f64
    }

    /// Every edge once as `(u, v)` with `u < v`, in ascending order.
    pub fn edges(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        self.adjacency.iter().enumerate().flat_map(|(u, neighbors)| {
            neighbors
                .iter()
                .copied()
                .filter(move |&v| u < v)
                .map(move |v| (u, v))
        })
    }
}

impl ColoringGraph for Graph {
    fn vertex_count(&self) -> usize {
        self.num_vertices
    }

    fn is_adjacent(&self, u: usize, v: usize) -> bool {
        self.has_edge(u, v)
    }
}

/// Serialized form of [`Graph`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GraphData {
    num_vertices: usize,
    edges: Vec<(VertexId, VertexId)>,
}

impl From<Graph> for GraphData {
    fn from(graph: Graph) -> Self {
        let edges = graph.edges().collect();
        Self {
            num_vertices: graph.num_vertices,
            edges,
        }
    }
}

impl TryFrom<GraphData> for Graph {
    type Error = ChromaError;

    fn try_from(data: GraphData) -> Result<Self, Self::Error> {
        Graph::from_edges(data.num_vertices, &data.edges)
    }
}

/// Summary statistics of a graph, for logging and telemetry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphStats {
    /// Number of vertices
    pub num_vertices: usize,

    /// Number of edges
    pub num_edges: usize,

    /// Graph density: |E| / (|V| * (|V| - 1) / 2)
    pub density: f64,

    /// Average vertex degree
    pub avg_degree: f64,

    /// Maximum vertex degree; max_degree + 1 colors always suffice
    pub max_degree: usize,
}

impl GraphStats {
    /// Computes statistics from a graph.
    pub fn from_graph(graph: &Graph) -> Self {
        let n = graph.num_vertices();
        let m = graph.num_edges();

        let avg_degree = if n > 0 {
            (2.0 * m as f64) / n as f64
        } else {
            0.0
        };

        Self {
            num_vertices: n,
            num_edges: m,
            density: graph.density(),
            avg_degree,
            max_degree: graph.max_degree(),
        }
    }
}
