//! Test-graph generators.
//!
//! Randomized generators take the random stream explicitly so callers control
//! reproducibility.

use crate::errors::ChromaError;
use crate::types::Graph;
use rand::seq::SliceRandom;
use rand::Rng;

/// Restarts allowed for the pairing model before giving up.
const MAX_REGULAR_ATTEMPTS: usize = 1000;

/// Erdős–Rényi G(n, p): every unordered pair is an edge with probability `p`.
pub fn random_graph<R: Rng + ?Sized>(
    num_vertices: usize,
    edge_probability: f64,
    rng: &mut R,
) -> Result<Graph, ChromaError> {
    if !(0.0..=1.0).contains(&edge_probability) {
        return Err(ChromaError::config(format!(
            "edge_probability must be in [0, 1] (got {})",
            edge_probability
        )));
    }

    let mut graph = Graph::new(num_vertices);
    for u in 0..num_vertices {
        for v in (u + 1)..num_vertices {
            if rng.gen_bool(edge_probability) {
                graph.add_edge(u, v);
            }
        }
    }

    log::debug!(
        "Generated G({}, {:.3}) with {} edges",
        num_vertices,
        edge_probability,
        graph.num_edges()
    );
    Ok(graph)
}

/// Random `degree`-regular graph via the pairing model.
///
/// Each vertex contributes `degree` stubs; the stubs are shuffled and paired
/// off. A pairing that yields a self-loop or a repeated edge is discarded and
/// the whole pairing restarts.
pub fn regular_graph<R: Rng + ?Sized>(
    num_vertices: usize,
    degree: usize,
    rng: &mut R,
) -> Result<Graph, ChromaError> {
    if degree == 0 {
        return Ok(Graph::new(num_vertices));
    }
    if degree >= num_vertices {
        return Err(ChromaError::config(format!(
            "degree {} must be smaller than the vertex count {}",
            degree, num_vertices
        )));
    }
    if (num_vertices * degree) % 2 != 0 {
        return Err(ChromaError::config(format!(
            "num_vertices * degree must be even (got {} * {})",
            num_vertices, degree
        )));
    }

    let mut stubs: Vec<usize> = (0..num_vertices)
        .flat_map(|v| std::iter::repeat(v).take(degree))
        .collect();

    'attempt: for attempt in 0..MAX_REGULAR_ATTEMPTS {
        stubs.shuffle(rng);
        let mut graph = Graph::new(num_vertices);
        for pair in stubs.chunks_exact(2) {
            if !graph.add_edge(pair[0], pair[1]) {
                continue 'attempt;
            }
        }
        log::debug!(
            "Generated {}-regular graph on {} vertices after {} attempt(s)",
            degree,
            num_vertices,
            attempt + 1
        );
        return Ok(graph);
    }

    Err(ChromaError::internal(format!(
        "Failed to build a {}-regular graph on {} vertices in {} attempts",
        degree, num_vertices, MAX_REGULAR_ATTEMPTS
    )))
}

/// Planar `rows` x `cols` lattice; vertex `(r, c)` has id `r * cols + c` and
/// is joined to its right and lower neighbours.
pub fn grid_graph(rows: usize, cols: usize) -> Graph {
    let mut graph = Graph::new(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            let v = r * cols + c;
            if c + 1 < cols {
                graph.add_edge(v, v + 1);
            }
            if r + 1 < rows {
                graph.add_edge(v, v + cols);
            }
        }
    }
    graph
}

/// Complete graph K_n.
pub fn complete_graph(num_vertices: usize) -> Graph {
    let mut graph = Graph::new(num_vertices);
    for u in 0..num_vertices {
        for v in (u + 1)..num_vertices {
            graph.add_edge(u, v);
        }
    }
    graph
}
