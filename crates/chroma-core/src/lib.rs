//! # chroma-core
//!
//! Graph types, generators, file formats and errors for the Chroma
//! evolutionary graph-coloring search.
//!
//! - **Traits**: [`ColoringGraph`], the read-only contract the search consumes
//! - **Types**: [`Graph`] with O(1) adjacency queries, [`GraphStats`]
//! - **Generators**: random G(n, p), random k-regular, planar grid, complete
//! - **I/O**: flat edge-list files and DIMACS `.col` files
//! - **Errors**: unified handling with [`ChromaError`]

pub mod dimacs;
pub mod errors;
pub mod generators;
pub mod io;
pub mod traits;
pub mod types;

pub use errors::{ChromaError, Result};
pub use traits::ColoringGraph;
pub use types::{Graph, GraphStats, VertexId};
