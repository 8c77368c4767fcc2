//! Flat edge-list persistence.
//!
//! ```text
//! # optional comment lines
//! 4
//! 0 1
//! 1 2
//! 2 3
//! ```
//!
//! The first non-comment line is the vertex count; each following line holds
//! one 0-indexed edge `u v`.

use crate::dimacs::parse_dimacs_file;
use crate::{ChromaError, Graph};
use std::fs;
use std::path::Path;

/// Renders a graph in edge-list form.
pub fn to_edge_list_string(graph: &Graph) -> String {
    let mut out = String::with_capacity(16 + graph.num_edges() * 8);
    out.push_str(&format!("{}\n", graph.num_vertices()));
    for (u, v) in graph.edges() {
        out.push_str(&format!("{} {}\n", u, v));
    }
    out
}

/// Parses edge-list content held in memory.
pub fn parse_edge_list(content: &str) -> Result<Graph, ChromaError> {
    let mut graph: Option<Graph> = None;

    for (idx, raw) in content.lines().enumerate() {
        let line_num = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        match graph.as_mut() {
            None => {
                if parts.len() != 1 {
                    return Err(ChromaError::validation(format!(
                        "Expected vertex count at line {}, got '{}'",
                        line_num, line
                    )));
                }
                let n = parts[0].parse::<usize>().map_err(|_| {
                    ChromaError::validation(format!(
                        "Invalid vertex count '{}' at line {}",
                        parts[0], line_num
                    ))
                })?;
                graph = Some(Graph::new(n));
            }
            Some(graph) => {
                if parts.len() != 2 {
                    return Err(ChromaError::validation(format!(
                        "Invalid edge line at line {}: expected 'u v', got '{}'",
                        line_num, line
                    )));
                }
                let mut ids = [0usize; 2];
                for (slot, token) in ids.iter_mut().zip(&parts) {
                    *slot = token.parse::<usize>().map_err(|_| {
                        ChromaError::validation(format!(
                            "Invalid vertex ID '{}' at line {}",
                            token, line_num
                        ))
                    })?;
                    if *slot >= graph.num_vertices() {
                        return Err(ChromaError::validation(format!(
                            "Vertex ID {} at line {} out of range [0, {})",
                            slot,
                            line_num,
                            graph.num_vertices()
                        )));
                    }
                }
                if !graph.add_edge(ids[0], ids[1]) {
                    log::warn!(
                        "Ignoring self-loop or duplicate edge ({}, {}) at line {}",
                        ids[0],
                        ids[1],
                        line_num
                    );
                }
            }
        }
    }

    graph.ok_or_else(|| ChromaError::validation("Edge list is empty (missing vertex count)"))
}

/// Writes a graph to `path` in edge-list form.
pub fn save_edge_list<P: AsRef<Path>>(graph: &Graph, path: P) -> Result<(), ChromaError> {
    fs::write(path.as_ref(), to_edge_list_string(graph))?;
    log::info!(
        "Saved graph ({} vertices, {} edges) to {}",
        graph.num_vertices(),
        graph.num_edges(),
        path.as_ref().display()
    );
    Ok(())
}

/// Reads an edge-list file.
pub fn load_edge_list<P: AsRef<Path>>(path: P) -> Result<Graph, ChromaError> {
    let content = fs::read_to_string(path.as_ref())?;
    parse_edge_list(&content)
}

/// Loads a graph, choosing the format from the extension: `.col` is DIMACS,
/// anything else is an edge list.
pub fn load_graph<P: AsRef<Path>>(path: P) -> Result<Graph, ChromaError> {
    let path = path.as_ref();
    let is_dimacs = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("col"))
        .unwrap_or(false);

    if is_dimacs {
        parse_dimacs_file(path)
    } else {
        load_edge_list(path)
    }
}
