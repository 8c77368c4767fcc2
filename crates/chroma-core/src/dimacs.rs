//! DIMACS `.col` graph reader.
//!
//! - Lines starting with 'c' are comments (ignored)
//! - Line starting with 'p edge N M' declares N vertices and M edges
//! - Lines starting with 'e U V' declare an edge between vertices U and V (1-indexed)
//!
//! ```text
//! c Triangle graph example
//! p edge 3 3
//! e 1 2
//! e 2 3
//! e 1 3
//! ```

use crate::{ChromaError, Graph};
use std::fs;
use std::path::Path;

fn parse_error(message: impl Into<String>) -> ChromaError {
    ChromaError::validation(message.into())
}

fn parse_number(token: &str, what: &str, line_num: usize) -> Result<usize, ChromaError> {
    token.parse::<usize>().map_err(|_| {
        parse_error(format!(
            "Invalid {} '{}' at line {}: must be a non-negative integer",
            what, token, line_num
        ))
    })
}

/// Parses a DIMACS file from disk. Vertices are converted to 0-indexed ids.
pub fn parse_dimacs_file<P: AsRef<Path>>(path: P) -> Result<Graph, ChromaError> {
    let content = fs::read_to_string(path.as_ref())?;
    parse_dimacs_str(&content)
}

/// Parses DIMACS content held in memory.
///
/// Duplicate edges collapse into one, self-loops are skipped with a warning,
/// and a mismatch between the declared and the actual edge count is logged
/// rather than rejected.
pub fn parse_dimacs_str(content: &str) -> Result<Graph, ChromaError> {
    let mut graph: Option<Graph> = None;
    let mut num_edges_declared = 0;

    for (idx, raw) in content.lines().enumerate() {
        let line_num = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('c') {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts[0] {
            "p" => {
                if parts.len() < 4 {
                    return Err(parse_error(format!(
                        "Invalid problem line format at line {}: expected 'p edge N M', got '{}'",
                        line_num, line
                    )));
                }
                if parts[1] != "edge" {
                    return Err(parse_error(format!(
                        "Unsupported problem type '{}' at line {}: only 'edge' is supported",
                        parts[1], line_num
                    )));
                }
                let num_vertices = parse_number(parts[2], "vertex count", line_num)?;
                num_edges_declared = parse_number(parts[3], "edge count", line_num)?;
                graph = Some(Graph::new(num_vertices));
            }
            "e" => {
                let graph = graph.as_mut().ok_or_else(|| {
                    parse_error(format!(
                        "Edge definition at line {} before problem line (expected 'p edge N M' first)",
                        line_num
                    ))
                })?;
                if parts.len() < 3 {
                    return Err(parse_error(format!(
                        "Invalid edge line format at line {}: expected 'e U V', got '{}'",
                        line_num, line
                    )));
                }

                let u = parse_number(parts[1], "vertex ID", line_num)?;
                let v = parse_number(parts[2], "vertex ID", line_num)?;
                let n = graph.num_vertices();
                for id in [u, v] {
                    if id == 0 || id > n {
                        return Err(parse_error(format!(
                            "Vertex ID {} at line {} out of range [1, {}]",
                            id, line_num, n
                        )));
                    }
                }

                if u == v {
                    log::warn!("Skipping self-loop edge ({}, {}) at line {}", u, v, line_num);
                    continue;
                }
                graph.add_edge(u - 1, v - 1);
            }
            other => {
                log::debug!(
                    "Ignoring unknown DIMACS line type '{}' at line {}",
                    other,
                    line_num
                );
            }
        }
    }

    let graph = graph.ok_or_else(|| {
        parse_error("No problem line found in DIMACS file (expected 'p edge N M')")
    })?;

    if graph.num_edges() != num_edges_declared {
        log::warn!(
            "DIMACS file declared {} edges but actual edge count is {} (after deduplication)",
            num_edges_declared,
            graph.num_edges()
        );
    }

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_simple_triangle() {
        let content = "\
c Triangle graph
p edge 3 3
e 1 2
e 2 3
e 1 3
";
        let graph = parse_dimacs_str(content).unwrap();
        assert_eq!(graph.num_vertices(), 3);
        assert_eq!(graph.num_edges(), 3);
        assert_eq!(graph.neighbors(0), &[1, 2]);
    }

    #[test]
    fn test_parse_duplicate_edges_and_self_loops() {
        let content = "\
p edge 3 5
e 1 2
e 2 1
e 1 2
e 3 3
e 2 3
";
        let graph = parse_dimacs_str(content).unwrap();
        assert_eq!(graph.num_edges(), 2);
    }

    #[test]
    fn test_parse_error_no_problem_line() {
        let result = parse_dimacs_str("e 1 2\n");
        match result {
            Err(ChromaError::ValidationError(message)) => {
                assert!(message.contains("before problem line"), "got: {}", message);
            }
            other => panic!("Expected ValidationError, got {:?}", other),
        }

        assert!(matches!(
            parse_dimacs_str("c only comments\n"),
            Err(ChromaError::ValidationError(_))
        ));
    }

    #[test]
    fn test_parse_error_vertex_out_of_range() {
        let result = parse_dimacs_str("p edge 3 1\ne 1 5\n");
        match result {
            Err(ChromaError::ValidationError(message)) => assert!(message.contains("out of range")),
            other => panic!("Expected ValidationError, got {:?}", other),
        }

        let result = parse_dimacs_str("p edge 3 1\ne 0 1\n");
        assert!(matches!(result, Err(ChromaError::ValidationError(_))));
    }

    #[test]
    fn test_parse_error_invalid_vertex_id() {
        match parse_dimacs_str("p edge 3 1\ne 1 abc\n") {
            Err(ChromaError::ValidationError(message)) => {
                assert!(message.contains("Invalid vertex ID"))
            }
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_file_from_disk() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(b"p edge 4 2\ne 1 2\ne 3 4\n").unwrap();
        file.flush().unwrap();

        let graph = parse_dimacs_file(file.path()).unwrap();
        assert_eq!(graph.num_vertices(), 4);
        assert!(graph.has_edge(2, 3));
    }

    #[test]
    fn test_parse_nonexistent_file() {
        let result = parse_dimacs_file("/nonexistent/path/to/file.col");
        assert!(matches!(result, Err(ChromaError::IoError(_))));
    }
}
