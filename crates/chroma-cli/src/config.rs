//! Chroma Configuration Module
//!
//! TOML configuration for the command-line driver. Every table and field is
//! optional; command-line flags override whatever the file sets.
//!
//! ```toml
//! [evolution]
//! population_size = 200
//! max_colors = 8
//! random_seed = 42
//!
//! [graph]
//! generator = "regular"
//! vertices = 100
//! degree = 4
//!
//! [telemetry]
//! path = "runs.jsonl"
//! ```

use anyhow::Result;
use chroma_evolve::EvolutionConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration for the driver
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChromaConfig {
    #[serde(default)]
    pub evolution: EvolutionConfig,

    #[serde(default)]
    pub graph: GraphConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl ChromaConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Validate configuration consistency
    pub fn validate(&self) -> Result<()> {
        self.evolution.validate()?;
        self.graph.validate()?;
        Ok(())
    }
}

// =============================================================================
// Graph Generation
// =============================================================================

/// Graph families the driver can build when no input file is given.
pub const GENERATORS: [&str; 3] = ["random", "regular", "grid"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// One of [`GENERATORS`]
    #[serde(default = "default_generator")]
    pub generator: String,

    /// Vertex count for `random` and `regular`
    #[serde(default = "default_vertices")]
    pub vertices: usize,

    /// Edge probability for `random`
    #[serde(default = "default_edge_probability")]
    pub edge_probability: f64,

    /// Degree for `regular`
    #[serde(default = "default_degree")]
    pub degree: usize,

    #[serde(default = "default_grid_side")]
    pub rows: usize,

    #[serde(default = "default_grid_side")]
    pub cols: usize,

    /// Seed for the generator; 0 draws one from OS entropy
    #[serde(default)]
    pub seed: u64,
}

fn default_generator() -> String {
    "random".to_string()
}
fn default_vertices() -> usize {
    50
}
fn default_edge_probability() -> f64 {
    0.1
}
fn default_degree() -> usize {
    3
}
fn default_grid_side() -> usize {
    5
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            generator: default_generator(),
            vertices: default_vertices(),
            edge_probability: default_edge_probability(),
            degree: default_degree(),
            rows: default_grid_side(),
            cols: default_grid_side(),
            seed: 0,
        }
    }
}

impl GraphConfig {
    pub fn validate(&self) -> Result<()> {
        if !GENERATORS.contains(&self.generator.as_str()) {
            anyhow::bail!(
                "Unknown generator: {}. Valid generators: {}",
                self.generator,
                GENERATORS.join(", ")
            );
        }
        if !(0.0..=1.0).contains(&self.edge_probability) {
            anyhow::bail!(
                "edge_probability must be in [0.0, 1.0] (got {})",
                self.edge_probability
            );
        }
        Ok(())
    }
}

// =============================================================================
// Telemetry
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// JSONL file that receives one line per finished run
    #[serde(default)]
    pub path: Option<String>,
}
