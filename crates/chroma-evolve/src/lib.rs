//! # chroma-evolve
//!
//! Genetic search for graph colorings that minimize conflicts first and the
//! number of distinct colors second.
//!
//! - [`Individual`]: one candidate coloring with its fitness and the
//!   mutation, crossover and local optimization operators
//! - [`EvolutionEngine`]: tournament selection, generational replacement,
//!   best-ever tracking and early termination
//! - [`EvolutionConfig`]: search parameters with validation
//! - [`RunStats`] / [`SearchTelemetry`]: what a finished run reports

pub mod config;
pub mod engine;
pub mod individual;
pub mod telemetry;

pub use config::EvolutionConfig;
pub use engine::{EvolutionEngine, SearchState, LOCAL_OPTIMIZATION_PROBABILITY};
pub use individual::{Individual, CONFLICT_PENALTY};
pub use telemetry::{GenerationSummary, RunStats, SearchTelemetry, TerminationReason};
