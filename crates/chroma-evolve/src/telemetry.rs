//! Run summaries and named metrics.

use crate::individual::Individual;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Why the generational loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// Every generation in the budget was run.
    BudgetExhausted,
    /// A valid coloring was held after the warm-up tenth of the budget.
    ValidSolutionFound,
}

/// Summary of one completed `solve` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// Seed the run's random stream was built from (drawn from entropy when
    /// the configured seed is 0), so any run can be replayed.
    pub seed: u64,

    /// Generation budget the run was given
    pub generation_budget: usize,

    /// Generations actually evolved
    pub generations_completed: usize,

    pub termination: TerminationReason,

    pub best_fitness: i64,
    pub best_conflicts: usize,
    pub best_colors: usize,
    pub best_valid: bool,

    /// Wall-clock time of the whole run in milliseconds
    pub elapsed_ms: f64,
}

impl RunStats {
    pub(crate) fn new(
        seed: u64,
        generation_budget: usize,
        generations_completed: usize,
        termination: TerminationReason,
        best: &Individual,
        elapsed_ms: f64,
    ) -> Self {
        Self {
            seed,
            generation_budget,
            generations_completed,
            termination,
            best_fitness: best.fitness(),
            best_conflicts: best.conflict_count(),
            best_colors: best.color_count(),
            best_valid: best.is_valid(),
            elapsed_ms,
        }
    }
}

/// Fitness spread of a single generation, for progress logging.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationSummary {
    pub best_fitness: i64,
    pub mean_fitness: f64,
    pub mean_colors: f64,
    pub valid_count: usize,
}

impl GenerationSummary {
    pub fn from_population(population: &[Individual]) -> Option<Self> {
        if population.is_empty() {
            return None;
        }
        let n = population.len() as f64;
        Some(Self {
            best_fitness: population.iter().map(Individual::fitness).max()?,
            mean_fitness: population.iter().map(|i| i.fitness() as f64).sum::<f64>() / n,
            mean_colors: population.iter().map(|i| i.color_count() as f64).sum::<f64>() / n,
            valid_count: population.iter().filter(|i| i.is_valid()).count(),
        })
    }
}

/// Exposes named numeric metrics for telemetry sinks.
pub trait SearchTelemetry {
    /// Returns current metrics as key-value pairs.
    fn metrics(&self) -> HashMap<String, f64>;
}
