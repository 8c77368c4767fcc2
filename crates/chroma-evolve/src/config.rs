//! Search configuration.

use chroma_core::ChromaError;
use serde::{Deserialize, Serialize};

/// Parameters of one evolutionary search.
///
/// Every field has a serde default, so a TOML `[evolution]` table only needs
/// to name what it changes. [`EvolutionConfig::validate`] rejects invalid
/// values instead of clamping them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Individuals per generation (>= 2, >= tournament_size)
    #[serde(default = "default_population_size")]
    pub population_size: usize,

    /// Generation budget (>= 1)
    #[serde(default = "default_max_generations")]
    pub max_generations: usize,

    /// Probability that a child is mutated once (0.0 - 1.0)
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,

    /// Probability that a child comes from crossover rather than cloning (0.0 - 1.0)
    #[serde(default = "default_crossover_rate")]
    pub crossover_rate: f64,

    /// Contestants per tournament, drawn with replacement
    #[serde(default = "default_tournament_size")]
    pub tournament_size: usize,

    /// Colors available to random initialization and mutation (>= 1)
    #[serde(default = "default_max_colors")]
    pub max_colors: usize,

    /// 0 draws a fresh seed from OS entropy; any other value is reproducible
    #[serde(default)]
    pub random_seed: u64,

    /// Generations between progress reports (>= 1)
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,

    /// Breed each generation's children on the rayon pool
    #[serde(default)]
    pub parallel: bool,
}

fn default_population_size() -> usize {
    100
}
fn default_max_generations() -> usize {
    1000
}
fn default_mutation_rate() -> f64 {
    0.1
}
fn default_crossover_rate() -> f64 {
    0.8
}
fn default_tournament_size() -> usize {
    5
}
fn default_max_colors() -> usize {
    10
}
fn default_progress_interval() -> usize {
    100
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: default_population_size(),
            max_generations: default_max_generations(),
            mutation_rate: default_mutation_rate(),
            crossover_rate: default_crossover_rate(),
            tournament_size: default_tournament_size(),
            max_colors: default_max_colors(),
            random_seed: 0,
            progress_interval: default_progress_interval(),
            parallel: false,
        }
    }
}

impl EvolutionConfig {
    pub fn with_population_size(mut self, population_size: usize) -> Self {
        self.population_size = population_size;
        self
    }

    pub fn with_max_generations(mut self, max_generations: usize) -> Self {
        self.max_generations = max_generations;
        self
    }

    pub fn with_mutation_rate(mut self, mutation_rate: f64) -> Self {
        self.mutation_rate = mutation_rate;
        self
    }

    pub fn with_crossover_rate(mut self, crossover_rate: f64) -> Self {
        self.crossover_rate = crossover_rate;
        self
    }

    pub fn with_tournament_size(mut self, tournament_size: usize) -> Self {
        self.tournament_size = tournament_size;
        self
    }

    pub fn with_max_colors(mut self, max_colors: usize) -> Self {
        self.max_colors = max_colors;
        self
    }

    pub fn with_seed(mut self, random_seed: u64) -> Self {
        self.random_seed = random_seed;
        self
    }

    pub fn with_progress_interval(mut self, progress_interval: usize) -> Self {
        self.progress_interval = progress_interval;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates the configuration.
    ///
    /// Returns an error if any constraints are violated.
    pub fn validate(&self) -> Result<(), ChromaError> {
        if self.population_size < 2 {
            return Err(ChromaError::config(format!(
                "population_size must be >= 2 (got {})",
                self.population_size
            )));
        }

        if self.max_generations == 0 {
            return Err(ChromaError::config("max_generations must be >= 1"));
        }

        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(ChromaError::config(format!(
                "mutation_rate must be in [0.0, 1.0] (got {})",
                self.mutation_rate
            )));
        }

        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return Err(ChromaError::config(format!(
                "crossover_rate must be in [0.0, 1.0] (got {})",
                self.crossover_rate
            )));
        }

        if self.tournament_size == 0 || self.tournament_size > self.population_size {
            return Err(ChromaError::config(format!(
                "tournament_size must be in [1, {}] (got {})",
                self.population_size, self.tournament_size
            )));
        }

        if self.max_colors == 0 {
            return Err(ChromaError::config("max_colors must be >= 1"));
        }

        if self.progress_interval == 0 {
            return Err(ChromaError::config("progress_interval must be >= 1"));
        }

        Ok(())
    }
}
