//! Generational genetic search.
//!
//! Per run: `Uninitialized -> Initialized -> Evolving(g) -> Terminated(reason)
//! -> Refined -> Done`. Each generation is bred in full from the previous one
//! (no elitism); the best individual ever seen is kept separately as an owned
//! snapshot and refined once more with local optimization before it is
//! returned.
//!
//! All randomness comes from a [`ChaCha8Rng`] owned by the engine and seeded
//! from the configured seed, so a nonzero seed makes a run fully
//! reproducible. In parallel mode every child gets its own sub-stream keyed
//! by (seed, generation, child index), which keeps results independent of
//! thread scheduling.

use crate::config::EvolutionConfig;
use crate::individual::Individual;
use crate::telemetry::{GenerationSummary, RunStats, SearchTelemetry, TerminationReason};
use chroma_core::{ChromaError, ColoringGraph};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::collections::HashMap;
use std::time::Instant;

/// Chance that a freshly bred child is locally optimized. Independent of
/// the mutation rate.
pub const LOCAL_OPTIMIZATION_PROBABILITY: f64 = 0.1;

/// Lifecycle of a search run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Uninitialized,
    Initialized,
    Evolving { generation: usize },
    Terminated(TerminationReason),
    Refined,
    Done,
}

/// Evolutionary coloring search over a graph `G`.
///
/// ## Usage
/// ```rust
/// use chroma_core::generators::complete_graph;
/// use chroma_evolve::{EvolutionConfig, EvolutionEngine};
///
/// let graph = complete_graph(4);
/// let config = EvolutionConfig::default()
///     .with_population_size(20)
///     .with_max_generations(50)
///     .with_max_colors(6)
///     .with_seed(7);
///
/// let mut engine = EvolutionEngine::new(&graph, config)?;
/// let best = engine.solve()?;
/// assert_eq!(best.len(), 4);
/// # Ok::<(), chroma_core::ChromaError>(())
/// ```
pub struct EvolutionEngine<G> {
    graph: G,
    config: EvolutionConfig,
    seed: u64,
    rng: ChaCha8Rng,
    population: Vec<Individual>,
    best_ever: Option<Individual>,
    state: SearchState,
    last_run: Option<RunStats>,
}

impl<G: ColoringGraph + Sync> EvolutionEngine<G> {
    /// Validates `config` and prepares an engine. A seed of 0 is replaced by
    /// one drawn from OS entropy; [`EvolutionEngine::seed`] reports it.
    pub fn new(graph: G, config: EvolutionConfig) -> Result<Self, ChromaError> {
        config.validate()?;

        let seed = if config.random_seed == 0 {
            rand::random::<u64>()
        } else {
            config.random_seed
        };

        log::debug!(
            "Evolution: engine ready for {} vertices (seed={}, parallel={})",
            graph.vertex_count(),
            seed,
            config.parallel
        );

        Ok(Self {
            graph,
            config,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            population: Vec::new(),
            best_ever: None,
            state: SearchState::Uninitialized,
            last_run: None,
        })
    }

    /// Fills the population with `population_size` random individuals and
    /// snapshots the fittest (first in population order on ties) as best-ever.
    pub fn initialize_population(&mut self) -> Result<(), ChromaError> {
        let mut population = Vec::with_capacity(self.config.population_size);
        for _ in 0..self.config.population_size {
            population.push(Individual::random(
                &self.graph,
                self.config.max_colors,
                &mut self.rng,
            )?);
        }

        self.best_ever = fittest(&population).cloned();
        self.population = population;
        self.transition(SearchState::Initialized);
        Ok(())
    }

    /// Runs a tournament on the current population.
    ///
    /// `tournament_size` contestants are drawn uniformly with replacement;
    /// the first one drawn wins unless a later one is strictly fitter.
    pub fn tournament_selection(&mut self) -> Result<&Individual, ChromaError> {
        if self.population.is_empty() {
            return Err(ChromaError::invalid_argument(
                "tournament selection needs an initialized population",
            ));
        }
        let winner = tournament_index(&self.population, self.config.tournament_size, &mut self.rng);
        Ok(&self.population[winner])
    }

    /// Replaces best-ever with a snapshot of the current generation's fittest
    /// individual if that one is strictly fitter. Returns whether it did.
    pub fn update_best_ever(&mut self) -> bool {
        let candidate = match fittest(&self.population) {
            Some(candidate) => candidate,
            None => return false,
        };

        let improved = match &self.best_ever {
            Some(best) => candidate.fitness() > best.fitness(),
            None => true,
        };
        if improved {
            self.best_ever = Some(candidate.clone());
        }
        improved
    }

    /// Runs the full search with the configured budget and no progress callback.
    pub fn solve(&mut self) -> Result<Individual, ChromaError> {
        let interval = self.config.progress_interval;
        self.solve_with_progress(None, interval, |_, _| {})
    }

    /// Runs the full search.
    ///
    /// `max_generations` overrides the configured budget for this call.
    /// `on_progress(generation, best_ever)` fires on every generation that is
    /// a multiple of `progress_interval`.
    ///
    /// The loop stops early once best-ever is valid and the generation index
    /// has passed a tenth of the budget. Either way best-ever gets one last
    /// local optimization pass and a copy of it is returned; the result may
    /// still contain conflicts.
    ///
    /// Every call restarts the random stream from the engine's seed.
    pub fn solve_with_progress<F>(
        &mut self,
        max_generations: Option<usize>,
        progress_interval: usize,
        mut on_progress: F,
    ) -> Result<Individual, ChromaError>
    where
        F: FnMut(usize, &Individual),
    {
        let budget = max_generations.unwrap_or(self.config.max_generations);
        if budget == 0 {
            return Err(ChromaError::config("max_generations must be >= 1"));
        }
        if progress_interval == 0 {
            return Err(ChromaError::config("progress_interval must be >= 1"));
        }

        let start = Instant::now();
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.state = SearchState::Uninitialized;

        log::info!(
            "Evolution: Starting search with population={}, generations={}, max_colors={}, seed={}",
            self.config.population_size,
            budget,
            self.config.max_colors,
            self.seed
        );

        self.initialize_population()?;

        let warmup = budget / 10;
        let mut termination = TerminationReason::BudgetExhausted;
        let mut generations_completed = 0;

        for generation in 0..budget {
            self.transition(SearchState::Evolving { generation });

            self.population = self.next_generation(generation)?;
            generations_completed = generation + 1;

            if self.update_best_ever() {
                if let Some(best) = &self.best_ever {
                    log::info!(
                        "Evolution Gen {}/{}: NEW BEST - {} colors, {} conflicts",
                        generation + 1,
                        budget,
                        best.color_count(),
                        best.conflict_count()
                    );
                }
            }

            let best = self
                .best_ever
                .as_ref()
                .ok_or_else(|| ChromaError::internal("best-ever missing after a generation"))?;

            if generation % progress_interval == 0 {
                if let Some(summary) = GenerationSummary::from_population(&self.population) {
                    log::debug!(
                        "Evolution Gen {}/{}: Best={} colors ({} conflicts), Avg fitness={:.1}, valid={}/{}",
                        generation + 1,
                        budget,
                        best.color_count(),
                        best.conflict_count(),
                        summary.mean_fitness,
                        summary.valid_count,
                        self.population.len()
                    );
                }
                on_progress(generation, best);
            }

            if best.is_valid() && generation > warmup {
                log::info!(
                    "Evolution: Early stop at generation {} (valid coloring with {} colors)",
                    generation + 1,
                    best.color_count()
                );
                termination = TerminationReason::ValidSolutionFound;
                break;
            }
        }

        self.transition(SearchState::Terminated(termination));

        let graph = &self.graph;
        let best = self
            .best_ever
            .as_mut()
            .ok_or_else(|| ChromaError::internal("search finished without a best individual"))?;
        best.local_optimization(graph)?;
        let best = best.clone();
        self.transition(SearchState::Refined);

        let stats = RunStats::new(
            self.seed,
            budget,
            generations_completed,
            termination,
            &best,
            start.elapsed().as_secs_f64() * 1000.0,
        );
        log::info!(
            "Evolution: Search complete after {} generations. Best: {} colors, {} conflicts ({:.1} ms)",
            stats.generations_completed,
            stats.best_colors,
            stats.best_conflicts,
            stats.elapsed_ms
        );
        self.last_run = Some(stats);
        self.transition(SearchState::Done);

        Ok(best)
    }

    /// Breeds a complete replacement generation.
    fn next_generation(&mut self, generation: usize) -> Result<Vec<Individual>, ChromaError> {
        let size = self.config.population_size;

        if self.config.parallel {
            let population = &self.population;
            let graph = &self.graph;
            let config = &self.config;
            let seed = self.seed;
            return (0..size)
                .into_par_iter()
                .map(|child| {
                    let mut rng = child_stream(seed, generation, child);
                    breed_child(population, graph, config, &mut rng)
                })
                .collect();
        }

        let mut next = Vec::with_capacity(size);
        while next.len() < size {
            next.push(breed_child(
                &self.population,
                &self.graph,
                &self.config,
                &mut self.rng,
            )?);
        }
        Ok(next)
    }

    fn transition(&mut self, next: SearchState) {
        log::debug!("Evolution: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// Seed of the engine's random stream.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    /// Current generation.
    pub fn population(&self) -> &[Individual] {
        &self.population
    }

    /// Snapshot of the fittest individual seen so far.
    pub fn best_ever(&self) -> Option<&Individual> {
        self.best_ever.as_ref()
    }

    /// Summary of the most recent completed `solve`.
    pub fn last_run(&self) -> Option<&RunStats> {
        self.last_run.as_ref()
    }
}

impl<G: ColoringGraph + Sync> SearchTelemetry for EvolutionEngine<G> {
    fn metrics(&self) -> HashMap<String, f64> {
        let mut m = HashMap::new();
        m.insert(
            "population_size".to_string(),
            self.config.population_size as f64,
        );
        if let Some(summary) = GenerationSummary::from_population(&self.population) {
            m.insert("population_mean_fitness".to_string(), summary.mean_fitness);
            m.insert("population_valid".to_string(), summary.valid_count as f64);
        }
        if let Some(best) = &self.best_ever {
            m.insert("best_fitness".to_string(), best.fitness() as f64);
            m.insert("best_conflicts".to_string(), best.conflict_count() as f64);
            m.insert("best_colors".to_string(), best.color_count() as f64);
        }
        if let Some(run) = &self.last_run {
            m.insert(
                "generations_completed".to_string(),
                run.generations_completed as f64,
            );
            m.insert("elapsed_ms".to_string(), run.elapsed_ms);
        }
        m
    }
}

/// Produces one child: two tournaments, then crossover or a coin-flip clone,
/// then an optional single mutation and an optional local optimization.
fn breed_child<G, R>(
    population: &[Individual],
    graph: &G,
    config: &EvolutionConfig,
    rng: &mut R,
) -> Result<Individual, ChromaError>
where
    G: ColoringGraph + ?Sized,
    R: Rng + ?Sized,
{
    let first = &population[tournament_index(population, config.tournament_size, rng)];
    let second = &population[tournament_index(population, config.tournament_size, rng)];

    let mut child = if rng.gen_bool(config.crossover_rate) {
        first.crossover(second, graph, rng)?
    } else if rng.gen_bool(0.5) {
        first.clone()
    } else {
        second.clone()
    };

    if rng.gen_bool(config.mutation_rate) {
        child.mutate(graph, config.max_colors, rng)?;
    }
    if rng.gen_bool(LOCAL_OPTIMIZATION_PROBABILITY) {
        child.local_optimization(graph)?;
    }
    Ok(child)
}

/// Index of a tournament winner. `population` must be non-empty and
/// `tournament_size` at least 1.
fn tournament_index<R: Rng + ?Sized>(
    population: &[Individual],
    tournament_size: usize,
    rng: &mut R,
) -> usize {
    let mut winner = rng.gen_range(0..population.len());
    for _ in 1..tournament_size {
        let contestant = rng.gen_range(0..population.len());
        if population[contestant].fitness() > population[winner].fitness() {
            winner = contestant;
        }
    }
    winner
}

/// Fittest individual; the earliest wins ties.
fn fittest(population: &[Individual]) -> Option<&Individual> {
    population.iter().fold(None, |best, candidate| match best {
        Some(best) if best.fitness() >= candidate.fitness() => Some(best),
        _ => Some(candidate),
    })
}

/// Independent stream for one child of one generation. Stream 0 belongs to
/// the engine's main generator, so generations are numbered from 1 here.
fn child_stream(seed: u64, generation: usize, child: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(((generation as u64 + 1) << 32) | child as u64);
    rng
}

#[cfg(test)]
mod tests {
    use super::*;
    use chroma_core::Graph;
    use rand::rngs::mock::StepRng;

    fn edge_graph() -> Graph {
        Graph::from_edges(2, &[(0, 1)]).unwrap()
    }

    fn small_config() -> EvolutionConfig {
        EvolutionConfig::default()
            .with_population_size(4)
            .with_tournament_size(3)
            .with_max_generations(10)
            .with_max_colors(2)
            .with_seed(11)
    }

    #[test]
    fn test_fittest_prefers_first_on_ties() {
        let graph = edge_graph();
        let population = vec![
            Individual::from_coloring(&graph, &[0, 0]).unwrap(), // -101
            Individual::from_coloring(&graph, &[0, 1]).unwrap(), // -2
            Individual::from_coloring(&graph, &[1, 0]).unwrap(), // -2
        ];
        let best = fittest(&population).unwrap();
        assert_eq!(best.coloring(), &[0, 1]);
        assert!(fittest(&[]).is_none());
    }

    #[test]
    fn test_tournament_samples_with_replacement() {
        let graph = edge_graph();
        let population = vec![
            Individual::from_coloring(&graph, &[0, 0]).unwrap(),
            Individual::from_coloring(&graph, &[0, 1]).unwrap(),
        ];
        // A constant stream draws index 0 every time, so the weakest
        // individual wins a tournament made only of itself.
        let mut rng = StepRng::new(0, 0);
        assert_eq!(tournament_index(&population, 5, &mut rng), 0);
    }

    #[test]
    fn test_tournament_picks_strictly_fitter() {
        let graph = edge_graph();
        let population = vec![
            Individual::from_coloring(&graph, &[0, 0]).unwrap(),
            Individual::from_coloring(&graph, &[0, 1]).unwrap(),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        // 32 draws over two individuals: the fitter one is drawn
        assert_eq!(tournament_index(&population, 32, &mut rng), 1);
    }

    #[test]
    fn test_tournament_selection_requires_population() {
        let graph = edge_graph();
        let mut engine = EvolutionEngine::new(&graph, small_config()).unwrap();
        assert!(engine.tournament_selection().is_err());

        engine.initialize_population().unwrap();
        let selected = engine.tournament_selection().unwrap().clone();
        assert!(engine.population().contains(&selected));
    }

    #[test]
    fn test_initialize_population_snapshots_fittest() {
        let graph = edge_graph();
        let mut engine = EvolutionEngine::new(&graph, small_config()).unwrap();
        assert_eq!(engine.state(), SearchState::Uninitialized);

        engine.initialize_population().unwrap();
        assert_eq!(engine.state(), SearchState::Initialized);
        assert_eq!(engine.population().len(), 4);

        let best = engine.best_ever().unwrap();
        let max = engine.population().iter().map(Individual::fitness).max().unwrap();
        assert_eq!(best.fitness(), max);
    }

    #[test]
    fn test_update_best_ever_requires_strict_improvement() {
        let graph = edge_graph();
        let mut engine = EvolutionEngine::new(&graph, small_config()).unwrap();

        let valid = Individual::from_coloring(&graph, &[0, 1]).unwrap();
        let equal = Individual::from_coloring(&graph, &[1, 0]).unwrap();
        let worse = Individual::from_coloring(&graph, &[1, 1]).unwrap();

        engine.population = vec![worse.clone()];
        assert!(engine.update_best_ever());
        assert_eq!(engine.best_ever(), Some(&worse));

        engine.population = vec![valid.clone(), worse.clone()];
        assert!(engine.update_best_ever());
        assert_eq!(engine.best_ever(), Some(&valid));

        engine.population = vec![equal, worse];
        assert!(!engine.update_best_ever());
        assert_eq!(engine.best_ever(), Some(&valid));
    }

    #[test]
    fn test_best_ever_is_an_independent_snapshot() {
        let graph = edge_graph();
        let mut engine = EvolutionEngine::new(&graph, small_config()).unwrap();
        engine.initialize_population().unwrap();
        let snapshot = engine.best_ever().unwrap().clone();

        engine.population.clear();
        assert_eq!(engine.best_ever(), Some(&snapshot));
    }

    #[test]
    fn test_child_streams_are_distinct_and_stable() {
        let a = child_stream(9, 0, 0).gen::<u64>();
        let b = child_stream(9, 0, 1).gen::<u64>();
        let c = child_stream(9, 1, 0).gen::<u64>();
        let main = ChaCha8Rng::seed_from_u64(9).gen::<u64>();
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, main);
        assert_eq!(a, child_stream(9, 0, 0).gen::<u64>());
    }

    #[test]
    fn test_solve_walks_the_state_machine() {
        let graph = edge_graph();
        let mut engine = EvolutionEngine::new(&graph, small_config()).unwrap();
        let best = engine.solve().unwrap();
        assert_eq!(engine.state(), SearchState::Done);
        assert_eq!(engine.best_ever(), Some(&best));

        assert_eq!(engine.config(), &small_config());

        let stats = engine.last_run().unwrap();
        assert_eq!(stats.seed, 11);
        assert!(stats.generations_completed >= 1 && stats.generations_completed <= 10);

        let metrics = engine.metrics();
        assert_eq!(metrics["population_size"], 4.0);
        assert!(metrics.contains_key("best_fitness"));
        assert!(metrics.contains_key("generations_completed"));
    }

    #[test]
    fn test_solve_rejects_zero_override_and_interval() {
        let graph = edge_graph();
        let mut engine = EvolutionEngine::new(&graph, small_config()).unwrap();
        assert!(matches!(
            engine.solve_with_progress(Some(0), 1, |_, _| {}),
            Err(ChromaError::ConfigError(_))
        ));
        assert!(matches!(
            engine.solve_with_progress(None, 0, |_, _| {}),
            Err(ChromaError::ConfigError(_))
        ));
    }

    #[test]
    fn test_zero_seed_draws_a_concrete_seed() {
        let graph = edge_graph();
        let engine = EvolutionEngine::new(&graph, small_config().with_seed(0)).unwrap();
        let replay = EvolutionEngine::new(&graph, small_config().with_seed(engine.seed()));
        assert!(replay.is_ok());
    }
}
