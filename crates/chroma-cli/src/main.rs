//! Chroma CLI entry point.
//!
//! Evolutionary graph coloring: load or generate a graph, search for a
//! coloring with few conflicts and few colors, report the result.

mod config;

use anyhow::{Context, Result};
use chroma_core::generators::{grid_graph, random_graph, regular_graph};
use chroma_core::{io, ChromaError, Graph, GraphStats};
use chroma_evolve::{EvolutionConfig, EvolutionEngine, Individual, RunStats};
use clap::Parser;
use config::ChromaConfig;
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

/// Chroma version from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(name = "chroma-cli")]
#[command(version = VERSION)]
#[command(about = "Chroma: evolutionary graph coloring", long_about = None)]
struct Args {
    /// Execution mode: solve (default), sweep, generate
    ///
    /// - solve: run one search on the input or generated graph
    /// - sweep: run one search per color budget in a range
    /// - generate: build a graph and save it without searching
    #[arg(long, default_value = "solve")]
    mode: String,

    /// Input graph file (edge list, or DIMACS when the extension is .col)
    #[arg(short, long)]
    input: Option<String>,

    /// TOML configuration file with [evolution], [graph] and [telemetry] tables
    #[arg(short, long)]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    // ========================================================================
    // Graph Generation
    // ========================================================================
    /// Generator used when no input file is given: random, regular, grid
    #[arg(long)]
    generator: Option<String>,

    /// Vertex count for the random and regular generators
    #[arg(long)]
    vertices: Option<usize>,

    /// Edge probability for the random generator
    #[arg(long)]
    edge_probability: Option<f64>,

    /// Degree for the regular generator
    #[arg(long)]
    degree: Option<usize>,

    /// Grid rows for the grid generator
    #[arg(long)]
    rows: Option<usize>,

    /// Grid columns for the grid generator
    #[arg(long)]
    cols: Option<usize>,

    /// Seed for the graph generator (0 = entropy)
    #[arg(long)]
    graph_seed: Option<u64>,

    /// Write the graph in edge-list form to this path
    #[arg(long)]
    save_graph: Option<String>,

    // ========================================================================
    // Search Parameters
    // ========================================================================
    #[arg(long)]
    population_size: Option<usize>,

    #[arg(long)]
    max_generations: Option<usize>,

    #[arg(long)]
    mutation_rate: Option<f64>,

    #[arg(long)]
    crossover_rate: Option<f64>,

    #[arg(long)]
    tournament_size: Option<usize>,

    /// Color budget for random initialization and mutation
    #[arg(long)]
    max_colors: Option<usize>,

    /// Search seed (0 = entropy; the drawn seed is logged and recorded)
    #[arg(long)]
    seed: Option<u64>,

    /// Generations between progress reports
    #[arg(long)]
    progress_interval: Option<usize>,

    /// Breed children in parallel (true/false; overrides the config file)
    #[arg(long)]
    parallel: Option<bool>,

    // ========================================================================
    // Output
    // ========================================================================
    /// Write the best coloring (one `vertex color` line per vertex)
    #[arg(long)]
    output_coloring: Option<String>,

    /// Append one JSON line per finished run to this file
    #[arg(long)]
    telemetry: Option<String>,

    // ========================================================================
    // Sweep
    // ========================================================================
    #[arg(long, default_value = "1")]
    sweep_min_colors: usize,

    #[arg(long, default_value = "10")]
    sweep_max_colors: usize,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logger
    if args.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    log::info!("Chroma {} - Starting", VERSION);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report_error(&err),
    }
}

fn run(args: &Args) -> Result<()> {
    let config = load_config(args)?;

    match args.mode.as_str() {
        "solve" => run_solve_mode(args, &config),
        "sweep" => run_sweep_mode(args, &config),
        "generate" => run_generate_mode(args, &config),
        unknown => {
            anyhow::bail!(
                "Unknown mode: {}. Valid modes: solve, sweep, generate",
                unknown
            );
        }
    }
}

/// Prints a failed run to stderr. Library errors get their guidance text;
/// configuration and argument errors exit with 2, everything else with 1.
fn report_error(err: &anyhow::Error) -> ExitCode {
    let chroma = err.chain().find_map(|e| e.downcast_ref::<ChromaError>());
    match chroma {
        Some(inner) => {
            if err.chain().count() > 1 {
                eprintln!("Error: {}", err);
            }
            eprintln!("{}", inner.user_message());
            if inner.is_caller_bug() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
        None => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

/// Reads the optional TOML file and layers command-line overrides on top.
fn load_config(args: &Args) -> Result<ChromaConfig> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from {}", path);
            ChromaConfig::from_file(path)
                .with_context(|| format!("Failed to load config file {}", path))?
        }
        None => ChromaConfig::default(),
    };

    let evolution = &mut config.evolution;
    if let Some(v) = args.population_size {
        evolution.population_size = v;
    }
    if let Some(v) = args.max_generations {
        evolution.max_generations = v;
    }
    if let Some(v) = args.mutation_rate {
        evolution.mutation_rate = v;
    }
    if let Some(v) = args.crossover_rate {
        evolution.crossover_rate = v;
    }
    if let Some(v) = args.tournament_size {
        evolution.tournament_size = v;
    }
    if let Some(v) = args.max_colors {
        evolution.max_colors = v;
    }
    if let Some(v) = args.seed {
        evolution.random_seed = v;
    }
    if let Some(v) = args.progress_interval {
        evolution.progress_interval = v;
    }
    if let Some(v) = args.parallel {
        evolution.parallel = v;
    }

    let graph = &mut config.graph;
    if let Some(v) = &args.generator {
        graph.generator = v.clone();
    }
    if let Some(v) = args.vertices {
        graph.vertices = v;
    }
    if let Some(v) = args.edge_probability {
        graph.edge_probability = v;
    }
    if let Some(v) = args.degree {
        graph.degree = v;
    }
    if let Some(v) = args.rows {
        graph.rows = v;
    }
    if let Some(v) = args.cols {
        graph.cols = v;
    }
    if let Some(v) = args.graph_seed {
        graph.seed = v;
    }

    if let Some(v) = &args.telemetry {
        config.telemetry.path = Some(v.clone());
    }

    config.validate()?;
    Ok(config)
}

/// Loads `--input` when given, otherwise builds a graph from `[graph]`.
fn obtain_graph(args: &Args, config: &ChromaConfig) -> Result<Graph> {
    let graph = match &args.input {
        Some(path) => {
            log::info!("Loading graph from: {}", path);
            io::load_graph(path).with_context(|| format!("Failed to load graph {}", path))?
        }
        None => generate_graph(config)?,
    };

    let stats = GraphStats::from_graph(&graph);
    log::info!(
        "Graph: {} vertices, {} edges, density {:.4}, max degree {}",
        stats.num_vertices,
        stats.num_edges,
        stats.density,
        stats.max_degree
    );

    if let Some(path) = &args.save_graph {
        io::save_edge_list(&graph, path)?;
    }
    Ok(graph)
}

fn generate_graph(config: &ChromaConfig) -> Result<Graph> {
    let params = &config.graph;
    let seed = if params.seed == 0 {
        rand::random::<u64>()
    } else {
        params.seed
    };
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    log::info!("Generating {} graph (seed={})", params.generator, seed);
    let graph = match params.generator.as_str() {
        "random" => random_graph(params.vertices, params.edge_probability, &mut rng)?,
        "regular" => regular_graph(params.vertices, params.degree, &mut rng)?,
        "grid" => grid_graph(params.rows, params.cols),
        unknown => {
            anyhow::bail!(
                "Unknown generator: {}. Valid generators: {}",
                unknown,
                config::GENERATORS.join(", ")
            );
        }
    };
    Ok(graph)
}

fn run_solve_mode(args: &Args, config: &ChromaConfig) -> Result<()> {
    log::info!("=== Solve Mode ===");
    let graph = obtain_graph(args, config)?;

    let mut engine = EvolutionEngine::new(&graph, config.evolution.clone())?;
    let best = engine.solve()?;
    let stats = engine
        .last_run()
        .cloned()
        .context("search finished without run statistics")?;

    log::info!("=== Results Summary ===");
    log::info!("  Colors: {}", best.color_count());
    log::info!("  Conflicts: {}", best.conflict_count());
    log::info!("  Fitness: {}", best.fitness());
    log::info!("  Valid: {}", best.is_valid());
    log::info!(
        "  Generations: {}/{} ({:?})",
        stats.generations_completed,
        stats.generation_budget,
        stats.termination
    );
    log::info!("  Seed: {}", stats.seed);
    log::info!("  Time: {:.1} ms", stats.elapsed_ms);

    println!(
        "colors={} conflicts={} fitness={} valid={}",
        best.color_count(),
        best.conflict_count(),
        best.fitness(),
        best.is_valid()
    );

    if let Some(path) = &args.output_coloring {
        write_coloring(&best, path)?;
    }
    if let Some(path) = &config.telemetry.path {
        append_telemetry(path, "solve", &graph, engine.config(), &stats)?;
    }
    Ok(())
}

fn run_sweep_mode(args: &Args, config: &ChromaConfig) -> Result<()> {
    log::info!("=== Sweep Mode ===");
    if args.sweep_min_colors == 0 || args.sweep_min_colors > args.sweep_max_colors {
        anyhow::bail!(
            "Sweep range must satisfy 1 <= min <= max (got {}..={})",
            args.sweep_min_colors,
            args.sweep_max_colors
        );
    }
    let graph = obtain_graph(args, config)?;

    let budgets = args.sweep_min_colors..=args.sweep_max_colors;
    let pb = ProgressBar::new(budgets.clone().count() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg}\n{bar:40.cyan/blue} {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );

    let mut smallest_valid: Option<(usize, Individual)> = None;
    for max_colors in budgets {
        pb.set_message(format!("max_colors={}", max_colors));

        let run_config = config.evolution.clone().with_max_colors(max_colors);
        let mut engine = EvolutionEngine::new(&graph, run_config)?;
        let best = engine.solve()?;
        let stats = engine
            .last_run()
            .cloned()
            .context("search finished without run statistics")?;

        pb.println(format!(
            "max_colors={:>3}  colors={:>3}  conflicts={:>4}  valid={}  generations={}",
            max_colors,
            best.color_count(),
            best.conflict_count(),
            best.is_valid(),
            stats.generations_completed
        ));
        if let Some(path) = &config.telemetry.path {
            append_telemetry(path, "sweep", &graph, engine.config(), &stats)?;
        }
        if best.is_valid() && smallest_valid.is_none() {
            smallest_valid = Some((max_colors, best));
        }
        pb.inc(1);
    }
    pb.finish_with_message("sweep complete");

    match smallest_valid {
        Some((budget, best)) => {
            println!(
                "smallest valid budget: max_colors={} ({} colors used)",
                budget,
                best.color_count()
            );
            if let Some(path) = &args.output_coloring {
                write_coloring(&best, path)?;
            }
        }
        None => println!("no valid coloring found in the sweep range"),
    }
    Ok(())
}

fn run_generate_mode(args: &Args, config: &ChromaConfig) -> Result<()> {
    log::info!("=== Generate Mode ===");
    if args.input.is_some() {
        anyhow::bail!("generate mode builds a graph; --input is not accepted");
    }
    if args.save_graph.is_none() {
        anyhow::bail!("generate mode requires --save-graph");
    }
    let graph = obtain_graph(args, config)?;
    println!(
        "vertices={} edges={}",
        graph.num_vertices(),
        graph.num_edges()
    );
    Ok(())
}

fn write_coloring(best: &Individual, path: &str) -> Result<()> {
    let mut out = String::new();
    writeln!(
        out,
        "# colors={} conflicts={}",
        best.color_count(),
        best.conflict_count()
    )?;
    for (vertex, color) in best.coloring().iter().enumerate() {
        writeln!(out, "{} {}", vertex, color)?;
    }
    std::fs::write(path, out).with_context(|| format!("Failed to write coloring {}", path))?;
    log::info!("Coloring written to: {}", path);
    Ok(())
}

fn append_telemetry(
    path: &str,
    mode: &str,
    graph: &Graph,
    config: &EvolutionConfig,
    stats: &RunStats,
) -> Result<()> {
    let telemetry = serde_json::json!({
        "mode": mode,
        "graph": GraphStats::from_graph(graph),
        "config": config,
        "results": stats,
    });

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(Path::new(path))?;
    writeln!(file, "{}", serde_json::to_string(&telemetry)?)?;
    log::info!("Telemetry written to: {}", path);
    Ok(())
}
