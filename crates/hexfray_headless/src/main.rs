//! Headless hexfray match runner.
//!
//! This binary plays full games without graphics: scripted strategies
//! against each other, batches of seeded games for balance runs, and
//! determinism verification for CI.
//!
//! # Usage
//!
//! ```bash
//! # Run a single duel and print the outcome as JSON
//! cargo run -p hexfray_headless -- run --scenario duel
//!
//! # Run a batch balance test over 500 seeds
//! cargo run -p hexfray_headless -- batch --scenario free_for_all --count 500
//!
//! # Verify determinism for one seed
//! cargo run -p hexfray_headless -- verify --seed 42 --runs 5
//! ```
//!
//! Outcomes go to stdout as JSON; logs go to stderr.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hexfray_headless::batch::{run_batch, verify_determinism, BatchConfig};
use hexfray_headless::runner::run_game;
use hexfray_headless::scenario::Scenario;

#[derive(Parser)]
#[command(name = "hexfray_headless")]
#[command(about = "Headless hexfray runner for strategy testing and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single game and print the outcome as JSON
    Run {
        /// Builtin scenario name or path to a RON scenario file
        #[arg(short, long, default_value = "duel")]
        scenario: String,

        /// Override the scenario's board seed
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run a batch of seeded games for balance testing
    Batch {
        /// Builtin scenario name or path to a RON scenario file
        #[arg(short, long, default_value = "duel")]
        scenario: String,

        /// Number of games to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Starting seed; game i runs with seed + i
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Output JSON file for full results
        #[arg(short, long, default_value = "results/batch.json")]
        output: PathBuf,
    },

    /// Verify determinism by running the same seed multiple times
    Verify {
        /// Builtin scenario name or path to a RON scenario file
        #[arg(short, long, default_value = "duel")]
        scenario: String,

        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },
}

fn main() {
    let cli = Cli::parse();

    // Logging goes to stderr; stdout is reserved for outcome JSON.
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match cli.command {
        Some(Commands::Run { scenario, seed }) => cmd_run(&scenario, seed),
        Some(Commands::Batch {
            scenario,
            count,
            seed,
            output,
        }) => cmd_batch(&scenario, count, seed, &output),
        Some(Commands::Verify {
            scenario,
            seed,
            runs,
        }) => cmd_verify(&scenario, seed, runs),
        None => cmd_run("duel", None),
    }
}

/// Resolve a builtin scenario name, falling back to a RON file path.
fn load_scenario(name: &str) -> Scenario {
    if let Some(scenario) = Scenario::builtin(name) {
        return scenario;
    }
    match Scenario::load(name) {
        Ok(scenario) => scenario,
        Err(e) => {
            eprintln!("Failed to load scenario '{}': {}", name, e);
            std::process::exit(1);
        }
    }
}

/// Run a single game and print its outcome.
fn cmd_run(scenario: &str, seed: Option<u64>) {
    let mut scenario = load_scenario(scenario);
    if let Some(seed) = seed {
        scenario = scenario.with_seed(seed);
    }

    tracing::info!(
        "Running '{}' with seed {} ({} players)",
        scenario.name,
        scenario.seed,
        scenario.players.len()
    );

    let outcome = match run_game(&scenario) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Game failed: {}", e);
            std::process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&outcome) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize outcome: {}", e);
            std::process::exit(1);
        }
    }
}

/// Run a batch and print the win table.
fn cmd_batch(scenario: &str, count: u32, seed: u64, output: &std::path::Path) {
    let scenario = load_scenario(scenario);
    let config = BatchConfig::new(scenario, count).with_seed(seed);
    let results = run_batch(config);

    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Games played: {}", results.games.len());
    if !results.errors.is_empty() {
        eprintln!("Games FAILED: {}", results.errors.len());
    }
    eprintln!("Duration: {:.1}s", results.duration_seconds);
    eprintln!(
        "Throughput: {:.1} games/sec",
        results.games.len() as f64 / results.duration_seconds.max(0.001)
    );
    eprintln!("\nWins:");
    for (strategy, wins) in &results.wins {
        eprintln!(
            "  {:<12} {:>4} ({:.1}%)",
            strategy,
            wins,
            results.win_rate(strategy) * 100.0
        );
    }
    if results.draws > 0 {
        eprintln!("  {:<12} {:>4}", "draws", results.draws);
    }

    for error in results.errors.iter().take(10) {
        eprintln!(
            "  Game {} (seed {}): {}",
            error.game_index, error.seed, error.message
        );
    }

    if let Err(e) = results.save(output) {
        eprintln!("Failed to save results: {}", e);
        std::process::exit(1);
    }
    eprintln!("\nResults saved to: {}", output.display());
}

/// Verify determinism for one seed.
fn cmd_verify(scenario: &str, seed: u64, runs: u32) {
    let scenario = load_scenario(scenario).with_seed(seed);

    tracing::info!(
        "Verifying determinism: '{}' with seed {} ({} runs)",
        scenario.name,
        seed,
        runs
    );

    if verify_determinism(&scenario, runs) {
        eprintln!("PASS: All {} runs produced identical results", runs);
    } else {
        eprintln!("FAIL: Non-determinism detected!");
        std::process::exit(1);
    }
}
