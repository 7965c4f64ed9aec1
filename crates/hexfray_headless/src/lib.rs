//! Headless match runner for bot duels and CI verification.
//!
//! This crate drives [`hexfray_core`] sessions without any rendering:
//! scripted strategies play full games, scenarios configure the
//! matchup, and a batch mode runs many seeded games in parallel to
//! compare strategies. This enables:
//!
//! - **Strategy testing**: bots play each other without graphics
//! - **CI verification**: determinism checks on full-game hashes
//! - **Balance runs**: win-rate aggregation over many seeds
//!
//! # Example
//!
//! ```bash
//! # Run a single built-in duel and print the outcome as JSON
//! cargo run -p hexfray_headless -- run --scenario duel
//!
//! # Run a batch of 500 seeded games
//! cargo run -p hexfray_headless -- batch --scenario free_for_all --count 500
//!
//! # Verify determinism for one seed
//! cargo run -p hexfray_headless -- verify --seed 42 --runs 5
//! ```

pub mod batch;
pub mod runner;
pub mod scenario;
pub mod strategies;

pub use batch::{run_batch, BatchConfig, BatchResults};
pub use runner::{run_game, EndReason, GameOutcome};
pub use scenario::{PlayerSetup, Scenario};
pub use strategies::Strategy;
