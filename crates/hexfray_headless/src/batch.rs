//! Batch game runner for balance testing.
//!
//! Runs many seeded games in parallel using rayon and aggregates
//! win counts per strategy, so matchups can be compared across a
//! spread of boards rather than a single seed.

use std::collections::BTreeMap;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::runner::{run_game, GameOutcome};
use crate::scenario::Scenario;

/// Configuration for a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Scenario every game is built from.
    pub scenario: Scenario,
    /// Number of games to run.
    pub game_count: u32,
    /// Seed of the first game; game `i` runs with `seed_start + i`.
    pub seed_start: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            scenario: Scenario::default(),
            game_count: 100,
            seed_start: 0,
        }
    }
}

impl BatchConfig {
    /// Create config for a specific scenario.
    #[must_use]
    pub fn new(scenario: Scenario, game_count: u32) -> Self {
        Self {
            scenario,
            game_count,
            ..Default::default()
        }
    }

    /// Set the starting seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }
}

/// Error during a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchError {
    /// Game index.
    pub game_index: u32,
    /// Seed used.
    pub seed: u64,
    /// Error message.
    pub message: String,
}

/// Results from a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used.
    pub config: BatchConfig,
    /// Individual game outcomes, in seed order.
    pub games: Vec<GameOutcome>,
    /// Wins per strategy name.
    pub wins: BTreeMap<String, u32>,
    /// Games that ended with no winner.
    pub draws: u32,
    /// Total runtime.
    pub duration_seconds: f64,
    /// Errors encountered.
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from a JSON file.
    pub fn load(path: &std::path::Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }

    /// Win rate for a strategy name over completed games.
    #[must_use]
    pub fn win_rate(&self, strategy: &str) -> f64 {
        if self.games.is_empty() {
            return 0.0;
        }
        let wins = self.wins.get(strategy).copied().unwrap_or(0);
        f64::from(wins) / self.games.len() as f64
    }
}

/// Run a batch of games.
///
/// Game `i` plays the configured scenario with seed `seed_start + i`.
/// Games run in parallel; outcomes are collected back into seed order
/// so two batch runs with the same config produce identical results.
#[must_use]
pub fn run_batch(config: BatchConfig) -> BatchResults {
    let start = Instant::now();

    info!(
        "Starting batch run: {} games of '{}'",
        config.game_count, config.scenario.name
    );

    let results: Vec<Result<GameOutcome, BatchError>> = (0..config.game_count)
        .into_par_iter()
        .map(|i| {
            let seed = config.seed_start.wrapping_add(u64::from(i));
            let scenario = config.scenario.clone().with_seed(seed);
            match run_game(&scenario) {
                Ok(outcome) => Ok(outcome),
                Err(e) => {
                    warn!("Game {} failed: {}", i, e);
                    Err(BatchError {
                        game_index: i,
                        seed,
                        message: e.to_string(),
                    })
                }
            }
        })
        .collect();

    let (games, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let games: Vec<GameOutcome> = games.into_iter().filter_map(Result::ok).collect();
    let errors: Vec<BatchError> = errors.into_iter().filter_map(Result::err).collect();

    let mut wins: BTreeMap<String, u32> = BTreeMap::new();
    let mut draws = 0u32;
    for game in &games {
        match game.winner_strategy {
            Some(strategy) => *wins.entry(strategy.to_string()).or_insert(0) += 1,
            None => draws += 1,
        }
    }

    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} games in {:.1}s ({:.1} games/sec)",
        games.len(),
        duration_seconds,
        games.len() as f64 / duration_seconds.max(f64::EPSILON)
    );

    BatchResults {
        config,
        games,
        wins,
        draws,
        duration_seconds,
        errors,
    }
}

/// Verify determinism by running the same seed multiple times.
///
/// Returns true when every run reproduces the first run's winner,
/// round count and final state hash.
#[must_use]
pub fn verify_determinism(scenario: &Scenario, runs: u32) -> bool {
    let outcomes: Vec<GameOutcome> = (0..runs.max(1))
        .filter_map(|_| run_game(scenario).ok())
        .collect();
    if outcomes.len() != runs.max(1) as usize {
        return false;
    }

    let first = &outcomes[0];
    outcomes.iter().all(|o| {
        o.winner == first.winner
            && o.rounds == first.rounds
            && o.final_state_hash == first.final_state_hash
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::EndReason;

    fn short_scenario() -> Scenario {
        let mut scenario = Scenario::duel();
        scenario.max_rounds = 50;
        scenario
    }

    #[test]
    fn test_batch_config_default() {
        let config = BatchConfig::default();
        assert_eq!(config.game_count, 100);
        assert_eq!(config.scenario.name, "Duel");
    }

    #[test]
    fn test_batch_config_builder() {
        let config = BatchConfig::new(Scenario::free_for_all(), 500).with_seed(12345);
        assert_eq!(config.scenario.name, "Free For All");
        assert_eq!(config.game_count, 500);
        assert_eq!(config.seed_start, 12345);
    }

    #[test]
    fn test_run_batch_small() {
        let config = BatchConfig::new(short_scenario(), 8);
        let results = run_batch(config);

        assert_eq!(results.games.len(), 8);
        assert!(results.errors.is_empty());
        for (i, game) in results.games.iter().enumerate() {
            assert_eq!(game.seed, i as u64);
        }
    }

    #[test]
    fn test_batch_win_counts_cover_all_games() {
        let config = BatchConfig::new(short_scenario(), 6);
        let results = run_batch(config);

        let wins: u32 = results.wins.values().sum();
        assert_eq!(wins + results.draws, results.games.len() as u32);
        for game in &results.games {
            if game.end_reason == EndReason::RoundCap {
                assert!(game.winner.is_none());
            }
        }
    }

    #[test]
    fn test_batch_is_deterministic() {
        let config = BatchConfig::new(short_scenario(), 4).with_seed(100);
        let a = run_batch(config.clone());
        let b = run_batch(config);

        assert_eq!(a.games.len(), b.games.len());
        for (x, y) in a.games.iter().zip(&b.games) {
            assert_eq!(x.final_state_hash, y.final_state_hash);
            assert_eq!(x.winner, y.winner);
        }
        assert_eq!(a.wins, b.wins);
    }

    #[test]
    fn test_verify_determinism() {
        assert!(verify_determinism(&short_scenario(), 3));
    }

    #[test]
    fn test_batch_results_save_load() {
        let config = BatchConfig::new(short_scenario(), 3);
        let results = run_batch(config);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");

        results.save(&path).unwrap();
        assert!(path.exists());

        let loaded = BatchResults::load(&path).unwrap();
        assert_eq!(loaded.games.len(), 3);
        assert_eq!(loaded.wins, results.wins);
        assert_eq!(loaded.draws, results.draws);
    }
}
