//! Scenario loading and configuration.
//!
//! Scenarios define a headless matchup: which strategies play, the
//! board shape, the seed and the round cap. They are stored as RON
//! files so balance runs can be checked into the repo, and two
//! builtins (`duel`, `free_for_all`) cover the common cases without
//! any file on disk.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use hexfray_core::grid::Wraparound;
use hexfray_core::placement::BoardConfig;

use crate::strategies::Strategy;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
}

/// One seat at the table: a display name and the strategy playing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSetup {
    /// Display name used in outcome reports.
    pub name: String,
    /// Strategy that controls this player.
    pub strategy: Strategy,
}

impl PlayerSetup {
    /// Create a new player setup.
    #[must_use]
    pub fn new(name: impl Into<String>, strategy: Strategy) -> Self {
        Self {
            name: name.into(),
            strategy,
        }
    }
}

/// A complete scenario configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Player seats, in registration order.
    pub players: Vec<PlayerSetup>,
    /// Board edge behavior.
    pub wraparound: Wraparound,
    /// Seed for board generation.
    pub seed: u64,
    /// Hard cap on rounds before the game is called a draw.
    pub max_rounds: u64,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::duel()
    }
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let scenario: Scenario = ron::from_str(&contents)?;
        Ok(scenario)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        Ok(scenario)
    }

    /// Look up a builtin scenario by name.
    #[must_use]
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "duel" => Some(Self::duel()),
            "free_for_all" => Some(Self::free_for_all()),
            _ => None,
        }
    }

    /// Standard 1v1 matchup: greedy versus aggressive.
    #[must_use]
    pub fn duel() -> Self {
        Self {
            name: "Duel".to_string(),
            description: "A basic 1v1 matchup for strategy testing".to_string(),
            players: vec![
                PlayerSetup::new("Alice", Strategy::Greedy),
                PlayerSetup::new("Bob", Strategy::Aggressive),
            ],
            wraparound: Wraparound::Wrap,
            seed: 12345,
            max_rounds: 10_000,
        }
    }

    /// One seat per builtin strategy, all on the same board.
    #[must_use]
    pub fn free_for_all() -> Self {
        let players = Strategy::ALL
            .iter()
            .map(|&strategy| PlayerSetup::new(strategy.to_string(), strategy))
            .collect();
        Self {
            name: "Free For All".to_string(),
            description: "Every builtin strategy on one board".to_string(),
            players,
            wraparound: Wraparound::Wrap,
            seed: 12345,
            max_rounds: 10_000,
        }
    }

    /// Board configuration derived from this scenario.
    #[must_use]
    pub fn board_config(&self) -> BoardConfig {
        BoardConfig::default()
            .with_seed(self.seed)
            .with_wraparound(self.wraparound)
    }

    /// Copy of this scenario with a different board seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}
