//! Single-game runner.
//!
//! Drives one [`GameSession`] from a [`Scenario`] to completion and
//! collects the outcome: winner, round count, final state hash and
//! per-player statistics. The loop is fully deterministic, so running
//! the same scenario twice yields byte-identical outcomes.

use serde::{Deserialize, Serialize};

use hexfray_core::error::Result;
use hexfray_core::grid::PlayerId;
use hexfray_core::session::{GameSession, PlayerStats};

use crate::scenario::Scenario;
use crate::strategies::Strategy;

/// Why a game stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// One owner held the whole board (or every cell went neutral).
    Decided,
    /// The scenario's round cap expired first.
    RoundCap,
}

/// Result of one completed headless game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameOutcome {
    /// Scenario name the game was built from.
    pub scenario: String,
    /// Board seed the game ran with.
    pub seed: u64,
    /// Winner's display name, if the game produced one.
    pub winner: Option<String>,
    /// Winner's strategy, if the game produced a winner.
    pub winner_strategy: Option<Strategy>,
    /// Rounds played.
    pub rounds: u64,
    /// Why the game stopped.
    pub end_reason: EndReason,
    /// Hash of the final board state, for determinism checks.
    pub final_state_hash: u64,
    /// Final per-player statistics.
    pub stats: Vec<PlayerStats>,
}

/// Run one game to completion.
///
/// Builds a session from the scenario, registers every seat, then
/// plays rounds until the board is decided or the round cap expires.
///
/// # Errors
///
/// Returns an error if the session rejects the roster, for example an
/// empty player list or more seats than the color palette supports.
pub fn run_game(scenario: &Scenario) -> Result<GameOutcome> {
    let mut session = GameSession::new(scenario.board_config());

    let mut seats: Vec<(PlayerId, Strategy)> = Vec::with_capacity(scenario.players.len());
    for setup in &scenario.players {
        let id = session.add_player(setup.name.clone())?;
        seats.push((id, setup.strategy));
    }
    session.setup()?;

    while session.round() < scenario.max_rounds && !session.is_over() {
        session.play_round(|player, views| {
            seats
                .iter()
                .find(|(id, _)| *id == player.id)
                .and_then(|&(_, strategy)| strategy.decide(views))
        })?;
    }

    let end_reason = if session.is_over() {
        EndReason::Decided
    } else {
        EndReason::RoundCap
    };
    let winner = session.winner().map(|p| p.name.clone());
    let winner_strategy = session.winner().and_then(|p| {
        seats
            .iter()
            .find(|(id, _)| *id == p.id)
            .map(|&(_, strategy)| strategy)
    });

    let outcome = GameOutcome {
        scenario: scenario.name.clone(),
        seed: scenario.seed,
        winner,
        winner_strategy,
        rounds: session.round(),
        end_reason,
        final_state_hash: session.state_hash().unwrap_or(0),
        stats: session.player_stats(),
    };

    tracing::info!(
        scenario = %outcome.scenario,
        seed = outcome.seed,
        rounds = outcome.rounds,
        winner = outcome.winner.as_deref().unwrap_or("none"),
        "game finished"
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duel_runs_to_completion() {
        let outcome = run_game(&Scenario::duel()).unwrap();
        assert!(outcome.rounds > 0);
        assert!(outcome.rounds <= 10_000);
        assert_eq!(outcome.stats.len(), 2);
    }

    #[test]
    fn test_duel_is_deterministic() {
        let scenario = Scenario::duel();
        let a = run_game(&scenario).unwrap();
        let b = run_game(&scenario).unwrap();
        assert_eq!(a.final_state_hash, b.final_state_hash);
        assert_eq!(a.rounds, b.rounds);
        assert_eq!(a.winner, b.winner);
    }

    #[test]
    fn test_round_cap_is_honored() {
        let mut scenario = Scenario::free_for_all();
        scenario.max_rounds = 3;
        let outcome = run_game(&scenario).unwrap();
        assert!(outcome.rounds <= 3);
        if outcome.end_reason == EndReason::RoundCap {
            assert_eq!(outcome.rounds, 3);
            assert!(outcome.winner.is_none());
        }
    }

    #[test]
    fn test_winner_strategy_matches_seat() {
        let outcome = run_game(&Scenario::duel()).unwrap();
        if let Some(name) = &outcome.winner {
            let scenario = Scenario::duel();
            let seat = scenario
                .players
                .iter()
                .find(|p| &p.name == name)
                .expect("winner should be a registered seat");
            assert_eq!(outcome.winner_strategy, Some(seat.strategy));
        }
    }

    #[test]
    fn test_seed_override_changes_board() {
        let a = run_game(&Scenario::duel()).unwrap();
        let b = run_game(&Scenario::duel().with_seed(777)).unwrap();
        assert_eq!(a.seed, 12345);
        assert_eq!(b.seed, 777);
    }
}
