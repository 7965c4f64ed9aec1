//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a game session produces
//! identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! Lockstep replay and CI verification both require the round loop to
//! be 100% deterministic. Sources of non-determinism include:
//!
//! - **Floating-point math**: proposals carry `f64` amounts, but every
//!   accepted amount is integral and board state stays in `i64`.
//!
//! - **Map iteration order**: cells live in a `Vec` ordered by id and
//!   the coordinate index is a `BTreeMap`; nothing iterates a randomized
//!   hash map.
//!
//! - **System randomness**: board construction uses a seeded generator
//!   and rounds involve no randomness at all.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: individual modules (grid growth, transfer resolution)
//! 2. **Property tests**: random seeds and rosters must still reproduce
//! 3. **Integration tests**: full games are reproducible
//! 4. **Parallel tests**: running N sessions in parallel all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use hexfray_core::session::GameSession;

use crate::fixtures;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of rounds played.
    pub rounds: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic session).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs were deterministic, with a detailed error
    /// message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Session is non-deterministic!\n\
                 Runs: {}\n\
                 Rounds: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.rounds,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Result of parallel session runs.
#[derive(Debug, Clone)]
pub struct ParallelRunResult {
    /// Final state hash from each session.
    pub hashes: Vec<u64>,
    /// Number of rounds each session played.
    pub rounds: u64,
    /// Number of sessions run.
    pub num_sessions: usize,
}

impl ParallelRunResult {
    /// Check if all sessions produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all sessions matched.
    ///
    /// # Panics
    ///
    /// Panics if sessions produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel sessions diverged!\n\
                 Sessions: {}\n\
                 Rounds: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_sessions,
                self.rounds,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a scenario multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to repeat the run
/// * `rounds` - Number of steps per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one step
/// * `hash` - Function to compute a state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    rounds: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..rounds {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        rounds,
    }
}

/// Play one scripted round, or do nothing once the game is over.
///
/// Every player runs the [`fixtures::shove`] policy, so two sessions
/// built from the same setup advance identically.
pub fn play_scripted_round(session: &mut GameSession) {
    if session.is_over() {
        return;
    }
    session
        .play_round(fixtures::shove)
        .expect("set-up session should accept a round");
}

/// State hash of a set-up session.
///
/// # Panics
///
/// Panics if the session has not been set up.
#[must_use]
pub fn session_hash(session: &GameSession) -> u64 {
    session.state_hash().expect("session should be set up")
}

/// Simplified determinism verification for [`GameSession`].
///
/// Runs the session twice with identical setup, advancing each with
/// the scripted shove policy, and verifies the final state hashes
/// match exactly.
pub fn verify_session_determinism<F>(setup_fn: F, rounds: u64) -> bool
where
    F: Fn() -> GameSession,
{
    let result = verify_determinism(2, rounds, &setup_fn, play_scripted_round, session_hash);
    result.is_deterministic
}

/// Run N sessions in parallel and collect final hashes.
///
/// Uses scoped threads, so the setup function needs no `'static`
/// lifetime. Useful for catching non-determinism that only manifests
/// under thread scheduling variations.
pub fn run_parallel_sessions<F>(setup_fn: F, num_sessions: usize, rounds: u64) -> ParallelRunResult
where
    F: Fn() -> GameSession + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sessions)
            .map(|_| {
                s.spawn(|| {
                    let mut session = setup_fn();
                    for _ in 0..rounds {
                        play_scripted_round(&mut session);
                    }
                    session_hash(&session)
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    ParallelRunResult {
        hashes,
        rounds,
        num_sessions,
    }
}

/// Compare two session runs round-by-round, finding first divergence.
///
/// # Returns
///
/// `None` if the runs are deterministic, `Some(round)` if they diverge
/// at that round.
pub fn find_first_divergence<F>(setup_fn: F, rounds: u64) -> Option<u64>
where
    F: Fn() -> GameSession,
{
    let mut a = setup_fn();
    let mut b = setup_fn();

    if session_hash(&a) != session_hash(&b) {
        return Some(0);
    }

    for round in 1..=rounds {
        play_scripted_round(&mut a);
        play_scripted_round(&mut b);

        if session_hash(&a) != session_hash(&b) {
            return Some(round);
        }
    }

    None
}

/// Verify that a snapshot round-trip preserves session state exactly.
///
/// This is what save/load and reconnect resynchronization rely on.
pub fn verify_snapshot_determinism<F>(setup_fn: F, rounds: u64) -> bool
where
    F: Fn() -> GameSession,
{
    let mut session = setup_fn();

    for _ in 0..rounds {
        play_scripted_round(&mut session);
    }

    let hash_before = session_hash(&session);

    let bytes = match session.snapshot() {
        Ok(b) => b,
        Err(_) => return false,
    };
    let restored = match GameSession::restore(&bytes) {
        Ok(s) => s,
        Err(_) => return false,
    };

    hash_before == session_hash(&restored)
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for determinism testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing of session determinism.
pub mod strategies {
    use proptest::prelude::*;

    use hexfray_core::grid::Wraparound;
    use hexfray_core::placement::BoardConfig;

    /// Generate an arbitrary board seed.
    pub fn arb_seed() -> impl Strategy<Value = u64> {
        any::<u64>()
    }

    /// Generate a roster size within the color palette.
    pub fn arb_player_count() -> impl Strategy<Value = u32> {
        1u32..=10
    }

    /// Generate either edge behavior.
    pub fn arb_wraparound() -> impl Strategy<Value = Wraparound> {
        prop_oneof![Just(Wraparound::Wrap), Just(Wraparound::NoWrap)]
    }

    /// Generate a full board configuration.
    pub fn arb_board_config() -> impl Strategy<Value = BoardConfig> {
        (arb_seed(), arb_wraparound()).prop_map(|(seed, wraparound)| {
            BoardConfig::default()
                .with_seed(seed)
                .with_wraparound(wraparound)
        })
    }

    /// Generate a short round count, enough to move resources around.
    pub fn arb_rounds() -> impl Strategy<Value = u64> {
        0u64..30
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    use hexfray_core::grid::PlayerId;
    use hexfray_core::placement::build_board;

    use crate::fixtures::session_with_players;

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, 100, || 0u64, |n| *n += 1, |n| *n);

        assert!(result.is_deterministic);
        assert_eq!(result.hashes, vec![100, 100, 100]);
    }

    #[test]
    fn test_two_player_session_determinism() {
        assert!(verify_session_determinism(
            || session_with_players(2, 42),
            50
        ));
    }

    #[test]
    fn test_full_roster_session_determinism() {
        assert!(verify_session_determinism(
            || session_with_players(10, 7),
            20
        ));
    }

    #[test]
    fn test_find_divergence_on_deterministic_session() {
        let divergence = find_first_divergence(|| session_with_players(3, 1234), 40);
        assert!(divergence.is_none(), "Expected no divergence");
    }

    #[test]
    fn test_parallel_sessions_match() {
        let result = run_parallel_sessions(|| session_with_players(4, 99), 4, 30);
        result.assert_deterministic();
    }

    #[test]
    fn test_snapshot_preserves_fresh_session() {
        assert!(verify_snapshot_determinism(
            || session_with_players(2, 5),
            0
        ));
    }

    #[test]
    fn test_snapshot_preserves_mid_game_session() {
        assert!(verify_snapshot_determinism(
            || session_with_players(3, 5),
            25
        ));
    }

    proptest! {
        /// Any random seed and roster should build identical boards twice.
        #[test]
        fn prop_board_construction_is_deterministic(
            config in strategies::arb_board_config(),
            player_count in strategies::arb_player_count(),
        ) {
            let players: Vec<PlayerId> = (0..player_count).map(PlayerId).collect();
            let a = build_board(&players, config);
            let b = build_board(&players, config);
            prop_assert_eq!(a.state_hash(), b.state_hash());
        }

        /// Any random seed and roster should play identical games.
        #[test]
        fn prop_random_sessions_are_deterministic(
            seed in strategies::arb_seed(),
            player_count in 2u32..=6,
            rounds in strategies::arb_rounds(),
        ) {
            prop_assert!(verify_session_determinism(
                || session_with_players(player_count, seed),
                rounds
            ));
        }

        /// Snapshot round-trip should always preserve state exactly.
        #[test]
        fn prop_snapshot_roundtrip_is_exact(
            seed in strategies::arb_seed(),
            player_count in 2u32..=6,
            rounds in strategies::arb_rounds(),
        ) {
            prop_assert!(verify_snapshot_determinism(
                || session_with_players(player_count, seed),
                rounds
            ));
        }
    }
}
