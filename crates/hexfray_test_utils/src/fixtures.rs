//! Test fixtures and helpers.
//!
//! Pre-built sessions and scripted round policies for consistent
//! testing across crates.

use hexfray_core::placement::BoardConfig;
use hexfray_core::session::{GameSession, Player};
use hexfray_core::transaction::ProposedTransfer;
use hexfray_core::view::{CellView, Ownership};

/// Set up a session with `n` players named `P0..` on the given seed.
///
/// # Panics
///
/// Panics if `n` is zero or exceeds the color palette.
#[must_use]
pub fn session_with_players(n: u32, seed: u64) -> GameSession {
    let mut session = GameSession::new(BoardConfig::default().with_seed(seed));
    for i in 0..n {
        session
            .add_player(format!("P{i}"))
            .expect("roster should accept player");
    }
    session.setup().expect("setup should succeed");
    session
}

/// Scripted round policy: the player's first frontier cell shoves all
/// but one resource at its first non-owned neighbor.
///
/// Declines when the player holds no frontier cell. Deliberately
/// simple so tests exercising the round loop do not depend on any
/// real strategy.
#[must_use]
pub fn shove(_player: &Player, views: &[CellView]) -> Option<ProposedTransfer> {
    let attacker = views.iter().find(|v| v.on_frontier())?;
    let target = attacker
        .neighbors
        .iter()
        .find(|n| n.owner != Ownership::Own)?;
    Some(ProposedTransfer {
        from: attacker.id,
        to: target.id,
        amount: (attacker.resources - 1) as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_fixture_is_set_up() {
        let session = session_with_players(3, 42);
        assert_eq!(session.players().len(), 3);
        assert!(session.state_hash().is_some());
    }

    #[test]
    fn test_shove_proposes_valid_transfer() {
        let mut session = session_with_players(2, 42);
        session.play_round(shove).expect("round should play");
        for player in session.players() {
            assert_eq!(player.exceptions, 0, "shove should never be rejected");
        }
    }
}
