//! Scripted bot strategies for headless matches.
//!
//! Each strategy is a pure function of the per-player cell views and
//! proposes at most one transfer per round. A bot with no frontier
//! cell, or whose thresholds rule out every visible target, declines
//! by returning `None`.

use serde::{Deserialize, Serialize};

use hexfray_core::transaction::ProposedTransfer;
use hexfray_core::view::{CellView, NeighborView, Ownership};

/// Targets at or above this strength are ignored by the threshold
/// scans in [`Strategy::Aggressive`] and [`Strategy::Easy`].
const TARGET_CEILING: i64 = 2000;

/// [`Strategy::Opportunist`] only attacks when the target's advantage
/// over the attacker is below this.
const ADVANTAGE_CEILING: i64 = 1000;

/// The scripted strategies a player can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Strategy {
    /// Strongest frontier cell attacks its weakest non-owned neighbor.
    #[default]
    Greedy,
    /// Strict-max frontier scan for the attacker, then the weakest
    /// neighbor under a fixed strength ceiling.
    Aggressive,
    /// Prefers attackers backed by owned or empty neighbors, then the
    /// weakest target reachable from those attackers.
    Careful,
    /// Globally weakest visible neighbor, attacked by whichever cell
    /// sees it.
    Easy,
    /// Minimizes target strength minus attacker strength over all
    /// frontier pairs.
    Opportunist,
}

impl Strategy {
    /// Every strategy, in display order.
    pub const ALL: [Self; 5] = [
        Self::Greedy,
        Self::Aggressive,
        Self::Careful,
        Self::Easy,
        Self::Opportunist,
    ];

    /// Decide this strategy's transfer for the round.
    #[must_use]
    pub fn decide(self, views: &[CellView]) -> Option<ProposedTransfer> {
        match self {
            Self::Greedy => greedy(views),
            Self::Aggressive => aggressive(views),
            Self::Careful => careful(views),
            Self::Easy => easy(views),
            Self::Opportunist => opportunist(views),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Greedy => "greedy",
            Self::Aggressive => "aggressive",
            Self::Careful => "careful",
            Self::Easy => "easy",
            Self::Opportunist => "opportunist",
        };
        f.write_str(name)
    }
}

fn is_target(neighbor: &NeighborView) -> bool {
    neighbor.owner != Ownership::Own
}

/// Every bot commits all but one resource of its chosen attacker.
fn all_but_one(attacker: &CellView, target: &NeighborView) -> ProposedTransfer {
    ProposedTransfer {
        from: attacker.id,
        to: target.id,
        amount: (attacker.resources - 1) as f64,
    }
}

fn greedy(views: &[CellView]) -> Option<ProposedTransfer> {
    let mut attackers: Vec<&CellView> = views.iter().filter(|v| v.on_frontier()).collect();
    attackers.sort_by(|a, b| b.resources.cmp(&a.resources));
    let strongest = attackers.first()?;

    let mut targets: Vec<&NeighborView> = strongest
        .neighbors
        .iter()
        .filter(|n| is_target(n))
        .collect();
    targets.sort_by(|a, b| a.resources.cmp(&b.resources));
    let weakest = targets.first()?;

    Some(all_but_one(strongest, weakest))
}

fn aggressive(views: &[CellView]) -> Option<ProposedTransfer> {
    // Strict max keeps the first of equally strong attackers.
    let mut max_resources = 0;
    let mut attacker: Option<&CellView> = None;
    for cell in views.iter().filter(|v| v.on_frontier()) {
        if cell.resources > max_resources {
            max_resources = cell.resources;
            attacker = Some(cell);
        }
    }
    let attacker = attacker?;

    let mut min_resources = TARGET_CEILING;
    let mut target: Option<&NeighborView> = None;
    for neighbor in &attacker.neighbors {
        if neighbor.resources < min_resources && is_target(neighbor) {
            min_resources = neighbor.resources;
            target = Some(neighbor);
        }
    }

    Some(all_but_one(attacker, target?))
}

fn careful(views: &[CellView]) -> Option<ProposedTransfer> {
    // Backing counts owned neighbors and drained neutral ones; a cell
    // surrounded by either is in little danger of being flanked.
    let backing = |cell: &CellView| {
        cell.neighbors
            .iter()
            .filter(|n| {
                n.owner == Ownership::Own || (n.owner == Ownership::Neutral && n.resources == 0)
            })
            .count()
    };
    let own_count = |cell: &CellView| {
        cell.neighbors
            .iter()
            .filter(|n| n.owner == Ownership::Own)
            .count()
    };

    let mut attackers: Vec<&CellView> = views.iter().filter(|v| v.on_frontier()).collect();
    attackers.sort_by(|a, b| backing(b).cmp(&backing(a)));
    let first = attackers.first()?;

    let max_own = own_count(first);
    let backed: Vec<&CellView> = attackers
        .iter()
        .copied()
        .filter(|cell| own_count(cell) == max_own)
        .collect();

    // The weakest non-owned neighbor across the backed attackers.
    let mut weakest: Option<&NeighborView> = None;
    for cell in &backed {
        let mut candidates: Vec<&NeighborView> =
            cell.neighbors.iter().filter(|n| is_target(n)).collect();
        candidates.sort_by(|a, b| a.resources.cmp(&b.resources));
        if let Some(candidate) = candidates.first() {
            match weakest {
                Some(current) if candidate.resources >= current.resources => {}
                _ => weakest = Some(candidate),
            }
        }
    }
    let weakest = weakest?;

    // Of the backed attackers adjacent to that target, the strongest.
    let mut finalists: Vec<&CellView> = backed
        .iter()
        .copied()
        .filter(|cell| cell.neighbors.iter().any(|n| n.id == weakest.id))
        .collect();
    finalists.sort_by(|a, b| b.resources.cmp(&a.resources));
    let attacker = finalists.first()?;

    Some(all_but_one(attacker, weakest))
}

fn easy(views: &[CellView]) -> Option<ProposedTransfer> {
    let mut min_resources = TARGET_CEILING;
    let mut pick: Option<(&CellView, &NeighborView)> = None;
    for cell in views {
        for neighbor in &cell.neighbors {
            if is_target(neighbor) && neighbor.resources < min_resources {
                min_resources = neighbor.resources;
                pick = Some((cell, neighbor));
            }
        }
    }

    let (attacker, target) = pick?;
    Some(all_but_one(attacker, target))
}

fn opportunist(views: &[CellView]) -> Option<ProposedTransfer> {
    let mut best_advantage = ADVANTAGE_CEILING;
    let mut pick: Option<(&CellView, &NeighborView)> = None;
    for cell in views.iter().filter(|v| v.on_frontier()) {
        for neighbor in &cell.neighbors {
            let advantage = neighbor.resources - cell.resources;
            if advantage < best_advantage && is_target(neighbor) {
                best_advantage = advantage;
                pick = Some((cell, neighbor));
            }
        }
    }

    let (attacker, target) = pick?;
    Some(all_but_one(attacker, target))
}
