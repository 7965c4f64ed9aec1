//! Read-only per-player cell views.
//!
//! Strategies never see the board directly. Each round they receive a
//! snapshot of the cells the player owns, with every neighbor tagged
//! relative to the viewing player. Raw owner ids never cross this
//! boundary, so a strategy cannot target a specific opponent by
//! identity.

use serde::{Deserialize, Serialize};

use crate::grid::{CellId, HexGrid, PlayerId};

/// Ownership of a cell relative to the viewing player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ownership {
    /// Owned by the viewing player.
    Own,
    /// Owned by some other player.
    Foreign,
    /// Unowned.
    Neutral,
}

impl Ownership {
    fn relative_to(owner: Option<PlayerId>, viewer: PlayerId) -> Self {
        match owner {
            Some(id) if id == viewer => Self::Own,
            Some(_) => Self::Foreign,
            None => Self::Neutral,
        }
    }
}

/// What a strategy sees of one neighboring cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborView {
    /// Cell id, usable as a transfer destination.
    pub id: CellId,
    /// Current resources.
    pub resources: i64,
    /// Growth cap.
    pub max_growth: i64,
    /// Ownership relative to the viewer.
    pub owner: Ownership,
}

/// What a strategy sees of one of its own cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellView {
    /// Cell id, usable as a transfer source.
    pub id: CellId,
    /// Current resources.
    pub resources: i64,
    /// Growth cap.
    pub max_growth: i64,
    /// The cell's neighbors in scan order.
    pub neighbors: Vec<NeighborView>,
}

impl CellView {
    /// Whether any neighbor is outside the viewer's territory.
    #[must_use]
    pub fn on_frontier(&self) -> bool {
        self.neighbors.iter().any(|n| n.owner != Ownership::Own)
    }
}

/// Build the view of every cell `viewer` owns, in board order.
#[must_use]
pub fn player_views(grid: &HexGrid, viewer: PlayerId) -> Vec<CellView> {
    grid.cells()
        .iter()
        .filter(|cell| cell.owner == Some(viewer))
        .map(|cell| CellView {
            id: cell.id,
            resources: cell.resources,
            max_growth: cell.max_growth,
            neighbors: cell
                .neighbors
                .iter()
                .map(|&id| {
                    let neighbor = grid.cell(id).expect("neighbor ids are valid by construction");
                    NeighborView {
                        id,
                        resources: neighbor.resources,
                        max_growth: neighbor.max_growth,
                        owner: Ownership::relative_to(neighbor.owner, viewer),
                    }
                })
                .collect(),
        })
        .collect()
}
