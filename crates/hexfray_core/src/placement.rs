//! Board construction and fair player placement.
//!
//! Sizes the board from the player count, places starting cells on
//! expanding rings with rotational offsets, seeds each player's
//! mining field from one shared resource multiset, and promotes one
//! super cell per player. All randomness flows through [`BoardRng`],
//! so a seed fully determines the board.

use serde::{Deserialize, Serialize};

use crate::coords::{CubeCoord, DIAGONAL_OFFSETS};
use crate::grid::{HexGrid, PlayerId, Wraparound};

/// Resources granted to every starting cell.
pub const STARTING_RESOURCES: i64 = 10;

/// Minimum ring count of any board.
const MIN_RINGS: u32 = 6;

/// Board construction parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Edge behavior.
    pub wraparound: Wraparound,
    /// Random seed for deterministic construction.
    pub seed: u64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            wraparound: Wraparound::Wrap,
            seed: 12345,
        }
    }
}

impl BoardConfig {
    /// Set the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the edge behavior.
    #[must_use]
    pub const fn with_wraparound(mut self, wraparound: Wraparound) -> Self {
        self.wraparound = wraparound;
        self
    }
}

/// Simple deterministic RNG for board construction.
///
/// Only used at setup; rounds themselves involve no randomness.
#[derive(Debug, Clone)]
pub struct BoardRng {
    state: u64,
}

impl BoardRng {
    /// Create a generator from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(0x9E37_79B9_7F4A_7C15),
        }
    }

    /// Next raw value.
    pub fn next(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(0x5_DEEC_E66D).wrapping_add(11);
        self.state
    }

    /// Next value in `[min, max)`.
    pub fn next_range(&mut self, min: i32, max: i32) -> i32 {
        let range = (max - min) as u64;
        if range == 0 {
            return min;
        }
        min + (self.next() % range) as i32
    }

    /// Fisher-Yates shuffle in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range(0, i32::try_from(i).expect("slice too large") + 1) as usize;
            slice.swap(i, j);
        }
    }
}

/// Ring count and player-ring count needed to fit `player_count`
/// players.
///
/// Starts at the minimum board (one player ring around the origin,
/// capacity 7) and adds four rings per extra player ring: a boundary
/// ring, both sides of the new mining fields, and the player ring
/// itself. Each player ring `k` adds `6k` starting positions.
#[must_use]
pub fn board_dimensions(player_count: usize) -> (u32, u32) {
    let mut num_rings = MIN_RINGS;
    let mut num_player_rings = 1u32;
    let mut capacity = 1 + 6 * num_player_rings as usize;

    while capacity < player_count {
        num_rings += 4;
        num_player_rings += 1;
        capacity += 6 * num_player_rings as usize;
    }

    (num_rings, num_player_rings)
}

/// Build a complete board and place every player on it.
///
/// The first player takes the origin; later players fill candidate
/// cells generated ring by ring, each ring offering its base offset
/// plus `ring - 1` finer offsets (stepping by `(-4, 0, 4)`), every
/// offset expanded through its full rotational orbit. Each player's
/// six neighbors get the shared mining-field multiset, reshuffled per
/// player, and the cell at the first diagonal offset is promoted to a
/// super cell.
///
/// # Panics
///
/// Panics if `player_ids` is empty, or if a start or super-cell
/// coordinate is missing from the board index. The sizing from
/// [`board_dimensions`] guarantees those coordinates exist, so a miss
/// is a construction bug, not a runtime condition.
#[must_use]
pub fn build_board(player_ids: &[PlayerId], config: BoardConfig) -> HexGrid {
    assert!(
        !player_ids.is_empty(),
        "board construction requires at least one player"
    );

    let (num_rings, num_player_rings) = board_dimensions(player_ids.len());
    let mut grid = HexGrid::with_rings(num_rings, config.wraparound);
    let mut rng = BoardRng::new(config.seed);

    // One multiset of six draws from [0, 100), shared by every player.
    let mut mining_field: [i64; 6] = std::array::from_fn(|_| i64::from(rng.next_range(0, 100)));

    occupy_start_cell(&mut grid, CubeCoord::ORIGIN, player_ids[0], &mining_field);
    let mut assigned = 1;

    let mut ring_base = CubeCoord::new(4, -4, 0);
    for ring in 1..=num_player_rings {
        // Every extra offset halves the effective rotation step:
        // 1 offset = 60 degree spacing, 2 offsets = 30, 3 offsets = 15.
        let mut candidates = Vec::new();
        let mut offset = ring_base;
        for _ in 0..ring {
            candidates.extend(offset.all_rotations());
            offset = offset + CubeCoord::new(-4, 0, 4);
        }

        for candidate in candidates {
            if assigned >= player_ids.len() {
                break;
            }
            rng.shuffle(&mut mining_field);
            occupy_start_cell(&mut grid, candidate, player_ids[assigned], &mining_field);
            assigned += 1;
        }

        ring_base = ring_base + CubeCoord::new(4, -4, 0);
    }

    tracing::debug!(
        players = player_ids.len(),
        num_rings,
        num_player_rings,
        seed = config.seed,
        "board placed"
    );

    grid
}

/// Claim `coord` for `player`: starting resources, mining field on the
/// six neighbors, super cell at the first diagonal.
fn occupy_start_cell(
    grid: &mut HexGrid,
    coord: CubeCoord,
    player: PlayerId,
    mining_field: &[i64; 6],
) {
    let start_id = grid
        .id_at(coord)
        .unwrap_or_else(|| panic!("player start coordinate {coord} missing from board index"));

    let neighbor_ids = {
        let cell = grid.cell_mut(start_id).expect("start cell id out of range");
        cell.resources = STARTING_RESOURCES;
        cell.owner = Some(player);
        cell.neighbors.clone()
    };

    for (slot, neighbor_id) in neighbor_ids.into_iter().enumerate() {
        let neighbor = grid
            .cell_mut(neighbor_id)
            .expect("neighbor cell id out of range");
        neighbor.resources = mining_field[slot];
    }

    let super_coord = coord + DIAGONAL_OFFSETS[0];
    let super_id = grid
        .id_at(super_coord)
        .unwrap_or_else(|| panic!("super cell coordinate {super_coord} missing from board index"));
    grid.cell_mut(super_id)
        .expect("super cell id out of range")
        .make_super();
}
