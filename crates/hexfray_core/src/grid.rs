//! Cells and the board arena.
//!
//! The board is a fixed set of hex cells enumerated in spiral order
//! from the origin, stored in an arena indexed by [`CellId`]. Neighbor
//! relations are stored as id lists rather than references, so the
//! topology is cycle-free to own and cheap to serialize. Topology never
//! changes after construction; only cell contents do.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::coords::{CubeCoord, NEIGHBOR_OFFSETS};

/// Stable identifier of a cell within one board.
///
/// Ids are assigned in spiral enumeration order, so id 0 is always the
/// origin cell.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct CellId(pub u32);

impl CellId {
    /// Arena index of this id.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for CellId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cell#{}", self.0)
    }
}

/// Identifier of a registered player.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct PlayerId(pub u32);

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "player#{}", self.0)
    }
}

/// Growth cap for a regular cell.
pub const MAX_GROWTH: i64 = 100;

/// Growth cap for a super cell.
pub const SUPER_MAX_GROWTH: i64 = 300;

/// One hex tile.
///
/// `resources` and `owner` are the only fields that change during a
/// game; both are mutated exclusively by batch resolution and the
/// growth phase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// Stable id within the board.
    pub id: CellId,
    /// Lattice position.
    pub coord: CubeCoord,
    /// Current resource count, never negative.
    pub resources: i64,
    /// Owning player, `None` for neutral cells.
    pub owner: Option<PlayerId>,
    /// Growth cap, [`MAX_GROWTH`] or [`SUPER_MAX_GROWTH`].
    pub max_growth: i64,
    /// Neighbor ids in offset scan order. Six entries on a wrapped
    /// board; boundary cells of an unwrapped board have fewer.
    pub neighbors: Vec<CellId>,
}

impl Cell {
    fn new(id: CellId, coord: CubeCoord) -> Self {
        Self {
            id,
            coord,
            resources: 0,
            owner: None,
            max_growth: MAX_GROWTH,
            neighbors: Vec::with_capacity(6),
        }
    }

    /// Whether any player owns this cell.
    #[must_use]
    pub const fn is_owned(&self) -> bool {
        self.owner.is_some()
    }

    /// Raise the growth cap to the super-cell level.
    pub fn make_super(&mut self) {
        self.max_growth = SUPER_MAX_GROWTH;
    }

    /// Gain one resource unless already at the growth cap.
    pub fn grow(&mut self) {
        if self.resources < self.max_growth {
            self.resources += 1;
        }
    }
}

/// Edge behavior of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Wraparound {
    /// Fold edges into a toroidal topology; every cell has 6 neighbors.
    #[default]
    Wrap,
    /// Hard boundary; outer-ring cells have fewer than 6 neighbors.
    NoWrap,
}

/// The complete board: cell arena plus coordinate index.
///
/// Cells are stored in spiral order and [`CellId`] doubles as the
/// arena index, so id lookups are direct indexing. The coordinate
/// index is a `BTreeMap` so serialized boards are byte-stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HexGrid {
    cells: Vec<Cell>,
    coord_index: BTreeMap<CubeCoord, CellId>,
    num_rings: u32,
    wraparound: Wraparound,
}

/// All coordinates within `num_rings` of the origin, in spiral order.
///
/// Walks each ring as six straight segments. Yields `1 + 3R(R+1)`
/// coordinates for `R` rings.
fn spiral_coords(num_rings: u32) -> Vec<CubeCoord> {
    let rings = num_rings as i32;
    let mut coords = vec![CubeCoord::ORIGIN];

    for r in 1..=rings {
        let (mut x, mut y, mut z) = (0, -r, r);

        for _ in 0..r {
            x += 1;
            z -= 1;
            coords.push(CubeCoord::new(x, y, z));
        }
        for _ in 0..r {
            y += 1;
            z -= 1;
            coords.push(CubeCoord::new(x, y, z));
        }
        for _ in 0..r {
            x -= 1;
            y += 1;
            coords.push(CubeCoord::new(x, y, z));
        }
        for _ in 0..r {
            x -= 1;
            z += 1;
            coords.push(CubeCoord::new(x, y, z));
        }
        for _ in 0..r {
            y -= 1;
            z += 1;
            coords.push(CubeCoord::new(x, y, z));
        }
        for _ in 0..r {
            x += 1;
            y -= 1;
            coords.push(CubeCoord::new(x, y, z));
        }
    }

    coords
}

impl HexGrid {
    /// Build a board with the given ring count.
    ///
    /// Two passes: create every cell from the spiral enumeration, then
    /// link neighbors through the completed coordinate index. With
    /// [`Wraparound::Wrap`], out-of-board neighbor coordinates are
    /// folded back through the nearest of six mirror centers, the
    /// rotational orbit of `(2R+1, -R-1, -R)`.
    #[must_use]
    pub fn with_rings(num_rings: u32, wraparound: Wraparound) -> Self {
        let coords = spiral_coords(num_rings);

        let mut cells = Vec::with_capacity(coords.len());
        let mut coord_index = BTreeMap::new();
        for (i, coord) in coords.into_iter().enumerate() {
            let id = CellId(u32::try_from(i).expect("board exceeds u32 cell capacity"));
            cells.push(Cell::new(id, coord));
            coord_index.insert(coord, id);
        }

        let rings = num_rings as i32;
        let mirror_centers =
            CubeCoord::new(2 * rings + 1, -rings - 1, -rings).all_rotations();

        for cell_idx in 0..cells.len() {
            let center = cells[cell_idx].coord;
            let mut linked = Vec::with_capacity(6);

            for offset in NEIGHBOR_OFFSETS {
                let mut neighbor_coord = center + offset;

                if wraparound == Wraparound::Wrap {
                    // At most one mirror center lies within R of any
                    // coordinate just outside the board.
                    if let Some(mirror) = mirror_centers
                        .iter()
                        .find(|m| m.distance(neighbor_coord) <= rings)
                    {
                        neighbor_coord = neighbor_coord - *mirror;
                    }
                }

                if let Some(&neighbor_id) = coord_index.get(&neighbor_coord) {
                    linked.push(neighbor_id);
                }
            }

            cells[cell_idx].neighbors = linked;
        }

        tracing::debug!(
            num_rings,
            cell_count = cells.len(),
            ?wraparound,
            "board topology built"
        );

        Self {
            cells,
            coord_index,
            num_rings,
            wraparound,
        }
    }

    /// Number of cells on the board.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the board has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Ring count the board was built with.
    #[must_use]
    pub const fn num_rings(&self) -> u32 {
        self.num_rings
    }

    /// Edge behavior the board was built with.
    #[must_use]
    pub const fn wraparound(&self) -> Wraparound {
        self.wraparound
    }

    /// Look up a cell by id.
    #[must_use]
    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id.index())
    }

    /// Look up a cell by id, mutably.
    pub fn cell_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        self.cells.get_mut(id.index())
    }

    /// Look up a cell id by coordinate.
    #[must_use]
    pub fn id_at(&self, coord: CubeCoord) -> Option<CellId> {
        self.coord_index.get(&coord).copied()
    }

    /// Look up a cell by coordinate.
    #[must_use]
    pub fn cell_at(&self, coord: CubeCoord) -> Option<&Cell> {
        self.id_at(coord).and_then(|id| self.cell(id))
    }

    /// All cells in spiral order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Mutable iteration over all cells in spiral order.
    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.iter_mut()
    }

    /// Apply one round of growth: every owned cell gains 1 up to its
    /// cap, unowned cells are untouched.
    pub fn grow_owned(&mut self) {
        for cell in &mut self.cells {
            if cell.is_owned() {
                cell.grow();
            }
        }
    }

    /// Hash of all mutable cell state, in spiral order.
    ///
    /// Equal hashes across runs with the same seed and inputs are the
    /// determinism criterion used by the test harness.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        for cell in &self.cells {
            cell.hash(&mut hasher);
        }
        hasher.finish()
    }
}
