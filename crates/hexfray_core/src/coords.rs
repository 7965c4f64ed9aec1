//! Cube coordinates on the hexagonal lattice.
//!
//! All board geometry uses cube coordinates, where every position
//! satisfies `x + y + z == 0`. Integer arithmetic only, so coordinate
//! math is deterministic across platforms.

use serde::{Deserialize, Serialize};

/// A position on the hex lattice in cube coordinates.
///
/// The three components always sum to zero. Constructors and
/// arithmetic preserve this invariant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct CubeCoord {
    /// X axis component.
    pub x: i32,
    /// Y axis component.
    pub y: i32,
    /// Z axis component.
    pub z: i32,
}

/// The six edge-adjacent offsets, in fixed scan order.
///
/// The order matters: neighbor slots, frontier scans, and the spiral
/// walk all index into this table, so reordering it changes every
/// board layout.
pub const NEIGHBOR_OFFSETS: [CubeCoord; 6] = [
    CubeCoord::new(0, -1, 1),
    CubeCoord::new(1, 0, -1),
    CubeCoord::new(-1, 1, 0),
    CubeCoord::new(0, 1, -1),
    CubeCoord::new(-1, 0, 1),
    CubeCoord::new(1, -1, 0),
];

/// The six diagonal offsets (distance 2, sharing no edge).
///
/// Super cell promotion uses the first entry.
pub const DIAGONAL_OFFSETS: [CubeCoord; 6] = [
    CubeCoord::new(-1, -1, 2),
    CubeCoord::new(-2, 1, 1),
    CubeCoord::new(-1, 2, -1),
    CubeCoord::new(1, 1, -2),
    CubeCoord::new(2, -1, -1),
    CubeCoord::new(1, -2, 1),
];

impl CubeCoord {
    /// Origin of the lattice.
    pub const ORIGIN: Self = Self::new(0, 0, 0);

    /// Create a new cube coordinate.
    ///
    /// Debug builds assert the zero-sum invariant.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        debug_assert!(x + y + z == 0);
        Self { x, y, z }
    }

    /// Lattice distance between two coordinates.
    ///
    /// Half the component-wise absolute difference, which on the hex
    /// lattice equals the minimum number of neighbor steps.
    #[must_use]
    pub const fn distance(self, other: Self) -> i32 {
        let dx = (self.x - other.x).abs();
        let dy = (self.y - other.y).abs();
        let dz = (self.z - other.z).abs();
        (dx + dy + dz) / 2
    }

    /// Rotate 60 degrees counterclockwise around the origin.
    #[must_use]
    pub const fn rotate60(self) -> Self {
        Self::new(-self.y, -self.z, -self.x)
    }

    /// The rotational orbit of this coordinate around the origin.
    ///
    /// Six entries starting with `self`, one per 60-degree step. The
    /// origin is its own orbit and yields a single entry.
    #[must_use]
    pub fn all_rotations(self) -> Vec<Self> {
        if self == Self::ORIGIN {
            return vec![self];
        }
        let mut orbit = Vec::with_capacity(6);
        let mut current = self;
        for _ in 0..6 {
            orbit.push(current);
            current = current.rotate60();
        }
        orbit
    }

    /// The coordinate's six edge neighbors, in scan order.
    #[must_use]
    pub fn neighbors(self) -> [Self; 6] {
        let mut out = [Self::ORIGIN; 6];
        for (slot, offset) in out.iter_mut().zip(NEIGHBOR_OFFSETS) {
            *slot = self + offset;
        }
        out
    }
}

impl std::ops::Add for CubeCoord {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::Sub for CubeCoord {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl std::ops::Neg for CubeCoord {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl std::fmt::Display for CubeCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
