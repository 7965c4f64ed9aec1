//! # Hexfray Core
//!
//! Deterministic hex territory-capture simulation core.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No system randomness
//! - No floating-point in resolution arithmetic
//!
//! This separation enables:
//! - Reproducible matches (identical seeds produce identical games)
//! - Headless tournament runs
//! - Replay and snapshot verification
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`coords`] - Cube coordinates on the hex lattice
//! - [`grid`] - Cells and the board arena
//! - [`placement`] - Board construction and fair player placement
//! - [`transaction`] - Transfer validation and batch resolution
//! - [`view`] - Read-only per-player cell views
//! - [`session`] - Game session: rounds, stats, win detection
//! - [`error`] - Session error taxonomy

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod coords;
pub mod error;
pub mod grid;
pub mod placement;
pub mod session;
pub mod transaction;
pub mod view;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::coords::CubeCoord;
    pub use crate::error::{Result, SessionError};
    pub use crate::grid::{Cell, CellId, HexGrid, PlayerId};
    pub use crate::placement::{BoardConfig, BoardRng};
    pub use crate::session::{GameSession, Player, PlayerStats};
    pub use crate::transaction::{ProposedTransfer, Transaction, TransferError};
    pub use crate::view::{CellView, Ownership};
}
