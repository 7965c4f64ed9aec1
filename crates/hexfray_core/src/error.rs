//! Session error taxonomy.
//!
//! Transfer rejection has its own taxonomy in
//! [`crate::transaction::TransferError`]; the errors here cover
//! session lifecycle misuse and snapshot IO.

use thiserror::Error;

use crate::grid::PlayerId;

/// Convenience alias for session results.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors raised by [`crate::session::GameSession`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// A round was requested before the board was set up.
    #[error("session has not been set up")]
    NotSetUp,

    /// A round was requested after the game ended.
    #[error("game is already over")]
    GameOver,

    /// Setup was requested with no players registered.
    #[error("cannot set up a board with no players")]
    EmptyRoster,

    /// Setup was requested twice.
    #[error("board is already set up")]
    AlreadySetUp,

    /// Roster changed after setup.
    #[error("roster is frozen once the board is set up")]
    RosterFrozen,

    /// More players than the palette supports.
    #[error("roster is full ({max} players maximum)")]
    RosterFull {
        /// Largest supported roster.
        max: usize,
    },

    /// An operation referenced a player that is not registered.
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    /// Snapshot serialization or deserialization failed.
    #[error("snapshot codec failure")]
    Snapshot(#[from] bincode::Error),
}
