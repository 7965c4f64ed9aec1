//! Game session: rounds, stats, win detection.
//!
//! A session owns the roster, the board, and the round counter. Its
//! lifecycle is: register players, [`GameSession::setup`] once, then
//! drive [`GameSession::play_round`] until [`GameSession::is_over`].
//! Each round asks every living player for at most one transfer,
//! validates it, resolves the valid batch, applies growth, and
//! refreshes per-player statistics.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};
use crate::grid::{HexGrid, PlayerId};
use crate::placement::{build_board, BoardConfig};
use crate::transaction::{self, ProposedTransfer, Transaction};
use crate::view::{player_views, CellView};

/// Display color assigned to a player.
///
/// The palette size caps the roster; colors are handed out in
/// registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerColor {
    /// Red.
    Red,
    /// Orange.
    Orange,
    /// Yellow.
    Yellow,
    /// Green.
    Green,
    /// Cyan.
    Cyan,
    /// Blue.
    Blue,
    /// Purple.
    Purple,
    /// Magenta.
    Magenta,
    /// Teal.
    Teal,
    /// Olive.
    Olive,
}

/// Colors in hand-out order. One per roster slot.
pub const PLAYER_PALETTE: [PlayerColor; 10] = [
    PlayerColor::Red,
    PlayerColor::Orange,
    PlayerColor::Yellow,
    PlayerColor::Green,
    PlayerColor::Cyan,
    PlayerColor::Blue,
    PlayerColor::Purple,
    PlayerColor::Magenta,
    PlayerColor::Teal,
    PlayerColor::Olive,
];

/// A registered player and their running statistics.
///
/// Statistics are refreshed from the board at setup and after every
/// round. A player whose recorded cell count has reached zero is
/// skipped by later refreshes and by transfer gathering; elimination
/// is permanent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Stable player id.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Display color.
    pub color: PlayerColor,
    /// Cells owned at the last stats refresh.
    pub owned_cell_count: usize,
    /// Resources across owned cells at the last stats refresh.
    pub total_resources: i64,
    /// Rounds this player was alive for, counting setup as the first.
    pub rounds_survived: u64,
    /// Transfers rejected by validation so far.
    pub exceptions: u64,
}

impl Player {
    fn new(id: PlayerId, name: String, color: PlayerColor) -> Self {
        Self {
            id,
            name,
            color,
            owned_cell_count: 0,
            total_resources: 0,
            rounds_survived: 0,
            exceptions: 0,
        }
    }

    /// Whether the player still held cells at the last stats refresh.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.owned_cell_count > 0
    }

    fn recompute(&mut self, grid: &HexGrid) {
        self.owned_cell_count = 0;
        self.total_resources = 0;
        for cell in grid.cells() {
            if cell.owner == Some(self.id) {
                self.owned_cell_count += 1;
                self.total_resources += cell.resources;
            }
        }
    }
}

/// Point-in-time statistics row for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    /// Player id.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Display color.
    pub color: PlayerColor,
    /// Cells owned.
    pub cell_count: usize,
    /// Total resources across owned cells.
    pub resources: i64,
    /// Whether the player still holds cells.
    pub is_alive: bool,
    /// Rounds survived.
    pub rounds_survived: u64,
    /// Transfers rejected by validation.
    pub exceptions: u64,
}

/// One complete game.
///
/// Serializable in full, so a snapshot taken mid-game restores to an
/// identical session (see [`GameSession::snapshot`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    players: Vec<Player>,
    grid: Option<HexGrid>,
    config: BoardConfig,
    round: u64,
    next_player_id: u32,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(BoardConfig::default())
    }
}

impl GameSession {
    /// Create an empty session with the given board configuration.
    #[must_use]
    pub const fn new(config: BoardConfig) -> Self {
        Self {
            players: Vec::new(),
            grid: None,
            config,
            round: 0,
            next_player_id: 0,
        }
    }

    /// Register a player.
    ///
    /// # Errors
    ///
    /// [`SessionError::RosterFrozen`] after setup,
    /// [`SessionError::RosterFull`] when the palette is exhausted.
    pub fn add_player(&mut self, name: impl Into<String>) -> Result<PlayerId> {
        if self.grid.is_some() {
            return Err(SessionError::RosterFrozen);
        }
        if self.players.len() >= PLAYER_PALETTE.len() {
            return Err(SessionError::RosterFull {
                max: PLAYER_PALETTE.len(),
            });
        }

        let id = PlayerId(self.next_player_id);
        self.next_player_id += 1;
        let color = PLAYER_PALETTE[self.players.len()];
        self.players.push(Player::new(id, name.into(), color));
        Ok(id)
    }

    /// Unregister a player before setup.
    ///
    /// # Errors
    ///
    /// [`SessionError::RosterFrozen`] after setup,
    /// [`SessionError::UnknownPlayer`] for an id not on the roster.
    pub fn remove_player(&mut self, id: PlayerId) -> Result<()> {
        if self.grid.is_some() {
            return Err(SessionError::RosterFrozen);
        }
        let idx = self
            .players
            .iter()
            .position(|p| p.id == id)
            .ok_or(SessionError::UnknownPlayer(id))?;
        self.players.remove(idx);
        Ok(())
    }

    /// Build the board and prime every player's statistics.
    ///
    /// Priming runs for the whole roster, so every player enters round
    /// one alive with their starting cell on record.
    ///
    /// # Errors
    ///
    /// [`SessionError::EmptyRoster`] with no players,
    /// [`SessionError::AlreadySetUp`] on a second call.
    pub fn setup(&mut self) -> Result<()> {
        if self.grid.is_some() {
            return Err(SessionError::AlreadySetUp);
        }
        if self.players.is_empty() {
            return Err(SessionError::EmptyRoster);
        }

        let ids: Vec<PlayerId> = self.players.iter().map(|p| p.id).collect();
        let grid = build_board(&ids, self.config);

        for player in &mut self.players {
            player.recompute(&grid);
            player.rounds_survived += 1;
        }
        self.grid = Some(grid);

        tracing::info!(
            players = self.players.len(),
            cells = self.grid.as_ref().map_or(0, HexGrid::len),
            seed = self.config.seed,
            "session set up"
        );
        Ok(())
    }

    /// Play one round.
    ///
    /// Every living player is shown the views of their cells and asked
    /// for at most one transfer; `None` declines. Invalid transfers
    /// are dropped from the batch and counted against the player, not
    /// escalated. The valid batch resolves as one simultaneous step,
    /// then every owned cell grows, then statistics refresh.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotSetUp`] before [`GameSession::setup`],
    /// [`SessionError::GameOver`] once the board has a single owner.
    pub fn play_round<F>(&mut self, mut decide: F) -> Result<()>
    where
        F: FnMut(&Player, &[CellView]) -> Option<ProposedTransfer>,
    {
        if self.grid.is_none() {
            return Err(SessionError::NotSetUp);
        }
        if self.is_over() {
            return Err(SessionError::GameOver);
        }

        let mut batch = Vec::new();
        {
            let grid = self.grid.as_ref().expect("presence checked above");
            for player in &mut self.players {
                if !player.is_alive() {
                    continue;
                }
                let views = player_views(grid, player.id);
                let Some(proposal) = decide(player, &views) else {
                    continue;
                };

                let tx = Transaction::from_proposal(player.id, proposal);
                match transaction::validate(&tx, grid) {
                    Ok(()) => batch.push(tx),
                    Err(err) => {
                        player.exceptions += 1;
                        tracing::debug!(player = %tx.player, %err, "transfer rejected");
                    }
                }
            }
        }

        let grid = self.grid.as_mut().expect("presence checked above");
        transaction::resolve_all(&batch, grid);
        grid.grow_owned();
        self.refresh_stats();
        self.round += 1;

        #[cfg(debug_assertions)]
        {
            let grid = self.grid.as_ref().expect("presence checked above");
            tracing::debug!(
                round = self.round,
                hash = grid.state_hash(),
                "round resolved"
            );
        }
        Ok(())
    }

    /// Recompute stats for players that were alive going into the
    /// refresh. Players already recorded as eliminated stay frozen at
    /// their final numbers.
    fn refresh_stats(&mut self) {
        let grid = self.grid.as_ref().expect("stats refresh requires a board");
        for player in &mut self.players {
            if !player.is_alive() {
                continue;
            }
            player.recompute(grid);
            player.rounds_survived += 1;
        }
    }

    /// Whether the whole board shares one owner.
    ///
    /// An all-neutral board also counts as over; there is then no
    /// winner. Before setup the game is not over.
    #[must_use]
    pub fn is_over(&self) -> bool {
        let Some(grid) = self.grid.as_ref() else {
            return false;
        };
        let first = grid.cells()[0].owner;
        grid.cells().iter().all(|cell| cell.owner == first)
    }

    /// The winning player, once the game is over and the board is not
    /// all-neutral.
    #[must_use]
    pub fn winner(&self) -> Option<&Player> {
        if !self.is_over() {
            return None;
        }
        let owner = self.grid.as_ref()?.cells()[0].owner?;
        self.players.iter().find(|p| p.id == owner)
    }

    /// Statistics rows for every registered player, in roster order.
    #[must_use]
    pub fn player_stats(&self) -> Vec<PlayerStats> {
        self.players
            .iter()
            .map(|p| PlayerStats {
                id: p.id,
                name: p.name.clone(),
                color: p.color,
                cell_count: p.owned_cell_count,
                resources: p.total_resources,
                is_alive: p.is_alive(),
                rounds_survived: p.rounds_survived,
                exceptions: p.exceptions,
            })
            .collect()
    }

    /// Registered players in roster order.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Rounds played so far.
    #[must_use]
    pub const fn round(&self) -> u64 {
        self.round
    }

    /// Board configuration the session was created with.
    #[must_use]
    pub const fn config(&self) -> BoardConfig {
        self.config
    }

    /// The board, once set up.
    #[must_use]
    pub fn grid(&self) -> Option<&HexGrid> {
        self.grid.as_ref()
    }

    /// Hash of the board state, once set up.
    #[must_use]
    pub fn state_hash(&self) -> Option<u64> {
        self.grid.as_ref().map(HexGrid::state_hash)
    }

    /// Serialize the whole session.
    ///
    /// # Errors
    ///
    /// [`SessionError::Snapshot`] on codec failure.
    pub fn snapshot(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Restore a session from [`GameSession::snapshot`] bytes.
    ///
    /// # Errors
    ///
    /// [`SessionError::Snapshot`] on codec failure.
    pub fn restore(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}
