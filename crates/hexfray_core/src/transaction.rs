//! Transfer validation and batch resolution.
//!
//! Players move resources between cells with transactions. Every
//! transaction is validated against a fixed, ordered list of checks;
//! the batch of valid transactions for a round is then resolved in two
//! phases so that all transfers appear simultaneous: debit every
//! source first, then settle each destination from its aggregated
//! contributions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::{CellId, HexGrid, PlayerId};

/// A transfer as produced by a strategy: source, destination, amount.
///
/// The amount is a float at this boundary; whole-number enforcement is
/// a validation check, not a type constraint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProposedTransfer {
    /// Source cell.
    pub from: CellId,
    /// Destination cell.
    pub to: CellId,
    /// Resources to move.
    pub amount: f64,
}

/// A proposed transfer bound to the player who issued it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Issuing player.
    pub player: PlayerId,
    /// Source cell.
    pub from: CellId,
    /// Destination cell.
    pub to: CellId,
    /// Resources to move.
    pub amount: f64,
}

impl Transaction {
    /// Bind a proposal to its issuing player.
    #[must_use]
    pub const fn from_proposal(player: PlayerId, proposal: ProposedTransfer) -> Self {
        Self {
            player,
            from: proposal.from,
            to: proposal.to,
            amount: proposal.amount,
        }
    }
}

/// Why a transaction was rejected.
///
/// Checks run in a fixed order and the first violated check wins, so
/// exactly one of these is reported per invalid transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransferError {
    /// The source id does not resolve to a cell.
    #[error("source cell id does not exist on the board")]
    InvalidFromId,
    /// The destination id does not resolve to a cell.
    #[error("destination cell id does not exist on the board")]
    InvalidToId,
    /// Source and destination are the same cell.
    #[error("source and destination are the same cell")]
    SameHexagon,
    /// Same-owner transfer without a connecting path of owned cells.
    #[error("no connected path of owned cells between source and destination")]
    OwnedHexagonsNotConnected,
    /// The amount is negative.
    #[error("transfer amount is negative")]
    NegativeTransferAmount,
    /// The source holds fewer resources than the amount.
    #[error("source cell does not hold enough resources")]
    NotEnoughResources,
    /// The source is not owned by the issuing player.
    #[error("source cell is not owned by the issuing player")]
    UnownedFromHexagon,
    /// A foreign or neutral destination that is not adjacent to the
    /// source.
    #[error("destination outside own territory must neighbor the source")]
    UnownedToHexagonNotNeighbor,
    /// The amount is not a whole number.
    #[error("transfer amount is not a whole number")]
    AmountNotInteger,
}

/// Validate one transaction against the current board.
///
/// The checks run in a fixed order and only the first failure is
/// reported. Resources may move arbitrarily far through a player's own
/// connected territory, but foreign and neutral cells can only be
/// targeted from a direct neighbor.
#[allow(clippy::cast_precision_loss)]
pub fn validate(tx: &Transaction, grid: &HexGrid) -> Result<(), TransferError> {
    let Some(from) = grid.cell(tx.from) else {
        return Err(TransferError::InvalidFromId);
    };
    let Some(to) = grid.cell(tx.to) else {
        return Err(TransferError::InvalidToId);
    };

    if tx.from == tx.to {
        return Err(TransferError::SameHexagon);
    }

    // Neutral-to-neutral pairs compare equal here too; they pass over
    // the (usually large) neutral region and fail the ownership check
    // below instead.
    if from.owner == to.owner && !owned_path_exists(grid, tx.from, tx.to, from.owner) {
        return Err(TransferError::OwnedHexagonsNotConnected);
    }

    if tx.amount < 0.0 {
        return Err(TransferError::NegativeTransferAmount);
    }

    if (from.resources as f64) < tx.amount {
        return Err(TransferError::NotEnoughResources);
    }

    if from.owner != Some(tx.player) {
        return Err(TransferError::UnownedFromHexagon);
    }

    if to.owner != from.owner && !from.neighbors.contains(&tx.to) {
        return Err(TransferError::UnownedToHexagonNotNeighbor);
    }

    // Last on purpose: a fractional amount that also overdraws reports
    // the overdraw, matching the check order above.
    if tx.amount.fract() != 0.0 {
        return Err(TransferError::AmountNotInteger);
    }

    Ok(())
}

/// Depth-first reachability over cells with the given owner.
///
/// Boolean result only; traversal order does not matter.
fn owned_path_exists(grid: &HexGrid, from: CellId, to: CellId, owner: Option<PlayerId>) -> bool {
    let mut visited = vec![false; grid.len()];
    let mut stack = vec![from];

    while let Some(id) = stack.pop() {
        if id == to {
            return true;
        }
        if visited[id.index()] {
            continue;
        }
        visited[id.index()] = true;

        let cell = grid.cell(id).expect("cell ids on the stack are in range");
        for &neighbor_id in &cell.neighbors {
            if visited[neighbor_id.index()] {
                continue;
            }
            let neighbor = grid
                .cell(neighbor_id)
                .expect("neighbor ids are valid by construction");
            if neighbor.owner == owner {
                stack.push(neighbor_id);
            }
        }
    }

    false
}

/// Resolve a batch of validated transactions against the board.
///
/// Phase 1 debits every source in batch order, so a cell sourcing
/// several transfers pays each one cumulatively and a cell that is
/// both source and destination is fully debited before it settles.
/// Phase 2 settles each destination: contributions are summed per
/// player in first-seen order, then a single scan finds the leader. A
/// later contributor whose total **equals** the current leader's total
/// displaces them, and the displaced total becomes the runner-up; this
/// later-wins tie rule is load-bearing game behavior. The destination
/// then gains `leader - runner_up` if the leader already owns it, or
/// loses that amount otherwise, flipping to the leader when driven
/// negative and turning neutral when driven to exactly zero.
///
/// # Panics
///
/// Panics if a transaction references a cell id that is not on the
/// board. Callers pass only transactions accepted by [`validate`], so
/// a miss is a caller bug.
#[allow(clippy::cast_possible_truncation)]
pub fn resolve_all(transactions: &[Transaction], grid: &mut HexGrid) {
    // Insertion-ordered pots: Vec instead of a map because the leader
    // scan must see contributors in first-seen order.
    let mut pots: Vec<(CellId, Vec<(PlayerId, i64)>)> = Vec::new();

    for tx in transactions {
        // Validated amounts are whole and within i64 range.
        let amount = tx.amount as i64;

        grid.cell_mut(tx.from)
            .expect("validated source id is on the board")
            .resources -= amount;

        let pot_idx = match pots.iter().position(|(dest, _)| *dest == tx.to) {
            Some(idx) => idx,
            None => {
                pots.push((tx.to, Vec::new()));
                pots.len() - 1
            }
        };
        let contributions = &mut pots[pot_idx].1;
        match contributions.iter_mut().find(|(p, _)| *p == tx.player) {
            Some((_, total)) => *total += amount,
            None => contributions.push((tx.player, amount)),
        }
    }

    for (dest_id, contributions) in pots {
        let mut leader: Option<PlayerId> = None;
        let mut leader_total = 0i64;
        let mut runner_up = 0i64;

        for (player, total) in contributions {
            if total >= leader_total {
                runner_up = leader_total;
                leader_total = total;
                leader = Some(player);
            }
        }

        let net = leader_total - runner_up;
        let dest = grid
            .cell_mut(dest_id)
            .expect("validated destination id is on the board");

        if dest.owner == leader {
            dest.resources += net;
        } else {
            dest.resources -= net;
            if dest.resources < 0 {
                dest.resources = -dest.resources;
                dest.owner = leader;
                tracing::debug!(
                    cell = %dest_id,
                    new_owner = ?leader,
                    garrison = dest.resources,
                    "cell captured"
                );
            } else if dest.resources == 0 {
                dest.owner = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::CubeCoord;
    use crate::grid::Wraparound;

    const A: PlayerId = PlayerId(0);
    const B: PlayerId = PlayerId(1);
    const C: PlayerId = PlayerId(2);

    /// Two-ring unwrapped board with the given cells claimed.
    fn board(claims: &[(CubeCoord, PlayerId, i64)]) -> HexGrid {
        let mut grid = HexGrid::with_rings(2, Wraparound::NoWrap);
        for &(coord, player, resources) in claims {
            let id = grid.id_at(coord).unwrap();
            let cell = grid.cell_mut(id).unwrap();
            cell.owner = Some(player);
            cell.resources = resources;
        }
        grid
    }

    fn id(grid: &HexGrid, x: i32, y: i32, z: i32) -> CellId {
        grid.id_at(CubeCoord::new(x, y, z)).unwrap()
    }

    fn tx(player: PlayerId, from: CellId, to: CellId, amount: f64) -> Transaction {
        Transaction {
            player,
            from,
            to,
            amount,
        }
    }

    #[test]
    fn test_rejects_unknown_ids() {
        let grid = board(&[(CubeCoord::ORIGIN, A, 5)]);
        let origin = id(&grid, 0, 0, 0);
        let bogus = CellId(9999);

        assert_eq!(
            validate(&tx(A, bogus, origin, 1.0), &grid),
            Err(TransferError::InvalidFromId)
        );
        assert_eq!(
            validate(&tx(A, origin, bogus, 1.0), &grid),
            Err(TransferError::InvalidToId)
        );
    }

    #[test]
    fn test_rejects_self_transfer() {
        let grid = board(&[(CubeCoord::ORIGIN, A, 5)]);
        let origin = id(&grid, 0, 0, 0);
        assert_eq!(
            validate(&tx(A, origin, origin, 1.0), &grid),
            Err(TransferError::SameHexagon)
        );
    }

    #[test]
    fn test_rejects_disconnected_same_owner_transfer() {
        // Two cells of A's separated by a neutral gap.
        let grid = board(&[
            (CubeCoord::ORIGIN, A, 5),
            (CubeCoord::new(2, 0, -2), A, 5),
        ]);
        let from = id(&grid, 0, 0, 0);
        let to = id(&grid, 2, 0, -2);
        assert_eq!(
            validate(&tx(A, from, to, 1.0), &grid),
            Err(TransferError::OwnedHexagonsNotConnected)
        );
    }

    #[test]
    fn test_connected_territory_allows_distant_transfer() {
        let grid = board(&[
            (CubeCoord::ORIGIN, A, 5),
            (CubeCoord::new(1, 0, -1), A, 0),
            (CubeCoord::new(2, 0, -2), A, 0),
        ]);
        let from = id(&grid, 0, 0, 0);
        let to = id(&grid, 2, 0, -2);
        assert_eq!(validate(&tx(A, from, to, 3.0), &grid), Ok(()));
    }

    #[test]
    fn test_rejects_negative_amount() {
        let grid = board(&[(CubeCoord::ORIGIN, A, 5)]);
        let from = id(&grid, 0, 0, 0);
        let to = id(&grid, 1, 0, -1);
        assert_eq!(
            validate(&tx(A, from, to, -1.0), &grid),
            Err(TransferError::NegativeTransferAmount)
        );
    }

    #[test]
    fn test_rejects_overdraw() {
        let grid = board(&[(CubeCoord::ORIGIN, A, 5)]);
        let from = id(&grid, 0, 0, 0);
        let to = id(&grid, 1, 0, -1);
        assert_eq!(
            validate(&tx(A, from, to, 6.0), &grid),
            Err(TransferError::NotEnoughResources)
        );
        // Infinity is an overdraw, not a non-integer.
        assert_eq!(
            validate(&tx(A, from, to, f64::INFINITY), &grid),
            Err(TransferError::NotEnoughResources)
        );
    }

    #[test]
    fn test_rejects_foreign_source() {
        let grid = board(&[(CubeCoord::ORIGIN, B, 5)]);
        let from = id(&grid, 0, 0, 0);
        let to = id(&grid, 1, 0, -1);
        assert_eq!(
            validate(&tx(A, from, to, 1.0), &grid),
            Err(TransferError::UnownedFromHexagon)
        );
    }

    #[test]
    fn test_neutral_source_fails_ownership_not_connectivity() {
        // Both cells neutral: the same-owner path check passes over
        // the neutral region, and the ownership check rejects instead.
        let grid = board(&[]);
        let from = id(&grid, 0, 0, 0);
        let to = id(&grid, 1, 0, -1);
        assert_eq!(
            validate(&tx(A, from, to, 0.0), &grid),
            Err(TransferError::UnownedFromHexagon)
        );
    }

    #[test]
    fn test_rejects_distant_attack() {
        let grid = board(&[
            (CubeCoord::ORIGIN, A, 5),
            (CubeCoord::new(2, 0, -2), B, 5),
        ]);
        let from = id(&grid, 0, 0, 0);
        let to = id(&grid, 2, 0, -2);
        assert_eq!(
            validate(&tx(A, from, to, 1.0), &grid),
            Err(TransferError::UnownedToHexagonNotNeighbor)
        );
    }

    #[test]
    fn test_adjacent_attack_is_valid() {
        let grid = board(&[
            (CubeCoord::ORIGIN, A, 5),
            (CubeCoord::new(1, 0, -1), B, 5),
        ]);
        let from = id(&grid, 0, 0, 0);
        let to = id(&grid, 1, 0, -1);
        assert_eq!(validate(&tx(A, from, to, 4.0), &grid), Ok(()));
    }

    #[test]
    fn test_rejects_fractional_amount() {
        let grid = board(&[(CubeCoord::ORIGIN, A, 5)]);
        let from = id(&grid, 0, 0, 0);
        let to = id(&grid, 1, 0, -1);
        assert_eq!(
            validate(&tx(A, from, to, 2.5), &grid),
            Err(TransferError::AmountNotInteger)
        );
        assert_eq!(
            validate(&tx(A, from, to, f64::NAN), &grid),
            Err(TransferError::AmountNotInteger)
        );
    }

    #[test]
    fn test_fractional_overdraw_reports_overdraw() {
        // Whole-number check runs last, so the overdraw wins.
        let grid = board(&[(CubeCoord::ORIGIN, A, 5)]);
        let from = id(&grid, 0, 0, 0);
        let to = id(&grid, 1, 0, -1);
        assert_eq!(
            validate(&tx(A, from, to, 7.5), &grid),
            Err(TransferError::NotEnoughResources)
        );
    }

    #[test]
    fn test_zero_amount_transfer_is_valid() {
        let grid = board(&[
            (CubeCoord::ORIGIN, A, 5),
            (CubeCoord::new(1, 0, -1), B, 5),
        ]);
        let from = id(&grid, 0, 0, 0);
        let to = id(&grid, 1, 0, -1);
        assert_eq!(validate(&tx(A, from, to, 0.0), &grid), Ok(()));
    }

    #[test]
    fn test_exact_tie_leaves_destination_neutral() {
        let mut grid = board(&[
            (CubeCoord::new(1, 0, -1), A, 5),
            (CubeCoord::new(0, 1, -1), B, 5),
            (CubeCoord::new(1, -1, 0), C, 3),
        ]);
        let dest = id(&grid, 0, 0, 0);
        let batch = [
            tx(A, id(&grid, 1, 0, -1), dest, 5.0),
            tx(B, id(&grid, 0, 1, -1), dest, 5.0),
            tx(C, id(&grid, 1, -1, 0), dest, 3.0),
        ];

        resolve_all(&batch, &mut grid);

        let cell = grid.cell(dest).unwrap();
        assert_eq!(cell.owner, None);
        assert_eq!(cell.resources, 0);
    }

    #[test]
    fn test_capture_flips_ownership_with_remainder() {
        let mut grid = board(&[
            (CubeCoord::ORIGIN, A, 5),
            (CubeCoord::new(1, 0, -1), B, 8),
        ]);
        let dest = id(&grid, 0, 0, 0);
        let batch = [tx(B, id(&grid, 1, 0, -1), dest, 8.0)];

        resolve_all(&batch, &mut grid);

        let cell = grid.cell(dest).unwrap();
        assert_eq!(cell.owner, Some(B));
        assert_eq!(cell.resources, 3);
        assert_eq!(grid.cell_at(CubeCoord::new(1, 0, -1)).unwrap().resources, 0);
    }

    #[test]
    fn test_reinforcement_adds_net() {
        let mut grid = board(&[
            (CubeCoord::ORIGIN, A, 5),
            (CubeCoord::new(1, 0, -1), A, 4),
        ]);
        let dest = id(&grid, 0, 0, 0);
        let batch = [tx(A, id(&grid, 1, 0, -1), dest, 4.0)];

        resolve_all(&batch, &mut grid);

        let cell = grid.cell(dest).unwrap();
        assert_eq!(cell.owner, Some(A));
        assert_eq!(cell.resources, 9);
    }

    #[test]
    fn test_exact_cancellation_neutralizes_owned_cell() {
        let mut grid = board(&[
            (CubeCoord::ORIGIN, A, 5),
            (CubeCoord::new(1, 0, -1), B, 5),
        ]);
        let dest = id(&grid, 0, 0, 0);
        let batch = [tx(B, id(&grid, 1, 0, -1), dest, 5.0)];

        resolve_all(&batch, &mut grid);

        let cell = grid.cell(dest).unwrap();
        assert_eq!(cell.owner, None);
        assert_eq!(cell.resources, 0);
    }

    #[test]
    fn test_partial_attack_reduces_garrison() {
        let mut grid = board(&[
            (CubeCoord::ORIGIN, A, 5),
            (CubeCoord::new(1, 0, -1), B, 3),
        ]);
        let dest = id(&grid, 0, 0, 0);
        let batch = [tx(B, id(&grid, 1, 0, -1), dest, 3.0)];

        resolve_all(&batch, &mut grid);

        let cell = grid.cell(dest).unwrap();
        assert_eq!(cell.owner, Some(A));
        assert_eq!(cell.resources, 2);
    }

    #[test]
    fn test_sources_debit_cumulatively() {
        // One cell sourcing two transfers pays both.
        let grid_claims = [
            (CubeCoord::ORIGIN, A, 10),
            (CubeCoord::new(1, 0, -1), B, 0),
            (CubeCoord::new(0, 1, -1), B, 0),
        ];
        let mut grid = board(&grid_claims);
        let source = id(&grid, 0, 0, 0);
        let batch = [
            tx(A, source, id(&grid, 1, 0, -1), 4.0),
            tx(A, source, id(&grid, 0, 1, -1), 6.0),
        ];

        resolve_all(&batch, &mut grid);

        assert_eq!(grid.cell(source).unwrap().resources, 0);
    }

    #[test]
    fn test_same_player_contributions_sum() {
        // A converges 3 + 4 on one destination; the pot holds 7.
        let mut grid = board(&[
            (CubeCoord::new(1, 0, -1), A, 3),
            (CubeCoord::new(0, 1, -1), A, 4),
            (CubeCoord::ORIGIN, B, 6),
        ]);
        let dest = id(&grid, 0, 0, 0);
        let batch = [
            tx(A, id(&grid, 1, 0, -1), dest, 3.0),
            tx(A, id(&grid, 0, 1, -1), dest, 4.0),
        ];

        resolve_all(&batch, &mut grid);

        let cell = grid.cell(dest).unwrap();
        assert_eq!(cell.owner, Some(A));
        assert_eq!(cell.resources, 1);
    }

    #[test]
    fn test_tie_displacement_updates_runner_up() {
        // C matches B's 5 and displaces them, so the runner-up is 5,
        // not A's 3, and the cell survives untouched.
        let mut grid = board(&[
            (CubeCoord::new(1, 0, -1), A, 3),
            (CubeCoord::new(0, 1, -1), B, 5),
            (CubeCoord::new(1, -1, 0), C, 5),
        ]);
        let dest = id(&grid, 0, 0, 0);
        let batch = [
            tx(A, id(&grid, 1, 0, -1), dest, 3.0),
            tx(B, id(&grid, 0, 1, -1), dest, 5.0),
            tx(C, id(&grid, 1, -1, 0), dest, 5.0),
        ];

        resolve_all(&batch, &mut grid);

        let cell = grid.cell(dest).unwrap();
        assert_eq!(cell.owner, None);
        assert_eq!(cell.resources, 0);
    }

    #[test]
    fn test_untouched_destinations_keep_state() {
        let mut grid = board(&[
            (CubeCoord::ORIGIN, A, 5),
            (CubeCoord::new(0, -1, 1), B, 7),
        ]);
        let bystander = id(&grid, 0, -1, 1);
        let batch = [tx(A, id(&grid, 0, 0, 0), id(&grid, 1, 0, -1), 2.0)];

        resolve_all(&batch, &mut grid);

        let cell = grid.cell(bystander).unwrap();
        assert_eq!(cell.owner, Some(B));
        assert_eq!(cell.resources, 7);
    }

    #[test]
    fn test_source_and_destination_same_round() {
        // The middle cell is debited before its own pot settles.
        let mut grid = board(&[
            (CubeCoord::ORIGIN, A, 5),
            (CubeCoord::new(1, 0, -1), A, 4),
            (CubeCoord::new(2, 0, -2), B, 0),
        ]);
        let middle = id(&grid, 1, 0, -1);
        let batch = [
            tx(A, middle, id(&grid, 2, 0, -2), 4.0),
            tx(A, id(&grid, 0, 0, 0), middle, 3.0),
        ];

        resolve_all(&batch, &mut grid);

        // middle: 4 - 4 (debit) + 3 (reinforcement) = 3
        assert_eq!(grid.cell(middle).unwrap().resources, 3);
    }
}
