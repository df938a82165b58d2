//! Single-step destination choice.
//!
//! Picks where a mover should step using a fixed priority of tiers: a weak
//! enemy tile, then an empty tile, then one of our own tiles. Cities are
//! never chosen here; taking one is left to a deliberate objective.

use crate::board::Board;
use crate::intel::TerritoryIntel;

use super::sources::closest_perimeter;

/// Which priority tier produced a destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Enemy tile the mover outnumbers by at least two.
    LowEnemy,
    Empty,
    Owned,
}

/// True if `tile` is an enemy tile that `mover` can take with armies to spare.
pub fn is_low_enemy(board: &Board, tile: usize, mover: usize) -> bool {
    board.is_enemy(tile) && board.armies_at(tile) <= board.armies_at(mover) - 2
}

/// The weakest adjacent enemy tile `from` can take, skipping cities.
pub fn weakest_enemy(board: &Board, from: usize) -> Option<usize> {
    candidates(board, from)
        .filter(|&t| is_low_enemy(board, t, from))
        .min_by_key(|&t| board.armies_at(t))
}

/// Runs the tier chain for a mover. `last_from` is the source of the
/// previous move, which an owned-tile step never returns to.
pub fn choose_destination(
    board: &Board,
    intel: &TerritoryIntel,
    from: usize,
    last_from: Option<usize>,
) -> Option<(usize, Tier)> {
    if let Some(to) = weakest_enemy(board, from) {
        return Some((to, Tier::LowEnemy));
    }

    let center = board.grid.center();
    let empty = candidates(board, from)
        .filter(|&t| board.is_empty(t))
        .map(|t| (t, board.grid.distance(t, center)))
        .reduce(|best, next| if next.1 < best.1 { next } else { best });
    if let Some((to, _)) = empty {
        return Some((to, Tier::Empty));
    }

    let owned: Vec<usize> = candidates(board, from)
        .filter(|&t| board.is_owned(t) && Some(t) != last_from)
        .collect();
    let to = match closest_perimeter(board, intel, from) {
        Some(anchor) => owned
            .iter()
            .copied()
            .map(|t| (t, board.grid.distance(t, anchor)))
            .reduce(|best, next| if next.1 < best.1 { next } else { best })
            .map(|(t, _)| t),
        None => owned.first().copied(),
    }?;
    Some((to, Tier::Owned))
}

/// Neighbours of `from` the heuristic may step into: anything but cities.
fn candidates<'a>(board: &'a Board, from: usize) -> impl Iterator<Item = usize> + 'a {
    board.grid.neighbors(from).filter(move |&t| !board.is_city(t))
}
