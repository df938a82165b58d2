//! Source and target tile pickers over the current intel.
//!
//! Ties always go to the lowest tile index, since every set in
//! `TerritoryIntel` is sorted.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::board::Board;
use crate::intel::TerritoryIntel;

/// The owned tile with the most armies that can move. Our general is only
/// considered when `include_general` is set.
pub fn best_source(board: &Board, intel: &TerritoryIntel, include_general: bool) -> Option<usize> {
    let mut best: Option<(usize, i32)> = None;
    for &tile in &intel.usable {
        if !include_general && board.is_own_general(tile) {
            continue;
        }
        let armies = board.armies_at(tile);
        if best.map_or(true, |(_, most)| armies > most) {
            best = Some((tile, armies));
        }
    }
    best.map(|(tile, _)| tile)
}

/// Frontline tiles that can attack, strongest first. Equal armies keep
/// tile order.
pub fn sorted_frontline(board: &Board, intel: &TerritoryIntel) -> Vec<usize> {
    let mut tiles: Vec<usize> = intel
        .frontline
        .iter()
        .copied()
        .filter(|&t| board.armies_at(t) >= 2)
        .collect();
    tiles.sort_by_key(|&t| std::cmp::Reverse(board.armies_at(t)));
    tiles
}

/// Perimeter tiles that can move, strongest first. Our general is only
/// included when `include_general` is set.
pub fn sorted_perimeter(
    board: &Board,
    intel: &TerritoryIntel,
    include_general: bool,
) -> Vec<usize> {
    let mut tiles: Vec<usize> = intel
        .perimeter
        .iter()
        .copied()
        .filter(|&t| include_general || !board.is_own_general(t))
        .filter(|&t| board.armies_at(t) >= 2)
        .collect();
    tiles.sort_by_key(|&t| std::cmp::Reverse(board.armies_at(t)));
    tiles
}

/// Any owned tile that can move, chosen uniformly.
pub fn random_usable(intel: &TerritoryIntel, rng: &mut impl Rng) -> Option<usize> {
    intel.usable.choose(rng).copied()
}

/// The tile in `tiles` nearest to `from` (Euclidean).
pub fn closest(board: &Board, from: usize, tiles: &[usize]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for &tile in tiles {
        let d = board.grid.distance(from, tile);
        if best.map_or(true, |(_, bd)| d < bd) {
            best = Some((tile, d));
        }
    }
    best.map(|(tile, _)| tile)
}

/// The tile in `tiles` farthest from `from` (Euclidean).
pub fn farthest(board: &Board, from: usize, tiles: &[usize]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for &tile in tiles {
        let d = board.grid.distance(from, tile);
        if best.map_or(true, |(_, bd)| d > bd) {
            best = Some((tile, d));
        }
    }
    best.map(|(tile, _)| tile)
}

pub fn closest_perimeter(board: &Board, intel: &TerritoryIntel, from: usize) -> Option<usize> {
    closest(board, from, &intel.perimeter)
}

pub fn farthest_perimeter(board: &Board, intel: &TerritoryIntel, from: usize) -> Option<usize> {
    farthest(board, from, &intel.perimeter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Grid, Terrain};
    use crate::config::EngineConfig;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const ME: Terrain = Terrain::Player(0);
    const FOE: Terrain = Terrain::Player(1);
    const E: Terrain = Terrain::Empty;

    /// 4x2:
    /// ```text
    ///  ME(9,general) ME(4) ME(4) FOE(1)
    ///  ME(1)         ME(6) E     E
    /// ```
    fn setup() -> (Board, TerritoryIntel) {
        let terrain = vec![ME, ME, ME, FOE, ME, ME, E, E];
        let armies = vec![9, 4, 4, 1, 1, 6, 0, 0];
        let board = Board::new(Grid::new(4, 2, armies, terrain), 0, 10)
            .with_generals(vec![Some(0), None]);
        let intel = TerritoryIntel::derive(&board, &EngineConfig::default());
        (board, intel)
    }

    #[test]
    fn best_source_respects_general_flag() {
        let (b, intel) = setup();
        assert_eq!(best_source(&b, &intel, true), Some(0));
        assert_eq!(best_source(&b, &intel, false), Some(5));
    }

    #[test]
    fn frontline_and_perimeter_pickers() {
        let (b, intel) = setup();
        assert_eq!(intel.frontline, vec![2]);
        assert_eq!(sorted_perimeter(&b, &intel, true), vec![5, 2]);
        assert_eq!(sorted_frontline(&b, &intel), vec![2]);
    }

    #[test]
    fn sorted_frontline_is_strongest_first() {
        let terrain = vec![ME, FOE, ME, ME, FOE, ME];
        let armies = vec![3, 1, 7, 2, 1, 1];
        let b = Board::new(Grid::new(3, 2, armies, terrain), 0, 4);
        let intel = TerritoryIntel::derive(&b, &EngineConfig::default());
        assert_eq!(sorted_frontline(&b, &intel), vec![2, 0, 3]);
    }

    #[test]
    fn distance_pickers_break_ties_by_order() {
        let (b, _) = setup();
        assert_eq!(closest(&b, 0, &[2, 4, 5]), Some(4));
        assert_eq!(farthest(&b, 0, &[1, 2, 6]), Some(6));
        assert_eq!(closest(&b, 5, &[1, 4, 6]), Some(1));
        assert_eq!(closest(&b, 0, &[]), None);
    }

    #[test]
    fn random_usable_draws_from_usable() {
        let (_, intel) = setup();
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..20 {
            let t = random_usable(&intel, &mut rng).unwrap();
            assert!(intel.usable.contains(&t));
        }
        assert_eq!(random_usable(&TerritoryIntel::default(), &mut rng), None);
    }
}
