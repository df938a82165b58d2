//! Per-tick territorial intelligence.
//!
//! Derived wholesale from a `Board` on every tick. Nothing here is patched
//! incrementally: given the same board, `derive` always yields the same
//! value, which keeps "given this grid, intel must equal X" testable.

use crate::board::{Board, Terrain};
use crate::config::EngineConfig;

/// Snapshot of visible progress: owned tiles plus the army counts on those
/// of them that do not grow on their own (generals and cities excluded).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Checksum {
    pub owned: Vec<usize>,
    pub armies: Vec<i32>,
}

/// Ownership sets derived from one tick's board. All sets are sorted by
/// tile index.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TerritoryIntel {
    /// Tiles we hold.
    pub owned: Vec<usize>,
    /// Tiles held by any other player.
    pub enemies: Vec<usize>,
    /// Owned tiles with at least two armies (can initiate a move).
    pub usable: Vec<usize>,
    /// Owned tiles 4-adjacent to an enemy tile.
    pub frontline: Vec<usize>,
    /// Owned tiles 4-adjacent to a tile worth expanding into.
    pub perimeter: Vec<usize>,
    pub checksum: Checksum,
}

impl TerritoryIntel {
    /// Derives all sets from the board.
    pub fn derive(board: &Board, config: &EngineConfig) -> Self {
        let grid = &board.grid;
        let me = board.player;

        let mut owned = Vec::new();
        let mut enemies = Vec::new();
        for (tile, terrain) in grid.terrain.iter().enumerate() {
            match *terrain {
                Terrain::Player(p) if p == me => owned.push(tile),
                Terrain::Player(_) => enemies.push(tile),
                _ => {}
            }
        }

        let usable = owned
            .iter()
            .copied()
            .filter(|&t| grid.armies_at(t) >= 2)
            .collect();

        let frontline = owned
            .iter()
            .copied()
            .filter(|&t| grid.neighbors(t).any(|n| board.is_enemy(n)))
            .collect();

        let perimeter = owned
            .iter()
            .copied()
            .filter(|&t| grid.neighbors(t).any(|n| is_venture_tile(board, config, n)))
            .collect();

        let armies = owned
            .iter()
            .copied()
            .filter(|&t| !board.is_own_general(t) && !board.is_city(t))
            .map(|t| grid.armies_at(t))
            .collect();

        let checksum = Checksum {
            owned: owned.clone(),
            armies,
        };

        TerritoryIntel {
            owned,
            enemies,
            usable,
            frontline,
            perimeter,
            checksum,
        }
    }

    pub fn is_frontline(&self, tile: usize) -> bool {
        self.frontline.binary_search(&tile).is_ok()
    }

    pub fn is_perimeter(&self, tile: usize) -> bool {
        self.perimeter.binary_search(&tile).is_ok()
    }

    pub fn is_usable(&self, tile: usize) -> bool {
        self.usable.binary_search(&tile).is_ok()
    }
}

/// A tile our territory can grow into: not ours, not a mountain or unseen
/// obstacle, and not a city until city attacks are allowed.
pub fn is_venture_tile(board: &Board, config: &EngineConfig, tile: usize) -> bool {
    let terrain = board.terrain_at(tile);
    terrain != Terrain::Player(board.player)
        && terrain != Terrain::Mountain
        && terrain != Terrain::FogObstacle
        && (!board.is_city(tile) || board.game_tick() >= config.attack_cities_min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Grid;

    const ME: Terrain = Terrain::Player(0);
    const FOE: Terrain = Terrain::Player(1);
    const E: Terrain = Terrain::Empty;
    const M: Terrain = Terrain::Mountain;

    /// 4x3 board:
    /// ```text
    ///  ME(5)  ME(1)  E      E
    ///  ME(3)  ME(2)  FOE(2) M
    ///  M      M      M      M
    /// ```
    fn board() -> Board {
        let terrain = vec![ME, ME, E, E, ME, ME, FOE, M, M, M, M, M];
        let armies = vec![5, 1, 0, 0, 3, 2, 2, 0, 0, 0, 0, 0];
        Board::new(Grid::new(4, 3, armies, terrain), 0, 10).with_generals(vec![Some(0), None])
    }

    #[test]
    fn ownership_sets() {
        let intel = TerritoryIntel::derive(&board(), &EngineConfig::default());
        assert_eq!(intel.owned, vec![0, 1, 4, 5]);
        assert_eq!(intel.enemies, vec![6]);
        assert_eq!(intel.usable, vec![0, 4, 5]);
    }

    #[test]
    fn frontline_is_owned_and_touches_enemy() {
        let intel = TerritoryIntel::derive(&board(), &EngineConfig::default());
        assert_eq!(intel.frontline, vec![5]);
        assert!(intel.frontline.iter().all(|t| intel.owned.contains(t)));
    }

    #[test]
    fn perimeter_ignores_mountains_and_own_tiles() {
        let intel = TerritoryIntel::derive(&board(), &EngineConfig::default());
        // 1 touches empty 2, 5 touches enemy 6; 0 and 4 only touch own tiles
        // or mountains.
        assert_eq!(intel.perimeter, vec![1, 5]);
    }

    #[test]
    fn frontline_does_not_wrap_rows() {
        // Enemy at the end of row 0 must not make the start of row 1 a
        // frontline tile.
        let terrain = vec![E, E, FOE, ME, E, E];
        let armies = vec![0, 0, 1, 4, 0, 0];
        let b = Board::new(Grid::new(3, 2, armies, terrain), 0, 2);
        let intel = TerritoryIntel::derive(&b, &EngineConfig::default());
        assert!(intel.frontline.is_empty());
        assert_eq!(intel.perimeter, vec![3]);
    }

    #[test]
    fn cities_are_not_venture_tiles_early() {
        let terrain = vec![ME, E];
        let b = Board::new(Grid::new(2, 1, vec![3, 40], terrain), 0, 10).with_cities(vec![1]);
        let config = EngineConfig::default();
        let intel = TerritoryIntel::derive(&b, &config);
        assert!(intel.perimeter.is_empty());

        let mut late = b.clone();
        late.turn = 2 * config.attack_cities_min;
        let intel = TerritoryIntel::derive(&late, &config);
        assert_eq!(intel.perimeter, vec![0]);
    }

    #[test]
    fn checksum_skips_general_and_cities() {
        let b = board().with_cities(vec![4]);
        let intel = TerritoryIntel::derive(&b, &EngineConfig::default());
        assert_eq!(intel.checksum.owned, vec![0, 1, 4, 5]);
        assert_eq!(intel.checksum.armies, vec![1, 2]);
    }
}
