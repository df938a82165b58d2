//! One tick's view of the game.
//!
//! `Board` bundles the decoded grid with the per-tick facts every decision
//! component needs: which tiles are cities, where the visible generals are,
//! who we are, and how far into the game we are. It is rebuilt from scratch
//! for every snapshot and never mutated afterwards.

use super::grid::Grid;
use super::terrain::Terrain;

/// Immutable per-tick game view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub grid: Grid,
    /// Our player index.
    pub player: usize,
    /// Raw server turn counter (two turns per game tick).
    pub turn: u32,
    /// Tiles known to be cities.
    pub cities: Vec<usize>,
    /// Visible generals by player index.
    pub generals: Vec<Option<usize>>,
    /// Our own general, fixed at game start.
    pub general: Option<usize>,
}

impl Board {
    pub fn new(grid: Grid, player: usize, turn: u32) -> Self {
        Board {
            grid,
            player,
            turn,
            cities: Vec::new(),
            generals: Vec::new(),
            general: None,
        }
    }

    /// Sets the city list.
    pub fn with_cities(mut self, cities: Vec<usize>) -> Self {
        self.cities = cities;
        self
    }

    /// Sets the visible generals and, if unset, our own general.
    pub fn with_generals(mut self, generals: Vec<Option<usize>>) -> Self {
        if self.general.is_none() {
            self.general = generals.get(self.player).copied().flatten();
        }
        self.generals = generals;
        self
    }

    /// Game tick: the server sends two turns per tick, rounding up.
    pub fn game_tick(&self) -> u32 {
        self.turn.div_ceil(2)
    }

    pub fn armies_at(&self, tile: usize) -> i32 {
        self.grid.armies_at(tile)
    }

    pub fn terrain_at(&self, tile: usize) -> Terrain {
        self.grid.terrain_at(tile)
    }

    pub fn is_owned(&self, tile: usize) -> bool {
        self.terrain_at(tile) == Terrain::Player(self.player)
    }

    pub fn is_enemy(&self, tile: usize) -> bool {
        self.terrain_at(tile).is_enemy_of(self.player)
    }

    pub fn is_empty(&self, tile: usize) -> bool {
        self.terrain_at(tile) == Terrain::Empty
    }

    pub fn is_city(&self, tile: usize) -> bool {
        self.cities.contains(&tile)
    }

    /// True if the tile is our own general.
    pub fn is_own_general(&self, tile: usize) -> bool {
        self.general == Some(tile)
    }

    /// True if any visible general stands on the tile.
    pub fn is_general(&self, tile: usize) -> bool {
        self.generals.iter().any(|g| *g == Some(tile))
    }

    /// The player whose general stands on the tile, if visible.
    pub fn general_owner(&self, tile: usize) -> Option<usize> {
        self.generals.iter().position(|g| *g == Some(tile))
    }

    /// Visible enemy generals as `(player, tile)` pairs.
    pub fn enemy_generals(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.generals
            .iter()
            .enumerate()
            .filter(move |(p, _)| *p != self.player)
            .filter_map(|(p, g)| g.map(|t| (p, t)))
    }
}
