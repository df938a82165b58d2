//! Terrain codes.
//!
//! The server encodes every tile's terrain as a signed integer: any
//! non-negative value is the index of the owning player, negative values are
//! the fixed categories below.

/// Server code for an unowned, visible, passable tile.
pub const TILE_EMPTY: i32 = -1;
/// Server code for a visible mountain.
pub const TILE_MOUNTAIN: i32 = -2;
/// Server code for a passable tile outside vision.
pub const TILE_FOG: i32 = -3;
/// Server code for a city or mountain outside vision.
pub const TILE_FOG_OBSTACLE: i32 = -4;

/// Decoded terrain of a single tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terrain {
    /// Owned by the player with this index.
    Player(usize),
    Empty,
    Mountain,
    Fog,
    FogObstacle,
}

impl Terrain {
    /// Decodes a server terrain code. Unknown negative codes are treated as
    /// fog obstacles so they are never walked into.
    pub fn from_code(code: i32) -> Terrain {
        match code {
            c if c >= 0 => Terrain::Player(c as usize),
            TILE_EMPTY => Terrain::Empty,
            TILE_MOUNTAIN => Terrain::Mountain,
            TILE_FOG => Terrain::Fog,
            _ => Terrain::FogObstacle,
        }
    }

    /// Returns the server code for this terrain.
    pub const fn code(self) -> i32 {
        match self {
            Terrain::Player(p) => p as i32,
            Terrain::Empty => TILE_EMPTY,
            Terrain::Mountain => TILE_MOUNTAIN,
            Terrain::Fog => TILE_FOG,
            Terrain::FogObstacle => TILE_FOG_OBSTACLE,
        }
    }

    /// Returns the owning player, if any.
    pub const fn owner(self) -> Option<usize> {
        match self {
            Terrain::Player(p) => Some(p),
            _ => None,
        }
    }

    /// True for tiles no army can ever enter.
    pub const fn is_mountain(self) -> bool {
        matches!(self, Terrain::Mountain)
    }

    /// True for tiles held by a player other than `me`.
    pub fn is_enemy_of(self, me: usize) -> bool {
        matches!(self, Terrain::Player(p) if p != me)
    }
}
