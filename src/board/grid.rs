//! Absolute per-tick grid and coordinate math.
//!
//! The server map array is laid out as `[width, height, armies.., terrain..]`
//! with `width * height` entries in each of the two sections. Tiles are
//! addressed by `y * width + x`. The grid is 4-connected and does not wrap:
//! stepping left from column 0 or right from the last column leaves the map,
//! even though naive index arithmetic would land on the neighbouring row.

use super::terrain::Terrain;

/// Errors raised when a map array cannot be sliced into a grid.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GridError {
    #[error("map array too short for its header: {0} elements")]
    MissingHeader(usize),

    #[error("invalid map dimensions {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("map array truncated: expected {expected} elements, got {actual}")]
    Truncated { expected: usize, actual: usize },
}

/// A 4-connected step direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

/// Neighbour order used throughout the engine. Search enumeration and
/// tie-breaks depend on it.
pub const ALL_DIRECTIONS: [Direction; 4] =
    [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

/// One tick's decoded terrain and army arrays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    pub armies: Vec<i32>,
    pub terrain: Vec<Terrain>,
}

impl Grid {
    /// Builds a grid from explicit arrays. Both arrays must hold
    /// `width * height` entries.
    pub fn new(width: usize, height: usize, armies: Vec<i32>, terrain: Vec<Terrain>) -> Self {
        debug_assert_eq!(armies.len(), width * height);
        debug_assert_eq!(terrain.len(), width * height);
        Grid {
            width,
            height,
            armies,
            terrain,
        }
    }

    /// Slices a patched server map array into a grid.
    pub fn from_map(map: &[i32]) -> Result<Grid, GridError> {
        if map.len() < 2 {
            return Err(GridError::MissingHeader(map.len()));
        }
        let (w, h) = (map[0], map[1]);
        if w <= 0 || h <= 0 {
            return Err(GridError::InvalidDimensions { width: w, height: h });
        }
        let (width, height) = (w as usize, h as usize);
        let size = width * height;
        let expected = 2 + 2 * size;
        if map.len() < expected {
            return Err(GridError::Truncated {
                expected,
                actual: map.len(),
            });
        }

        let armies = map[2..2 + size].to_vec();
        let terrain = map[2 + size..2 + 2 * size]
            .iter()
            .map(|&c| Terrain::from_code(c))
            .collect();
        Ok(Grid::new(width, height, armies, terrain))
    }

    /// Encodes the grid back into the server map layout.
    pub fn to_map(&self) -> Vec<i32> {
        let mut map = Vec::with_capacity(2 + 2 * self.size());
        map.push(self.width as i32);
        map.push(self.height as i32);
        map.extend_from_slice(&self.armies);
        map.extend(self.terrain.iter().map(|t| t.code()));
        map
    }

    /// Number of tiles.
    pub fn size(&self) -> usize {
        self.width * self.height
    }

    pub fn in_bounds(&self, tile: usize) -> bool {
        tile < self.size()
    }

    /// Returns `(x, y)` for a tile index.
    pub fn coords(&self, tile: usize) -> (usize, usize) {
        (tile % self.width, tile / self.width)
    }

    /// Returns the tile index at `(x, y)`.
    pub fn tile_at(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    pub fn armies_at(&self, tile: usize) -> i32 {
        self.armies.get(tile).copied().unwrap_or(0)
    }

    /// Terrain at a tile; out-of-range tiles read as mountains.
    pub fn terrain_at(&self, tile: usize) -> Terrain {
        self.terrain.get(tile).copied().unwrap_or(Terrain::Mountain)
    }

    /// Raw index arithmetic for a step. May be negative or past the end, and
    /// wraps across rows for left/right steps; callers must validate.
    pub fn raw_step(&self, tile: usize, dir: Direction) -> isize {
        let t = tile as isize;
        let w = self.width as isize;
        match dir {
            Direction::Up => t - w,
            Direction::Right => t + 1,
            Direction::Down => t + w,
            Direction::Left => t - 1,
        }
    }

    /// True if `from -> to` is a left/right index step that would wrap across
    /// a grid edge onto another row. On a one-column grid, `±1` steps are
    /// vertical and never wrap.
    pub fn crosses_row_edge(&self, from: usize, to: usize) -> bool {
        if self.width < 2 || from.abs_diff(to) != 1 {
            return false;
        }
        from / self.width != to / self.width
    }

    /// The validated neighbour in a direction, or `None` when the step leaves
    /// the grid or would wrap across a row edge.
    pub fn neighbor(&self, tile: usize, dir: Direction) -> Option<usize> {
        if !self.in_bounds(tile) {
            return None;
        }
        let (x, y) = self.coords(tile);
        let ok = match dir {
            Direction::Up => y > 0,
            Direction::Right => x + 1 < self.width,
            Direction::Down => y + 1 < self.height,
            Direction::Left => x > 0,
        };
        if !ok {
            return None;
        }
        let next = self.raw_step(tile, dir) as usize;
        Some(next)
    }

    /// Valid neighbours in up, right, down, left order.
    pub fn neighbors(&self, tile: usize) -> impl Iterator<Item = usize> + '_ {
        ALL_DIRECTIONS
            .iter()
            .filter_map(move |&d| self.neighbor(tile, d))
    }

    /// True if `a` and `b` are 4-adjacent without wrapping.
    pub fn is_adjacent(&self, a: usize, b: usize) -> bool {
        self.neighbors(a).any(|n| n == b)
    }

    /// Euclidean distance between two tiles.
    pub fn distance(&self, a: usize, b: usize) -> f64 {
        let (ax, ay) = self.coords(a);
        let (bx, by) = self.coords(b);
        let dx = ax as f64 - bx as f64;
        let dy = ay as f64 - by as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// Manhattan distance between two tiles, a lower bound on path length.
    pub fn manhattan(&self, a: usize, b: usize) -> usize {
        let (ax, ay) = self.coords(a);
        let (bx, by) = self.coords(b);
        ax.abs_diff(bx) + ay.abs_diff(by)
    }

    /// The tile nearest the geometric centre of the grid.
    pub fn center(&self) -> usize {
        self.tile_at(self.width / 2, self.height / 2)
    }
}
