//! Bounded depth-first path search.
//!
//! Enumerates simple paths from a start tile to a finish tile with an
//! explicit stack. The length limit shrinks to the length of every shorter
//! path found, so later branches can never run longer than the best route
//! so far. A Manhattan lower bound prunes branches that cannot finish
//! within the limit, and a node budget caps the work per query.
//!
//! Among the collected paths, attacks on enemy tiles keep only paths that
//! arrive with enough armies, and the shortest survivor wins. When no path
//! is sufficient, the shortest raw path is used instead.

use tracing::debug;

use crate::board::{Board, Terrain, ALL_DIRECTIONS};
use crate::config::EngineConfig;

/// Outcome of one path query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathSearch {
    /// Chosen route, excluding the start tile and ending on the finish.
    /// Empty if no route exists or `start == finish`.
    pub path: Vec<usize>,
    /// Complete paths collected.
    pub candidates: usize,
    /// Paths that passed the army-sufficiency bar (equal to `candidates`
    /// when the finish is not enemy-held).
    pub sufficient: usize,
    /// Tiles expanded.
    pub nodes: usize,
    /// True if the node budget stopped the search early.
    pub truncated: bool,
}

struct Frame {
    tile: usize,
    next_dir: usize,
}

/// Finds a path using the configured depth limit and node budget.
pub fn find_path(board: &Board, start: usize, finish: usize, config: &EngineConfig) -> Vec<usize> {
    search_path(
        board,
        start,
        finish,
        config.path_length_limit,
        config.search_node_budget,
    )
    .path
}

/// Runs the bounded search and reports statistics alongside the path.
pub fn search_path(
    board: &Board,
    start: usize,
    finish: usize,
    max_depth: usize,
    node_budget: usize,
) -> PathSearch {
    let grid = &board.grid;
    let mut result = PathSearch::default();
    if start == finish || !grid.in_bounds(start) || !grid.in_bounds(finish) {
        return result;
    }

    let mut limit = max_depth;
    let mut found: Vec<Vec<usize>> = Vec::new();
    let mut on_path = vec![false; grid.size()];
    let mut path: Vec<usize> = Vec::new();
    let mut stack = vec![Frame {
        tile: start,
        next_dir: 0,
    }];
    on_path[start] = true;

    while let Some(top) = stack.last_mut() {
        if top.next_dir >= ALL_DIRECTIONS.len() {
            on_path[top.tile] = false;
            stack.pop();
            path.pop();
            continue;
        }
        let dir = ALL_DIRECTIONS[top.next_dir];
        top.next_dir += 1;
        let tile = top.tile;

        let Some(next) = grid.neighbor(tile, dir) else {
            continue;
        };
        if on_path[next] || board.terrain_at(next) == Terrain::Mountain {
            continue;
        }

        let steps = path.len() + 1;
        if next == finish {
            if steps <= limit {
                let mut complete = path.clone();
                complete.push(next);
                found.push(complete);
                limit = steps;
            }
            continue;
        }

        if is_obstacle(board, next) || steps + grid.manhattan(next, finish) > limit {
            continue;
        }

        result.nodes += 1;
        if result.nodes > node_budget {
            result.truncated = true;
            break;
        }
        on_path[next] = true;
        path.push(next);
        stack.push(Frame {
            tile: next,
            next_dir: 0,
        });
    }

    result.candidates = found.len();
    let chosen = if board.is_enemy(finish) {
        let bar = |p: &Vec<usize>| {
            let mut needed = board.armies_at(finish);
            if board.is_general(finish) {
                needed += p.len() as i32;
            }
            needed
        };
        let sufficient: Vec<&Vec<usize>> = found
            .iter()
            .filter(|p| army_delta(board, start, p) > bar(p))
            .collect();
        result.sufficient = sufficient.len();
        if sufficient.is_empty() {
            shortest(found.iter())
        } else {
            shortest(sufficient.into_iter())
        }
    } else {
        result.sufficient = found.len();
        shortest(found.iter())
    };
    result.path = chosen.cloned().unwrap_or_default();

    debug!(
        start,
        finish,
        candidates = result.candidates,
        sufficient = result.sufficient,
        nodes = result.nodes,
        truncated = result.truncated,
        path = ?result.path,
        "path search"
    );
    result
}

/// Tiles a route may not pass through unless they are its finish: unseen
/// obstacles and neutral cities.
fn is_obstacle(board: &Board, tile: usize) -> bool {
    match board.terrain_at(tile) {
        Terrain::FogObstacle => true,
        Terrain::Player(_) => false,
        _ => board.is_city(tile),
    }
}

/// Armies the mover can expect to bring to the finish: our armies picked up
/// along the way minus enemy armies fought through. The finish itself is
/// not counted.
pub fn army_delta(board: &Board, start: usize, path: &[usize]) -> i32 {
    let en_route = path.len().saturating_sub(1);
    std::iter::once(start)
        .chain(path[..en_route].iter().copied())
        .map(|t| {
            if board.is_owned(t) {
                board.armies_at(t)
            } else if board.is_enemy(t) {
                -board.armies_at(t)
            } else {
                0
            }
        })
        .sum()
}

/// Fewest tiles; ties go to the first found.
fn shortest<'a>(paths: impl Iterator<Item = &'a Vec<usize>>) -> Option<&'a Vec<usize>> {
    paths.min_by_key(|p| p.len())
}
