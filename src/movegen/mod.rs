//! Heuristic move selection.
//!
//! Used whenever no objective produced a move this tick. Considers the
//! frontline first, then the expansion perimeter, then the strongest tile
//! anywhere, and either returns a single step or an expansion objective for
//! the caller to queue. A tier that cannot act falls through to the next.

pub mod destination;
pub mod sources;

use rand::Rng;
use tracing::debug;

use crate::board::Board;
use crate::config::EngineConfig;
use crate::intel::TerritoryIntel;
use crate::objective::{Objective, ObjectiveKind};
use crate::search::find_path;

pub use destination::{choose_destination, is_low_enemy, weakest_enemy, Tier};
pub use sources::{
    best_source, closest, closest_perimeter, farthest, farthest_perimeter, random_usable,
    sorted_frontline, sorted_perimeter,
};

/// Game tick after which perimeter expansion reaches away from the general
/// instead of growing next to the best source.
const EXPAND_OUTWARD_AFTER: u32 = 50;

/// Everything the selector reads for one decision.
pub struct Selector<'a> {
    pub board: &'a Board,
    pub intel: &'a TerritoryIntel,
    pub config: &'a EngineConfig,
    /// Source of the previous move.
    pub last_from: Option<usize>,
    /// True while a GENERAL objective is at the front of the queue.
    pub attacking_general: bool,
}

/// What the heuristic decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Step from `from` to `to`. `press` asks the caller to queue a
    /// position objective at `from` so the attack continues next tick.
    Move {
        from: usize,
        to: usize,
        tier: Tier,
        press: bool,
    },
    /// Queue this expansion objective and service the queue instead.
    Expand(Objective),
    /// Nothing worth doing.
    Idle,
}

impl<'a> Selector<'a> {
    fn include_general(&self) -> bool {
        self.board.game_tick() < self.config.pull_from_general_max
    }

    fn objectives_allowed(&self) -> bool {
        self.config.use_objectives
    }

    /// Runs the heuristic chain.
    pub fn select(&self, rng: &mut impl Rng) -> Selection {
        let board = self.board;
        let intel = self.intel;

        if !intel.frontline.is_empty() {
            for from in sorted_frontline(board, intel) {
                if let Some(to) = weakest_enemy(board, from) {
                    debug!(from, to, "attacking from frontline");
                    return self.finish(from, to, Tier::LowEnemy);
                }
            }
            if self.config.expand_frontline && self.objectives_allowed() {
                if let Some(objective) = self.expand_frontline() {
                    return Selection::Expand(objective);
                }
            }
        }

        if !intel.perimeter.is_empty() {
            for from in sorted_perimeter(board, intel, self.include_general()) {
                match choose_destination(board, intel, from, self.last_from) {
                    Some((to, tier)) if tier != Tier::Owned => {
                        debug!(from, to, ?tier, "expanding from perimeter");
                        return self.finish(from, to, tier);
                    }
                    _ => {}
                }
            }
            let has_plain_perimeter = intel.perimeter.iter().any(|&t| !board.is_own_general(t));
            if self.config.expand_perimeter && self.objectives_allowed() && has_plain_perimeter {
                if let Some(objective) = self.expand_perimeter() {
                    return Selection::Expand(objective);
                }
            }
        }

        let from = match best_source(board, intel, self.include_general())
            .or_else(|| random_usable(intel, rng))
        {
            Some(t) => t,
            None => return Selection::Idle,
        };
        match choose_destination(board, intel, from, self.last_from) {
            Some((to, tier)) => {
                debug!(from, to, ?tier, "fallback move");
                self.finish(from, to, tier)
            }
            None => Selection::Idle,
        }
    }

    /// Wraps a chosen step, deciding whether to keep pressing the attack.
    fn finish(&self, from: usize, to: usize, tier: Tier) -> Selection {
        let board = self.board;
        let tick = board.game_tick() as i32;
        let general_armies = board.general.map_or(0, |g| board.armies_at(g));
        let general_safe = general_armies >= tick || general_armies > self.config.general_min;
        let press = self.config.attack_enemies
            && self.objectives_allowed()
            && board.is_enemy(to)
            && board.armies_at(from) <= 2
            && general_safe
            && !self.attacking_general;
        Selection::Move {
            from,
            to,
            tier,
            press,
        }
    }

    /// A position objective moving the best source onto the nearest other
    /// frontline tile. `None` when no such tile is reachable.
    pub fn expand_frontline(&self) -> Option<Objective> {
        let source = best_source(self.board, self.intel, self.include_general())?;
        let others: Vec<usize> = self
            .intel
            .frontline
            .iter()
            .copied()
            .filter(|&t| t != source)
            .collect();
        let target = closest(self.board, source, &others)?;
        self.plan(source, target)
    }

    /// A position objective growing the perimeter: outward from the general
    /// late in the game, next to the best source early on. `None` when the
    /// chosen tile is the source itself or unreachable.
    pub fn expand_perimeter(&self) -> Option<Objective> {
        let source = best_source(self.board, self.intel, self.include_general())?;
        let target = if self.board.game_tick() > EXPAND_OUTWARD_AFTER {
            let anchor = self.board.general.unwrap_or(source);
            farthest_perimeter(self.board, self.intel, anchor)
        } else {
            closest_perimeter(self.board, self.intel, source)
        }?;
        self.plan(source, target)
    }

    fn plan(&self, source: usize, target: usize) -> Option<Objective> {
        let path = find_path(self.board, source, target, self.config);
        debug!(source, goal = target, steps = path.len(), "planned expansion");
        if path.is_empty() {
            return None;
        }
        Some(Objective::with_path(
            ObjectiveKind::Position,
            target,
            source,
            path,
            self.board.game_tick(),
        ))
    }
}
