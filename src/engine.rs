//! Engine state management.
//!
//! Holds the per-game state between updates and runs one decision cycle per
//! snapshot: rebuild the board, refresh intel, recover from stalls and
//! failed moves, then service the objective queue or fall back to the
//! heuristic move selector. Also answers the host protocol commands.

use std::io::{self, Write};

use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::board::{apply_patch, Board, Grid, Terrain};
use crate::config::{ConfigError, EngineConfig, OPTION_NAMES};
use crate::intel::{refresh, ProgressTracker, Refresh, TerritoryIntel};
use crate::movegen::{best_source, closest, random_usable, Selection, Selector};
use crate::objective::{Objective, ObjectiveKind, ObjectiveQueue};
use crate::protocol::{format_chat, format_move, GameStart, Move, Snapshot, SnapshotError};
use crate::search::find_path;

/// What a tile pair looked like when a move was issued. If the same record
/// comes back on the next update, the move had no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptedMove {
    pub from: usize,
    pub to: usize,
    pub from_armies: i32,
    pub to_armies: i32,
    pub from_terrain: Terrain,
    pub to_terrain: Terrain,
}

impl AttemptedMove {
    pub fn record(board: &Board, from: usize, to: usize) -> Self {
        AttemptedMove {
            from,
            to,
            from_armies: board.armies_at(from),
            to_armies: board.armies_at(to),
            from_terrain: board.terrain_at(from),
            to_terrain: board.terrain_at(to),
        }
    }
}

/// State owned by a single game. Replaced wholesale on `newgame`.
#[derive(Debug, Clone)]
struct GameState {
    player: usize,
    usernames: Vec<String>,
    map: Vec<i32>,
    cities: Vec<i32>,
    general: Option<usize>,
    /// Tile the current objective is walking from.
    cursor: Option<usize>,
    queue: ObjectiveQueue,
    tracker: ProgressTracker,
    last_attempted: Option<AttemptedMove>,
    /// Turn on which the current failed move was first seen.
    first_fail: Option<u32>,
    contact_seen: bool,
    last_turn: Option<u32>,
}

impl GameState {
    fn new(config: &EngineConfig) -> Self {
        GameState {
            player: 0,
            usernames: Vec::new(),
            map: Vec::new(),
            cities: Vec::new(),
            general: None,
            cursor: None,
            queue: ObjectiveQueue::new(),
            tracker: ProgressTracker::new(config.stuck_threshold),
            last_attempted: None,
            first_fail: None,
            contact_seen: false,
            last_turn: None,
        }
    }
}

fn make_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(s) => SmallRng::seed_from_u64(s),
        None => SmallRng::from_entropy(),
    }
}

/// Holds the mutable state of the engine between commands.
pub struct Engine {
    pub config: EngineConfig,
    game: GameState,
    rng: SmallRng,
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}

impl Engine {
    /// Creates an engine with default tunables.
    pub fn new() -> Self {
        Engine::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Engine {
            game: GameState::new(&config),
            rng: make_rng(config.seed),
            config,
        }
    }

    /// Resets all per-game state. Configuration is kept.
    pub fn new_game(&mut self) {
        self.game = GameState::new(&self.config);
        self.rng = make_rng(self.config.seed);
    }

    /// Applies the one-time game start record.
    pub fn start(&mut self, start: GameStart) {
        info!(player = start.player_index, players = start.usernames.len(), "game start");
        self.game.player = start.player_index;
        self.game.usernames = start.usernames;
    }

    /// Sets an engine option.
    pub fn set_option(&mut self, name: &str, value: Option<&str>) -> Result<(), ConfigError> {
        self.config.set_option(name, value)?;
        if name == "Seed" {
            self.rng = make_rng(self.config.seed);
        }
        Ok(())
    }

    pub fn player(&self) -> usize {
        self.game.player
    }

    pub fn general(&self) -> Option<usize> {
        self.game.general
    }

    pub fn cursor(&self) -> Option<usize> {
        self.game.cursor
    }

    pub fn queue(&self) -> &ObjectiveQueue {
        &self.game.queue
    }

    pub fn last_attempted(&self) -> Option<AttemptedMove> {
        self.game.last_attempted
    }

    pub fn contact_seen(&self) -> bool {
        self.game.contact_seen
    }

    /// Runs one decision cycle for a snapshot and returns the chosen move.
    pub fn step(&mut self, snapshot: &Snapshot) -> Option<Move> {
        let turn = snapshot.turn;
        if let Some(last) = self.game.last_turn {
            if turn <= last {
                warn!(turn, last, "duplicate or stale update ignored");
                return None;
            }
        }
        self.game.last_turn = Some(turn);

        self.game.map = apply_patch(&self.game.map, &snapshot.map_diff);
        self.game.cities = apply_patch(&self.game.cities, &snapshot.cities_diff);
        let grid = match Grid::from_map(&self.game.map) {
            Ok(g) => g,
            Err(e) => {
                warn!(turn, error = %e, "skipping tick");
                return None;
            }
        };

        let generals = snapshot.general_tiles();
        if self.game.general.is_none() {
            self.game.general = generals.get(self.game.player).copied().flatten();
            self.game.cursor = self.game.general;
            info!(
                general = ?self.game.general,
                width = grid.width,
                height = grid.height,
                "starting report"
            );
        }

        let size = grid.size();
        let cities: Vec<usize> = self
            .game
            .cities
            .iter()
            .filter_map(|&c| usize::try_from(c).ok())
            .filter(|&c| c < size)
            .collect();
        let mut board = Board::new(grid, self.game.player, turn);
        board.general = self.game.general;
        let board = board.with_cities(cities).with_generals(generals);

        self.game.tracker.set_threshold(self.config.stuck_threshold);
        let Refresh { intel, stuck } = refresh(&board, &self.config, &mut self.game.tracker);
        debug!(
            turn,
            tick = board.game_tick(),
            owned = intel.owned.len(),
            frontline = intel.frontline.len(),
            perimeter = intel.perimeter.len(),
            "intel"
        );

        if !self.game.contact_seen && !intel.frontline.is_empty() {
            info!(tick = board.game_tick(), "first contact, flushing objectives");
            self.game.contact_seen = true;
            self.game.queue.clear();
        }
        if stuck {
            info!(
                tick = board.game_tick(),
                "no visible progress, flushing objectives"
            );
            self.game.queue.clear();
        }

        if self.fully_stretched(&board, &intel) {
            debug!("fully stretched");
            return None;
        }

        if let Some(retry) = self.check_failed_move(&board) {
            return Some(retry);
        }

        if turn <= 1 {
            return None;
        }

        self.queue_targets(&board, &intel);
        self.service(&board, &intel, true)
    }

    /// True if no owned tile can move. The general is ignored once it may
    /// no longer be pulled from.
    fn fully_stretched(&self, board: &Board, intel: &TerritoryIntel) -> bool {
        let ignore_general = board.game_tick() >= self.config.pull_from_general_max;
        intel
            .owned
            .iter()
            .all(|&t| (ignore_general && board.is_own_general(t)) || board.armies_at(t) == 1)
    }

    /// Compares the last issued move against the board. Re-issues it while
    /// the failure is inside the retry window, then gives up and flushes the
    /// queue.
    fn check_failed_move(&mut self, board: &Board) -> Option<Move> {
        let attempted = self.game.last_attempted?;
        let now = AttemptedMove::record(board, attempted.from, attempted.to);
        if now != attempted {
            self.game.first_fail = None;
            return None;
        }

        let first = *self.game.first_fail.get_or_insert(board.turn);
        let persisted = board.turn.saturating_sub(first);
        if persisted < self.config.retry_window {
            debug!(
                from = attempted.from,
                to = attempted.to,
                attempt = persisted + 1,
                "retrying failed move"
            );
            return Some(self.issue(board, attempted.from, attempted.to));
        }

        info!(
            from = attempted.from,
            to = attempted.to,
            since = first,
            "giving up on failed move, clearing objectives"
        );
        self.game.first_fail = None;
        self.game.queue.clear();
        None
    }

    /// Records and returns a move. The objective cursor follows the armies.
    fn issue(&mut self, board: &Board, from: usize, to: usize) -> Move {
        self.game.last_attempted = Some(AttemptedMove::record(board, from, to));
        self.game.cursor = Some(to);
        Move::new(from, to)
    }

    /// Appends GENERAL and CITY objectives for visible targets.
    fn queue_targets(&mut self, board: &Board, intel: &TerritoryIntel) {
        if !self.config.use_objectives {
            return;
        }
        let tick = board.game_tick();
        let include_general = tick < self.config.pull_from_general_max;

        if self.config.attack_generals && !self.game.queue.contains_kind(ObjectiveKind::General) {
            let anchor = self
                .game
                .general
                .or_else(|| best_source(board, intel, true));
            let visible: Vec<usize> = board.enemy_generals().map(|(_, t)| t).collect();
            if let Some(target) = anchor.and_then(|a| closest(board, a, &visible)) {
                self.game
                    .queue
                    .push_back(Objective::new(ObjectiveKind::General, target, tick));
            }
        }

        let city_window = self.config.attack_cities_min..=self.config.attack_cities_max;
        if self.config.attack_cities
            && city_window.contains(&tick)
            && !self.game.queue.contains_kind(ObjectiveKind::City)
        {
            if let Some(source) = best_source(board, intel, include_general) {
                let strength = board.armies_at(source);
                let targets: Vec<usize> = board
                    .cities
                    .iter()
                    .copied()
                    .filter(|&c| {
                        !board.is_owned(c)
                            && matches!(board.terrain_at(c), Terrain::Empty | Terrain::Player(_))
                            && board.armies_at(c) < strength
                    })
                    .collect();
                if let Some(city) = closest(board, source, &targets) {
                    self.game
                        .queue
                        .push_back(Objective::new(ObjectiveKind::City, city, tick));
                }
            }
        }
    }

    /// Produces a move from the objective queue, or from the heuristic
    /// selector when `allow_fallback` is set and no objective moved.
    fn service(
        &mut self,
        board: &Board,
        intel: &TerritoryIntel,
        allow_fallback: bool,
    ) -> Option<Move> {
        debug!(queue = self.game.queue.len(), "servicing objectives");
        let mut has_objective = self.next_objective(board, intel);
        if self.maybe_reinforce(board, intel) {
            has_objective = self.next_objective(board, intel);
        }

        if has_objective {
            if let Some(mv) = self.step_objective(board, intel) {
                return Some(mv);
            }
            debug!("objective produced no move");
        }

        if allow_fallback {
            self.heuristic(board, intel)
        } else {
            None
        }
    }

    /// Drops finished objectives off the front until a usable one is found.
    /// Returns false if the queue ran dry.
    fn next_objective(&mut self, board: &Board, intel: &TerritoryIntel) -> bool {
        let tick = board.game_tick();
        loop {
            let Some(front) = self.game.queue.front_mut() else {
                return false;
            };
            if front.is_usable() {
                if !front.started {
                    front.started = true;
                    if front.kind == ObjectiveKind::General {
                        let username = board
                            .general_owner(front.target)
                            .and_then(|p| self.game.usernames.get(p))
                            .map_or("unknown", String::as_str);
                        info!(tile = front.target, username, "targeting general");
                    } else {
                        info!(objective = %front, "targeting");
                    }
                }
                return true;
            }

            let Some(done) = self.game.queue.pop_front() else {
                return false;
            };
            if done.is_complete() {
                let captured = board.is_owned(done.target);
                info!(objective = %done, captured, "objective finished");
                if !captured {
                    debug!(objective = %done, "renewing");
                    self.game.queue.push_back(done.renewed(tick));
                }
            } else {
                debug!(objective = %done, "dropping exhausted objective");
            }

            let reinforced_general = matches!(
                done.kind,
                ObjectiveKind::Position | ObjectiveKind::Reinforce
            ) && self.game.general == Some(done.target);
            if reinforced_general {
                self.game.cursor = best_source(board, intel, false)
                    .or_else(|| random_usable(intel, &mut self.rng));
                debug!(cursor = ?self.game.cursor, "cursor moved off the general");
            }
        }
    }

    /// Pushes a REINFORCE objective for our general to the front when it is
    /// falling behind the game clock or a stronger enemy is close.
    fn maybe_reinforce(&mut self, board: &Board, intel: &TerritoryIntel) -> bool {
        let Some(general) = self.game.general else {
            return false;
        };
        if !(self.config.reinforce_general && self.config.use_objectives) {
            return false;
        }
        if self.config.reinforce_after_contact && !self.game.contact_seen {
            return false;
        }
        let queue = &self.game.queue;
        if queue.front().is_some_and(|o| o.target == general)
            || queue.contains_kind(ObjectiveKind::Reinforce)
        {
            return false;
        }

        let tick = board.game_tick();
        let armies = board.armies_at(general);
        let below_clock = armies < tick as i32 && !queue.front_is(ObjectiveKind::General);
        let threatened = intel.enemies.iter().any(|&t| {
            board.grid.distance(general, t) <= self.config.closeness_limit
                && board.armies_at(t) >= armies
        });
        if !(below_clock || threatened) {
            return false;
        }

        info!(general, armies, tick, threatened, "reinforcing general");
        self.game
            .queue
            .push_front(Objective::new(ObjectiveKind::Reinforce, general, tick))
    }

    /// Takes one step along the front objective's path, searching a fresh
    /// path first when the objective is new or the cursor tile is lost or spent.
    fn step_objective(&mut self, board: &Board, intel: &TerritoryIntel) -> Option<Move> {
        let include_general = board.game_tick() < self.config.pull_from_general_max;
        let general = self.game.general;
        let objective = self.game.queue.front_mut()?;
        let target = objective.target;

        let cursor_spent = self
            .game
            .cursor
            .map_or(true, |c| !board.is_owned(c) || board.armies_at(c) <= 1);
        if objective.is_pending() || cursor_spent {
            let source = best_source(board, intel, include_general && general != Some(target))
                .or_else(|| random_usable(intel, &mut self.rng));
            let Some(source) = source else {
                debug!(goal = target, "no source for objective");
                return None;
            };
            let path = find_path(board, source, target, &self.config);
            debug!(source, goal = target, ?path, "objective path");
            objective.set_path(source, path);
            self.game.cursor = Some(source);
        }

        let cursor = self.game.cursor?;
        if board.armies_at(cursor) <= 1 {
            return None;
        }
        if let Some(next) = objective.peek_step() {
            if next != cursor && !board.grid.is_adjacent(cursor, next) {
                let path = find_path(board, cursor, target, &self.config);
                debug!(cursor, goal = target, ?path, "cursor left the path, replanning");
                objective.set_path(cursor, path);
            }
        }

        let mut next = objective.pop_step();
        if next == Some(cursor) {
            next = objective.pop_step();
        }
        let next = next?;
        if next == target {
            debug!(objective = %objective, "final step issued");
            objective.mark_complete();
        }
        Some(self.issue(board, cursor, next))
    }

    /// Runs the heuristic selector and acts on its choice.
    fn heuristic(&mut self, board: &Board, intel: &TerritoryIntel) -> Option<Move> {
        let selection = Selector {
            board,
            intel,
            config: &self.config,
            last_from: self.game.last_attempted.map(|m| m.from),
            attacking_general: self.game.queue.front_is(ObjectiveKind::General),
        }
        .select(&mut self.rng);

        match selection {
            Selection::Move { from, to, press, .. } => {
                if press {
                    let mut hold = Objective::new(ObjectiveKind::Position, from, board.game_tick());
                    hold.started = true;
                    debug!(from, to, "pressing the attack");
                    self.game.queue.push_front(hold);
                }
                Some(self.issue(board, from, to))
            }
            Selection::Expand(objective) => {
                debug!(%objective, "expanding");
                self.game.queue.push_back(objective);
                self.service(board, intel, false)
            }
            Selection::Idle => {
                debug!("no heuristic move");
                None
            }
        }
    }

    /// Handles the protocol handshake: id lines, options, and `botok`.
    pub fn handle_bot<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "id name marshal")?;
        writeln!(out, "id author marshal")?;
        for name in OPTION_NAMES {
            if let Some(desc) = self.config.describe_option(name) {
                writeln!(out, "option name {} {}", name, desc)?;
            }
        }
        writeln!(out, "botok")?;
        out.flush()
    }

    /// Handles the `isready` command.
    pub fn handle_isready<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "readyok")?;
        out.flush()
    }

    /// Handles `start <json>`.
    pub fn handle_start(&mut self, raw: &str) -> Result<(), SnapshotError> {
        let start = GameStart::from_json(raw)?;
        self.start(start);
        Ok(())
    }

    /// Handles `update <json>`: always answers with exactly one line.
    pub fn handle_update<W: Write>(&mut self, raw: &str, out: &mut W) -> io::Result<()> {
        let mv = match Snapshot::from_json(raw) {
            Ok(snapshot) => self.step(&snapshot),
            Err(e) => {
                warn!(error = %e, "malformed update");
                None
            }
        };
        writeln!(out, "{}", format_move(mv))?;
        out.flush()
    }

    /// Handles `won`: gloat, then reset for the next game.
    pub fn handle_won<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        info!("game won");
        writeln!(out, "{}", format_chat("I WIN!"))?;
        out.flush()?;
        self.new_game();
        Ok(())
    }

    /// Handles `lost`.
    pub fn handle_lost(&mut self) {
        info!("game lost");
        self.new_game();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{encode_patch, TILE_EMPTY, TILE_MOUNTAIN};

    fn map(width: i32, height: i32, armies: &[i32], terrain: &[i32]) -> Vec<i32> {
        let mut m = vec![width, height];
        m.extend_from_slice(armies);
        m.extend_from_slice(terrain);
        m
    }

    fn snapshot(turn: u32, prev: &[i32], next: &[i32], generals: Vec<i64>) -> Snapshot {
        Snapshot {
            turn,
            map_diff: encode_patch(prev, next),
            cities_diff: vec![0],
            generals,
        }
    }

    fn engine() -> Engine {
        Engine::with_config(EngineConfig {
            seed: Some(1),
            ..EngineConfig::default()
        })
    }

    #[test]
    fn handle_bot_outputs_handshake() {
        let engine = engine();
        let mut output = Vec::new();
        engine.handle_bot(&mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.starts_with("id name marshal\n"));
        assert!(text.contains("option name PathLengthLimit type spin default 20"));
        assert!(text.contains("option name UseObjectives type check default true"));
        assert_eq!(text.lines().last(), Some("botok"));
        assert_eq!(
            text.lines().filter(|l| l.starts_with("option ")).count(),
            OPTION_NAMES.len()
        );
    }

    #[test]
    fn handle_isready_outputs_readyok() {
        let engine = engine();
        let mut output = Vec::new();
        engine.handle_isready(&mut output).unwrap();
        assert_eq!(String::from_utf8(output).unwrap().trim(), "readyok");
    }

    #[test]
    fn first_turn_bootstraps_general_without_moving() {
        let mut e = engine();
        let m = map(3, 1, &[1, 0, 0], &[0, TILE_EMPTY, TILE_EMPTY]);
        assert_eq!(e.step(&snapshot(1, &[], &m, vec![0])), None);
        assert_eq!(e.general(), Some(0));
        assert_eq!(e.cursor(), Some(0));
    }

    #[test]
    fn expands_from_general_into_empty() {
        let mut e = engine();
        let m = map(5, 1, &[5, 0, 0, 0, 2], &[0, TILE_EMPTY, TILE_EMPTY, TILE_EMPTY, 1]);
        let mv = e.step(&snapshot(3, &[], &m, vec![0, -1]));
        assert_eq!(mv, Some(Move::new(0, 1)));
        assert_eq!(e.last_attempted().map(|a| (a.from, a.to)), Some((0, 1)));
        assert_eq!(e.cursor(), Some(1));
    }

    #[test]
    fn stale_turns_are_ignored() {
        let mut e = engine();
        let m = map(2, 1, &[4, 0], &[0, TILE_EMPTY]);
        assert!(e.step(&snapshot(4, &[], &m, vec![0])).is_some());
        let again = snapshot(4, &m, &m, vec![0]);
        assert_eq!(e.step(&again), None);
        assert!(e.last_attempted().is_some());
    }

    #[test]
    fn truncated_map_skips_tick() {
        let mut e = engine();
        let snap = Snapshot {
            turn: 3,
            map_diff: vec![0, 4, 3, 3, 1, 1],
            cities_diff: vec![],
            generals: vec![0],
        };
        assert_eq!(e.step(&snap), None);
        assert!(e.last_attempted().is_none());
    }

    #[test]
    fn fully_stretched_makes_no_move() {
        let mut e = engine();
        let m = map(3, 1, &[1, 1, 0], &[0, 0, TILE_MOUNTAIN]);
        assert_eq!(e.step(&snapshot(6, &[], &m, vec![0])), None);
    }

    #[test]
    fn malformed_update_answers_pass() {
        let mut e = engine();
        let mut output = Vec::new();
        e.handle_update("{not json", &mut output).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "pass\n");
    }

    #[test]
    fn won_chats_and_resets() {
        let mut e = engine();
        e.handle_start(r#"{"playerIndex":1,"usernames":["a","b"]}"#).unwrap();
        assert_eq!(e.player(), 1);
        let m = map(2, 1, &[0, 3], &[TILE_EMPTY, 1]);
        e.step(&snapshot(1, &[], &m, vec![-1, 1]));
        assert_eq!(e.general(), Some(1));

        let mut output = Vec::new();
        e.handle_won(&mut output).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "chat I WIN!\n");
        assert_eq!(e.general(), None);
        assert_eq!(e.player(), 0);
        assert!(e.queue().is_empty());
    }

    #[test]
    fn set_option_updates_config() {
        let mut e = engine();
        e.set_option("StuckThreshold", Some("9")).unwrap();
        assert_eq!(e.config.stuck_threshold, 9);
        assert!(e.set_option("Bogus", None).is_err());
    }

    fn engine_with(config: EngineConfig) -> Engine {
        Engine::with_config(EngineConfig {
            seed: Some(1),
            ..config
        })
    }

    fn no_reinforce() -> EngineConfig {
        EngineConfig {
            reinforce_general: false,
            ..EngineConfig::default()
        }
    }

    /// Sends `next` as a diff against the previous full map.
    fn feed(
        e: &mut Engine,
        prev: &mut Vec<i32>,
        turn: u32,
        next: Vec<i32>,
        generals: Vec<i64>,
    ) -> Option<Move> {
        let mv = e.step(&snapshot(turn, prev, &next, generals));
        *prev = next;
        mv
    }

    #[test]
    fn general_grabs_empty_tile_when_strongest_perimeter_is_boxed_in() {
        let mut e = engine();
        let armies = [0, 5, 1, 1, 1, 1, 1, 1, 10, 20];
        let terrain = [TILE_EMPTY, 0, 0, 0, 0, 0, 0, 0, 0, 1];
        let m = map(10, 1, &armies, &terrain);
        assert_eq!(e.step(&snapshot(2, &[], &m, vec![1, -1])), Some(Move::new(1, 0)));
    }

    #[test]
    fn general_objective_is_renewed_until_captured() {
        let mut e = engine_with(no_reinforce());
        let mut prev = Vec::new();
        let terrain = [0, 0, 1];

        let mv = feed(&mut e, &mut prev, 4, map(3, 1, &[3, 9, 20], &terrain), vec![1, 2]);
        assert_eq!(mv, Some(Move::new(1, 2)));
        let front = e.queue().front().unwrap();
        assert_eq!(front.kind, ObjectiveKind::General);
        // Finished objectives stay queued until the next tick looks at them.
        assert!(front.is_complete());

        let mv = feed(&mut e, &mut prev, 5, map(3, 1, &[3, 1, 12], &terrain), vec![1, 2]);
        assert_eq!(mv, Some(Move::new(0, 1)));
        assert_eq!(e.queue().len(), 1);
        let front = e.queue().front().unwrap();
        assert_eq!((front.kind, front.target), (ObjectiveKind::General, 2));
        assert!(front.started);
        assert_eq!(front.source, Some(0));
        assert_eq!(front.remaining(), 1);
    }

    #[test]
    fn captured_objective_is_dropped() {
        let mut e = engine_with(no_reinforce());
        let mut prev = Vec::new();
        let terrain = [0, 0, 0, TILE_EMPTY, TILE_EMPTY];

        // Planned from tile 0 through the general, where the cursor sits;
        // that step is skipped rather than issued as a self-move.
        let mv = feed(&mut e, &mut prev, 4, map(5, 1, &[9, 5, 1, 0, 0], &terrain), vec![1, -1]);
        assert_eq!(mv, Some(Move::new(1, 2)));
        let front = e.queue().front().unwrap();
        assert_eq!((front.kind, front.target), (ObjectiveKind::Position, 2));
        assert!(front.is_complete());

        let mv = feed(&mut e, &mut prev, 5, map(5, 1, &[9, 1, 5, 0, 0], &terrain), vec![1, -1]);
        assert!(e.queue().is_empty());
        assert_eq!(mv, Some(Move::new(2, 3)));
    }

    #[test]
    fn cursor_leaves_general_after_reinforcement() {
        let mut e = engine();
        let mut prev = Vec::new();
        let terrain = [0, 0, 0];

        let mv = feed(&mut e, &mut prev, 20, map(3, 1, &[3, 4, 2], &terrain), vec![0, -1]);
        assert_eq!(mv, Some(Move::new(1, 0)));
        assert!(e.queue().front_is(ObjectiveKind::Reinforce));

        let mv = feed(&mut e, &mut prev, 21, map(3, 1, &[20, 1, 2], &terrain), vec![0, -1]);
        assert_eq!(mv, None);
        assert!(e.queue().is_empty());
        assert_eq!(e.cursor(), Some(2));
    }

    #[test]
    fn cursor_away_from_path_replans_from_cursor() {
        let mut e = engine();
        let terrain = [TILE_EMPTY, 0, 0, 0, 0];
        let m = map(5, 1, &[0, 1, 9, 1, 5], &terrain);

        // Expansion planned from tile 2; the cursor is still on the general.
        assert_eq!(e.step(&snapshot(4, &[], &m, vec![4, -1])), Some(Move::new(4, 3)));
        let front = e.queue().front().unwrap();
        assert_eq!(front.target, 1);
        assert_eq!(front.source, Some(4));
        assert_eq!(front.remaining(), 2);
    }

    #[test]
    fn cursor_on_lost_tile_replans_from_owned_source() {
        let mut e = engine_with(no_reinforce());
        let mut prev = Vec::new();
        let generals = vec![1, 5];

        let terrain = [1, 0, 0, TILE_EMPTY, TILE_EMPTY, 1];
        let m = map(6, 1, &[30, 5, 9, 0, 0, 1], &terrain);
        assert_eq!(feed(&mut e, &mut prev, 4, m, generals.clone()), Some(Move::new(2, 3)));
        assert_eq!(e.cursor(), Some(3));

        // The enemy took the tile the cursor moved onto.
        let terrain = [1, 0, 0, 1, TILE_EMPTY, 1];
        let m = map(6, 1, &[30, 5, 1, 4, 0, 1], &terrain);
        assert_eq!(feed(&mut e, &mut prev, 5, m, generals), Some(Move::new(1, 2)));
        assert_eq!(e.queue().front().unwrap().source, Some(1));
    }

    #[test]
    fn reachable_city_is_queued_inside_window() {
        let mut e = engine();
        let m = map(4, 1, &[60, 45, 0, 40], &[0, 0, TILE_EMPTY, TILE_EMPTY]);
        let snapshot = Snapshot {
            turn: 100,
            map_diff: encode_patch(&[], &m),
            cities_diff: encode_patch(&[], &[3]),
            generals: vec![0, -1],
        };
        assert_eq!(e.step(&snapshot), Some(Move::new(1, 2)));
        let front = e.queue().front().unwrap();
        assert_eq!((front.kind, front.target), (ObjectiveKind::City, 3));
    }

    #[test]
    fn first_contact_flushes_queued_objectives() {
        let mut e = engine_with(no_reinforce());
        let mut prev = Vec::new();
        let m = map(5, 1, &[0, 1, 9, 1, 5], &[TILE_EMPTY, 0, 0, 0, 0]);
        assert_eq!(feed(&mut e, &mut prev, 4, m, vec![4, -1]), Some(Move::new(4, 3)));
        assert!(!e.queue().is_empty());
        assert!(!e.contact_seen());

        e.config.expand_frontline = false;
        e.config.expand_perimeter = false;
        let m = map(5, 1, &[1, 1, 9, 5, 1], &[1, 0, 0, 0, 0]);
        let mv = feed(&mut e, &mut prev, 5, m, vec![4, -1]);
        assert!(e.contact_seen());
        assert!(e.queue().is_empty());
        assert_eq!(mv, Some(Move::new(2, 1)));
    }

    #[test]
    fn stalled_board_flushes_queue_once() {
        let mut e = engine_with(EngineConfig {
            retry_window: 100,
            ..no_reinforce()
        });
        let mut prev = Vec::new();
        let m = map(5, 1, &[0, 1, 9, 1, 5], &[TILE_EMPTY, 0, 0, 0, 0]);
        let mv = feed(&mut e, &mut prev, 4, m.clone(), vec![4, -1]);
        assert_eq!(mv, Some(Move::new(4, 3)));

        for turn in 5..=8 {
            let mv = feed(&mut e, &mut prev, turn, m.clone(), vec![4, -1]);
            assert_eq!(mv, Some(Move::new(4, 3)));
            assert_eq!(e.queue().len(), 1, "turn {}", turn);
        }
        assert_eq!(feed(&mut e, &mut prev, 9, m, vec![4, -1]), Some(Move::new(4, 3)));
        assert!(e.queue().is_empty());
    }

    #[test]
    fn spent_attacker_holds_position_at_front() {
        let mut e = engine_with(EngineConfig {
            pull_from_general_max: 0,
            ..EngineConfig::default()
        });
        let m = map(3, 1, &[50, 2, 0], &[0, 0, 1]);
        assert_eq!(e.step(&snapshot(6, &[], &m, vec![0, -1])), Some(Move::new(1, 2)));
        let front = e.queue().front().unwrap();
        assert_eq!((front.kind, front.target), (ObjectiveKind::Position, 1));
        assert!(front.started);
        assert!(front.is_pending());
    }
}
