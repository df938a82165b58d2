//! Local self-play.
//!
//! `LocalGame` simulates the game rules the engine assumes with full
//! information, then hands each player a fogged view encoded as the same
//! diff snapshots the host sends. Engines therefore run through exactly the
//! path they take over the wire. `run_self_play` plays a batch of seeded
//! games, optionally in parallel, and returns one record per game.

use std::io::{self, Write};
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::board::{encode_patch, Grid, Terrain};
use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::protocol::{GameStart, Move, Snapshot};

/// Defenders on a neutral city at game start.
pub const NEUTRAL_CITY_ARMIES: i32 = 40;

/// Every owned tile grows by one army once per this many game ticks.
pub const LAND_GROWTH_TICKS: u32 = 25;

/// Configuration for a self-play batch.
#[derive(Debug, Clone)]
pub struct SelfPlayConfig {
    /// Number of games to play.
    pub num_games: usize,
    pub width: usize,
    pub height: usize,
    /// Players per game.
    pub players: usize,
    /// Fraction of non-general tiles turned into mountains.
    pub mountain_density: f64,
    /// Fraction of non-general tiles turned into neutral cities.
    pub city_density: f64,
    /// Server turns before a game is called a draw.
    pub max_turns: u32,
    /// Number of parallel threads for concurrent games.
    pub threads: usize,
    /// Random seed (0 = use entropy).
    pub seed: u64,
    /// Tunables shared by every engine in the batch.
    pub engine: EngineConfig,
    /// Suppress per-game progress output.
    pub quiet: bool,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        SelfPlayConfig {
            num_games: 10,
            width: 18,
            height: 18,
            players: 2,
            mountain_density: 0.2,
            city_density: 0.03,
            max_turns: 1000,
            threads: 4,
            seed: 0,
            engine: EngineConfig::default(),
            quiet: false,
        }
    }
}

/// One player's fogged view of the game, in server encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub map: Vec<i32>,
    pub cities: Vec<i32>,
    pub generals: Vec<i64>,
}

/// Full-information game simulator.
#[derive(Debug, Clone)]
pub struct LocalGame {
    grid: Grid,
    cities: Vec<usize>,
    generals: Vec<usize>,
    alive: Vec<bool>,
    turn: u32,
}

impl LocalGame {
    /// Starts a game on an explicit board. Generals are indexed by player;
    /// their tiles must already be owned by that player.
    pub fn new(grid: Grid, cities: Vec<usize>, generals: Vec<usize>) -> Self {
        let alive = vec![true; generals.len()];
        LocalGame {
            grid,
            cities,
            generals,
            alive,
            turn: 1,
        }
    }

    /// Generates a random map: generals spread apart, mountains and neutral
    /// cities scattered over the rest, and no general walled in.
    pub fn generate(config: &SelfPlayConfig, rng: &mut SmallRng) -> Self {
        let (width, height) = (config.width.max(2), config.height.max(2));
        let size = width * height;
        let mut grid = Grid::new(width, height, vec![0; size], vec![Terrain::Empty; size]);

        let spread = (width + height) / 2;
        let mut generals: Vec<usize> = Vec::with_capacity(config.players);
        for player in 0..config.players {
            let mut tile = rng.gen_range(0..size);
            for _ in 0..1000 {
                let far = generals
                    .iter()
                    .all(|&g| g != tile && grid.manhattan(g, tile) >= spread);
                if far {
                    break;
                }
                tile = rng.gen_range(0..size);
            }
            if generals.contains(&tile) {
                match (0..size).find(|t| !generals.contains(t)) {
                    Some(t) => tile = t,
                    None => break,
                }
            }
            grid.terrain[tile] = Terrain::Player(player);
            grid.armies[tile] = 1;
            generals.push(tile);
        }

        let mut cities = Vec::new();
        for tile in 0..size {
            if generals.contains(&tile) {
                continue;
            }
            let roll: f64 = rng.gen();
            if roll < config.mountain_density {
                grid.terrain[tile] = Terrain::Mountain;
            } else if roll < config.mountain_density + config.city_density {
                grid.armies[tile] = NEUTRAL_CITY_ARMIES;
                cities.push(tile);
            }
        }

        for &g in &generals {
            let around: Vec<usize> = grid.neighbors(g).collect();
            for n in around {
                if grid.terrain[n] == Terrain::Mountain {
                    grid.terrain[n] = Terrain::Empty;
                }
            }
        }

        LocalGame::new(grid, cities, generals)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn players(&self) -> usize {
        self.generals.len()
    }

    pub fn is_alive(&self, player: usize) -> bool {
        self.alive.get(player).copied().unwrap_or(false)
    }

    /// The last player standing, once everyone else is eliminated.
    pub fn winner(&self) -> Option<usize> {
        let mut alive = (0..self.players()).filter(|&p| self.is_alive(p));
        match (alive.next(), alive.next()) {
            (Some(p), None) if self.players() > 1 => Some(p),
            _ => None,
        }
    }

    /// Tiles owned by a player.
    pub fn land(&self, player: usize) -> usize {
        self.grid
            .terrain
            .iter()
            .filter(|t| t.owner() == Some(player))
            .count()
    }

    /// Total armies owned by a player.
    pub fn army(&self, player: usize) -> i32 {
        self.grid
            .terrain
            .iter()
            .zip(&self.grid.armies)
            .filter(|(t, _)| t.owner() == Some(player))
            .map(|(_, &a)| a)
            .sum()
    }

    fn sees(&self, player: usize, tile: usize) -> bool {
        let (x, y) = self.grid.coords(tile);
        let (w, h) = (self.grid.width, self.grid.height);
        for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
            for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                let t = self.grid.tile_at(nx, ny);
                if self.grid.terrain[t].owner() == Some(player) {
                    return true;
                }
            }
        }
        false
    }

    /// The map as a player sees it. A tile is visible when the player owns
    /// it or any of its eight surrounding tiles. Unseen mountains and cities
    /// read as fog obstacles, everything else unseen as plain fog.
    pub fn view(&self, player: usize) -> View {
        let size = self.grid.size();
        let mut armies = vec![0; size];
        let mut terrain = vec![Terrain::Fog; size];
        for tile in 0..size {
            if self.sees(player, tile) {
                armies[tile] = self.grid.armies[tile];
                terrain[tile] = self.grid.terrain[tile];
            } else if self.grid.terrain[tile].is_mountain() || self.cities.contains(&tile) {
                terrain[tile] = Terrain::FogObstacle;
            }
        }
        let fogged = Grid::new(self.grid.width, self.grid.height, armies, terrain);

        let cities = self
            .cities
            .iter()
            .filter(|&&c| self.sees(player, c))
            .map(|&c| c as i32)
            .collect();
        let generals = (0..self.players())
            .map(|p| {
                let g = self.generals[p];
                if self.is_alive(p) && self.sees(player, g) {
                    g as i64
                } else {
                    -1
                }
            })
            .collect();

        View {
            map: fogged.to_map(),
            cities,
            generals,
        }
    }

    /// Applies one player's move. Returns false when the move is illegal and
    /// was dropped.
    pub fn apply(&mut self, player: usize, mv: Move) -> bool {
        let Move {
            from,
            to,
            split_half,
        } = mv;
        if !self.is_alive(player)
            || !self.grid.in_bounds(from)
            || !self.grid.is_adjacent(from, to)
            || self.grid.terrain[from].owner() != Some(player)
            || self.grid.terrain[to].is_mountain()
            || self.grid.armies[from] < 2
        {
            return false;
        }

        let moving = if split_half {
            self.grid.armies[from] / 2
        } else {
            self.grid.armies[from] - 1
        };
        self.grid.armies[from] -= moving;

        if self.grid.terrain[to].owner() == Some(player) {
            self.grid.armies[to] += moving;
            return true;
        }
        if moving <= self.grid.armies[to] {
            self.grid.armies[to] -= moving;
            return true;
        }

        let defender = self.grid.terrain[to].owner();
        self.grid.armies[to] = moving - self.grid.armies[to];
        self.grid.terrain[to] = Terrain::Player(player);
        if let Some(victim) = defender {
            if self.generals.get(victim) == Some(&to) && self.is_alive(victim) {
                self.eliminate(victim, player, to);
            }
        }
        true
    }

    /// Hands the loser's land to the capturer at half strength and turns the
    /// captured general into a city.
    fn eliminate(&mut self, victim: usize, capturer: usize, general: usize) {
        info!(victim, capturer, turn = self.turn, "general captured");
        self.alive[victim] = false;
        for tile in 0..self.grid.size() {
            if self.grid.terrain[tile].owner() == Some(victim) {
                self.grid.terrain[tile] = Terrain::Player(capturer);
                self.grid.armies[tile] = (self.grid.armies[tile] + 1) / 2;
            }
        }
        if !self.cities.contains(&general) {
            self.cities.push(general);
        }
    }

    /// Applies every player's move for this turn, then advances the turn
    /// counter and grows armies on game tick boundaries. Move order rotates
    /// with the turn.
    pub fn advance(&mut self, moves: &[Option<Move>]) {
        let players = self.players();
        for k in 0..players {
            let player = (self.turn as usize + k) % players;
            if let Some(Some(mv)) = moves.get(player) {
                if !self.apply(player, *mv) {
                    debug!(player, from = mv.from, to = mv.to, "dropped illegal move");
                }
            }
        }

        self.turn += 1;
        if self.turn % 2 != 0 {
            return;
        }
        for p in 0..players {
            if self.is_alive(p) {
                self.grid.armies[self.generals[p]] += 1;
            }
        }
        for &c in &self.cities {
            if self.grid.terrain[c].owner().is_some() && !self.generals.contains(&c) {
                self.grid.armies[c] += 1;
            }
        }
        if self.turn % (2 * LAND_GROWTH_TICKS) == 0 {
            for tile in 0..self.grid.size() {
                if self.grid.terrain[tile].owner().is_some() {
                    self.grid.armies[tile] += 1;
                }
            }
        }
    }
}

/// Turns a sequence of views into diff snapshots for one player.
#[derive(Debug, Clone, Default)]
pub struct SnapshotFeed {
    map: Vec<i32>,
    cities: Vec<i32>,
}

impl SnapshotFeed {
    pub fn new() -> Self {
        SnapshotFeed::default()
    }

    /// Encodes `view` against the previously sent one.
    pub fn snapshot(&mut self, turn: u32, view: View) -> Snapshot {
        let snapshot = Snapshot {
            turn,
            map_diff: encode_patch(&self.map, &view.map),
            cities_diff: encode_patch(&self.cities, &view.cities),
            generals: view.generals,
        };
        self.map = view.map;
        self.cities = view.cities;
        snapshot
    }
}

/// A completed self-play game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameRecord {
    pub game_id: usize,
    pub seed: u64,
    pub width: usize,
    pub height: usize,
    /// The last player standing, if any.
    pub winner: Option<usize>,
    /// Server turn the game stopped on.
    pub turns: u32,
    /// Final tile counts by player.
    pub land: Vec<usize>,
    /// Final army totals by player.
    pub armies: Vec<i32>,
    /// Moves each engine issued.
    pub moves: Vec<usize>,
    /// Updates each engine answered with a pass.
    pub passes: Vec<usize>,
}

/// Plays a single game from a seed.
pub fn play_game(config: &SelfPlayConfig, game_id: usize, seed: u64) -> GameRecord {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut game = LocalGame::generate(config, &mut rng);
    let players = game.players();
    let usernames: Vec<String> = (0..players).map(|p| format!("bot{}", p)).collect();

    let mut engines: Vec<Engine> = (0..players)
        .map(|p| {
            let mut engine_config = config.engine.clone();
            engine_config.seed = Some(seed.wrapping_add(p as u64));
            let mut engine = Engine::with_config(engine_config);
            engine.start(GameStart {
                player_index: p,
                usernames: usernames.clone(),
            });
            engine
        })
        .collect();
    let mut feeds = vec![SnapshotFeed::new(); players];
    let mut moves = vec![0; players];
    let mut passes = vec![0; players];

    while game.turn() <= config.max_turns && game.winner().is_none() {
        let turn = game.turn();
        let mut chosen = vec![None; players];
        for p in 0..players {
            if !game.is_alive(p) {
                continue;
            }
            let snapshot = feeds[p].snapshot(turn, game.view(p));
            chosen[p] = engines[p].step(&snapshot);
            match chosen[p] {
                Some(_) => moves[p] += 1,
                None => passes[p] += 1,
            }
        }
        game.advance(&chosen);
    }

    GameRecord {
        game_id,
        seed,
        width: game.grid().width,
        height: game.grid().height,
        winner: game.winner(),
        turns: game.turn(),
        land: (0..players).map(|p| game.land(p)).collect(),
        armies: (0..players).map(|p| game.army(p)).collect(),
        moves,
        passes,
    }
}

fn game_seed(config: &SelfPlayConfig, game_id: usize) -> u64 {
    if config.seed != 0 {
        config.seed.wrapping_add(game_id as u64)
    } else {
        SmallRng::from_entropy().gen()
    }
}

fn play_logged(config: &SelfPlayConfig, game_id: usize) -> GameRecord {
    let started = Instant::now();
    let game = play_game(config, game_id, game_seed(config, game_id));
    if !config.quiet {
        let outcome = match game.winner {
            Some(w) => format!("player {} wins", w),
            None => "draw".to_string(),
        };
        info!(
            "Game {}/{}: {} on turn {} ({:.1}s)",
            game_id + 1,
            config.num_games,
            outcome,
            game.turns,
            started.elapsed().as_secs_f64(),
        );
    }
    game
}

/// Runs self-play generation, producing one record per game in game order.
///
/// When `config.threads > 1`, games are played concurrently using rayon.
pub fn run_self_play(config: &SelfPlayConfig) -> Vec<GameRecord> {
    if config.threads > 1 {
        use rayon::prelude::*;

        match rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build()
        {
            Ok(pool) => {
                return pool.install(|| {
                    (0..config.num_games)
                        .into_par_iter()
                        .map(|i| play_logged(config, i))
                        .collect()
                })
            }
            Err(e) => warn!(error = %e, "thread pool unavailable, playing sequentially"),
        }
    }
    (0..config.num_games)
        .map(|i| play_logged(config, i))
        .collect()
}

/// Writes game records as JSONL (one JSON object per game, one per line).
pub fn write_jsonl<W: Write>(games: &[GameRecord], out: &mut W) -> io::Result<()> {
    for game in games {
        serde_json::to_writer(&mut *out, game)?;
        writeln!(out)?;
    }
    out.flush()
}

/// Logs a summary of self-play results.
pub fn print_summary(games: &[GameRecord]) {
    let total = games.len();
    if total == 0 {
        info!("no games played");
        return;
    }
    let players = games.iter().map(|g| g.land.len()).max().unwrap_or(0);
    let mut wins = vec![0usize; players];
    let mut draws = 0usize;
    let mut turns = 0u64;
    for game in games {
        turns += u64::from(game.turns);
        match game.winner {
            Some(w) if w < players => wins[w] += 1,
            _ => draws += 1,
        }
    }
    info!("=== Self-play summary ===");
    info!("Games: {}, average length {} turns", total, turns / total as u64);
    for (p, w) in wins.iter().enumerate() {
        info!(
            "  player {}: {} wins ({:.1}%)",
            p,
            w,
            100.0 * *w as f64 / total as f64
        );
    }
    info!(
        "  draws: {} ({:.1}%)",
        draws,
        100.0 * draws as f64 / total as f64
    );
}
