//! Self-play game generation CLI.
//!
//! Plays local games between engines and writes one JSON record per game.
//!
//! Usage:
//!   cargo run --release --bin selfplay -- [OPTIONS]
//!
//! Options:
//!   --games N       Number of games to play (default: 10)
//!   --size WxH      Map size (default: 18x18)
//!   --players N     Players per game (default: 2)
//!   --max-turns N   Turn limit before a draw (default: 1000)
//!   --threads N     Number of parallel threads (default: 4)
//!   --seed N        Random seed, 0 for entropy (default: 0)
//!   --config FILE   Engine tunables as JSON
//!   --output FILE   Output file path (default: stdout)
//!   --quiet         Suppress summary output

use std::env;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;
use std::process;
use std::str::FromStr;
use std::time::Instant;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use marshal::config::EngineConfig;
use marshal::selfplay::{self, SelfPlayConfig};

fn value<T: FromStr>(args: &[String], i: usize, flag: &str) -> T {
    match args.get(i).map(|s| s.parse()) {
        Some(Ok(v)) => v,
        _ => {
            eprintln!("invalid {} value", flag);
            print_usage();
            process::exit(1);
        }
    }
}

fn parse_size(s: &str) -> Option<(usize, usize)> {
    let (w, h) = s.split_once('x')?;
    Some((w.parse().ok()?, h.parse().ok()?))
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("marshal=info,selfplay=info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let mut config = SelfPlayConfig::default();
    let mut output_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--games" => {
                i += 1;
                config.num_games = value(&args, i, "--games");
            }
            "--size" => {
                i += 1;
                let size: String = value(&args, i, "--size");
                match parse_size(&size) {
                    Some((w, h)) => {
                        config.width = w;
                        config.height = h;
                    }
                    None => {
                        eprintln!("invalid --size value: {}", size);
                        process::exit(1);
                    }
                }
            }
            "--players" => {
                i += 1;
                config.players = value(&args, i, "--players");
            }
            "--max-turns" => {
                i += 1;
                config.max_turns = value(&args, i, "--max-turns");
            }
            "--threads" => {
                i += 1;
                config.threads = value(&args, i, "--threads");
            }
            "--seed" => {
                i += 1;
                config.seed = value(&args, i, "--seed");
            }
            "--config" => {
                i += 1;
                let path: String = value(&args, i, "--config");
                config.engine = match EngineConfig::from_file(Path::new(&path)) {
                    Ok(c) => c,
                    Err(e) => {
                        eprintln!("{}: {}", path, e);
                        process::exit(1);
                    }
                };
            }
            "--output" => {
                i += 1;
                output_path = Some(value(&args, i, "--output"));
            }
            "--quiet" => {
                config.quiet = true;
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    if !config.quiet {
        info!(
            "Self-play: {} games, {}x{}, {} players, {} turns max, {} threads",
            config.num_games,
            config.width,
            config.height,
            config.players,
            config.max_turns,
            config.threads
        );
    }

    let start = Instant::now();
    let games = selfplay::run_self_play(&config);
    let elapsed = start.elapsed();

    if !config.quiet {
        info!(
            "Completed {} games in {:.1}s",
            games.len(),
            elapsed.as_secs_f64()
        );
        selfplay::print_summary(&games);
    }

    let written = match &output_path {
        Some(path) => File::create(path).and_then(|file| {
            let mut writer = BufWriter::new(file);
            selfplay::write_jsonl(&games, &mut writer)
        }),
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            selfplay::write_jsonl(&games, &mut writer)
        }
    };
    if let Err(e) = written {
        eprintln!("failed to write output: {}", e);
        process::exit(1);
    }
    if let (Some(path), false) = (&output_path, config.quiet) {
        info!("Wrote {} games to {}", games.len(), path);
    }
}

fn print_usage() {
    eprintln!("Usage: selfplay [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --games N        Number of games to play (default: 10)");
    eprintln!("  --size WxH       Map size (default: 18x18)");
    eprintln!("  --players N      Players per game (default: 2)");
    eprintln!("  --max-turns N    Turn limit before a draw (default: 1000)");
    eprintln!("  --threads N      Number of parallel threads (default: 4)");
    eprintln!("  --seed N         Random seed, 0 for entropy (default: 0)");
    eprintln!("  --config FILE    Engine tunables as JSON");
    eprintln!("  --output FILE    Output file path (default: stdout)");
    eprintln!("  --quiet          Suppress summary output");
    eprintln!("  --help           Show this help");
}
