//! Marshal -- a generals.io bot speaking a line protocol.
//!
//! This binary reads commands from stdin and writes responses to stdout.
//! Logs go to stderr; set `RUST_LOG` to change the filter.
//!
//! Usage:
//!   marshal [--config FILE]

use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process;

use tracing::{error, warn};
use tracing_subscriber::{fmt, EnvFilter};

use marshal::config::EngineConfig;
use marshal::engine::Engine;
use marshal::protocol::parser::{parse_command, Command};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("marshal=info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
}

fn load_config() -> EngineConfig {
    let args: Vec<String> = env::args().collect();
    let mut config = EngineConfig::default();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                let Some(path) = args.get(i) else {
                    eprintln!("--config requires a file path");
                    process::exit(1);
                };
                config = match EngineConfig::from_file(Path::new(path)) {
                    Ok(c) => c,
                    Err(e) => {
                        eprintln!("{}: {}", path, e);
                        process::exit(1);
                    }
                };
            }
            "--help" | "-h" => {
                eprintln!("Usage: marshal [--config FILE]");
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                process::exit(1);
            }
        }
        i += 1;
    }
    config
}

/// Runs one command. Returns false when the loop should stop.
fn dispatch<W: Write>(engine: &mut Engine, cmd: Command, out: &mut W) -> io::Result<bool> {
    match cmd {
        Command::Bot => engine.handle_bot(out)?,
        Command::IsReady => engine.handle_isready(out)?,
        Command::SetOption { name, value } => {
            if let Err(e) = engine.set_option(&name, value.as_deref()) {
                warn!(error = %e, "setoption rejected");
            }
        }
        Command::NewGame => engine.new_game(),
        Command::Start { raw } => {
            if let Err(e) = engine.handle_start(&raw) {
                warn!(error = %e, "malformed start");
            }
        }
        Command::Update { raw } => engine.handle_update(&raw, out)?,
        Command::Won => engine.handle_won(out)?,
        Command::Lost => engine.handle_lost(),
        Command::Quit => return Ok(false),
    }
    Ok(true)
}

/// Runs the protocol loop, reading commands from stdin and writing
/// responses to stdout.
fn main() {
    init_logging();
    let config = load_config();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut engine = Engine::with_config(config);

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };

        let cmd = match parse_command(&line) {
            Some(c) => c,
            None => continue,
        };

        match dispatch(&mut engine, cmd, &mut out) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                error!(error = %e, "stdout closed");
                break;
            }
        }
    }
}
