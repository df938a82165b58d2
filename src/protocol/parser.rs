//! Host command parser.
//!
//! Parses incoming protocol lines from raw text into structured `Command`
//! variants that the main loop can dispatch on. JSON payloads are kept raw
//! here and decoded by the `snapshot` module.

use tracing::warn;

/// A parsed host-to-bot command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Initialize the protocol handshake.
    Bot,

    /// Synchronization ping; the bot must reply `readyok`.
    IsReady,

    /// Set an engine option: `setoption name <Name> [value <v>]`.
    SetOption { name: String, value: Option<String> },

    /// Reset per-game state.
    NewGame,

    /// Game start record (JSON).
    Start { raw: String },

    /// Per-turn snapshot (JSON); the bot must answer with one move line.
    Update { raw: String },

    /// We won the game.
    Won,

    /// We lost the game.
    Lost,

    /// Terminate the process.
    Quit,
}

/// Parses a single line of input into a `Command`.
///
/// Returns `None` for empty lines or unrecognized commands. Malformed
/// arguments for known commands also return `None` after logging a warning.
pub fn parse_command(line: &str) -> Option<Command> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }

    match tokens[0] {
        "bot" => Some(Command::Bot),
        "isready" => Some(Command::IsReady),
        "quit" => Some(Command::Quit),
        "newgame" => Some(Command::NewGame),
        "won" => Some(Command::Won),
        "lost" => Some(Command::Lost),

        "setoption" => parse_setoption(&tokens),
        "start" => payload(trimmed, "start").map(|raw| Command::Start { raw }),
        "update" => payload(trimmed, "update").map(|raw| Command::Update { raw }),

        other => {
            warn!(command = other, "unknown command");
            None
        }
    }
}

/// Parses `setoption name <Name> [value <v>]`. Names and values are
/// single tokens.
fn parse_setoption(tokens: &[&str]) -> Option<Command> {
    let (name, value) = match *tokens {
        [_, "name", name] if name != "value" => (name, None),
        [_, "name", name, "value", value] => (name, Some(value.to_string())),
        _ => {
            warn!(line = %tokens.join(" "), "malformed setoption");
            return None;
        }
    };
    Some(Command::SetOption {
        name: name.to_string(),
        value,
    })
}

/// Everything after the keyword, which may itself contain spaces.
fn payload(line: &str, keyword: &str) -> Option<String> {
    let raw = line.strip_prefix(keyword).unwrap_or("").trim();
    if raw.is_empty() {
        warn!("malformed {}: expected '{} <json>'", keyword, keyword);
        return None;
    }
    Some(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_commands() {
        assert_eq!(parse_command("bot"), Some(Command::Bot));
        assert_eq!(parse_command("isready"), Some(Command::IsReady));
        assert_eq!(parse_command("quit"), Some(Command::Quit));
        assert_eq!(parse_command("newgame"), Some(Command::NewGame));
        assert_eq!(parse_command("won"), Some(Command::Won));
        assert_eq!(parse_command("lost"), Some(Command::Lost));
    }

    #[test]
    fn parse_empty_line_returns_none() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("  "), None);
        assert_eq!(parse_command("\t"), None);
    }

    #[test]
    fn parse_unknown_command_returns_none() {
        assert_eq!(parse_command("foobar"), None);
    }

    #[test]
    fn parse_setoption_with_value() {
        let cmd = parse_command("setoption name PathLengthLimit value 12").unwrap();
        assert_eq!(
            cmd,
            Command::SetOption {
                name: "PathLengthLimit".to_string(),
                value: Some("12".to_string()),
            }
        );
    }

    #[test]
    fn parse_setoption_no_value() {
        let cmd = parse_command("setoption name AttackCities").unwrap();
        assert_eq!(
            cmd,
            Command::SetOption {
                name: "AttackCities".to_string(),
                value: None,
            }
        );
    }

    #[test]
    fn parse_setoption_malformed_returns_none() {
        assert_eq!(parse_command("setoption"), None);
        assert_eq!(parse_command("setoption foo"), None);
        assert_eq!(parse_command("setoption name value 3"), None);
        assert_eq!(parse_command("setoption name value"), None);
        assert_eq!(parse_command("setoption name Seed value"), None);
        assert_eq!(parse_command("setoption name Seed value 1 2"), None);
    }

    #[test]
    fn parse_update_keeps_json_with_spaces() {
        let line = r#"update {"turn": 3, "map_diff": [0, 4], "cities_diff": [], "generals": [-1]}"#;
        match parse_command(line) {
            Some(Command::Update { raw }) => {
                assert!(raw.starts_with('{'));
                assert!(raw.ends_with('}'));
                assert!(raw.contains("\"map_diff\": [0, 4]"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parse_start_payload() {
        let cmd = parse_command(r#"start {"playerIndex":1,"usernames":["a","b"]}"#).unwrap();
        assert_eq!(
            cmd,
            Command::Start {
                raw: r#"{"playerIndex":1,"usernames":["a","b"]}"#.to_string()
            }
        );
    }

    #[test]
    fn parse_payload_commands_require_json() {
        assert_eq!(parse_command("update"), None);
        assert_eq!(parse_command("start   "), None);
    }

    #[test]
    fn parse_with_leading_trailing_whitespace() {
        assert_eq!(parse_command("  bot  "), Some(Command::Bot));
        assert_eq!(parse_command("  isready  "), Some(Command::IsReady));
    }
}
