//! Outbound intents and their wire encoding.

use std::fmt;

/// A chosen move: send armies from one tile to an adjacent one, optionally
/// only half of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: usize,
    pub to: usize,
    pub split_half: bool,
}

impl Move {
    pub fn new(from: usize, to: usize) -> Self {
        Move {
            from,
            to,
            split_half: false,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "move {} {}", self.from, self.to)?;
        if self.split_half {
            f.write_str(" half")?;
        }
        Ok(())
    }
}

/// The reply line for an update: a move, or `pass` when there is none.
pub fn format_move(mv: Option<Move>) -> String {
    match mv {
        Some(m) => m.to_string(),
        None => "pass".to_string(),
    }
}

/// A chat line.
pub fn format_chat(text: &str) -> String {
    format!("chat {}", text)
}

/// Parses a `move <from> <to> [half]` reply line.
pub fn parse_move(line: &str) -> Option<Move> {
    let mut tokens = line.split_whitespace();
    if tokens.next()? != "move" {
        return None;
    }
    let from = tokens.next()?.parse().ok()?;
    let to = tokens.next()?.parse().ok()?;
    let split_half = match tokens.next() {
        None => false,
        Some("half") => true,
        Some(_) => return None,
    };
    Some(Move {
        from,
        to,
        split_half,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_moves_and_pass() {
        assert_eq!(format_move(Some(Move::new(3, 4))), "move 3 4");
        let half = Move {
            from: 10,
            to: 5,
            split_half: true,
        };
        assert_eq!(format_move(Some(half)), "move 10 5 half");
        assert_eq!(format_move(None), "pass");
        assert_eq!(format_chat("I WIN!"), "chat I WIN!");
    }

    #[test]
    fn parses_reply_lines() {
        assert_eq!(parse_move("move 3 4"), Some(Move::new(3, 4)));
        assert_eq!(parse_move("move 3 4 half").map(|m| m.split_half), Some(true));
        assert_eq!(parse_move("pass"), None);
        assert_eq!(parse_move("move 3"), None);
        assert_eq!(parse_move("move 3 4 all"), None);
    }
}
