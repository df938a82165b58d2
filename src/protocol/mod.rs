//! Host line protocol.
//!
//! Parses host commands, decodes the JSON records carried by `start` and
//! `update`, and encodes the move and chat lines sent back.

pub mod intent;
pub mod parser;
pub mod snapshot;

pub use intent::{format_chat, format_move, parse_move, Move};
pub use parser::{parse_command, Command};
pub use snapshot::{GameStart, Snapshot, SnapshotError};
