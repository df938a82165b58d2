//! Territory intelligence.
//!
//! Derives ownership sets, the frontline, the expansion perimeter and a
//! progress checksum from the grid each tick, and tracks the checksum across
//! ticks to detect when the bot has stalled.

pub mod progress;
pub mod territory;

pub use progress::{refresh, ProgressTracker, Refresh};
pub use territory::{is_venture_tile, Checksum, TerritoryIntel};
