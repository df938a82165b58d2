//! Stuck detection.
//!
//! A plan can get caught re-selecting the same no-op move forever. The
//! tracker compares each tick's checksum with the previous one and signals
//! a stall once nothing visible has changed for `threshold` consecutive
//! ticks. The counter resets after signalling, so a single idle episode
//! trips it once.

use crate::board::Board;
use crate::config::EngineConfig;

use super::territory::{Checksum, TerritoryIntel};

/// Counts consecutive ticks without visible progress.
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    previous: Option<Checksum>,
    unchanged: u32,
    threshold: u32,
}

impl ProgressTracker {
    pub fn new(threshold: u32) -> Self {
        ProgressTracker {
            previous: None,
            unchanged: 0,
            threshold,
        }
    }

    /// Records this tick's checksum. Returns true when the stall threshold is
    /// reached.
    pub fn observe(&mut self, checksum: &Checksum) -> bool {
        if self.previous.as_ref() == Some(checksum) {
            self.unchanged += 1;
        } else {
            self.unchanged = 0;
            self.previous = Some(checksum.clone());
        }

        if self.threshold > 0 && self.unchanged >= self.threshold {
            self.unchanged = 0;
            return true;
        }
        false
    }

    /// Consecutive unchanged ticks seen so far.
    pub fn unchanged(&self) -> u32 {
        self.unchanged
    }

    pub fn set_threshold(&mut self, threshold: u32) {
        self.threshold = threshold;
    }
}

/// Result of a tick's intelligence refresh.
#[derive(Debug, Clone)]
pub struct Refresh {
    pub intel: TerritoryIntel,
    /// True when the caller must flush all pending plans.
    pub stuck: bool,
}

/// Derives fresh intel and runs it through the stall detector.
pub fn refresh(board: &Board, config: &EngineConfig, tracker: &mut ProgressTracker) -> Refresh {
    let intel = TerritoryIntel::derive(board, config);
    let stuck = tracker.observe(&intel.checksum);
    Refresh { intel, stuck }
}
