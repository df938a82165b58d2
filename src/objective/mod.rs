//! Objectives: queued multi-step plans toward a target tile.
//!
//! Each objective walks `Pending -> Active(path) -> Complete`. The queue is
//! FIFO with front insertion for urgent plans and holds at most one
//! reinforcement at a time.

pub mod queue;

use std::collections::VecDeque;
use std::fmt;

pub use queue::ObjectiveQueue;

/// What an objective is trying to achieve at its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectiveKind {
    /// Capture an enemy general.
    General,
    /// Capture a city.
    City,
    /// Move armies onto a tile.
    Position,
    /// Pile armies onto our own general.
    Reinforce,
}

impl fmt::Display for ObjectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ObjectiveKind::General => "general",
            ObjectiveKind::City => "city",
            ObjectiveKind::Position => "position",
            ObjectiveKind::Reinforce => "reinforce",
        };
        f.write_str(s)
    }
}

/// Lifecycle of an objective.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectiveState {
    /// No path searched yet.
    Pending,
    /// Remaining steps toward the target, excluding the current tile.
    Active(VecDeque<usize>),
    /// The final step was issued; resolved on the following tick.
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Objective {
    pub kind: ObjectiveKind,
    pub target: usize,
    pub source: Option<usize>,
    pub state: ObjectiveState,
    /// Set once the objective has been announced as the current plan.
    pub started: bool,
    pub tick_created: u32,
}

impl Objective {
    /// A fresh objective whose path has not been searched yet.
    pub fn new(kind: ObjectiveKind, target: usize, tick_created: u32) -> Self {
        Objective {
            kind,
            target,
            source: None,
            state: ObjectiveState::Pending,
            started: false,
            tick_created,
        }
    }

    /// An objective with a path already planned from `source`.
    pub fn with_path(
        kind: ObjectiveKind,
        target: usize,
        source: usize,
        path: Vec<usize>,
        tick_created: u32,
    ) -> Self {
        Objective {
            kind,
            target,
            source: Some(source),
            state: ObjectiveState::Active(path.into()),
            started: false,
            tick_created,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state == ObjectiveState::Pending
    }

    pub fn is_complete(&self) -> bool {
        self.state == ObjectiveState::Complete
    }

    /// True while the objective can still produce a step: unsearched, or
    /// with path left to walk.
    pub fn is_usable(&self) -> bool {
        match &self.state {
            ObjectiveState::Pending => true,
            ObjectiveState::Active(path) => !path.is_empty(),
            ObjectiveState::Complete => false,
        }
    }

    /// The fresh objective to queue when this one completed without its
    /// target being captured.
    pub fn renewed(&self, tick: u32) -> Self {
        let mut next = Objective::new(self.kind, self.target, tick);
        next.started = true;
        next
    }

    /// Replaces the path, returning the objective to `Active`.
    pub fn set_path(&mut self, source: usize, path: Vec<usize>) {
        self.source = Some(source);
        self.state = ObjectiveState::Active(path.into());
    }

    /// Takes the next step off the path.
    pub fn pop_step(&mut self) -> Option<usize> {
        match &mut self.state {
            ObjectiveState::Active(path) => path.pop_front(),
            _ => None,
        }
    }

    /// Peeks at the next step without consuming it.
    pub fn peek_step(&self) -> Option<usize> {
        match &self.state {
            ObjectiveState::Active(path) => path.front().copied(),
            _ => None,
        }
    }

    pub fn remaining(&self) -> usize {
        match &self.state {
            ObjectiveState::Active(path) => path.len(),
            _ => 0,
        }
    }

    pub fn mark_complete(&mut self) {
        self.state = ObjectiveState::Complete;
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} objective at {}", self.kind, self.target)
    }
}
