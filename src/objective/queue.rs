//! The objective queue.

use std::collections::VecDeque;

use tracing::debug;

use super::{Objective, ObjectiveKind};

/// Ordered pending plans. FIFO, with front insertion for urgent objectives.
/// Never holds more than one `Reinforce` objective.
#[derive(Debug, Clone, Default)]
pub struct ObjectiveQueue {
    items: VecDeque<Objective>,
}

impl ObjectiveQueue {
    pub fn new() -> Self {
        ObjectiveQueue::default()
    }

    /// Appends an objective. Returns false if it was refused because a
    /// reinforcement is already queued.
    pub fn push_back(&mut self, objective: Objective) -> bool {
        if !self.admits(&objective) {
            return false;
        }
        debug!(%objective, len = self.items.len(), "queueing objective");
        self.items.push_back(objective);
        true
    }

    /// Inserts an objective ahead of everything else. Same refusal rule as
    /// `push_back`.
    pub fn push_front(&mut self, objective: Objective) -> bool {
        if !self.admits(&objective) {
            return false;
        }
        debug!(%objective, len = self.items.len(), "queueing urgent objective");
        self.items.push_front(objective);
        true
    }

    fn admits(&self, objective: &Objective) -> bool {
        objective.kind != ObjectiveKind::Reinforce || !self.contains_kind(ObjectiveKind::Reinforce)
    }

    pub fn front(&self) -> Option<&Objective> {
        self.items.front()
    }

    pub fn front_mut(&mut self) -> Option<&mut Objective> {
        self.items.front_mut()
    }

    pub fn pop_front(&mut self) -> Option<Objective> {
        self.items.pop_front()
    }

    /// Drops every pending plan.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains_kind(&self, kind: ObjectiveKind) -> bool {
        self.items.iter().any(|o| o.kind == kind)
    }

    /// True if the front objective is of the given kind.
    pub fn front_is(&self, kind: ObjectiveKind) -> bool {
        self.front().is_some_and(|o| o.kind == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Objective> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obj(kind: ObjectiveKind, target: usize) -> Objective {
        Objective::new(kind, target, 0)
    }

    #[test]
    fn fifo_with_front_override() {
        let mut q = ObjectiveQueue::new();
        q.push_back(obj(ObjectiveKind::City, 1));
        q.push_back(obj(ObjectiveKind::Position, 2));
        q.push_front(obj(ObjectiveKind::General, 3));
        let targets: Vec<usize> = q.iter().map(|o| o.target).collect();
        assert_eq!(targets, vec![3, 1, 2]);
        assert!(q.front_is(ObjectiveKind::General));
        assert_eq!(q.pop_front().map(|o| o.target), Some(3));
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn at_most_one_reinforcement() {
        let mut q = ObjectiveQueue::new();
        assert!(q.push_back(obj(ObjectiveKind::Reinforce, 0)));
        assert!(!q.push_front(obj(ObjectiveKind::Reinforce, 0)));
        assert!(!q.push_back(obj(ObjectiveKind::Reinforce, 5)));
        assert!(q.push_back(obj(ObjectiveKind::Position, 0)));
        let reinforcements = q
            .iter()
            .filter(|o| o.kind == ObjectiveKind::Reinforce)
            .count();
        assert_eq!(reinforcements, 1);
    }

    #[test]
    fn clear_empties_queue() {
        let mut q = ObjectiveQueue::new();
        q.push_back(obj(ObjectiveKind::City, 1));
        q.push_back(obj(ObjectiveKind::Reinforce, 0));
        q.clear();
        assert!(q.is_empty());
        assert!(q.front().is_none());
        assert!(q.push_back(obj(ObjectiveKind::Reinforce, 0)));
    }
}
