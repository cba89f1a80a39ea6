//! Per-node pending state transitions.
//!
//! Nodes that can receive external updates (the root fiber) carry an
//! [`UpdateQueue`]. Enqueued updates accumulate in FIFO order and are drained
//! once, during the begin phase, by folding them through [`process`] from the
//! last committed state. With literal replacement actions the fold is
//! observably identical to a single-slot last-write-wins queue; the FIFO keeps
//! transform actions composable when several updates land before a pass runs.

use std::collections::VecDeque;
use std::fmt;

/// A state transition: either a literal replacement or a pure transform over
/// the previous state.
pub enum Action<S> {
    /// Replace the state with this value.
    Replace(S),
    /// Derive the next state from the previous one. Must not observe anything
    /// beyond its argument.
    Transform(Box<dyn Fn(&S) -> S>),
}

impl<S: fmt::Debug> fmt::Debug for Action<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Replace(value) => f.debug_tuple("Replace").field(value).finish(),
            Action::Transform(_) => f.write_str("Transform(..)"),
        }
    }
}

/// A single pending update.
#[derive(Debug)]
pub struct Update<S> {
    /// The transition to apply.
    pub action: Action<S>,
}

impl<S> Update<S> {
    /// Wraps an action.
    pub fn new(action: Action<S>) -> Self {
        Update { action }
    }

    /// A literal replacement update.
    pub fn replace(value: S) -> Self {
        Update::new(Action::Replace(value))
    }

    /// A transform update.
    pub fn transform(f: impl Fn(&S) -> S + 'static) -> Self {
        Update::new(Action::Transform(Box::new(f)))
    }
}

/// Computes the state an update resolves to.
///
/// No pending update leaves the base state unchanged. Pure: the base is never
/// mutated in place.
pub fn process<S: Clone>(base: S, pending: Option<&Update<S>>) -> S {
    match pending {
        None => base,
        Some(update) => match &update.action {
            Action::Replace(value) => value.clone(),
            Action::Transform(f) => f(&base),
        },
    }
}

/// FIFO holder of updates pending for one node.
#[derive(Default)]
pub struct UpdateQueue<S> {
    pending: VecDeque<Update<S>>,
}

impl<S> UpdateQueue<S> {
    /// An empty queue.
    pub fn new() -> Self {
        UpdateQueue {
            pending: VecDeque::new(),
        }
    }

    /// Appends an update. Earlier updates stay queued and fold first.
    pub fn enqueue(&mut self, update: Update<S>) {
        self.pending.push_back(update);
    }

    /// Whether anything is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drains every pending update, folding each through [`process`] in
    /// arrival order. Updates enqueued after the drain are invisible to the
    /// caller's pass.
    pub fn consume(&mut self, base: S) -> S
    where
        S: Clone,
    {
        let mut state = base;
        for update in self.pending.drain(..) {
            state = process(state, Some(&update));
        }
        state
    }
}

impl<S> fmt::Debug for UpdateQueue<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateQueue")
            .field("pending", &self.pending.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_resolves_literal_transform_and_absent() {
        assert_eq!(process(5, Some(&Update::replace(10))), 10);
        assert_eq!(process(5, Some(&Update::transform(|n: &i32| n + 1))), 6);
        assert_eq!(process(5, None), 5);
    }

    #[test]
    fn process_leaves_base_untouched() {
        let base = vec![1, 2, 3];
        let next = process(base.clone(), Some(&Update::transform(|v: &Vec<i32>| {
            let mut v = v.clone();
            v.push(4);
            v
        })));
        assert_eq!(base, vec![1, 2, 3]);
        assert_eq!(next, vec![1, 2, 3, 4]);
    }

    #[test]
    fn consume_folds_in_arrival_order() {
        let mut queue = UpdateQueue::new();
        queue.enqueue(Update::replace(1));
        queue.enqueue(Update::transform(|n: &i32| n * 10));
        assert_eq!(queue.consume(0), 10);
        assert!(queue.is_empty());
    }

    #[test]
    fn later_literal_supersedes_earlier_one() {
        // Two literal replacements resolve exactly as if only the second had
        // been enqueued.
        let mut queue = UpdateQueue::new();
        queue.enqueue(Update::replace(7));
        queue.enqueue(Update::replace(42));
        let folded = queue.consume(0);
        assert_eq!(folded, process(0, Some(&Update::replace(42))));
    }

    #[test]
    fn consume_on_empty_queue_returns_base() {
        let mut queue: UpdateQueue<i32> = UpdateQueue::new();
        assert_eq!(queue.consume(9), 9);
    }
}
