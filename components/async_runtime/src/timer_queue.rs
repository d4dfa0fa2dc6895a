//! Timer storage for the event loop.
//!
//! Timers fire in order of due time; timers due at the same instant fire in
//! the order they were scheduled.

use core_types::JsError;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Handle returned by `set_timeout`, used to cancel a pending timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// A callback scheduled to run once when its timer fires.
pub struct TimerTask {
    callback: Box<dyn FnOnce() -> Result<(), JsError>>,
}

impl TimerTask {
    /// Creates a new TimerTask from a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() -> Result<(), JsError> + 'static,
    {
        Self {
            callback: Box::new(f),
        }
    }

    /// Executes the task.
    pub fn run(self) -> Result<(), JsError> {
        (self.callback)()
    }
}

impl fmt::Debug for TimerTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimerTask {{ ... }}")
    }
}

/// A queue of pending timers ordered by due time.
#[derive(Debug, Default)]
pub struct TimerQueue {
    pending: BTreeMap<(u64, TimerId), TimerTask>,
    due_by_id: HashMap<TimerId, u64>,
    next_id: u64,
}

impl TimerQueue {
    /// Creates a new empty TimerQueue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `task` to fire at the absolute time `due`.
    pub fn schedule(&mut self, due: u64, task: TimerTask) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.insert((due, id), task);
        self.due_by_id.insert(id, due);
        id
    }

    /// Cancels a pending timer. Returns false if it already fired or was
    /// never scheduled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.due_by_id.remove(&id) {
            Some(due) => self.pending.remove(&(due, id)).is_some(),
            None => false,
        }
    }

    /// Removes and returns the earliest timer due at or before `deadline`.
    pub fn pop_due(&mut self, deadline: u64) -> Option<(u64, TimerTask)> {
        let (&(due, id), _) = self.pending.first_key_value()?;
        if due > deadline {
            return None;
        }
        self.due_by_id.remove(&id);
        self.pending.remove(&(due, id)).map(|task| (due, task))
    }

    /// Returns true if no timers are pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Returns the number of pending timers.
    pub fn len(&self) -> usize {
        self.pending.len()
    }
}
