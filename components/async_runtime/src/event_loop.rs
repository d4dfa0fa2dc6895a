//! Event loop implementation.
//!
//! This module provides the loop a host drives to fire timers. Time is
//! virtual: it only moves when the host calls [`EventLoop::advance_by`] or
//! [`EventLoop::run_until_idle`], which keeps debounce behaviour
//! deterministic.

use crate::timer_queue::{TimerId, TimerQueue, TimerTask};
use core_types::JsError;
use std::cell::{Cell, RefCell};

/// The host event loop.
///
/// All methods take `&self` so the loop can be shared (usually behind an
/// `Rc`) between the host and the runtimes that schedule work on it. Timer
/// callbacks may schedule or cancel further timers while the loop is
/// running.
///
/// # Examples
///
/// ```
/// use async_runtime::EventLoop;
///
/// let event_loop = EventLoop::new();
/// let id = event_loop.set_timeout(10, || Ok(()));
/// assert!(event_loop.clear_timeout(id));
/// assert_eq!(event_loop.run_until_idle().unwrap(), 0);
/// ```
#[derive(Debug, Default)]
pub struct EventLoop {
    timers: RefCell<TimerQueue>,
    now: Cell<u64>,
}

impl EventLoop {
    /// Creates a new EventLoop at time zero with no timers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.now.get()
    }

    /// Schedules `f` to run once `delay_ms` milliseconds from now.
    pub fn set_timeout<F>(&self, delay_ms: u64, f: F) -> TimerId
    where
        F: FnOnce() -> Result<(), JsError> + 'static,
    {
        let due = self.now.get().saturating_add(delay_ms);
        self.timers.borrow_mut().schedule(due, TimerTask::new(f))
    }

    /// Cancels a pending timer. Returns false if it already fired.
    pub fn clear_timeout(&self, id: TimerId) -> bool {
        self.timers.borrow_mut().cancel(id)
    }

    /// Returns the number of pending timers.
    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Returns true if no timers are pending.
    pub fn is_idle(&self) -> bool {
        self.timers.borrow().is_empty()
    }

    /// Moves time forward by `ms`, firing every timer that becomes due.
    ///
    /// Timers scheduled by a callback fire in the same call if they fall due
    /// before the new time. Returns the number of timers fired, or the first
    /// callback error (time then stays at that timer's due time).
    pub fn advance_by(&self, ms: u64) -> Result<usize, JsError> {
        let deadline = self.now.get().saturating_add(ms);
        let fired = self.fire_due(deadline)?;
        self.now.set(deadline);
        Ok(fired)
    }

    /// Fires timers in due order until none remain, jumping time forward.
    pub fn run_until_idle(&self) -> Result<usize, JsError> {
        self.fire_due(u64::MAX)
    }

    fn fire_due(&self, deadline: u64) -> Result<usize, JsError> {
        let mut fired = 0;
        loop {
            // The queue borrow must end before the callback runs.
            let next = self.timers.borrow_mut().pop_due(deadline);
            let Some((due, task)) = next else {
                return Ok(fired);
            };
            self.now.set(due.max(self.now.get()));
            tracing::trace!(due, "firing timer");
            task.run()?;
            fired += 1;
        }
    }
}
