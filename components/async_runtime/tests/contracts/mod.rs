//! Contract tests for async_runtime component
//!
//! These tests pin the surface the module runtime relies on when it
//! schedules its debounced commit.

use async_runtime::{EventLoop, TimerId, TimerQueue, TimerTask};
use std::rc::Rc;

mod event_loop_contract {
    use super::*;

    #[test]
    fn event_loop_is_shareable_behind_rc() {
        let event_loop: Rc<EventLoop> = Rc::new(EventLoop::new());
        let handle = Rc::clone(&event_loop);
        let _id: TimerId = handle.set_timeout(1, || Ok(()));
        assert_eq!(event_loop.pending_timers(), 1);
    }

    #[test]
    fn reschedule_pattern_leaves_single_timer() {
        let event_loop = EventLoop::new();
        let first = event_loop.set_timeout(30, || Ok(()));
        event_loop.advance_by(10).unwrap();
        assert!(event_loop.clear_timeout(first));
        event_loop.set_timeout(30, || Ok(()));
        assert_eq!(event_loop.pending_timers(), 1);
    }
}

mod timer_queue_contract {
    use super::*;

    #[test]
    fn timer_queue_new_is_empty() {
        let queue = TimerQueue::new();
        assert!(queue.is_empty());
    }

    #[test]
    fn timer_task_runs_its_closure() {
        let task = TimerTask::new(|| Ok(()));
        assert!(task.run().is_ok());
    }
}
