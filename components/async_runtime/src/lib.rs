//! Host event loop for the module runtime.
//!
//! This crate provides the timer queue a host drives between turns of the
//! engine. The module runtime schedules its debounced hot-swap commit here.
//!
//! # Overview
//!
//! - [`EventLoop`] - Virtual-clock loop that fires due timers in order
//! - [`TimerQueue`] - Ordered, cancellable storage for pending timers
//! - [`TimerTask`] - A callback scheduled with `set_timeout`
//!
//! # Examples
//!
//! ```
//! use async_runtime::EventLoop;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let event_loop = EventLoop::new();
//! let fired = Rc::new(Cell::new(false));
//! let flag = Rc::clone(&fired);
//!
//! event_loop.set_timeout(30, move || {
//!     flag.set(true);
//!     Ok(())
//! });
//!
//! event_loop.advance_by(29).unwrap();
//! assert!(!fired.get());
//! event_loop.advance_by(1).unwrap();
//! assert!(fired.get());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod event_loop;
pub mod timer_queue;

// Re-export main types at crate root
pub use event_loop::EventLoop;
pub use timer_queue::{TimerId, TimerQueue, TimerTask};
