//! The error guard around the outermost `require`.

use crate::error::LoadError;
use crate::host::FatalErrorReporter;
use std::cell::Cell;
use std::rc::Rc;

/// Owns the single "guard active" flag.
///
/// The first non-nested guarded call activates the guard and reports any
/// error it returns; nested calls, and every call when no reporter is
/// installed, pass straight through.
pub(crate) struct ErrorGuard {
    active: Cell<bool>,
    reporter: Option<Rc<dyn FatalErrorReporter>>,
}

/// Restores the previous flag value on drop, including on unwind.
struct Activation<'a> {
    flag: &'a Cell<bool>,
    previous: bool,
}

impl<'a> Activation<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        let previous = flag.replace(true);
        Self { flag, previous }
    }
}

impl Drop for Activation<'_> {
    fn drop(&mut self) {
        self.flag.set(self.previous);
    }
}

impl ErrorGuard {
    pub(crate) fn new(reporter: Option<Rc<dyn FatalErrorReporter>>) -> Self {
        Self {
            active: Cell::new(false),
            reporter,
        }
    }

    #[cfg(test)]
    pub(crate) fn is_active(&self) -> bool {
        self.active.get()
    }

    pub(crate) fn run<T>(&self, f: impl FnOnce() -> Result<T, LoadError>) -> Result<T, LoadError> {
        let Some(reporter) = &self.reporter else {
            return f();
        };
        if self.active.get() {
            return f();
        }
        let _activation = Activation::enter(&self.active);
        let result = f();
        if let Err(error) = &result {
            reporter.report_fatal_error(error);
        }
        result
    }

    /// Runs `f` as if a guard were already active, so nothing inside it
    /// reports.
    pub(crate) fn suspend<T>(&self, f: impl FnOnce() -> T) -> T {
        let _activation = Activation::enter(&self.active);
        f()
    }
}
