//! Debounced commit of applied updates to the UI-refresh layer.

use crate::runtime::ModuleRuntime;
use std::rc::Rc;

impl ModuleRuntime {
    /// Schedules `perform_react_refresh`, replacing a commit that has not
    /// fired yet.
    pub(crate) fn schedule_commit(&self) {
        if self.inner.refresh.is_none() {
            return;
        }
        self.cancel_pending_commit();

        let inner = Rc::downgrade(&self.inner);
        let delay = self.inner.config.commit_debounce_ms;
        let timer = self.inner.event_loop.set_timeout(delay, move || {
            let Some(inner) = inner.upgrade() else {
                return Ok(());
            };
            inner.hot.borrow_mut().pending_commit = None;
            if let Some(host) = inner.refresh.clone() {
                tracing::debug!("committing hot update");
                host.perform_react_refresh();
            }
            Ok(())
        });
        self.inner.hot.borrow_mut().pending_commit = Some(timer);
    }

    pub(crate) fn cancel_pending_commit(&self) {
        let pending = self.inner.hot.borrow_mut().pending_commit.take();
        if let Some(timer) = pending {
            self.inner.event_loop.clear_timeout(timer);
        }
    }
}
