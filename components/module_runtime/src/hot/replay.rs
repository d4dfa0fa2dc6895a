//! Re-execution of the modules a walk selected.

use super::boundary::{is_refresh_boundary, should_invalidate_boundary};
use super::walk::Walk;
use super::{FullRefreshReason, HotUpdateOutcome};
use crate::graph::{DependencyMap, InverseDependencies};
use crate::runtime::ModuleRuntime;
use crate::scope::Factory;
use crate::ModuleId;
use core_types::{JsObject, Value};
use std::collections::HashSet;
use std::rc::Rc;

/// The replacement code for the edited module.
pub(super) struct NewCode {
    pub(super) id: ModuleId,
    pub(super) factory: Factory,
    pub(super) dependency_map: DependencyMap,
}

/// Replays `walk` dependency-first.
///
/// Replayed refresh boundaries whose signature changed extend the replay
/// set with their importers, provided those are boundaries themselves.
pub(super) fn apply(
    runtime: &ModuleRuntime,
    new_code: NewCode,
    inverse: &InverseDependencies,
    walk: Walk,
) -> HotUpdateOutcome {
    let changed = new_code.id;
    let Walk {
        mut order,
        mut boundaries,
    } = walk;
    order.reverse();
    tracing::debug!(changed, ?order, "replaying modules");

    let mut new_code = Some(new_code);
    let mut seen = HashSet::new();
    let mut replayed = Vec::new();
    let mut index = 0;
    while index < order.len() {
        let id = order[index];
        index += 1;
        if !seen.insert(id) {
            continue;
        }
        let Some(prev_exports) = runtime.exports_of(id) else {
            continue;
        };
        let code = if id == changed { new_code.take() } else { None };
        if run_updated_module(runtime, id, code) {
            return HotUpdateOutcome::Failed { module: id };
        }
        replayed.push(id);

        if !boundaries.contains(&id) {
            continue;
        }
        let Some(host) = runtime.refresh_host() else {
            continue;
        };
        let next_exports = runtime.exports_of(id).unwrap_or(Value::Undefined);
        let no_longer_boundary = !is_refresh_boundary(host, &next_exports);
        if !no_longer_boundary && !should_invalidate_boundary(host, &prev_exports, &next_exports) {
            continue;
        }

        let parents = inverse.parents(id);
        if parents.is_empty() {
            let reason = if no_longer_boundary {
                FullRefreshReason::NoLongerABoundary
            } else {
                FullRefreshReason::InvalidatedBoundary
            };
            runtime.request_full_refresh(reason, changed, Some(id));
            return HotUpdateOutcome::FullRefresh { reason };
        }
        for &parent in parents {
            let Some(parent_exports) = runtime.exports_of(parent) else {
                continue;
            };
            if is_refresh_boundary(host, &parent_exports) {
                boundaries.insert(parent);
                order.push(parent);
            } else {
                let reason = FullRefreshReason::InvalidatedBoundary;
                runtime.request_full_refresh(reason, changed, Some(parent));
                return HotUpdateOutcome::FullRefresh { reason };
            }
        }
    }

    HotUpdateOutcome::Applied { replayed }
}

/// Re-executes one module. Returns true if its factory failed, in which
/// case the previous exports are back in place.
fn run_updated_module(runtime: &ModuleRuntime, id: ModuleId, code: Option<NewCode>) -> bool {
    let (hot, prev_exports) = {
        let registry = runtime.inner.registry.borrow();
        let Some(record) = registry.get(id) else {
            return false;
        };
        (record.hot.clone(), record.module.exports())
    };

    if let Some(dispose) = hot.as_ref().and_then(|hot| hot.dispose_callback()) {
        if let Err(error) = dispose() {
            tracing::error!(id, %error, "Error while calling dispose handler for module");
        }
    }

    if let Some(record) = runtime.inner.registry.borrow_mut().get_mut(id) {
        if let Some(code) = code {
            record.factory = Some(code.factory);
            record.dependency_map = Some(Rc::new(code.dependency_map));
        }
        record.error = None;
        record.clear_interop();
        record.is_initialized = false;
        record.module.set_exports(JsObject::new());
    }
    if let Some(hot) = &hot {
        hot.reset();
    }

    if let Err(error) = runtime.require(id) {
        tracing::error!(id, %error, "module failed during hot update");
        if let Some(record) = runtime.inner.registry.borrow_mut().get_mut(id) {
            record.error = None;
            record.is_initialized = true;
            record.module.set_exports(prev_exports);
        }
        return true;
    }

    if let Some(accept) = hot.and_then(|hot| hot.accept_callback()) {
        if let Err(error) = accept() {
            tracing::error!(id, %error, "Error while calling accept handler for module");
        }
    }
    false
}
