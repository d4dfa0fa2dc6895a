//! Upward propagation from the edited module to accepting modules.

use super::boundary::is_refresh_boundary;
use super::FullRefreshReason;
use crate::graph::InverseDependencies;
use crate::runtime::ModuleRuntime;
use crate::ModuleId;
use std::collections::HashSet;

/// Modules to replay and which of them were accepted as refresh boundaries.
#[derive(Debug, Default)]
pub(super) struct Walk {
    /// Post-order: importers before the modules they import
    pub(super) order: Vec<ModuleId>,
    pub(super) boundaries: HashSet<ModuleId>,
}

/// Why the walk gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Bail {
    pub(super) reason: FullRefreshReason,
    pub(super) failed: Option<ModuleId>,
}

struct Walker<'a> {
    runtime: &'a ModuleRuntime,
    inverse: &'a InverseDependencies,
    visited: HashSet<ModuleId>,
    stack: HashSet<ModuleId>,
    walk: Walk,
}

/// Walks importers of `changed` until every path ends at a module that can
/// accept the update.
pub(super) fn acceptance_walk(
    runtime: &ModuleRuntime,
    changed: ModuleId,
    inverse: &InverseDependencies,
) -> Result<Walk, Bail> {
    let mut walker = Walker {
        runtime,
        inverse,
        visited: HashSet::new(),
        stack: HashSet::new(),
        walk: Walk::default(),
    };
    walker.visit(changed)?;
    Ok(walker.walk)
}

impl Walker<'_> {
    fn visit(&mut self, id: ModuleId) -> Result<(), Bail> {
        if self.stack.contains(&id) {
            return Err(Bail {
                reason: FullRefreshReason::DependencyCycle,
                failed: None,
            });
        }
        if !self.visited.insert(id) {
            return Ok(());
        }
        // Importers that were never defined have nothing to replay.
        let Some(can_accept) = self.can_accept(id) else {
            return Ok(());
        };

        self.stack.insert(id);
        if !can_accept {
            let inverse = self.inverse;
            let parents = inverse.parents(id);
            if parents.is_empty() {
                return Err(Bail {
                    reason: FullRefreshReason::NoRootBoundary,
                    failed: Some(id),
                });
            }
            for &parent in parents {
                self.visit(parent)?;
            }
        }
        self.stack.remove(&id);
        self.walk.order.push(id);
        Ok(())
    }

    /// `None` when `id` has no record.
    fn can_accept(&mut self, id: ModuleId) -> Option<bool> {
        let (did_accept, exports) = {
            let registry = self.runtime.inner.registry.borrow();
            let record = registry.get(id)?;
            let did_accept = record.hot.as_ref().is_some_and(|hot| hot.did_accept());
            (did_accept, record.module.exports())
        };
        if did_accept {
            return Some(true);
        }
        let is_boundary = self
            .runtime
            .refresh_host()
            .is_some_and(|host| is_refresh_boundary(host, &exports));
        if is_boundary {
            self.walk.boundaries.insert(id);
        }
        Some(is_boundary)
    }
}
