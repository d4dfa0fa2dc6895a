//! The hot-swap engine.
//!
//! An update of one module walks the inverse dependency graph upwards until
//! every path reaches a module that can accept it, then replays the visited
//! modules dependency-first through the loader. Anything that cannot be
//! proven safe ends in a full refresh instead.
//!
//! Phases: `Stable -> Walking -> Applying -> Stable`, or back to `Stable`
//! directly from `Walking` when the walk bails.

pub(crate) mod boundary;
mod commit;
mod manifest;
mod replay;
mod walk;

pub use manifest::UpdateManifest;

use crate::graph::{DependencyMap, InverseDependencies};
use crate::host::FullRefreshRequest;
use crate::registry::{HotHandle, ModuleRecord};
use crate::runtime::ModuleRuntime;
use crate::scope::Factory;
use crate::ModuleId;
use async_runtime::TimerId;
use std::fmt;
use std::rc::Rc;

/// New code for one module, as delivered by the transport.
pub struct HotUpdate {
    /// The edited module
    pub id: ModuleId,
    /// Its new factory
    pub factory: Factory,
    /// Its new dependency map
    pub dependency_map: DependencyMap,
    /// Importers of every module in the current graph
    pub inverse_dependencies: InverseDependencies,
}

impl HotUpdate {
    /// Creates an update of `id`.
    pub fn new(
        id: ModuleId,
        factory: Factory,
        dependency_map: DependencyMap,
        inverse_dependencies: InverseDependencies,
    ) -> Self {
        Self {
            id,
            factory,
            dependency_map,
            inverse_dependencies,
        }
    }
}

impl fmt::Debug for HotUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HotUpdate")
            .field("id", &self.id)
            .field("dependency_map", &self.dependency_map)
            .field("inverse_dependencies", &self.inverse_dependencies)
            .finish()
    }
}

/// Why an update could not be applied in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FullRefreshReason {
    /// Propagation reached a module nobody imports without finding an
    /// accepting module
    NoRootBoundary,
    /// Propagation revisited a module on its own path
    DependencyCycle,
    /// A replayed refresh boundary no longer exports only components
    NoLongerABoundary,
    /// A replayed refresh boundary changed its export signature and an
    /// importer cannot absorb that
    InvalidatedBoundary,
}

impl fmt::Display for FullRefreshReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FullRefreshReason::NoRootBoundary => "No root boundary",
            FullRefreshReason::DependencyCycle => "Dependency cycle",
            FullRefreshReason::NoLongerABoundary => "No longer a boundary",
            FullRefreshReason::InvalidatedBoundary => "Invalidated boundary",
        })
    }
}

/// What a hot update did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HotUpdateOutcome {
    /// Production build; nothing happened
    Ignored,
    /// The module had never run; its new code waits for the first require
    Deferred,
    /// Modules were re-executed in this order
    Applied {
        /// Replayed module IDs, dependency-first
        replayed: Vec<ModuleId>,
    },
    /// The update was abandoned in favour of a full refresh
    FullRefresh {
        /// Why
        reason: FullRefreshReason,
    },
    /// A replayed factory failed; its previous exports were restored
    Failed {
        /// The module whose factory failed
        module: ModuleId,
    },
}

/// Where the hot-swap engine currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HotSwapPhase {
    /// No update in progress
    #[default]
    Stable,
    /// Computing the replay set
    Walking,
    /// Re-executing modules
    Applying,
}

#[derive(Debug, Default)]
pub(crate) struct HotSwapState {
    pub(crate) phase: HotSwapPhase,
    pub(crate) pending_commit: Option<TimerId>,
}

impl ModuleRuntime {
    /// Replaces the code of a module while the application keeps running.
    ///
    /// Production builds ignore updates.
    pub fn hot_update(&self, update: HotUpdate) -> HotUpdateOutcome {
        if !self.is_development() {
            return HotUpdateOutcome::Ignored;
        }
        let HotUpdate {
            id,
            factory,
            dependency_map,
            inverse_dependencies,
        } = update;

        {
            let mut registry = self.inner.registry.borrow_mut();
            match registry.get_mut(id) {
                None => {
                    tracing::debug!(id, "hot update defines a new module");
                    let record =
                        ModuleRecord::new(id, factory, dependency_map, Some(HotHandle::new()), None);
                    registry.insert(id, record);
                    return HotUpdateOutcome::Deferred;
                }
                Some(record) if !record.is_initialized && !record.has_error() => {
                    tracing::debug!(id, "hot update of a module that has not run yet");
                    record.factory = Some(factory);
                    record.dependency_map = Some(Rc::new(dependency_map));
                    return HotUpdateOutcome::Deferred;
                }
                Some(_) => {}
            }
        }

        self.set_hot_swap_phase(HotSwapPhase::Walking);
        let walk = match walk::acceptance_walk(self, id, &inverse_dependencies) {
            Ok(walk) => walk,
            Err(bail) => {
                self.set_hot_swap_phase(HotSwapPhase::Stable);
                self.request_full_refresh(bail.reason, id, bail.failed);
                return HotUpdateOutcome::FullRefresh {
                    reason: bail.reason,
                };
            }
        };

        self.set_hot_swap_phase(HotSwapPhase::Applying);
        let outcome = replay::apply(
            self,
            replay::NewCode {
                id,
                factory,
                dependency_map,
            },
            &inverse_dependencies,
            walk,
        );
        self.set_hot_swap_phase(HotSwapPhase::Stable);

        if let HotUpdateOutcome::Applied { replayed } = &outcome {
            tracing::debug!(id, ?replayed, "hot update applied");
            self.schedule_commit();
        }
        outcome
    }

    fn set_hot_swap_phase(&self, phase: HotSwapPhase) {
        self.inner.hot.borrow_mut().phase = phase;
    }

    /// Asks the UI-refresh layer to reload everything.
    pub(crate) fn request_full_refresh(
        &self,
        reason: FullRefreshReason,
        source: ModuleId,
        failed: Option<ModuleId>,
    ) {
        let request = {
            let registry = self.inner.registry.borrow();
            FullRefreshRequest {
                reason: reason.to_string(),
                source: registry.name_of(source),
                failed: failed.and_then(|id| registry.name_of(id)),
            }
        };
        match self.refresh_host() {
            Some(host) => {
                tracing::debug!(%request, "performing full refresh");
                host.perform_full_refresh(&request);
            }
            None => tracing::warn!(%request, "full refresh required"),
        }
    }
}
