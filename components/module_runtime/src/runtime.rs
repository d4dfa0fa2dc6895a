//! The runtime handle: registry, definer and collaborator wiring.

use crate::config::{BuildMode, CycleIgnoreList, RuntimeConfig};
use crate::diagnostics::{Diagnostics, RequireCycleWarning};
use crate::error::{ConfigError, LoadError, SegmentError};
use crate::graph::{DependencyMap, InverseDependencies};
use crate::guard::ErrorGuard;
use crate::host::{FatalErrorReporter, NativeSegmentLoader, RefreshHost};
use crate::hot::{HotSwapPhase, HotSwapState, HotUpdate, HotUpdateOutcome};
use crate::registry::{HotHandle, ModuleRecord, Registry};
use crate::scope::Factory;
use crate::segments::SegmentResolver;
use crate::{ModuleId, SegmentId};
use async_runtime::EventLoop;
use core_types::{JsObject, Value};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

pub(crate) struct RuntimeInner {
    pub(crate) config: RuntimeConfig,
    pub(crate) cycle_ignore: CycleIgnoreList,
    pub(crate) global: JsObject,
    pub(crate) registry: RefCell<Registry>,
    pub(crate) segments: RefCell<SegmentResolver>,
    pub(crate) guard: ErrorGuard,
    pub(crate) diagnostics: RefCell<Diagnostics>,
    pub(crate) hot: RefCell<HotSwapState>,
    pub(crate) refresh: Option<Rc<dyn RefreshHost>>,
    pub(crate) native_loader: Option<Rc<dyn NativeSegmentLoader>>,
    pub(crate) event_loop: Rc<EventLoop>,
}

/// A module-loading runtime.
///
/// Cloning the handle is cheap; clones share one registry. Every method
/// takes `&self` and may be called re-entrantly from inside a running
/// factory.
///
/// # Examples
///
/// ```
/// use module_runtime::{factory, ModuleDefinition, ModuleRuntime};
/// use core_types::Value;
///
/// let runtime = ModuleRuntime::development();
/// runtime.define(
///     ModuleDefinition::new(
///         1,
///         factory(|scope| {
///             let b = scope.require_dependency(0)?;
///             scope.exports().set("value", b.get("value"));
///             Ok(())
///         }),
///     )
///     .dependencies([2]),
/// );
/// runtime.define(ModuleDefinition::new(
///     2,
///     factory(|scope| {
///         scope.exports().set("value", Value::Smi(42));
///         Ok(())
///     }),
/// ));
///
/// assert_eq!(runtime.require(1).unwrap().get("value"), Value::Smi(42));
/// ```
#[derive(Clone)]
pub struct ModuleRuntime {
    pub(crate) inner: Rc<RuntimeInner>,
}

/// Arguments of [`ModuleRuntime::define`].
pub struct ModuleDefinition {
    id: ModuleId,
    factory: Factory,
    dependency_map: DependencyMap,
    verbose_name: Option<String>,
    inverse_dependencies: Option<InverseDependencies>,
}

impl ModuleDefinition {
    /// A module with no dependencies.
    pub fn new(id: ModuleId, factory: Factory) -> Self {
        Self {
            id,
            factory,
            dependency_map: DependencyMap::default(),
            verbose_name: None,
            inverse_dependencies: None,
        }
    }

    /// Sets the dependency IDs, in import order.
    pub fn dependencies(mut self, ids: impl IntoIterator<Item = ModuleId>) -> Self {
        self.dependency_map = DependencyMap::new(ids);
        self
    }

    /// Sets the full dependency map.
    pub fn dependency_map(mut self, dependency_map: DependencyMap) -> Self {
        self.dependency_map = dependency_map;
        self
    }

    /// Sets the diagnostic name, usually the module's path.
    pub fn verbose_name(mut self, name: impl Into<String>) -> Self {
        self.verbose_name = Some(name.into());
        self
    }

    /// Marks the definition as a hot update of an existing module.
    pub fn inverse_dependencies(mut self, inverse: InverseDependencies) -> Self {
        self.inverse_dependencies = Some(inverse);
        self
    }
}

impl fmt::Debug for ModuleDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleDefinition")
            .field("id", &self.id)
            .field("dependency_map", &self.dependency_map)
            .field("verbose_name", &self.verbose_name)
            .field("is_hot_update", &self.inverse_dependencies.is_some())
            .finish()
    }
}

/// Result of [`ModuleRuntime::define`].
#[derive(Debug, Clone, PartialEq)]
pub enum DefineOutcome {
    /// A new record was created
    Defined,
    /// A record already existed; nothing changed
    AlreadyDefined,
    /// The call was a hot-update request for an existing module
    HotUpdate(HotUpdateOutcome),
}

/// Read-only view of a module record.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleSnapshot {
    /// Module ID
    pub id: ModuleId,
    /// True once the factory has run successfully (or is running)
    pub is_initialized: bool,
    /// The cached failure, if the factory failed
    pub error: Option<LoadError>,
    /// False once production released the factory
    pub has_factory: bool,
    /// Diagnostic name
    pub verbose_name: Option<String>,
    /// Current `module.exports`
    pub exports: Value,
}

impl ModuleSnapshot {
    /// Returns true if the module's factory failed.
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Builder for [`ModuleRuntime`].
#[derive(Default)]
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    refresh: Option<Rc<dyn RefreshHost>>,
    reporter: Option<Rc<dyn FatalErrorReporter>>,
    native_loader: Option<Rc<dyn NativeSegmentLoader>>,
    event_loop: Option<Rc<EventLoop>>,
    global: Option<JsObject>,
}

impl RuntimeBuilder {
    /// Uses `config` instead of the default development configuration.
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the build mode.
    pub fn mode(mut self, mode: BuildMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Installs the UI-refresh collaborator.
    pub fn refresh_host(mut self, host: Rc<dyn RefreshHost>) -> Self {
        self.refresh = Some(host);
        self
    }

    /// Installs the reporter the error guard forwards to.
    pub fn fatal_error_reporter(mut self, reporter: Rc<dyn FatalErrorReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Installs the loader for natively bundled segments.
    pub fn native_segment_loader(mut self, loader: Rc<dyn NativeSegmentLoader>) -> Self {
        self.native_loader = Some(loader);
        self
    }

    /// Schedules commits on `event_loop` instead of a private loop.
    pub fn event_loop(mut self, event_loop: Rc<EventLoop>) -> Self {
        self.event_loop = Some(event_loop);
        self
    }

    /// Uses `global` as the engine's global object.
    pub fn global(mut self, global: JsObject) -> Self {
        self.global = Some(global);
        self
    }

    /// Builds the runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidIgnorePattern`] if a require-cycle
    /// ignore pattern does not compile.
    pub fn build(self) -> Result<ModuleRuntime, ConfigError> {
        let cycle_ignore = CycleIgnoreList::compile(&self.config.require_cycle_ignore_patterns)?;
        Ok(self.assemble(cycle_ignore))
    }

    fn assemble(self, cycle_ignore: CycleIgnoreList) -> ModuleRuntime {
        tracing::debug!(mode = ?self.config.mode, "creating module runtime");
        ModuleRuntime {
            inner: Rc::new(RuntimeInner {
                cycle_ignore,
                global: self.global.unwrap_or_default(),
                registry: RefCell::new(Registry::default()),
                segments: RefCell::new(SegmentResolver::default()),
                guard: ErrorGuard::new(self.reporter),
                diagnostics: RefCell::new(Diagnostics::default()),
                hot: RefCell::new(HotSwapState::default()),
                refresh: self.refresh,
                native_loader: self.native_loader,
                event_loop: self.event_loop.unwrap_or_default(),
                config: self.config,
            }),
        }
    }
}

impl ModuleRuntime {
    /// Starts building a runtime.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::default()
    }

    /// A runtime in `mode` with no collaborators.
    pub fn new(mode: BuildMode) -> Self {
        Self::builder()
            .mode(mode)
            .assemble(CycleIgnoreList::default())
    }

    /// A development runtime with no collaborators.
    pub fn development() -> Self {
        Self::new(BuildMode::Development)
    }

    /// A production runtime with no collaborators.
    pub fn production() -> Self {
        Self::new(BuildMode::Production)
    }

    /// The configuration the runtime was built with.
    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    /// The build mode.
    pub fn mode(&self) -> BuildMode {
        self.inner.config.mode
    }

    pub(crate) fn is_development(&self) -> bool {
        self.inner.config.is_development()
    }

    /// The engine's global object.
    pub fn global(&self) -> JsObject {
        self.inner.global.clone()
    }

    /// The event loop commits are scheduled on.
    pub fn event_loop(&self) -> Rc<EventLoop> {
        Rc::clone(&self.inner.event_loop)
    }

    pub(crate) fn refresh_host(&self) -> Option<&dyn RefreshHost> {
        self.inner.refresh.as_deref()
    }

    /// Registers a module.
    ///
    /// Defining an ID that already exists is a no-op, unless the definition
    /// carries inverse dependencies in a development build: then it is a
    /// hot update of that module.
    pub fn define(&self, definition: ModuleDefinition) -> DefineOutcome {
        let ModuleDefinition {
            id,
            factory,
            dependency_map,
            verbose_name,
            inverse_dependencies,
        } = definition;

        if self.inner.registry.borrow().contains(id) {
            return match inverse_dependencies {
                Some(inverse_dependencies) if self.is_development() => {
                    DefineOutcome::HotUpdate(self.hot_update(HotUpdate {
                        id,
                        factory,
                        dependency_map,
                        inverse_dependencies,
                    }))
                }
                _ => DefineOutcome::AlreadyDefined,
            };
        }

        let (hot, verbose_name) = if self.is_development() {
            (Some(HotHandle::new()), verbose_name)
        } else {
            (None, None)
        };
        tracing::debug!(id, name = ?verbose_name, "defining module");
        let record = ModuleRecord::new(id, factory, dependency_map, hot, verbose_name);
        self.inner.registry.borrow_mut().insert(id, record);
        DefineOutcome::Defined
    }

    /// Registers the definer of a lazily loaded segment.
    ///
    /// The main segment (0) takes no module list; its definer is the
    /// fallback for every unowned ID. Other segments must list the module
    /// IDs they own.
    pub fn register_segment<F>(
        &self,
        segment_id: SegmentId,
        definer: F,
        module_ids: Option<&[ModuleId]>,
    ) -> Result<(), SegmentError>
    where
        F: Fn(&ModuleRuntime, ModuleId) + 'static,
    {
        let registry = self.inner.registry.borrow();
        let result = self.inner.segments.borrow_mut().register(
            segment_id,
            Rc::new(definer),
            module_ids,
            |id| registry.contains(id),
        );
        if result.is_ok() {
            tracing::debug!(segment_id, modules = module_ids.map_or(0, <[_]>::len), "registered segment");
        }
        result
    }

    /// Segment that will define `id` on first require, if one claimed it.
    pub fn segment_owner(&self, id: ModuleId) -> Option<SegmentId> {
        self.inner.segments.borrow().owner_of(id)
    }

    /// IDs of every defined module, ascending.
    pub fn module_ids(&self) -> Vec<ModuleId> {
        self.inner.registry.borrow().ids()
    }

    /// Returns true if `id` has a record.
    pub fn is_defined(&self, id: ModuleId) -> bool {
        self.inner.registry.borrow().contains(id)
    }

    /// A snapshot of the record for `id`.
    pub fn inspect(&self, id: ModuleId) -> Option<ModuleSnapshot> {
        let registry = self.inner.registry.borrow();
        let record = registry.get(id)?;
        Some(ModuleSnapshot {
            id,
            is_initialized: record.is_initialized,
            error: record.error.clone(),
            has_factory: record.factory.is_some(),
            verbose_name: record.verbose_name.clone(),
            exports: record.module.exports(),
        })
    }

    /// Current `module.exports` of `id`, without executing anything.
    pub fn exports_of(&self, id: ModuleId) -> Option<Value> {
        let registry = self.inner.registry.borrow();
        registry.get(id).map(|record| record.module.exports())
    }

    /// Require cycles reported so far.
    pub fn require_cycle_warnings(&self) -> Vec<RequireCycleWarning> {
        self.inner.diagnostics.borrow().warnings().to_vec()
    }

    /// Where the hot-swap engine currently is.
    pub fn hot_swap_phase(&self) -> HotSwapPhase {
        self.inner.hot.borrow().phase
    }

    /// Returns true if a commit to the UI-refresh layer is scheduled.
    pub fn has_pending_commit(&self) -> bool {
        self.inner.hot.borrow().pending_commit.is_some()
    }

    /// Discards every record, verbose name, segment definer and reported
    /// cycle, and cancels a pending commit. Used at a full reload.
    pub fn clear(&self) {
        tracing::debug!("clearing module registry");
        self.inner.registry.borrow_mut().clear();
        self.inner.segments.borrow_mut().clear();
        self.inner.diagnostics.borrow_mut().clear();
        self.cancel_pending_commit();
    }

    /// ID under which module `id` registers with the UI-refresh layer.
    pub(crate) fn refresh_id(&self, id: ModuleId) -> String {
        let prefix = &self.inner.config.global_prefix;
        if prefix.is_empty() {
            id.to_string()
        } else {
            format!("{} {}", prefix, id)
        }
    }

    pub(crate) fn register_local_component(&self, id: ModuleId, component: &Value, local_id: &str) {
        if !self.is_development() {
            return;
        }
        if let Some(host) = self.refresh_host() {
            host.register(component, &format!("{} {}", self.refresh_id(id), local_id));
        }
    }
}

impl fmt::Debug for ModuleRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRuntime")
            .field("mode", &self.inner.config.mode)
            .field("modules", &self.inner.registry.borrow().ids().len())
            .field("phase", &self.inner.hot.borrow().phase)
            .finish()
    }
}
