//! The module registry: one record per defined module ID.

use crate::error::LoadError;
use crate::graph::DependencyMap;
use crate::scope::Factory;
use crate::ModuleId;
use core_types::{JsError, JsObject, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Callback registered through [`HotHandle::accept_with`] or
/// [`HotHandle::dispose`].
pub type HotCallback = Rc<dyn Fn() -> Result<(), JsError>>;

#[derive(Default)]
struct HotState {
    did_accept: bool,
    accept_callback: Option<HotCallback>,
    dispose_callback: Option<HotCallback>,
}

/// The `module.hot` object a factory uses to opt into hot updates.
///
/// Only present in development builds.
#[derive(Clone, Default)]
pub struct HotHandle(Rc<RefCell<HotState>>);

impl HotHandle {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Marks the module as able to accept updates of itself and its
    /// dependencies.
    pub fn accept(&self) {
        let mut state = self.0.borrow_mut();
        state.did_accept = true;
        state.accept_callback = None;
    }

    /// Like [`HotHandle::accept`], running `callback` after each successful
    /// replay of this module.
    pub fn accept_with<F>(&self, callback: F)
    where
        F: Fn() -> Result<(), JsError> + 'static,
    {
        let mut state = self.0.borrow_mut();
        state.did_accept = true;
        state.accept_callback = Some(Rc::new(callback));
    }

    /// Registers `callback` to run before this module is replaced.
    pub fn dispose<F>(&self, callback: F)
    where
        F: Fn() -> Result<(), JsError> + 'static,
    {
        self.0.borrow_mut().dispose_callback = Some(Rc::new(callback));
    }

    /// Returns true if the current code called `accept`.
    pub fn did_accept(&self) -> bool {
        self.0.borrow().did_accept
    }

    pub(crate) fn accept_callback(&self) -> Option<HotCallback> {
        self.0.borrow().accept_callback.clone()
    }

    pub(crate) fn dispose_callback(&self) -> Option<HotCallback> {
        self.0.borrow().dispose_callback.clone()
    }

    pub(crate) fn reset(&self) {
        *self.0.borrow_mut() = HotState::default();
    }
}

impl fmt::Debug for HotHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.0.borrow();
        f.debug_struct("HotHandle")
            .field("did_accept", &state.did_accept)
            .field("has_accept_callback", &state.accept_callback.is_some())
            .field("has_dispose_callback", &state.dispose_callback.is_some())
            .finish()
    }
}

struct ModuleData {
    id: ModuleId,
    exports: Value,
    hot: Option<HotHandle>,
}

/// The `module` object handed to a factory.
///
/// Shared between the record and the running factory, so a factory that
/// replaces `module.exports` is observed by the loader.
#[derive(Clone)]
pub struct ModuleObject(Rc<RefCell<ModuleData>>);

impl ModuleObject {
    pub(crate) fn new(id: ModuleId, hot: Option<HotHandle>) -> Self {
        Self(Rc::new(RefCell::new(ModuleData {
            id,
            exports: Value::Object(JsObject::new()),
            hot,
        })))
    }

    /// The module's ID.
    pub fn id(&self) -> ModuleId {
        self.0.borrow().id
    }

    /// Current `module.exports`.
    pub fn exports(&self) -> Value {
        self.0.borrow().exports.clone()
    }

    /// Replaces `module.exports`.
    pub fn set_exports(&self, exports: impl Into<Value>) {
        self.0.borrow_mut().exports = exports.into();
    }

    /// `module.hot`, absent in production.
    pub fn hot(&self) -> Option<HotHandle> {
        self.0.borrow().hot.clone()
    }
}

impl fmt::Debug for ModuleObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        f.debug_struct("ModuleObject")
            .field("id", &data.id)
            .field("exports", &data.exports)
            .finish()
    }
}

/// State kept for one module ID.
pub(crate) struct ModuleRecord {
    pub(crate) factory: Option<Factory>,
    pub(crate) dependency_map: Option<Rc<DependencyMap>>,
    pub(crate) module: ModuleObject,
    pub(crate) is_initialized: bool,
    pub(crate) error: Option<LoadError>,
    pub(crate) imported_default: Option<Value>,
    pub(crate) imported_all: Option<Value>,
    pub(crate) hot: Option<HotHandle>,
    pub(crate) verbose_name: Option<String>,
}

impl ModuleRecord {
    pub(crate) fn new(
        id: ModuleId,
        factory: Factory,
        dependency_map: DependencyMap,
        hot: Option<HotHandle>,
        verbose_name: Option<String>,
    ) -> Self {
        Self {
            factory: Some(factory),
            dependency_map: Some(Rc::new(dependency_map)),
            module: ModuleObject::new(id, hot.clone()),
            is_initialized: false,
            error: None,
            imported_default: None,
            imported_all: None,
            hot,
            verbose_name,
        }
    }

    pub(crate) fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub(crate) fn clear_interop(&mut self) {
        self.imported_default = None;
        self.imported_all = None;
    }
}

/// Arena of module records indexed by module ID.
#[derive(Default)]
pub(crate) struct Registry {
    modules: HashMap<ModuleId, ModuleRecord>,
    verbose_names: HashMap<String, ModuleId>,
}

impl Registry {
    pub(crate) fn contains(&self, id: ModuleId) -> bool {
        self.modules.contains_key(&id)
    }

    pub(crate) fn get(&self, id: ModuleId) -> Option<&ModuleRecord> {
        self.modules.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ModuleId) -> Option<&mut ModuleRecord> {
        self.modules.get_mut(&id)
    }

    /// Stores a new record. Callers check [`Registry::contains`] first.
    pub(crate) fn insert(&mut self, id: ModuleId, record: ModuleRecord) {
        if let Some(name) = &record.verbose_name {
            self.verbose_names.insert(name.clone(), id);
        }
        self.modules.insert(id, record);
    }

    pub(crate) fn id_for_name(&self, name: &str) -> Option<ModuleId> {
        self.verbose_names.get(name).copied()
    }

    /// Verbose name of `id`, if one was recorded.
    pub(crate) fn name_of(&self, id: ModuleId) -> Option<String> {
        self.modules.get(&id)?.verbose_name.clone()
    }

    pub(crate) fn ids(&self) -> Vec<ModuleId> {
        let mut ids: Vec<_> = self.modules.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub(crate) fn clear(&mut self) {
        self.modules.clear();
        self.verbose_names.clear();
    }
}
