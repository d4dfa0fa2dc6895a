//! What a module factory sees while it runs.

use crate::error::LoadError;
use crate::graph::DependencyMap;
use crate::registry::{HotHandle, ModuleObject};
use crate::runtime::ModuleRuntime;
use crate::ModuleId;
use core_types::{JsError, JsObject, Value};
use std::rc::Rc;

/// A compiled module body.
///
/// Factories receive a [`FactoryScope`] standing in for the
/// `(global, require, importDefault, importAll, module, exports,
/// dependencyMap)` parameters of a bundled module, and populate
/// `exports` (or replace `module.exports`).
pub type Factory = Rc<dyn Fn(&FactoryScope<'_>) -> Result<(), LoadError>>;

/// Wraps a closure as a [`Factory`].
///
/// # Examples
///
/// ```
/// use module_runtime::{factory, ModuleDefinition, ModuleRuntime};
/// use core_types::Value;
///
/// let runtime = ModuleRuntime::development();
/// runtime.define(ModuleDefinition::new(
///     1,
///     factory(|scope| {
///         scope.exports().set("answer", Value::Smi(42));
///         Ok(())
///     }),
/// ));
///
/// assert_eq!(runtime.require(1).unwrap().get("answer"), Value::Smi(42));
/// ```
pub fn factory<F>(f: F) -> Factory
where
    F: Fn(&FactoryScope<'_>) -> Result<(), LoadError> + 'static,
{
    Rc::new(f)
}

/// Arguments of a running factory.
pub struct FactoryScope<'a> {
    runtime: &'a ModuleRuntime,
    module: ModuleObject,
    exports: JsObject,
    dependency_map: Option<Rc<DependencyMap>>,
}

impl<'a> FactoryScope<'a> {
    pub(crate) fn new(
        runtime: &'a ModuleRuntime,
        module: ModuleObject,
        exports: JsObject,
        dependency_map: Option<Rc<DependencyMap>>,
    ) -> Self {
        Self {
            runtime,
            module,
            exports,
            dependency_map,
        }
    }

    /// The runtime executing this factory.
    pub fn runtime(&self) -> &ModuleRuntime {
        self.runtime
    }

    /// ID of the module being executed.
    pub fn id(&self) -> ModuleId {
        self.module.id()
    }

    /// The engine's global object.
    pub fn global(&self) -> JsObject {
        self.runtime.global()
    }

    /// `require(id)`.
    pub fn require(&self, id: ModuleId) -> Result<Value, LoadError> {
        self.runtime.require(id)
    }

    /// `importDefault(id)`.
    pub fn import_default(&self, id: ModuleId) -> Result<Value, LoadError> {
        self.runtime.import_default(id)
    }

    /// `importAll(id)`.
    pub fn import_all(&self, id: ModuleId) -> Result<Value, LoadError> {
        self.runtime.import_all(id)
    }

    /// Requires the `index`th entry of the dependency map.
    pub fn require_dependency(&self, index: usize) -> Result<Value, LoadError> {
        let id = self.dependency_id(index)?;
        self.runtime.require(id)
    }

    /// `importDefault` of the `index`th entry of the dependency map.
    pub fn import_default_dependency(&self, index: usize) -> Result<Value, LoadError> {
        let id = self.dependency_id(index)?;
        self.runtime.import_default(id)
    }

    /// The `module` object.
    pub fn module(&self) -> &ModuleObject {
        &self.module
    }

    /// The `exports` object the factory was called with.
    pub fn exports(&self) -> &JsObject {
        &self.exports
    }

    /// The dependency map, absent once released in production.
    pub fn dependency_map(&self) -> Option<&DependencyMap> {
        self.dependency_map.as_deref()
    }

    /// `module.hot`, absent in production.
    pub fn hot(&self) -> Option<HotHandle> {
        self.module.hot()
    }

    /// Registers a component type declared inside this module with the
    /// UI-refresh collaborator under `local_id`.
    pub fn register_component(&self, component: &Value, local_id: &str) {
        self.runtime.register_local_component(self.id(), component, local_id);
    }

    fn dependency_id(&self, index: usize) -> Result<ModuleId, LoadError> {
        self.dependency_map
            .as_ref()
            .and_then(|map| map.get(index))
            .ok_or_else(|| {
                JsError::reference_error(format!(
                    "module {} has no dependency at index {}",
                    self.id(),
                    index
                ))
                .into()
            })
    }
}
