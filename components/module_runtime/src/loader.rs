//! `require`: lazy, run-once execution of module factories.
//!
//! A factory runs the first time its module is required. The record is
//! marked initialized before the factory runs, so a require cycle hands the
//! second requirer the partially populated exports instead of recursing.
//! No registry borrow is held while a factory runs.

use crate::error::LoadError;
use crate::graph::DependencyMap;
use crate::hot::boundary::register_exports_for_refresh;
use crate::module_id::{unpack_module_id, PackedModuleId};
use crate::registry::ModuleObject;
use crate::runtime::ModuleRuntime;
use crate::scope::{Factory, FactoryScope};
use crate::ModuleId;
use core_types::{JsObject, StackFrame, Value};
use std::rc::Rc;

/// Everything needed to run a factory, taken out of the record.
struct Execution {
    factory: Factory,
    dependency_map: Option<Rc<DependencyMap>>,
    module: ModuleObject,
    exports: JsObject,
    name: String,
}

impl ModuleRuntime {
    /// `require(id)`: returns the module's exports, running its factory
    /// first if needed.
    ///
    /// The outermost call is guarded: when a fatal-error reporter is
    /// installed, a failure is reported to it once and still returned.
    ///
    /// # Errors
    ///
    /// [`LoadError::ModuleNotFound`] if no record exists and no segment
    /// defines one; otherwise the error the factory (or one of its
    /// dependencies) returned, which is cached and returned again on later
    /// requires.
    pub fn require(&self, id: ModuleId) -> Result<Value, LoadError> {
        if let Some(exports) = self.initialized_exports(id) {
            return Ok(exports);
        }
        self.inner.guard.run(|| self.load_module(id))
    }

    /// Like [`ModuleRuntime::require`] but never reports to the fatal-error
    /// reporter, including from requires nested inside it.
    pub fn unguarded(&self, id: ModuleId) -> Result<Value, LoadError> {
        if let Some(exports) = self.initialized_exports(id) {
            return Ok(exports);
        }
        self.inner.guard.suspend(|| self.load_module(id))
    }

    /// Requires a module by its verbose name. Development only, and only
    /// meant for debugging.
    ///
    /// # Errors
    ///
    /// [`LoadError::UnknownNamedModule`] for unregistered names and for
    /// every call in production.
    pub fn require_by_name(&self, name: &str) -> Result<Value, LoadError> {
        let id = if self.is_development() {
            self.inner.registry.borrow().id_for_name(name)
        } else {
            None
        };
        let Some(id) = id else {
            return Err(LoadError::UnknownNamedModule {
                name: name.to_string(),
            });
        };
        tracing::warn!(
            name,
            id,
            "Requiring module by name is only supported for debugging purposes and will break in production"
        );
        self.require(id)
    }

    /// Exports of `id` if its factory already ran (or is running).
    fn initialized_exports(&self, id: ModuleId) -> Option<Value> {
        if self.is_development() {
            self.check_require_cycle(id);
        }
        let registry = self.inner.registry.borrow();
        let record = registry.get(id)?;
        record.is_initialized.then(|| record.module.exports())
    }

    fn check_require_cycle(&self, id: ModuleId) {
        let cycle = self.inner.diagnostics.borrow().cycle_to(id);
        let Some(cycle) = cycle else {
            return;
        };
        let registry = self.inner.registry.borrow();
        self.inner.diagnostics.borrow_mut().report_cycle(
            &cycle,
            |frame| registry.name_of(frame),
            &self.inner.cycle_ignore,
        );
    }

    fn load_module(&self, id: ModuleId) -> Result<Value, LoadError> {
        self.materialize(id);
        let execution = self.begin_execution(id)?;
        let development = self.is_development();

        if development {
            self.inner.diagnostics.borrow_mut().push(id);
        }
        let result = {
            let span = tracing::trace_span!("require", module = %execution.name);
            let _entered = span.enter();
            let scope = FactoryScope::new(
                self,
                execution.module.clone(),
                execution.exports,
                execution.dependency_map,
            );
            (execution.factory)(&scope)
        };
        if development {
            self.inner.diagnostics.borrow_mut().pop(id);
        }

        match result {
            Ok(()) => {
                let exports = execution.module.exports();
                if development {
                    if let Some(host) = self.refresh_host() {
                        register_exports_for_refresh(host, &exports, &self.refresh_id(id));
                    }
                } else if let Some(record) = self.inner.registry.borrow_mut().get_mut(id) {
                    record.factory = None;
                    record.dependency_map = None;
                }
                Ok(exports)
            }
            Err(error) => {
                let error = match error {
                    LoadError::FactoryExecution(js_error) => {
                        let frame = StackFrame::new(Some("require"), Some(execution.name.as_str()));
                        LoadError::FactoryExecution(js_error.with_frame(frame))
                    }
                    other => other,
                };
                tracing::debug!(id, %error, "module factory failed");
                if let Some(record) = self.inner.registry.borrow_mut().get_mut(id) {
                    record.error = Some(error.clone());
                    record.is_initialized = false;
                    record.module.set_exports(Value::Undefined);
                }
                Err(error)
            }
        }
    }

    /// Gives segment definers, then the native loader, a chance to define
    /// `id`.
    fn materialize(&self, id: ModuleId) {
        if self.inner.registry.borrow().contains(id) {
            return;
        }

        let definer = self.inner.segments.borrow().definer_for(id);
        if let Some((segment_id, definer)) = definer {
            tracing::debug!(id, segment_id, "defining module from segment");
            definer(self, id);
            self.inner.segments.borrow_mut().forget(id);
            if self.inner.registry.borrow().contains(id) {
                return;
            }
        }

        if let Some(loader) = self.inner.native_loader.clone() {
            let PackedModuleId {
                segment_id,
                local_id,
            } = unpack_module_id(id);
            tracing::debug!(id, segment_id, local_id, "loading native segment");
            loader.native_require(self, local_id, segment_id);
        }
    }

    /// Marks the record initialized and takes out what the factory needs.
    fn begin_execution(&self, id: ModuleId) -> Result<Execution, LoadError> {
        let mut registry = self.inner.registry.borrow_mut();
        let record = registry
            .get_mut(id)
            .ok_or(LoadError::ModuleNotFound { id })?;
        if let Some(error) = &record.error {
            return Err(error.clone());
        }
        let factory = record
            .factory
            .clone()
            .ok_or(LoadError::ModuleNotFound { id })?;

        record.is_initialized = true;
        let exports = match record.module.exports() {
            Value::Object(exports) => exports,
            _ => {
                let exports = JsObject::new();
                record.module.set_exports(exports.clone());
                exports
            }
        };
        let name = record
            .verbose_name
            .clone()
            .unwrap_or_else(|| id.to_string());
        Ok(Execution {
            factory,
            dependency_map: record.dependency_map.clone(),
            module: record.module.clone(),
            exports,
            name,
        })
    }
}
