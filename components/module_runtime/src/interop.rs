//! ES module interop views used by `importDefault` and `importAll`.

use crate::error::LoadError;
use crate::registry::ModuleRecord;
use crate::runtime::ModuleRuntime;
use crate::ModuleId;
use core_types::{JsObject, Value};

const ES_MODULE_FLAG: &str = "__esModule";

fn is_es_module(exports: &Value) -> bool {
    exports.get(ES_MODULE_FLAG).is_truthy()
}

/// The value `import x from '...'` binds.
pub(crate) fn default_view(exports: &Value) -> Value {
    if is_es_module(exports) {
        exports.get("default")
    } else {
        exports.clone()
    }
}

/// The value `import * as ns from '...'` binds.
///
/// CommonJS exports are copied into a fresh namespace object whose
/// `default` is the exports value itself.
pub(crate) fn namespace_view(exports: &Value) -> Value {
    if is_es_module(exports) {
        return exports.clone();
    }
    let namespace = JsObject::new();
    if let Some(object) = exports.as_object() {
        for key in object.keys() {
            namespace.set(key.as_str(), object.get(&key));
        }
    }
    namespace.set("default", exports.clone());
    Value::Object(namespace)
}

fn default_slot(record: &mut ModuleRecord) -> &mut Option<Value> {
    &mut record.imported_default
}

fn namespace_slot(record: &mut ModuleRecord) -> &mut Option<Value> {
    &mut record.imported_all
}

impl ModuleRuntime {
    /// `importDefault(id)`: requires the module and returns its default
    /// export. Memoized per module until the module is replayed.
    pub fn import_default(&self, id: ModuleId) -> Result<Value, LoadError> {
        self.import_view(id, default_slot, default_view)
    }

    /// `importAll(id)`: requires the module and returns its namespace
    /// object. Memoized per module until the module is replayed.
    pub fn import_all(&self, id: ModuleId) -> Result<Value, LoadError> {
        self.import_view(id, namespace_slot, namespace_view)
    }

    fn import_view(
        &self,
        id: ModuleId,
        slot: fn(&mut ModuleRecord) -> &mut Option<Value>,
        view: fn(&Value) -> Value,
    ) -> Result<Value, LoadError> {
        let cached = self
            .inner
            .registry
            .borrow_mut()
            .get_mut(id)
            .and_then(|record| slot(record).clone());
        if let Some(cached) = cached {
            return Ok(cached);
        }

        let exports = self.require(id)?;
        let value = view(&exports);
        if let Some(record) = self.inner.registry.borrow_mut().get_mut(id) {
            *slot(record) = Some(value.clone());
        }
        Ok(value)
    }
}
