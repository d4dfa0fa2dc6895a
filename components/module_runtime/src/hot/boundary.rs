//! Refresh boundaries: modules whose exports are all component types.
//!
//! Such a module can absorb an update of itself or its dependencies by
//! re-rendering, as long as its export signature stays the same.

use crate::host::{FamilyId, RefreshHost};
use core_types::Value;

const ES_MODULE_FLAG: &str = "__esModule";

/// One element of an export signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SignatureEntry {
    /// Component family of the exports value or of one export
    Family(Option<FamilyId>),
    /// Name of an export
    Key(String),
}

/// Returns true if `exports` is a component type, or an object whose every
/// own export (ignoring `__esModule`) is a plain component-type property.
pub(crate) fn is_refresh_boundary(host: &dyn RefreshHost, exports: &Value) -> bool {
    if host.is_likely_component_type(exports) {
        return true;
    }
    let Some(object) = exports.as_object() else {
        return false;
    };
    let keys = object.keys();
    let mut all_components = true;
    for key in &keys {
        if key == ES_MODULE_FLAG {
            continue;
        }
        if object.is_accessor(key) {
            return false;
        }
        if !host.is_likely_component_type(&object.get(key)) {
            all_components = false;
        }
    }
    !keys.is_empty() && all_components
}

/// Family of `exports`, then each non-getter export's key and family.
pub(crate) fn boundary_signature(host: &dyn RefreshHost, exports: &Value) -> Vec<SignatureEntry> {
    let mut signature = vec![SignatureEntry::Family(host.family_by_type(exports))];
    let Some(object) = exports.as_object() else {
        return signature;
    };
    for key in object.keys() {
        if key == ES_MODULE_FLAG || object.is_accessor(&key) {
            continue;
        }
        let family = host.family_by_type(&object.get(&key));
        signature.push(SignatureEntry::Key(key));
        signature.push(SignatureEntry::Family(family));
    }
    signature
}

/// Returns true if replacing `prev` with `next` changes the signature.
pub(crate) fn should_invalidate_boundary(host: &dyn RefreshHost, prev: &Value, next: &Value) -> bool {
    boundary_signature(host, prev) != boundary_signature(host, next)
}

/// Registers `exports` and each non-getter export under IDs derived from
/// `module_id`, so new versions of a component join its family.
pub(crate) fn register_exports_for_refresh(host: &dyn RefreshHost, exports: &Value, module_id: &str) {
    host.register(exports, &format!("{} %exports%", module_id));
    let Some(object) = exports.as_object() else {
        return;
    };
    for key in object.keys() {
        if object.is_accessor(&key) {
            continue;
        }
        host.register(&object.get(&key), &format!("{} %exports% {}", module_id, key));
    }
}
