//! Unit tests for JsObject and JsFunction

use core_types::{JsError, JsFunction, JsObject, Value};

#[test]
fn test_new_object_is_empty() {
    let obj = JsObject::new();
    assert!(obj.is_empty());
    assert_eq!(obj.len(), 0);
}

#[test]
fn test_missing_key_reads_undefined() {
    let obj = JsObject::new();
    assert_eq!(obj.get("nope"), Value::Undefined);
    assert!(!obj.has_own("nope"));
}

#[test]
fn test_writes_are_visible_through_every_handle() {
    let exports = JsObject::new();
    let early_reference = Value::Object(exports.clone());

    exports.set("value", Value::Smi(7));

    assert_eq!(early_reference.get("value"), Value::Smi(7));
}

#[test]
fn test_set_replaces_getter() {
    let obj = JsObject::new();
    obj.define_getter("x", || Value::Smi(1));
    obj.set("x", Value::Smi(2));
    assert!(!obj.is_accessor("x"));
    assert_eq!(obj.get("x"), Value::Smi(2));
}

#[test]
fn test_function_call_propagates_errors() {
    let thrower = JsFunction::new("thrower", |_: &[Value]| Err(JsError::type_error("nope")));
    let err = thrower.call(&[]).unwrap_err();
    assert_eq!(err.message, "nope");
}

#[test]
fn test_function_debug_shows_name() {
    let f = JsFunction::named("Header");
    assert_eq!(format!("{:?}", f), "JsFunction(\"Header\")");
}
