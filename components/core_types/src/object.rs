//! Heap objects and functions with reference identity.
//!
//! Objects are shared, mutable property bags. Cloning a [`JsObject`] clones the
//! reference, not the contents, so a module's `exports` object can be handed
//! out before its factory finishes populating it and every holder observes
//! later writes.

use crate::{JsError, Value};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A getter installed with [`JsObject::define_getter`].
pub type Getter = Rc<dyn Fn() -> Value>;

/// Native body of a [`JsFunction`].
pub type NativeFn = Rc<dyn Fn(&[Value]) -> Result<Value, JsError>>;

/// A single own property of an object.
#[derive(Clone)]
pub enum Property {
    /// Plain data property
    Data(Value),
    /// Accessor property; the getter runs on every read
    Accessor(Getter),
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Property::Data(value) => f.debug_tuple("Data").field(value).finish(),
            Property::Accessor(_) => write!(f, "Accessor(...)"),
        }
    }
}

/// A mutable object with reference identity.
///
/// Keys keep insertion order, matching `for...in` enumeration of own string
/// keys.
///
/// # Examples
///
/// ```
/// use core_types::{JsObject, Value};
///
/// let a = JsObject::new();
/// let b = a.clone();
/// b.set("x", Value::Smi(1));
///
/// assert_eq!(a.get("x"), Value::Smi(1));
/// assert!(a.ptr_eq(&b));
/// assert!(!a.ptr_eq(&JsObject::new()));
/// ```
#[derive(Clone, Default)]
pub struct JsObject(Rc<RefCell<IndexMap<String, Property>>>);

impl JsObject {
    /// Creates a new empty object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a property, running its getter if it is an accessor.
    ///
    /// Missing keys read as `undefined`.
    pub fn get(&self, key: &str) -> Value {
        let property = self.0.borrow().get(key).cloned();
        match property {
            Some(Property::Data(value)) => value,
            // The borrow is released before the getter runs so it may read
            // this object again.
            Some(Property::Accessor(getter)) => getter(),
            None => Value::Undefined,
        }
    }

    /// Writes a data property, replacing any existing property under `key`.
    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.0.borrow_mut().insert(key.into(), Property::Data(value));
    }

    /// Installs an accessor property.
    pub fn define_getter<F>(&self, key: impl Into<String>, getter: F)
    where
        F: Fn() -> Value + 'static,
    {
        self.0
            .borrow_mut()
            .insert(key.into(), Property::Accessor(Rc::new(getter)));
    }

    /// Removes a property, returning whether it existed.
    pub fn delete(&self, key: &str) -> bool {
        self.0.borrow_mut().shift_remove(key).is_some()
    }

    /// Returns true if the object has an own property named `key`.
    pub fn has_own(&self, key: &str) -> bool {
        self.0.borrow().contains_key(key)
    }

    /// Returns true if `key` is an accessor property.
    pub fn is_accessor(&self, key: &str) -> bool {
        matches!(self.0.borrow().get(key), Some(Property::Accessor(_)))
    }

    /// Returns the own keys in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.0.borrow().keys().cloned().collect()
    }

    /// Returns the number of own properties.
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Returns true if the object has no own properties.
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Returns true if both handles point at the same object.
    pub fn ptr_eq(&self, other: &JsObject) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for JsObject {
    // Values are left out: exports objects routinely reference each other.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsObject")
            .field("keys", &self.keys())
            .finish()
    }
}

struct FunctionData {
    name: String,
    body: NativeFn,
}

/// A callable value with reference identity.
///
/// Two functions compare equal only when they are the same allocation, which
/// is what refresh families and component registration rely on.
///
/// # Examples
///
/// ```
/// use core_types::{JsFunction, Value};
///
/// let double = JsFunction::new("double", |args: &[Value]| match args.first() {
///     Some(Value::Smi(n)) => Ok(Value::Smi(n * 2)),
///     _ => Ok(Value::Undefined),
/// });
///
/// assert_eq!(double.name(), "double");
/// assert_eq!(double.call(&[Value::Smi(21)]).unwrap(), Value::Smi(42));
/// ```
#[derive(Clone)]
pub struct JsFunction(Rc<FunctionData>);

impl JsFunction {
    /// Creates a function with a native body.
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, JsError> + 'static,
    {
        Self(Rc::new(FunctionData {
            name: name.into(),
            body: Rc::new(body),
        }))
    }

    /// Creates a function whose body returns `undefined`.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, |_| Ok(Value::Undefined))
    }

    /// The function's `name`.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Calls the function.
    pub fn call(&self, args: &[Value]) -> Result<Value, JsError> {
        let body = Rc::clone(&self.0.body);
        body(args)
    }

    /// Returns true if both handles point at the same function.
    pub fn ptr_eq(&self, other: &JsFunction) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for JsFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("JsFunction").field(&self.0.name).finish()
    }
}
