//! Core engine value types and error handling.
//!
//! This crate provides the foundational types shared by the module runtime
//! and its host: the tagged value representation, heap objects with
//! reference identity, and engine errors with a module-level stack.
//!
//! # Overview
//!
//! - [`Value`] - Tagged representation of engine values
//! - [`JsObject`] - Mutable object with identity and ordered keys
//! - [`JsFunction`] - Callable value with identity and a name
//! - [`JsError`] - Engine errors with stack traces
//! - [`ErrorKind`] - Types of engine errors
//! - [`StackFrame`] - Call stack frame information
//!
//! # Examples
//!
//! ```
//! use core_types::{ErrorKind, JsError, JsObject, Value};
//!
//! let exports = JsObject::new();
//! exports.set("answer", Value::Smi(42));
//!
//! let alias = Value::Object(exports.clone());
//! assert_eq!(alias.get("answer"), Value::Smi(42));
//! assert_eq!(alias, Value::Object(exports));
//!
//! let error = JsError::new(ErrorKind::TypeError, "undefined is not a function");
//! assert_eq!(error.to_string(), "TypeError: undefined is not a function");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod object;
mod source;
mod value;

pub use error::{ErrorKind, JsError};
pub use object::{Getter, JsFunction, JsObject, NativeFn, Property};
pub use source::StackFrame;
pub use value::Value;
