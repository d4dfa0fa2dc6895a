//! Engine error types and error handling.
//!
//! This module provides error types that correspond to the engine's built-in
//! error constructors, along with stack trace information.

use crate::StackFrame;
use std::fmt;

/// The kind of engine error.
///
/// These correspond to the built-in error constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Generic `Error` thrown by user code
    Error,
    /// Syntax error in source code
    SyntaxError,
    /// Type error (e.g., calling a non-function)
    TypeError,
    /// Reference to an undefined variable
    ReferenceError,
    /// Value out of allowed range
    RangeError,
    /// Internal engine error
    InternalError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Error => "Error",
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::ReferenceError => "ReferenceError",
            ErrorKind::RangeError => "RangeError",
            ErrorKind::InternalError => "InternalError",
        };
        f.write_str(name)
    }
}

/// An engine error with message and stack trace.
///
/// This struct represents an exception thrown by module code. It includes the
/// error type, message and the stack of frames it propagated through.
///
/// # Examples
///
/// ```
/// use core_types::{ErrorKind, JsError, StackFrame};
///
/// let error = JsError::type_error("undefined is not a function")
///     .with_frame(StackFrame::new(Some("require"), Some("App.js")));
///
/// assert_eq!(error.kind, ErrorKind::TypeError);
/// assert_eq!(error.stack.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct JsError {
    /// The type of error
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
    /// Stack trace, innermost frame first
    pub stack: Vec<StackFrame>,
}

impl JsError {
    /// Creates an error of the given kind with an empty stack.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            stack: Vec::new(),
        }
    }

    /// Creates a plain `Error`, the kind user code throws most often.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Error, message)
    }

    /// Creates a `TypeError`.
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeError, message)
    }

    /// Creates a `ReferenceError`.
    pub fn reference_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ReferenceError, message)
    }

    /// Creates an `InternalError`.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InternalError, message)
    }

    /// Appends a frame to the stack and returns the error.
    pub fn with_frame(mut self, frame: StackFrame) -> Self {
        self.stack.push(frame);
        self
    }
}
