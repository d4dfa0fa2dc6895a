//! Stack frame type for engine error tracking.

use std::fmt;

/// Represents a single frame in an error's stack.
///
/// The module runtime pushes one frame per module whose factory an error
/// propagated through, so the stack reads innermost module first.
///
/// # Examples
///
/// ```
/// use core_types::StackFrame;
///
/// let frame = StackFrame::new(Some("require"), Some("src/App.js"));
/// assert_eq!(frame.to_string(), "require (src/App.js)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    /// Name of the function, or None for anonymous code
    pub function_name: Option<String>,
    /// URL, path or module name of the source, or None if not available
    pub source_url: Option<String>,
}

impl StackFrame {
    /// Creates a frame from optional function and source names.
    pub fn new(function_name: Option<&str>, source_url: Option<&str>) -> Self {
        Self {
            function_name: function_name.map(str::to_string),
            source_url: source_url.map(str::to_string),
        }
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.function_name.as_deref().unwrap_or("<anonymous>");
        match &self.source_url {
            Some(url) => write!(f, "{} ({})", name, url),
            None => write!(f, "{}", name),
        }
    }
}
