//! Error types for the module runtime.

use crate::ModuleId;
use core_types::JsError;

/// Failure to produce a module's exports.
///
/// Factories return this type too, so an error raised deep inside a
/// dependency propagates unchanged (apart from its stack) through every
/// factory that required it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    /// No record exists for the ID and no segment could define it
    #[error("Requiring unknown module \"{id}\".")]
    ModuleNotFound {
        /// The unresolved module ID
        id: ModuleId,
    },

    /// Name-based require of a module whose verbose name is not registered
    #[error("Unknown named module: \"{name}\"")]
    UnknownNamedModule {
        /// The verbose name that was requested
        name: String,
    },

    /// The module body returned an error
    #[error(transparent)]
    FactoryExecution(#[from] JsError),
}

impl LoadError {
    /// The engine error raised by a factory, if this is a factory failure.
    pub fn as_js_error(&self) -> Option<&JsError> {
        match self {
            LoadError::FactoryExecution(error) => Some(error),
            _ => None,
        }
    }
}

/// Invalid `register_segment` call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SegmentError {
    /// The main segment was registered with an explicit module list
    #[error("registerSegment: expected moduleIds to be absent for the main segment")]
    UnexpectedModuleIds,

    /// A lazily loaded segment was registered without its module list
    #[error("registerSegment: expected moduleIds to be passed for segment #{segment_id}")]
    MissingModuleIds {
        /// The offending segment
        segment_id: crate::SegmentId,
    },
}

/// Invalid runtime configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration document is not valid JSON for [`crate::RuntimeConfig`]
    #[error("invalid runtime config: {0}")]
    Json(#[from] serde_json::Error),

    /// A require-cycle ignore pattern is not a valid regular expression
    #[error("invalid require cycle ignore pattern `{pattern}`")]
    InvalidIgnorePattern {
        /// The pattern as written in the configuration
        pattern: String,
        /// Compilation error
        #[source]
        source: regex::Error,
    },
}

/// Malformed hot-update metadata from the transport.
#[derive(Debug, thiserror::Error)]
#[error("invalid hot update manifest: {0}")]
pub struct ManifestError(#[from] serde_json::Error);
