//! Capabilities the runtime expects from its host.
//!
//! Each collaborator is optional. Without a [`RefreshHost`] no module is ever
//! a refresh boundary and full refreshes are only logged; without a
//! [`FatalErrorReporter`] the guarded require is a pass-through.

use crate::error::LoadError;
use crate::module_id::SegmentId;
use crate::runtime::ModuleRuntime;
use core_types::Value;
use std::fmt;

/// Identity of a component family as tracked by the UI-refresh layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FamilyId(pub u64);

/// Arguments of [`RefreshHost::perform_full_refresh`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullRefreshRequest {
    /// Why a partial update was not possible
    pub reason: String,
    /// Verbose name of the edited module
    pub source: Option<String>,
    /// Verbose name of the module that stopped propagation
    pub failed: Option<String>,
}

impl FullRefreshRequest {
    /// The message shown to the developer.
    pub fn message(&self) -> String {
        let mut message = format!("Fast Refresh - {}", self.reason);
        for name in [&self.source, &self.failed].into_iter().flatten() {
            message.push_str(&format!(" <{}>", name));
        }
        message
    }
}

impl fmt::Display for FullRefreshRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// The UI-refresh layer.
pub trait RefreshHost {
    /// Returns true if `value` looks like a component type.
    fn is_likely_component_type(&self, value: &Value) -> bool;

    /// The family `value` was registered under, if any.
    fn family_by_type(&self, value: &Value) -> Option<FamilyId>;

    /// Registers `value` under a stable ID so later versions join its family.
    fn register(&self, value: &Value, id: &str);

    /// Reloads the whole application.
    fn perform_full_refresh(&self, request: &FullRefreshRequest);

    /// Re-renders with the updated component families.
    fn perform_react_refresh(&self);
}

/// Receives errors escaping the outermost guarded require.
pub trait FatalErrorReporter {
    /// Reports an uncaught module error.
    fn report_fatal_error(&self, error: &LoadError);
}

/// Materializes modules of natively bundled segments.
pub trait NativeSegmentLoader {
    /// Loads the segment part holding `local_id` of `segment_id`. Expected to
    /// call [`ModuleRuntime::define`].
    fn native_require(&self, runtime: &ModuleRuntime, local_id: u16, segment_id: SegmentId);
}
