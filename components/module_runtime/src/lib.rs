//! Module registry, lazy loader and hot-swap engine.
//!
//! This crate executes precompiled modules (a factory plus a dependency
//! list per module ID) inside one engine instance, without a host module
//! system. Modules run lazily, once, on first `require`; require cycles
//! hand out partially populated exports. In development builds a module's
//! code can be replaced while the application runs, re-executing only the
//! modules between the edit and the nearest modules able to accept it.
//!
//! # Overview
//!
//! - [`ModuleRuntime`] - Registry handle: `define`, `require`, segments, hot updates
//! - [`ModuleDefinition`] - Arguments of `define`
//! - [`FactoryScope`] - What a module body sees while it runs
//! - [`HotUpdate`] / [`HotUpdateOutcome`] - Hot-swap input and result
//! - [`RefreshHost`], [`FatalErrorReporter`], [`NativeSegmentLoader`] - Host capabilities
//! - [`RuntimeConfig`] - Build mode, diagnostics and commit debounce
//! - [`LoadError`] - Why a `require` failed
//!
//! # Examples
//!
//! ```
//! use module_runtime::{factory, ModuleDefinition, ModuleRuntime};
//! use core_types::Value;
//!
//! let runtime = ModuleRuntime::development();
//! runtime.define(
//!     ModuleDefinition::new(
//!         1,
//!         factory(|scope| {
//!             let n = match scope.require_dependency(0)?.get("n") {
//!                 Value::Smi(n) => n,
//!                 _ => 0,
//!             };
//!             scope.exports().set("double", Value::Smi(2 * n));
//!             Ok(())
//!         }),
//!     )
//!     .dependencies([2])
//!     .verbose_name("src/App.js"),
//! );
//! runtime.define(ModuleDefinition::new(
//!     2,
//!     factory(|scope| {
//!         scope.exports().set("n", Value::Smi(21));
//!         Ok(())
//!     }),
//! ));
//!
//! assert_eq!(runtime.require(1).unwrap().get("double"), Value::Smi(42));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod config;
mod diagnostics;
mod error;
mod graph;
mod guard;
mod host;
mod hot;
mod interop;
mod loader;
mod module_id;
mod registry;
mod runtime;
mod scope;
mod segments;

pub use config::{BuildMode, RuntimeConfig, DEFAULT_COMMIT_DEBOUNCE_MS};
pub use diagnostics::RequireCycleWarning;
pub use error::{ConfigError, LoadError, ManifestError, SegmentError};
pub use graph::{DependencyMap, InverseDependencies};
pub use host::{FamilyId, FatalErrorReporter, FullRefreshRequest, NativeSegmentLoader, RefreshHost};
pub use hot::{FullRefreshReason, HotSwapPhase, HotUpdate, HotUpdateOutcome, UpdateManifest};
pub use module_id::{
    pack_module_id, unpack_module_id, ModuleId, PackedModuleId, SegmentId, MAIN_SEGMENT,
};
pub use registry::{HotCallback, HotHandle, ModuleObject};
pub use runtime::{DefineOutcome, ModuleDefinition, ModuleRuntime, ModuleSnapshot, RuntimeBuilder};
pub use scope::{factory, Factory, FactoryScope};
pub use segments::SegmentDefiner;
