//! Update metadata as sent by the transport.

use super::HotUpdate;
use crate::error::ManifestError;
use crate::graph::{DependencyMap, InverseDependencies};
use crate::scope::Factory;
use crate::ModuleId;
use serde::{Deserialize, Serialize};

/// The JSON half of a hot update. The factory is compiled separately and
/// joined with [`UpdateManifest::into_update`].
///
/// # Examples
///
/// ```
/// use module_runtime::UpdateManifest;
///
/// let manifest = UpdateManifest::from_json(
///     r#"{"id": 1, "dependencyMap": [], "inverseDependencies": {"1": [2], "2": []}}"#,
/// )
/// .unwrap();
/// assert_eq!(manifest.id, 1);
/// assert_eq!(manifest.inverse_dependencies.parents(1), &[2]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateManifest {
    /// The edited module
    pub id: ModuleId,
    /// Its new dependency map
    #[serde(default)]
    pub dependency_map: DependencyMap,
    /// Importers of every module in the current graph
    #[serde(default)]
    pub inverse_dependencies: InverseDependencies,
}

impl UpdateManifest {
    /// Parses a manifest.
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Joins the manifest with the module's new factory.
    pub fn into_update(self, factory: Factory) -> HotUpdate {
        HotUpdate::new(
            self.id,
            factory,
            self.dependency_map,
            self.inverse_dependencies,
        )
    }
}
