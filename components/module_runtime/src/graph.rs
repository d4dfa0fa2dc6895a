//! Dependency graph metadata emitted by the bundler.

use crate::ModuleId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ordered dependency IDs of a module, plus an optional table of the
/// import paths they were resolved from.
///
/// Deserializes from either a bare array of IDs or an object with `ids`
/// and `paths`.
///
/// # Examples
///
/// ```
/// use module_runtime::DependencyMap;
///
/// let map: DependencyMap = serde_json::from_str("[4, 7]").unwrap();
/// assert_eq!(map.get(1), Some(7));
///
/// let map: DependencyMap =
///     serde_json::from_str(r#"{"ids": [4], "paths": ["./leaf"]}"#).unwrap();
/// assert_eq!(map.path(0), Some("./leaf"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DependencyMapRepr")]
pub struct DependencyMap {
    /// Dependency IDs in import order
    pub ids: Vec<ModuleId>,
    /// Import paths, parallel to `ids`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DependencyMapRepr {
    Ids(Vec<ModuleId>),
    Full {
        ids: Vec<ModuleId>,
        #[serde(default)]
        paths: Option<Vec<String>>,
    },
}

impl From<DependencyMapRepr> for DependencyMap {
    fn from(repr: DependencyMapRepr) -> Self {
        match repr {
            DependencyMapRepr::Ids(ids) => Self { ids, paths: None },
            DependencyMapRepr::Full { ids, paths } => Self { ids, paths },
        }
    }
}

impl DependencyMap {
    /// Creates a map without a path table.
    pub fn new(ids: impl IntoIterator<Item = ModuleId>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
            paths: None,
        }
    }

    /// Attaches the import path table.
    pub fn with_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paths = Some(paths.into_iter().map(Into::into).collect());
        self
    }

    /// The ID of the `index`th dependency.
    pub fn get(&self, index: usize) -> Option<ModuleId> {
        self.ids.get(index).copied()
    }

    /// The import path of the `index`th dependency, if paths were emitted.
    pub fn path(&self, index: usize) -> Option<&str> {
        self.paths.as_ref()?.get(index).map(String::as_str)
    }

    /// Number of dependencies.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if the module has no dependencies.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl FromIterator<ModuleId> for DependencyMap {
    fn from_iter<T: IntoIterator<Item = ModuleId>>(iter: T) -> Self {
        Self::new(iter)
    }
}

/// Map from a module ID to the IDs of the modules that import it.
///
/// Supplied fresh by the transport with every hot update and trusted as
/// given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InverseDependencies(HashMap<ModuleId, Vec<ModuleId>>);

impl InverseDependencies {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the parents of `id`.
    pub fn insert(&mut self, id: ModuleId, parents: Vec<ModuleId>) {
        self.0.insert(id, parents);
    }

    /// The parents of `id`. Modules missing from the map have none.
    pub fn parents(&self, id: ModuleId) -> &[ModuleId] {
        self.0.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl FromIterator<(ModuleId, Vec<ModuleId>)> for InverseDependencies {
    fn from_iter<T: IntoIterator<Item = (ModuleId, Vec<ModuleId>)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
