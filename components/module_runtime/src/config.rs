//! Runtime configuration.
//!
//! The configuration is plain data and can be read from the JSON document a
//! bundle ships with its prelude:
//!
//! ```json
//! {
//!   "mode": "development",
//!   "requireCycleIgnorePatterns": ["node_modules/"],
//!   "commitDebounceMs": 30,
//!   "globalPrefix": ""
//! }
//! ```

use crate::error::ConfigError;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Default delay before a successful hot update is committed to the UI.
pub const DEFAULT_COMMIT_DEBOUNCE_MS: u64 = 30;

/// Whether development machinery is enabled.
///
/// Production disables hot swapping, require-cycle diagnostics, verbose
/// names and refresh registration, and releases each factory after its
/// first successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Hot swapping and diagnostics enabled
    #[default]
    Development,
    /// Registry, loader and segments only
    Production,
}

/// Configuration for a [`crate::ModuleRuntime`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RuntimeConfig {
    /// Build mode
    pub mode: BuildMode,
    /// Regular expressions matched against verbose module names. A require
    /// cycle is not reported when every module in it matches one of them.
    pub require_cycle_ignore_patterns: Vec<String>,
    /// Delay before a hot update is committed to the UI-refresh collaborator
    pub commit_debounce_ms: u64,
    /// Prefix of the IDs registered with the UI-refresh collaborator
    pub global_prefix: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            mode: BuildMode::Development,
            require_cycle_ignore_patterns: Vec::new(),
            commit_debounce_ms: DEFAULT_COMMIT_DEBOUNCE_MS,
            global_prefix: String::new(),
        }
    }
}

impl RuntimeConfig {
    /// Default development configuration.
    pub fn development() -> Self {
        Self::default()
    }

    /// Default production configuration.
    pub fn production() -> Self {
        Self {
            mode: BuildMode::Production,
            ..Self::default()
        }
    }

    /// Parses and validates a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed documents and
    /// [`ConfigError::InvalidIgnorePattern`] for patterns that do not compile.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = serde_json::from_str(json)?;
        CycleIgnoreList::compile(&config.require_cycle_ignore_patterns)?;
        Ok(config)
    }

    /// Replaces the require-cycle ignore patterns.
    pub fn with_cycle_ignore_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.require_cycle_ignore_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Returns true in development builds.
    pub fn is_development(&self) -> bool {
        self.mode == BuildMode::Development
    }
}

/// Compiled require-cycle ignore patterns.
#[derive(Debug, Clone, Default)]
pub(crate) struct CycleIgnoreList {
    patterns: Vec<Regex>,
}

impl CycleIgnoreList {
    pub(crate) fn compile(patterns: &[String]) -> Result<Self, ConfigError> {
        let patterns = patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| ConfigError::InvalidIgnorePattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// True when every name matches at least one pattern.
    pub(crate) fn ignores_all(&self, names: &[String]) -> bool {
        !self.patterns.is_empty()
            && names
                .iter()
                .all(|name| self.patterns.iter().any(|pattern| pattern.is_match(name)))
    }
}
