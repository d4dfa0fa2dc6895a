//! Development-only require-cycle diagnostics.

use crate::config::CycleIgnoreList;
use crate::ModuleId;
use std::collections::HashSet;

/// Name used in cycle chains for modules without a verbose name.
pub(crate) const UNKNOWN_MODULE_NAME: &str = "[unknown]";

/// A module was required while it was still initializing.
///
/// Non-fatal: the requirer receives the partially populated exports.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "Require cycle: {}\n\nRequire cycles are allowed, but can result in uninitialized values. \
     Consider refactoring to remove the need for a cycle.",
    .chain.join(" -> ")
)]
pub struct RequireCycleWarning {
    /// Verbose names along the cycle, ending with the first one again
    pub chain: Vec<String>,
}

/// Initializing stack and the cycles already reported.
#[derive(Default)]
pub(crate) struct Diagnostics {
    initializing: Vec<ModuleId>,
    reported: HashSet<Vec<ModuleId>>,
    warnings: Vec<RequireCycleWarning>,
}

impl Diagnostics {
    pub(crate) fn push(&mut self, id: ModuleId) {
        self.initializing.push(id);
    }

    pub(crate) fn pop(&mut self, id: ModuleId) {
        let popped = self.initializing.pop();
        debug_assert_eq!(popped, Some(id), "initializing stack out of order");
    }

    /// The cycle closed by requiring `id`, if `id` is still initializing.
    pub(crate) fn cycle_to(&self, id: ModuleId) -> Option<Vec<ModuleId>> {
        let start = self.initializing.iter().position(|&frame| frame == id)?;
        let mut cycle = self.initializing[start..].to_vec();
        cycle.push(id);
        Some(cycle)
    }

    /// Records a warning for `cycle` unless the same cycle was already
    /// reported or every module in it is ignore-listed.
    pub(crate) fn report_cycle(
        &mut self,
        cycle: &[ModuleId],
        name_of: impl Fn(ModuleId) -> Option<String>,
        ignore: &CycleIgnoreList,
    ) -> Option<RequireCycleWarning> {
        let chain: Vec<String> = cycle
            .iter()
            .map(|&id| name_of(id).unwrap_or_else(|| UNKNOWN_MODULE_NAME.to_string()))
            .collect();
        if ignore.ignores_all(&chain) {
            return None;
        }
        if !self.reported.insert(canonical_cycle(cycle)) {
            return None;
        }
        let warning = RequireCycleWarning { chain };
        tracing::warn!("{}", warning);
        self.warnings.push(warning.clone());
        Some(warning)
    }

    pub(crate) fn warnings(&self) -> &[RequireCycleWarning] {
        &self.warnings
    }

    /// Forgets reported cycles. The initializing stack belongs to whatever
    /// is currently executing and is left alone.
    pub(crate) fn clear(&mut self) {
        self.reported.clear();
        self.warnings.clear();
    }
}

/// Rotates a closed cycle `[a, b, .., a]` so it starts at its smallest ID.
fn canonical_cycle(cycle: &[ModuleId]) -> Vec<ModuleId> {
    let open = &cycle[..cycle.len().saturating_sub(1)];
    let Some(start) = open
        .iter()
        .enumerate()
        .min_by_key(|&(_, id)| *id)
        .map(|(index, _)| index)
    else {
        return Vec::new();
    };
    open[start..].iter().chain(&open[..start]).copied().collect()
}
