//! Lazily loaded segments.
//!
//! A split bundle registers a definer per segment together with the module
//! IDs it owns. Requiring one of those IDs before it is defined runs the
//! definer, which is expected to call `define` for it.

use crate::error::SegmentError;
use crate::module_id::{SegmentId, MAIN_SEGMENT};
use crate::runtime::ModuleRuntime;
use crate::ModuleId;
use std::collections::HashMap;
use std::rc::Rc;

/// Materializes modules of one segment on demand.
pub type SegmentDefiner = Rc<dyn Fn(&ModuleRuntime, ModuleId)>;

/// Which undefined module belongs to which segment.
#[derive(Default)]
pub(crate) struct SegmentResolver {
    definers: HashMap<SegmentId, SegmentDefiner>,
    owners: HashMap<ModuleId, SegmentId>,
}

impl SegmentResolver {
    /// Records `definer` for `segment_id`.
    ///
    /// `is_defined` reports IDs that already have a registry record; those
    /// keep no owner. IDs owned by an earlier segment keep that owner.
    pub(crate) fn register(
        &mut self,
        segment_id: SegmentId,
        definer: SegmentDefiner,
        module_ids: Option<&[ModuleId]>,
        is_defined: impl Fn(ModuleId) -> bool,
    ) -> Result<(), SegmentError> {
        match (segment_id, module_ids) {
            (MAIN_SEGMENT, Some(_)) => return Err(SegmentError::UnexpectedModuleIds),
            (MAIN_SEGMENT, None) => {}
            (segment_id, None) => return Err(SegmentError::MissingModuleIds { segment_id }),
            (segment_id, Some(ids)) => {
                for &id in ids {
                    if !is_defined(id) && !self.owners.contains_key(&id) {
                        self.owners.insert(id, segment_id);
                    }
                }
            }
        }
        self.definers.insert(segment_id, definer);
        Ok(())
    }

    /// The definer that should materialize `id`. Unowned IDs fall back to
    /// the main segment.
    pub(crate) fn definer_for(&self, id: ModuleId) -> Option<(SegmentId, SegmentDefiner)> {
        let segment_id = self.owners.get(&id).copied().unwrap_or(MAIN_SEGMENT);
        let definer = self.definers.get(&segment_id)?;
        Some((segment_id, Rc::clone(definer)))
    }

    /// Drops the ownership entry once its definer has run.
    pub(crate) fn forget(&mut self, id: ModuleId) {
        self.owners.remove(&id);
    }

    pub(crate) fn owner_of(&self, id: ModuleId) -> Option<SegmentId> {
        self.owners.get(&id).copied()
    }

    pub(crate) fn clear(&mut self) {
        self.definers.clear();
        self.owners.clear();
    }
}
