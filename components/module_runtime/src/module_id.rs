//! Module and segment identifiers.
//!
//! Module IDs arrive pre-resolved from the bundler. IDs of modules living in
//! a lazily loaded segment are packed as `segment_id << 16 | local_id`.

/// Identifier of a module in the registry.
pub type ModuleId = u32;

/// Identifier of a lazily loadable segment.
pub type SegmentId = u16;

/// The main bundle. Its modules are always defined at startup.
pub const MAIN_SEGMENT: SegmentId = 0;

const LOCAL_ID_BITS: u32 = 16;
const LOCAL_ID_MASK: u32 = (1 << LOCAL_ID_BITS) - 1;

/// A module ID split into its segment and segment-local parts.
///
/// # Examples
///
/// ```
/// use module_runtime::PackedModuleId;
///
/// let packed = PackedModuleId::new(3, 17);
/// assert_eq!(packed.pack(), (3 << 16) | 17);
/// assert_eq!(PackedModuleId::unpack(packed.pack()), packed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PackedModuleId {
    /// Segment that owns the module
    pub segment_id: SegmentId,
    /// Index of the module inside its segment
    pub local_id: u16,
}

impl PackedModuleId {
    /// Creates a packed ID from its parts.
    pub fn new(segment_id: SegmentId, local_id: u16) -> Self {
        Self {
            segment_id,
            local_id,
        }
    }

    /// Packs the parts into a single module ID.
    pub fn pack(self) -> ModuleId {
        (ModuleId::from(self.segment_id) << LOCAL_ID_BITS) | ModuleId::from(self.local_id)
    }

    /// Splits a module ID into segment and local parts.
    pub fn unpack(id: ModuleId) -> Self {
        Self {
            segment_id: (id >> LOCAL_ID_BITS) as SegmentId,
            local_id: (id & LOCAL_ID_MASK) as u16,
        }
    }
}

/// Packs `segment_id` and `local_id` into one module ID.
pub fn pack_module_id(segment_id: SegmentId, local_id: u16) -> ModuleId {
    PackedModuleId::new(segment_id, local_id).pack()
}

/// Inverse of [`pack_module_id`].
pub fn unpack_module_id(id: ModuleId) -> PackedModuleId {
    PackedModuleId::unpack(id)
}
