//! `VertexId` / `ElementId`: strong, zero-cost handles for mesh entities
//!
//! Vertices and elements live in flat arenas owned by
//! [`VolumeMesh`](crate::mesh::VolumeMesh); these handles are stable integer
//! indices into those arenas. Consumed elements are logically marked and
//! compacted between passes, so no handle ever dangles while a pass runs.
//!
//! Both types are `repr(transparent)` over `u32` and implement
//! `bytemuck::Pod`, so connectivity can be handed to solver exporters as a
//! plain `&[u32]` without copying.

use bytemuck::{Pod, Zeroable};
use std::fmt;

/// Index of a vertex in [`VolumeMesh::vertices`](crate::mesh::VolumeMesh).
#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Pod,
    Zeroable,
    serde::Serialize,
    serde::Deserialize,
)]
#[repr(transparent)]
pub struct VertexId(u32);

impl VertexId {
    /// Creates a handle from a raw arena index.
    ///
    /// # Panics
    ///
    /// Panics if `index` does not fit in a `u32`.
    #[inline]
    pub fn new(index: usize) -> Self {
        VertexId(u32::try_from(index).expect("vertex index exceeds u32 range"))
    }

    /// Returns the arena index of this vertex.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns the raw `u32` value.
    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Index of an element in [`VolumeMesh::elements`](crate::mesh::VolumeMesh).
///
/// Element handles are only meaningful within one pass; compaction at the end
/// of a pass renumbers the surviving elements.
#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Pod,
    Zeroable,
    serde::Serialize,
    serde::Deserialize,
)]
#[repr(transparent)]
pub struct ElementId(u32);

impl ElementId {
    /// Creates a handle from a raw arena index.
    ///
    /// # Panics
    ///
    /// Panics if `index` does not fit in a `u32`.
    #[inline]
    pub fn new(index: usize) -> Self {
        ElementId(u32::try_from(index).expect("element index exceeds u32 range"))
    }

    /// Returns the arena index of this element.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

// -----------------------------------------------------------------------------
// Formatting traits
// -----------------------------------------------------------------------------

impl fmt::Debug for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("VertexId").field(&self.0).finish()
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ElementId").field(&self.0).finish()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
