//! # Entity Management
//!
//! Entities are slot pool handles. The record behind the handle holds the
//! entity's signature and where its row lives: which archetype table and
//! which row of it.

use super::signature::Signature;
use crate::memory::Handle;

/// Per-entity bookkeeping stored in the entity table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EntityRecord {
    signature: Signature,
    archetype: usize,
    row: usize,
}

impl EntityRecord {
    pub(crate) const fn new(signature: Signature, archetype: usize, row: usize) -> Self {
        Self {
            signature,
            archetype,
            row,
        }
    }

    /// Returns the set of attached component types.
    #[inline]
    #[must_use]
    pub const fn signature(&self) -> Signature {
        self.signature
    }

    #[inline]
    pub(crate) const fn archetype(&self) -> usize {
        self.archetype
    }

    #[inline]
    pub(crate) const fn row(&self) -> usize {
        self.row
    }

    #[inline]
    pub(crate) fn set_row(&mut self, row: usize) {
        self.row = row;
    }
}

/// Unique identifier for an entity.
///
/// Index into the entity table plus the generation of that slot. A destroyed
/// entity's handle never matches again, even after its slot is reused.
pub type Entity = Handle<EntityRecord>;
