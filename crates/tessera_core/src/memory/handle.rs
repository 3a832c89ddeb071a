//! # Handles
//!
//! Handles are lightweight identifiers consisting of:
//! - An index into a pool's slot array
//! - A generation counter for safe reuse
//!
//! A handle never owns anything. It is only meaningful together with the
//! pool that issued it, and the pool decides whether it is still valid.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use bytemuck::{Pod, Zeroable};

/// Untyped handle as it is laid out in memory.
///
/// This is plain old data so it can be written into byte buffers that are
/// shared with collaborators (GPU batch indices, command streams).
/// The all-zero value is the null sentinel: pools never issue generation 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Pod, Zeroable)]
#[repr(C)]
pub struct RawHandle {
    /// Slot index inside the issuing pool.
    pub index: u32,
    /// Generation the slot had when the handle was issued.
    pub generation: u32,
}

impl RawHandle {
    /// Null/invalid raw handle.
    pub const NULL: Self = Self {
        index: 0,
        generation: 0,
    };

    /// Creates a raw handle from index and generation.
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Checks if this is the null sentinel.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.generation == 0
    }

    /// Packs the handle into 64 bits.
    ///
    /// - Lower 32 bits: index
    /// - Upper 32 bits: generation
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        ((self.generation as u64) << 32) | (self.index as u64)
    }

    /// Unpacks a handle produced by [`RawHandle::to_bits`].
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }
}

/// Typed handle into a pool storing `T`.
///
/// The type parameter only prevents mixing handles between pools of
/// different payloads; it does not require `T` to be `Copy`, `Send` or
/// anything else, and the handle itself is always `Copy + Send + Sync`.
#[repr(transparent)]
pub struct Handle<T> {
    raw: RawHandle,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    /// Null/invalid handle. Never valid for any pool.
    pub const NULL: Self = Self::from_raw(RawHandle::NULL);

    /// Creates a handle from index and generation.
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self::from_raw(RawHandle::new(index, generation))
    }

    /// Wraps a raw handle.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: RawHandle) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }

    /// Returns the untyped handle.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> RawHandle {
        self.raw
    }

    /// Returns the slot index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.raw.index
    }

    /// Returns the generation.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.raw.generation
    }

    /// Checks if this handle is the null sentinel.
    ///
    /// A non-null handle may still be stale; only the issuing pool can tell.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.raw.is_null()
    }

    /// Packs the handle into 64 bits, see [`RawHandle::to_bits`].
    #[inline]
    #[must_use]
    pub const fn to_bits(self) -> u64 {
        self.raw.to_bits()
    }

    /// Unpacks a handle produced by [`Handle::to_bits`].
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self::from_raw(RawHandle::from_bits(bits))
    }

    /// Reinterprets the handle for another payload type.
    #[inline]
    #[must_use]
    pub const fn cast<U>(self) -> Handle<U> {
        Handle::from_raw(self.raw)
    }
}

impl<T> Clone for Handle<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T> Eq for Handle<T> {}

impl<T> PartialOrd for Handle<T> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Handle<T> {
    #[inline]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl<T> Hash for Handle<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T> Default for Handle<T> {
    fn default() -> Self {
        Self::NULL
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("Handle(null)");
        }
        write!(f, "Handle({}v{})", self.raw.index, self.raw.generation)
    }
}

impl<T> From<Handle<T>> for RawHandle {
    fn from(handle: Handle<T>) -> Self {
        handle.raw
    }
}
