//! # Slot Pool
//!
//! Generational allocator for objects that are frequently inserted and removed
//! while outside code keeps referring to them by [`Handle`].
//!
//! ```text
//! slots:      [ A g1 ][ -- g2 ][ C g1 ][ D g3 ]
//! free list:  [1]
//!
//! Handle(1v1) -> stale (slot 1 is at generation 2)
//! Handle(2v1) -> C
//! ```
//!
//! Growing the slot array never invalidates a handle, because handles are
//! indices and not pointers.

use std::sync::atomic::{AtomicUsize, Ordering};

use super::handle::Handle;

/// First generation handed out by a fresh slot. Generation 0 is the null sentinel.
const FIRST_GENERATION: u32 = 1;

/// A single storage cell: payload plus the generation it is currently at.
#[derive(Debug)]
struct Slot<T> {
    value: Option<T>,
    generation: u32,
}

/// A generational pool for objects of a single type.
///
/// Insert and remove are O(1) amortized. Freed indices are recycled in LIFO
/// order and every removal bumps the slot's generation, so a handle taken
/// before the removal can never match the slot again.
///
/// # Bounded pools
///
/// A pool created with [`SlotPool::with_limit`] never grows beyond its limit.
/// Inserting into a full bounded pool returns [`Handle::NULL`] and leaves the
/// pool untouched.
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. It has a single owner; share it behind
/// whatever serialization the owner already uses.
///
/// # Example
///
/// ```rust
/// use tessera_core::SlotPool;
///
/// let mut textures: SlotPool<&str> = SlotPool::new();
/// let handle = textures.insert("grass.png");
/// assert_eq!(textures.get(handle), Some(&"grass.png"));
///
/// textures.remove(handle);
/// assert!(textures.get(handle).is_none());
/// ```
#[derive(Debug)]
pub struct SlotPool<T> {
    /// The slot array (high-water mark is its length).
    slots: Vec<Slot<T>>,
    /// Free list - indices of vacant, reusable slots.
    free_list: Vec<u32>,
    /// Number of occupied slots.
    len: usize,
    /// Maximum number of slots, if bounded.
    limit: Option<usize>,
    /// No live slot has a lower index. Lets repeated `first()` calls resume
    /// where the last scan stopped.
    lowest_live: AtomicUsize,
}

impl<T> SlotPool<T> {
    /// Creates an empty, growable pool.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            limit: None,
            lowest_live: AtomicUsize::new(0),
        }
    }

    /// Creates an empty, growable pool with room for `capacity` objects
    /// before the slot array reallocates.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            len: 0,
            limit: None,
            lowest_live: AtomicUsize::new(0),
        }
    }

    /// Creates a bounded pool that holds at most `limit` objects.
    ///
    /// All slot memory is reserved upfront.
    ///
    /// # Panics
    ///
    /// Panics if `limit` is zero or exceeds `u32::MAX`.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        assert!(limit > 0, "Limit must be greater than zero");
        assert!(
            u32::try_from(limit).is_ok(),
            "Limit cannot exceed u32::MAX"
        );

        Self {
            slots: Vec::with_capacity(limit),
            free_list: Vec::with_capacity(limit),
            len: 0,
            limit: Some(limit),
            lowest_live: AtomicUsize::new(0),
        }
    }

    /// Returns the limit of a bounded pool.
    #[inline]
    #[must_use]
    pub const fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Returns the number of live objects.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Checks if the pool holds no live objects.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the high-water mark: the number of slots ever created.
    #[inline]
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of vacant slots waiting for reuse.
    #[inline]
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    /// Stores `value` and returns a handle to it.
    ///
    /// Returns [`Handle::NULL`] if the pool is bounded and full; the value is
    /// dropped in that case.
    pub fn insert(&mut self, value: T) -> Handle<T> {
        self.insert_with(|| value)
    }

    /// Constructs the payload in a free slot.
    ///
    /// `make` only runs once a slot has been secured, so nothing is built for
    /// a full bounded pool.
    pub fn insert_with<F>(&mut self, make: F) -> Handle<T>
    where
        F: FnOnce() -> T,
    {
        let Some(index) = self.acquire_index() else {
            return Handle::NULL;
        };

        let slot = &mut self.slots[index as usize];
        debug_assert!(slot.value.is_none(), "Free list handed out an occupied slot");
        slot.value = Some(make());
        self.len += 1;

        let lowest = self.lowest_live.get_mut();
        *lowest = (*lowest).min(index as usize);

        Handle::new(index, slot.generation)
    }

    /// Pops a recycled index or appends a fresh slot.
    fn acquire_index(&mut self) -> Option<u32> {
        if let Some(index) = self.free_list.pop() {
            return Some(index);
        }

        if self.limit.is_some_and(|limit| self.slots.len() >= limit) {
            tracing::trace!(limit = ?self.limit, "slot pool exhausted");
            return None;
        }

        let index = u32::try_from(self.slots.len()).ok()?;
        self.slots.push(Slot {
            value: None,
            generation: FIRST_GENERATION,
        });
        Some(index)
    }

    /// Checks if `handle` refers to a live object in this pool.
    #[inline]
    #[must_use]
    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.get(handle).is_some()
    }

    /// Gets a reference to the object behind `handle`.
    ///
    /// Returns `None` for null, stale, or foreign handles. This is the single
    /// place where use-after-free is detected.
    #[inline]
    #[must_use]
    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        let slot = self.slots.get(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.value.as_ref()
    }

    /// Gets a mutable reference to the object behind `handle`.
    #[inline]
    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.value.as_mut()
    }

    /// Returns the handle of the object stored at slot `index`, or
    /// [`Handle::NULL`] if that slot is vacant or does not exist.
    #[inline]
    #[must_use]
    pub fn handle_at(&self, index: u32) -> Handle<T> {
        match self.slots.get(index as usize) {
            Some(slot) if slot.value.is_some() => Handle::new(index, slot.generation),
            _ => Handle::NULL,
        }
    }

    /// Removes the object behind `handle` and returns it.
    ///
    /// Stale handles are a no-op and return `None`.
    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        let index = handle.index();
        let slot = self.slots.get_mut(index as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }

        let value = slot.value.take()?;
        self.len -= 1;
        Self::release(slot, index, &mut self.free_list);

        Some(value)
    }

    /// Bumps a vacated slot's generation and recycles its index.
    ///
    /// A slot whose generation would overflow is retired instead: reusing it
    /// would eventually reproduce a handle that was issued before.
    fn release(slot: &mut Slot<T>, index: u32, free_list: &mut Vec<u32>) {
        match slot.generation.checked_add(1) {
            Some(next) => {
                slot.generation = next;
                free_list.push(index);
            }
            None => {
                tracing::warn!(index, "slot generation exhausted, retiring slot");
            }
        }
    }

    /// Returns a handle to some live object, or [`Handle::NULL`] if empty.
    ///
    /// Used to drain a pool during teardown:
    ///
    /// ```rust
    /// # use tessera_core::SlotPool;
    /// # let mut pool = SlotPool::new();
    /// # pool.insert(1);
    /// loop {
    ///     let handle = pool.first();
    ///     if handle.is_null() {
    ///         break;
    ///     }
    ///     pool.remove(handle);
    /// }
    /// assert!(pool.is_empty());
    /// ```
    ///
    /// The handle is always the lowest live slot. The scan resumes from the
    /// previous answer, so draining the pool this way is linear overall.
    #[must_use]
    pub fn first(&self) -> Handle<T> {
        let start = self.lowest_live.load(Ordering::Relaxed).min(self.slots.len());
        let found = self.slots[start..]
            .iter()
            .position(|slot| slot.value.is_some())
            .map(|offset| start + offset);

        match found {
            Some(index) => {
                self.lowest_live.store(index, Ordering::Relaxed);
                Handle::new(index as u32, self.slots[index].generation)
            }
            None => {
                self.lowest_live.store(self.slots.len(), Ordering::Relaxed);
                Handle::NULL
            }
        }
    }

    /// Removes every object. All outstanding handles become stale.
    ///
    /// The slot array keeps its size; vacant slots are reused lowest index first.
    pub fn clear(&mut self) {
        let mut vacant = vec![false; self.slots.len()];
        for &index in &self.free_list {
            vacant[index as usize] = true;
        }

        let mut recycled = Vec::with_capacity(self.slots.len());
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.value.take().is_some() {
                Self::release(slot, index as u32, &mut recycled);
            } else if vacant[index] {
                // Retired slots are neither live nor on the free list.
                recycled.push(index as u32);
            }
        }
        recycled.reverse();

        self.free_list = recycled;
        self.len = 0;
        *self.lowest_live.get_mut() = self.slots.len();
    }

    /// Iterates over live objects in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value
                .as_ref()
                .map(|value| (Handle::new(index as u32, slot.generation), value))
        })
    }

    /// Iterates mutably over live objects in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle<T>, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            let generation = slot.generation;
            slot.value
                .as_mut()
                .map(|value| (Handle::new(index as u32, generation), value))
        })
    }

    /// Iterates over handles of live objects in slot order.
    pub fn handles(&self) -> impl Iterator<Item = Handle<T>> + '_ {
        self.iter().map(|(handle, _)| handle)
    }
}

impl<T> Default for SlotPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A slot pool whose bound is part of its type.
///
/// Behaves exactly like [`SlotPool::with_limit`]`(N)`; the const parameter
/// lets resource tables declare their budget next to the payload type.
///
/// ```rust
/// use tessera_core::LimitedPool;
///
/// let mut lights: LimitedPool<[f32; 3], 2> = LimitedPool::new();
/// assert!(!lights.insert([1.0, 0.0, 0.0]).is_null());
/// assert!(!lights.insert([0.0, 1.0, 0.0]).is_null());
/// assert!(lights.insert([0.0, 0.0, 1.0]).is_null());
/// ```
#[derive(Debug)]
pub struct LimitedPool<T, const N: usize> {
    inner: SlotPool<T>,
}

impl<T, const N: usize> LimitedPool<T, N> {
    /// Maximum number of live objects.
    pub const LIMIT: usize = N;

    /// Creates an empty pool with all `N` slots reserved.
    ///
    /// # Panics
    ///
    /// Panics if `N` is zero or exceeds `u32::MAX`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: SlotPool::with_limit(N),
        }
    }

    /// See [`SlotPool::insert`].
    pub fn insert(&mut self, value: T) -> Handle<T> {
        self.inner.insert(value)
    }

    /// See [`SlotPool::insert_with`].
    pub fn insert_with<F>(&mut self, make: F) -> Handle<T>
    where
        F: FnOnce() -> T,
    {
        self.inner.insert_with(make)
    }

    /// See [`SlotPool::get`].
    #[inline]
    #[must_use]
    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        self.inner.get(handle)
    }

    /// See [`SlotPool::get_mut`].
    #[inline]
    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        self.inner.get_mut(handle)
    }

    /// See [`SlotPool::remove`].
    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        self.inner.remove(handle)
    }

    /// See [`SlotPool::contains`].
    #[must_use]
    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.inner.contains(handle)
    }

    /// See [`SlotPool::first`].
    #[must_use]
    pub fn first(&self) -> Handle<T> {
        self.inner.first()
    }

    /// Returns the number of live objects.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.inner.len()
    }

    /// Checks if the pool holds no live objects.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Checks if every slot is occupied.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.inner.len() == N
    }

    /// See [`SlotPool::clear`].
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// See [`SlotPool::iter`].
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.inner.iter()
    }

    /// See [`SlotPool::iter_mut`].
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle<T>, &mut T)> {
        self.inner.iter_mut()
    }

    /// Borrows the underlying bounded pool.
    #[must_use]
    pub const fn as_pool(&self) -> &SlotPool<T> {
        &self.inner
    }
}

impl<T, const N: usize> Default for LimitedPool<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
