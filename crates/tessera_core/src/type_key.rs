//! # Type Keys
//!
//! Process-stable identity for arbitrary `'static` types, plus a registry
//! that hands out dense indices for them.
//!
//! A [`TypeKey`] wraps the compiler-assigned [`TypeId`] of a monomorphized
//! type. It is a constant baked into each instantiation of [`type_key`], so
//! obtaining one is free and involves no reflection or lookup.
//!
//! ## Invariants
//!
//! - `type_key::<A>() == type_key::<B>()` if and only if `A` and `B` are the same type.
//! - Keys are stable for the life of the process and usable as map keys.
//! - Registry indices are assigned in registration order and never reused.

use std::any::{type_name, TypeId};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem::{align_of, size_of};

use crate::error::{EcsError, EcsResult};

/// Opaque identity of a Rust type.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

/// Returns the key of `T`.
#[inline]
#[must_use]
pub fn type_key<T: ?Sized + 'static>() -> TypeKey {
    TypeKey {
        id: TypeId::of::<T>(),
        name: type_name::<T>(),
    }
}

impl TypeKey {
    /// Returns the type name, for diagnostics only.
    ///
    /// Names are not guaranteed unique; compare keys, not names.
    #[inline]
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.name
    }

    /// Checks whether this key belongs to `T`.
    #[inline]
    #[must_use]
    pub fn is<T: ?Sized + 'static>(self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeKey {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for TypeKey {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeKey {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Layout metadata recorded for a registered type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeInfo {
    /// Key of the type.
    pub key: TypeKey,
    /// Dense index assigned at registration.
    pub index: usize,
    /// Size of the type in bytes.
    pub size: usize,
    /// Alignment requirement.
    pub align: usize,
}

impl TypeInfo {
    fn of<T: 'static>(index: usize) -> Self {
        Self {
            key: type_key::<T>(),
            index,
            size: size_of::<T>(),
            align: align_of::<T>(),
        }
    }
}

/// Maps type keys to dense indices `[0, capacity)`.
///
/// The component store uses the index both as the bit position in a
/// [`Signature`](crate::ecs::Signature) and as the slot of the type's column.
#[derive(Debug)]
pub struct TypeKeyRegistry {
    by_key: HashMap<TypeKey, usize>,
    infos: Vec<TypeInfo>,
    capacity: usize,
}

impl TypeKeyRegistry {
    /// Creates an empty registry that accepts at most `capacity` types.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            by_key: HashMap::with_capacity(capacity),
            infos: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Registers `T` and returns its index.
    ///
    /// # Errors
    ///
    /// - [`EcsError::AlreadyRegistered`] if `T` already has an index.
    /// - [`EcsError::TooManyComponents`] if the registry is full.
    pub fn register<T: 'static>(&mut self) -> EcsResult<usize> {
        let key = type_key::<T>();
        if self.by_key.contains_key(&key) {
            return Err(EcsError::AlreadyRegistered(key.name()));
        }
        if self.infos.len() >= self.capacity {
            return Err(EcsError::TooManyComponents {
                capacity: self.capacity,
                name: key.name(),
            });
        }

        let index = self.infos.len();
        self.by_key.insert(key, index);
        self.infos.push(TypeInfo::of::<T>(index));
        Ok(index)
    }

    /// Returns the index of a registered key.
    #[inline]
    #[must_use]
    pub fn index_of(&self, key: TypeKey) -> Option<usize> {
        self.by_key.get(&key).copied()
    }

    /// Returns the index of `T`, if registered.
    #[inline]
    #[must_use]
    pub fn index_of_type<T: 'static>(&self) -> Option<usize> {
        self.index_of(type_key::<T>())
    }

    /// Returns the metadata recorded for an index.
    #[must_use]
    pub fn info(&self, index: usize) -> Option<&TypeInfo> {
        self.infos.get(index)
    }

    /// Returns the number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    /// Checks if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// Iterates over registered types in index order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeInfo> {
        self.infos.iter()
    }
}
