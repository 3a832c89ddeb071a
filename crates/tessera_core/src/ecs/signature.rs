//! # Signatures
//!
//! The set of component types attached to an entity, as a bitmask over
//! registry indices.

use std::fmt;

/// Bitmask of component types (up to 64 per store).
///
/// Bit `i` is set when the component registered at index `i` is attached.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Signature(u64);

impl Signature {
    /// Maximum number of distinct component types.
    pub const CAPACITY: usize = u64::BITS as usize;

    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Returns the raw bitmask.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Checks if component `index` is in the set.
    #[inline]
    #[must_use]
    pub const fn contains(self, index: usize) -> bool {
        index < Self::CAPACITY && (self.0 & (1 << index)) != 0
    }

    /// Checks if every component in `other` is also in `self`.
    #[inline]
    #[must_use]
    pub const fn contains_all(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Adds component `index` to the set.
    #[inline]
    pub fn insert(&mut self, index: usize) {
        debug_assert!(index < Self::CAPACITY, "Component index out of range");
        self.0 |= 1 << index;
    }

    /// Removes component `index` from the set.
    #[inline]
    pub fn remove(&mut self, index: usize) {
        debug_assert!(index < Self::CAPACITY, "Component index out of range");
        self.0 &= !(1 << index);
    }

    /// Returns the number of components in the set.
    #[inline]
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Checks if the set is empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates over the component indices in ascending order.
    pub fn iter(self) -> impl Iterator<Item = usize> {
        let mut bits = self.0;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            let index = bits.trailing_zeros() as usize;
            bits &= bits - 1;
            Some(index)
        })
    }
}

impl FromIterator<usize> for Signature {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut signature = Self::EMPTY;
        for index in iter {
            signature.insert(index);
        }
        signature
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_insert_remove() {
        let mut signature = Signature::EMPTY;
        assert!(!signature.contains(5));

        signature.insert(5);
        assert!(signature.contains(5));
        assert_eq!(signature.len(), 1);

        signature.remove(5);
        assert!(signature.is_empty());
    }

    #[test]
    fn test_superset_matching() {
        let entity: Signature = [0, 2, 7].into_iter().collect();
        let query: Signature = [7, 0].into_iter().collect();

        assert!(entity.contains_all(query));
        assert!(!query.contains_all(entity));
        assert!(entity.contains_all(Signature::EMPTY));
    }

    #[test]
    fn test_iter_ascending() {
        let signature: Signature = [63, 1, 40].into_iter().collect();
        assert_eq!(signature.iter().collect::<Vec<_>>(), vec![1, 40, 63]);
        assert_eq!(format!("{signature:?}"), "{1, 40, 63}");
    }
}
