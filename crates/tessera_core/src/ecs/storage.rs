//! # Component Storage
//!
//! One dense column per component type per archetype. Row `i` of every
//! column in an archetype belongs to the same entity.
//!
//! ```text
//! archetype {Position, Velocity}
//! entities:    [ E4 ][ E0 ][ E7 ]
//! Position[]:  [ P4 ][ P0 ][ P7 ]
//! Velocity[]:  [ V4 ][ V0 ][ V7 ]
//! ```
//!
//! Rows are removed with `swap_remove`, so columns never have holes.

use std::any::{type_name, Any};

use super::component::Component;

/// Type-erased operations the store needs without knowing `C`.
pub(crate) trait ErasedColumn: 'static {
    /// Creates an empty column of the same component type.
    fn empty_like(&self) -> Box<dyn ErasedColumn>;

    /// Number of rows.
    fn len(&self) -> usize;

    /// Drops the value at `row`; the last row takes its place.
    fn swap_remove_row(&mut self, row: usize);

    /// Moves the value at `row` to the end of `target`; the last row takes
    /// its place.
    ///
    /// # Panics
    ///
    /// If `target` stores a different component type.
    fn move_row(&mut self, row: usize, target: &mut dyn ErasedColumn);

    /// Component type name, for diagnostics.
    fn component_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Storage for a single component type inside one archetype.
pub(crate) struct ComponentColumn<C: Component> {
    values: Vec<C>,
}

impl<C: Component> ComponentColumn<C> {
    pub(crate) fn new() -> Self {
        Self { values: Vec::new() }
    }

    #[inline]
    pub(crate) fn push(&mut self, value: C) {
        self.values.push(value);
    }

    #[inline]
    pub(crate) fn get(&self, row: usize) -> Option<&C> {
        self.values.get(row)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, row: usize) -> Option<&mut C> {
        self.values.get_mut(row)
    }

    /// All rows.
    #[inline]
    pub(crate) fn values_mut(&mut self) -> &mut [C] {
        &mut self.values
    }
}

impl<C: Component> ErasedColumn for ComponentColumn<C> {
    fn empty_like(&self) -> Box<dyn ErasedColumn> {
        Box::new(Self::new())
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn swap_remove_row(&mut self, row: usize) {
        drop(self.values.swap_remove(row));
    }

    fn move_row(&mut self, row: usize, target: &mut dyn ErasedColumn) {
        let target_name = target.component_name();
        let Some(target) = target.as_any_mut().downcast_mut::<Self>() else {
            panic!("cannot move {} into a column of {target_name}", type_name::<C>());
        };
        target.values.push(self.values.swap_remove(row));
    }

    fn component_name(&self) -> &'static str {
        type_name::<C>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
