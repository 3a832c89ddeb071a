//! # Archetype Tables
//!
//! Entities with the same signature are stored together in one table.
//!
//! ```text
//! archetype {Position}            archetype {Position, Velocity}
//! entities:   [ E1 ][ E3 ]        entities:   [ E0 ][ E2 ][ E4 ]
//! Position[]: [ P1 ][ P3 ]        Position[]: [ P0 ][ P2 ][ P4 ]
//!                                 Velocity[]: [ V0 ][ V2 ][ V4 ]
//! ```
//!
//! Adding or removing a component moves the entity's row to the table of
//! its new signature. Every table stays dense, so a query visits one
//! contiguous slice per matching table no matter how signatures interleave
//! in creation order.

use super::component::Component;
use super::entity::Entity;
use super::query::ColumnRef;
use super::signature::Signature;
use super::storage::{ComponentColumn, ErasedColumn};

/// One table per distinct signature.
pub(crate) struct Archetype {
    signature: Signature,
    /// Owner of each row.
    entities: Vec<Entity>,
    /// One column per component in `signature`, in ascending index order.
    columns: Vec<Box<dyn ErasedColumn>>,
}

impl Archetype {
    /// Creates an empty table; `prototypes` holds one column per registered
    /// component, in registry order.
    pub(crate) fn new(signature: Signature, prototypes: &[Box<dyn ErasedColumn>]) -> Self {
        Self {
            signature,
            entities: Vec::new(),
            columns: signature
                .iter()
                .map(|index| prototypes[index].empty_like())
                .collect(),
        }
    }

    #[inline]
    pub(crate) fn signature(&self) -> Signature {
        self.signature
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Row owners, in row order.
    #[cfg(test)]
    pub(crate) fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Position of component `index` among this table's columns.
    #[inline]
    fn position(&self, index: usize) -> Option<usize> {
        self.signature
            .contains(index)
            .then(|| (self.signature.bits() & ((1_u64 << index) - 1)).count_ones() as usize)
    }

    pub(crate) fn column<C: Component>(&self, index: usize) -> Option<&ComponentColumn<C>> {
        let position = self.position(index)?;
        self.columns[position]
            .as_any()
            .downcast_ref::<ComponentColumn<C>>()
    }

    pub(crate) fn column_mut<C: Component>(
        &mut self,
        index: usize,
    ) -> Option<&mut ComponentColumn<C>> {
        let position = self.position(index)?;
        self.columns[position]
            .as_any_mut()
            .downcast_mut::<ComponentColumn<C>>()
    }

    /// Appends `entity` as a new row and returns the row.
    ///
    /// Only valid for the empty signature; other tables receive rows through
    /// [`Archetype::move_row`].
    pub(crate) fn push_entity(&mut self, entity: Entity) -> usize {
        debug_assert!(self.columns.is_empty(), "row pushed without its components");
        self.entities.push(entity);
        self.entities.len() - 1
    }

    /// Drops `row` from every column.
    ///
    /// Returns the entity that now occupies `row`, if any.
    pub(crate) fn swap_remove(&mut self, row: usize) -> Option<Entity> {
        for column in &mut self.columns {
            column.swap_remove_row(row);
        }
        self.entities.swap_remove(row);
        self.entities.get(row).copied()
    }

    /// Moves `row` to the end of `target`.
    ///
    /// Columns both tables share are moved; columns `target` lacks are
    /// dropped. Columns only `target` has are left one row short for the
    /// caller to fill. Returns the entity that now occupies `row` here.
    pub(crate) fn move_row(&mut self, row: usize, target: &mut Archetype) -> Option<Entity> {
        for (index, column) in self.signature.iter().zip(self.columns.iter_mut()) {
            match target.position(index) {
                Some(position) => column.move_row(row, target.columns[position].as_mut()),
                None => column.swap_remove_row(row),
            }
        }
        target.entities.push(self.entities.swap_remove(row));
        self.entities.get(row).copied()
    }

    /// Borrows the columns for `requested` component indices, in requested
    /// order. Every index must be in this table's signature.
    pub(crate) fn query_columns<'s>(&'s mut self, requested: &[usize]) -> Vec<ColumnRef<'s>> {
        let mut slots: Vec<Option<ColumnRef<'s>>> = requested.iter().map(|_| None).collect();
        for (index, column) in self.signature.iter().zip(self.columns.iter_mut()) {
            if let Some(position) = requested.iter().position(|&r| r == index) {
                slots[position] = Some(ColumnRef::new(&mut **column));
            }
        }
        debug_assert!(slots.iter().all(Option::is_some), "query outside signature");
        slots.into_iter().flatten().collect()
    }

    /// Component type names with their row counts.
    pub(crate) fn describe(&self) -> Vec<(&'static str, usize)> {
        self.columns
            .iter()
            .map(|column| (column.component_name(), column.len()))
            .collect()
    }
}

/// Borrows two distinct tables at once.
///
/// # Panics
///
/// If `a == b`.
pub(crate) fn pair_mut(
    archetypes: &mut [Archetype],
    a: usize,
    b: usize,
) -> (&mut Archetype, &mut Archetype) {
    assert_ne!(a, b, "archetype paired with itself");
    if a < b {
        let (left, right) = archetypes.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = archetypes.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Foo(u32);

    #[derive(Debug, Default, PartialEq)]
    struct Bar(u32);

    #[derive(Debug, Default, PartialEq)]
    struct Baz(u32);

    fn prototypes() -> Vec<Box<dyn ErasedColumn>> {
        vec![
            Box::new(ComponentColumn::<Foo>::new()),
            Box::new(ComponentColumn::<Bar>::new()),
            Box::new(ComponentColumn::<Baz>::new()),
        ]
    }

    fn signature(indices: &[usize]) -> Signature {
        indices.iter().copied().collect()
    }

    #[test]
    fn test_columns_follow_signature() {
        let archetype = Archetype::new(signature(&[0, 2]), &prototypes());
        assert!(archetype.column::<Foo>(0).is_some());
        assert!(archetype.column::<Bar>(1).is_none());
        assert!(archetype.column::<Baz>(2).is_some());
        // Right index, wrong type.
        assert!(archetype.column::<Foo>(2).is_none());
        assert!(archetype.is_empty());
    }

    #[test]
    fn test_move_row_keeps_shared_and_drops_missing() {
        let prototypes = prototypes();
        let mut tables = vec![
            Archetype::new(signature(&[0, 1]), &prototypes),
            Archetype::new(signature(&[0, 2]), &prototypes),
        ];
        let (a, b) = (Entity::new(1, 1), Entity::new(2, 1));
        for (n, entity) in [a, b].into_iter().enumerate() {
            let n = u32::try_from(n).unwrap();
            tables[0].entities.push(entity);
            tables[0].column_mut::<Foo>(0).unwrap().push(Foo(n));
            tables[0].column_mut::<Bar>(1).unwrap().push(Bar(n));
        }

        let (source, target) = pair_mut(&mut tables, 0, 1);
        let moved = source.move_row(0, target);
        target.column_mut::<Baz>(2).unwrap().push(Baz(7));

        assert_eq!(moved, Some(b));
        assert_eq!(source.entities(), &[b]);
        assert_eq!(source.column::<Foo>(0).unwrap().get(0), Some(&Foo(1)));
        assert_eq!(source.column::<Bar>(1).unwrap().get(0), Some(&Bar(1)));

        assert_eq!(target.entities(), &[a]);
        assert_eq!(target.column::<Foo>(0).unwrap().get(0), Some(&Foo(0)));
        assert_eq!(target.column::<Baz>(2).unwrap().get(0), Some(&Baz(7)));
        assert_eq!(target.describe().iter().map(|(_, n)| *n).collect::<Vec<_>>(), [1, 1]);
    }

    #[test]
    fn test_swap_remove_last_row_reports_nothing_moved() {
        let mut table = Archetype::new(Signature::EMPTY, &prototypes());
        let a = Entity::new(1, 1);
        let b = Entity::new(2, 1);
        table.push_entity(a);
        table.push_entity(b);

        assert_eq!(table.swap_remove(1), None);
        assert_eq!(table.swap_remove(0), None);
        assert!(table.is_empty());
    }

    #[test]
    fn test_query_columns_in_requested_order() {
        let mut table = Archetype::new(signature(&[0, 1]), &prototypes());
        table.entities.push(Entity::new(1, 1));
        table.column_mut::<Foo>(0).unwrap().push(Foo(1));
        table.column_mut::<Bar>(1).unwrap().push(Bar(2));

        let columns = table.query_columns(&[1, 0]);
        assert_eq!(columns.len(), 2);
    }

    #[test]
    #[should_panic(expected = "paired with itself")]
    fn test_pair_mut_same_index_panics() {
        let mut tables = vec![Archetype::new(Signature::EMPTY, &[])];
        let _ = pair_mut(&mut tables, 0, 0);
    }
}
