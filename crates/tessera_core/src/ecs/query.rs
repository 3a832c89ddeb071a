//! # Queries
//!
//! A query is a tuple of component types, `(A,)` through `(A, B, C, D, E, F)`.
//! `for_each` resolves each type to its column once per matching archetype
//! and hands the callback one mutable slice per type, in the order the tuple
//! names them.

use super::component::Component;
use super::storage::{ComponentColumn, ErasedColumn};
use crate::type_key::{type_key, TypeKey};

mod sealed {
    pub trait Sealed {}
}

/// Mutable access to one column, handed to [`Query::fetch`].
pub struct ColumnRef<'s>(&'s mut dyn ErasedColumn);

impl<'s> ColumnRef<'s> {
    pub(crate) fn new(column: &'s mut dyn ErasedColumn) -> Self {
        Self(column)
    }

    fn into_slice<C: Component>(self) -> &'s mut [C] {
        let column = self.0;
        let name = column.component_name();
        match column.as_any_mut().downcast_mut::<ComponentColumn<C>>() {
            Some(column) => column.values_mut(),
            None => panic!(
                "column of {name} fetched as {}",
                std::any::type_name::<C>()
            ),
        }
    }
}

/// A set of component types iterated together by
/// [`ComponentStore::for_each`](super::ComponentStore::for_each).
///
/// Implemented for tuples of 1 to 6 distinct components. There is no
/// implementation for `()`: a query always names at least one type.
pub trait Query<'s>: sealed::Sealed {
    /// One `&mut [C]` per requested component, in requested order.
    type Slices;

    /// Type keys in requested order.
    #[doc(hidden)]
    fn keys() -> Vec<TypeKey>;

    /// Downcasts columns (given in requested order) to full-length slices.
    #[doc(hidden)]
    fn fetch(columns: Vec<ColumnRef<'s>>) -> Self::Slices;
}

macro_rules! impl_query {
    ($($name:ident),+) => {
        impl<$($name: Component),+> sealed::Sealed for ($($name,)+) {}

        impl<'s, $($name: Component),+> Query<'s> for ($($name,)+) {
            type Slices = ($(&'s mut [$name],)+);

            fn keys() -> Vec<TypeKey> {
                vec![$(type_key::<$name>()),+]
            }

            fn fetch(columns: Vec<ColumnRef<'s>>) -> Self::Slices {
                let mut columns = columns.into_iter();
                ($(
                    columns
                        .next()
                        .expect("one column per requested type")
                        .into_slice::<$name>(),
                )+)
            }
        }
    };
}

impl_query!(A);
impl_query!(A, B);
impl_query!(A, B, C);
impl_query!(A, B, C, D);
impl_query!(A, B, C, D, E);
impl_query!(A, B, C, D, E, F);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default, Debug, PartialEq)]
    struct Foo(u32);

    #[derive(Default, Debug, PartialEq)]
    struct Bar(u32);

    #[test]
    fn test_keys_follow_requested_order() {
        assert_eq!(
            <(Foo, Bar) as Query<'_>>::keys(),
            vec![type_key::<Foo>(), type_key::<Bar>()]
        );
        assert_eq!(
            <(Bar, Foo) as Query<'_>>::keys(),
            vec![type_key::<Bar>(), type_key::<Foo>()]
        );
    }

    #[test]
    fn test_fetch_follows_requested_order() {
        let mut foos = ComponentColumn::<Foo>::new();
        let mut bars = ComponentColumn::<Bar>::new();
        for index in 0..4 {
            foos.push(Foo(index));
            bars.push(Bar(index * 10));
        }

        let columns = vec![ColumnRef::new(&mut bars), ColumnRef::new(&mut foos)];
        let (bars_slice, foos_slice) = <(Bar, Foo) as Query<'_>>::fetch(columns);

        assert_eq!(bars_slice.len(), 4);
        assert_eq!(bars_slice[3], Bar(30));
        foos_slice[1].0 = 99;
        assert_eq!(foos.get(1), Some(&Foo(99)));
    }

    #[test]
    #[should_panic(expected = "fetched as")]
    fn test_fetch_wrong_column_panics() {
        let mut bars = ComponentColumn::<Bar>::new();
        let _ = <(Foo,) as Query<'_>>::fetch(vec![ColumnRef::new(&mut bars)]);
    }
}
