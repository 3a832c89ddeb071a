//! # Multi-Column Pool
//!
//! Structure-of-arrays version of [`SlotPool`]: one handle addresses the same
//! row across several independently typed columns.
//!
//! ```text
//! row:        0        1        2
//! mesh:     [ M0 ]   [ -- ]   [ M2 ]
//! bounds:   [ B0 ]   [ -- ]   [ B2 ]
//! material: [ T0 ]   [ -- ]   [ T2 ]
//!                      ^ removed row, nothing else moved
//! ```
//!
//! Rows are removed in place. No other row is relocated, so every other
//! outstanding handle keeps pointing at the same data.

use std::any::{type_name, Any};
use std::fmt;

use super::handle::Handle;
use super::pool::SlotPool;
use crate::type_key::{type_key, TypeKey};

/// A tuple of column values that can be stored as one row.
///
/// Implemented for tuples of 1 to 8 `'static` types. Column types within a
/// row must be distinct.
pub trait Row: Sized + 'static {
    /// Per-column storage, one `Vec<Option<T>>` per tuple element.
    type Columns: Default;

    /// Keys of the column types in declaration order.
    fn keys() -> Vec<TypeKey>;

    /// Writes a row at `index` (which is at most the current column length).
    fn put(columns: &mut Self::Columns, index: usize, row: Self);

    /// Moves the row at `index` out of the columns.
    fn take(columns: &mut Self::Columns, index: usize) -> Option<Self>;

    /// Drops every stored value, keeping the column lengths.
    fn clear(columns: &mut Self::Columns);

    /// Returns the column holding `T`, if the row has one.
    fn column<T: 'static>(columns: &Self::Columns) -> Option<&[Option<T>]>;

    /// Returns the column holding `T` mutably, if the row has one.
    fn column_mut<T: 'static>(columns: &mut Self::Columns) -> Option<&mut [Option<T>]>;
}

macro_rules! impl_row {
    ($(($name:ident, $column:ident, $value:ident)),+) => {
        impl<$($name: 'static),+> Row for ($($name,)+) {
            type Columns = ($(Vec<Option<$name>>,)+);

            fn keys() -> Vec<TypeKey> {
                vec![$(type_key::<$name>()),+]
            }

            fn put(columns: &mut Self::Columns, index: usize, row: Self) {
                let ($($column,)+) = columns;
                let ($($value,)+) = row;
                $(
                    debug_assert!(index <= $column.len(), "Row index skips ahead of column");
                    if index == $column.len() {
                        $column.push(Some($value));
                    } else {
                        $column[index] = Some($value);
                    }
                )+
            }

            fn take(columns: &mut Self::Columns, index: usize) -> Option<Self> {
                let ($($column,)+) = columns;
                Some(($($column.get_mut(index)?.take()?,)+))
            }

            fn clear(columns: &mut Self::Columns) {
                let ($($column,)+) = columns;
                $(
                    for value in $column.iter_mut() {
                        *value = None;
                    }
                )+
            }

            fn column<T: 'static>(columns: &Self::Columns) -> Option<&[Option<T>]> {
                let ($($column,)+) = columns;
                $(
                    let any: &dyn Any = $column;
                    if let Some(found) = any.downcast_ref::<Vec<Option<T>>>() {
                        return Some(found.as_slice());
                    }
                )+
                None
            }

            fn column_mut<T: 'static>(columns: &mut Self::Columns) -> Option<&mut [Option<T>]> {
                let ($($column,)+) = columns;
                $(
                    let any: &mut dyn Any = $column;
                    if let Some(found) = any.downcast_mut::<Vec<Option<T>>>() {
                        return Some(found.as_mut_slice());
                    }
                )+
                None
            }
        }
    };
}

impl_row!((A, a, va));
impl_row!((A, a, va), (B, b, vb));
impl_row!((A, a, va), (B, b, vb), (C, c, vc));
impl_row!((A, a, va), (B, b, vb), (C, c, vc), (D, d, vd));
impl_row!((A, a, va), (B, b, vb), (C, c, vc), (D, d, vd), (E, e, ve));
impl_row!((A, a, va), (B, b, vb), (C, c, vc), (D, d, vd), (E, e, ve), (F, f, vf));
impl_row!((A, a, va), (B, b, vb), (C, c, vc), (D, d, vd), (E, e, ve), (F, f, vf), (G, g, vg));
impl_row!((A, a, va), (B, b, vb), (C, c, vc), (D, d, vd), (E, e, ve), (F, f, vf), (G, g, vg), (H, h, vh));

/// A generational pool whose rows are spread over several typed columns.
///
/// Index, generation and free-list bookkeeping is delegated to a
/// `SlotPool<()>`, so handles behave exactly like slot pool handles: a
/// removed row bumps its generation and a reused row is never reachable
/// through a handle taken before the removal.
///
/// # Thread Safety
///
/// NOT thread-safe, same as [`SlotPool`].
///
/// # Example
///
/// ```rust
/// use tessera_core::ColumnPool;
///
/// let mut meshes: ColumnPool<(u32, &str)> = ColumnPool::new();
/// let cube = meshes.insert((36, "cube"));
/// let quad = meshes.insert((6, "quad"));
///
/// assert_eq!(meshes.get::<u32>(quad), Some(&6));
/// assert_eq!(meshes.find::<&&str, _>(|name| *name == "cube"), cube);
/// ```
pub struct ColumnPool<R: Row> {
    /// Row liveness, generations and free list.
    rows: SlotPool<()>,
    /// Column data, indexed by row.
    columns: R::Columns,
}

impl<R: Row> ColumnPool<R> {
    /// Creates an empty, growable pool.
    ///
    /// # Panics
    ///
    /// Panics if the row repeats a column type.
    #[must_use]
    pub fn new() -> Self {
        Self::assert_distinct_columns();
        Self {
            rows: SlotPool::new(),
            columns: R::Columns::default(),
        }
    }

    /// Creates a bounded pool that holds at most `limit` rows.
    ///
    /// # Panics
    ///
    /// Panics if the row repeats a column type, or `limit` is zero.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self::assert_distinct_columns();
        Self {
            rows: SlotPool::with_limit(limit),
            columns: R::Columns::default(),
        }
    }

    fn assert_distinct_columns() {
        let mut keys = R::keys();
        keys.sort_unstable();
        assert!(
            keys.windows(2).all(|pair| pair[0] != pair[1]),
            "column types of a ColumnPool must be distinct: {keys:?}"
        );
    }

    /// Returns the number of live rows.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    /// Checks if there are no live rows.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the number of rows ever created (live or dead).
    #[inline]
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.rows.slot_count()
    }

    /// Returns the limit of a bounded pool.
    #[inline]
    #[must_use]
    pub const fn limit(&self) -> Option<usize> {
        self.rows.limit()
    }

    /// Stores one value per column in a single row.
    ///
    /// Returns [`Handle::NULL`] if the pool is bounded and full; the row is
    /// dropped in that case.
    pub fn insert(&mut self, row: R) -> Handle<R> {
        let handle = self.rows.insert(());
        if handle.is_null() {
            return Handle::NULL;
        }

        R::put(&mut self.columns, handle.index() as usize, row);
        handle.cast()
    }

    /// Checks if `handle` refers to a live row.
    #[inline]
    #[must_use]
    pub fn contains(&self, handle: Handle<R>) -> bool {
        self.rows.contains(handle.cast())
    }

    /// Gets the value of column `T` in the row behind `handle`.
    ///
    /// Returns `None` for null, stale, or removed rows.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not one of the pool's column types.
    #[must_use]
    pub fn get<T: 'static>(&self, handle: Handle<R>) -> Option<&T> {
        if !self.contains(handle) {
            return None;
        }
        self.column::<T>()
            .get(handle.index() as usize)
            .and_then(Option::as_ref)
    }

    /// Gets the value of column `T` in the row behind `handle` mutably.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not one of the pool's column types.
    pub fn get_mut<T: 'static>(&mut self, handle: Handle<R>) -> Option<&mut T> {
        if !self.contains(handle) {
            return None;
        }
        let Some(column) = R::column_mut::<T>(&mut self.columns) else {
            panic!("{} is not a column of this pool", type_name::<T>());
        };
        column
            .get_mut(handle.index() as usize)
            .and_then(Option::as_mut)
    }

    /// Returns a view of the row behind `handle`.
    #[must_use]
    pub fn get_row(&self, handle: Handle<R>) -> Option<RowRef<'_, R>> {
        self.contains(handle).then(|| self.row_ref(handle))
    }

    /// Gathers several columns of one row at once.
    ///
    /// `G` is a tuple of column references in any order, or a named view
    /// implementing [`ColumnGroup`].
    #[must_use]
    pub fn get_group<'a, G>(&'a self, handle: Handle<R>) -> Option<G>
    where
        G: ColumnGroup<'a>,
    {
        self.get_row(handle).map(G::gather)
    }

    /// Returns the first live row, in row order, for which `predicate` holds.
    ///
    /// The predicate receives the requested columns in the order `G` lists
    /// them, independent of how the pool stores them. Returns
    /// [`Handle::NULL`] if no row matches.
    pub fn find<'a, G, F>(&'a self, mut predicate: F) -> Handle<R>
    where
        G: ColumnGroup<'a>,
        F: FnMut(G) -> bool,
    {
        self.iter()
            .find(|(_, row)| predicate(G::gather(*row)))
            .map_or(Handle::NULL, |(handle, _)| handle)
    }

    /// Removes the row behind `handle` and returns its values.
    ///
    /// Only that row is touched; stale handles are a no-op.
    pub fn remove(&mut self, handle: Handle<R>) -> Option<R> {
        self.rows.remove(handle.cast())?;
        R::take(&mut self.columns, handle.index() as usize)
    }

    /// Returns a handle to the first live row, or [`Handle::NULL`] if empty.
    #[must_use]
    pub fn first(&self) -> Handle<R> {
        self.rows.first().cast()
    }

    /// Removes every row. All outstanding handles become stale.
    pub fn clear(&mut self) {
        self.rows.clear();
        R::clear(&mut self.columns);
    }

    /// Iterates over live rows in row order.
    #[must_use]
    pub fn iter(&self) -> Rows<'_, R> {
        Rows {
            pool: self,
            cursor: self.begin(),
        }
    }

    /// Cursor at the first live row, or [`ColumnPool::end`] if empty.
    #[must_use]
    pub fn begin(&self) -> RowCursor {
        self.seek(0)
    }

    /// Cursor one past the last row.
    #[must_use]
    pub fn end(&self) -> RowCursor {
        RowCursor {
            index: self.slot_count(),
        }
    }

    /// Cursor at an arbitrary row position, live or dead.
    #[must_use]
    pub const fn cursor_at(&self, index: usize) -> RowCursor {
        RowCursor { index }
    }

    /// Cursor at the next live row after `cursor`.
    #[must_use]
    pub fn advance(&self, cursor: RowCursor) -> RowCursor {
        self.seek(cursor.index + 1)
    }

    /// Handle of the row under `cursor`, or [`Handle::NULL`] if that row is dead.
    #[must_use]
    pub fn handle_at(&self, cursor: RowCursor) -> Handle<R> {
        u32::try_from(cursor.index).map_or(Handle::NULL, |index| self.rows.handle_at(index).cast())
    }

    /// First live row at or after `from`.
    fn seek(&self, from: usize) -> RowCursor {
        let end = self.slot_count();
        let index = (from..end)
            .find(|&index| !self.rows.handle_at(index as u32).is_null())
            .unwrap_or(end);
        RowCursor { index }
    }

    fn row_ref(&self, handle: Handle<R>) -> RowRef<'_, R> {
        RowRef {
            columns: &self.columns,
            index: handle.index() as usize,
            handle,
        }
    }

    fn column<T: 'static>(&self) -> &[Option<T>] {
        let Some(column) = R::column::<T>(&self.columns) else {
            panic!("{} is not a column of this pool", type_name::<T>());
        };
        column
    }
}

impl<R: Row> Default for ColumnPool<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Row> fmt::Debug for ColumnPool<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnPool")
            .field("columns", &R::keys())
            .field("len", &self.len())
            .field("slot_count", &self.slot_count())
            .finish()
    }
}

/// Position of a row in a [`ColumnPool`].
///
/// Cursors compare by position only. A cursor taken at a row that is later
/// removed still equals any cursor built for that position with
/// [`ColumnPool::cursor_at`], so dead rows keep a stable, comparable identity.
/// Whether the row is live is answered by [`ColumnPool::handle_at`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowCursor {
    index: usize,
}

impl RowCursor {
    /// Returns the row position.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.index
    }
}

/// Borrowed view of one live row.
pub struct RowRef<'a, R: Row> {
    columns: &'a R::Columns,
    index: usize,
    handle: Handle<R>,
}

impl<'a, R: Row> RowRef<'a, R> {
    /// Handle of the row.
    #[inline]
    #[must_use]
    pub const fn handle(self) -> Handle<R> {
        self.handle
    }

    /// Value of column `T` in this row.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not one of the pool's column types.
    #[must_use]
    pub fn column<T: 'static>(self) -> &'a T {
        let value = R::column::<T>(self.columns)
            .and_then(|column| column.get(self.index))
            .and_then(Option::as_ref);
        let Some(value) = value else {
            panic!("{} is not a column of this pool", type_name::<T>());
        };
        value
    }
}

impl<R: Row> Clone for RowRef<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: Row> Copy for RowRef<'_, R> {}

/// A set of columns read together from one row.
///
/// Implemented for `&T` and for tuples of up to 8 column references. Named
/// views implement it by pulling each field from the row:
///
/// ```rust
/// use tessera_core::{ColumnGroup, ColumnPool, Row, RowRef};
///
/// struct MeshView<'a> {
///     vertex_count: &'a u32,
///     name: &'a String,
/// }
///
/// impl<'a> ColumnGroup<'a> for MeshView<'a> {
///     fn gather<R: Row>(row: RowRef<'a, R>) -> Self {
///         Self {
///             vertex_count: row.column(),
///             name: row.column(),
///         }
///     }
/// }
///
/// let mut meshes: ColumnPool<(String, u32)> = ColumnPool::new();
/// let cube = meshes.insert(("cube".to_owned(), 36));
/// let view: MeshView<'_> = meshes.get_group(cube).unwrap();
/// assert_eq!(*view.vertex_count, 36);
/// ```
pub trait ColumnGroup<'a>: Sized {
    /// Reads the group out of a live row.
    fn gather<R: Row>(row: RowRef<'a, R>) -> Self;
}

impl<'a, T: 'static> ColumnGroup<'a> for &'a T {
    fn gather<R: Row>(row: RowRef<'a, R>) -> Self {
        row.column::<T>()
    }
}

macro_rules! impl_column_group {
    ($($name:ident),+) => {
        impl<'a, $($name: 'static),+> ColumnGroup<'a> for ($(&'a $name,)+) {
            fn gather<R: Row>(row: RowRef<'a, R>) -> Self {
                ($(row.column::<$name>(),)+)
            }
        }
    };
}

impl_column_group!(A);
impl_column_group!(A, B);
impl_column_group!(A, B, C);
impl_column_group!(A, B, C, D);
impl_column_group!(A, B, C, D, E);
impl_column_group!(A, B, C, D, E, F);
impl_column_group!(A, B, C, D, E, F, G);
impl_column_group!(A, B, C, D, E, F, G, H);

/// Iterator over the live rows of a [`ColumnPool`].
pub struct Rows<'a, R: Row> {
    pool: &'a ColumnPool<R>,
    cursor: RowCursor,
}

impl<'a, R: Row> Iterator for Rows<'a, R> {
    type Item = (Handle<R>, RowRef<'a, R>);

    fn next(&mut self) -> Option<Self::Item> {
        let pool = self.pool;
        if self.cursor == pool.end() {
            return None;
        }

        let handle = pool.handle_at(self.cursor);
        self.cursor = pool.advance(self.cursor);
        debug_assert!(!handle.is_null(), "Cursor stopped on a dead row");
        Some((handle, pool.row_ref(handle)))
    }
}
