//! # Memory Management
//!
//! Generational pools that own their objects and hand out value handles.
//!
//! ## Design Philosophy
//!
//! External code never holds pointers into a pool. It holds a [`Handle`]
//! (index + generation), and every access goes back through the pool:
//! - Growth and relocation never invalidate handles
//! - Use-after-free is detected, not undefined
//! - Insert and remove are O(1) amortized

mod columns;
mod handle;
mod pool;

pub use columns::{ColumnGroup, ColumnPool, Row, RowCursor, RowRef, Rows};
pub use handle::{Handle, RawHandle};
pub use pool::{LimitedPool, SlotPool};
