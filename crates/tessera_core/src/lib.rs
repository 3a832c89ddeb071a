//! # Tessera Core
//!
//! Generational object pools and the entity component store built on them:
//! - Handles are plain `{index, generation}` values that never dangle
//! - Slot reuse is detected, never silently aliased
//! - Bulk iteration hands out contiguous slices
//!
//! ## Architecture Rules
//!
//! 1. **Pools own their data** - callers hold handles, not references
//! 2. **Data-oriented design** - components live in per-type dense columns
//! 3. **Single owner** - nothing in this crate is internally synchronized
//!
//! ## Example
//!
//! ```rust
//! use tessera_core::{Handle, SlotPool};
//!
//! let mut pool = SlotPool::new();
//! let handle: Handle<&str> = pool.insert("mesh");
//! assert_eq!(pool.get(handle), Some(&"mesh"));
//!
//! pool.remove(handle);
//! assert!(pool.get(handle).is_none());
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod ecs;
pub mod error;
pub mod memory;
pub mod type_key;

pub use ecs::{
    Component, ComponentStore, Entity, EntityMut, EntityRecord, Query, Signature,
};
pub use error::{EcsError, EcsResult};
pub use memory::{
    ColumnGroup, ColumnPool, Handle, LimitedPool, RawHandle, Row, RowCursor, RowRef, Rows,
    SlotPool,
};
pub use type_key::{type_key, TypeInfo, TypeKey, TypeKeyRegistry};
