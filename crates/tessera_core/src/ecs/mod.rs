//! # Entity Component System
//!
//! A signature-matching component store over generational handles.
//!
//! ## Design Philosophy
//!
//! - Entities are [`SlotPool`](crate::SlotPool) handles, so stale ones are detected
//! - A [`Signature`] bitmask per entity records which components it has
//! - Entities sharing a signature live in one archetype table, one dense
//!   column per component type
//! - Queries resolve types to columns once per matching table, not per entity

mod archetype;
mod component;
mod entity;
mod query;
mod signature;
mod storage;
mod store;

pub use component::Component;
pub use entity::{Entity, EntityRecord};
pub use query::{ColumnRef, Query};
pub use signature::Signature;
pub use store::{ComponentStore, EntityMut};
