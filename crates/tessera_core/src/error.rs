//! # Core Error Types
//!
//! Contract violations of the component store.
//!
//! Stale handles and exhausted bounded pools are not errors: they are
//! reported through `Option` and [`Handle::NULL`](crate::Handle::NULL).
//! The variants below describe programming mistakes. The panicking API
//! uses their `Display` text; the `try_*` API hands them back instead.

use thiserror::Error;

/// Errors that can occur while building or using a component store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// A component type was used before `register_component`.
    #[error("component type not registered: {0}")]
    UnregisteredComponent(&'static str),

    /// A component type was registered twice.
    #[error("component type already registered: {0}")]
    AlreadyRegistered(&'static str),

    /// The store cannot track any more component types.
    #[error("too many component types: capacity {capacity}, tried to add {name}")]
    TooManyComponents {
        /// Maximum number of component types.
        capacity: usize,
        /// The type that did not fit.
        name: &'static str,
    },

    /// The entity handle is null or was destroyed.
    #[error("entity is not alive: index {index}, generation {generation}")]
    StaleEntity {
        /// Slot index of the handle.
        index: u32,
        /// Generation of the handle.
        generation: u32,
    },
}

/// Result type for component store operations.
pub type EcsResult<T> = Result<T, EcsError>;
