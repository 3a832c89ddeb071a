//! # Component System
//!
//! Components are pure data containers with no behavior.

/// Marker trait for ECS components.
///
/// Components must be:
/// - `'static`: identified by [`TypeKey`](crate::TypeKey)
/// - `Default`: removing a component takes the value out of its row and
///   leaves the default behind while the row moves tables
///
/// Every such type is a component; there is nothing to implement.
///
/// # Example
///
/// ```rust
/// #[derive(Clone, Copy, Default)]
/// struct Velocity {
///     x: f32,
///     y: f32,
///     z: f32,
/// }
///
/// fn assert_component<C: tessera_core::Component>() {}
/// assert_component::<Velocity>();
/// ```
pub trait Component: Default + 'static {}

impl<T: Default + 'static> Component for T {}
