//! # Component Store
//!
//! Owns the entity table, the type registry and one archetype table per
//! distinct signature.
//!
//! ## Iteration
//!
//! Every entity lives in the table of its signature, and each table is
//! dense. `for_each` visits the tables whose signature contains the
//! requested set and calls back once per non-empty table, so the number of
//! calls is bounded by the number of signatures, not by how entities with
//! different signatures interleave.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, trace};

use super::archetype::{pair_mut, Archetype};
use super::component::Component;
use super::entity::{Entity, EntityRecord};
use super::query::Query;
use super::signature::Signature;
use super::storage::{ComponentColumn, ErasedColumn};
use crate::error::{EcsError, EcsResult};
use crate::memory::SlotPool;
use crate::type_key::TypeKeyRegistry;

/// Table of entities with no components.
const EMPTY_ARCHETYPE: usize = 0;

/// The entity component store.
///
/// # Example
///
/// ```rust
/// use tessera_core::ComponentStore;
///
/// #[derive(Default)]
/// struct Health(u32);
///
/// let mut store = ComponentStore::new();
/// store.register_component::<Health>();
///
/// let entity = store.create_entity();
/// store.add_component(entity, Health(10));
///
/// store.for_each::<(Health,), _>(|(health,), count| {
///     for h in &mut health[..count] {
///         h.0 -= 1;
///     }
/// });
///
/// assert_eq!(store.get_component::<Health>(entity).map(|h| h.0), Some(9));
/// ```
pub struct ComponentStore {
    /// Entity table; each record locates the entity's row.
    entities: SlotPool<EntityRecord>,
    /// Component type to component index.
    registry: TypeKeyRegistry,
    /// One empty column per registered type, in registry order. New tables
    /// clone their columns from these.
    prototypes: Vec<Box<dyn ErasedColumn>>,
    /// Archetype tables; index 0 is the empty signature.
    archetypes: Vec<Archetype>,
    by_signature: HashMap<Signature, usize>,
}

impl ComponentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty store with room for `entities` entities.
    #[must_use]
    pub fn with_capacity(entities: usize) -> Self {
        Self {
            entities: SlotPool::with_capacity(entities),
            registry: TypeKeyRegistry::new(Signature::CAPACITY),
            prototypes: Vec::new(),
            archetypes: vec![Archetype::new(Signature::EMPTY, &[])],
            by_signature: HashMap::from([(Signature::EMPTY, EMPTY_ARCHETYPE)]),
        }
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Registers `C`.
    ///
    /// # Panics
    ///
    /// If `C` is already registered or the store already tracks 64 types.
    pub fn register_component<C: Component>(&mut self) {
        if let Err(error) = self.try_register_component::<C>() {
            panic!("{error}");
        }
    }

    /// Registers `C`, returning its index.
    ///
    /// # Errors
    ///
    /// [`EcsError::AlreadyRegistered`] or [`EcsError::TooManyComponents`].
    pub fn try_register_component<C: Component>(&mut self) -> EcsResult<usize> {
        let index = self.registry.register::<C>()?;
        debug_assert_eq!(index, self.prototypes.len());
        self.prototypes.push(Box::new(ComponentColumn::<C>::new()));

        debug!(
            component = std::any::type_name::<C>(),
            index, "Registered component"
        );
        Ok(index)
    }

    /// Checks if `C` is registered.
    #[must_use]
    pub fn is_registered<C: Component>(&self) -> bool {
        self.registry.index_of_type::<C>().is_some()
    }

    /// Returns the number of registered component types.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.registry.len()
    }

    /// Returns the number of archetype tables, the empty one included.
    ///
    /// Tables are created on first use and kept when they empty out.
    #[must_use]
    pub fn archetype_count(&self) -> usize {
        self.archetypes.len()
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Creates an entity with an empty signature.
    pub fn create_entity(&mut self) -> Entity {
        let row = self.archetypes[EMPTY_ARCHETYPE].len();
        let entity = self
            .entities
            .insert(EntityRecord::new(Signature::EMPTY, EMPTY_ARCHETYPE, row));
        self.archetypes[EMPTY_ARCHETYPE].push_entity(entity);
        entity
    }

    /// Destroys an entity and every component attached to it.
    ///
    /// Returns `false` if the entity was already dead.
    pub fn destroy_entity(&mut self, entity: Entity) -> bool {
        let Some(record) = self.entities.remove(entity) else {
            return false;
        };

        let moved = self.archetypes[record.archetype()].swap_remove(record.row());
        self.relocate(moved, record.row());
        trace!(?entity, components = record.signature().len(), "Destroyed entity");
        true
    }

    /// Checks if an entity is alive.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.contains(entity)
    }

    /// Returns the number of live entities.
    #[inline]
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Iterates over live entities in slot order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.handles()
    }

    /// Returns the signature of a live entity.
    #[must_use]
    pub fn signature(&self, entity: Entity) -> Option<Signature> {
        self.entities.get(entity).map(EntityRecord::signature)
    }

    /// Returns a view that edits one entity.
    ///
    /// `None` if the entity is dead.
    pub fn entity_mut(&mut self, entity: Entity) -> Option<EntityMut<'_>> {
        if !self.is_alive(entity) {
            return None;
        }
        Some(EntityMut {
            store: self,
            entity,
        })
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Attaches `value` to `entity`.
    ///
    /// Re-adding a component the entity already has overwrites it in place and
    /// returns the previous value. Returns `None` for a dead entity.
    ///
    /// # Panics
    ///
    /// If `C` is not registered.
    pub fn add_component<C: Component>(&mut self, entity: Entity, value: C) -> Option<C> {
        match self.try_add_component(entity, value) {
            Ok(previous) => previous,
            Err(EcsError::StaleEntity { .. }) => None,
            Err(error) => panic!("{error}"),
        }
    }

    /// Attaches `value` to `entity`, reporting misuse as an error.
    ///
    /// Moves the entity to the table of its new signature unless it already
    /// had `C`.
    ///
    /// # Errors
    ///
    /// [`EcsError::UnregisteredComponent`] or [`EcsError::StaleEntity`].
    pub fn try_add_component<C: Component>(
        &mut self,
        entity: Entity,
        value: C,
    ) -> EcsResult<Option<C>> {
        let index = self
            .registry
            .index_of_type::<C>()
            .ok_or(EcsError::UnregisteredComponent(std::any::type_name::<C>()))?;

        let record = *self.entities.get(entity).ok_or(EcsError::StaleEntity {
            index: entity.index(),
            generation: entity.generation(),
        })?;

        if record.signature().contains(index) {
            let slot = self.archetypes[record.archetype()]
                .column_mut::<C>(index)
                .and_then(|column| column.get_mut(record.row()));
            return Ok(slot.map(|slot| std::mem::replace(slot, value)));
        }

        let mut signature = record.signature();
        signature.insert(index);
        let target = self.move_entity(entity, record, signature);
        let Some(column) = self.archetypes[target].column_mut::<C>(index) else {
            unreachable!("archetype {signature:?} lacks column {index}");
        };
        column.push(value);
        Ok(None)
    }

    /// Detaches `C` from `entity`, returning the value.
    ///
    /// Moves the entity to the table of its new signature.
    pub fn remove_component<C: Component>(&mut self, entity: Entity) -> Option<C> {
        let index = self.registry.index_of_type::<C>()?;
        let record = *self.entities.get(entity)?;
        if !record.signature().contains(index) {
            return None;
        }

        let value = std::mem::take(
            self.archetypes[record.archetype()]
                .column_mut::<C>(index)?
                .get_mut(record.row())?,
        );

        let mut signature = record.signature();
        signature.remove(index);
        self.move_entity(entity, record, signature);
        Some(value)
    }

    /// Returns the `C` attached to `entity`.
    ///
    /// `None` if the entity is dead, lacks `C`, or `C` is not registered.
    #[must_use]
    pub fn get_component<C: Component>(&self, entity: Entity) -> Option<&C> {
        let index = self.registry.index_of_type::<C>()?;
        let record = self.entities.get(entity)?;
        self.archetypes[record.archetype()]
            .column::<C>(index)?
            .get(record.row())
    }

    /// Returns the `C` attached to `entity` mutably.
    pub fn get_component_mut<C: Component>(&mut self, entity: Entity) -> Option<&mut C> {
        let index = self.registry.index_of_type::<C>()?;
        let record = *self.entities.get(entity)?;
        self.archetypes[record.archetype()]
            .column_mut::<C>(index)?
            .get_mut(record.row())
    }

    /// Checks if `entity` has `C`.
    #[must_use]
    pub fn has_component<C: Component>(&self, entity: Entity) -> bool {
        match (self.registry.index_of_type::<C>(), self.signature(entity)) {
            (Some(index), Some(signature)) => signature.contains(index),
            _ => false,
        }
    }

    /// Returns the table for `signature`, creating it on first use.
    fn archetype_for(&mut self, signature: Signature) -> usize {
        if let Some(&id) = self.by_signature.get(&signature) {
            return id;
        }
        let id = self.archetypes.len();
        self.archetypes.push(Archetype::new(signature, &self.prototypes));
        self.by_signature.insert(signature, id);
        trace!(?signature, id, "Created archetype");
        id
    }

    /// Moves a live entity's row to the table of `signature` and returns that
    /// table. A column the old table lacks is left one row short.
    fn move_entity(&mut self, entity: Entity, record: EntityRecord, signature: Signature) -> usize {
        let target = self.archetype_for(signature);
        let (source, destination) = pair_mut(&mut self.archetypes, record.archetype(), target);
        let moved = source.move_row(record.row(), destination);
        let row = destination.len() - 1;

        self.relocate(moved, record.row());
        if let Some(slot) = self.entities.get_mut(entity) {
            *slot = EntityRecord::new(signature, target, row);
        }
        target
    }

    /// Points the entity that a swap-remove moved into `row` at its new row.
    fn relocate(&mut self, moved: Option<Entity>, row: usize) {
        if let Some(record) = moved.and_then(|entity| self.entities.get_mut(entity)) {
            record.set_row(row);
        }
    }

    // =========================================================================
    // Iteration
    // =========================================================================

    /// Calls `f` once per non-empty archetype table whose entities have every
    /// component in `Q`.
    ///
    /// `f` receives one `&mut [C]` per requested type, in the order `Q` names
    /// them, plus the number of entities in the table. Entities may carry
    /// components not in `Q`. Writes go straight to the tables.
    ///
    /// # Panics
    ///
    /// If a type in `Q` is not registered or is named twice.
    pub fn for_each<'s, Q, F>(&'s mut self, mut f: F)
    where
        Q: Query<'s>,
        F: FnMut(Q::Slices, usize),
    {
        let keys = Q::keys();
        let mut requested = Vec::with_capacity(keys.len());
        let mut mask = Signature::EMPTY;
        for key in &keys {
            let Some(index) = self.registry.index_of(*key) else {
                panic!("{}", EcsError::UnregisteredComponent(key.name()));
            };
            assert!(!mask.contains(index), "component {key} requested twice");
            mask.insert(index);
            requested.push(index);
        }

        let mut calls = 0_usize;
        for archetype in &mut self.archetypes {
            if archetype.is_empty() || !archetype.signature().contains_all(mask) {
                continue;
            }
            let count = archetype.len();
            f(Q::fetch(archetype.query_columns(&requested)), count);
            calls += 1;
        }
        trace!(query = ?keys, calls, "for_each");
    }
}

impl Default for ComponentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ComponentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentStore")
            .field("entities", &self.entities.len())
            .field(
                "archetypes",
                &self
                    .archetypes
                    .iter()
                    .filter(|archetype| !archetype.is_empty())
                    .map(Archetype::describe)
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Mutable view of one live entity.
///
/// ```rust
/// use tessera_core::ComponentStore;
///
/// #[derive(Default, PartialEq, Debug)]
/// struct Name(&'static str);
///
/// let mut store = ComponentStore::new();
/// store.register_component::<Name>();
/// let entity = store.create_entity();
///
/// let mut view = store.entity_mut(entity).unwrap();
/// view.add_component(Name("lamp"));
/// assert_eq!(view.get_component::<Name>(), Some(&Name("lamp")));
/// ```
pub struct EntityMut<'a> {
    store: &'a mut ComponentStore,
    entity: Entity,
}

impl EntityMut<'_> {
    /// Returns the entity handle.
    #[must_use]
    pub fn id(&self) -> Entity {
        self.entity
    }

    /// See [`ComponentStore::add_component`].
    pub fn add_component<C: Component>(&mut self, value: C) -> Option<C> {
        self.store.add_component(self.entity, value)
    }

    /// See [`ComponentStore::remove_component`].
    pub fn remove_component<C: Component>(&mut self) -> Option<C> {
        self.store.remove_component(self.entity)
    }

    /// See [`ComponentStore::get_component`].
    #[must_use]
    pub fn get_component<C: Component>(&self) -> Option<&C> {
        self.store.get_component(self.entity)
    }

    /// See [`ComponentStore::get_component_mut`].
    pub fn get_component_mut<C: Component>(&mut self) -> Option<&mut C> {
        self.store.get_component_mut(self.entity)
    }

    /// See [`ComponentStore::has_component`].
    #[must_use]
    pub fn has_component<C: Component>(&self) -> bool {
        self.store.has_component::<C>(self.entity)
    }

    /// Returns the entity's signature.
    #[must_use]
    pub fn signature(&self) -> Signature {
        self.store.signature(self.entity).unwrap_or_default()
    }
}
