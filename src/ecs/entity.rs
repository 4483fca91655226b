//! Entities (game objects)
//!
//! Every entity node is a single component in the scene's `hecs::World`;
//! [`EntityId`] wraps the generational `hecs::Entity`, so an id kept after its
//! entity was destroyed never resolves to a newer one.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;

use glam::Mat4;

use super::cached::CachedTransform;
use super::component::ComponentSet;
use super::hierarchy::Children;
use super::transform::Transform;
use crate::assets::Guid;

/// Handle to an entity in a scene
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub(crate) hecs::Entity);

impl EntityId {
    /// Slot index, reused once the entity is destroyed
    #[must_use]
    #[inline]
    pub fn index(self) -> u32 {
        self.0.id()
    }

    #[must_use]
    #[inline]
    pub fn raw(self) -> hecs::Entity {
        self.0
    }
}

impl From<hecs::Entity> for EntityId {
    fn from(entity: hecs::Entity) -> Self {
        Self(entity)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({:?})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:?}", self.0)
    }
}

/// A node in the scene graph.
///
/// Entities are created and destroyed only through the
/// [`Scene`](crate::core::Scene), which owns them; links to the parent and
/// children are plain ids into the same scene.
#[derive(Debug)]
pub struct Entity {
    pub(crate) name: String,
    pub(crate) guid: Guid,
    /// Creation order, used to break ties in name lookups
    pub(crate) serial: u64,
    pub(crate) transform: CachedTransform,
    pub(crate) parent: Option<EntityId>,
    pub(crate) children: Children,
    pub(crate) components: ComponentSet,
}

impl Entity {
    pub(crate) fn new(name: String, guid: Guid, serial: u64, local: Transform) -> Self {
        Self {
            name,
            guid,
            serial,
            transform: CachedTransform::new(local),
            parent: None,
            children: Children::new(),
            components: ComponentSet::default(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn guid(&self) -> Guid {
        self.guid
    }

    #[must_use]
    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &Children {
        &self.children
    }

    #[must_use]
    pub fn local_transform(&self) -> &Transform {
        self.transform.local()
    }

    #[must_use]
    pub fn local_matrix(&self) -> Mat4 {
        self.transform.local_matrix()
    }

    #[must_use]
    pub fn components(&self) -> &ComponentSet {
        &self.components
    }

    #[must_use]
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.components.get::<T>()
    }

    #[must_use]
    pub fn has<T: Any>(&self) -> bool {
        self.components.contains::<T>()
    }
}

/// Shared borrow of one component, holding its entity borrowed
pub struct ComponentGuard<'a, T> {
    entity: hecs::Ref<'a, Entity>,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T: Any> ComponentGuard<'a, T> {
    pub(crate) fn new(entity: hecs::Ref<'a, Entity>) -> Option<Self> {
        if !entity.has::<T>() {
            return None;
        }
        Some(Self {
            entity,
            _marker: PhantomData,
        })
    }
}

impl<T: Any> Deref for ComponentGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.entity
            .get::<T>()
            .expect("component presence checked when borrowed")
    }
}

impl<T: Any + fmt::Debug> fmt::Debug for ComponentGuard<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}
