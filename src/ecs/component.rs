//! The component model
//!
//! Components are plain Rust types implementing [`Component`] (the
//! object-safe lifecycle surface) and [`ComponentType`] (the serialization tag
//! and loader). An entity stores them type-erased in ordered
//! [`ComponentSlot`]s, at most one per concrete type.
//!
//! Every attach, lookup and removal goes through the [`Scene`](crate::core::Scene)
//! so lifecycle hooks run consistently:
//!
//! 1. `on_attach` once, right after the component is stored.
//! 2. `on_update` every tick while enabled, if it declares `UPDATE`.
//! 3. `on_render` every frame while enabled, if it declares `RENDER`.
//! 4. `on_inspect` when an editor asks, if it declares `INSPECT`.
//! 5. `on_destroy` once, before the component leaves its entity.

use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;

use bitflags::bitflags;
use serde_json::Value;
use smallvec::SmallVec;

use super::entity::EntityId;
use super::cached::CachedTransform;
use super::commands::CommandQueue;
use super::factory::{ComponentError, ResolveContext};
use super::hierarchy::GlobalTransform;
use super::inspect::Inspector;
use super::transform::Transform;
use crate::core::frame::RenderFrame;

bitflags! {
    /// Which lifecycle callbacks a component participates in
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        const UPDATE = 1 << 0;
        const RENDER = 1 << 1;
        const INSPECT = 1 << 2;
        const SERIALIZE = 1 << 3;
    }
}

/// Upcasts to `Any` for downcasting type-erased components.
///
/// Call through a `&dyn Component`, never on a `Box<dyn Component>`: the
/// blanket impl would otherwise answer for the box itself.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Behaviour attached to an entity
///
/// Components are stored inside the scene's `hecs::World`, hence the
/// `Send + Sync` bound.
pub trait Component: AsAny + Send + Sync {
    /// Lifecycle callbacks this component takes part in
    fn capabilities(&self) -> Capabilities;

    fn on_attach(&mut self, _ctx: &mut AttachContext<'_>) {}

    fn on_update(&mut self, _ctx: &mut UpdateContext<'_>, _dt: f32) {}

    fn on_render(&self, _ctx: &RenderContext<'_>, _frame: &mut RenderFrame) {}

    fn on_inspect(&mut self, _inspector: &mut dyn Inspector) {}

    fn on_destroy(&mut self) {}

    /// Serialize component data; assets are written as GUID strings
    ///
    /// # Errors
    ///
    /// Returns an error if the data cannot be represented as JSON.
    fn save(&self) -> serde_json::Result<Value> {
        Ok(Value::Null)
    }
}

/// A concrete component type with a stable serialization tag
pub trait ComponentType: Component + Sized {
    /// Tag written to the `type` field of scene documents
    const TYPE_NAME: &'static str;

    /// Rebuild the component from saved data
    ///
    /// # Errors
    ///
    /// Returns an error for malformed data or unresolvable assets.
    fn load(data: &Value, ctx: &mut ResolveContext<'_>) -> Result<Self, ComponentError>;
}

// ============================================================================
// Slots
// ============================================================================

/// One attached component and its enabled flag
pub struct ComponentSlot {
    type_id: TypeId,
    type_name: &'static str,
    pub(crate) enabled: bool,
    pub(crate) component: Box<dyn Component>,
}

impl ComponentSlot {
    pub(crate) fn new<T: ComponentType>(component: T, enabled: bool) -> Self {
        Self::from_boxed(TypeId::of::<T>(), T::TYPE_NAME, Box::new(component), enabled)
    }

    pub(crate) fn from_boxed(
        type_id: TypeId,
        type_name: &'static str,
        component: Box<dyn Component>,
        enabled: bool,
    ) -> Self {
        Self {
            type_id,
            type_name,
            enabled,
            component,
        }
    }

    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn component(&self) -> &dyn Component {
        &*self.component
    }

    /// Whether the component is enabled and takes part in `capability`
    #[must_use]
    pub fn is_active_for(&self, capability: Capabilities) -> bool {
        self.enabled && self.component().capabilities().contains(capability)
    }

    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        let component: &dyn Component = &*self.component;
        component.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        let component: &mut dyn Component = &mut *self.component;
        component.as_any_mut().downcast_mut::<T>()
    }

    pub(crate) fn into_inner<T: Any>(self) -> Option<T> {
        self.component.into_any().downcast::<T>().ok().map(|b| *b)
    }
}

impl fmt::Debug for ComponentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentSlot")
            .field("type_name", &self.type_name)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

/// Ordered components of one entity, at most one per type
#[derive(Debug, Default)]
pub struct ComponentSet {
    slots: SmallVec<[ComponentSlot; 4]>,
}

impl ComponentSet {
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComponentSlot> {
        self.slots.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut ComponentSlot> {
        self.slots.iter_mut()
    }

    #[must_use]
    pub fn position(&self, type_id: TypeId) -> Option<usize> {
        self.slots.iter().position(|s| s.type_id == type_id)
    }

    #[must_use]
    pub fn contains<T: Any>(&self) -> bool {
        self.position(TypeId::of::<T>()).is_some()
    }

    #[must_use]
    pub fn get<T: Any>(&self) -> Option<&T> {
        let index = self.position(TypeId::of::<T>())?;
        self.slots[index].downcast_ref()
    }

    pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
        let index = self.position(TypeId::of::<T>())?;
        self.slots[index].downcast_mut()
    }

    /// Enabled flag of the `T` component, if attached
    #[must_use]
    pub fn is_enabled<T: Any>(&self) -> Option<bool> {
        let index = self.position(TypeId::of::<T>())?;
        Some(self.slots[index].enabled)
    }

    /// Type tags in attach order
    pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.slots.iter().map(|s| s.type_name)
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> Option<&mut ComponentSlot> {
        self.slots.get_mut(index)
    }

    pub(crate) fn set_enabled(&mut self, type_id: TypeId, enabled: bool) -> bool {
        match self.position(type_id) {
            Some(index) => {
                self.slots[index].enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Append a slot, returning its index
    pub(crate) fn push(&mut self, slot: ComponentSlot) -> usize {
        self.slots.push(slot);
        self.slots.len() - 1
    }

    pub(crate) fn replace(&mut self, index: usize, slot: ComponentSlot) -> ComponentSlot {
        std::mem::replace(&mut self.slots[index], slot)
    }

    pub(crate) fn remove(&mut self, index: usize) -> ComponentSlot {
        self.slots.remove(index)
    }

    /// Type ids of every slot except `index`
    pub(crate) fn sibling_types(&self, index: usize) -> SmallVec<[TypeId; 8]> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, s)| s.type_id)
            .collect()
    }

    pub(crate) fn drain_reverse(&mut self) -> impl Iterator<Item = ComponentSlot> + '_ {
        self.slots.drain(..).rev()
    }
}

// ============================================================================
// Typed references
// ============================================================================

/// Names the `T` component of an entity without borrowing the scene
pub struct ComponentRef<T> {
    entity: EntityId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ComponentRef<T> {
    #[must_use]
    pub const fn new(entity: EntityId) -> Self {
        Self {
            entity,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub const fn entity(&self) -> EntityId {
        self.entity
    }
}

impl<T> Clone for ComponentRef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ComponentRef<T> {}

impl<T> PartialEq for ComponentRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.entity == other.entity
    }
}

impl<T> Eq for ComponentRef<T> {}

impl<T> fmt::Debug for ComponentRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentRef<{}>({})", std::any::type_name::<T>(), self.entity)
    }
}

// ============================================================================
// Callback contexts
// ============================================================================

/// Passed to [`Component::on_attach`]
pub struct AttachContext<'a> {
    pub(crate) entity: EntityId,
    pub(crate) name: &'a str,
    pub(crate) siblings: &'a [TypeId],
    pub(crate) enabled: &'a mut bool,
}

impl AttachContext<'_> {
    #[must_use]
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    #[must_use]
    pub fn entity_name(&self) -> &str {
        self.name
    }

    /// Whether the entity already carries a `T` component
    #[must_use]
    pub fn has<T: Any>(&self) -> bool {
        self.siblings.contains(&TypeId::of::<T>())
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        *self.enabled
    }

    /// Enable or disable the component being attached
    pub fn set_enabled(&mut self, enabled: bool) {
        *self.enabled = enabled;
    }
}

/// Passed to [`Component::on_update`]
pub struct UpdateContext<'a> {
    pub(crate) entity: EntityId,
    pub(crate) name: &'a str,
    pub(crate) transform: &'a mut CachedTransform,
    pub(crate) transform_changed: &'a mut bool,
    pub(crate) commands: &'a mut CommandQueue,
    pub(crate) elapsed: f32,
}

impl UpdateContext<'_> {
    #[must_use]
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    #[must_use]
    pub fn entity_name(&self) -> &str {
        self.name
    }

    #[must_use]
    pub fn transform(&self) -> &Transform {
        self.transform.local()
    }

    /// Mutable local transform; world caches below the entity are refreshed
    /// once the update pass finishes
    pub fn transform_mut(&mut self) -> &mut Transform {
        *self.transform_changed = true;
        self.transform.local_mut()
    }

    /// Structural changes requested here are applied after the traversal
    pub fn commands(&mut self) -> &mut CommandQueue {
        self.commands
    }

    /// Seconds since the scene started updating
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

/// Passed to [`Component::on_render`]
pub struct RenderContext<'a> {
    pub(crate) entity: EntityId,
    pub(crate) name: &'a str,
    pub(crate) world: GlobalTransform,
    pub(crate) components: &'a ComponentSet,
}

impl RenderContext<'_> {
    #[must_use]
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    #[must_use]
    pub fn entity_name(&self) -> &str {
        self.name
    }

    #[must_use]
    pub fn world(&self) -> &GlobalTransform {
        &self.world
    }

    /// Another component on the same entity, whether enabled or not
    #[must_use]
    pub fn sibling<T: Any>(&self) -> Option<&T> {
        self.components.get::<T>()
    }
}
