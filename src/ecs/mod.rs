//! Entities, components and the transform graph
//!
//! Entity nodes live in a `hecs::World` owned by the
//! [`Scene`](crate::core::Scene). Components are trait objects kept in
//! per-entity slots, one per concrete type.

mod cached;
mod commands;
mod component;
mod entity;
mod error;
mod factory;
mod hierarchy;
mod inspect;
mod transform;

pub use cached::CachedTransform;
pub use commands::{CommandQueue, SceneCommand};
pub use component::{
    AsAny, AttachContext, Capabilities, Component, ComponentRef, ComponentSet, ComponentSlot,
    ComponentType, RenderContext, UpdateContext,
};
pub use entity::{ComponentGuard, Entity, EntityId};
pub use error::GraphError;
pub use factory::{ComponentError, ComponentFactory, ResolveContext};
pub use hierarchy::{Children, GlobalTransform};
pub use inspect::{Inspector, Property, PropertyList, PropertyValue};
pub use transform::Transform;
