//! Built-in components
//!
//! Each type here implements [`ComponentType`](crate::ecs::ComponentType) and
//! is registered by [`register_builtins`], so scene documents that use them
//! load with [`ComponentFactory::with_builtins`].

mod animation;
mod behaviour;
mod camera;
mod gui;
mod physics;
mod render;

pub use animation::MorphAnimator;
pub use behaviour::RotatingBehaviour;
pub use camera::Camera;
pub use gui::{GuiPanel, GuiText, RectTransform};
pub use physics::{BodyType, Collider, ColliderShape, RigidBody, TriggerFlags, TriggerVolume};
pub use render::RenderComponent;

use crate::ecs::ComponentFactory;

/// Register every built-in component type with `factory`
pub fn register_builtins(factory: &mut ComponentFactory) {
    factory
        .register::<RenderComponent>()
        .register::<RigidBody>()
        .register::<TriggerVolume>()
        .register::<Camera>()
        .register::<RectTransform>()
        .register::<GuiPanel>()
        .register::<GuiText>()
        .register::<RotatingBehaviour>()
        .register::<MorphAnimator>();
}
