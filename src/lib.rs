//! A component-based scene engine core
//!
//! This crate provides:
//! - A GUID-addressed resource registry with placeholders and a JSON manifest
//! - A scene graph of named entities with cached world transforms
//! - Trait-object components with update, render, inspect and save hooks
//! - Scene documents in JSON or RON with a collected load report

pub mod assets;
pub mod components;
pub mod core;
pub mod ecs;

// Re-exports for convenience
pub use glam;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::assets::{
        AssetDescriptor, AssetHandle, AssetKind, Font, Guid, Material, Mesh, MeshShape,
        ResourceRegistry, Shader, ShaderStage, Texture,
    };
    pub use crate::components::{
        BodyType, Camera, Collider, ColliderShape, GuiPanel, GuiText, MorphAnimator,
        RectTransform, RenderComponent, RigidBody, RotatingBehaviour, TriggerFlags,
        TriggerVolume,
    };
    pub use crate::core::{
        Config, Environment, Light, LoadIssue, LoadReport, LutSlot, RenderFrame, Scene, SceneError,
    };
    pub use crate::ecs::{
        Capabilities, Component, ComponentFactory, ComponentRef, ComponentType, EntityId,
        GlobalTransform, Transform,
    };
    pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
}
