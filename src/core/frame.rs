//! Per-frame data handed to rendering collaborators
//!
//! The scene never draws anything itself. [`Scene::collect_frame`] walks the
//! enabled components and fills a [`RenderFrame`] with world matrices and
//! asset handles, and a renderer consumes that.
//!
//! [`Scene::collect_frame`]: super::Scene::collect_frame

use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::assets::{AssetHandle, Font, Material, Mesh, Shader, Texture};
use crate::ecs::EntityId;

/// A point light stored on the scene
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Light {
    pub position: Vec3,
    pub color: Vec3,
    pub range: f32,
}

impl Light {
    #[must_use]
    pub fn new(position: Vec3, color: Vec3, range: f32) -> Self {
        Self {
            position,
            color,
            range,
        }
    }
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            color: Vec3::ONE,
            range: 4.0,
        }
    }
}

/// Which colour-grading slot a LUT occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LutSlot {
    Color = 0,
    Cool = 1,
    Custom = 2,
}

/// Skybox and colour grading settings
#[derive(Debug, Clone)]
pub struct Environment {
    pub skybox: Option<AssetHandle<Texture>>,
    pub skybox_shader: Option<AssetHandle<Shader>>,
    pub skybox_rotation: Quat,
    pub luts: [Option<AssetHandle<Texture>>; 3],
}

impl Environment {
    #[must_use]
    pub fn lut(&self, slot: LutSlot) -> Option<&AssetHandle<Texture>> {
        self.luts[slot as usize].as_ref()
    }

    pub fn set_lut(&mut self, slot: LutSlot, lut: Option<AssetHandle<Texture>>) {
        self.luts[slot as usize] = lut;
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            skybox: None,
            skybox_shader: None,
            skybox_rotation: Quat::IDENTITY,
            luts: [None, None, None],
        }
    }
}

/// View and projection of the active camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub entity: EntityId,
    pub view: Mat4,
    pub projection: Mat4,
    pub position: Vec3,
}

impl CameraView {
    #[must_use]
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

/// A mesh to draw with a material
#[derive(Debug, Clone)]
pub struct DrawItem {
    pub entity: EntityId,
    pub mesh: AssetHandle<Mesh>,
    pub material: AssetHandle<Material>,
    pub world: Mat4,
}

/// Blend between two morph targets
#[derive(Debug, Clone)]
pub struct MorphDraw {
    pub entity: EntityId,
    pub from: AssetHandle<Mesh>,
    pub to: AssetHandle<Mesh>,
    pub blend: f32,
}

/// Screen-space GUI element
#[derive(Debug, Clone)]
pub enum GuiItem {
    Panel {
        entity: EntityId,
        /// Top-left corner in pixels
        min: Vec2,
        /// Bottom-right corner in pixels
        max: Vec2,
        color: Vec4,
        texture: Option<AssetHandle<Texture>>,
        border_radius: f32,
    },
    Text {
        entity: EntityId,
        /// Centre of the text block in pixels
        position: Vec2,
        text: String,
        color: Vec4,
        scale: f32,
        font: Option<AssetHandle<Font>>,
    },
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Default)]
pub struct RenderFrame {
    pub camera: Option<CameraView>,
    pub lights: Vec<Light>,
    pub environment: Environment,
    pub draws: Vec<DrawItem>,
    pub morphs: Vec<MorphDraw>,
    pub gui: Vec<GuiItem>,
}

impl RenderFrame {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.draws.is_empty() && self.morphs.is_empty() && self.gui.is_empty()
    }
}
