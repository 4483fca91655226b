//! Mesh + material drawing

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::assets::{AssetHandle, AssetKind, Guid, Material, Mesh};
use crate::core::frame::{DrawItem, RenderFrame};
use crate::ecs::{
    Capabilities, Component, ComponentError, ComponentType, Inspector, RenderContext,
    ResolveContext,
};

/// Draws a mesh with a material at the entity's world transform
#[derive(Debug, Clone, Default)]
pub struct RenderComponent {
    mesh: Option<AssetHandle<Mesh>>,
    material: Option<AssetHandle<Material>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct RenderData {
    mesh: Option<Guid>,
    material: Option<Guid>,
}

impl RenderComponent {
    #[must_use]
    pub fn new(mesh: AssetHandle<Mesh>, material: AssetHandle<Material>) -> Self {
        Self {
            mesh: Some(mesh),
            material: Some(material),
        }
    }

    #[must_use]
    pub fn mesh(&self) -> Option<&AssetHandle<Mesh>> {
        self.mesh.as_ref()
    }

    #[must_use]
    pub fn material(&self) -> Option<&AssetHandle<Material>> {
        self.material.as_ref()
    }

    pub fn set_mesh(&mut self, mesh: AssetHandle<Mesh>) {
        self.mesh = Some(mesh);
    }

    pub fn set_material(&mut self, material: AssetHandle<Material>) {
        self.material = Some(material);
    }
}

impl Component for RenderComponent {
    fn capabilities(&self) -> Capabilities {
        Capabilities::RENDER | Capabilities::INSPECT | Capabilities::SERIALIZE
    }

    fn on_render(&self, ctx: &RenderContext<'_>, frame: &mut RenderFrame) {
        // Nothing to draw until both are set
        let (Some(mesh), Some(material)) = (&self.mesh, &self.material) else {
            return;
        };
        frame.draws.push(DrawItem {
            entity: ctx.entity(),
            mesh: mesh.clone(),
            material: material.clone(),
            world: ctx.world().matrix,
        });
    }

    fn on_inspect(&mut self, inspector: &mut dyn Inspector) {
        inspector.asset("Mesh", self.mesh.as_ref().map(AssetHandle::guid));
        inspector.asset("Material", self.material.as_ref().map(AssetHandle::guid));
    }

    fn save(&self) -> serde_json::Result<Value> {
        serde_json::to_value(RenderData {
            mesh: self.mesh.as_ref().map(AssetHandle::guid),
            material: self.material.as_ref().map(AssetHandle::guid),
        })
    }
}

impl ComponentType for RenderComponent {
    const TYPE_NAME: &'static str = "RenderComponent";

    fn load(data: &Value, ctx: &mut ResolveContext<'_>) -> Result<Self, ComponentError> {
        let data: RenderData = ctx.parse(data)?;
        Ok(Self {
            mesh: ctx.optional_asset(data.mesh, AssetKind::Mesh)?,
            material: ctx.optional_asset(data.material, AssetKind::Material)?,
        })
    }
}
