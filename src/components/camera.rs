//! Camera projection settings
//!
//! The view matrix comes from the owning entity's world transform; this
//! component only describes the projection.

use glam::Mat4;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ecs::{Capabilities, Component, ComponentError, ComponentType, Inspector, ResolveContext};

/// Perspective or orthographic projection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Width / height
    pub aspect: f32,
    pub orthographic: bool,
    /// Visible height in world units when orthographic
    pub ortho_height: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov_degrees: 90.0,
            near: 0.1,
            far: 1000.0,
            aspect: 16.0 / 9.0,
            orthographic: false,
            ortho_height: 10.0,
        }
    }
}

impl Camera {
    /// A perspective camera
    #[must_use]
    pub fn perspective(fov_degrees: f32, near: f32, far: f32) -> Self {
        Self {
            fov_degrees,
            near,
            far,
            ..Self::default()
        }
    }

    /// An orthographic camera showing `height` world units vertically
    #[must_use]
    pub fn orthographic(height: f32, near: f32, far: f32) -> Self {
        Self {
            near,
            far,
            orthographic: true,
            ortho_height: height,
            ..Self::default()
        }
    }

    /// Update aspect ratio from a viewport size
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    /// Get the projection matrix
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        if self.orthographic {
            let half_h = self.ortho_height * 0.5;
            let half_w = half_h * self.aspect;
            Mat4::orthographic_rh(-half_w, half_w, -half_h, half_h, self.near, self.far)
        } else {
            Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
        }
    }
}

impl Component for Camera {
    fn capabilities(&self) -> Capabilities {
        Capabilities::INSPECT | Capabilities::SERIALIZE
    }

    fn on_inspect(&mut self, inspector: &mut dyn Inspector) {
        inspector.toggle("Orthographic", &mut self.orthographic);
        if self.orthographic {
            inspector.float("Height", &mut self.ortho_height);
        } else {
            inspector.float("FOV", &mut self.fov_degrees);
        }
        inspector.float("Near", &mut self.near);
        inspector.float("Far", &mut self.far);
    }

    fn save(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

impl ComponentType for Camera {
    const TYPE_NAME: &'static str = "Camera";

    fn load(data: &Value, ctx: &mut ResolveContext<'_>) -> Result<Self, ComponentError> {
        ctx.parse(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec3, Vec4};

    #[test]
    fn test_perspective_projects_forward_point_inside_clip() {
        let camera = Camera::perspective(60.0, 0.1, 100.0);
        let clip = camera.projection_matrix() * Vec4::new(0.0, 0.0, -10.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
        assert!(ndc.x.abs() < 1e-5);
    }

    #[test]
    fn test_orthographic_edges_map_to_unit() {
        let mut camera = Camera::orthographic(10.0, 0.1, 100.0);
        camera.set_aspect(200, 100);
        let edge = camera.projection_matrix().project_point3(Vec3::new(10.0, 5.0, -1.0));
        assert!((edge.x - 1.0).abs() < 1e-5);
        assert!((edge.y - 1.0).abs() < 1e-5);
    }
}
