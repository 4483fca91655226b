//! Simple scripted behaviours

use glam::Vec3;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ecs::{
    Capabilities, Component, ComponentError, ComponentType, Inspector, ResolveContext,
    UpdateContext,
};

/// Spins the entity at a constant rate
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RotatingBehaviour {
    /// Degrees per second around each axis
    pub speed: Vec3,
}

impl RotatingBehaviour {
    #[must_use]
    pub fn new(speed: Vec3) -> Self {
        Self { speed }
    }
}

impl Component for RotatingBehaviour {
    fn capabilities(&self) -> Capabilities {
        Capabilities::UPDATE | Capabilities::INSPECT | Capabilities::SERIALIZE
    }

    fn on_update(&mut self, ctx: &mut UpdateContext<'_>, dt: f32) {
        if self.speed == Vec3::ZERO {
            return;
        }
        let step = self.speed * dt * (std::f32::consts::PI / 180.0);
        ctx.transform_mut().rotate_euler(step);
    }

    fn on_inspect(&mut self, inspector: &mut dyn Inspector) {
        inspector.vec3("Speed", &mut self.speed);
    }

    fn save(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

impl ComponentType for RotatingBehaviour {
    const TYPE_NAME: &'static str = "RotatingBehaviour";

    fn load(data: &Value, ctx: &mut ResolveContext<'_>) -> Result<Self, ComponentError> {
        ctx.parse(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Scene;

    #[test]
    fn test_rotates_each_update() {
        let mut scene = Scene::new("spin");
        let e = scene.create_entity("spinner");
        scene
            .attach(e, RotatingBehaviour::new(Vec3::new(0.0, 90.0, 0.0)))
            .unwrap();

        scene.update(1.0);

        let forward = scene.local_transform(e).unwrap().forward();
        assert!(forward.abs_diff_eq(Vec3::NEG_X, 1e-4));
    }
}
