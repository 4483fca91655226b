//! Morph-target (vertex blend) animation

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::assets::{AssetHandle, AssetKind, Guid, Mesh};
use crate::core::frame::{MorphDraw, RenderFrame};
use crate::ecs::{
    Capabilities, Component, ComponentError, ComponentType, Inspector, RenderContext,
    ResolveContext, UpdateContext,
};

/// Steps through key-frame meshes, blending between neighbours
#[derive(Debug, Clone)]
pub struct MorphAnimator {
    frames: Vec<AssetHandle<Mesh>>,
    /// Seconds per key frame
    pub frame_time: f32,
    pub looping: bool,
    pub playing: bool,
    time: f32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
struct MorphData {
    frames: Vec<Guid>,
    frame_time: f32,
    looping: bool,
}

impl Default for MorphData {
    fn default() -> Self {
        Self {
            frames: Vec::new(),
            frame_time: MorphAnimator::DEFAULT_FRAME_TIME,
            looping: true,
        }
    }
}

impl MorphAnimator {
    const DEFAULT_FRAME_TIME: f32 = 0.5;

    #[must_use]
    pub fn new(frames: Vec<AssetHandle<Mesh>>, frame_time: f32) -> Self {
        Self {
            frames,
            frame_time,
            looping: true,
            playing: true,
            time: 0.0,
        }
    }

    #[must_use]
    pub fn frames(&self) -> &[AssetHandle<Mesh>] {
        &self.frames
    }

    pub fn set_frames(&mut self, frames: Vec<AssetHandle<Mesh>>) {
        self.frames = frames;
        self.time = 0.0;
    }

    pub fn restart(&mut self) {
        self.time = 0.0;
        self.playing = true;
    }

    /// Indices of the two key frames being blended and the blend factor
    #[must_use]
    pub fn current(&self) -> Option<(usize, usize, f32)> {
        let count = self.frames.len();
        if count == 0 {
            return None;
        }
        if count == 1 || self.frame_time <= 0.0 {
            return Some((0, 0, 0.0));
        }

        let position = self.time / self.frame_time;
        let index = position.floor() as usize;
        let blend = position.fract();
        if self.looping {
            Some((index % count, (index + 1) % count, blend))
        } else if index + 1 >= count {
            Some((count - 1, count - 1, 0.0))
        } else {
            Some((index, index + 1, blend))
        }
    }

    fn duration(&self) -> f32 {
        self.frame_time * self.frames.len().saturating_sub(1) as f32
    }
}

impl Component for MorphAnimator {
    fn capabilities(&self) -> Capabilities {
        Capabilities::UPDATE | Capabilities::RENDER | Capabilities::INSPECT | Capabilities::SERIALIZE
    }

    fn on_update(&mut self, _ctx: &mut UpdateContext<'_>, dt: f32) {
        if !self.playing || self.frames.len() < 2 {
            return;
        }
        self.time += dt;
        if self.looping {
            let cycle = self.frame_time * self.frames.len() as f32;
            if cycle > 0.0 {
                self.time %= cycle;
            }
        } else if self.time >= self.duration() {
            self.time = self.duration();
            self.playing = false;
        }
    }

    fn on_render(&self, ctx: &RenderContext<'_>, frame: &mut RenderFrame) {
        let Some((from, to, blend)) = self.current() else {
            return;
        };
        frame.morphs.push(MorphDraw {
            entity: ctx.entity(),
            from: self.frames[from].clone(),
            to: self.frames[to].clone(),
            blend,
        });
    }

    fn on_inspect(&mut self, inspector: &mut dyn Inspector) {
        inspector.float("Frame Time", &mut self.frame_time);
        inspector.toggle("Looping", &mut self.looping);
        inspector.toggle("Playing", &mut self.playing);
    }

    fn save(&self) -> serde_json::Result<Value> {
        serde_json::to_value(MorphData {
            frames: self.frames.iter().map(AssetHandle::guid).collect(),
            frame_time: self.frame_time,
            looping: self.looping,
        })
    }
}

impl ComponentType for MorphAnimator {
    const TYPE_NAME: &'static str = "MorphAnimator";

    fn load(data: &Value, ctx: &mut ResolveContext<'_>) -> Result<Self, ComponentError> {
        let data: MorphData = ctx.parse(data)?;
        let frames = data
            .frames
            .into_iter()
            .map(|guid| ctx.asset(guid, AssetKind::Mesh))
            .collect::<Result<Vec<_>, _>>()?;

        let mut animator = Self::new(frames, data.frame_time);
        animator.looping = data.looping;
        Ok(animator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetDescriptor, MeshShape, ResourceRegistry};
    use crate::core::Scene;
    use glam::Vec3;

    fn frames(registry: &ResourceRegistry, count: usize) -> Vec<AssetHandle<Mesh>> {
        (0..count)
            .map(|i| {
                let shape = MeshShape::Cube {
                    center: Vec3::new(i as f32, 0.0, 0.0),
                    size: Vec3::ONE,
                };
                registry
                    .create_or_load::<Mesh>(AssetDescriptor::procedural_mesh(vec![shape]))
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_looping_blend() {
        let registry = ResourceRegistry::new(".");
        let mut scene = Scene::new("morph");
        let e = scene.create_entity("dancer");
        scene
            .attach(e, MorphAnimator::new(frames(&registry, 3), 0.5))
            .unwrap();

        scene.update(0.75);
        let (from, to, blend) = scene.get::<MorphAnimator>(e).unwrap().current().unwrap();
        assert_eq!((from, to), (1, 2));
        assert!((blend - 0.5).abs() < 1e-5);

        // Wraps from the last frame back to the first
        scene.update(0.5);
        let (from, to, _) = scene.get::<MorphAnimator>(e).unwrap().current().unwrap();
        assert_eq!((from, to), (2, 0));

        let frame = scene.collect_frame();
        assert_eq!(frame.morphs.len(), 1);
    }

    #[test]
    fn test_one_shot_stops_on_last_frame() {
        let registry = ResourceRegistry::new(".");
        let mut scene = Scene::new("morph");
        let e = scene.create_entity("door");
        let mut animator = MorphAnimator::new(frames(&registry, 2), 0.25);
        animator.looping = false;
        scene.attach(e, animator).unwrap();

        scene.update(1.0);
        let animator = scene.get::<MorphAnimator>(e).unwrap();
        assert!(!animator.playing);
        assert_eq!(animator.current(), Some((1, 1, 0.0)));
    }

    #[test]
    fn test_save_lists_frame_guids() {
        let registry = ResourceRegistry::new(".");
        let frames = frames(&registry, 2);
        let guids: Vec<Guid> = frames.iter().map(AssetHandle::guid).collect();
        let animator = MorphAnimator::new(frames, 0.1);

        let data = animator.save().unwrap();
        let saved: Vec<Guid> = serde_json::from_value(data["frames"].clone()).unwrap();
        assert_eq!(saved, guids);
    }
}
