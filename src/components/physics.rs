//! Rigid bodies, colliders and trigger volumes
//!
//! These components only describe physical setup. A physics collaborator
//! reads them, simulates, and writes results back through
//! [`Scene::set_world_transform`](crate::core::Scene::set_world_transform).

use bitflags::bitflags;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::assets::{AssetHandle, AssetKind, Guid, Mesh};
use crate::ecs::{
    Capabilities, Component, ComponentError, ComponentType, Inspector, ResolveContext,
};

/// How a body takes part in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyType {
    /// Never moves
    #[default]
    Static,
    /// Moved by game code, pushes dynamic bodies
    Kinematic,
    /// Fully simulated
    Dynamic,
}

/// Collision geometry
#[derive(Debug, Clone)]
pub enum ColliderShape {
    Box { half_extents: Vec3 },
    Sphere { radius: f32 },
    Plane { normal: Vec3 },
    Cylinder { radius: f32, height: f32 },
    ConvexMesh(AssetHandle<Mesh>),
}

/// A shape placed relative to its body
#[derive(Debug, Clone)]
pub struct Collider {
    pub shape: ColliderShape,
    pub offset: Vec3,
    /// XYZ euler angles in degrees
    pub rotation: Vec3,
}

impl Collider {
    #[must_use]
    pub fn new(shape: ColliderShape) -> Self {
        Self {
            shape,
            offset: Vec3::ZERO,
            rotation: Vec3::ZERO,
        }
    }

    #[must_use]
    pub fn cuboid(half_extents: Vec3) -> Self {
        Self::new(ColliderShape::Box { half_extents })
    }

    #[must_use]
    pub fn sphere(radius: f32) -> Self {
        Self::new(ColliderShape::Sphere { radius })
    }

    #[must_use]
    pub fn plane(normal: Vec3) -> Self {
        Self::new(ColliderShape::Plane { normal })
    }

    #[must_use]
    pub fn cylinder(radius: f32, height: f32) -> Self {
        Self::new(ColliderShape::Cylinder { radius, height })
    }

    #[must_use]
    pub fn convex_mesh(mesh: AssetHandle<Mesh>) -> Self {
        Self::new(ColliderShape::ConvexMesh(mesh))
    }

    #[must_use]
    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn with_rotation(mut self, degrees: Vec3) -> Self {
        self.rotation = degrees;
        self
    }

    fn to_record(&self) -> ColliderRecord {
        let shape = match &self.shape {
            ColliderShape::Box { half_extents } => ShapeRecord::Box {
                half_extents: *half_extents,
            },
            ColliderShape::Sphere { radius } => ShapeRecord::Sphere { radius: *radius },
            ColliderShape::Plane { normal } => ShapeRecord::Plane { normal: *normal },
            ColliderShape::Cylinder { radius, height } => ShapeRecord::Cylinder {
                radius: *radius,
                height: *height,
            },
            ColliderShape::ConvexMesh(mesh) => ShapeRecord::ConvexMesh { mesh: mesh.guid() },
        };
        ColliderRecord {
            shape,
            offset: self.offset,
            rotation: self.rotation,
        }
    }

    fn from_record(record: ColliderRecord, ctx: &mut ResolveContext<'_>) -> Result<Self, ComponentError> {
        let shape = match record.shape {
            ShapeRecord::Box { half_extents } => ColliderShape::Box { half_extents },
            ShapeRecord::Sphere { radius } => ColliderShape::Sphere { radius },
            ShapeRecord::Plane { normal } => ColliderShape::Plane { normal },
            ShapeRecord::Cylinder { radius, height } => ColliderShape::Cylinder { radius, height },
            ShapeRecord::ConvexMesh { mesh } => ColliderShape::ConvexMesh(ctx.asset(mesh, AssetKind::Mesh)?),
        };
        Ok(Self {
            shape,
            offset: record.offset,
            rotation: record.rotation,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
enum ShapeRecord {
    Box { half_extents: Vec3 },
    Sphere { radius: f32 },
    Plane { normal: Vec3 },
    Cylinder { radius: f32, height: f32 },
    ConvexMesh { mesh: Guid },
}

#[derive(Debug, Serialize, Deserialize)]
struct ColliderRecord {
    shape: ShapeRecord,
    #[serde(default)]
    offset: Vec3,
    #[serde(default)]
    rotation: Vec3,
}

fn load_colliders(
    records: Vec<ColliderRecord>,
    ctx: &mut ResolveContext<'_>,
) -> Result<Vec<Collider>, ComponentError> {
    records
        .into_iter()
        .map(|record| Collider::from_record(record, ctx))
        .collect()
}

// ============================================================================
// Rigid body
// ============================================================================

/// Physical body with attached colliders
#[derive(Debug, Clone)]
pub struct RigidBody {
    pub body_type: BodyType,
    pub mass: f32,
    colliders: Vec<Collider>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RigidBodyData {
    #[serde(rename = "type", default)]
    body_type: BodyType,
    #[serde(default = "default_mass")]
    mass: f32,
    #[serde(default)]
    colliders: Vec<ColliderRecord>,
}

fn default_mass() -> f32 {
    1.0
}

impl RigidBody {
    #[must_use]
    pub fn new(body_type: BodyType) -> Self {
        Self {
            body_type,
            mass: default_mass(),
            colliders: Vec::new(),
        }
    }

    /// Add a collider, returning its index
    pub fn add_collider(&mut self, collider: Collider) -> usize {
        self.colliders.push(collider);
        self.colliders.len() - 1
    }

    #[must_use]
    pub fn with_collider(mut self, collider: Collider) -> Self {
        self.colliders.push(collider);
        self
    }

    #[must_use]
    pub fn colliders(&self) -> &[Collider] {
        &self.colliders
    }

    pub fn remove_collider(&mut self, index: usize) -> Option<Collider> {
        (index < self.colliders.len()).then(|| self.colliders.remove(index))
    }
}

impl Default for RigidBody {
    fn default() -> Self {
        Self::new(BodyType::Static)
    }
}

impl Component for RigidBody {
    fn capabilities(&self) -> Capabilities {
        Capabilities::INSPECT | Capabilities::SERIALIZE
    }

    fn on_inspect(&mut self, inspector: &mut dyn Inspector) {
        if self.body_type == BodyType::Dynamic {
            inspector.float("Mass", &mut self.mass);
        }
        for collider in &mut self.colliders {
            inspector.vec3("Offset", &mut collider.offset);
            inspector.vec3("Rotation", &mut collider.rotation);
        }
    }

    fn save(&self) -> serde_json::Result<Value> {
        serde_json::to_value(RigidBodyData {
            body_type: self.body_type,
            mass: self.mass,
            colliders: self.colliders.iter().map(Collider::to_record).collect(),
        })
    }
}

impl ComponentType for RigidBody {
    const TYPE_NAME: &'static str = "RigidBody";

    fn load(data: &Value, ctx: &mut ResolveContext<'_>) -> Result<Self, ComponentError> {
        let data: RigidBodyData = ctx.parse(data)?;
        Ok(Self {
            body_type: data.body_type,
            mass: data.mass,
            colliders: load_colliders(data.colliders, ctx)?,
        })
    }
}

// ============================================================================
// Trigger volume
// ============================================================================

bitflags! {
    /// Which kinds of bodies a trigger reacts to
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TriggerFlags: u8 {
        const STATICS = 1 << 0;
        const KINEMATICS = 1 << 1;
        const DYNAMICS = 1 << 2;
    }
}

impl Default for TriggerFlags {
    fn default() -> Self {
        Self::DYNAMICS
    }
}

/// Non-solid region reporting overlaps
#[derive(Debug, Clone, Default)]
pub struct TriggerVolume {
    pub flags: TriggerFlags,
    colliders: Vec<Collider>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TriggerData {
    #[serde(default = "default_trigger_bits")]
    flags: u8,
    #[serde(default)]
    colliders: Vec<ColliderRecord>,
}

fn default_trigger_bits() -> u8 {
    TriggerFlags::default().bits()
}

impl TriggerVolume {
    #[must_use]
    pub fn new(flags: TriggerFlags) -> Self {
        Self {
            flags,
            colliders: Vec::new(),
        }
    }

    pub fn add_collider(&mut self, collider: Collider) -> usize {
        self.colliders.push(collider);
        self.colliders.len() - 1
    }

    #[must_use]
    pub fn colliders(&self) -> &[Collider] {
        &self.colliders
    }

    /// Whether a body of this type would trigger the volume
    #[must_use]
    pub fn reacts_to(&self, body: BodyType) -> bool {
        let flag = match body {
            BodyType::Static => TriggerFlags::STATICS,
            BodyType::Kinematic => TriggerFlags::KINEMATICS,
            BodyType::Dynamic => TriggerFlags::DYNAMICS,
        };
        self.flags.contains(flag)
    }
}

impl Component for TriggerVolume {
    fn capabilities(&self) -> Capabilities {
        Capabilities::INSPECT | Capabilities::SERIALIZE
    }

    fn on_inspect(&mut self, inspector: &mut dyn Inspector) {
        for (label, flag) in [
            ("Statics", TriggerFlags::STATICS),
            ("Kinematics", TriggerFlags::KINEMATICS),
            ("Dynamics", TriggerFlags::DYNAMICS),
        ] {
            let mut on = self.flags.contains(flag);
            inspector.toggle(label, &mut on);
            self.flags.set(flag, on);
        }
    }

    fn save(&self) -> serde_json::Result<Value> {
        serde_json::to_value(TriggerData {
            flags: self.flags.bits(),
            colliders: self.colliders.iter().map(Collider::to_record).collect(),
        })
    }
}

impl ComponentType for TriggerVolume {
    const TYPE_NAME: &'static str = "TriggerVolume";

    fn load(data: &Value, ctx: &mut ResolveContext<'_>) -> Result<Self, ComponentError> {
        let data: TriggerData = ctx.parse(data)?;
        Ok(Self {
            flags: TriggerFlags::from_bits_truncate(data.flags),
            colliders: load_colliders(data.colliders, ctx)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ResourceRegistry;

    fn load<T: ComponentType>(data: &Value) -> (Result<T, ComponentError>, Vec<crate::core::LoadIssue>) {
        let registry = ResourceRegistry::new(".");
        let mut issues = Vec::new();
        let result = {
            let mut ctx = ResolveContext::new(&registry, "owner", T::TYPE_NAME, &mut issues);
            T::load(data, &mut ctx)
        };
        (result, issues)
    }

    #[test]
    fn test_rigid_body_data_round_trip() {
        let body = RigidBody::new(BodyType::Dynamic)
            .with_collider(Collider::cuboid(Vec3::new(0.2, 0.85, 0.15)).with_offset(Vec3::Y))
            .with_collider(Collider::sphere(0.5));
        let data = body.save().unwrap();
        assert_eq!(data["type"], "dynamic");
        assert_eq!(data["colliders"][0]["shape"], "box");

        let (loaded, issues) = load::<RigidBody>(&data);
        let loaded = loaded.unwrap();
        assert!(issues.is_empty());
        assert_eq!(loaded.body_type, BodyType::Dynamic);
        assert_eq!(loaded.colliders().len(), 2);
        assert_eq!(loaded.colliders()[0].offset, Vec3::Y);
        assert!(matches!(loaded.colliders()[1].shape, ColliderShape::Sphere { radius } if radius == 0.5));
    }

    #[test]
    fn test_empty_body_defaults() {
        let (body, _) = load::<RigidBody>(&Value::Null);
        let body = body.unwrap();
        assert_eq!(body.body_type, BodyType::Static);
        assert_eq!(body.mass, 1.0);
    }

    #[test]
    fn test_convex_mesh_missing_uses_placeholder() {
        let guid: Guid = "0a0b0c0d-0000-4000-8000-000000000002".parse().unwrap();
        let data = serde_json::json!({ "colliders": [{ "shape": "convex_mesh", "mesh": guid }] });

        let (body, issues) = load::<RigidBody>(&data);
        let body = body.unwrap();
        assert_eq!(issues.len(), 1);
        match &body.colliders()[0].shape {
            ColliderShape::ConvexMesh(mesh) => {
                assert!(mesh.is_placeholder());
                assert_eq!(mesh.guid(), guid);
            }
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn test_trigger_flags() {
        let mut volume = TriggerVolume::new(TriggerFlags::STATICS | TriggerFlags::KINEMATICS);
        volume.add_collider(Collider::cylinder(1.0, 2.0));
        assert!(volume.reacts_to(BodyType::Kinematic));
        assert!(!volume.reacts_to(BodyType::Dynamic));

        let (loaded, _) = load::<TriggerVolume>(&volume.save().unwrap());
        let loaded = loaded.unwrap();
        assert_eq!(loaded.flags, volume.flags);
        assert_eq!(loaded.colliders().len(), 1);

        let (defaulted, _) = load::<TriggerVolume>(&Value::Null);
        assert_eq!(defaulted.unwrap().flags, TriggerFlags::DYNAMICS);
    }
}
