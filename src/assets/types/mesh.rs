//! Mesh geometry and procedural primitives

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

use super::obj;
use crate::assets::asset::{Asset, LoadContext};
use crate::assets::descriptor::{AssetDescriptor, MeshShape, MeshSource};
use crate::assets::error::AssetResult;
use crate::assets::kind::AssetKind;

/// Vertex with position, normal, and UV coordinates
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    /// Create a new vertex
    pub const fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// Indexed triangle mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Create a mesh from vertices and indices
    #[must_use]
    pub fn from_data(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Build a mesh by merging a list of primitives
    #[must_use]
    pub fn from_shapes(shapes: &[MeshShape]) -> Self {
        let mut mesh = Self::default();
        for shape in shapes {
            let part = match *shape {
                MeshShape::Plane {
                    center,
                    normal,
                    tangent,
                    size,
                } => Self::plane(center, normal, tangent, size),
                MeshShape::Cube { center, size } => Self::cube(center, size),
                MeshShape::UvSphere {
                    center,
                    radius,
                    segments,
                    rings,
                } => Self::sphere(center, radius, segments, rings),
            };
            mesh.append(part);
        }
        mesh
    }

    /// Append another mesh, re-basing its indices
    pub fn append(&mut self, other: Self) {
        let base = self.vertices.len() as u32;
        self.vertices.extend(other.vertices);
        self.indices.extend(other.indices.into_iter().map(|i| i + base));
    }

    /// Create an axis-aligned box
    #[must_use]
    pub fn cube(center: Vec3, size: Vec3) -> Self {
        let h = size * 0.5;
        // (normal, u axis, v axis) per face
        let faces = [
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, u, v) in faces {
            let base = vertices.len() as u32;
            for (su, sv, uv) in [
                (-1.0, -1.0, [0.0, 0.0]),
                (1.0, -1.0, [1.0, 0.0]),
                (1.0, 1.0, [1.0, 1.0]),
                (-1.0, 1.0, [0.0, 1.0]),
            ] {
                let p = center + (normal + u * su + v * sv) * h;
                vertices.push(Vertex::new(p.into(), normal.into(), uv));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }

        Self::from_data(vertices, indices)
    }

    /// Create a quad facing `normal`
    #[must_use]
    pub fn plane(center: Vec3, normal: Vec3, tangent: Vec3, size: Vec2) -> Self {
        let normal = normal.normalize_or(Vec3::Y);
        let tangent = tangent.normalize_or(Vec3::X);
        let bitangent = normal.cross(tangent).normalize_or(Vec3::Z);
        let hu = tangent * size.x * 0.5;
        let hv = bitangent * size.y * 0.5;

        let vertices = vec![
            Vertex::new((center - hu - hv).into(), normal.into(), [0.0, 0.0]),
            Vertex::new((center + hu - hv).into(), normal.into(), [1.0, 0.0]),
            Vertex::new((center + hu + hv).into(), normal.into(), [1.0, 1.0]),
            Vertex::new((center - hu + hv).into(), normal.into(), [0.0, 1.0]),
        ];
        let indices = vec![0, 1, 2, 2, 3, 0];

        Self::from_data(vertices, indices)
    }

    /// Create a UV sphere
    #[must_use]
    pub fn sphere(center: Vec3, radius: f32, segments: u32, rings: u32) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        for ring in 0..=rings {
            let phi = std::f32::consts::PI * ring as f32 / rings as f32;
            let y = radius * phi.cos();
            let ring_radius = radius * phi.sin();

            for segment in 0..=segments {
                let theta = 2.0 * std::f32::consts::PI * segment as f32 / segments as f32;
                let offset = Vec3::new(ring_radius * theta.cos(), y, ring_radius * theta.sin());

                vertices.push(Vertex::new(
                    (center + offset).into(),
                    offset.normalize_or(Vec3::Y).into(),
                    [segment as f32 / segments as f32, ring as f32 / rings as f32],
                ));
            }
        }

        for ring in 0..rings {
            for segment in 0..segments {
                let current = ring * (segments + 1) + segment;
                let next = current + segments + 1;

                indices.extend_from_slice(&[current, next, current + 1]);
                indices.extend_from_slice(&[current + 1, next, next + 1]);
            }
        }

        Self::from_data(vertices, indices)
    }

    /// Number of triangles
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Axis-aligned bounds as `(min, max)`, or `None` for an empty mesh
    #[must_use]
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = Vec3::from(self.vertices.first()?.position);
        Some(self.vertices.iter().fold((first, first), |(min, max), v| {
            let p = Vec3::from(v.position);
            (min.min(p), max.max(p))
        }))
    }
}

impl Asset for Mesh {
    const TYPE_NAME: &'static str = "mesh";

    fn load(descriptor: &AssetDescriptor, ctx: &LoadContext<'_>) -> AssetResult<Self> {
        let AssetDescriptor::Mesh { source } = descriptor else {
            return Err(Self::wrong_descriptor(descriptor));
        };
        match source {
            MeshSource::File { path } => {
                let text = ctx.read_to_string(path)?;
                obj::parse(&text, &ctx.resolve_path(path))
            }
            MeshSource::Procedural { shapes } => Ok(Self::from_shapes(shapes)),
        }
    }

    fn placeholder(_kind: AssetKind) -> Self {
        Self::cube(Vec3::ZERO, Vec3::ONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_counts() {
        let cube = Mesh::cube(Vec3::ZERO, Vec3::ONE);
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.triangle_count(), 12);
        let (min, max) = cube.bounds().unwrap();
        assert!((min - Vec3::splat(-0.5)).length() < 1e-5);
        assert!((max - Vec3::splat(0.5)).length() < 1e-5);
    }

    #[test]
    fn test_plane_faces_normal() {
        let plane = Mesh::plane(Vec3::ZERO, Vec3::Z, Vec3::X, Vec2::splat(2.0));
        assert_eq!(plane.vertices.len(), 4);
        for v in &plane.vertices {
            assert_eq!(v.normal, [0.0, 0.0, 1.0]);
            assert!(v.position[2].abs() < 1e-6);
        }
    }

    #[test]
    fn test_shapes_merge_rebases_indices() {
        let mesh = Mesh::from_shapes(&[
            MeshShape::Plane {
                center: Vec3::ZERO,
                normal: Vec3::Y,
                tangent: Vec3::X,
                size: Vec2::ONE,
            },
            MeshShape::Plane {
                center: Vec3::Y,
                normal: Vec3::Y,
                tangent: Vec3::X,
                size: Vec2::ONE,
            },
        ]);
        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(&mesh.indices[6..], &[4, 5, 6, 6, 7, 4]);
    }

    #[test]
    fn test_sphere_vertex_count() {
        let sphere = Mesh::sphere(Vec3::ZERO, 1.0, 8, 4);
        assert_eq!(sphere.vertices.len(), 9 * 5);
        assert_eq!(sphere.triangle_count(), 8 * 4 * 2);
    }
}
