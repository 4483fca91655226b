//! Asset descriptors
//!
//! A descriptor records how an asset is reconstructed: source paths plus load
//! parameters. Descriptors are what the manifest persists, and file-backed
//! descriptors double as the deduplication key of the registry.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::guid::Guid;
use super::kind::AssetKind;
use super::types::{MaterialParamDesc, SamplerSettings, ShaderStage};

/// Where mesh geometry comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeshSource {
    /// A Wavefront OBJ file
    File { path: PathBuf },
    /// Geometry generated from primitive shapes, merged into one mesh
    Procedural { shapes: Vec<MeshShape> },
}

/// A procedural primitive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum MeshShape {
    /// Quad centred on `center`, facing `normal`, with `tangent` along its width
    Plane {
        center: Vec3,
        normal: Vec3,
        tangent: Vec3,
        size: Vec2,
    },
    /// Axis-aligned box
    Cube { center: Vec3, size: Vec3 },
    /// Latitude/longitude sphere
    UvSphere {
        center: Vec3,
        radius: f32,
        segments: u32,
        rings: u32,
    },
}

/// How to reconstruct one asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssetDescriptor {
    Mesh {
        source: MeshSource,
    },
    #[serde(rename = "texture_1d")]
    Texture1D {
        path: PathBuf,
        #[serde(default)]
        sampler: SamplerSettings,
    },
    #[serde(rename = "texture_2d")]
    Texture2D {
        path: PathBuf,
        #[serde(default)]
        sampler: SamplerSettings,
    },
    /// `.cube` colour lookup table
    #[serde(rename = "texture_3d")]
    Texture3D {
        path: PathBuf,
    },
    /// Base path of a cube map; faces live next to it as `<stem>_posx.<ext>` etc.
    TextureCube {
        path: PathBuf,
    },
    Shader {
        stages: BTreeMap<ShaderStage, PathBuf>,
    },
    Material {
        name: String,
        #[serde(default)]
        shader: Option<Guid>,
        #[serde(default)]
        params: Vec<MaterialParamDesc>,
    },
    Font {
        path: PathBuf,
        size: f32,
    },
}

impl AssetDescriptor {
    /// Mesh loaded from an OBJ file
    pub fn mesh(path: impl Into<PathBuf>) -> Self {
        Self::Mesh {
            source: MeshSource::File { path: path.into() },
        }
    }

    /// Mesh generated from primitive shapes
    #[must_use]
    pub fn procedural_mesh(shapes: Vec<MeshShape>) -> Self {
        Self::Mesh {
            source: MeshSource::Procedural { shapes },
        }
    }

    /// 2-D texture with default sampling
    pub fn texture_2d(path: impl Into<PathBuf>) -> Self {
        Self::Texture2D {
            path: path.into(),
            sampler: SamplerSettings::default(),
        }
    }

    /// 1-D texture (ramp) with default sampling
    pub fn texture_1d(path: impl Into<PathBuf>) -> Self {
        Self::Texture1D {
            path: path.into(),
            sampler: SamplerSettings::default(),
        }
    }

    /// 3-D colour lookup table
    pub fn lut(path: impl Into<PathBuf>) -> Self {
        Self::Texture3D { path: path.into() }
    }

    /// Cube map from six face images
    pub fn cube_map(path: impl Into<PathBuf>) -> Self {
        Self::TextureCube { path: path.into() }
    }

    /// Shader program from per-stage source files
    pub fn shader<I, P>(stages: I) -> Self
    where
        I: IntoIterator<Item = (ShaderStage, P)>,
        P: Into<PathBuf>,
    {
        Self::Shader {
            stages: stages.into_iter().map(|(s, p)| (s, p.into())).collect(),
        }
    }

    /// Font file rasterised at `size` points
    pub fn font(path: impl Into<PathBuf>, size: f32) -> Self {
        Self::Font {
            path: path.into(),
            size,
        }
    }

    /// The asset kind this descriptor produces
    #[must_use]
    pub const fn kind(&self) -> AssetKind {
        match self {
            Self::Mesh { .. } => AssetKind::Mesh,
            Self::Texture1D { .. } => AssetKind::Texture1D,
            Self::Texture2D { .. } => AssetKind::Texture2D,
            Self::Texture3D { .. } => AssetKind::Texture3D,
            Self::TextureCube { .. } => AssetKind::TextureCube,
            Self::Shader { .. } => AssetKind::Shader,
            Self::Material { .. } => AssetKind::Material,
            Self::Font { .. } => AssetKind::Font,
        }
    }

    /// Deduplication key: kind plus normalised source path(s).
    ///
    /// Procedural meshes and materials have no key, so every creation yields
    /// a distinct asset.
    #[must_use]
    pub fn dedup_key(&self) -> Option<String> {
        let kind = self.kind();
        match self {
            Self::Mesh {
                source: MeshSource::File { path },
            }
            | Self::Texture1D { path, .. }
            | Self::Texture2D { path, .. }
            | Self::Texture3D { path }
            | Self::TextureCube { path } => Some(format!("{kind}:{}", normalize(path))),
            Self::Font { path, size } => Some(format!("{kind}:{}@{size}", normalize(path))),
            Self::Shader { stages } => {
                let parts: Vec<String> = stages
                    .iter()
                    .map(|(stage, path)| format!("{}={}", stage.as_str(), normalize(path)))
                    .collect();
                Some(format!("{kind}:{}", parts.join(";")))
            }
            Self::Mesh {
                source: MeshSource::Procedural { .. },
            }
            | Self::Material { .. } => None,
        }
    }

    /// Human-readable debug name derived from the source
    #[must_use]
    pub fn display_name(&self) -> String {
        match self {
            Self::Mesh {
                source: MeshSource::File { path },
            }
            | Self::Texture1D { path, .. }
            | Self::Texture2D { path, .. }
            | Self::Texture3D { path }
            | Self::TextureCube { path }
            | Self::Font { path, .. } => path
                .file_name()
                .map_or_else(|| normalize(path), |n| n.to_string_lossy().into_owned()),
            Self::Mesh {
                source: MeshSource::Procedural { shapes },
            } => format!("procedural mesh ({} shapes)", shapes.len()),
            Self::Shader { stages } => stages
                .values()
                .filter_map(|p| p.file_stem())
                .map(|s| s.to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("+"),
            Self::Material { name, .. } => name.clone(),
        }
    }
}

/// Forward slashes, no empty or `.` segments
fn normalize(path: &Path) -> String {
    let text = path.to_string_lossy().replace('\\', "/");
    let joined = text
        .split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .collect::<Vec<_>>()
        .join("/");
    if text.starts_with('/') {
        format!("/{joined}")
    } else {
        joined
    }
}
