//! Asset kinds known to the registry

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of payload an asset holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Mesh,
    #[serde(rename = "texture_1d")]
    Texture1D,
    #[serde(rename = "texture_2d")]
    Texture2D,
    /// 3-D colour lookup table
    #[serde(rename = "texture_3d")]
    Texture3D,
    TextureCube,
    Shader,
    Material,
    Font,
}

impl AssetKind {
    /// Every kind, in manifest load order (materials last, they reference others)
    pub const ALL: [Self; 8] = [
        Self::Mesh,
        Self::Texture1D,
        Self::Texture2D,
        Self::Texture3D,
        Self::TextureCube,
        Self::Shader,
        Self::Font,
        Self::Material,
    ];

    /// Short lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mesh => "mesh",
            Self::Texture1D => "texture_1d",
            Self::Texture2D => "texture_2d",
            Self::Texture3D => "texture_3d",
            Self::TextureCube => "texture_cube",
            Self::Shader => "shader",
            Self::Material => "material",
            Self::Font => "font",
        }
    }

    /// Whether this kind is one of the texture variants
    #[must_use]
    pub const fn is_texture(self) -> bool {
        matches!(
            self,
            Self::Texture1D | Self::Texture2D | Self::Texture3D | Self::TextureCube
        )
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
