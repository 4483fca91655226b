//! Texture payloads: 1-D ramps, 2-D images, 3-D colour LUTs and cube maps
//!
//! Pixel data is always stored as tightly packed RGBA8.

use std::path::Path;

use image::GenericImageView;
use serde::{Deserialize, Serialize};

use crate::assets::asset::{Asset, LoadContext};
use crate::assets::descriptor::AssetDescriptor;
use crate::assets::error::{AssetError, AssetResult};
use crate::assets::kind::AssetKind;

/// Cube map face suffixes, in layer order
pub const CUBE_FACES: [&str; 6] = ["posx", "negx", "posy", "negy", "posz", "negz"];

/// Largest accepted `LUT_3D_SIZE`
pub const MAX_LUT_SIZE: u32 = 256;

/// Texture filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    Nearest,
    #[default]
    Linear,
}

/// Texture coordinate wrapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapMode {
    #[default]
    Repeat,
    ClampToEdge,
    MirroredRepeat,
}

/// Sampling parameters recorded alongside a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerSettings {
    pub min_filter: FilterMode,
    pub mag_filter: FilterMode,
    pub wrap: WrapMode,
}

impl SamplerSettings {
    /// Nearest-neighbour filtering on both axes
    #[must_use]
    pub fn nearest() -> Self {
        Self {
            min_filter: FilterMode::Nearest,
            mag_filter: FilterMode::Nearest,
            ..Self::default()
        }
    }

    /// Same settings with a different wrap mode
    #[must_use]
    pub fn with_wrap(mut self, wrap: WrapMode) -> Self {
        self.wrap = wrap;
        self
    }
}

/// Dimensionality of a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureDimension {
    D1,
    D2,
    D3,
    Cube,
}

/// Decoded texture data
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub dimension: TextureDimension,
    pub width: u32,
    pub height: u32,
    /// Depth for 3-D textures, 6 for cube maps, 1 otherwise
    pub depth: u32,
    pub pixels: Vec<u8>,
    pub sampler: SamplerSettings,
}

impl Texture {
    /// A texture filled with one colour
    #[must_use]
    pub fn solid(dimension: TextureDimension, size: u32, rgba: [u8; 4]) -> Self {
        let (width, height, depth) = match dimension {
            TextureDimension::D1 => (size, 1, 1),
            TextureDimension::D2 => (size, size, 1),
            TextureDimension::D3 => (size, size, size),
            TextureDimension::Cube => (size, size, 6),
        };
        let count = (width * height * depth) as usize;
        Self {
            dimension,
            width,
            height,
            depth,
            pixels: rgba.repeat(count),
            sampler: SamplerSettings::default(),
        }
    }

    /// Decode a single image file into RGBA8
    fn decode_image(path: &Path, ctx: &LoadContext<'_>) -> AssetResult<(u32, u32, Vec<u8>)> {
        let bytes = ctx.read(path)?;
        let img = image::load_from_memory(&bytes)
            .map_err(|e| AssetError::decode(ctx.resolve_path(path), e))?;
        let (width, height) = img.dimensions();
        Ok((width, height, img.to_rgba8().into_raw()))
    }

    fn from_image(
        dimension: TextureDimension,
        path: &Path,
        sampler: SamplerSettings,
        ctx: &LoadContext<'_>,
    ) -> AssetResult<Self> {
        let (width, height, pixels) = Self::decode_image(path, ctx)?;
        Ok(Self {
            dimension,
            width,
            height,
            depth: 1,
            pixels,
            sampler,
        })
    }

    fn cube_map(path: &Path, ctx: &LoadContext<'_>) -> AssetResult<Self> {
        let stem = path
            .file_stem()
            .ok_or_else(|| AssetError::decode(path, "cube map path has no file name"))?
            .to_string_lossy()
            .into_owned();
        let ext = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        let mut size = None;
        let mut pixels = Vec::new();
        for face in CUBE_FACES {
            let face_path = path.with_file_name(format!("{stem}_{face}{ext}"));
            let (w, h, data) = Self::decode_image(&face_path, ctx)?;
            match size {
                None => size = Some((w, h)),
                Some(s) if s != (w, h) => {
                    return Err(AssetError::decode(
                        ctx.resolve_path(&face_path),
                        format!("face is {w}x{h}, expected {}x{}", s.0, s.1),
                    ));
                }
                Some(_) => {}
            }
            pixels.extend_from_slice(&data);
        }

        let (width, height) = size.unwrap_or((0, 0));
        Ok(Self {
            dimension: TextureDimension::Cube,
            width,
            height,
            depth: 6,
            pixels,
            sampler: SamplerSettings::default().with_wrap(WrapMode::ClampToEdge),
        })
    }

    /// Parse an Adobe `.cube` 3-D LUT
    ///
    /// Sizes above [`MAX_LUT_SIZE`] are rejected.
    pub(crate) fn parse_cube_lut(text: &str, path: &Path) -> AssetResult<Self> {
        let mut size: Option<u32> = None;
        let mut pixels = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let mut parts = line.split_whitespace();
            let first = parts.next().unwrap_or_default();

            match first {
                "LUT_3D_SIZE" => {
                    let value = parts
                        .next()
                        .and_then(|v| v.parse().ok())
                        .filter(|v: &u32| (2..=MAX_LUT_SIZE).contains(v))
                        .ok_or_else(|| AssetError::parse(path, line_no, "bad LUT_3D_SIZE"))?;
                    size = Some(value);
                }
                "TITLE" | "DOMAIN_MIN" | "DOMAIN_MAX" => {}
                "LUT_1D_SIZE" => {
                    return Err(AssetError::parse(path, line_no, "1-D LUTs are not supported"));
                }
                _ => {
                    let mut rgb = [0u8; 4];
                    rgb[3] = 255;
                    for (i, token) in std::iter::once(first).chain(parts).take(3).enumerate() {
                        let v: f32 = token.parse().map_err(|_| {
                            AssetError::parse(path, line_no, format!("bad value '{token}'"))
                        })?;
                        rgb[i] = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
                    }
                    pixels.extend_from_slice(&rgb);
                }
            }
        }

        let size = size.ok_or_else(|| AssetError::decode(path, "missing LUT_3D_SIZE"))?;
        let side = size as usize;
        let expected = side
            .checked_mul(side)
            .and_then(|n| n.checked_mul(side))
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| AssetError::decode(path, format!("LUT_3D_SIZE {size} is too large")))?;
        if pixels.len() != expected {
            return Err(AssetError::decode(
                path,
                format!(
                    "expected {} entries, found {}",
                    expected / 4,
                    pixels.len() / 4
                ),
            ));
        }

        Ok(Self {
            dimension: TextureDimension::D3,
            width: size,
            height: size,
            depth: size,
            pixels,
            sampler: SamplerSettings::default().with_wrap(WrapMode::ClampToEdge),
        })
    }
}

impl Asset for Texture {
    const TYPE_NAME: &'static str = "texture";

    fn load(descriptor: &AssetDescriptor, ctx: &LoadContext<'_>) -> AssetResult<Self> {
        match descriptor {
            AssetDescriptor::Texture1D { path, sampler } => {
                Self::from_image(TextureDimension::D1, path, *sampler, ctx)
            }
            AssetDescriptor::Texture2D { path, sampler } => {
                Self::from_image(TextureDimension::D2, path, *sampler, ctx)
            }
            AssetDescriptor::Texture3D { path } => {
                let text = ctx.read_to_string(path)?;
                Self::parse_cube_lut(&text, &ctx.resolve_path(path))
            }
            AssetDescriptor::TextureCube { path } => Self::cube_map(path, ctx),
            _ => Err(Self::wrong_descriptor(descriptor)),
        }
    }

    fn placeholder(kind: AssetKind) -> Self {
        const MAGENTA: [u8; 4] = [255, 0, 255, 255];
        match kind {
            AssetKind::Texture1D => Self::solid(TextureDimension::D1, 2, MAGENTA),
            AssetKind::Texture3D => Self::solid(TextureDimension::D3, 2, MAGENTA),
            AssetKind::TextureCube => Self::solid(TextureDimension::Cube, 2, MAGENTA),
            _ => Self::solid(TextureDimension::D2, 2, MAGENTA),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cube_lut() {
        let mut text = String::from("TITLE \"tiny\"\nLUT_3D_SIZE 2\n");
        for b in 0..2 {
            for g in 0..2 {
                for r in 0..2 {
                    text.push_str(&format!("{r} {g} {b}\n"));
                }
            }
        }
        let lut = Texture::parse_cube_lut(&text, Path::new("tiny.cube")).unwrap();
        assert_eq!(lut.dimension, TextureDimension::D3);
        assert_eq!((lut.width, lut.height, lut.depth), (2, 2, 2));
        assert_eq!(&lut.pixels[4..8], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_cube_lut_wrong_count() {
        let text = "LUT_3D_SIZE 2\n0 0 0\n1 1 1\n";
        let err = Texture::parse_cube_lut(text, Path::new("short.cube")).unwrap_err();
        assert!(matches!(err, AssetError::Decode { .. }));
    }

    #[test]
    fn test_cube_lut_oversized_header_is_error() {
        let err = Texture::parse_cube_lut("LUT_3D_SIZE 1024\n", Path::new("huge.cube")).unwrap_err();
        assert!(matches!(err, AssetError::Parse { line: 1, .. }));

        let err = Texture::parse_cube_lut("LUT_3D_SIZE 4294967295\n", Path::new("huge.cube"))
            .unwrap_err();
        assert!(matches!(err, AssetError::Parse { .. }));
    }

    #[test]
    fn test_placeholder_shapes() {
        let cube = Texture::placeholder(AssetKind::TextureCube);
        assert_eq!(cube.depth, 6);
        assert_eq!(cube.pixels.len(), 2 * 2 * 6 * 4);
        let flat = Texture::placeholder(AssetKind::Texture2D);
        assert_eq!(flat.dimension, TextureDimension::D2);
        assert_eq!(&flat.pixels[..4], &[255, 0, 255, 255]);
    }
}
