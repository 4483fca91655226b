//! Fonts kept as raw bytes; shaping and rasterising happen in the GUI layer

use crate::assets::asset::{Asset, LoadContext};
use crate::assets::descriptor::AssetDescriptor;
use crate::assets::error::AssetResult;
use crate::assets::kind::AssetKind;

/// Default point size of the placeholder font
pub const DEFAULT_FONT_SIZE: f32 = 16.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub data: Vec<u8>,
    pub size: f32,
}

impl Font {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Asset for Font {
    const TYPE_NAME: &'static str = "font";

    fn load(descriptor: &AssetDescriptor, ctx: &LoadContext<'_>) -> AssetResult<Self> {
        let AssetDescriptor::Font { path, size } = descriptor else {
            return Err(Self::wrong_descriptor(descriptor));
        };
        Ok(Self {
            data: ctx.read(path)?,
            size: *size,
        })
    }

    fn placeholder(_kind: AssetKind) -> Self {
        Self {
            data: Vec::new(),
            size: DEFAULT_FONT_SIZE,
        }
    }
}
