//! Concrete asset payloads and their loaders

mod font;
mod material;
mod mesh;
mod obj;
mod shader;
mod texture;

pub use font::{DEFAULT_FONT_SIZE, Font};
pub use material::{Material, MaterialBuilder, MaterialParamDesc, MaterialValue, MaterialValueDesc};
pub use mesh::{Mesh, Vertex};
pub use shader::{Shader, ShaderStage};
pub use texture::{
    CUBE_FACES, FilterMode, MAX_LUT_SIZE, SamplerSettings, Texture, TextureDimension, WrapMode,
};
