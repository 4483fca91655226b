//! Asset and resource management
//!
//! Provides a GUID-addressed resource registry with:
//! - Type-safe, reference-counted asset handles
//! - Descriptor-based deduplication of file loads
//! - Placeholders for anything that fails to load
//! - A JSON manifest for rebuilding the registry
//! - Background loading on worker threads

mod asset;
mod descriptor;
mod error;
mod guid;
mod handle;
mod kind;
mod manifest;
mod pending;
mod registry;
pub mod types;

pub use asset::{Asset, ErasedAsset, LoadContext};
pub use descriptor::{AssetDescriptor, MeshShape, MeshSource};
pub use error::{AssetError, AssetResult};
pub use guid::{Guid, ParseGuidError};
pub use handle::AssetHandle;
pub use kind::AssetKind;
pub use manifest::{MANIFEST_VERSION, ManifestReport, MissingReference};
pub use pending::{LoadState, PendingAsset};
pub use registry::{ResourceRegistry, UntypedAsset};
pub use types::{
    Font, Material, MaterialBuilder, MaterialValue, Mesh, SamplerSettings, Shader, ShaderStage,
    Texture, TextureDimension, Vertex,
};
