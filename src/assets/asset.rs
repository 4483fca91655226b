//! The `Asset` trait and the context loaders run in

use std::any::Any;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::descriptor::AssetDescriptor;
use super::error::{AssetError, AssetResult};
use super::guid::Guid;
use super::handle::AssetHandle;
use super::kind::AssetKind;
use super::registry::ResourceRegistry;
use super::types::{Font, Material, Mesh, Shader, Texture};

/// Type-erased, shareable asset payload
pub type ErasedAsset = Arc<dyn Any + Send + Sync>;

/// A payload type the registry can load and hand out.
///
/// Payloads are immutable once published; every implementation must also be
/// able to produce a placeholder so a scene survives missing sources.
pub trait Asset: Any + Send + Sync + Sized {
    /// Human-readable type name used in error messages
    const TYPE_NAME: &'static str;

    /// Build the asset from its descriptor
    ///
    /// # Errors
    ///
    /// Returns an error if the descriptor is of the wrong kind or the source
    /// cannot be read or decoded.
    fn load(descriptor: &AssetDescriptor, ctx: &LoadContext<'_>) -> AssetResult<Self>;

    /// Stand-in used when a load or reference fails
    fn placeholder(kind: AssetKind) -> Self;

    /// Error for a descriptor this type cannot handle
    fn wrong_descriptor(descriptor: &AssetDescriptor) -> AssetError {
        AssetError::WrongDescriptor {
            kind: descriptor.kind(),
            expected: Self::TYPE_NAME,
        }
    }
}

/// Environment passed to [`Asset::load`]
pub struct LoadContext<'a> {
    root: &'a Path,
    registry: &'a ResourceRegistry,
    missing: RefCell<Vec<Guid>>,
}

impl<'a> LoadContext<'a> {
    pub(crate) fn new(root: &'a Path, registry: &'a ResourceRegistry) -> Self {
        Self {
            root,
            registry,
            missing: RefCell::new(Vec::new()),
        }
    }

    /// Registry the asset is being loaded into, for resolving dependencies
    #[must_use]
    pub fn registry(&self) -> &'a ResourceRegistry {
        self.registry
    }

    /// Resolve a dependency by GUID.
    ///
    /// Unresolvable references are recorded and replaced by a placeholder
    /// that keeps the requested GUID.
    pub fn resolve<T: Asset>(&self, guid: Guid, kind: AssetKind) -> AssetHandle<T> {
        match self.registry.get_typed::<T>(guid) {
            Ok(handle) => handle,
            Err(err) => {
                log::warn!("unresolved {kind} reference {guid}: {err}");
                self.missing.borrow_mut().push(guid);
                self.registry.placeholder::<T>(kind, guid)
            }
        }
    }

    /// GUIDs that [`LoadContext::resolve`] could not find
    pub(crate) fn take_missing(&self) -> Vec<Guid> {
        self.missing.take()
    }

    /// Resolve a descriptor path against the asset root
    #[must_use]
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Read a source file as UTF-8 text
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::Io`] if the file cannot be read.
    pub fn read_to_string(&self, path: &Path) -> AssetResult<String> {
        let full = self.resolve_path(path);
        std::fs::read_to_string(&full).map_err(|e| AssetError::io(full, e))
    }

    /// Read a source file as raw bytes
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::Io`] if the file cannot be read.
    pub fn read(&self, path: &Path) -> AssetResult<Vec<u8>> {
        let full = self.resolve_path(path);
        std::fs::read(&full).map_err(|e| AssetError::io(full, e))
    }
}

/// Load whatever payload type a descriptor names
pub(crate) fn load_erased(
    descriptor: &AssetDescriptor,
    ctx: &LoadContext<'_>,
) -> AssetResult<ErasedAsset> {
    Ok(match descriptor.kind() {
        AssetKind::Mesh => Arc::new(Mesh::load(descriptor, ctx)?),
        AssetKind::Texture1D
        | AssetKind::Texture2D
        | AssetKind::Texture3D
        | AssetKind::TextureCube => Arc::new(Texture::load(descriptor, ctx)?),
        AssetKind::Shader => Arc::new(Shader::load(descriptor, ctx)?),
        AssetKind::Material => Arc::new(Material::load(descriptor, ctx)?),
        AssetKind::Font => Arc::new(Font::load(descriptor, ctx)?),
    })
}
