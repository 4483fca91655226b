//! The resource registry
//!
//! Owns every loaded asset, keyed by GUID. File-backed descriptors are also
//! indexed by a deduplication key so the same source is only decoded once.
//! Loading happens without holding the table lock; publication is a single
//! write-locked insert that re-checks the key, so concurrent loaders of the
//! same source converge on one entry.

use std::any::TypeId;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::asset::{Asset, ErasedAsset, LoadContext, load_erased};
use super::descriptor::AssetDescriptor;
use super::error::{AssetError, AssetResult};
use super::guid::Guid;
use super::handle::AssetHandle;
use super::kind::AssetKind;
use super::manifest::{MANIFEST_VERSION, Manifest, ManifestEntry, ManifestReport, MissingReference};
use super::pending::PendingAsset;
use super::types::Material;
use crate::core::config::Config;

struct AssetEntry {
    kind: AssetKind,
    name: String,
    descriptor: AssetDescriptor,
    data: ErasedAsset,
}

impl AssetEntry {
    /// Handles alive outside the registry
    fn external_refs(&self) -> usize {
        Arc::strong_count(&self.data) - 1
    }
}

/// GUID, kind and payload of a freshly published (or deduplicated) entry
type Published = (Guid, AssetKind, ErasedAsset);

#[derive(Default)]
struct AssetTable {
    entries: FxHashMap<Guid, AssetEntry>,
    by_key: FxHashMap<String, Guid>,
}

impl AssetTable {
    fn remove(&mut self, guid: Guid) -> Option<AssetEntry> {
        let entry = self.entries.remove(&guid)?;
        if let Some(key) = entry.descriptor.dedup_key()
            && self.by_key.get(&key) == Some(&guid)
        {
            self.by_key.remove(&key);
        }
        Some(entry)
    }
}

/// A type-erased view of a registered asset
#[derive(Clone)]
pub struct UntypedAsset {
    pub guid: Guid,
    pub kind: AssetKind,
    pub name: String,
    data: ErasedAsset,
}

impl UntypedAsset {
    /// Typed handle, if the payload is a `T`
    #[must_use]
    pub fn downcast<T: Asset>(&self) -> Option<AssetHandle<T>> {
        Arc::clone(&self.data)
            .downcast::<T>()
            .ok()
            .map(|arc| AssetHandle::from_arc(self.guid, arc))
    }
}

impl std::fmt::Debug for UntypedAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UntypedAsset")
            .field("guid", &self.guid)
            .field("kind", &self.kind)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// GUID-addressed store of shared, immutable assets
pub struct ResourceRegistry {
    root: PathBuf,
    substitute_missing: bool,
    table: RwLock<AssetTable>,
    placeholders: RwLock<FxHashMap<(AssetKind, TypeId), ErasedAsset>>,
}

impl ResourceRegistry {
    /// Create an empty registry resolving relative paths against `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            substitute_missing: true,
            table: RwLock::new(AssetTable::default()),
            placeholders: RwLock::new(FxHashMap::default()),
        }
    }

    /// Create an empty registry from engine configuration
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::new(&config.asset_root);
        registry.substitute_missing = config.placeholders;
        registry
    }

    /// Directory relative asset paths are resolved against
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether unresolved references should be replaced by placeholders
    #[must_use]
    pub const fn substitutes_missing(&self) -> bool {
        self.substitute_missing
    }

    /// Number of registered assets
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.read().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.read().entries.is_empty()
    }

    #[must_use]
    pub fn contains(&self, guid: Guid) -> bool {
        self.table.read().entries.contains_key(&guid)
    }

    /// Load an asset, or return the existing one if its source is already loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or decoded, or if the
    /// descriptor does not produce a `T`.
    pub fn create_or_load<T: Asset>(&self, descriptor: AssetDescriptor) -> AssetResult<AssetHandle<T>> {
        let key = descriptor.dedup_key();
        if let Some(key) = &key
            && let Some(handle) = self.lookup_key::<T>(key)?
        {
            log::debug!("asset cache hit for {key}");
            return Ok(handle);
        }

        let ctx = LoadContext::new(&self.root, self);
        let asset = T::load(&descriptor, &ctx)?;
        let published = self.publish(Guid::new(), descriptor, Arc::new(asset), true)?;
        typed(published)
    }

    /// Like [`ResourceRegistry::create_or_load`], substituting a placeholder on failure.
    ///
    /// The error is handed back alongside the placeholder so callers can report it.
    pub fn load_or_placeholder<T: Asset>(
        &self,
        descriptor: AssetDescriptor,
    ) -> (AssetHandle<T>, Option<AssetError>) {
        let kind = descriptor.kind();
        let name = descriptor.display_name();
        match self.create_or_load::<T>(descriptor) {
            Ok(handle) => (handle, None),
            Err(err) => {
                log::warn!("substituting placeholder {kind} for '{name}': {err}");
                (self.placeholder::<T>(kind, Guid::NIL), Some(err))
            }
        }
    }

    /// Decode an asset on a worker thread.
    ///
    /// The asset only becomes visible in the registry once fully decoded.
    pub fn load_in_background<T: Asset>(self: &Arc<Self>, descriptor: AssetDescriptor) -> PendingAsset<T> {
        let (pending, sender) = PendingAsset::channel();

        if let Some(key) = descriptor.dedup_key()
            && let Ok(Some(handle)) = self.lookup_key::<T>(&key)
        {
            let _ = sender.send(Ok(handle));
            return pending;
        }

        let registry = Arc::clone(self);
        let name = descriptor.display_name();
        let spawned = thread::Builder::new()
            .name(format!("asset-load:{name}"))
            .spawn(move || {
                let result = registry.create_or_load::<T>(descriptor);
                if sender.send(result).is_err() {
                    log::debug!("background load of '{name}' finished after its handle was dropped");
                }
            });
        if let Err(err) = spawned {
            log::error!("failed to spawn asset loader: {err}");
        }
        pending
    }

    /// Register an already-built asset.
    ///
    /// If the descriptor's source is already registered, the existing asset
    /// is returned and `asset` is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::TypeMismatch`] if the existing entry is not a `T`.
    pub fn add<T: Asset>(&self, asset: T, descriptor: AssetDescriptor) -> AssetResult<AssetHandle<T>> {
        let published = self.publish(Guid::new(), descriptor, Arc::new(asset), true)?;
        typed(published)
    }

    /// Register a material built with [`Material::builder`]
    ///
    /// # Errors
    ///
    /// Fails only on an internal GUID collision.
    pub fn create_material(&self, material: Material) -> AssetResult<AssetHandle<Material>> {
        let descriptor = material.descriptor();
        self.add(material, descriptor)
    }

    /// Look up an asset without knowing its type
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::NotFound`] if no asset has this GUID.
    pub fn get(&self, guid: Guid) -> AssetResult<UntypedAsset> {
        let table = self.table.read();
        let entry = table.entries.get(&guid).ok_or(AssetError::NotFound(guid))?;
        Ok(UntypedAsset {
            guid,
            kind: entry.kind,
            name: entry.name.clone(),
            data: Arc::clone(&entry.data),
        })
    }

    /// Look up an asset of a known type
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::NotFound`] or [`AssetError::TypeMismatch`].
    pub fn get_typed<T: Asset>(&self, guid: Guid) -> AssetResult<AssetHandle<T>> {
        let table = self.table.read();
        let entry = table.entries.get(&guid).ok_or(AssetError::NotFound(guid))?;
        downcast_entry(guid, entry)
    }

    /// Descriptor an asset was created from
    #[must_use]
    pub fn descriptor(&self, guid: Guid) -> Option<AssetDescriptor> {
        self.table.read().entries.get(&guid).map(|e| e.descriptor.clone())
    }

    /// Registered GUIDs with their kinds and names, sorted by GUID
    #[must_use]
    pub fn entries(&self) -> Vec<(Guid, AssetKind, String)> {
        let table = self.table.read();
        let mut list: Vec<_> = table
            .entries
            .iter()
            .map(|(guid, e)| (*guid, e.kind, e.name.clone()))
            .collect();
        list.sort_by_key(|(guid, ..)| *guid);
        list
    }

    /// Number of live handles outside the registry
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::NotFound`] if no asset has this GUID.
    pub fn ref_count(&self, guid: Guid) -> AssetResult<usize> {
        self.table
            .read()
            .entries
            .get(&guid)
            .map(AssetEntry::external_refs)
            .ok_or(AssetError::NotFound(guid))
    }

    /// Drop the registry's entry for an asset nobody else holds
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::InUse`] while handles are alive, or
    /// [`AssetError::NotFound`].
    pub fn unload(&self, guid: Guid) -> AssetResult<()> {
        let mut table = self.table.write();
        let refs = table
            .entries
            .get(&guid)
            .map(AssetEntry::external_refs)
            .ok_or(AssetError::NotFound(guid))?;
        if refs > 0 {
            return Err(AssetError::InUse { guid, refs });
        }
        if let Some(entry) = table.remove(guid) {
            log::debug!("unloaded {} '{}' ({guid})", entry.kind, entry.name);
        }
        Ok(())
    }

    /// Unload every asset without external handles, returning how many went.
    ///
    /// Repeats until stable, since dropping a material releases its textures.
    pub fn collect_unused(&self) -> usize {
        let mut table = self.table.write();
        let mut removed = 0;
        loop {
            let unused: Vec<Guid> = table
                .entries
                .iter()
                .filter(|(_, e)| e.external_refs() == 0)
                .map(|(guid, _)| *guid)
                .collect();
            if unused.is_empty() {
                break;
            }
            for guid in unused {
                table.remove(guid);
                removed += 1;
            }
        }
        if removed > 0 {
            log::info!("collected {removed} unused asset(s)");
        }
        removed
    }

    /// Placeholder handle for `kind`, carrying `guid` so references survive a re-save
    pub fn placeholder<T: Asset>(&self, kind: AssetKind, guid: Guid) -> AssetHandle<T> {
        let cache_key = (kind, TypeId::of::<T>());
        let cached = self
            .placeholders
            .read()
            .get(&cache_key)
            .and_then(|data| Arc::clone(data).downcast::<T>().ok());
        let arc = cached.unwrap_or_else(|| {
            let fresh = Arc::new(T::placeholder(kind));
            self.placeholders
                .write()
                .entry(cache_key)
                .or_insert_with(|| Arc::clone(&fresh) as ErasedAsset);
            fresh
        });
        AssetHandle::placeholder(guid, arc)
    }

    /// Write a manifest describing how to rebuild every registered asset
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::Io`] or [`AssetError::Manifest`].
    pub fn save_manifest(&self, path: impl AsRef<Path>) -> AssetResult<()> {
        let path = path.as_ref();
        let manifest = {
            let table = self.table.read();
            Manifest {
                version: MANIFEST_VERSION,
                assets: table
                    .entries
                    .iter()
                    .map(|(guid, e)| {
                        (
                            *guid,
                            ManifestEntry {
                                name: e.name.clone(),
                                descriptor: e.descriptor.clone(),
                            },
                        )
                    })
                    .collect(),
            }
        };
        let json = serde_json::to_string_pretty(&manifest)
            .map_err(|e| AssetError::Manifest(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| AssetError::io(path, e))?;
        log::info!("saved manifest with {} asset(s) to {}", manifest.assets.len(), path.display());
        Ok(())
    }

    /// Rebuild assets listed in a manifest under their original GUIDs.
    ///
    /// Entries already present are skipped. Individual failures are collected
    /// in the report and do not stop the rest of the load.
    ///
    /// # Errors
    ///
    /// Returns an error only if the manifest itself cannot be read or parsed.
    pub fn load_manifest(&self, path: impl AsRef<Path>) -> AssetResult<ManifestReport> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| AssetError::io(path, e))?;
        let manifest: Manifest = serde_json::from_str(&text)
            .map_err(|e| AssetError::Manifest(format!("{}: {e}", path.display())))?;
        if manifest.version > MANIFEST_VERSION {
            log::warn!(
                "manifest version {} is newer than supported version {MANIFEST_VERSION}",
                manifest.version
            );
        }

        let mut report = ManifestReport::default();
        let mut ordered: Vec<(Guid, ManifestEntry)> = manifest.assets.into_iter().collect();
        ordered.sort_by_key(|(guid, entry)| (load_rank(entry.descriptor.kind()), *guid));

        for (guid, entry) in ordered {
            if self.contains(guid) {
                report.skipped += 1;
                continue;
            }
            let ctx = LoadContext::new(&self.root, self);
            let loaded = load_erased(&entry.descriptor, &ctx);
            report
                .missing_references
                .extend(ctx.take_missing().into_iter().map(|missing| MissingReference {
                    asset: guid,
                    missing,
                }));
            match loaded.and_then(|data| self.publish_named(guid, entry.name.clone(), entry.descriptor, data, false)) {
                Ok(_) => report.loaded += 1,
                Err(err) => {
                    log::warn!("manifest entry '{}' ({guid}) failed: {err}", entry.name);
                    report.failed.push((guid, err));
                }
            }
        }

        log::info!(
            "loaded manifest {}: {} loaded, {} skipped, {} failed",
            path.display(),
            report.loaded,
            report.skipped,
            report.failed.len()
        );
        Ok(report)
    }

    fn lookup_key<T: Asset>(&self, key: &str) -> AssetResult<Option<AssetHandle<T>>> {
        let table = self.table.read();
        let Some(&guid) = table.by_key.get(key) else {
            return Ok(None);
        };
        match table.entries.get(&guid) {
            Some(entry) => downcast_entry(guid, entry).map(Some),
            None => Ok(None),
        }
    }

    fn publish<T: Asset>(
        &self,
        guid: Guid,
        descriptor: AssetDescriptor,
        data: Arc<T>,
        dedup: bool,
    ) -> AssetResult<Published> {
        let name = descriptor.display_name();
        self.publish_named(guid, name, descriptor, data, dedup)
    }

    /// Insert under `guid`; with `dedup`, an existing entry for the same source wins
    fn publish_named(
        &self,
        guid: Guid,
        name: String,
        descriptor: AssetDescriptor,
        data: ErasedAsset,
        dedup: bool,
    ) -> AssetResult<Published> {
        let key = descriptor.dedup_key();
        let mut table = self.table.write();

        if dedup
            && let Some(key) = &key
            && let Some(&existing) = table.by_key.get(key)
            && let Some(entry) = table.entries.get(&existing)
        {
            log::debug!("asset {key} was published concurrently, reusing {existing}");
            return Ok((existing, entry.kind, Arc::clone(&entry.data)));
        }

        debug_assert!(
            !table.entries.contains_key(&guid),
            "GUID collision on {guid}"
        );
        if table.entries.contains_key(&guid) {
            log::error!("refusing to register a second asset under {guid}");
            return Err(AssetError::GuidCollision(guid));
        }

        if let Some(key) = key {
            table.by_key.entry(key).or_insert(guid);
        }
        let kind = descriptor.kind();
        log::debug!("registered {kind} '{name}' as {guid}");
        table.entries.insert(
            guid,
            AssetEntry {
                kind,
                name,
                descriptor,
                data: Arc::clone(&data),
            },
        );
        Ok((guid, kind, data))
    }
}

impl std::fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceRegistry")
            .field("root", &self.root)
            .field("assets", &self.len())
            .finish_non_exhaustive()
    }
}

/// Manifest load order: dependencies before the materials that reference them
fn load_rank(kind: AssetKind) -> usize {
    AssetKind::ALL
        .iter()
        .position(|k| *k == kind)
        .unwrap_or(AssetKind::ALL.len())
}

fn downcast_entry<T: Asset>(guid: Guid, entry: &AssetEntry) -> AssetResult<AssetHandle<T>> {
    Arc::clone(&entry.data)
        .downcast::<T>()
        .map(|arc| AssetHandle::from_arc(guid, arc))
        .map_err(|_| AssetError::TypeMismatch {
            guid,
            actual: entry.kind,
            expected: T::TYPE_NAME,
        })
}

fn typed<T: Asset>((guid, kind, data): Published) -> AssetResult<AssetHandle<T>> {
    data.downcast::<T>()
        .map(|arc| AssetHandle::from_arc(guid, arc))
        .map_err(|_| AssetError::TypeMismatch {
            guid,
            actual: kind,
            expected: T::TYPE_NAME,
        })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use glam::Vec3;

    use super::*;
    use crate::assets::descriptor::MeshShape;
    use crate::assets::types::{Mesh, MaterialValue, Shader, ShaderStage, Texture};

    const TRIANGLE: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

    fn write_png(path: &Path) {
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([10, 20, 30, 255]));
        img.save(path).unwrap();
    }

    #[test]
    fn test_create_or_load_dedups_by_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("box.obj"), TRIANGLE).unwrap();
        let registry = ResourceRegistry::new(dir.path());

        let a = registry.create_or_load::<Mesh>(AssetDescriptor::mesh("box.obj")).unwrap();
        let b = registry.create_or_load::<Mesh>(AssetDescriptor::mesh("box.obj")).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(a.guid(), b.guid());
        assert!(a.ptr_eq(&b));
        assert_eq!(registry.ref_count(a.guid()).unwrap(), 2);
    }

    #[test]
    fn test_procedural_meshes_never_dedup() {
        let registry = ResourceRegistry::new(".");
        let shapes = vec![MeshShape::Cube {
            center: Vec3::ZERO,
            size: Vec3::ONE,
        }];
        let a = registry
            .create_or_load::<Mesh>(AssetDescriptor::procedural_mesh(shapes.clone()))
            .unwrap();
        let b = registry
            .create_or_load::<Mesh>(AssetDescriptor::procedural_mesh(shapes))
            .unwrap();
        assert_ne!(a.guid(), b.guid());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_get_wrong_type_is_mismatch() {
        let registry = ResourceRegistry::new(".");
        let mesh = registry
            .add(Mesh::cube(Vec3::ZERO, Vec3::ONE), AssetDescriptor::procedural_mesh(Vec::new()))
            .unwrap();
        let err = registry.get_typed::<Texture>(mesh.guid()).unwrap_err();
        assert!(matches!(err, AssetError::TypeMismatch { .. }));
        assert!(matches!(
            registry.get(Guid::new()),
            Err(AssetError::NotFound(_))
        ));
        assert!(registry.get(mesh.guid()).unwrap().downcast::<Mesh>().is_some());
    }

    #[test]
    fn test_missing_file_gives_placeholder_and_error() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ResourceRegistry::new(dir.path());
        let (handle, err) =
            registry.load_or_placeholder::<Texture>(AssetDescriptor::texture_2d("missing.png"));
        assert!(handle.is_placeholder());
        assert_eq!(&handle.pixels[..4], &[255, 0, 255, 255]);
        assert!(matches!(err, Some(AssetError::Io { .. })));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unload_refuses_while_in_use() {
        let registry = ResourceRegistry::new(".");
        let handle = registry
            .add(Mesh::cube(Vec3::ZERO, Vec3::ONE), AssetDescriptor::procedural_mesh(Vec::new()))
            .unwrap();
        let guid = handle.guid();

        assert!(matches!(
            registry.unload(guid),
            Err(AssetError::InUse { refs: 1, .. })
        ));
        drop(handle);
        registry.unload(guid).unwrap();
        assert!(!registry.contains(guid));
    }

    #[test]
    fn test_collect_unused_follows_material_dependencies() {
        let registry = ResourceRegistry::new(".");
        let shader = registry
            .add(
                Shader::default(),
                AssetDescriptor::shader([(ShaderStage::Vertex, "a.glsl")]),
            )
            .unwrap();
        let material = registry
            .create_material(Material::builder("Gem", shader.clone()).build())
            .unwrap();
        drop(shader);

        assert_eq!(registry.collect_unused(), 0);
        drop(material);
        assert_eq!(registry.collect_unused(), 2);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_manifest_round_trip_keeps_guids() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("box.png"));
        fs::write(dir.path().join("box.obj"), TRIANGLE).unwrap();
        fs::write(dir.path().join("basic.vert"), "void main() {}").unwrap();

        let registry = ResourceRegistry::new(dir.path());
        let mesh = registry.create_or_load::<Mesh>(AssetDescriptor::mesh("box.obj")).unwrap();
        let texture = registry
            .create_or_load::<Texture>(AssetDescriptor::texture_2d("box.png"))
            .unwrap();
        let shader = registry
            .create_or_load::<Shader>(AssetDescriptor::shader([(ShaderStage::Vertex, "basic.vert")]))
            .unwrap();
        let material = registry
            .create_material(
                Material::builder("Box", shader.clone())
                    .set("u_Material.Diffuse", texture.clone())
                    .set("u_Material.Shininess", 0.1_f32)
                    .build(),
            )
            .unwrap();

        let manifest = dir.path().join("manifest.json");
        registry.save_manifest(&manifest).unwrap();

        let fresh = ResourceRegistry::new(dir.path());
        let report = fresh.load_manifest(&manifest).unwrap();
        assert!(report.is_clean(), "{report:?}");
        assert_eq!(report.loaded, 4);

        assert!(fresh.get_typed::<Mesh>(mesh.guid()).is_ok());
        let reloaded = fresh.get_typed::<Material>(material.guid()).unwrap();
        assert_eq!(reloaded.shader().guid(), shader.guid());
        match reloaded.get("u_Material.Diffuse") {
            Some(MaterialValue::Texture(t)) => {
                assert_eq!(t.guid(), texture.guid());
                assert!(!t.is_placeholder());
            }
            other => panic!("unexpected diffuse {other:?}"),
        }

        // Loading twice skips what is already there
        let again = fresh.load_manifest(&manifest).unwrap();
        assert_eq!(again.skipped, 4);
    }

    #[test]
    fn test_manifest_failure_is_reported_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("box.obj"), TRIANGLE).unwrap();
        write_png(&dir.path().join("gone.png"));

        let registry = ResourceRegistry::new(dir.path());
        registry.create_or_load::<Mesh>(AssetDescriptor::mesh("box.obj")).unwrap();
        let texture = registry
            .create_or_load::<Texture>(AssetDescriptor::texture_2d("gone.png"))
            .unwrap();
        let manifest = dir.path().join("manifest.json");
        registry.save_manifest(&manifest).unwrap();
        fs::remove_file(dir.path().join("gone.png")).unwrap();

        let fresh = ResourceRegistry::new(dir.path());
        let report = fresh.load_manifest(&manifest).unwrap();
        assert_eq!(report.loaded, 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, texture.guid());
    }

    #[test]
    fn test_background_load_publishes_once_ready() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("box.obj"), TRIANGLE).unwrap();
        let registry = Arc::new(ResourceRegistry::new(dir.path()));

        let pending = registry.load_in_background::<Mesh>(AssetDescriptor::mesh("box.obj"));
        let handle = pending.wait().unwrap();
        assert_eq!(handle.triangle_count(), 1);
        assert!(registry.contains(handle.guid()));

        let mut second = registry.load_in_background::<Mesh>(AssetDescriptor::mesh("box.obj"));
        assert_eq!(second.poll(), crate::assets::LoadState::Ready);
        assert_eq!(second.handle().map(|h| h.guid()), Some(handle.guid()));
    }

    #[test]
    fn test_placeholders_are_shared_per_kind() {
        let registry = ResourceRegistry::new(".");
        let a = registry.placeholder::<Mesh>(AssetKind::Mesh, Guid::new());
        let b = registry.placeholder::<Mesh>(AssetKind::Mesh, Guid::new());
        assert!(a.ptr_eq(&b));
        assert_ne!(a.guid(), b.guid());
        assert!(a.is_placeholder());
    }
}
