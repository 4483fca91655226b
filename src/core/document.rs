//! Scene documents
//!
//! A [`SceneDocument`] is the serializable form of a [`Scene`]: entities
//! become nested [`EntityRecord`]s and every asset is referenced by GUID
//! string. Loading resolves those GUIDs through a [`ResourceRegistry`] and
//! rebuilds components through a [`ComponentFactory`].
//!
//! Every field is optional on input so documents written by older or newer
//! versions still load.

use glam::Quat;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::config::SceneError;
use super::frame::{Environment, Light};
use super::report::{LoadIssue, LoadReport};
use super::scene::Scene;
use crate::assets::{Asset, AssetHandle, AssetKind, Guid, ResourceRegistry};
use crate::components::Camera;
use crate::ecs::{
    Capabilities, ComponentError, ComponentFactory, ComponentRef, ComponentSlot, EntityId,
    ResolveContext, Transform,
};

/// Current document version
pub const SCENE_VERSION: u32 = 1;

/// Serialized scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDocument {
    pub version: u32,
    pub name: String,
    pub lights: Vec<Light>,
    pub environment: EnvironmentRecord,
    /// GUID of the entity holding the active camera
    pub main_camera: Option<Guid>,
    pub objects: Vec<EntityRecord>,
}

impl Default for SceneDocument {
    fn default() -> Self {
        Self {
            version: SCENE_VERSION,
            name: String::from("Untitled"),
            lights: Vec::new(),
            environment: EnvironmentRecord::default(),
            main_camera: None,
            objects: Vec::new(),
        }
    }
}

/// Serialized [`Environment`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentRecord {
    pub skybox: Option<Guid>,
    pub skybox_shader: Option<Guid>,
    pub skybox_rotation: Quat,
    pub luts: [Option<Guid>; 3],
}

impl Default for EnvironmentRecord {
    fn default() -> Self {
        Self {
            skybox: None,
            skybox_shader: None,
            skybox_rotation: Quat::IDENTITY,
            luts: [None; 3],
        }
    }
}

/// Serialized entity with its subtree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityRecord {
    pub name: String,
    pub guid: Guid,
    pub transform: Transform,
    pub components: Vec<ComponentRecord>,
    pub children: Vec<EntityRecord>,
}

/// Serialized component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRecord {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub data: Value,
}

fn enabled_by_default() -> bool {
    true
}

fn guid_of<T>(handle: Option<&AssetHandle<T>>) -> Option<Guid> {
    handle.map(AssetHandle::guid).filter(|g| !g.is_nil())
}

// ============================================================================
// Scene -> document
// ============================================================================

/// Convert a scene into its document, depth-first from the roots
///
/// # Errors
///
/// Returns [`SceneError::Serialize`] if a component fails to save.
pub fn scene_to_document(scene: &Scene) -> Result<SceneDocument, SceneError> {
    let environment = scene.environment();
    let objects = scene
        .roots()
        .iter()
        .map(|&id| entity_record(scene, id))
        .collect::<Result<Vec<_>, _>>()?;

    let main_camera = scene
        .active_camera_ref()
        .and_then(|camera| scene.entity(camera.entity()))
        .map(|entity| entity.guid());

    Ok(SceneDocument {
        version: SCENE_VERSION,
        name: scene.name().to_owned(),
        lights: scene.lights().to_vec(),
        environment: EnvironmentRecord {
            skybox: guid_of(environment.skybox.as_ref()),
            skybox_shader: guid_of(environment.skybox_shader.as_ref()),
            skybox_rotation: environment.skybox_rotation,
            luts: [
                guid_of(environment.luts[0].as_ref()),
                guid_of(environment.luts[1].as_ref()),
                guid_of(environment.luts[2].as_ref()),
            ],
        },
        main_camera,
        objects,
    })
}

fn entity_record(scene: &Scene, id: EntityId) -> Result<EntityRecord, SceneError> {
    let Some(entity) = scene.entity(id) else {
        return Ok(EntityRecord::default());
    };

    let mut components = Vec::with_capacity(entity.components().len());
    for slot in entity.components().iter() {
        if !slot.component().capabilities().contains(Capabilities::SERIALIZE) {
            continue;
        }
        let data = slot.component().save().map_err(|e| {
            SceneError::Serialize(format!(
                "{} on '{}': {e}",
                slot.type_name(),
                entity.name()
            ))
        })?;
        components.push(ComponentRecord {
            type_name: slot.type_name().to_owned(),
            enabled: slot.is_enabled(),
            data,
        });
    }

    let children = entity
        .children()
        .iter()
        .map(|child| entity_record(scene, child))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(EntityRecord {
        name: entity.name().to_owned(),
        guid: entity.guid(),
        transform: *entity.local_transform(),
        components,
        children,
    })
}

// ============================================================================
// Document -> scene
// ============================================================================

/// Rebuild a scene from its document.
///
/// Never fails: missing assets, unknown component tags, malformed component
/// data and unusable GUIDs are recorded in the [`LoadReport`] and the rest of
/// the scene loads.
pub fn document_to_scene(
    document: SceneDocument,
    registry: &ResourceRegistry,
    factory: &ComponentFactory,
) -> (Scene, LoadReport) {
    if document.version > SCENE_VERSION {
        log::warn!(
            "scene '{}' has version {}, newer than {SCENE_VERSION}",
            document.name,
            document.version
        );
    }

    let mut report = LoadReport::default();
    let environment = load_environment(&document.environment, &document.name, registry, &mut report.issues);

    let mut scene = Scene::new(document.name);
    *scene.lights_mut() = document.lights;
    *scene.environment_mut() = environment;

    for record in document.objects {
        load_entity(&mut scene, record, None, registry, factory, &mut report.issues);
    }

    if let Some(guid) = document.main_camera {
        match scene.find_by_guid(guid) {
            Some(id) if scene.get::<Camera>(id).is_some() => {
                // Checked above, cannot fail
                let _ = scene.set_active_camera(ComponentRef::new(id));
            }
            _ => report.issues.push(LoadIssue::MissingCamera(guid)),
        }
    }

    report.entities = scene.len();
    (scene, report)
}

fn load_environment(
    record: &EnvironmentRecord,
    scene_name: &str,
    registry: &ResourceRegistry,
    issues: &mut Vec<LoadIssue>,
) -> Environment {
    let mut ctx = ResolveContext::new(registry, scene_name, "Environment", issues);
    let mut resolve = |guid: Option<Guid>, kind: AssetKind| optional(&mut ctx, guid, kind);

    let skybox = resolve(record.skybox, AssetKind::TextureCube);
    let color = resolve(record.luts[0], AssetKind::Texture3D);
    let cool = resolve(record.luts[1], AssetKind::Texture3D);
    let custom = resolve(record.luts[2], AssetKind::Texture3D);
    let skybox_shader = optional(&mut ctx, record.skybox_shader, AssetKind::Shader);

    Environment {
        skybox,
        skybox_shader,
        skybox_rotation: record.skybox_rotation,
        luts: [color, cool, custom],
    }
}

fn optional<T: Asset>(ctx: &mut ResolveContext<'_>, guid: Option<Guid>, kind: AssetKind) -> Option<AssetHandle<T>> {
    ctx.optional_asset(guid, kind).ok().flatten()
}

fn load_entity(
    scene: &mut Scene,
    record: EntityRecord,
    parent: Option<EntityId>,
    registry: &ResourceRegistry,
    factory: &ComponentFactory,
    issues: &mut Vec<LoadIssue>,
) {
    let mut guid = record.guid;
    if guid.is_nil() || scene.find_by_guid(guid).is_some() {
        let fresh = Guid::new();
        log::warn!("entity '{}' has unusable GUID {guid}, using {fresh}", record.name);
        issues.push(LoadIssue::DuplicateGuid {
            entity: record.name.clone(),
            guid,
        });
        guid = fresh;
    }

    let id = match parent {
        Some(parent) => scene.spawn_child(parent, record.name.clone(), guid, record.transform),
        None => scene.spawn(record.name.clone(), guid, record.transform),
    };

    let mut slots: Vec<ComponentSlot> = Vec::with_capacity(record.components.len());
    for component in &record.components {
        let mut ctx = ResolveContext::new(registry, &record.name, &component.type_name, issues);
        let slot = match factory.create(&component.type_name, &component.data, component.enabled, &mut ctx) {
            None => {
                log::warn!(
                    "skipping unknown component '{}' on '{}'",
                    component.type_name,
                    record.name
                );
                issues.push(LoadIssue::UnknownComponent {
                    entity: record.name.clone(),
                    type_name: component.type_name.clone(),
                });
                continue;
            }
            // Already reported by the resolve context
            Some(Err(ComponentError::MissingAsset { .. })) => continue,
            Some(Err(err)) => {
                log::warn!(
                    "skipping invalid {} on '{}': {err}",
                    component.type_name,
                    record.name
                );
                issues.push(LoadIssue::InvalidComponent {
                    entity: record.name.clone(),
                    type_name: component.type_name.clone(),
                    message: err.to_string(),
                });
                continue;
            }
            Some(Ok(slot)) => slot,
        };

        if slots.iter().any(|s| s.type_id() == slot.type_id()) {
            issues.push(LoadIssue::DuplicateComponent {
                entity: record.name.clone(),
                type_name: component.type_name.clone(),
            });
            continue;
        }
        slots.push(slot);
    }
    scene.attach_loaded(id, slots);

    for child in record.children {
        load_entity(scene, child, Some(id), registry, factory, issues);
    }
}
