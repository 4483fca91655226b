//! The scene: owner of every entity
//!
//! All structural changes go through [`Scene`]: creating and destroying
//! entities, re-parenting, attaching and removing components. Entity nodes live
//! in a scene-owned `hecs::World`; parents list their children by id and
//! children point back at their parent by id.
//!
//! Saving and loading go through the document layer in
//! [`document`](super::document); the file format is chosen by extension.

use std::any::{Any, TypeId};
use std::fmt;
use std::fs;
use std::path::Path;

use glam::Mat4;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::config::{DocumentFormat, SceneError};
use super::document::{SceneDocument, document_to_scene, scene_to_document};
use super::frame::{CameraView, Environment, Light, RenderFrame};
use super::report::LoadReport;
use crate::assets::{Guid, ResourceRegistry};
use crate::components::Camera;
use crate::ecs::{
    AttachContext, Capabilities, CommandQueue, ComponentFactory, ComponentGuard, ComponentRef,
    ComponentSlot, ComponentType, Entity, EntityId, GlobalTransform, GraphError, Inspector,
    RenderContext, SceneCommand, Transform, UpdateContext,
};

/// A named collection of entities with lights, a camera and environment settings
pub struct Scene {
    name: String,
    world: hecs::World,
    roots: Vec<EntityId>,
    by_name: FxHashMap<String, SmallVec<[EntityId; 2]>>,
    by_guid: FxHashMap<Guid, EntityId>,
    next_serial: u64,
    lights: Vec<Light>,
    environment: Environment,
    active_camera: Option<ComponentRef<Camera>>,
    commands: CommandQueue,
    elapsed: f32,
}

impl Scene {
    /// Create an empty scene
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            world: hecs::World::new(),
            roots: Vec::new(),
            by_name: FxHashMap::default(),
            by_guid: FxHashMap::default(),
            next_serial: 0,
            lights: Vec::new(),
            environment: Environment::default(),
            active_camera: None,
            commands: CommandQueue::new(),
            elapsed: 0.0,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_scene_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Number of live entities
    #[must_use]
    pub fn len(&self) -> usize {
        self.world.len() as usize
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.world.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.world.contains(id.0)
    }

    /// Top-level entities in creation order
    #[must_use]
    pub fn roots(&self) -> &[EntityId] {
        &self.roots
    }

    /// Borrow an entity node; the scene cannot change while the borrow lives
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<hecs::Ref<'_, Entity>> {
        self.world.get::<&Entity>(id.0).ok()
    }

    /// Every entity, parents before children, siblings in order
    #[must_use]
    pub fn walk(&self) -> Vec<EntityId> {
        let mut order = Vec::with_capacity(self.len());
        let mut stack: Vec<EntityId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if let Some(entity) = self.entity(id) {
                order.push(id);
                stack.extend(entity.children.as_slice().iter().rev().copied());
            }
        }
        order
    }

    fn node_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.world.query_one_mut::<&mut Entity>(id.0).ok()
    }

    fn entity_mut(&mut self, id: EntityId) -> Result<&mut Entity, GraphError> {
        self.node_mut(id).ok_or(GraphError::NoSuchEntity(id))
    }

    // ========================================================================
    // Entity lifetime
    // ========================================================================

    /// Create a root entity
    pub fn create_entity(&mut self, name: impl Into<String>) -> EntityId {
        self.spawn(name.into(), Guid::new(), Transform::IDENTITY)
    }

    /// Create an entity as the last child of `parent`
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NoSuchEntity`] if `parent` is not alive.
    pub fn create_child(&mut self, parent: EntityId, name: impl Into<String>) -> Result<EntityId, GraphError> {
        if !self.contains(parent) {
            return Err(GraphError::NoSuchEntity(parent));
        }
        Ok(self.spawn_child(parent, name.into(), Guid::new(), Transform::IDENTITY))
    }

    /// Insert a root entity with a known GUID; the caller guarantees uniqueness
    pub(crate) fn spawn(&mut self, name: String, guid: Guid, local: Transform) -> EntityId {
        let id = self.insert_node(Entity::new(name, guid, 0, local));
        self.roots.push(id);
        id
    }

    /// Insert an entity straight under a live `parent`
    pub(crate) fn spawn_child(&mut self, parent: EntityId, name: String, guid: Guid, local: Transform) -> EntityId {
        let mut node = Entity::new(name, guid, 0, local);
        node.parent = Some(parent);
        let id = self.insert_node(node);
        if let Some(entity) = self.node_mut(parent) {
            entity.children.add(id);
        }
        id
    }

    fn insert_node(&mut self, mut node: Entity) -> EntityId {
        node.serial = self.next_serial;
        self.next_serial += 1;

        let name = node.name.clone();
        let guid = node.guid;
        let id = EntityId(self.world.spawn((node,)));
        self.by_name.entry(name).or_default().push(id);
        self.by_guid.insert(guid, id);
        id
    }

    /// Destroy an entity and its whole subtree.
    ///
    /// Components are destroyed in reverse attach order, then the children
    /// depth-first, then the entity leaves every index. The active camera is
    /// cleared if it lived in the subtree.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NoSuchEntity`] if the entity is not alive.
    pub fn destroy(&mut self, id: EntityId) -> Result<(), GraphError> {
        let parent = self.entity(id).ok_or(GraphError::NoSuchEntity(id))?.parent;
        self.unlink(id, parent);

        let destroyed = self.destroy_subtree(id);
        log::debug!("destroyed {destroyed} entities under {id}");

        if let Some(camera) = self.active_camera
            && !self.contains(camera.entity())
        {
            log::debug!("active camera destroyed with {id}");
            self.active_camera = None;
        }
        Ok(())
    }

    fn destroy_subtree(&mut self, id: EntityId) -> usize {
        let children = match self.node_mut(id) {
            Some(entity) => {
                for mut slot in entity.components.drain_reverse() {
                    slot.component.on_destroy();
                }
                entity.children.as_slice().to_vec()
            }
            None => return 0,
        };

        let mut count = 1;
        for child in children {
            count += self.destroy_subtree(child);
        }

        let Some((name, guid)) = self.node_mut(id).map(|e| (std::mem::take(&mut e.name), e.guid)) else {
            return count;
        };
        self.forget_name(&name, id);
        self.by_guid.remove(&guid);
        if self.world.despawn(id.0).is_err() {
            log::debug!("entity {id} already despawned");
        }
        count
    }

    fn forget_name(&mut self, name: &str, id: EntityId) {
        if let Some(ids) = self.by_name.get_mut(name) {
            ids.retain(|e| *e != id);
            if ids.is_empty() {
                self.by_name.remove(name);
            }
        }
    }

    /// Rename an entity
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NoSuchEntity`] if the entity is not alive.
    pub fn set_name(&mut self, id: EntityId, name: impl Into<String>) -> Result<(), GraphError> {
        let name = name.into();
        let entity = self.entity_mut(id)?;
        let old = std::mem::replace(&mut entity.name, name.clone());

        self.forget_name(&old, id);
        self.by_name.entry(name).or_default().push(id);
        Ok(())
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// First entity with this name, in creation order
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<EntityId> {
        self.by_name
            .get(name)?
            .iter()
            .copied()
            .min_by_key(|id| self.entity(*id).map_or(u64::MAX, |e| e.serial))
    }

    /// Every entity with this name, in creation order
    #[must_use]
    pub fn find_all_by_name(&self, name: &str) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.by_name.get(name).map(|ids| ids.to_vec()).unwrap_or_default();
        ids.sort_by_key(|id| self.entity(*id).map_or(u64::MAX, |e| e.serial));
        ids
    }

    #[must_use]
    pub fn find_by_guid(&self, guid: Guid) -> Option<EntityId> {
        self.by_guid.get(&guid).copied()
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    /// Move `child` under `parent`, or to the root when `None`, keeping its
    /// local transform
    ///
    /// # Errors
    ///
    /// [`GraphError::Cycle`] if `parent` is `child` or one of its descendants;
    /// [`GraphError::NoSuchEntity`] if either entity is not alive.
    pub fn set_parent(&mut self, child: EntityId, parent: Option<EntityId>) -> Result<(), GraphError> {
        let old_parent = self.entity(child).ok_or(GraphError::NoSuchEntity(child))?.parent;

        if let Some(parent) = parent {
            if !self.contains(parent) {
                return Err(GraphError::NoSuchEntity(parent));
            }
            if self.is_ancestor_or_self(child, parent) {
                return Err(GraphError::Cycle { child, parent });
            }
        }
        if old_parent == parent {
            return Ok(());
        }

        self.unlink(child, old_parent);
        match parent {
            Some(parent) => {
                if let Some(entity) = self.node_mut(parent) {
                    entity.children.add(child);
                }
            }
            None => self.roots.push(child),
        }
        if let Some(entity) = self.node_mut(child) {
            entity.parent = parent;
        }
        self.invalidate_subtree(child);
        Ok(())
    }

    /// Like [`Scene::set_parent`] but keeps the world transform, adjusting the
    /// local transform to the new parent
    ///
    /// # Errors
    ///
    /// See [`Scene::set_parent`].
    pub fn set_parent_keep_world(&mut self, child: EntityId, parent: Option<EntityId>) -> Result<(), GraphError> {
        let world = self.world_matrix(child).ok_or(GraphError::NoSuchEntity(child))?;
        self.set_parent(child, parent)?;
        self.set_world_transform(child, world)
    }

    /// Whether `ancestor` is `node` or lies above it
    fn is_ancestor_or_self(&self, ancestor: EntityId, node: EntityId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.entity(id).and_then(|e| e.parent);
        }
        false
    }

    fn unlink(&mut self, child: EntityId, parent: Option<EntityId>) {
        match parent {
            Some(parent) => {
                if let Some(entity) = self.node_mut(parent) {
                    entity.children.remove(child);
                }
            }
            None => self.roots.retain(|r| *r != child),
        }
    }

    // ========================================================================
    // Transforms
    // ========================================================================

    #[must_use]
    pub fn local_transform(&self, id: EntityId) -> Option<Transform> {
        self.entity(id).map(|e| *e.transform.local())
    }

    /// Replace the local transform and invalidate the subtree
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NoSuchEntity`] if the entity is not alive.
    pub fn set_local_transform(&mut self, id: EntityId, local: Transform) -> Result<(), GraphError> {
        self.entity_mut(id)?.transform.set_local(local);
        self.invalidate_subtree(id);
        Ok(())
    }

    /// Edit the local transform in place
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NoSuchEntity`] if the entity is not alive.
    pub fn modify_transform(&mut self, id: EntityId, edit: impl FnOnce(&mut Transform)) -> Result<(), GraphError> {
        edit(self.entity_mut(id)?.transform.local_mut());
        self.invalidate_subtree(id);
        Ok(())
    }

    /// Set the world transform, converting through the parent's world matrix
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NoSuchEntity`] if the entity is not alive.
    pub fn set_world_transform(&mut self, id: EntityId, world: Mat4) -> Result<(), GraphError> {
        let parent = self.entity(id).ok_or(GraphError::NoSuchEntity(id))?.parent;
        let parent_world = parent
            .and_then(|p| self.world_matrix(p))
            .unwrap_or(Mat4::IDENTITY);
        let local = Transform::from_matrix(parent_world.inverse() * world);
        self.set_local_transform(id, local)
    }

    /// World matrix of an entity, recomputing stale caches along the way.
    ///
    /// Walks up to the first ancestor with a valid cache, then composes back
    /// down, storing every matrix it computes.
    #[must_use]
    pub fn world_matrix(&self, id: EntityId) -> Option<Mat4> {
        let entity = self.entity(id)?;
        if let Some(world) = entity.transform.cached_world() {
            return Some(world);
        }

        let mut chain: SmallVec<[hecs::Ref<'_, Entity>; 16]> = SmallVec::new();
        let mut base = Mat4::IDENTITY;
        let mut current = Some(entity);
        while let Some(node) = current {
            if let Some(world) = node.transform.cached_world() {
                base = world;
                break;
            }
            let parent = node.parent;
            chain.push(node);
            current = parent.and_then(|p| self.entity(p));
        }

        for node in chain.iter().rev() {
            base *= node.transform.local_matrix();
            node.transform.store_world(base);
        }
        Some(base)
    }

    #[must_use]
    pub fn world_transform(&self, id: EntityId) -> Option<GlobalTransform> {
        self.world_matrix(id).map(GlobalTransform::new)
    }

    /// Mark `id` and every descendant with a valid cache as dirty
    fn invalidate_subtree(&self, id: EntityId) {
        let Some(entity) = self.entity(id) else {
            return;
        };
        entity.transform.mark_dirty();

        let mut stack: SmallVec<[EntityId; 16]> = entity.children.iter().collect();
        while let Some(next) = stack.pop() {
            if let Some(child) = self.entity(next)
                && child.transform.mark_dirty()
            {
                stack.extend(child.children.iter());
            }
        }
    }

    // ========================================================================
    // Components
    // ========================================================================

    /// Attach a component and run its `on_attach`
    ///
    /// # Errors
    ///
    /// [`GraphError::DuplicateComponent`] if the entity already has a `T`
    /// (nothing changes); [`GraphError::NoSuchEntity`] if it is not alive.
    pub fn attach<T: ComponentType>(&mut self, id: EntityId, component: T) -> Result<ComponentRef<T>, GraphError> {
        let entity = self.entity_mut(id)?;
        if entity.components.contains::<T>() {
            return Err(GraphError::DuplicateComponent {
                entity: id,
                type_name: T::TYPE_NAME,
            });
        }
        let index = entity.components.push(ComponentSlot::new(component, true));
        self.run_attach(id, index);
        Ok(ComponentRef::new(id))
    }

    /// Attach a component, replacing (and destroying) an existing `T`
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NoSuchEntity`] if the entity is not alive.
    pub fn attach_or_replace<T: ComponentType>(
        &mut self,
        id: EntityId,
        component: T,
    ) -> Result<ComponentRef<T>, GraphError> {
        let entity = self.entity_mut(id)?;
        let Some(index) = entity.components.position(TypeId::of::<T>()) else {
            return self.attach(id, component);
        };

        log::warn!("replacing {} on '{}'", T::TYPE_NAME, entity.name);
        let mut old = entity.components.replace(index, ComponentSlot::new(component, true));
        old.component.on_destroy();
        self.run_attach(id, index);
        Ok(ComponentRef::new(id))
    }

    /// Store already-built slots, then run `on_attach` on each in order so
    /// every hook sees all of its siblings
    pub(crate) fn attach_loaded(&mut self, id: EntityId, slots: Vec<ComponentSlot>) {
        let Some(entity) = self.node_mut(id) else {
            return;
        };
        let first = entity.components.len();
        for slot in slots {
            entity.components.push(slot);
        }
        let last = entity.components.len();
        for index in first..last {
            self.run_attach(id, index);
        }
    }

    fn run_attach(&mut self, id: EntityId, index: usize) {
        let Some(entity) = self.node_mut(id) else {
            return;
        };
        let siblings = entity.components.sibling_types(index);
        let Entity { name, components, .. } = entity;
        let Some(slot) = components.slot_mut(index) else {
            return;
        };

        let mut enabled = slot.enabled;
        let mut ctx = AttachContext {
            entity: id,
            name: name.as_str(),
            siblings: &siblings,
            enabled: &mut enabled,
        };
        slot.component.on_attach(&mut ctx);
        slot.enabled = enabled;
    }

    /// Borrow the `T` component of an entity
    #[must_use]
    pub fn get<T: Any>(&self, id: EntityId) -> Option<ComponentGuard<'_, T>> {
        ComponentGuard::new(self.entity(id)?)
    }

    pub fn get_mut<T: Any>(&mut self, id: EntityId) -> Option<&mut T> {
        self.node_mut(id)?.components.get_mut::<T>()
    }

    /// Resolve a typed component reference
    #[must_use]
    pub fn component<T: Any>(&self, reference: ComponentRef<T>) -> Option<ComponentGuard<'_, T>> {
        self.get::<T>(reference.entity())
    }

    /// Detach the `T` component, running its `on_destroy`
    pub fn remove<T: Any>(&mut self, id: EntityId) -> Option<T> {
        let entity = self.node_mut(id)?;
        let index = entity.components.position(TypeId::of::<T>())?;
        let mut slot = entity.components.remove(index);
        slot.component.on_destroy();

        if let Some(camera) = self.active_camera
            && camera.entity() == id
            && TypeId::of::<T>() == TypeId::of::<Camera>()
        {
            self.active_camera = None;
        }
        slot.into_inner::<T>()
    }

    /// Enable or disable the `T` component; it stays attached either way
    ///
    /// # Errors
    ///
    /// [`GraphError::NoSuchComponent`] if the entity has no `T`;
    /// [`GraphError::NoSuchEntity`] if it is not alive.
    pub fn set_component_enabled<T: ComponentType>(&mut self, id: EntityId, enabled: bool) -> Result<(), GraphError> {
        self.set_enabled_by_type(id, TypeId::of::<T>(), T::TYPE_NAME, enabled)
    }

    fn set_enabled_by_type(
        &mut self,
        id: EntityId,
        type_id: TypeId,
        type_name: &'static str,
        enabled: bool,
    ) -> Result<(), GraphError> {
        if self.entity_mut(id)?.components.set_enabled(type_id, enabled) {
            Ok(())
        } else {
            Err(GraphError::NoSuchComponent {
                entity: id,
                type_name,
            })
        }
    }

    #[must_use]
    pub fn is_component_enabled<T: Any>(&self, id: EntityId) -> Option<bool> {
        self.entity(id)?.components.is_enabled::<T>()
    }

    // ========================================================================
    // Camera, lights, environment
    // ========================================================================

    /// Make a camera component the active one
    ///
    /// # Errors
    ///
    /// [`GraphError::NoSuchComponent`] if the entity has no [`Camera`].
    pub fn set_active_camera(&mut self, camera: ComponentRef<Camera>) -> Result<(), GraphError> {
        if self.get::<Camera>(camera.entity()).is_none() {
            return Err(GraphError::NoSuchComponent {
                entity: camera.entity(),
                type_name: Camera::TYPE_NAME,
            });
        }
        self.active_camera = Some(camera);
        Ok(())
    }

    pub fn clear_active_camera(&mut self) {
        self.active_camera = None;
    }

    #[must_use]
    pub fn active_camera_ref(&self) -> Option<ComponentRef<Camera>> {
        self.active_camera
    }

    /// View and projection of the active camera
    #[must_use]
    pub fn active_camera(&self) -> Option<CameraView> {
        let entity = self.active_camera?.entity();
        let camera = self.get::<Camera>(entity)?;
        let world = self.world_transform(entity)?;

        Some(CameraView {
            entity,
            view: world.rigid().inverse(),
            projection: camera.projection_matrix(),
            position: world.position(),
        })
    }

    #[must_use]
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn lights_mut(&mut self) -> &mut Vec<Light> {
        &mut self.lights
    }

    pub fn add_light(&mut self, light: Light) -> usize {
        self.lights.push(light);
        self.lights.len() - 1
    }

    #[must_use]
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.environment
    }

    // ========================================================================
    // Per-frame passes
    // ========================================================================

    /// Seconds of simulated time
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Run `on_update` on every enabled updatable component, then apply the
    /// commands they queued
    pub fn update(&mut self, dt: f32) {
        self.elapsed += dt;

        for id in self.walk() {
            let Ok(entity) = self.world.query_one_mut::<&mut Entity>(id.0) else {
                continue;
            };
            let mut changed = false;
            let Entity {
                name,
                transform,
                components,
                ..
            } = entity;

            for slot in components.iter_mut() {
                if !slot.is_active_for(Capabilities::UPDATE) {
                    continue;
                }
                let mut ctx = UpdateContext {
                    entity: id,
                    name: name.as_str(),
                    transform: &mut *transform,
                    transform_changed: &mut changed,
                    commands: &mut self.commands,
                    elapsed: self.elapsed,
                };
                slot.component.on_update(&mut ctx, dt);
            }

            if changed {
                self.invalidate_subtree(id);
            }
        }

        self.apply_commands();
    }

    /// Apply queued structural commands in order
    pub fn apply_commands(&mut self) {
        let pending: Vec<SceneCommand> = self.commands.drain().collect();
        for command in pending {
            let result = match command {
                SceneCommand::Destroy(id) => {
                    // Already gone with an ancestor
                    if !self.contains(id) {
                        continue;
                    }
                    self.destroy(id)
                }
                SceneCommand::SetParent {
                    child,
                    parent,
                    keep_world,
                } => {
                    if keep_world {
                        self.set_parent_keep_world(child, parent)
                    } else {
                        self.set_parent(child, parent)
                    }
                }
                SceneCommand::SetComponentEnabled {
                    entity,
                    type_id,
                    type_name,
                    enabled,
                } => self.set_enabled_by_type(entity, type_id, type_name, enabled),
            };
            if let Err(err) = result {
                log::warn!("deferred scene command failed: {err}");
            }
        }
    }

    /// Gather the camera, lights and every enabled renderable into a frame
    #[must_use]
    pub fn collect_frame(&self) -> RenderFrame {
        let mut frame = RenderFrame {
            camera: self.active_camera(),
            lights: self.lights.clone(),
            environment: self.environment.clone(),
            ..RenderFrame::default()
        };

        for id in self.walk() {
            let Some(entity) = self.entity(id) else {
                continue;
            };
            if !entity
                .components
                .iter()
                .any(|slot| slot.is_active_for(Capabilities::RENDER))
            {
                continue;
            }
            let Some(world) = self.world_transform(id) else {
                continue;
            };
            let ctx = RenderContext {
                entity: id,
                name: &entity.name,
                world,
                components: &entity.components,
            };
            for slot in entity.components.iter() {
                if slot.is_active_for(Capabilities::RENDER) {
                    slot.component().on_render(&ctx, &mut frame);
                }
            }
        }
        frame
    }

    /// Show an entity's transform and inspectable components to an editor
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NoSuchEntity`] if the entity is not alive.
    pub fn inspect(&mut self, id: EntityId, inspector: &mut dyn Inspector) -> Result<(), GraphError> {
        let mut local = *self.entity_mut(id)?.transform.local();
        let mut always = true;
        if inspector.begin_component("Transform", &mut always) {
            let before = local;
            let mut euler = local.euler_degrees();
            let euler_before = euler;
            inspector.vec3("Position", &mut local.position);
            inspector.vec3("Rotation", &mut euler);
            inspector.vec3("Scale", &mut local.scale);
            if euler != euler_before {
                local = Transform::from_euler_degrees(local.position, euler, local.scale);
            }
            if local != before {
                self.set_local_transform(id, local)?;
            }
        }

        let entity = self.entity_mut(id)?;
        for slot in entity.components.iter_mut() {
            if !slot.component().capabilities().contains(Capabilities::INSPECT) {
                continue;
            }
            let type_name = slot.type_name();
            if inspector.begin_component(type_name, &mut slot.enabled) {
                slot.component.on_inspect(inspector);
            }
        }
        Ok(())
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Save to `path` as pretty-printed JSON or RON, chosen by extension
    ///
    /// # Errors
    ///
    /// Returns an error for unknown extensions, serialization or I/O failures.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        self.save_with(path, true)
    }

    /// Save to `path`, optionally pretty-printed
    ///
    /// # Errors
    ///
    /// Returns an error for unknown extensions, serialization or I/O failures.
    pub fn save_with(&self, path: impl AsRef<Path>, pretty: bool) -> Result<(), SceneError> {
        let path = path.as_ref();
        let format = DocumentFormat::from_path(path)
            .ok_or_else(|| SceneError::UnsupportedFormat(path.to_path_buf()))?;
        let document = scene_to_document(self)?;

        let text = match (format, pretty) {
            (DocumentFormat::Json, true) => serde_json::to_string_pretty(&document)
                .map_err(|e| SceneError::Serialize(e.to_string()))?,
            (DocumentFormat::Json, false) => {
                serde_json::to_string(&document).map_err(|e| SceneError::Serialize(e.to_string()))?
            }
            (DocumentFormat::Ron, true) => {
                ron::ser::to_string_pretty(&document, ron::ser::PrettyConfig::default())
                    .map_err(|e| SceneError::Serialize(e.to_string()))?
            }
            (DocumentFormat::Ron, false) => {
                ron::to_string(&document).map_err(|e| SceneError::Serialize(e.to_string()))?
            }
        };

        fs::write(path, text).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!(
            "saved scene '{}' ({} entities) to {}",
            self.name,
            self.len(),
            path.display()
        );
        Ok(())
    }

    /// Load a scene saved with [`Scene::save`], resolving assets through
    /// `registry` and components through `factory`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a scene document.
    /// Missing assets and unknown components are not errors; they are listed
    /// in the returned [`LoadReport`].
    pub fn load(
        path: impl AsRef<Path>,
        registry: &ResourceRegistry,
        factory: &ComponentFactory,
    ) -> Result<(Self, LoadReport), SceneError> {
        let path = path.as_ref();
        let format = DocumentFormat::from_path(path)
            .ok_or_else(|| SceneError::UnsupportedFormat(path.to_path_buf()))?;
        let text = fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let document: SceneDocument = match format {
            DocumentFormat::Json => serde_json::from_str(&text).map_err(|e| e.to_string()),
            DocumentFormat::Ron => ron::from_str(&text).map_err(|e| e.to_string()),
        }
        .map_err(|message| SceneError::Deserialize {
            path: path.to_path_buf(),
            message,
        })?;

        let (scene, report) = document_to_scene(document, registry, factory);
        log::info!(
            "loaded scene '{}' from {} ({} entities, {} issues)",
            scene.name,
            path.display(),
            report.entities,
            report.issues.len()
        );
        Ok((scene, report))
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.name)
            .field("entities", &self.len())
            .field("roots", &self.roots)
            .field("lights", &self.lights.len())
            .field("active_camera", &self.active_camera)
            .finish_non_exhaustive()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};
    use std::sync::Arc;

    use parking_lot::Mutex;

    use crate::ecs::{ComponentError, ResolveContext};
    use serde_json::Value;

    fn approx(a: Mat4, b: Mat4) -> bool {
        a.abs_diff_eq(b, 1e-4)
    }

    /// Records lifecycle calls into a shared log
    struct Recorder {
        tag: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl crate::ecs::Component for Recorder {
        fn capabilities(&self) -> Capabilities {
            Capabilities::UPDATE
        }

        fn on_attach(&mut self, _ctx: &mut AttachContext<'_>) {
            self.log.lock().push(format!("attach {}", self.tag));
        }

        fn on_update(&mut self, ctx: &mut UpdateContext<'_>, _dt: f32) {
            self.log.lock().push(format!("update {}", ctx.entity_name()));
        }

        fn on_destroy(&mut self) {
            self.log.lock().push(format!("destroy {}", self.tag));
        }
    }

    impl ComponentType for Recorder {
        const TYPE_NAME: &'static str = "Recorder";

        fn load(_data: &Value, _ctx: &mut ResolveContext<'_>) -> Result<Self, ComponentError> {
            Err(ComponentError::Other("not loadable".into()))
        }
    }

    struct Second {
        log: Arc<Mutex<Vec<String>>>,
    }

    impl crate::ecs::Component for Second {
        fn capabilities(&self) -> Capabilities {
            Capabilities::empty()
        }

        fn on_destroy(&mut self) {
            self.log.lock().push("destroy second".into());
        }
    }

    impl ComponentType for Second {
        const TYPE_NAME: &'static str = "Second";

        fn load(_data: &Value, _ctx: &mut ResolveContext<'_>) -> Result<Self, ComponentError> {
            Err(ComponentError::Other("not loadable".into()))
        }
    }

    /// Moves its entity up by one unit per update
    struct Lift;

    impl crate::ecs::Component for Lift {
        fn capabilities(&self) -> Capabilities {
            Capabilities::UPDATE
        }

        fn on_update(&mut self, ctx: &mut UpdateContext<'_>, _dt: f32) {
            ctx.transform_mut().position.y += 1.0;
        }
    }

    impl ComponentType for Lift {
        const TYPE_NAME: &'static str = "Lift";

        fn load(_data: &Value, _ctx: &mut ResolveContext<'_>) -> Result<Self, ComponentError> {
            Ok(Self)
        }
    }

    /// Destroys its own entity on the first update
    struct SelfDestruct;

    impl crate::ecs::Component for SelfDestruct {
        fn capabilities(&self) -> Capabilities {
            Capabilities::UPDATE
        }

        fn on_update(&mut self, ctx: &mut UpdateContext<'_>, _dt: f32) {
            let me = ctx.entity();
            ctx.commands().destroy(me);
        }
    }

    impl ComponentType for SelfDestruct {
        const TYPE_NAME: &'static str = "SelfDestruct";

        fn load(_data: &Value, _ctx: &mut ResolveContext<'_>) -> Result<Self, ComponentError> {
            Ok(Self)
        }
    }

    #[test]
    fn test_world_composes_parent_chain() {
        let mut scene = Scene::new("test");
        let parent = scene.create_entity("parent");
        let child = scene.create_child(parent, "child").unwrap();

        scene
            .set_local_transform(parent, Transform::from_position(Vec3::new(1.0, 0.0, 0.0)))
            .unwrap();
        scene
            .set_local_transform(child, Transform::from_position(Vec3::new(0.0, 2.0, 0.0)))
            .unwrap();

        let world = scene.world_transform(child).unwrap();
        assert!(world.position().abs_diff_eq(Vec3::new(1.0, 2.0, 0.0), 1e-5));
    }

    #[test]
    fn test_ancestor_change_invalidates_descendants() {
        let mut scene = Scene::new("test");
        let a = scene.create_entity("a");
        let b = scene.create_child(a, "b").unwrap();
        let c = scene.create_child(b, "c").unwrap();
        scene
            .set_local_transform(c, Transform::from_position(Vec3::Z))
            .unwrap();

        // Prime every cache
        let before = scene.world_matrix(c).unwrap();
        assert!(approx(before, Mat4::from_translation(Vec3::Z)));

        let rotation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        scene
            .set_local_transform(a, Transform::from_position_rotation(Vec3::X, rotation))
            .unwrap();

        let expected = Mat4::from_rotation_translation(rotation, Vec3::X) * Mat4::from_translation(Vec3::Z);
        assert!(approx(scene.world_matrix(c).unwrap(), expected));
        assert!(approx(
            scene.world_matrix(b).unwrap(),
            Mat4::from_rotation_translation(rotation, Vec3::X)
        ));
    }

    #[test]
    fn test_set_parent_rejects_cycles() {
        let mut scene = Scene::new("test");
        let a = scene.create_entity("a");
        let b = scene.create_child(a, "b").unwrap();
        let c = scene.create_child(b, "c").unwrap();

        assert_eq!(
            scene.set_parent(a, Some(c)),
            Err(GraphError::Cycle { child: a, parent: c })
        );
        assert_eq!(
            scene.set_parent(a, Some(a)),
            Err(GraphError::Cycle { child: a, parent: a })
        );
        // Unchanged
        assert_eq!(scene.entity(a).unwrap().parent(), None);
        assert_eq!(scene.roots(), &[a]);
        assert_eq!(scene.entity(c).unwrap().parent(), Some(b));
    }

    #[test]
    fn test_set_parent_keep_world() {
        let mut scene = Scene::new("test");
        let anchor = scene.create_entity("anchor");
        scene
            .set_local_transform(anchor, Transform::from_position(Vec3::new(5.0, 0.0, 0.0)))
            .unwrap();
        let item = scene.create_entity("item");
        scene
            .set_local_transform(item, Transform::from_position(Vec3::new(1.0, 1.0, 0.0)))
            .unwrap();

        scene.set_parent_keep_world(item, Some(anchor)).unwrap();

        let local = scene.local_transform(item).unwrap();
        assert!(local.position.abs_diff_eq(Vec3::new(-4.0, 1.0, 0.0), 1e-4));
        let world = scene.world_transform(item).unwrap();
        assert!(world.position().abs_diff_eq(Vec3::new(1.0, 1.0, 0.0), 1e-4));

        scene.set_parent(item, None).unwrap();
        assert_eq!(scene.roots(), &[anchor, item]);
        assert!(scene.entity(anchor).unwrap().children().is_empty());
    }

    #[test]
    fn test_destroy_runs_hooks_depth_first() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut scene = Scene::new("test");
        let a = scene.create_entity("a");
        let b = scene.create_child(a, "b").unwrap();

        scene
            .attach(a, Recorder { tag: "a", log: log.clone() })
            .unwrap();
        scene.attach(a, Second { log: log.clone() }).unwrap();
        scene
            .attach(b, Recorder { tag: "b", log: log.clone() })
            .unwrap();
        log.lock().clear();

        scene.destroy(a).unwrap();

        assert_eq!(
            *log.lock(),
            vec!["destroy second", "destroy a", "destroy b"]
        );
        assert!(scene.is_empty());
        assert!(scene.roots().is_empty());
        assert_eq!(scene.find_by_name("b"), None);
        assert_eq!(scene.destroy(b), Err(GraphError::NoSuchEntity(b)));
    }

    #[test]
    fn test_duplicate_attach_is_rejected() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut scene = Scene::new("test");
        let e = scene.create_entity("e");

        scene
            .attach(e, Recorder { tag: "first", log: log.clone() })
            .unwrap();
        let err = scene
            .attach(e, Recorder { tag: "second", log: log.clone() })
            .unwrap_err();

        assert_eq!(
            err,
            GraphError::DuplicateComponent {
                entity: e,
                type_name: "Recorder"
            }
        );
        assert_eq!(scene.get::<Recorder>(e).map(|p| p.tag), Some("first"));
        assert_eq!(scene.entity(e).unwrap().components().len(), 1);
    }

    #[test]
    fn test_attach_or_replace_destroys_old() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut scene = Scene::new("test");
        let e = scene.create_entity("e");

        scene
            .attach(e, Recorder { tag: "old", log: log.clone() })
            .unwrap();
        scene
            .attach_or_replace(e, Recorder { tag: "new", log: log.clone() })
            .unwrap();

        assert_eq!(
            *log.lock(),
            vec!["attach old", "destroy old", "attach new"]
        );
        assert_eq!(scene.get::<Recorder>(e).map(|p| p.tag), Some("new"));
    }

    #[test]
    fn test_disabled_components_skip_update() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut scene = Scene::new("test");
        let e = scene.create_entity("e");
        scene
            .attach(e, Recorder { tag: "p", log: log.clone() })
            .unwrap();
        log.lock().clear();

        scene.set_component_enabled::<Recorder>(e, false).unwrap();
        scene.update(0.1);
        assert!(log.lock().is_empty());
        assert_eq!(scene.is_component_enabled::<Recorder>(e), Some(false));

        scene.set_component_enabled::<Recorder>(e, true).unwrap();
        scene.update(0.1);
        assert_eq!(*log.lock(), vec!["update e"]);

        assert!(matches!(
            scene.set_component_enabled::<Lift>(e, true),
            Err(GraphError::NoSuchComponent { .. })
        ));
    }

    #[test]
    fn test_update_transform_change_reaches_children() {
        let mut scene = Scene::new("test");
        let a = scene.create_entity("a");
        let b = scene.create_child(a, "b").unwrap();
        let _ = scene.world_matrix(b);

        scene.attach(a, Lift).unwrap();
        scene.update(0.016);

        let world = scene.world_transform(b).unwrap();
        assert!(world.position().abs_diff_eq(Vec3::Y, 1e-5));
    }

    #[test]
    fn test_deferred_destroy_applies_after_traversal() {
        let mut scene = Scene::new("test");
        let doomed = scene.create_entity("doomed");
        let child = scene.create_child(doomed, "child").unwrap();
        scene.attach(doomed, SelfDestruct).unwrap();
        scene.attach(child, SelfDestruct).unwrap();
        let survivor = scene.create_entity("survivor");

        scene.update(0.016);

        assert!(!scene.contains(doomed));
        assert!(!scene.contains(child));
        assert!(scene.contains(survivor));
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_find_by_name_prefers_oldest() {
        let mut scene = Scene::new("test");
        let first = scene.create_entity("Gem");
        let second = scene.create_entity("Gem");
        let other = scene.create_entity("Other");

        assert_eq!(scene.find_by_name("Gem"), Some(first));
        assert_eq!(scene.find_all_by_name("Gem"), vec![first, second]);

        scene.set_name(other, "Gem").unwrap();
        assert_eq!(scene.find_all_by_name("Gem"), vec![first, second, other]);
        assert_eq!(scene.find_by_name("Other"), None);

        let guid = scene.entity(second).unwrap().guid();
        assert_eq!(scene.find_by_guid(guid), Some(second));
    }

    #[test]
    fn test_remove_returns_component() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut scene = Scene::new("test");
        let e = scene.create_entity("e");
        scene
            .attach(e, Recorder { tag: "p", log: log.clone() })
            .unwrap();

        let removed = scene.remove::<Recorder>(e).unwrap();
        assert_eq!(removed.tag, "p");
        assert!(log.lock().contains(&"destroy p".to_string()));
        assert!(scene.get::<Recorder>(e).is_none());
        assert!(scene.remove::<Recorder>(e).is_none());
    }

    #[test]
    fn test_inspect_edits_transform() {
        use crate::ecs::{PropertyList, PropertyValue};

        let mut scene = Scene::new("test");
        let e = scene.create_entity("e");
        let mut inspector =
            PropertyList::new().with_edit("Transform", "Position", PropertyValue::Vec3(Vec3::new(0.0, 3.0, 0.0)));

        scene.inspect(e, &mut inspector).unwrap();

        assert!(scene
            .world_transform(e)
            .unwrap()
            .position()
            .abs_diff_eq(Vec3::new(0.0, 3.0, 0.0), 1e-5));
    }

    #[test]
    fn test_load_reports_each_missing_asset_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("level.json");
        std::fs::write(
            &path,
            r#"{ "objects": [{ "name": "box", "components": [{ "type": "RenderComponent",
                 "data": { "mesh": "0a0b0c0d-0000-4000-8000-000000000001" } }] }] }"#,
        )
        .unwrap();

        let registry = ResourceRegistry::new(dir.path());
        let (scene, report) = Scene::load(&path, &registry, &ComponentFactory::with_builtins()).unwrap();

        assert_eq!(report.entities, 1);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.missing_assets().count(), 1);
        let id = scene.find_by_name("box").unwrap();
        assert!(scene.get::<crate::components::RenderComponent>(id).is_some());
    }

    #[test]
    fn test_create_child_does_not_pass_through_roots() {
        let mut scene = Scene::new("test");
        let a = scene.create_entity("a");
        let b = scene.create_child(a, "b").unwrap();
        let c = scene.create_child(b, "c").unwrap();

        assert_eq!(scene.roots(), &[a]);
        assert_eq!(scene.entity(c).unwrap().parent(), Some(b));
        assert_eq!(scene.walk(), vec![a, b, c]);
        assert_eq!(scene.find_by_name("c"), Some(c));
        assert!(scene.world_transform(c).is_some());
    }
}
