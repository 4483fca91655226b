//! Deferred Scene Commands
//!
//! Update callbacks run while the scene is being traversed, so they must not
//! change its structure directly. Instead they push commands here; the scene
//! applies them in order once the traversal is finished.
//!
//! # Example
//!
//! ```ignore
//! fn on_update(&mut self, ctx: &mut UpdateContext<'_>, _dt: f32) {
//!     if self.hit {
//!         let me = ctx.entity();
//!         ctx.commands().destroy(me);
//!     }
//! }
//! ```

use std::any::{Any, TypeId};
use std::collections::VecDeque;

use super::entity::EntityId;
use super::component::ComponentType;

/// A structural change requested during traversal
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum SceneCommand {
    /// Destroy an entity and its subtree
    Destroy(EntityId),

    /// Move an entity under a new parent (or to the root)
    SetParent {
        child: EntityId,
        parent: Option<EntityId>,
        /// Preserve the world transform instead of the local one
        keep_world: bool,
    },

    /// Enable or disable one component of an entity
    SetComponentEnabled {
        entity: EntityId,
        type_id: TypeId,
        type_name: &'static str,
        enabled: bool,
    },
}

/// FIFO of pending [`SceneCommand`]s
#[derive(Debug)]
pub struct CommandQueue {
    queue: VecDeque<SceneCommand>,
}

impl CommandQueue {
    /// Default initial capacity.
    const DEFAULT_CAPACITY: usize = 16;

    #[must_use]
    pub fn new() -> Self {
        Self {
            queue: VecDeque::with_capacity(Self::DEFAULT_CAPACITY),
        }
    }

    #[inline]
    pub fn push(&mut self, command: SceneCommand) {
        self.queue.push_back(command);
    }

    pub fn destroy(&mut self, entity: EntityId) {
        self.push(SceneCommand::Destroy(entity));
    }

    pub fn set_parent(&mut self, child: EntityId, parent: Option<EntityId>) {
        self.push(SceneCommand::SetParent {
            child,
            parent,
            keep_world: false,
        });
    }

    pub fn set_parent_keep_world(&mut self, child: EntityId, parent: Option<EntityId>) {
        self.push(SceneCommand::SetParent {
            child,
            parent,
            keep_world: true,
        });
    }

    pub fn set_enabled<T: ComponentType + Any>(&mut self, entity: EntityId, enabled: bool) {
        self.push(SceneCommand::SetComponentEnabled {
            entity,
            type_id: TypeId::of::<T>(),
            type_name: T::TYPE_NAME,
            enabled,
        });
    }

    /// Take every queued command, oldest first
    pub fn drain(&mut self) -> impl Iterator<Item = SceneCommand> + '_ {
        self.queue.drain(..)
    }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}
