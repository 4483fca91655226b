//! Dirty Flag Pattern for Cached World Matrices
//!
//! Each entity keeps its local transform next to a cached world matrix. The
//! cache is invalidated when the local transform changes and when any ancestor
//! changes; the scene walks the subtree to mark descendants.
//!
//! # Invariant
//!
//! If an entity's cache is dirty, the caches of all its descendants are dirty
//! too. That lets subtree invalidation stop at the first node that is already
//! dirty, and lets world queries stop walking up at the first clean ancestor.
//!
//! # Example
//!
//! ```ignore
//! let mut cached = CachedTransform::new(Transform::from_position(Vec3::X));
//! assert!(cached.cached_world().is_none());
//!
//! cached.store_world(parent_world * cached.local_matrix());
//! assert!(cached.cached_world().is_some());
//!
//! cached.set_position(Vec3::Y);  // invalidates
//! ```

use glam::{Mat4, Quat, Vec3};
use parking_lot::Mutex;

use super::transform::Transform;

/// A local transform with a lazily computed world matrix.
///
/// The cache sits behind a lock so world queries can refresh it through a
/// shared reference; `None` means dirty.
#[derive(Debug)]
pub struct CachedTransform {
    local: Transform,
    world: Mutex<Option<Mat4>>,
}

impl CachedTransform {
    #[must_use]
    pub fn new(local: Transform) -> Self {
        Self {
            local,
            world: Mutex::new(None),
        }
    }

    fn invalidate(&mut self) {
        *self.world.get_mut() = None;
    }

    // -------------------------------------------------------------------------
    // Local transform
    // -------------------------------------------------------------------------

    #[must_use]
    #[inline]
    pub fn local(&self) -> &Transform {
        &self.local
    }

    /// Mutable access to the local transform; always invalidates
    #[inline]
    pub fn local_mut(&mut self) -> &mut Transform {
        self.invalidate();
        &mut self.local
    }

    /// Replace the local transform, invalidating only on change
    #[inline]
    pub fn set_local(&mut self, local: Transform) {
        if self.local != local {
            self.local = local;
            self.invalidate();
        }
    }

    #[inline]
    pub fn set_position(&mut self, position: Vec3) {
        if self.local.position != position {
            self.local.position = position;
            self.invalidate();
        }
    }

    #[inline]
    pub fn set_rotation(&mut self, rotation: Quat) {
        if self.local.rotation != rotation {
            self.local.rotation = rotation;
            self.invalidate();
        }
    }

    #[inline]
    pub fn set_scale(&mut self, scale: Vec3) {
        if self.local.scale != scale {
            self.local.scale = scale;
            self.invalidate();
        }
    }

    #[must_use]
    #[inline]
    pub fn local_matrix(&self) -> Mat4 {
        self.local.matrix()
    }

    // -------------------------------------------------------------------------
    // Cache State
    // -------------------------------------------------------------------------

    /// The cached world matrix, or `None` if it must be recomputed
    #[must_use]
    #[inline]
    pub fn cached_world(&self) -> Option<Mat4> {
        *self.world.lock()
    }

    /// Store a freshly computed world matrix and mark the cache clean
    #[inline]
    pub fn store_world(&self, world: Mat4) {
        *self.world.lock() = Some(world);
    }

    #[must_use]
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.world.lock().is_none()
    }

    /// Mark dirty, returning whether the cache was clean before
    #[inline]
    pub fn mark_dirty(&self) -> bool {
        self.world.lock().take().is_some()
    }
}

impl Clone for CachedTransform {
    fn clone(&self) -> Self {
        Self {
            local: self.local,
            world: Mutex::new(self.cached_world()),
        }
    }
}

impl Default for CachedTransform {
    fn default() -> Self {
        Self::new(Transform::IDENTITY)
    }
}

impl From<Transform> for CachedTransform {
    fn from(local: Transform) -> Self {
        Self::new(local)
    }
}
