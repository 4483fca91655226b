//! Parent/child bookkeeping and world-space transforms

use glam::{Mat4, Quat, Vec3};
use smallvec::SmallVec;

use super::entity::EntityId;

/// Ordered list of an entity's children
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Children(SmallVec<[EntityId; 8]>);

impl Children {
    #[must_use]
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    /// Add a child (no duplicates)
    pub fn add(&mut self, child: EntityId) {
        if !self.0.contains(&child) {
            self.0.push(child);
        }
    }

    /// Remove a child, keeping the order of the others
    pub fn remove(&mut self, child: EntityId) -> bool {
        if let Some(pos) = self.0.iter().position(|&e| e == child) {
            self.0.remove(pos);
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn contains(&self, child: EntityId) -> bool {
        self.0.contains(&child)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.0.iter().copied()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[EntityId] {
        &self.0
    }
}

/// World-space transform of an entity, composed from its ancestor chain
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GlobalTransform {
    pub matrix: Mat4,
}

impl GlobalTransform {
    #[must_use]
    pub const fn new(matrix: Mat4) -> Self {
        Self { matrix }
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.matrix.w_axis.truncate()
    }

    /// Scale, rotation and translation; shear is lost
    #[must_use]
    pub fn decompose(&self) -> (Vec3, Quat, Vec3) {
        self.matrix.to_scale_rotation_translation()
    }

    /// The same placement with scale removed, as cameras and physics want it
    #[must_use]
    pub fn rigid(&self) -> Mat4 {
        let (_, rotation, translation) = self.decompose();
        Mat4::from_rotation_translation(rotation, translation)
    }

    #[must_use]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.matrix.transform_point3(point)
    }
}

impl From<Mat4> for GlobalTransform {
    fn from(matrix: Mat4) -> Self {
        Self::new(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_children_add_remove() {
        let mut world = hecs::World::new();
        let entity1 = EntityId::from(world.spawn(()));
        let entity2 = EntityId::from(world.spawn(()));
        let entity3 = EntityId::from(world.spawn(()));

        let mut children = Children::new();
        children.add(entity1);
        children.add(entity2);
        children.add(entity3);
        assert_eq!(children.len(), 3);

        // No duplicates
        children.add(entity1);
        assert_eq!(children.len(), 3);

        assert!(children.remove(entity2));
        assert_eq!(children.as_slice(), &[entity1, entity3]);
        assert!(!children.remove(entity2));
    }

    #[test]
    fn test_rigid_drops_scale() {
        let rotation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let world = GlobalTransform::new(Mat4::from_scale_rotation_translation(
            Vec3::splat(3.0),
            rotation,
            Vec3::new(1.0, 2.0, 3.0),
        ));

        assert_eq!(world.position(), Vec3::new(1.0, 2.0, 3.0));
        let (scale, _, _) = world.decompose();
        assert!(scale.abs_diff_eq(Vec3::splat(3.0), 1e-5));

        let rigid = GlobalTransform::new(world.rigid());
        assert!(rigid.decompose().0.abs_diff_eq(Vec3::ONE, 1e-5));
        assert!(
            rigid
                .transform_point(Vec3::X)
                .abs_diff_eq(Vec3::new(1.0, 2.0, 2.0), 1e-5)
        );
    }
}
