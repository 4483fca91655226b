//! Errors raised by scene-graph and component operations
//!
//! A failed operation always leaves the graph exactly as it was.

use thiserror::Error;

use super::entity::EntityId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// Re-parenting would make an entity its own ancestor
    #[error("cannot parent {child} under {parent}: {parent} is {child} or one of its descendants")]
    Cycle { child: EntityId, parent: EntityId },

    /// The entity already has a component of this type
    #[error("entity {entity} already has a {type_name} component")]
    DuplicateComponent {
        entity: EntityId,
        type_name: &'static str,
    },

    /// The id does not refer to a live entity
    #[error("entity {0} does not exist")]
    NoSuchEntity(EntityId),

    /// The entity has no component of this type
    #[error("entity {entity} has no {type_name} component")]
    NoSuchComponent {
        entity: EntityId,
        type_name: &'static str,
    },
}
