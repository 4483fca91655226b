//! Recoverable problems collected while a scene loads

use std::fmt;

use crate::assets::{AssetKind, Guid};

/// One recoverable problem found while rebuilding a scene
#[derive(Debug, Clone, PartialEq)]
pub enum LoadIssue {
    /// A component referenced an asset the registry does not hold
    MissingAsset {
        owner: String,
        component: String,
        guid: Guid,
        kind: AssetKind,
    },
    /// No factory entry for the component tag; the component was skipped
    UnknownComponent { entity: String, type_name: String },
    /// The component data could not be parsed; the component was skipped
    InvalidComponent {
        entity: String,
        type_name: String,
        message: String,
    },
    /// A second component of the same type on one entity; the later one was skipped
    DuplicateComponent { entity: String, type_name: String },
    /// An entity GUID was nil or already taken; a fresh one was assigned
    DuplicateGuid { entity: String, guid: Guid },
    /// `main_camera` named no entity with a camera
    MissingCamera(Guid),
}

impl fmt::Display for LoadIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAsset {
                owner,
                component,
                guid,
                kind,
            } => write!(f, "{component} on '{owner}' references missing {kind} {guid}"),
            Self::UnknownComponent { entity, type_name } => {
                write!(f, "unknown component type '{type_name}' on '{entity}'")
            }
            Self::InvalidComponent {
                entity,
                type_name,
                message,
            } => write!(f, "invalid {type_name} on '{entity}': {message}"),
            Self::DuplicateComponent { entity, type_name } => {
                write!(f, "'{entity}' lists {type_name} more than once")
            }
            Self::DuplicateGuid { entity, guid } => {
                write!(f, "'{entity}' had unusable GUID {guid}, assigned a new one")
            }
            Self::MissingCamera(guid) => write!(f, "main camera {guid} not found"),
        }
    }
}

/// Outcome of a scene load
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub issues: Vec<LoadIssue>,
    /// Number of entities created
    pub entities: usize,
}

impl LoadReport {
    /// No issues were recorded
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Issues about missing assets
    pub fn missing_assets(&self) -> impl Iterator<Item = &LoadIssue> {
        self.issues
            .iter()
            .filter(|issue| matches!(issue, LoadIssue::MissingAsset { .. }))
    }
}
