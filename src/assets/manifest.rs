//! On-disk manifest of registered assets
//!
//! ```json
//! {
//!   "version": 1,
//!   "assets": {
//!     "6f1c...": { "name": "box.png", "descriptor": { "kind": "texture_2d", "path": "textures/box.png" } }
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::descriptor::AssetDescriptor;
use super::error::AssetError;
use super::guid::Guid;

pub const MANIFEST_VERSION: u32 = 1;

fn default_version() -> u32 {
    MANIFEST_VERSION
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Manifest {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub assets: BTreeMap<Guid, ManifestEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ManifestEntry {
    #[serde(default)]
    pub name: String,
    pub descriptor: AssetDescriptor,
}

/// An asset whose dependency could not be found while loading a manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingReference {
    /// The asset that holds the reference
    pub asset: Guid,
    /// The GUID it points at
    pub missing: Guid,
}

/// Outcome of [`ResourceRegistry::load_manifest`](super::ResourceRegistry::load_manifest)
#[derive(Debug, Default)]
pub struct ManifestReport {
    pub loaded: usize,
    /// Entries already present in the registry
    pub skipped: usize,
    pub failed: Vec<(Guid, AssetError)>,
    /// Dependencies replaced by placeholders
    pub missing_references: Vec<MissingReference>,
}

impl ManifestReport {
    /// No failures and no unresolved references
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.missing_references.is_empty()
    }
}
