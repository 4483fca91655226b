//! Shared handles to registry assets

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

use super::guid::Guid;

/// Strong, cloneable reference to an asset of type `T`.
///
/// The payload lives as long as any handle does, even after the registry
/// drops its own entry, so a handle never dangles. Equality and hashing go by
/// GUID.
pub struct AssetHandle<T> {
    guid: Guid,
    inner: Arc<T>,
    placeholder: bool,
}

impl<T> AssetHandle<T> {
    pub(crate) fn from_arc(guid: Guid, inner: Arc<T>) -> Self {
        Self {
            guid,
            inner,
            placeholder: false,
        }
    }

    /// Stand-in for an asset that could not be resolved
    pub(crate) fn placeholder(guid: Guid, inner: Arc<T>) -> Self {
        Self {
            guid,
            inner,
            placeholder: true,
        }
    }

    /// Registry GUID.
    ///
    /// A placeholder reports the GUID that was asked for, so saving again
    /// keeps pointing at the original asset.
    #[must_use]
    pub const fn guid(&self) -> Guid {
        self.guid
    }

    #[must_use]
    pub fn asset(&self) -> &T {
        &self.inner
    }

    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    /// Both handles share one payload
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Clone for AssetHandle<T> {
    fn clone(&self) -> Self {
        Self {
            guid: self.guid,
            inner: Arc::clone(&self.inner),
            placeholder: self.placeholder,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for AssetHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetHandle")
            .field("guid", &self.guid)
            .field("placeholder", &self.placeholder)
            .finish_non_exhaustive()
    }
}

impl<T> PartialEq for AssetHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.guid == other.guid
    }
}

impl<T> Eq for AssetHandle<T> {}

impl<T> Hash for AssetHandle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.guid.hash(state);
    }
}

impl<T> Deref for AssetHandle<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}
