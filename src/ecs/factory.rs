//! Tag-keyed construction of components from saved data

use std::any::TypeId;

use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use super::component::{Component, ComponentSlot, ComponentType};
use crate::assets::{Asset, AssetHandle, AssetKind, Guid, ResourceRegistry};
use crate::core::report::LoadIssue;

/// Why a component could not be rebuilt from its record
#[derive(Debug, Error)]
pub enum ComponentError {
    #[error("invalid component data: {0}")]
    Invalid(#[from] serde_json::Error),

    #[error("referenced {kind} {guid} is not loaded")]
    MissingAsset { guid: Guid, kind: AssetKind },

    #[error("{0}")]
    Other(String),
}

/// Resolves asset references while components are loaded.
///
/// Missing assets are recorded as [`LoadIssue::MissingAsset`]; if the
/// registry substitutes placeholders the load continues with one.
pub struct ResolveContext<'a> {
    registry: &'a ResourceRegistry,
    owner: &'a str,
    component: &'a str,
    issues: &'a mut Vec<LoadIssue>,
}

impl<'a> ResolveContext<'a> {
    pub(crate) fn new(
        registry: &'a ResourceRegistry,
        owner: &'a str,
        component: &'a str,
        issues: &'a mut Vec<LoadIssue>,
    ) -> Self {
        Self {
            registry,
            owner,
            component,
            issues,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &ResourceRegistry {
        self.registry
    }

    /// Deserialize component data; `null` counts as an empty object so
    /// `#[serde(default)]` fields fill in
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::Invalid`] for malformed data.
    pub fn parse<D: DeserializeOwned>(&self, data: &Value) -> Result<D, ComponentError> {
        let data = match data {
            Value::Null => Value::Object(serde_json::Map::new()),
            other => other.clone(),
        };
        Ok(serde_json::from_value(data)?)
    }

    /// Resolve a referenced asset
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::MissingAsset`] when the asset is absent and
    /// placeholder substitution is turned off.
    pub fn asset<T: Asset>(&mut self, guid: Guid, kind: AssetKind) -> Result<AssetHandle<T>, ComponentError> {
        match self.registry.get_typed::<T>(guid) {
            Ok(handle) => Ok(handle),
            Err(err) => {
                log::warn!(
                    "{} on '{}' references {kind} {guid}: {err}",
                    self.component,
                    self.owner
                );
                self.issues.push(LoadIssue::MissingAsset {
                    owner: self.owner.to_owned(),
                    component: self.component.to_owned(),
                    guid,
                    kind,
                });
                if self.registry.substitutes_missing() {
                    Ok(self.registry.placeholder::<T>(kind, guid))
                } else {
                    Err(ComponentError::MissingAsset { guid, kind })
                }
            }
        }
    }

    /// Like [`ResolveContext::asset`] for optional references
    ///
    /// # Errors
    ///
    /// See [`ResolveContext::asset`].
    pub fn optional_asset<T: Asset>(
        &mut self,
        guid: Option<Guid>,
        kind: AssetKind,
    ) -> Result<Option<AssetHandle<T>>, ComponentError> {
        guid.filter(|g| !g.is_nil())
            .map(|g| self.asset(g, kind))
            .transpose()
    }
}

type LoadFn = fn(&Value, &mut ResolveContext<'_>) -> Result<Box<dyn Component>, ComponentError>;

#[derive(Clone, Copy)]
struct Registration {
    type_id: TypeId,
    type_name: &'static str,
    load: LoadFn,
}

fn load_boxed<T: ComponentType>(
    data: &Value,
    ctx: &mut ResolveContext<'_>,
) -> Result<Box<dyn Component>, ComponentError> {
    Ok(Box::new(T::load(data, ctx)?))
}

/// Maps `type` tags in scene documents to component loaders
#[derive(Default)]
pub struct ComponentFactory {
    by_tag: FxHashMap<&'static str, Registration>,
}

impl ComponentFactory {
    /// An empty factory
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A factory that knows every built-in component
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut factory = Self::new();
        crate::components::register_builtins(&mut factory);
        factory
    }

    /// Register `T` under its [`ComponentType::TYPE_NAME`]; re-registering replaces
    pub fn register<T: ComponentType>(&mut self) -> &mut Self {
        let previous = self.by_tag.insert(
            T::TYPE_NAME,
            Registration {
                type_id: TypeId::of::<T>(),
                type_name: T::TYPE_NAME,
                load: load_boxed::<T>,
            },
        );
        if previous.is_some() {
            log::warn!("component type '{}' registered twice", T::TYPE_NAME);
        }
        self
    }

    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.by_tag.contains_key(tag)
    }

    /// Registered tags, sorted
    #[must_use]
    pub fn tags(&self) -> Vec<&'static str> {
        let mut tags: Vec<_> = self.by_tag.keys().copied().collect();
        tags.sort_unstable();
        tags
    }

    /// Build a slot for `tag`, or `None` if the tag is unknown
    pub(crate) fn create(
        &self,
        tag: &str,
        data: &Value,
        enabled: bool,
        ctx: &mut ResolveContext<'_>,
    ) -> Option<Result<ComponentSlot, ComponentError>> {
        let registration = self.by_tag.get(tag)?;
        Some((registration.load)(data, ctx).map(|component| {
            ComponentSlot::from_boxed(
                registration.type_id,
                registration.type_name,
                component,
                enabled,
            )
        }))
    }
}

impl std::fmt::Debug for ComponentFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentFactory")
            .field("tags", &self.tags())
            .finish()
    }
}
