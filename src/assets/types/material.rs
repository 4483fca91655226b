//! Materials: a shader plus named, ordered parameters

use std::sync::Arc;

use glam::{Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use super::shader::Shader;
use super::texture::Texture;
use crate::assets::asset::{Asset, LoadContext};
use crate::assets::descriptor::AssetDescriptor;
use crate::assets::error::AssetResult;
use crate::assets::guid::Guid;
use crate::assets::handle::AssetHandle;
use crate::assets::kind::AssetKind;

/// A single material parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialValue {
    Float(f32),
    Int(i32),
    Bool(bool),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Texture(AssetHandle<Texture>),
}

impl MaterialValue {
    fn to_desc(&self) -> MaterialValueDesc {
        match self {
            Self::Float(v) => MaterialValueDesc::Float(*v),
            Self::Int(v) => MaterialValueDesc::Int(*v),
            Self::Bool(v) => MaterialValueDesc::Bool(*v),
            Self::Vec2(v) => MaterialValueDesc::Vec2(*v),
            Self::Vec3(v) => MaterialValueDesc::Vec3(*v),
            Self::Vec4(v) => MaterialValueDesc::Vec4(*v),
            Self::Texture(handle) => MaterialValueDesc::Texture(handle.guid()),
        }
    }
}

impl From<f32> for MaterialValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<i32> for MaterialValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for MaterialValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<Vec2> for MaterialValue {
    fn from(v: Vec2) -> Self {
        Self::Vec2(v)
    }
}

impl From<Vec3> for MaterialValue {
    fn from(v: Vec3) -> Self {
        Self::Vec3(v)
    }
}

impl From<Vec4> for MaterialValue {
    fn from(v: Vec4) -> Self {
        Self::Vec4(v)
    }
}

impl From<AssetHandle<Texture>> for MaterialValue {
    fn from(v: AssetHandle<Texture>) -> Self {
        Self::Texture(v)
    }
}

/// Serialized form of [`MaterialValue`]; textures are stored by GUID
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MaterialValueDesc {
    Float(f32),
    Int(i32),
    Bool(bool),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Texture(Guid),
}

/// Serialized material parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialParamDesc {
    pub name: String,
    pub value: MaterialValueDesc,
}

/// An immutable material
#[derive(Debug, Clone)]
pub struct Material {
    name: String,
    shader: AssetHandle<Shader>,
    params: Vec<(String, MaterialValue)>,
}

impl Material {
    /// Start building a material for `shader`
    pub fn builder(name: impl Into<String>, shader: AssetHandle<Shader>) -> MaterialBuilder {
        MaterialBuilder {
            material: Self {
                name: name.into(),
                shader,
                params: Vec::new(),
            },
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn shader(&self) -> &AssetHandle<Shader> {
        &self.shader
    }

    /// Look up a parameter by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MaterialValue> {
        self.params.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Parameters in insertion order
    pub fn params(&self) -> impl Iterator<Item = (&str, &MaterialValue)> {
        self.params.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Descriptor that rebuilds this material from the registry
    #[must_use]
    pub fn descriptor(&self) -> AssetDescriptor {
        let shader = self.shader.guid();
        AssetDescriptor::Material {
            name: self.name.clone(),
            shader: (!shader.is_nil()).then_some(shader),
            params: self
                .params
                .iter()
                .map(|(name, value)| MaterialParamDesc {
                    name: name.clone(),
                    value: value.to_desc(),
                })
                .collect(),
        }
    }
}

/// Builder for [`Material`]
#[derive(Debug)]
pub struct MaterialBuilder {
    material: Material,
}

impl MaterialBuilder {
    /// Set a parameter, replacing any earlier value with the same name
    #[must_use]
    pub fn set(mut self, name: impl Into<String>, value: impl Into<MaterialValue>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.material.params.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.material.params.push((name, value)),
        }
        self
    }

    #[must_use]
    pub fn build(self) -> Material {
        self.material
    }
}

impl Asset for Material {
    const TYPE_NAME: &'static str = "material";

    fn load(descriptor: &AssetDescriptor, ctx: &LoadContext<'_>) -> AssetResult<Self> {
        let AssetDescriptor::Material {
            name,
            shader,
            params,
        } = descriptor
        else {
            return Err(Self::wrong_descriptor(descriptor));
        };

        let shader = match shader {
            Some(guid) => ctx.resolve::<Shader>(*guid, AssetKind::Shader),
            None => AssetHandle::placeholder(Guid::NIL, Arc::new(Shader::default())),
        };

        let mut builder = Self::builder(name.clone(), shader);
        for param in params {
            let value: MaterialValue = match param.value {
                MaterialValueDesc::Float(v) => v.into(),
                MaterialValueDesc::Int(v) => v.into(),
                MaterialValueDesc::Bool(v) => v.into(),
                MaterialValueDesc::Vec2(v) => v.into(),
                MaterialValueDesc::Vec3(v) => v.into(),
                MaterialValueDesc::Vec4(v) => v.into(),
                MaterialValueDesc::Texture(guid) => {
                    ctx.resolve::<Texture>(guid, AssetKind::Texture2D).into()
                }
            };
            builder = builder.set(param.name.clone(), value);
        }
        Ok(builder.build())
    }

    fn placeholder(_kind: AssetKind) -> Self {
        Self::builder(
            "placeholder",
            AssetHandle::placeholder(Guid::NIL, Arc::new(Shader::default())),
        )
        .set("u_Material.Shininess", 0.0_f32)
        .build()
    }
}
