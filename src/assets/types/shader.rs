//! Shader programs as per-stage source text
//!
//! Compilation belongs to the renderer; the registry only keeps the sources.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::assets::asset::{Asset, LoadContext};
use crate::assets::descriptor::AssetDescriptor;
use crate::assets::error::AssetResult;
use crate::assets::kind::AssetKind;

/// Pipeline stage a source file belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Geometry,
    TessControl,
    TessEval,
    Compute,
}

impl ShaderStage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
            Self::Geometry => "geometry",
            Self::TessControl => "tess_control",
            Self::TessEval => "tess_eval",
            Self::Compute => "compute",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shader sources keyed by stage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shader {
    pub stages: BTreeMap<ShaderStage, String>,
}

impl Shader {
    /// Source for one stage, if present
    #[must_use]
    pub fn source(&self, stage: ShaderStage) -> Option<&str> {
        self.stages.get(&stage).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl Asset for Shader {
    const TYPE_NAME: &'static str = "shader";

    fn load(descriptor: &AssetDescriptor, ctx: &LoadContext<'_>) -> AssetResult<Self> {
        let AssetDescriptor::Shader { stages } = descriptor else {
            return Err(Self::wrong_descriptor(descriptor));
        };
        let stages = stages
            .iter()
            .map(|(&stage, path)| Ok((stage, ctx.read_to_string(path)?)))
            .collect::<AssetResult<_>>()?;
        Ok(Self { stages })
    }

    fn placeholder(_kind: AssetKind) -> Self {
        Self::default()
    }
}
