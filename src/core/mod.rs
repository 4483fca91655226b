//! Core scene module
//!
//! Contains the Scene, its document form, per-frame output and configuration

pub mod config;
pub mod document;
pub mod frame;
pub mod report;
mod scene;

pub use config::{Config, ConfigError, DocumentFormat, SceneError};
pub use document::{
    ComponentRecord, EntityRecord, EnvironmentRecord, SCENE_VERSION, SceneDocument, document_to_scene,
    scene_to_document,
};
pub use frame::{CameraView, DrawItem, Environment, GuiItem, Light, LutSlot, MorphDraw, RenderFrame};
pub use report::{LoadIssue, LoadReport};
pub use scene::Scene;
