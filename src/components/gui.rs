//! Screen-space GUI components
//!
//! [`GuiPanel`] and [`GuiText`] need a [`RectTransform`] on the same entity;
//! without one they disable themselves when attached.

use glam::{Vec2, Vec4};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::assets::{AssetHandle, AssetKind, Font, Guid, Texture};
use crate::core::frame::{GuiItem, RenderFrame};
use crate::ecs::{
    AttachContext, Capabilities, Component, ComponentError, ComponentType, Inspector,
    RenderContext, ResolveContext,
};

/// Pixel rectangle on screen, top-left origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RectTransform {
    pub min: Vec2,
    pub max: Vec2,
}

impl Default for RectTransform {
    fn default() -> Self {
        Self {
            min: Vec2::ZERO,
            max: Vec2::splat(100.0),
        }
    }
}

impl RectTransform {
    #[must_use]
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// A `size` rectangle centred on `center`
    #[must_use]
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    #[must_use]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Move the rectangle, keeping its size
    pub fn set_center(&mut self, center: Vec2) {
        *self = Self::centered(center, self.size());
    }

    /// Resize around the current centre
    pub fn set_size(&mut self, size: Vec2) {
        *self = Self::centered(self.center(), size);
    }
}

impl Component for RectTransform {
    fn capabilities(&self) -> Capabilities {
        Capabilities::INSPECT | Capabilities::SERIALIZE
    }

    fn on_inspect(&mut self, inspector: &mut dyn Inspector) {
        inspector.vec2("Min", &mut self.min);
        inspector.vec2("Max", &mut self.max);
    }

    fn save(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

impl ComponentType for RectTransform {
    const TYPE_NAME: &'static str = "RectTransform";

    fn load(data: &Value, ctx: &mut ResolveContext<'_>) -> Result<Self, ComponentError> {
        ctx.parse(data)
    }
}

fn require_rect(ctx: &mut AttachContext<'_>, what: &str) {
    if !ctx.has::<RectTransform>() {
        log::warn!(
            "no RectTransform on '{}', disabling {what}",
            ctx.entity_name()
        );
        ctx.set_enabled(false);
    }
}

// ============================================================================
// Panel
// ============================================================================

/// A coloured, optionally textured rectangle
#[derive(Debug, Clone)]
pub struct GuiPanel {
    pub color: Vec4,
    pub texture: Option<AssetHandle<Texture>>,
    pub border_radius: f32,
}

impl Default for GuiPanel {
    fn default() -> Self {
        Self {
            color: Vec4::ONE,
            texture: None,
            border_radius: 0.0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PanelData {
    #[serde(default = "white")]
    color: Vec4,
    #[serde(default)]
    texture: Option<Guid>,
    #[serde(default)]
    border_radius: f32,
}

fn white() -> Vec4 {
    Vec4::ONE
}

impl GuiPanel {
    #[must_use]
    pub fn new(color: Vec4) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_texture(mut self, texture: AssetHandle<Texture>) -> Self {
        self.texture = Some(texture);
        self
    }
}

impl Component for GuiPanel {
    fn capabilities(&self) -> Capabilities {
        Capabilities::RENDER | Capabilities::INSPECT | Capabilities::SERIALIZE
    }

    fn on_attach(&mut self, ctx: &mut AttachContext<'_>) {
        require_rect(ctx, "GuiPanel");
    }

    fn on_render(&self, ctx: &RenderContext<'_>, frame: &mut RenderFrame) {
        let Some(rect) = ctx.sibling::<RectTransform>() else {
            return;
        };
        frame.gui.push(GuiItem::Panel {
            entity: ctx.entity(),
            min: rect.min,
            max: rect.max,
            color: self.color,
            texture: self.texture.clone(),
            border_radius: self.border_radius,
        });
    }

    fn on_inspect(&mut self, inspector: &mut dyn Inspector) {
        inspector.color("Color", &mut self.color);
        inspector.float("Border Radius", &mut self.border_radius);
        inspector.asset("Texture", self.texture.as_ref().map(AssetHandle::guid));
    }

    fn save(&self) -> serde_json::Result<Value> {
        serde_json::to_value(PanelData {
            color: self.color,
            texture: self.texture.as_ref().map(AssetHandle::guid),
            border_radius: self.border_radius,
        })
    }
}

impl ComponentType for GuiPanel {
    const TYPE_NAME: &'static str = "GuiPanel";

    fn load(data: &Value, ctx: &mut ResolveContext<'_>) -> Result<Self, ComponentError> {
        let data: PanelData = ctx.parse(data)?;
        Ok(Self {
            color: data.color,
            texture: ctx.optional_asset(data.texture, AssetKind::Texture2D)?,
            border_radius: data.border_radius,
        })
    }
}

// ============================================================================
// Text
// ============================================================================

/// Text centred in its rectangle
#[derive(Debug, Clone)]
pub struct GuiText {
    pub text: String,
    pub color: Vec4,
    pub scale: f32,
    pub font: Option<AssetHandle<Font>>,
}

impl Default for GuiText {
    fn default() -> Self {
        Self {
            text: String::new(),
            color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            scale: 1.0,
            font: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
struct TextData {
    text: String,
    color: Vec4,
    scale: f32,
    font: Option<Guid>,
}

impl Default for TextData {
    fn default() -> Self {
        let text = GuiText::default();
        Self {
            text: text.text,
            color: text.color,
            scale: text.scale,
            font: None,
        }
    }
}

impl GuiText {
    #[must_use]
    pub fn new(text: impl Into<String>, font: AssetHandle<Font>) -> Self {
        Self {
            text: text.into(),
            font: Some(font),
            ..Self::default()
        }
    }
}

impl Component for GuiText {
    fn capabilities(&self) -> Capabilities {
        Capabilities::RENDER | Capabilities::INSPECT | Capabilities::SERIALIZE
    }

    fn on_attach(&mut self, ctx: &mut AttachContext<'_>) {
        require_rect(ctx, "GuiText");
    }

    fn on_render(&self, ctx: &RenderContext<'_>, frame: &mut RenderFrame) {
        if self.text.is_empty() {
            return;
        }
        let Some(rect) = ctx.sibling::<RectTransform>() else {
            return;
        };
        frame.gui.push(GuiItem::Text {
            entity: ctx.entity(),
            position: rect.center(),
            text: self.text.clone(),
            color: self.color,
            scale: self.scale,
            font: self.font.clone(),
        });
    }

    fn on_inspect(&mut self, inspector: &mut dyn Inspector) {
        inspector.text("Text", &mut self.text);
        inspector.color("Color", &mut self.color);
        inspector.float("Scale", &mut self.scale);
        inspector.asset("Font", self.font.as_ref().map(AssetHandle::guid));
    }

    fn save(&self) -> serde_json::Result<Value> {
        serde_json::to_value(TextData {
            text: self.text.clone(),
            color: self.color,
            scale: self.scale,
            font: self.font.as_ref().map(AssetHandle::guid),
        })
    }
}

impl ComponentType for GuiText {
    const TYPE_NAME: &'static str = "GuiText";

    fn load(data: &Value, ctx: &mut ResolveContext<'_>) -> Result<Self, ComponentError> {
        let data: TextData = ctx.parse(data)?;
        Ok(Self {
            text: data.text,
            color: data.color,
            scale: data.scale,
            font: ctx.optional_asset(data.font, AssetKind::Font)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Scene;

    #[test]
    fn test_panel_without_rect_disables_itself() {
        let mut scene = Scene::new("gui");
        let lonely = scene.create_entity("lonely");
        scene.attach(lonely, GuiPanel::default()).unwrap();
        assert_eq!(scene.is_component_enabled::<GuiPanel>(lonely), Some(false));

        let button = scene.create_entity("button");
        scene
            .attach(button, RectTransform::centered(Vec2::new(960.0, 300.0), Vec2::new(300.0, 150.0)))
            .unwrap();
        scene.attach(button, GuiPanel::new(Vec4::new(1.0, 1.0, 1.0, 0.6))).unwrap();
        assert_eq!(scene.is_component_enabled::<GuiPanel>(button), Some(true));

        let frame = scene.collect_frame();
        assert_eq!(frame.gui.len(), 1);
        match &frame.gui[0] {
            GuiItem::Panel { min, max, color, .. } => {
                assert_eq!(*min, Vec2::new(810.0, 225.0));
                assert_eq!(*max, Vec2::new(1110.0, 375.0));
                assert_eq!(color.w, 0.6);
            }
            other => panic!("unexpected item {other:?}"),
        }
    }

    #[test]
    fn test_empty_text_is_not_drawn() {
        let mut scene = Scene::new("gui");
        let label = scene.create_entity("label");
        scene.attach(label, RectTransform::default()).unwrap();
        scene.attach(label, GuiText::default()).unwrap();
        assert!(scene.collect_frame().gui.is_empty());

        if let Some(text) = scene.get_mut::<GuiText>(label) {
            text.text = "Paused".into();
        }
        let frame = scene.collect_frame();
        assert!(matches!(
            &frame.gui[0],
            GuiItem::Text { text, position, .. } if text == "Paused" && *position == Vec2::splat(50.0)
        ));
    }

    #[test]
    fn test_rect_resize_keeps_center() {
        let mut rect = RectTransform::new(Vec2::ZERO, Vec2::new(10.0, 20.0));
        rect.set_size(Vec2::new(4.0, 4.0));
        assert_eq!(rect.center(), Vec2::new(5.0, 10.0));
        assert_eq!(rect.min, Vec2::new(3.0, 8.0));
    }
}
