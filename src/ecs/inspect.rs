//! Editor introspection
//!
//! Components describe their editable fields to an [`Inspector`] from
//! [`Component::on_inspect`](super::Component::on_inspect). An editor UI
//! implements the trait to draw widgets; [`PropertyList`] records the fields
//! and can apply edits, which is handy for tooling and tests.

use glam::{Vec2, Vec3, Vec4};
use rustc_hash::FxHashMap;

use crate::assets::Guid;

/// Receives a component's editable fields
pub trait Inspector {
    /// Called before a component's fields; return `false` to skip it
    fn begin_component(&mut self, _type_name: &str, _enabled: &mut bool) -> bool {
        true
    }

    fn float(&mut self, label: &str, value: &mut f32);
    fn vec2(&mut self, label: &str, value: &mut Vec2);
    fn vec3(&mut self, label: &str, value: &mut Vec3);
    fn color(&mut self, label: &str, value: &mut Vec4);
    fn toggle(&mut self, label: &str, value: &mut bool);
    fn text(&mut self, label: &str, value: &mut String);

    /// Read-only asset reference
    fn asset(&mut self, label: &str, guid: Option<Guid>);
}

/// A recorded field value
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Color(Vec4),
    Bool(bool),
    Text(String),
    Asset(Option<Guid>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub component: String,
    pub label: String,
    pub value: PropertyValue,
}

/// Inspector that records every field and applies queued edits
#[derive(Debug, Default)]
pub struct PropertyList {
    current: String,
    properties: Vec<Property>,
    edits: FxHashMap<(String, String), PropertyValue>,
}

impl PropertyList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an edit applied when `component.label` is next visited
    #[must_use]
    pub fn with_edit(
        mut self,
        component: impl Into<String>,
        label: impl Into<String>,
        value: PropertyValue,
    ) -> Self {
        self.edits.insert((component.into(), label.into()), value);
        self
    }

    #[must_use]
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Look up a recorded value
    #[must_use]
    pub fn get(&self, component: &str, label: &str) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|p| p.component == component && p.label == label)
            .map(|p| &p.value)
    }

    fn edit(&mut self, label: &str) -> Option<PropertyValue> {
        self.edits.remove(&(self.current.clone(), label.to_owned()))
    }

    fn record(&mut self, label: &str, value: PropertyValue) {
        self.properties.push(Property {
            component: self.current.clone(),
            label: label.to_owned(),
            value,
        });
    }
}

macro_rules! edit_field {
    ($self:ident, $label:ident, $value:ident, $variant:ident) => {{
        if let Some(PropertyValue::$variant(v)) = $self.edit($label) {
            *$value = v;
        }
        $self.record($label, PropertyValue::$variant($value.clone()));
    }};
}

impl Inspector for PropertyList {
    fn begin_component(&mut self, type_name: &str, _enabled: &mut bool) -> bool {
        self.current = type_name.to_owned();
        true
    }

    fn float(&mut self, label: &str, value: &mut f32) {
        edit_field!(self, label, value, Float);
    }

    fn vec2(&mut self, label: &str, value: &mut Vec2) {
        edit_field!(self, label, value, Vec2);
    }

    fn vec3(&mut self, label: &str, value: &mut Vec3) {
        edit_field!(self, label, value, Vec3);
    }

    fn color(&mut self, label: &str, value: &mut Vec4) {
        edit_field!(self, label, value, Color);
    }

    fn toggle(&mut self, label: &str, value: &mut bool) {
        edit_field!(self, label, value, Bool);
    }

    fn text(&mut self, label: &str, value: &mut String) {
        edit_field!(self, label, value, Text);
    }

    fn asset(&mut self, label: &str, guid: Option<Guid>) {
        self.record(label, PropertyValue::Asset(guid));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_and_applies_edits() {
        let mut list = PropertyList::new().with_edit("Gem", "speed", PropertyValue::Float(4.0));
        let mut enabled = true;
        let mut speed = 1.0_f32;
        let mut title = String::from("gem");

        assert!(list.begin_component("Gem", &mut enabled));
        list.float("speed", &mut speed);
        list.text("title", &mut title);

        assert_eq!(speed, 4.0);
        assert_eq!(list.get("Gem", "speed"), Some(&PropertyValue::Float(4.0)));
        assert_eq!(
            list.get("Gem", "title"),
            Some(&PropertyValue::Text("gem".into()))
        );
        assert_eq!(list.properties().len(), 2);
    }

    #[test]
    fn test_edit_with_wrong_type_is_ignored() {
        let mut list = PropertyList::new().with_edit("Gem", "speed", PropertyValue::Bool(true));
        let mut enabled = true;
        let mut speed = 1.0_f32;
        list.begin_component("Gem", &mut enabled);
        list.float("speed", &mut speed);
        assert_eq!(speed, 1.0);
    }
}
