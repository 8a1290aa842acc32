//! Shape records stored in a scene

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::position::Slot;

/// Identifier of a shape within one scene.
///
/// A `ShapeId` held in `relative_to` is a weak reference: it is checked
/// against the scene on every lookup and may dangle after a removal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeId(pub String);

impl ShapeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ShapeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ShapeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Structural role of a shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Grid container hosting components
    Layer,
    /// 3D component placed on a layer
    #[serde(alias = "3d", alias = "3D")]
    Component,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeKind::Layer => f.write_str("layer"),
            ShapeKind::Component => f.write_str("component"),
        }
    }
}

/// Where the shape template came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Component,
    Primitive,
}

/// A 2D overlay attached to a shape; never occupies a grid cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decorator {
    pub decorator_name: String,
    pub attached_to_slot: Slot,
}

impl Decorator {
    /// A decorator attached to the top face
    pub fn on_top(name: impl Into<String>) -> Self {
        Self {
            decorator_name: name.into(),
            attached_to_slot: Slot::Top,
        }
    }
}

/// Display name, label placement and free-form metadata
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_position: Option<Slot>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// One node of the diagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    pub id: ShapeId,
    pub shape_template: String,
    pub kind: ShapeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Slot>,
    #[serde(default, rename = "relativeToId")]
    pub relative_to: Option<ShapeId>,
    #[serde(default)]
    pub attached_decorators: Vec<Decorator>,
    #[serde(default)]
    pub metadata: DisplayMetadata,
    #[serde(default)]
    pub source: SourceKind,
}

impl Shape {
    pub fn is_layer(&self) -> bool {
        self.kind == ShapeKind::Layer
    }

    pub fn display_name(&self) -> Option<&str> {
        self.metadata.name.as_deref()
    }

    /// Whether a decorator with this name is attached
    pub fn has_decorator(&self, name: &str) -> bool {
        self.attached_decorators
            .iter()
            .any(|d| d.decorator_name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_shape_json_uses_camel_case_keys() {
        let shape = Shape {
            id: ShapeId::new("server-2"),
            shape_template: "server".to_string(),
            kind: ShapeKind::Component,
            position: Some(Slot::parse("top-a1").unwrap()),
            relative_to: Some(ShapeId::new("layer2x2-1")),
            attached_decorators: vec![Decorator::on_top("icon-lock")],
            metadata: DisplayMetadata {
                name: Some("IAM".to_string()),
                ..Default::default()
            },
            source: SourceKind::Component,
        };

        let value = serde_json::to_value(&shape).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": "server-2",
                "shapeTemplate": "server",
                "kind": "component",
                "position": "top-a1",
                "relativeToId": "layer2x2-1",
                "attachedDecorators": [
                    { "decoratorName": "icon-lock", "attachedToSlot": "top" }
                ],
                "metadata": { "name": "IAM" },
                "source": "component"
            })
        );
    }

    #[test]
    fn test_shape_json_defaults_and_extra_metadata() {
        let shape: Shape = serde_json::from_str(
            r#"{
                "id": "l1",
                "shapeTemplate": "layer2x2",
                "kind": "layer",
                "relativeToId": null,
                "metadata": { "name": "Data", "labelPosition": "front-left", "color": "blue" }
            }"#,
        )
        .unwrap();

        assert!(shape.is_layer());
        assert_eq!(shape.position, None);
        assert_eq!(shape.metadata.label_position, Some(Slot::FrontLeft));
        assert_eq!(shape.metadata.extra["color"], serde_json::json!("blue"));
        assert_eq!(shape.source, SourceKind::Component);
    }

    #[test]
    fn test_kind_accepts_3d_alias() {
        let kind: ShapeKind = serde_json::from_str(r#""3d""#).unwrap();
        assert_eq!(kind, ShapeKind::Component);
    }
}
