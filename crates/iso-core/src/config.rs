//! Editor defaults: the values merged under newly created entities.
//!
//! Every struct deserializes with `#[serde(default)]`, so a host can load a
//! partial JSON object and override only the fields it cares about.

use crate::model::{ConnectorStyle, Orientation};
use serde::{Deserialize, Serialize};

/// Defaults for every entity the editor creates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorDefaults {
    pub view_item: ViewItemDefaults,
    pub model_item: ModelItemDefaults,
    pub layer: LayerDefaults,
    pub rectangle: RectangleDefaults,
    pub connector: ConnectorDefaults,
    pub text_box: TextBoxDefaults,
}

impl EditorDefaults {
    /// Parse a (possibly partial) JSON defaults object.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewItemDefaults {
    /// Height of the label stem above a placed icon. Default: **80**.
    pub label_height: f64,
}

impl Default for ViewItemDefaults {
    fn default() -> Self {
        Self { label_height: 80.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelItemDefaults {
    /// Name given to items dropped from the icon picker. Default: **"Untitled"**.
    pub name: String,
}

impl Default for ModelItemDefaults {
    fn default() -> Self {
        Self {
            name: "Untitled".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayerDefaults {
    /// Name used when the user leaves the name blank. Default: **"New Layer"**.
    pub name: String,
    /// Offset between consecutively created layers: the n-th new layer gets
    /// `n * z_offset_step`. Default: **3**.
    pub z_offset_step: i32,
    pub visible: bool,
    pub transparency: f64,
}

impl Default for LayerDefaults {
    fn default() -> Self {
        Self {
            name: "New Layer".into(),
            z_offset_step: 3,
            visible: true,
            transparency: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RectangleDefaults {
    /// Fill shown when neither a palette color nor a literal is set.
    pub fill_color: String,
    pub outline_width: f64,
}

impl Default for RectangleDefaults {
    fn default() -> Self {
        Self {
            fill_color: "#a5b8f3".into(),
            outline_width: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConnectorDefaults {
    pub width: f64,
    pub style: ConnectorStyle,
}

impl Default for ConnectorDefaults {
    fn default() -> Self {
        Self {
            width: 10.0,
            style: ConnectorStyle::Solid,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextBoxDefaults {
    pub content: String,
    pub font_size: f64,
    pub orientation: Orientation,
}

impl Default for TextBoxDefaults {
    fn default() -> Self {
        Self {
            content: "Text".into(),
            font_size: 0.6,
            orientation: Orientation::X,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_overrides_only_given_fields() {
        let defaults =
            EditorDefaults::from_json(r#"{ "viewItem": { "labelHeight": 120 }, "layer": { "zOffsetStep": 5 } }"#)
                .unwrap();
        assert_eq!(defaults.view_item.label_height, 120.0);
        assert_eq!(defaults.layer.z_offset_step, 5);
        assert_eq!(defaults.layer.name, "New Layer");
        assert_eq!(defaults.text_box, TextBoxDefaults::default());
    }

    #[test]
    fn rectangle_outline_falls_back_to_derived_shade() {
        // Only fill and width are configurable; an unset outline color is
        // derived from the fill when painting.
        let value = serde_json::to_value(RectangleDefaults::default()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "fillColor": "#a5b8f3", "outlineWidth": 1.0 })
        );
    }
}
