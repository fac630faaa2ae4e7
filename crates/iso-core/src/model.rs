//! Core document model for isometric diagrams.
//!
//! A document is a flat list of model items (the "what") plus one or more
//! views (the "where"). Each view places model items on an integer tile grid
//! and carries its own rectangles, connectors, text boxes and z-offset
//! layers. Views reference model items, icons and palette colors by id;
//! nothing here enforces that those references resolve (see `lint`).

use crate::id::EntityId;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ─── Geometry ────────────────────────────────────────────────────────────

/// Integer grid position in diagram space, before isometric projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Coords {
    pub x: i32,
    pub y: i32,
}

impl Coords {
    pub const ZERO: Coords = Coords { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Shift along `y`, clamping at the `i32` range.
    pub const fn offset_y(self, dy: i32) -> Self {
        Self {
            x: self.x,
            y: self.y.saturating_add(dy),
        }
    }

    /// Check if this tile lies inside the axis-aligned box spanned by
    /// `from` and `to` (inclusive, corners in any order).
    pub fn is_within(&self, from: Coords, to: Coords) -> bool {
        let (min_x, max_x) = (from.x.min(to.x), from.x.max(to.x));
        let (min_y, max_y) = (from.y.min(to.y), from.y.max(to.y));
        self.x >= min_x && self.x <= max_x && self.y >= min_y && self.y <= max_y
    }
}

// ─── Model-level entities ────────────────────────────────────────────────

/// A diagram element independent of where it is drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelItem {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<EntityId>,
}

/// An icon available to the icon picker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Icon {
    pub id: EntityId,
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_isometric: Option<bool>,
}

/// A named entry in the document palette. `value` is `#RRGGBB`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteColor {
    pub id: EntityId,
    pub value: String,
}

// ─── View-level entities ─────────────────────────────────────────────────

/// Placement of a model item within one view. Shares the model item's id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewItem {
    pub id: EntityId,
    pub tile: Coords,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
}

impl ViewItem {
    pub fn new(id: EntityId, tile: Coords) -> Self {
        Self {
            id,
            tile,
            label_height: None,
            z_index: None,
        }
    }
}

/// A z-offset group of view items.
///
/// `z_offset` is added to every contained item's tile `y` at composition
/// time; lower offsets paint first. Items belong to exactly one layer and
/// move between layers only by removal and reinsertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub items: Vec<ViewItem>,
    #[serde(default)]
    pub z_offset: i32,
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Opacity multiplier in `[0, 1]` for everything painted in the layer.
    #[serde(default = "default_transparency")]
    pub transparency: f64,
}

fn default_visible() -> bool {
    true
}

fn default_transparency() -> f64 {
    1.0
}

impl Layer {
    /// An empty, visible, fully opaque layer at offset 0.
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            items: Vec::new(),
            z_offset: 0,
            visible: true,
            transparency: 1.0,
        }
    }
}

/// A filled tile-space box.
///
/// The fill comes from either a palette `color` or a literal `color_value`;
/// the literal wins when both are present. `outline_color` falls back to a
/// darker variant of the fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rectangle {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline_width: Option<f64>,
    pub from: Coords,
    pub to: Coords,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transparency: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
}

impl Rectangle {
    pub fn new(id: EntityId, from: Coords, to: Coords) -> Self {
        Self {
            id,
            color: None,
            color_value: None,
            outline_color: None,
            outline_width: None,
            from,
            to,
            transparency: None,
            z_index: None,
        }
    }
}

/// Line style of a connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectorStyle {
    #[default]
    Solid,
    Dotted,
    Dashed,
}

impl ConnectorStyle {
    pub const ALL: [ConnectorStyle; 3] = [Self::Solid, Self::Dotted, Self::Dashed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Solid => "SOLID",
            Self::Dotted => "DOTTED",
            Self::Dashed => "DASHED",
        }
    }
}

/// What a connector anchor is attached to. Serialized as a single-key
/// object: `{"item": "web-app"}`, `{"anchor": "a1"}`, `{"tile": {"x":0,"y":0}}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorRef {
    Item(EntityId),
    Anchor(EntityId),
    Tile(Coords),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    pub id: EntityId,
    #[serde(rename = "ref")]
    pub target: AnchorRef,
}

/// A line between two or more anchors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connector {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<EntityId>,
    pub width: f64,
    #[serde(default)]
    pub style: ConnectorStyle,
    #[serde(default)]
    pub anchors: SmallVec<[Anchor; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
}

/// Projection axis a text box is laid along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    X,
    Y,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBox {
    pub id: EntityId,
    pub tile: Coords,
    pub content: String,
    pub font_size: f64,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
}

/// One arrangement of the model. Collections that are absent in a document
/// load as empty and are omitted again when empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct View {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub items: Vec<ViewItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rectangles: Vec<Rectangle>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connectors: Vec<Connector>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub text_boxes: Vec<TextBox>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layers: Vec<Layer>,
}

impl View {
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            last_updated: None,
            items: Vec::new(),
            rectangles: Vec::new(),
            connectors: Vec::new(),
            text_boxes: Vec::new(),
            layers: Vec::new(),
        }
    }

    /// Find a placed item by id, whether it sits directly on the view or
    /// inside one of its layers. Layer items are returned unadjusted.
    pub fn find_item(&self, id: EntityId) -> Option<&ViewItem> {
        self.items
            .iter()
            .chain(self.layers.iter().flat_map(|l| l.items.iter()))
            .find(|item| item.id == id)
    }

    /// All placed items: the view's own, then each layer's in layer order.
    pub fn all_items(&self) -> impl Iterator<Item = &ViewItem> {
        self.items
            .iter()
            .chain(self.layers.iter().flat_map(|l| l.items.iter()))
    }
}

// ─── Document ────────────────────────────────────────────────────────────

/// The persisted document: `{title, version, items, icons, colors, views}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub items: Vec<ModelItem>,
    #[serde(default)]
    pub icons: Vec<Icon>,
    #[serde(default)]
    pub colors: Vec<PaletteColor>,
    #[serde(default)]
    pub views: Vec<View>,
}

impl Model {
    pub fn view(&self, id: EntityId) -> Option<&View> {
        self.views.iter().find(|v| v.id == id)
    }

    pub fn item(&self, id: EntityId) -> Option<&ModelItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn icon(&self, id: EntityId) -> Option<&Icon> {
        self.icons.iter().find(|i| i.id == id)
    }

    pub fn color(&self, id: EntityId) -> Option<&PaletteColor> {
        self.colors.iter().find(|c| c.id == id)
    }
}
