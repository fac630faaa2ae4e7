//! View → display list.
//!
//! Walks a composed `RenderScene` in paint order and emits flat paint
//! commands with colors resolved and opacity folded in. Screen geometry
//! comes from a host-supplied `Projection`; this module never does pixel
//! math of its own.

use crate::compose::ComposedLayer;
use crate::order::{RenderScene, compose_view};
use iso_core::color::{Color, Shade, derive_variant, resolve_color};
use iso_core::config::{ConnectorDefaults, RectangleDefaults};
use iso_core::id::EntityId;
use iso_core::model::{
    Connector, ConnectorStyle, Coords, Model, Orientation, Rectangle, TextBox, View, ViewItem,
};
use iso_core::state::route_connector;
use kurbo::{Point, Rect};

/// Outline grade used when a rectangle has no explicit outline color.
const OUTLINE_GRADE: f64 = 2.0;

/// Maps tile space to screen space. Supplied by the rendering backend.
pub trait Projection {
    /// Screen position of a tile's center.
    fn tile_to_screen(&self, tile: Coords) -> Point;

    /// Screen bounds of the tile box spanned by `from` and `to`.
    fn area(&self, from: Coords, to: Coords) -> Rect {
        let corners = [
            from,
            to,
            Coords::new(from.x, to.y),
            Coords::new(to.x, from.y),
        ];
        let first = self.tile_to_screen(from);
        corners
            .iter()
            .map(|&c| self.tile_to_screen(c))
            .fold(Rect::from_points(first, first), |rect, p| rect.union_pt(p))
    }
}

/// Classic 2:1 isometric projection with the origin tile at (0, 0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsoProjection {
    pub tile_width: f64,
    pub tile_height: f64,
}

impl Default for IsoProjection {
    fn default() -> Self {
        Self {
            tile_width: 100.0,
            tile_height: 50.0,
        }
    }
}

impl Projection for IsoProjection {
    fn tile_to_screen(&self, tile: Coords) -> Point {
        let (x, y) = (f64::from(tile.x), f64::from(tile.y));
        Point::new(
            (x - y) * self.tile_width / 2.0,
            -(x + y) * self.tile_height / 2.0,
        )
    }
}

// ─── Display list ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f64,
}

/// One paint operation. `opacity` already includes the owning layer's.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintCmd {
    Area {
        id: EntityId,
        bounds: Rect,
        fill: Color,
        stroke: StrokeStyle,
        opacity: f64,
    },
    Path {
        id: EntityId,
        points: Vec<Point>,
        color: Color,
        width: f64,
        style: ConnectorStyle,
        opacity: f64,
    },
    Icon {
        id: EntityId,
        icon: Option<EntityId>,
        label: String,
        at: Point,
        label_height: f64,
        opacity: f64,
    },
    Text {
        id: EntityId,
        content: String,
        at: Point,
        font_size: f64,
        orientation: Orientation,
        opacity: f64,
    },
}

impl PaintCmd {
    pub fn id(&self) -> EntityId {
        match self {
            Self::Area { id, .. }
            | Self::Path { id, .. }
            | Self::Icon { id, .. }
            | Self::Text { id, .. } => *id,
        }
    }
}

/// Paint commands, back-most first.
pub type DisplayList = Vec<PaintCmd>;

/// Compose, order and paint one view.
pub fn paint_view(view: &View, model: &Model, projection: &dyn Projection) -> DisplayList {
    let scene = compose_view(view, model);
    let painter = Painter {
        view,
        model,
        projection,
        rect_defaults: RectangleDefaults::default(),
    };
    let list = painter.paint(&scene);
    log::debug!("painted view {}: {} commands", view.id, list.len());
    list
}

struct Painter<'a> {
    view: &'a View,
    model: &'a Model,
    projection: &'a dyn Projection,
    rect_defaults: RectangleDefaults,
}

impl Painter<'_> {
    fn paint(&self, scene: &RenderScene) -> DisplayList {
        let mut out = Vec::new();
        out.extend(scene.rectangles.iter().map(|r| self.rectangle(r)));
        out.extend(scene.connectors.iter().filter_map(|c| self.connector(c)));
        out.extend(scene.items.iter().map(|i| self.item(i, 1.0)));
        for layer in &scene.layers {
            self.layer(layer, &mut out);
        }
        out.extend(scene.text_boxes.iter().map(|t| self.text_box(t)));
        out
    }

    fn layer(&self, layer: &ComposedLayer, out: &mut DisplayList) {
        log::trace!(
            "LAYER @{} offset {} opacity {}",
            layer.id,
            layer.z_offset,
            layer.opacity
        );
        out.extend(layer.items.iter().map(|i| self.item(i, layer.opacity)));
    }

    fn palette(&self, id: Option<EntityId>) -> Option<Color> {
        id.and_then(|id| resolve_color(&self.model.colors, id))
    }

    fn rectangle(&self, rect: &Rectangle) -> PaintCmd {
        let fill = rect
            .color_value
            .as_deref()
            .and_then(Color::from_hex)
            .or_else(|| self.palette(rect.color))
            .or_else(|| Color::from_hex(&self.rect_defaults.fill_color))
            .unwrap_or(Color::WHITE);
        let stroke_color = rect
            .outline_color
            .as_deref()
            .and_then(Color::from_hex)
            .unwrap_or_else(|| derive_variant(fill, Shade::Dark, OUTLINE_GRADE));
        PaintCmd::Area {
            id: rect.id,
            bounds: self.projection.area(rect.from, rect.to),
            fill,
            stroke: StrokeStyle {
                color: stroke_color,
                width: rect.outline_width.unwrap_or(self.rect_defaults.outline_width),
            },
            opacity: rect.transparency.unwrap_or(1.0),
        }
    }

    /// Connectors whose anchors do not resolve have no path to draw.
    fn connector(&self, connector: &Connector) -> Option<PaintCmd> {
        let path = route_connector(self.view, connector);
        if path.tiles.is_empty() {
            log::debug!("connector {} has no route; not painted", connector.id);
            return None;
        }
        Some(PaintCmd::Path {
            id: connector.id,
            points: path
                .tiles
                .iter()
                .map(|&t| self.projection.tile_to_screen(t))
                .collect(),
            color: self.palette(connector.color).unwrap_or(Color::BLACK),
            width: if connector.width > 0.0 {
                connector.width
            } else {
                ConnectorDefaults::default().width
            },
            style: connector.style,
            opacity: 1.0,
        })
    }

    fn item(&self, item: &ViewItem, opacity: f64) -> PaintCmd {
        let model_item = self.model.item(item.id);
        PaintCmd::Icon {
            id: item.id,
            icon: model_item.and_then(|m| m.icon),
            label: model_item.map(|m| m.name.clone()).unwrap_or_default(),
            at: self.projection.tile_to_screen(item.tile),
            label_height: item.label_height.unwrap_or(0.0),
            opacity,
        }
    }

    fn text_box(&self, text_box: &TextBox) -> PaintCmd {
        PaintCmd::Text {
            id: text_box.id,
            content: text_box.content.clone(),
            at: self.projection.tile_to_screen(text_box.tile),
            font_size: text_box.font_size,
            orientation: text_box.orientation,
            opacity: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iso_core::model::{Layer, ModelItem, PaletteColor};
    use pretty_assertions::assert_eq;

    /// Unit grid: tile (x, y) → point (x, y).
    struct Grid;

    impl Projection for Grid {
        fn tile_to_screen(&self, tile: Coords) -> Point {
            Point::new(f64::from(tile.x), f64::from(tile.y))
        }
    }

    fn model_with(view: View) -> Model {
        Model {
            title: "t".into(),
            colors: vec![PaletteColor {
                id: EntityId::intern("blue"),
                value: "#0000ff".into(),
            }],
            items: vec![ModelItem {
                id: EntityId::intern("n"),
                name: "Node".into(),
                description: None,
                icon: Some(EntityId::intern("server")),
            }],
            views: vec![view],
            ..Model::default()
        }
    }

    #[test]
    fn default_area_spans_corners() {
        let rect = Grid.area(Coords::new(2, -1), Coords::new(-1, 3));
        assert_eq!(rect, Rect::new(-1.0, -1.0, 2.0, 3.0));
    }

    #[test]
    fn rectangle_fill_and_outline_resolution() {
        let mut view = View::new(EntityId::intern("v"), "v");
        let mut palette = Rectangle::new(EntityId::intern("palette"), Coords::ZERO, Coords::new(1, 1));
        palette.color = Some(EntityId::intern("blue"));
        palette.transparency = Some(0.5);
        let mut literal = Rectangle::new(EntityId::intern("literal"), Coords::ZERO, Coords::new(1, 1));
        literal.color = Some(EntityId::intern("blue"));
        literal.color_value = Some("#ff0000".into());
        literal.outline_color = Some("#00ff00".into());
        literal.outline_width = Some(4.0);
        view.rectangles = vec![palette, literal];
        let model = model_with(view);

        let list = paint_view(&model.views[0], &model, &Grid);
        let PaintCmd::Area {
            fill,
            stroke,
            opacity,
            ..
        } = &list[0]
        else {
            panic!("expected area, got {:?}", list[0]);
        };
        assert_eq!(*fill, Color::rgb(0, 0, 255));
        assert_eq!(stroke.color, derive_variant(*fill, Shade::Dark, 2.0));
        assert_eq!(stroke.width, 1.0);
        assert_eq!(*opacity, 0.5);

        let PaintCmd::Area { fill, stroke, .. } = &list[1] else {
            panic!("expected area, got {:?}", list[1]);
        };
        assert_eq!(*fill, Color::rgb(255, 0, 0));
        assert_eq!(
            *stroke,
            StrokeStyle {
                color: Color::rgb(0, 255, 0),
                width: 4.0
            }
        );
    }

    #[test]
    fn layer_opacity_reaches_items() {
        let mut view = View::new(EntityId::intern("v"), "v");
        let mut layer = Layer::new(EntityId::intern("l"), "l");
        layer.transparency = 0.4;
        layer.z_offset = 2;
        layer
            .items
            .push(ViewItem::new(EntityId::intern("n"), Coords::new(1, 0)));
        view.layers.push(layer);
        let model = model_with(view);

        let list = paint_view(&model.views[0], &model, &Grid);
        assert_eq!(
            list,
            vec![PaintCmd::Icon {
                id: EntityId::intern("n"),
                icon: Some(EntityId::intern("server")),
                label: "Node".into(),
                at: Point::new(1.0, 2.0),
                label_height: 0.0,
                opacity: 0.4,
            }]
        );
    }
}
