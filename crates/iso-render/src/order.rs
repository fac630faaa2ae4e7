//! Paint ordering.
//!
//! Everything sorts by explicit `z_index` first (absent = 0). Entities
//! with a tile break ties by isometric depth `-(x + y)`, so tiles further
//! north-east paint behind tiles closer to the viewer. Full ties keep input
//! order. Orders are recomputed on every pass and never cached.

use crate::compose::{ComposedLayer, compose};
use iso_core::id::EntityId;
use iso_core::model::{Connector, Coords, Model, Rectangle, TextBox, View, ViewItem};

// ─── Placeable ───────────────────────────────────────────────────────────

/// Something that takes part in paint ordering.
pub trait Placeable {
    fn z_index(&self) -> Option<i32>;

    /// Tile used for the depth tie-break. `None` orders by `z_index` alone.
    fn depth_tile(&self) -> Option<Coords> {
        None
    }
}

impl Placeable for ViewItem {
    fn z_index(&self) -> Option<i32> {
        self.z_index
    }

    fn depth_tile(&self) -> Option<Coords> {
        Some(self.tile)
    }
}

impl Placeable for TextBox {
    fn z_index(&self) -> Option<i32> {
        self.z_index
    }

    fn depth_tile(&self) -> Option<Coords> {
        Some(self.tile)
    }
}

impl Placeable for Rectangle {
    fn z_index(&self) -> Option<i32> {
        self.z_index
    }
}

impl Placeable for Connector {
    fn z_index(&self) -> Option<i32> {
        self.z_index
    }
}

impl<T: Placeable + ?Sized> Placeable for &T {
    fn z_index(&self) -> Option<i32> {
        (**self).z_index()
    }

    fn depth_tile(&self) -> Option<Coords> {
        (**self).depth_tile()
    }
}

/// Isometric depth of a tile. Smaller values paint earlier.
pub fn depth(tile: Coords) -> i64 {
    -(i64::from(tile.x) + i64::from(tile.y))
}

fn paint_key<T: Placeable>(entity: &T) -> (i32, i64) {
    (
        entity.z_index().unwrap_or(0),
        entity.depth_tile().map_or(0, depth),
    )
}

/// Sort entities into paint order (first = back-most).
pub fn order<T: Placeable>(entities: &[T]) -> Vec<&T> {
    let mut sorted: Vec<&T> = entities.iter().collect();
    sorted.sort_by_key(|e| paint_key(*e));
    sorted
}

/// Sort by `z_index` only, ignoring tiles. Used for text boxes, which
/// overlay the scene rather than sit in it.
pub fn order_by_z_index<T: Placeable>(entities: &[T]) -> Vec<&T> {
    let mut sorted: Vec<&T> = entities.iter().collect();
    sorted.sort_by_key(|e| e.z_index().unwrap_or(0));
    sorted
}

/// Stacking key exposed to the presentation layer: the explicit
/// `z_index` when present, otherwise the tile depth.
pub fn render_key<T: Placeable>(entity: &T) -> i64 {
    entity
        .z_index()
        .map(i64::from)
        .or_else(|| entity.depth_tile().map(depth))
        .unwrap_or(0)
}

// ─── Z-order edits ───────────────────────────────────────────────────────

/// A stacking change requested from the item controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZOrderChange {
    /// Above everything: `max(0, all) + 1`.
    Front,
    /// Below everything: `min(0, all) - 1`.
    Back,
    Forward,
    Backward,
}

/// Compute the new `z_index` for an entity given the z-indices of all its
/// peers (absent counts as 0) and its own current value.
pub fn next_z_index(
    all: impl IntoIterator<Item = Option<i32>>,
    current: Option<i32>,
    change: ZOrderChange,
) -> i32 {
    let mut zs = all.into_iter().map(|z| z.unwrap_or(0));
    match change {
        ZOrderChange::Front => zs.fold(0, i32::max).saturating_add(1),
        ZOrderChange::Back => zs.fold(0, i32::min).saturating_sub(1),
        ZOrderChange::Forward => current.unwrap_or(0).saturating_add(1),
        ZOrderChange::Backward => current.unwrap_or(0).saturating_sub(1),
    }
}

// ─── Scene composition ───────────────────────────────────────────────────

/// A whole view, grouped and sorted for painting. Groups paint in field
/// order; each group is already in paint order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderScene {
    pub rectangles: Vec<Rectangle>,
    pub connectors: Vec<Connector>,
    pub items: Vec<ViewItem>,
    /// Visible layers, each with its items depth-sorted.
    pub layers: Vec<ComposedLayer>,
    pub text_boxes: Vec<TextBox>,
}

impl RenderScene {
    /// Ids of every painted entity, back to front.
    pub fn paint_ids(&self) -> Vec<EntityId> {
        self.rectangles
            .iter()
            .map(|r| r.id)
            .chain(self.connectors.iter().map(|c| c.id))
            .chain(self.items.iter().map(|i| i.id))
            .chain(self.layers.iter().flat_map(|l| l.items.iter().map(|i| i.id)))
            .chain(self.text_boxes.iter().map(|t| t.id))
            .collect()
    }
}

/// Compose and order one view. View items with no model item behind them
/// have nothing to draw and are left out.
pub fn compose_view(view: &View, model: &Model) -> RenderScene {
    let has_model_item = |item: &&ViewItem| {
        let known = model.item(item.id).is_some();
        if !known {
            log::debug!("skipping orphan view item {} in view {}", item.id, view.id);
        }
        known
    };

    let layers = compose(&view.layers)
        .into_iter()
        .map(|mut layer| {
            layer.items = order(&layer.items)
                .into_iter()
                .filter(has_model_item)
                .cloned()
                .collect();
            layer
        })
        .collect();

    RenderScene {
        rectangles: order(&view.rectangles).into_iter().cloned().collect(),
        connectors: order(&view.connectors).into_iter().cloned().collect(),
        items: order(&view.items)
            .into_iter()
            .filter(has_model_item)
            .cloned()
            .collect(),
        layers,
        text_boxes: order_by_z_index(&view.text_boxes)
            .into_iter()
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn item(id: &str, x: i32, y: i32, z: Option<i32>) -> ViewItem {
        ViewItem {
            z_index: z,
            ..ViewItem::new(EntityId::intern(id), Coords::new(x, y))
        }
    }

    fn ids<T: Placeable>(sorted: Vec<&T>, id: impl Fn(&T) -> EntityId) -> Vec<&'static str> {
        sorted.into_iter().map(|e| id(e).as_str()).collect()
    }

    #[test]
    fn depth_breaks_z_ties() {
        let a = item("a", 0, 0, None);
        let b = item("b", 1, 1, None);
        let c = item("c", 5, 5, Some(5));
        let nodes = [c, a, b];
        assert_eq!(ids(order(&nodes), |i| i.id), vec!["b", "a", "c"]);
    }

    #[test]
    fn full_ties_keep_input_order() {
        let nodes = [
            item("first", 1, 0, None),
            item("second", 0, 1, None),
            item("third", 2, -1, Some(0)),
        ];
        assert_eq!(
            ids(order(&nodes), |i| i.id),
            vec!["first", "second", "third"]
        );
    }

    #[test]
    fn tileless_entities_order_by_z_then_input() {
        let mut rects = Vec::new();
        for (id, z) in [("r1", Some(2)), ("r2", None), ("r3", Some(-1)), ("r4", None)] {
            let mut r = Rectangle::new(EntityId::intern(id), Coords::ZERO, Coords::new(9, 9));
            r.z_index = z;
            rects.push(r);
        }
        assert_eq!(
            ids(order(&rects), |r| r.id),
            vec!["r3", "r2", "r4", "r1"]
        );
    }

    #[test]
    fn render_key_prefers_explicit_z() {
        assert_eq!(render_key(&item("a", 2, 3, None)), -5);
        assert_eq!(render_key(&item("a", 2, 3, Some(7))), 7);
    }

    #[test]
    fn z_order_changes() {
        let peers = [Some(3), None, Some(-2)];
        assert_eq!(next_z_index(peers, Some(3), ZOrderChange::Front), 4);
        assert_eq!(next_z_index(peers, Some(3), ZOrderChange::Back), -3);
        assert_eq!(next_z_index(peers, Some(3), ZOrderChange::Forward), 4);
        assert_eq!(next_z_index(peers, None, ZOrderChange::Backward), -1);
        // Empty and all-negative sets are floored at zero.
        assert_eq!(next_z_index(std::iter::empty(), None, ZOrderChange::Front), 1);
        assert_eq!(next_z_index([Some(-4)], None, ZOrderChange::Front), 1);
        assert_eq!(next_z_index([Some(4)], None, ZOrderChange::Back), -1);
    }
}
