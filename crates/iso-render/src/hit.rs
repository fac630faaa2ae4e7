//! Hit testing: tile → entity lookup.
//!
//! Kinds are checked in a fixed priority (items, text boxes, connectors,
//! rectangles). Within a kind, candidates are walked front-to-back so the
//! topmost painted entity wins.

use crate::compose::compose;
use crate::order::{order, order_by_z_index};
use iso_core::id::EntityId;
use iso_core::model::{Coords, Orientation, TextBox, View};
use iso_core::state::SceneCache;

/// Horizontal advance of one character, in tiles, at font size 1.
const TILES_PER_CHAR_EM: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Item,
    TextBox,
    Connector,
    Rectangle,
}

/// A typed reference to a hit entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemRef {
    pub kind: ItemKind,
    pub id: EntityId,
}

impl ItemRef {
    pub fn new(kind: ItemKind, id: EntityId) -> Self {
        Self { kind, id }
    }
}

/// Find the topmost entity covering `tile` in `view`.
/// Returns `None` for empty ground.
pub fn item_at_tile(tile: Coords, view: &View, scene: &SceneCache) -> Option<ItemRef> {
    let hit = item_hit(tile, view)
        .map(|id| ItemRef::new(ItemKind::Item, id))
        .or_else(|| {
            order_by_z_index(&view.text_boxes)
                .into_iter()
                .rev()
                .find(|tb| {
                    let (from, to) = text_box_span(tb);
                    tile.is_within(from, to)
                })
                .map(|tb| ItemRef::new(ItemKind::TextBox, tb.id))
        })
        .or_else(|| {
            order(&view.connectors)
                .into_iter()
                .rev()
                .find(|c| {
                    scene
                        .connector_path(c.id)
                        .is_some_and(|path| path.contains(tile))
                })
                .map(|c| ItemRef::new(ItemKind::Connector, c.id))
        })
        .or_else(|| {
            order(&view.rectangles)
                .into_iter()
                .rev()
                .find(|r| tile.is_within(r.from, r.to))
                .map(|r| ItemRef::new(ItemKind::Rectangle, r.id))
        });

    log::trace!("hit test {tile:?} in view {}: {hit:?}", view.id);
    hit
}

/// Placed items, including those in visible layers at their offset tiles.
/// Layers paint above the view's own items, so they are checked first.
fn item_hit(tile: Coords, view: &View) -> Option<EntityId> {
    let layered = compose(&view.layers);
    for layer in layered.iter().rev() {
        if let Some(item) = order(&layer.items)
            .into_iter()
            .rev()
            .find(|i| i.tile == tile)
        {
            return Some(item.id);
        }
    }
    order(&view.items)
        .into_iter()
        .rev()
        .find(|i| i.tile == tile)
        .map(|i| i.id)
}

/// First and last tile covered by a text box's content.
pub fn text_box_span(text_box: &TextBox) -> (Coords, Coords) {
    let chars = text_box.content.chars().count() as f64;
    let tiles = (chars * text_box.font_size * TILES_PER_CHAR_EM).ceil().max(1.0) as i32;
    let start = text_box.tile;
    let end = match text_box.orientation {
        Orientation::X => Coords::new(start.x.saturating_add(tiles - 1), start.y),
        Orientation::Y => Coords::new(start.x, start.y.saturating_sub(tiles - 1)),
    };
    (start, end)
}
