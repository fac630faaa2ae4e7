//! Layer compositor: raw layers → render-ready groups.
//!
//! Hidden layers are dropped, the rest are stably sorted by `z_offset`
//! (lower paints first) and each item's tile `y` is shifted by its layer's
//! offset. Every group keeps its layer's transparency as an opacity
//! multiplier. Depth ordering of items inside a group is left to `order`.

use iso_core::id::EntityId;
use iso_core::model::{Coords, Layer, ViewItem};

/// One visible layer, ready to paint as a single group.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedLayer {
    pub id: EntityId,
    pub z_offset: i32,
    /// Applied to everything painted inside the group.
    pub opacity: f64,
    /// Items with their tiles already offset, in input order.
    pub items: Vec<ViewItem>,
}

/// Compose layers into paint order.
pub fn compose(layers: &[Layer]) -> Vec<ComposedLayer> {
    let mut visible: Vec<&Layer> = layers.iter().filter(|l| l.visible).collect();
    // `sort_by_key` is stable: equal offsets keep input order.
    visible.sort_by_key(|l| l.z_offset);

    log::trace!(
        "compose: {} of {} layers visible",
        visible.len(),
        layers.len()
    );

    visible
        .into_iter()
        .map(|layer| ComposedLayer {
            id: layer.id,
            z_offset: layer.z_offset,
            opacity: layer.transparency,
            items: layer
                .items
                .iter()
                .map(|item| ViewItem {
                    tile: offset_tile(item.tile, layer.z_offset),
                    ..item.clone()
                })
                .collect(),
        })
        .collect()
}

/// Shift a tile by a layer offset along `y`, clamped to the `i32` range.
pub fn offset_tile(tile: Coords, z_offset: i32) -> Coords {
    tile.offset_y(z_offset)
}
