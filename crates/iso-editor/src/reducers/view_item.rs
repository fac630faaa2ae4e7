//! View item reducers. A placed item lives either directly on the view or
//! inside exactly one of its layers; update and delete find it wherever it
//! is, and `move_item_to_layer` is the only way to change its owner.

use super::{Change, EntityKind, ReducerError, ViewContext, not_found, set};
use iso_core::id::EntityId;
use iso_core::model::{Coords, View, ViewItem};
use iso_core::state::State;
use serde::Deserialize;

/// Partial view item record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewItemPatch {
    pub tile: Option<Coords>,
    pub label_height: Change<f64>,
    pub z_index: Change<i32>,
}

impl ViewItemPatch {
    fn apply_to(self, item: &mut ViewItem) {
        set(self.tile, &mut item.tile);
        self.label_height.apply(&mut item.label_height);
        self.z_index.apply(&mut item.z_index);
    }
}

fn find_item_mut(view: &mut View, id: EntityId) -> Option<&mut ViewItem> {
    view.items
        .iter_mut()
        .chain(view.layers.iter_mut().flat_map(|l| l.items.iter_mut()))
        .find(|item| item.id == id)
}

/// Remove an item from whichever collection owns it.
fn take_item(view: &mut View, id: EntityId) -> Option<ViewItem> {
    if let Some(i) = view.items.iter().position(|item| item.id == id) {
        return Some(view.items.remove(i));
    }
    view.layers.iter_mut().find_map(|layer| {
        let i = layer.items.iter().position(|item| item.id == id)?;
        Some(layer.items.remove(i))
    })
}

/// Place a model item on the view. `id` is the model item's id.
pub fn create_view_item(
    id: EntityId,
    patch: ViewItemPatch,
    ctx: &ViewContext,
) -> Result<State, ReducerError> {
    let label_height = ctx.defaults.view_item.label_height;
    let next = ctx.edit_view(|view| {
        let mut item = ViewItem::new(id, Coords::ZERO);
        item.label_height = Some(label_height);
        patch.apply_to(&mut item);
        view.items.push(item);
        Ok(())
    })?;
    log::debug!("placed item {id} in view {}", ctx.view_id);
    Ok(next)
}

pub fn update_view_item(
    id: EntityId,
    patch: ViewItemPatch,
    ctx: &ViewContext,
) -> Result<State, ReducerError> {
    let next = ctx.edit_view(|view| {
        let item = find_item_mut(view, id).ok_or_else(|| not_found(EntityKind::ViewItem, id))?;
        patch.apply_to(item);
        Ok(())
    })?;
    log::debug!("updated view item {id}");
    Ok(next)
}

pub fn delete_view_item(id: EntityId, ctx: &ViewContext) -> Result<State, ReducerError> {
    let next = ctx.edit_view(|view| {
        take_item(view, id)
            .map(drop)
            .ok_or_else(|| not_found(EntityKind::ViewItem, id))
    })?;
    log::debug!("removed view item {id}");
    Ok(next)
}

/// Move a placed item into `layer` (appended last), or back onto the view
/// itself for `None`. The item's own tile is kept as-is.
pub fn move_item_to_layer(
    id: EntityId,
    layer: Option<EntityId>,
    ctx: &ViewContext,
) -> Result<State, ReducerError> {
    let next = ctx.edit_view(|view| {
        if let Some(layer_id) = layer
            && !view.layers.iter().any(|l| l.id == layer_id)
        {
            return Err(not_found(EntityKind::Layer, layer_id));
        }
        let item = take_item(view, id).ok_or_else(|| not_found(EntityKind::ViewItem, id))?;
        let target = match layer {
            Some(layer_id) => view
                .layers
                .iter_mut()
                .find(|l| l.id == layer_id)
                .map(|l| &mut l.items)
                .ok_or_else(|| not_found(EntityKind::Layer, layer_id))?,
            None => &mut view.items,
        };
        target.push(item);
        Ok(())
    })?;
    log::debug!("moved view item {id} to {layer:?}");
    Ok(next)
}
