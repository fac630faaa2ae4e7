//! Rectangle reducers.
//!
//! A rectangle's fill is either a palette `color` or a literal
//! `colorValue`. Setting one clears the other, and also drops any explicit
//! `outlineColor` so the outline follows the new fill (unless the same
//! patch sets or clears the outline itself). A patch that sets both fill
//! sources is rejected.

use super::{Change, EntityKind, ReducerError, ViewContext, position, set};
use iso_core::id::EntityId;
use iso_core::model::{Coords, Rectangle};
use iso_core::schema::{check_hex, check_outline_width, check_transparency};
use iso_core::state::State;
use serde::Deserialize;

/// Partial rectangle record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RectanglePatch {
    pub color: Change<EntityId>,
    pub color_value: Change<String>,
    pub outline_color: Change<String>,
    pub outline_width: Change<f64>,
    pub from: Option<Coords>,
    pub to: Option<Coords>,
    pub transparency: Change<f64>,
    pub z_index: Change<i32>,
}

impl RectanglePatch {
    fn check(&self) -> Result<(), ReducerError> {
        if self.color.is_set() && self.color_value.is_set() {
            return Err(ReducerError::ConflictingFill);
        }
        if let Some(hex) = self.color_value.as_set() {
            check_hex("colorValue", hex)?;
        }
        if let Some(hex) = self.outline_color.as_set() {
            check_hex("outlineColor", hex)?;
        }
        if let Some(&width) = self.outline_width.as_set() {
            check_outline_width("outlineWidth", width)?;
        }
        if let Some(&t) = self.transparency.as_set() {
            check_transparency("transparency", t)?;
        }
        Ok(())
    }

    fn apply_to(self, rect: &mut Rectangle) {
        let fill_changed = self.color.is_set() || self.color_value.is_set();
        if self.color.is_set() {
            rect.color_value = None;
        }
        if self.color_value.is_set() {
            rect.color = None;
        }
        if fill_changed && self.outline_color.is_keep() {
            rect.outline_color = None;
        }

        self.color.apply(&mut rect.color);
        self.color_value.apply(&mut rect.color_value);
        self.outline_color.apply(&mut rect.outline_color);
        self.outline_width.apply(&mut rect.outline_width);
        set(self.from, &mut rect.from);
        set(self.to, &mut rect.to);
        self.transparency.apply(&mut rect.transparency);
        self.z_index.apply(&mut rect.z_index);
    }
}

/// Insert a rectangle at the front of the view's collection, so the newest
/// one is always at index 0.
pub fn create_rectangle(
    id: EntityId,
    patch: RectanglePatch,
    ctx: &ViewContext,
) -> Result<State, ReducerError> {
    patch.check()?;
    let next = ctx.edit_view(|view| {
        let mut rect = Rectangle::new(id, Coords::ZERO, Coords::ZERO);
        patch.apply_to(&mut rect);
        view.rectangles.insert(0, rect);
        Ok(())
    })?;
    log::debug!("created rectangle {id} in view {}", ctx.view_id);
    Ok(next)
}

pub fn update_rectangle(
    id: EntityId,
    patch: RectanglePatch,
    ctx: &ViewContext,
) -> Result<State, ReducerError> {
    patch.check()?;
    let next = ctx.edit_view(|view| {
        let i = position(&view.rectangles, id, EntityKind::Rectangle, |r| r.id)?;
        patch.apply_to(&mut view.rectangles[i]);
        Ok(())
    })?;
    log::debug!("updated rectangle {id}");
    Ok(next)
}

pub fn delete_rectangle(id: EntityId, ctx: &ViewContext) -> Result<State, ReducerError> {
    let next = ctx.edit_view(|view| {
        let i = position(&view.rectangles, id, EntityKind::Rectangle, |r| r.id)?;
        view.rectangles.remove(i);
        Ok(())
    })?;
    log::debug!("deleted rectangle {id}");
    Ok(next)
}
