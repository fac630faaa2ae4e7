//! Text box reducers: create, merge-update and delete labels in a view.

use super::{Change, EntityKind, ReducerError, ViewContext, position, set};
use iso_core::id::EntityId;
use iso_core::model::{Coords, Orientation, TextBox};
use iso_core::state::State;
use serde::Deserialize;

/// Partial text box record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextBoxPatch {
    pub tile: Option<Coords>,
    pub content: Option<String>,
    pub font_size: Option<f64>,
    pub orientation: Option<Orientation>,
    pub z_index: Change<i32>,
}

impl TextBoxPatch {
    fn apply_to(self, text_box: &mut TextBox) {
        set(self.tile, &mut text_box.tile);
        set(self.content, &mut text_box.content);
        set(self.font_size, &mut text_box.font_size);
        set(self.orientation, &mut text_box.orientation);
        self.z_index.apply(&mut text_box.z_index);
    }
}

pub fn create_text_box(
    id: EntityId,
    patch: TextBoxPatch,
    ctx: &ViewContext,
) -> Result<State, ReducerError> {
    let defaults = &ctx.defaults.text_box;
    let next = ctx.edit_view(|view| {
        let mut text_box = TextBox {
            id,
            tile: Coords::ZERO,
            content: defaults.content.clone(),
            font_size: defaults.font_size,
            orientation: defaults.orientation,
            z_index: None,
        };
        patch.apply_to(&mut text_box);
        view.text_boxes.push(text_box);
        Ok(())
    })?;
    log::debug!("created text box {id} in view {}", ctx.view_id);
    Ok(next)
}

pub fn update_text_box(
    id: EntityId,
    patch: TextBoxPatch,
    ctx: &ViewContext,
) -> Result<State, ReducerError> {
    let next = ctx.edit_view(|view| {
        let i = position(&view.text_boxes, id, EntityKind::TextBox, |t| t.id)?;
        patch.apply_to(&mut view.text_boxes[i]);
        Ok(())
    })?;
    log::debug!("updated text box {id}");
    Ok(next)
}

pub fn delete_text_box(id: EntityId, ctx: &ViewContext) -> Result<State, ReducerError> {
    let next = ctx.edit_view(|view| {
        let i = position(&view.text_boxes, id, EntityKind::TextBox, |t| t.id)?;
        view.text_boxes.remove(i);
        Ok(())
    })?;
    log::debug!("deleted text box {id}");
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducers::testing;
    use iso_core::config::EditorDefaults;
    use pretty_assertions::assert_eq;

    #[test]
    fn create_update_delete() {
        let defaults = EditorDefaults::default();
        let view1 = EntityId::intern("view1");
        let tb = EntityId::intern("tb1");
        let state = testing::state();

        let created = create_text_box(
            tb,
            TextBoxPatch {
                tile: Some(Coords::new(3, 4)),
                ..TextBoxPatch::default()
            },
            &ViewContext::new(view1, &state, &defaults),
        )
        .unwrap();
        let text_box = &created.model.views[0].text_boxes[0];
        assert_eq!(text_box.content, "Text");
        assert_eq!(text_box.font_size, 0.6);
        assert_eq!(text_box.orientation, Orientation::X);
        assert_eq!(text_box.tile, Coords::new(3, 4));

        let ctx = ViewContext::new(view1, &created, &defaults);
        let updated = update_text_box(
            tb,
            TextBoxPatch {
                content: Some("Platform".into()),
                orientation: Some(Orientation::Y),
                z_index: Change::Set(2),
                ..TextBoxPatch::default()
            },
            &ctx,
        )
        .unwrap();
        let text_box = &updated.model.views[0].text_boxes[0];
        assert_eq!(text_box.content, "Platform");
        assert_eq!(text_box.orientation, Orientation::Y);
        assert_eq!(text_box.z_index, Some(2));
        assert_eq!(text_box.tile, Coords::new(3, 4));

        let deleted = delete_text_box(tb, &ctx).unwrap();
        assert!(deleted.model.views[0].text_boxes.is_empty());
        assert!(delete_text_box(tb, &ViewContext::new(view1, &deleted, &defaults)).is_err());
    }
}
