//! Layer reducers. Layers group view items under a shared z offset.

use super::{Change, EntityKind, ReducerError, ViewContext, position, set};
use iso_core::id::EntityId;
use iso_core::model::{Layer, ViewItem};
use iso_core::schema::check_transparency;
use iso_core::state::State;
use serde::Deserialize;

/// Partial layer record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayerPatch {
    pub name: Option<String>,
    pub description: Change<String>,
    pub items: Option<Vec<ViewItem>>,
    pub z_offset: Option<i32>,
    pub visible: Option<bool>,
    pub transparency: Option<f64>,
}

impl LayerPatch {
    fn check(&self) -> Result<(), ReducerError> {
        if let Some(t) = self.transparency {
            check_transparency("transparency", t)?;
        }
        Ok(())
    }

    fn apply_to(self, layer: &mut Layer) {
        set(self.name, &mut layer.name);
        self.description.apply(&mut layer.description);
        set(self.items, &mut layer.items);
        set(self.z_offset, &mut layer.z_offset);
        set(self.visible, &mut layer.visible);
        set(self.transparency, &mut layer.transparency);
    }
}

/// Append a layer built from `patch` over the layer defaults.
pub fn create_layer(id: EntityId, patch: LayerPatch, ctx: &ViewContext) -> Result<State, ReducerError> {
    patch.check()?;
    let defaults = &ctx.defaults.layer;
    let next = ctx.edit_view(|view| {
        let mut layer = Layer::new(id, defaults.name.clone());
        layer.visible = defaults.visible;
        layer.transparency = defaults.transparency;
        patch.apply_to(&mut layer);
        view.layers.push(layer);
        Ok(())
    })?;
    log::debug!("created layer {id} in view {}", ctx.view_id);
    Ok(next)
}

/// Add a layer the way the layer panel does: a blank name falls back to
/// the default, and each new layer sits one offset step above the last.
pub fn add_layer(id: EntityId, name: &str, ctx: &ViewContext) -> Result<State, ReducerError> {
    let existing = ctx
        .state
        .model
        .view(ctx.view_id)
        .map_or(0, |v| v.layers.len());
    let step = ctx.defaults.layer.z_offset_step;
    let name = name.trim();
    let patch = LayerPatch {
        name: (!name.is_empty()).then(|| name.to_string()),
        z_offset: Some(i32::try_from(existing).unwrap_or(i32::MAX).saturating_mul(step)),
        ..LayerPatch::default()
    };
    create_layer(id, patch, ctx)
}

pub fn update_layer(id: EntityId, patch: LayerPatch, ctx: &ViewContext) -> Result<State, ReducerError> {
    patch.check()?;
    let next = ctx.edit_view(|view| {
        let i = position(&view.layers, id, EntityKind::Layer, |l| l.id)?;
        patch.apply_to(&mut view.layers[i]);
        Ok(())
    })?;
    log::debug!("updated layer {id}");
    Ok(next)
}

pub fn delete_layer(id: EntityId, ctx: &ViewContext) -> Result<State, ReducerError> {
    let next = ctx.edit_view(|view| {
        let i = position(&view.layers, id, EntityKind::Layer, |l| l.id)?;
        view.layers.remove(i);
        Ok(())
    })?;
    log::debug!("deleted layer {id}");
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducers::testing;
    use iso_core::config::EditorDefaults;
    use iso_core::model::Coords;
    use pretty_assertions::assert_eq;

    fn view1() -> EntityId {
        EntityId::intern("view1")
    }

    fn layers(state: &State) -> &[Layer] {
        &state.model.views[0].layers
    }

    fn with_two_layers(defaults: &EditorDefaults) -> State {
        let state = testing::state();
        let state = create_layer(
            EntityId::intern("layer1"),
            LayerPatch {
                name: Some("Layer 1".into()),
                ..LayerPatch::default()
            },
            &ViewContext::new(view1(), &state, defaults),
        )
        .unwrap();
        create_layer(
            EntityId::intern("layer2"),
            LayerPatch {
                name: Some("Layer 2".into()),
                z_offset: Some(3),
                ..LayerPatch::default()
            },
            &ViewContext::new(view1(), &state, defaults),
        )
        .unwrap()
    }

    #[test]
    fn create_applies_defaults_and_initializes_collection() {
        let defaults = EditorDefaults::default();
        let state = testing::state();
        assert!(layers(&state).is_empty());

        let next = create_layer(
            EntityId::intern("layer1"),
            LayerPatch::default(),
            &ViewContext::new(view1(), &state, &defaults),
        )
        .unwrap();

        let layer = &layers(&next)[0];
        assert_eq!(layer.name, "New Layer");
        assert_eq!(layer.z_offset, 0);
        assert!(layer.visible);
        assert_eq!(layer.transparency, 1.0);
        // Input snapshot untouched.
        assert!(layers(&state).is_empty());
    }

    #[test]
    fn create_in_missing_view_fails() {
        let defaults = EditorDefaults::default();
        let state = testing::state();
        let err = create_layer(
            EntityId::intern("layer1"),
            LayerPatch::default(),
            &ViewContext::new(EntityId::intern("nope"), &state, &defaults),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ReducerError::NotFound {
                kind: EntityKind::View,
                id: EntityId::intern("nope")
            }
        );
    }

    #[test]
    fn add_layer_stacks_offsets() {
        let defaults = EditorDefaults::default();
        let state = with_two_layers(&defaults);
        let next = add_layer(
            EntityId::intern("layer3"),
            "   ",
            &ViewContext::new(view1(), &state, &defaults),
        )
        .unwrap();
        let added = &layers(&next)[2];
        assert_eq!(added.name, "New Layer");
        assert_eq!(added.z_offset, 6);
    }

    #[test]
    fn update_merges_and_preserves_siblings() {
        let defaults = EditorDefaults::default();
        let state = with_two_layers(&defaults);
        let next = update_layer(
            EntityId::intern("layer1"),
            LayerPatch {
                visible: Some(false),
                items: Some(vec![ViewItem::new(EntityId::intern("item9"), Coords::new(1, 1))]),
                ..LayerPatch::default()
            },
            &ViewContext::new(view1(), &state, &defaults),
        )
        .unwrap();
        let updated = &layers(&next)[0];
        assert_eq!(updated.name, "Layer 1");
        assert!(!updated.visible);
        assert_eq!(updated.items.len(), 1);
        assert_eq!(layers(&next)[1], layers(&state)[1]);
    }

    #[test]
    fn empty_update_is_identity() {
        let defaults = EditorDefaults::default();
        let state = with_two_layers(&defaults);
        let next = update_layer(
            EntityId::intern("layer2"),
            LayerPatch::default(),
            &ViewContext::new(view1(), &state, &defaults),
        )
        .unwrap();
        assert_eq!(next, state);
    }

    #[test]
    fn update_rejects_out_of_range_transparency() {
        let defaults = EditorDefaults::default();
        let state = with_two_layers(&defaults);
        let err = update_layer(
            EntityId::intern("layer1"),
            LayerPatch {
                transparency: Some(1.5),
                ..LayerPatch::default()
            },
            &ViewContext::new(view1(), &state, &defaults),
        )
        .unwrap_err();
        assert!(matches!(err, ReducerError::Invalid(_)));
    }

    #[test]
    fn delete_removes_only_target() {
        let defaults = EditorDefaults::default();
        let state = with_two_layers(&defaults);
        let ctx = ViewContext::new(view1(), &state, &defaults);
        let next = delete_layer(EntityId::intern("layer1"), &ctx).unwrap();
        let ids: Vec<&str> = layers(&next).iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["layer2"]);
        assert_eq!(layers(&next)[0].z_offset, 3);

        let missing = delete_layer(EntityId::intern("layer9"), &ctx).unwrap_err();
        assert!(matches!(
            missing,
            ReducerError::NotFound {
                kind: EntityKind::Layer,
                ..
            }
        ));
    }

    #[test]
    fn patch_from_json() {
        let patch: LayerPatch =
            serde_json::from_str(r#"{ "zOffset": 4, "description": null }"#).unwrap();
        assert_eq!(patch.z_offset, Some(4));
        assert_eq!(patch.description, Change::Clear);
        assert_eq!(patch.name, None);
    }
}
