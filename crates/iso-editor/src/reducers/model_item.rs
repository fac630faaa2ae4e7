//! Model item reducers. These work on the document's item list and need no
//! view; deleting an item leaves its placements behind (`lint` reports them
//! as orphans).

use super::{Change, EntityKind, ReducerError, position, set};
use iso_core::config::EditorDefaults;
use iso_core::id::EntityId;
use iso_core::model::ModelItem;
use iso_core::state::State;
use serde::Deserialize;

/// Partial model item record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelItemPatch {
    pub name: Option<String>,
    pub description: Change<String>,
    pub icon: Change<EntityId>,
}

impl ModelItemPatch {
    fn apply_to(self, item: &mut ModelItem) {
        set(self.name, &mut item.name);
        self.description.apply(&mut item.description);
        self.icon.apply(&mut item.icon);
    }
}

pub fn create_model_item(
    id: EntityId,
    patch: ModelItemPatch,
    state: &State,
    defaults: &EditorDefaults,
) -> Result<State, ReducerError> {
    let mut next = state.clone();
    let mut item = ModelItem {
        id,
        name: defaults.model_item.name.clone(),
        description: None,
        icon: None,
    };
    patch.apply_to(&mut item);
    next.model.items.push(item);
    log::debug!("created model item {id}");
    Ok(next)
}

pub fn update_model_item(
    id: EntityId,
    patch: ModelItemPatch,
    state: &State,
) -> Result<State, ReducerError> {
    let i = position(&state.model.items, id, EntityKind::ModelItem, |m| m.id)?;
    let mut next = state.clone();
    patch.apply_to(&mut next.model.items[i]);
    log::debug!("updated model item {id}");
    Ok(next)
}

pub fn delete_model_item(id: EntityId, state: &State) -> Result<State, ReducerError> {
    let i = position(&state.model.items, id, EntityKind::ModelItem, |m| m.id)?;
    let mut next = state.clone();
    next.model.items.remove(i);
    log::debug!("deleted model item {id}");
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducers::testing;
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> EntityId {
        EntityId::intern(s)
    }

    #[test]
    fn create_uses_default_name() {
        let state = testing::state();
        let next = create_model_item(
            id("item2"),
            ModelItemPatch {
                icon: Change::Set(id("server")),
                ..ModelItemPatch::default()
            },
            &state,
            &EditorDefaults::default(),
        )
        .unwrap();
        let item = next.model.item(id("item2")).unwrap();
        assert_eq!(item.name, "Untitled");
        assert_eq!(item.icon, Some(id("server")));
        assert_eq!(state.model.items.len(), 1);
    }

    #[test]
    fn update_keeps_unpatched_fields() {
        let state = testing::state();
        let next = update_model_item(
            id("item1"),
            ModelItemPatch {
                description: Change::Set("Primary database".into()),
                ..ModelItemPatch::default()
            },
            &state,
        )
        .unwrap();
        let item = next.model.item(id("item1")).unwrap();
        assert_eq!(item.name, "Item 1");
        assert_eq!(item.description.as_deref(), Some("Primary database"));
    }

    #[test]
    fn delete_leaves_placements() {
        let state = testing::state();
        let next = delete_model_item(id("item1"), &state).unwrap();
        assert!(next.model.items.is_empty());
        assert!(next.model.views[0].find_item(id("item1")).is_some());

        let err = delete_model_item(id("item1"), &next).unwrap_err();
        assert_eq!(
            err,
            ReducerError::NotFound {
                kind: EntityKind::ModelItem,
                id: id("item1")
            }
        );
    }
}
