//! Connector reducers. Besides the view, these keep the scene cache's
//! per-connector route in step: create/update re-route, delete drops it.

use super::{Change, EntityKind, ReducerError, ViewContext, position, set};
use iso_core::id::EntityId;
use iso_core::model::{Anchor, Connector, ConnectorStyle};
use iso_core::state::State;
use serde::Deserialize;
use smallvec::SmallVec;

/// Partial connector record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConnectorPatch {
    pub description: Change<String>,
    pub color: Change<EntityId>,
    pub width: Option<f64>,
    pub style: Option<ConnectorStyle>,
    pub anchors: Option<SmallVec<[Anchor; 2]>>,
    pub z_index: Change<i32>,
}

impl ConnectorPatch {
    fn apply_to(self, connector: &mut Connector) {
        self.description.apply(&mut connector.description);
        self.color.apply(&mut connector.color);
        set(self.width, &mut connector.width);
        set(self.style, &mut connector.style);
        set(self.anchors, &mut connector.anchors);
        self.z_index.apply(&mut connector.z_index);
    }
}

pub fn create_connector(
    id: EntityId,
    patch: ConnectorPatch,
    ctx: &ViewContext,
) -> Result<State, ReducerError> {
    let defaults = &ctx.defaults.connector;
    let next = ctx.edit_view(|view| {
        let mut connector = Connector {
            id,
            description: None,
            color: None,
            width: defaults.width,
            style: defaults.style,
            anchors: SmallVec::new(),
            z_index: None,
        };
        patch.apply_to(&mut connector);
        view.connectors.push(connector);
        Ok(())
    })?;
    log::debug!("created connector {id} in view {}", ctx.view_id);
    Ok(next)
}

pub fn update_connector(
    id: EntityId,
    patch: ConnectorPatch,
    ctx: &ViewContext,
) -> Result<State, ReducerError> {
    let next = ctx.edit_view(|view| {
        let i = position(&view.connectors, id, EntityKind::Connector, |c| c.id)?;
        patch.apply_to(&mut view.connectors[i]);
        Ok(())
    })?;
    log::debug!("updated connector {id}");
    Ok(next)
}

pub fn delete_connector(id: EntityId, ctx: &ViewContext) -> Result<State, ReducerError> {
    let mut next = ctx.edit_view(|view| {
        let i = position(&view.connectors, id, EntityKind::Connector, |c| c.id)?;
        view.connectors.remove(i);
        Ok(())
    })?;
    next.scene.connectors.remove(&id);
    log::debug!("deleted connector {id}");
    Ok(next)
}
