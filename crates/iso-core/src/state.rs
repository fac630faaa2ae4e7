//! Editor state: the document plus derived scene lookups.
//!
//! `State` is an immutable-by-convention snapshot. Reducers clone it, apply
//! a delta, and hand back the new snapshot; the old one stays valid.

use crate::id::EntityId;
use crate::model::{AnchorRef, Connector, Coords, Model, View};
use std::collections::HashMap;

/// Guards anchor → anchor chains against cycles.
const MAX_ANCHOR_HOPS: usize = 8;

/// Longest route, in tiles, a connector may walk before it is left unrouted.
pub const MAX_ROUTE_TILES: i64 = 100_000;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct State {
    pub model: Model,
    pub scene: SceneCache,
}

impl State {
    /// Wrap a model and derive its scene cache.
    pub fn new(model: Model) -> Self {
        let scene = SceneCache::build(&model);
        Self { model, scene }
    }
}

/// Tile route of one connector.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectorPath {
    pub tiles: Vec<Coords>,
}

impl ConnectorPath {
    pub fn contains(&self, tile: Coords) -> bool {
        self.tiles.contains(&tile)
    }
}

/// Lookups derived from the model, kept in sync by the connector reducers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SceneCache {
    pub connectors: HashMap<EntityId, ConnectorPath>,
}

impl SceneCache {
    pub fn build(model: &Model) -> Self {
        let mut connectors = HashMap::new();
        for view in &model.views {
            for connector in &view.connectors {
                connectors.insert(connector.id, route_connector(view, connector));
            }
        }
        Self { connectors }
    }

    pub fn connector_path(&self, id: EntityId) -> Option<&ConnectorPath> {
        self.connectors.get(&id)
    }
}

/// Tile where a view item is drawn: its own tile, shifted by the owning
/// layer's z offset when it lives in a layer.
pub fn placed_tile(view: &View, id: EntityId) -> Option<Coords> {
    if let Some(item) = view.items.iter().find(|i| i.id == id) {
        return Some(item.tile);
    }
    view.layers.iter().find_map(|layer| {
        layer
            .items
            .iter()
            .find(|i| i.id == id)
            .map(|item| item.tile.offset_y(layer.z_offset))
    })
}

/// Resolve an anchor target to a tile within `view`.
pub fn resolve_anchor(view: &View, target: &AnchorRef) -> Option<Coords> {
    let mut target = *target;
    for _ in 0..MAX_ANCHOR_HOPS {
        match target {
            AnchorRef::Tile(tile) => return Some(tile),
            AnchorRef::Item(id) => return placed_tile(view, id),
            AnchorRef::Anchor(id) => {
                target = view
                    .connectors
                    .iter()
                    .flat_map(|c| c.anchors.iter())
                    .find(|a| a.id == id)?
                    .target;
            }
        }
    }
    log::warn!("anchor chain in view {} exceeds {MAX_ANCHOR_HOPS} hops", view.id);
    None
}

/// Route a connector through its anchors with orthogonal (x, then y) tile
/// walks. Any unresolved anchor yields an empty path.
pub fn route_connector(view: &View, connector: &Connector) -> ConnectorPath {
    let points: Option<Vec<Coords>> = connector
        .anchors
        .iter()
        .map(|a| resolve_anchor(view, &a.target))
        .collect();
    let Some(points) = points else {
        log::debug!("connector {} has unresolved anchors", connector.id);
        return ConnectorPath::default();
    };

    let length: i64 = points
        .windows(2)
        .map(|pair| manhattan(pair[0], pair[1]))
        .sum();
    if length > MAX_ROUTE_TILES {
        log::warn!(
            "connector {} spans {length} tiles (limit {MAX_ROUTE_TILES}); leaving it unrouted",
            connector.id
        );
        return ConnectorPath::default();
    }

    let mut tiles: Vec<Coords> = Vec::with_capacity(length as usize + 1);
    for pair in points.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let mut cur = from;
        if tiles.last() != Some(&cur) {
            tiles.push(cur);
        }
        while cur.x != to.x {
            cur.x += step_toward(cur.x, to.x);
            tiles.push(cur);
        }
        while cur.y != to.y {
            cur.y += step_toward(cur.y, to.y);
            tiles.push(cur);
        }
    }
    if tiles.is_empty()
        && let Some(only) = points.first()
    {
        tiles.push(*only);
    }
    ConnectorPath { tiles }
}

fn manhattan(a: Coords, b: Coords) -> i64 {
    (i64::from(b.x) - i64::from(a.x)).abs() + (i64::from(b.y) - i64::from(a.y)).abs()
}

/// Unit step from `from` toward `to`; never overflows.
fn step_toward(from: i32, to: i32) -> i32 {
    (to > from) as i32 - (to < from) as i32
}
