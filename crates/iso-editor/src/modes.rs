//! Interaction modes.
//!
//! The editor is always in exactly one `Mode`. Pointer events are routed to
//! the handler for the current mode, which may dispatch reducers through the
//! store and switch modes. Every handler matches the full mode enum, so a
//! new mode does not compile until each handler decides what to do with it.
//!
//! Icon placement is the fully specified path:
//!
//! | Event       | `PlaceIcon { id: None }`              | `PlaceIcon { id: Some(icon) }`      |
//! |-------------|---------------------------------------|-------------------------------------|
//! | pointer down| hit-test, switch to `Cursor`          | nothing                             |
//! | pointer up  | nothing                               | create model + view item, disarm    |

use crate::input::InputEvent;
use crate::reducers::model_item::{ModelItemPatch, create_model_item};
use crate::reducers::text_box::{TextBoxPatch, create_text_box};
use crate::reducers::view_item::{ViewItemPatch, create_view_item};
use crate::reducers::{Change, EntityKind, ReducerError, ViewContext, not_found};
use crate::store::Store;
use iso_core::id::{EntityId, IdGenerator};
use iso_core::model::Coords;
use iso_render::hit::{ItemKind, ItemRef, item_at_tile};
use iso_render::order::{ZOrderChange, next_z_index};

// ─── UI state ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Cursor {
        /// Entity under the pointer when the button went down.
        mousedown_item: Option<ItemRef>,
        show_cursor: bool,
    },
    Pan,
    /// `id` is the armed icon; `None` until one is picked.
    PlaceIcon {
        id: Option<EntityId>,
    },
    DragItems {
        items: Vec<ItemRef>,
    },
    RectangleDraw {
        id: Option<EntityId>,
    },
    Connector {
        id: Option<EntityId>,
    },
    TextBox {
        id: Option<EntityId>,
    },
}

impl Default for Mode {
    fn default() -> Self {
        Self::Cursor {
            mousedown_item: None,
            show_cursor: true,
        }
    }
}

/// Which side panel is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemControls {
    Item(ItemRef),
    AddItem,
    LayerControls,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    pub mode: Mode,
    pub item_controls: Option<ItemControls>,
    pub mouse_tile: Coords,
    /// The view being edited.
    pub view_id: EntityId,
}

impl UiState {
    pub fn new(view_id: EntityId) -> Self {
        Self {
            mode: Mode::default(),
            item_controls: None,
            mouse_tile: Coords::ZERO,
            view_id,
        }
    }
}

/// Everything a mode handler may touch.
pub struct ModeContext<'a> {
    pub ui: &'a mut UiState,
    pub store: &'a mut Store,
    pub ids: &'a mut dyn IdGenerator,
    /// The event came from the render surface rather than an overlay.
    pub is_renderer_interaction: bool,
}

// ─── Dispatch ────────────────────────────────────────────────────────────

/// Route `event` to the current mode's handler.
pub fn handle_event(event: InputEvent, ctx: &mut ModeContext) -> Result<(), ReducerError> {
    ctx.ui.mouse_tile = event.tile();
    match ctx.ui.mode.clone() {
        Mode::Cursor { mousedown_item, .. } => cursor(event, mousedown_item, ctx),
        Mode::PlaceIcon { id } => place_icon(event, id, ctx),
        Mode::DragItems { .. } => {
            if let InputEvent::PointerUp { .. } = event {
                ctx.ui.mode = Mode::default();
            }
            Ok(())
        }
        Mode::Pan | Mode::RectangleDraw { .. } | Mode::Connector { .. } | Mode::TextBox { .. } => {
            Ok(())
        }
    }
}

fn hit(ctx: &ModeContext, tile: Coords) -> Option<ItemRef> {
    let state = ctx.store.state();
    let view = state.model.view(ctx.ui.view_id)?;
    item_at_tile(tile, view, &state.scene)
}

fn cursor(
    event: InputEvent,
    mousedown_item: Option<ItemRef>,
    ctx: &mut ModeContext,
) -> Result<(), ReducerError> {
    match event {
        InputEvent::PointerMove { .. } => {}
        InputEvent::PointerDown { tile } => {
            if ctx.is_renderer_interaction {
                let target = hit(ctx, tile);
                ctx.ui.mode = Mode::Cursor {
                    mousedown_item: target,
                    show_cursor: true,
                };
            }
        }
        InputEvent::PointerUp { .. } => {
            ctx.ui.item_controls = mousedown_item.map(ItemControls::Item);
            ctx.ui.mode = Mode::Cursor {
                mousedown_item: None,
                show_cursor: true,
            };
        }
    }
    Ok(())
}

fn place_icon(
    event: InputEvent,
    armed: Option<EntityId>,
    ctx: &mut ModeContext,
) -> Result<(), ReducerError> {
    match (event, armed) {
        (InputEvent::PointerDown { tile }, None) if ctx.is_renderer_interaction => {
            let target = hit(ctx, tile);
            log::debug!("place icon: nothing armed, back to cursor (hit {target:?})");
            ctx.ui.mode = Mode::Cursor {
                mousedown_item: target,
                show_cursor: true,
            };
            ctx.ui.item_controls = None;
        }
        (InputEvent::PointerUp { tile }, Some(icon)) => {
            place(icon, tile, ctx)?;
            ctx.ui.mode = Mode::PlaceIcon { id: None };
        }
        _ => {}
    }
    Ok(())
}

/// Create a model item for `icon` and place it at `tile` above every item
/// already in the view.
fn place(icon: EntityId, tile: Coords, ctx: &mut ModeContext) -> Result<(), ReducerError> {
    let view_id = ctx.ui.view_id;
    let z_index = {
        let view = ctx
            .store
            .state()
            .model
            .view(view_id)
            .ok_or_else(|| not_found(EntityKind::View, view_id))?;
        next_z_index(view.all_items().map(|i| i.z_index), None, ZOrderChange::Front)
    };
    let item_id = ctx.ids.generate();

    // Subscribers see the new item and its placement in one snapshot.
    ctx.store.dispatch(|state, defaults| {
        let with_item = create_model_item(
            item_id,
            ModelItemPatch {
                icon: Change::Set(icon),
                ..ModelItemPatch::default()
            },
            state,
            defaults,
        )?;
        create_view_item(
            item_id,
            ViewItemPatch {
                tile: Some(tile),
                z_index: Change::Set(z_index),
                ..ViewItemPatch::default()
            },
            &ViewContext::new(view_id, &with_item, defaults),
        )
    })?;
    log::debug!("placed icon {icon} as item {item_id} at ({}, {}) z={z_index}", tile.x, tile.y);
    Ok(())
}

// ─── Tool menu ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Select,
    Pan,
    AddItem,
    Rectangle,
    Connector,
    Text,
    Layers,
}

/// Switch modes the way the tool menu does.
pub fn select_tool(tool: Tool, ctx: &mut ModeContext) -> Result<(), ReducerError> {
    match tool {
        Tool::Select => ctx.ui.mode = Mode::default(),
        Tool::Pan => {
            ctx.ui.mode = Mode::Pan;
            ctx.ui.item_controls = None;
        }
        Tool::AddItem => {
            ctx.ui.mode = Mode::PlaceIcon { id: None };
            ctx.ui.item_controls = Some(ItemControls::AddItem);
        }
        Tool::Rectangle => ctx.ui.mode = Mode::RectangleDraw { id: None },
        Tool::Connector => ctx.ui.mode = Mode::Connector { id: None },
        Tool::Text => {
            let id = ctx.ids.generate();
            let tile = ctx.ui.mouse_tile;
            ctx.store.dispatch_in_view(ctx.ui.view_id, |view_ctx| {
                create_text_box(
                    id,
                    TextBoxPatch {
                        tile: Some(tile),
                        ..TextBoxPatch::default()
                    },
                    view_ctx,
                )
            })?;
            ctx.ui.mode = Mode::TextBox { id: Some(id) };
            ctx.ui.item_controls = Some(ItemControls::Item(ItemRef::new(ItemKind::TextBox, id)));
        }
        Tool::Layers => {
            ctx.ui.mode = Mode::default();
            ctx.ui.item_controls = Some(ItemControls::LayerControls);
        }
    }
    Ok(())
}

/// Arm `icon` for placement, as picking it in the icon picker does.
pub fn arm_icon(ui: &mut UiState, icon: EntityId) {
    ui.mode = Mode::PlaceIcon { id: Some(icon) };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducers::testing;
    use iso_core::config::EditorDefaults;
    use iso_core::id::SequentialIds;
    use iso_core::model::{Orientation, TextBox};
    use iso_core::state::State;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Harness {
        ui: UiState,
        store: Store,
        ids: SequentialIds,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                ui: UiState::new(EntityId::intern("view1")),
                store: Store::new(testing::state(), EditorDefaults::default()),
                ids: SequentialIds::new("modes"),
            }
        }

        fn send(&mut self, event: InputEvent, is_renderer_interaction: bool) {
            let mut ctx = ModeContext {
                ui: &mut self.ui,
                store: &mut self.store,
                ids: &mut self.ids,
                is_renderer_interaction,
            };
            handle_event(event, &mut ctx).unwrap();
        }

        fn tool(&mut self, tool: Tool) {
            let mut ctx = ModeContext {
                ui: &mut self.ui,
                store: &mut self.store,
                ids: &mut self.ids,
                is_renderer_interaction: false,
            };
            select_tool(tool, &mut ctx).unwrap();
        }
    }

    #[test]
    fn unarmed_mousedown_returns_to_cursor_with_hit() {
        let mut h = Harness::new();
        h.tool(Tool::AddItem);
        assert_eq!(h.ui.item_controls, Some(ItemControls::AddItem));

        h.send(InputEvent::PointerDown { tile: Coords::ZERO }, true);
        assert_eq!(
            h.ui.mode,
            Mode::Cursor {
                mousedown_item: Some(ItemRef::new(ItemKind::Item, EntityId::intern("item1"))),
                show_cursor: true,
            }
        );
        assert_eq!(h.ui.item_controls, None);
    }

    #[test]
    fn overlay_mousedown_keeps_place_icon() {
        let mut h = Harness::new();
        h.tool(Tool::AddItem);
        h.send(InputEvent::PointerDown { tile: Coords::ZERO }, false);
        assert_eq!(h.ui.mode, Mode::PlaceIcon { id: None });
    }

    #[test]
    fn armed_mouseup_places_and_disarms() {
        let mut h = Harness::new();
        arm_icon(&mut h.ui, EntityId::intern("server"));
        h.send(InputEvent::PointerMove { tile: Coords::new(3, 1) }, true);
        h.send(InputEvent::PointerUp { tile: Coords::new(3, 1) }, true);

        assert_eq!(h.ui.mode, Mode::PlaceIcon { id: None });
        let state = h.store.state();
        let created = state.model.items.last().unwrap();
        assert_eq!(created.name, "Untitled");
        assert_eq!(created.icon, Some(EntityId::intern("server")));

        let placed = state.model.views[0].find_item(created.id).unwrap();
        assert_eq!(placed.tile, Coords::new(3, 1));
        assert_eq!(placed.z_index, Some(1));
        assert_eq!(placed.label_height, Some(80.0));
    }

    #[test]
    fn placement_notifies_subscribers_once() {
        let mut h = Harness::new();
        let seen: Rc<RefCell<Vec<(usize, bool)>>> = Rc::default();
        let log = Rc::clone(&seen);
        h.store.subscribe(move |state| {
            let view = &state.model.views[0];
            let placed = state
                .model
                .items
                .iter()
                .all(|item| view.find_item(item.id).is_some());
            log.borrow_mut().push((state.model.items.len(), placed));
        });

        arm_icon(&mut h.ui, EntityId::intern("server"));
        h.send(InputEvent::PointerUp { tile: Coords::new(3, 1) }, true);

        assert_eq!(*seen.borrow(), vec![(2, true)]);
    }

    #[test]
    fn unarmed_mousedown_on_oversized_text_box() {
        let mut model = testing::state().model;
        model.views[0].text_boxes.push(TextBox {
            id: EntityId::intern("banner"),
            tile: Coords::new(5, 9),
            content: "abc".into(),
            font_size: 1e12,
            orientation: Orientation::X,
            z_index: None,
        });
        let mut h = Harness::new();
        h.store = Store::new(State::new(model), EditorDefaults::default());

        h.tool(Tool::AddItem);
        h.send(InputEvent::PointerDown { tile: Coords::new(9, 9) }, true);
        assert_eq!(
            h.ui.mode,
            Mode::Cursor {
                mousedown_item: Some(ItemRef::new(ItemKind::TextBox, EntityId::intern("banner"))),
                show_cursor: true,
            }
        );
    }

    #[test]
    fn unarmed_mouseup_creates_nothing() {
        let mut h = Harness::new();
        h.tool(Tool::AddItem);
        h.send(InputEvent::PointerUp { tile: Coords::new(3, 1) }, true);
        assert_eq!(h.store.state().model.items.len(), 1);
        assert_eq!(h.ui.mode, Mode::PlaceIcon { id: None });
    }

    #[test]
    fn text_tool_creates_box_at_mouse_tile() {
        let mut h = Harness::new();
        h.send(InputEvent::PointerMove { tile: Coords::new(-2, 5) }, true);
        h.tool(Tool::Text);
        let Mode::TextBox { id: Some(id) } = h.ui.mode else {
            panic!("expected text box mode, got {:?}", h.ui.mode);
        };
        let text_box = &h.store.state().model.views[0].text_boxes[0];
        assert_eq!(text_box.id, id);
        assert_eq!(text_box.tile, Coords::new(-2, 5));
        assert_eq!(text_box.content, "Text");
    }

    #[test]
    fn cursor_click_opens_item_controls() {
        let mut h = Harness::new();
        h.send(InputEvent::PointerDown { tile: Coords::new(2, 2) }, true);
        h.send(InputEvent::PointerUp { tile: Coords::new(2, 2) }, true);
        assert_eq!(
            h.ui.item_controls,
            Some(ItemControls::Item(ItemRef::new(
                ItemKind::Rectangle,
                EntityId::intern("rect1")
            )))
        );
    }
}
