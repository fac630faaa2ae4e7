use iso_core::config::EditorDefaults;
use iso_core::id::{EntityId, SequentialIds};
use iso_core::model::{Coords, Model, View};
use iso_core::state::State;
use iso_editor::input::InputEvent;
use iso_editor::modes::{ItemControls, Mode, ModeContext, Tool, UiState, arm_icon, handle_event, select_tool};
use iso_editor::store::Store;
use iso_render::hit::{ItemKind, ItemRef};
use pretty_assertions::assert_eq;

const OFFICE: &str = include_str!("fixtures/office_network.json");

struct Session {
    ui: UiState,
    store: Store,
    ids: SequentialIds,
}

impl Session {
    fn open(text: &str) -> Self {
        let model = Model::from_json(text).unwrap();
        let view_id = model.views[0].id;
        Self {
            ui: UiState::new(view_id),
            store: Store::new(State::new(model), EditorDefaults::default()),
            ids: SequentialIds::new("placed"),
        }
    }

    fn event(&mut self, event: InputEvent) {
        let mut ctx = ModeContext {
            ui: &mut self.ui,
            store: &mut self.store,
            ids: &mut self.ids,
            is_renderer_interaction: true,
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

    fn view(&self) -> &View {
        &self.store.state().model.views[0]
    }
}

#[test]
fn placed_icon_goes_above_every_item_including_layers() {
    let mut session = Session::open(OFFICE);
    arm_icon(&mut session.ui, EntityId::intern("printer"));
    session.event(InputEvent::PointerMove { tile: Coords::new(5, -1) });
    session.event(InputEvent::PointerUp { tile: Coords::new(5, -1) });

    let state = session.store.state();
    assert_eq!(state.model.items.len(), 3);
    let created = &state.model.items[2];
    assert_eq!(created.name, "Untitled");
    assert_eq!(created.icon, Some(EntityId::intern("printer")));

    let placed = session.view().items.last().unwrap();
    assert_eq!(placed.id, created.id);
    assert_eq!(placed.tile, Coords::new(5, -1));
    // Highest existing zIndex is 4, on the item inside the `desks` layer.
    assert_eq!(placed.z_index, Some(5));
    assert_eq!(session.ui.mode, Mode::PlaceIcon { id: None });
}

#[test]
fn first_icon_in_empty_view_gets_z_index_one() {
    let mut session = Session::open(
        r#"{ "title": "Blank", "items": [], "views": [{ "id": "main", "name": "Main", "items": [] }] }"#,
    );
    arm_icon(&mut session.ui, EntityId::intern("router"));
    session.event(InputEvent::PointerUp { tile: Coords::ZERO });
    assert_eq!(session.view().items[0].z_index, Some(1));
}

#[test]
fn each_placement_needs_a_fresh_pick() {
    let mut session = Session::open(OFFICE);
    arm_icon(&mut session.ui, EntityId::intern("laptop"));
    session.event(InputEvent::PointerUp { tile: Coords::new(7, 7) });
    session.event(InputEvent::PointerUp { tile: Coords::new(8, 8) });
    assert_eq!(session.store.state().model.items.len(), 3);

    arm_icon(&mut session.ui, EntityId::intern("laptop"));
    session.event(InputEvent::PointerUp { tile: Coords::new(8, 8) });
    let zs: Vec<Option<i32>> = session.view().items.iter().map(|i| i.z_index).collect();
    assert_eq!(zs, vec![Some(2), Some(5), Some(6)]);
}

#[test]
fn unarmed_click_on_item_selects_it() {
    let mut session = Session::open(OFFICE);
    session.tool(Tool::AddItem);
    assert_eq!(session.ui.item_controls, Some(ItemControls::AddItem));

    // laptop-1 sits at (2, 1) in a layer offset by 3.
    session.event(InputEvent::PointerDown { tile: Coords::new(2, 4) });
    assert_eq!(
        session.ui.mode,
        Mode::Cursor {
            mousedown_item: Some(ItemRef::new(ItemKind::Item, EntityId::intern("laptop-1"))),
            show_cursor: true,
        }
    );
    assert_eq!(session.ui.item_controls, None);
    assert_eq!(session.store.state().model.items.len(), 2);
}
