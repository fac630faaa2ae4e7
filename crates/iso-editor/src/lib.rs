pub mod input;
pub mod modes;
pub mod reducers;
pub mod store;

pub use input::InputEvent;
pub use modes::{ItemControls, Mode, ModeContext, Tool, UiState, arm_icon, handle_event, select_tool};
pub use reducers::{Change, EntityKind, ReducerError, ViewContext};
pub use store::{Store, SubscriptionId};
