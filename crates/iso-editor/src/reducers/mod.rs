//! Model reducers: pure create/update/delete over `State`.
//!
//! Every reducer takes its input plus a context and returns a brand new
//! `State`, or an error before anything was built. The input snapshot is
//! never touched: reducers clone the aggregate, apply the delta to the
//! clone and hand it back.
//!
//! Patches are partial records. Required fields are `Option<T>` (absent
//! keeps the current value); optional fields are `Change<T>` so "leave
//! alone" and "clear" stay distinct.

pub mod connector;
pub mod layer;
pub mod model_item;
pub mod rectangle;
pub mod text_box;
pub mod view_item;

use iso_core::config::EditorDefaults;
use iso_core::id::EntityId;
use iso_core::model::View;
use iso_core::schema::ValidationError;
use iso_core::state::{State, route_connector};
use serde::{Deserialize, Deserializer};
use std::error::Error;
use std::fmt::{self, Display, Formatter};

// ─── Context ─────────────────────────────────────────────────────────────

/// Everything a view-scoped reducer needs.
#[derive(Debug, Clone, Copy)]
pub struct ViewContext<'a> {
    pub view_id: EntityId,
    pub state: &'a State,
    pub defaults: &'a EditorDefaults,
}

impl<'a> ViewContext<'a> {
    pub fn new(view_id: EntityId, state: &'a State, defaults: &'a EditorDefaults) -> Self {
        Self {
            view_id,
            state,
            defaults,
        }
    }

    /// Copy the state, run `f` against the target view of the copy, and
    /// return the copy with that view's connector routes refreshed. Fails
    /// with `NotFound` if the view is missing.
    pub(crate) fn edit_view(
        &self,
        f: impl FnOnce(&mut View) -> Result<(), ReducerError>,
    ) -> Result<State, ReducerError> {
        let mut next = self.state.clone();
        let view = next
            .model
            .views
            .iter_mut()
            .find(|v| v.id == self.view_id)
            .ok_or_else(|| not_found(EntityKind::View, self.view_id))?;
        f(view)?;
        refresh_routes(&mut next, self.view_id);
        Ok(next)
    }
}

// ─── Errors ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    View,
    Layer,
    Rectangle,
    Connector,
    TextBox,
    ViewItem,
    ModelItem,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::View => "view",
            Self::Layer => "layer",
            Self::Rectangle => "rectangle",
            Self::Connector => "connector",
            Self::TextBox => "text box",
            Self::ViewItem => "view item",
            Self::ModelItem => "model item",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReducerError {
    NotFound { kind: EntityKind, id: EntityId },
    /// A patch value broke a schema constraint.
    Invalid(ValidationError),
    /// A rectangle patch set both `color` and `colorValue`.
    ConflictingFill,
}

impl Display for ReducerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { kind, id } => write!(f, "{kind} `{id}` not found"),
            Self::Invalid(err) => write!(f, "invalid update: {err}"),
            Self::ConflictingFill => {
                f.write_str("a rectangle fill is either a palette color or a color value, not both")
            }
        }
    }
}

impl Error for ReducerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::NotFound { .. } | Self::ConflictingFill => None,
        }
    }
}

impl From<ValidationError> for ReducerError {
    fn from(value: ValidationError) -> Self {
        Self::Invalid(value)
    }
}

pub(crate) fn not_found(kind: EntityKind, id: EntityId) -> ReducerError {
    log::warn!("{kind} {id} not found");
    ReducerError::NotFound { kind, id }
}

/// Index of the entity with `id`, or `NotFound`.
pub(crate) fn position<T>(
    items: &[T],
    id: EntityId,
    kind: EntityKind,
    id_of: impl Fn(&T) -> EntityId,
) -> Result<usize, ReducerError> {
    items
        .iter()
        .position(|item| id_of(item) == id)
        .ok_or_else(|| not_found(kind, id))
}

// ─── Change<T> ───────────────────────────────────────────────────────────

/// Patch value for an optional field.
///
/// Deserializes from a JSON patch as: key absent → `Keep` (needs
/// `#[serde(default)]` on the field), `null` → `Clear`, value → `Set`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Change<T> {
    #[default]
    Keep,
    Clear,
    Set(T),
}

impl<T> Change<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Self::Set(_))
    }

    /// The value being set, if any.
    pub fn as_set(&self) -> Option<&T> {
        match self {
            Self::Set(value) => Some(value),
            Self::Keep | Self::Clear => None,
        }
    }

    /// Write the change into `target`.
    pub fn apply(self, target: &mut Option<T>) {
        match self {
            Self::Keep => {}
            Self::Clear => *target = None,
            Self::Set(value) => *target = Some(value),
        }
    }
}

impl<T> From<Option<T>> for Change<T> {
    /// `Some` sets, `None` clears.
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Clear, Self::Set)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Change<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Change::from)
    }
}

/// Overwrite a required field when the patch supplies it.
pub(crate) fn set<T>(patch: Option<T>, target: &mut T) {
    if let Some(value) = patch {
        *target = value;
    }
}

// ─── Scene cache upkeep ──────────────────────────────────────────────────

/// Re-route every connector in `view_id`. Paths follow their anchors, so
/// any edit to a view can move them.
pub(crate) fn refresh_routes(state: &mut State, view_id: EntityId) {
    let Some(view) = state.model.view(view_id) else {
        return;
    };
    for connector in &view.connectors {
        state
            .scene
            .connectors
            .insert(connector.id, route_connector(view, connector));
    }
}
