//! The editor store: owns the current `State` snapshot and is the only
//! mutation path.
//!
//! Reducers produce a new snapshot; on success the store swaps it in and
//! notifies subscribers, on failure nothing changes and nobody is notified.
//! Snapshots are `Rc`-shared so readers can hold on to an old one while
//! edits continue.

use crate::reducers::{ReducerError, ViewContext};
use iso_core::config::EditorDefaults;
use iso_core::id::EntityId;
use iso_core::state::State;
use std::fmt;
use std::rc::Rc;

/// Handle returned by [`Store::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&State)>;

pub struct Store {
    current: Rc<State>,
    defaults: EditorDefaults,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl Store {
    pub fn new(state: State, defaults: EditorDefaults) -> Self {
        Self {
            current: Rc::new(state),
            defaults,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Rc<State> {
        Rc::clone(&self.current)
    }

    pub fn state(&self) -> &State {
        &self.current
    }

    pub fn defaults(&self) -> &EditorDefaults {
        &self.defaults
    }

    /// Run a model-level reducer against the current snapshot.
    pub fn dispatch(
        &mut self,
        reducer: impl FnOnce(&State, &EditorDefaults) -> Result<State, ReducerError>,
    ) -> Result<(), ReducerError> {
        let next = reducer(&self.current, &self.defaults)?;
        self.commit(next);
        Ok(())
    }

    /// Run a view-scoped reducer against `view_id` in the current snapshot.
    pub fn dispatch_in_view(
        &mut self,
        view_id: EntityId,
        reducer: impl FnOnce(&ViewContext) -> Result<State, ReducerError>,
    ) -> Result<(), ReducerError> {
        let next = {
            let ctx = ViewContext::new(view_id, &self.current, &self.defaults);
            reducer(&ctx)?
        };
        self.commit(next);
        Ok(())
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&State) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    fn commit(&mut self, next: State) {
        self.current = Rc::new(next);
        log::trace!("store: notifying {} subscriber(s)", self.listeners.len());
        let state: &State = &self.current;
        for (_, listener) in &mut self.listeners {
            listener(state);
        }
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("current", &self.current)
            .field("defaults", &self.defaults)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
