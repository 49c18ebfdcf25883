//! Editor store
//!
//! Owns the current [`EditorState`], runs actions through the reducer and
//! notifies subscribers after each accepted change.

use wd_core::WdResult;

use crate::{reduce, Action, EditorState};

type Subscriber = Box<dyn FnMut(&EditorState)>;

pub struct EditorStore {
    state: EditorState,
    subscribers: Vec<Subscriber>,
    /// Bumped by every accepted content edit
    revision: u64,
}

impl EditorStore {
    pub fn new(state: EditorState) -> Self {
        Self {
            state,
            subscribers: Vec::new(),
            revision: 0,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Apply an action. On rejection the state is left as it was.
    pub fn dispatch(&mut self, action: Action) -> WdResult<()> {
        log::debug!("dispatch {}", action.name());
        match reduce(&self.state, &action) {
            Ok(next) => {
                if next == self.state {
                    return Ok(());
                }
                if action.is_edit() {
                    self.revision += 1;
                }
                self.state = next;
                for subscriber in &mut self.subscribers {
                    subscriber(&self.state);
                }
                Ok(())
            }
            Err(e) => {
                log::warn!("{} rejected: {}", action.name(), e);
                Err(e)
            }
        }
    }

    /// Dispatch a batch, stopping at the first rejection
    pub fn dispatch_all(&mut self, actions: impl IntoIterator<Item = Action>) -> WdResult<()> {
        for action in actions {
            self.dispatch(action)?;
        }
        Ok(())
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&EditorState) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }
}

impl Default for EditorStore {
    fn default() -> Self {
        Self::new(EditorState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use wd_core::{Track, TrackId};

    #[test]
    fn test_rejected_action_keeps_state() {
        let mut store = EditorStore::new(EditorState::with_tracks(vec![Track::audio(TrackId(1), "A")]));
        let before = store.state().clone();
        assert!(store.dispatch(Action::SetFocusedTrack(Some(4))).is_err());
        assert_eq!(store.state(), &before);
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_subscribers_see_changes_only() {
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        let mut store = EditorStore::default();
        store.subscribe(move |_| seen.set(seen.get() + 1));

        store.dispatch(Action::AddTrack(Track::audio(TrackId(1), "A"))).unwrap();
        store.dispatch(Action::SetPlayhead(0.0)).unwrap();
        store.dispatch(Action::SetPlayhead(2.0)).unwrap();

        assert_eq!(calls.get(), 2);
        assert_eq!(store.revision(), 1);
    }
}
