//! Editor Session
//!
//! Owns the store and the input controllers for one editing surface.
//! Document-level routing (pointer moves and releases, keys) only happens
//! while the session is attached.

use wd_core::WdResult;
use wd_state::{Action, EditorState, EditorStore};

use crate::{
    CanvasController, EditorConfig, KeyChord, KeyboardDispatcher, ListenerGuard, ListenerKind,
    PointerEvent, SharedListenerRegistry, Transport, TransportCommand, EDITOR_LISTENERS,
};

pub struct EditorSession {
    store: EditorStore,
    config: EditorConfig,
    canvas: CanvasController,
    keyboard: KeyboardDispatcher,
    transport: Option<Transport>,
    listeners: SharedListenerRegistry,
    guard: Option<ListenerGuard>,
}

impl EditorSession {
    pub fn new(mut state: EditorState, config: EditorConfig) -> Self {
        state.cut_mode = config.editing.default_cut_mode;
        Self {
            store: EditorStore::new(state),
            canvas: CanvasController::new(&config),
            keyboard: KeyboardDispatcher::new(&config.editing),
            transport: None,
            listeners: SharedListenerRegistry::new(),
            guard: None,
            config,
        }
    }

    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn state(&self) -> &EditorState {
        self.store.state()
    }

    pub fn store(&self) -> &EditorStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut EditorStore {
        &mut self.store
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn canvas(&self) -> &CanvasController {
        &self.canvas
    }

    pub fn keyboard(&self) -> &KeyboardDispatcher {
        &self.keyboard
    }

    pub fn keyboard_mut(&mut self) -> &mut KeyboardDispatcher {
        &mut self.keyboard
    }

    pub fn transport(&self) -> Option<&Transport> {
        self.transport.as_ref()
    }

    /// Registry the host inspects to wire document listeners
    pub fn listeners(&self) -> &SharedListenerRegistry {
        &self.listeners
    }

    pub fn set_zoom(&mut self, pixels_per_second: f64) {
        self.config.timeline.pixels_per_second = pixels_per_second;
        self.canvas.set_pixels_per_second(pixels_per_second);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // LIFECYCLE
    // ═══════════════════════════════════════════════════════════════════════

    pub fn attach(&mut self) {
        if self.guard.is_none() {
            self.guard = Some(self.listeners.attach(&EDITOR_LISTENERS));
            log::info!("editor session attached");
        }
    }

    /// Teardown: cancels any gesture in flight and releases listeners
    pub fn detach(&mut self) -> WdResult<()> {
        let restore = self.canvas.cancel();
        let result = self.apply(restore);
        if self.guard.take().is_some() {
            log::info!("editor session detached");
        }
        result
    }

    pub fn is_attached(&self) -> bool {
        self.guard.is_some()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // INPUT
    // ═══════════════════════════════════════════════════════════════════════

    pub fn mouse_down(&mut self, event: &PointerEvent) -> WdResult<()> {
        let actions = self.canvas.mouse_down(self.store.state(), event)?;
        self.apply(actions)
    }

    pub fn mouse_move(&mut self, event: &PointerEvent) -> WdResult<()> {
        if !self.listeners.is_attached(ListenerKind::MouseMove) {
            return Ok(());
        }
        let actions = self.canvas.mouse_move(self.store.state(), event);
        self.apply(actions)
    }

    pub fn mouse_up(&mut self, event: &PointerEvent) -> WdResult<()> {
        if !self.listeners.is_attached(ListenerKind::MouseUp) {
            return Ok(());
        }
        let actions = self.canvas.mouse_up(event);
        self.apply(actions)
    }

    pub fn click(&mut self, event: &PointerEvent) -> WdResult<()> {
        let actions = self.canvas.click(self.store.state(), event);
        let moved_playhead = actions.iter().any(|a| matches!(a, Action::SetPlayhead(_)));
        self.apply(actions)?;
        if moved_playhead {
            self.seek_to_playhead();
        }
        Ok(())
    }

    /// Returns whether the key was handled
    pub fn key_down(&mut self, chord: KeyChord) -> WdResult<bool> {
        if !self.listeners.is_attached(ListenerKind::KeyDown) {
            return Ok(false);
        }
        let response = self.keyboard.key_down(self.store.state(), chord);
        if response.cancel_gesture {
            let restore = self.canvas.cancel();
            self.apply(restore)?;
        }
        let result = self.apply(response.actions);
        if let Some(command) = response.transport {
            self.run_transport(command);
        }
        result.map(|_| response.handled)
    }

    /// Drain transport events
    pub fn tick(&mut self) -> WdResult<()> {
        let actions = match self.transport.as_mut() {
            Some(transport) => transport.poll(self.store.state()),
            None => return Ok(()),
        };
        self.apply(actions)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // INTERNALS
    // ═══════════════════════════════════════════════════════════════════════

    /// Dispatch in order; a rejected action does not stop the rest.
    /// Returns the first error.
    fn apply(&mut self, actions: Vec<Action>) -> WdResult<()> {
        let mut first_error = None;
        for action in actions {
            if let Err(e) = self.store.dispatch(action) {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Device failures are reported, never fatal; the state stays as it was
    fn run_transport(&mut self, command: TransportCommand) {
        let Some(transport) = self.transport.as_mut() else {
            log::debug!("{:?} ignored: no transport", command);
            return;
        };
        let state = self.store.state();
        let outcome = match command {
            TransportCommand::TogglePlay => transport.toggle_play(state, self.store.revision()).map(|_| Vec::new()),
            TransportCommand::Stop => transport.stop().map(|_| Vec::new()),
            TransportCommand::ToggleRecord if state.is_recording => {
                transport.stop_recording().map(|_| Vec::new())
            }
            TransportCommand::ToggleRecord => transport.start_recording(state),
        };
        match outcome {
            Ok(actions) => {
                if let Err(e) = self.apply(actions) {
                    log::warn!("transport {:?}: {}", command, e);
                }
            }
            Err(e) => log::warn!("transport {:?} failed: {}", command, e),
        }
    }

    fn seek_to_playhead(&mut self) {
        let position = self.store.state().playhead_position;
        if let Some(transport) = self.transport.as_mut().filter(|t| t.is_playing()) {
            if let Err(e) = transport.seek(position) {
                log::warn!("seek failed: {}", e);
            }
        }
    }
}
