//! Keyboard Command Dispatcher
//!
//! Maps key chords to editor actions. Ignored entirely while a text input
//! has focus.
//!
//! Delete/Backspace resolves against the current selection, first match wins:
//! 1. selected labels (plus the time range when every track is selected)
//! 2. a non-empty time selection, cut with the current cut mode
//! 3. the focused clip together with the selected clips
//! 4. the selected tracks
//!
//! The clipboard lives here, not in the editor state, and survives pastes.

use wd_core::{ClipId, TimeRange, Track};
use wd_state::{Action, Clipboard, ClipboardOp, EditorState, TrackSelectMode};

use crate::{EditingConfig, Modifiers};

/// Keys the dispatcher understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Delete,
    Backspace,
    Enter,
    Escape,
    Tab,
    Space,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyChord {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyChord {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Letter key, case-insensitive
    fn is_char(&self, c: char) -> bool {
        matches!(self.code, KeyCode::Char(k) if k.eq_ignore_ascii_case(&c))
    }
}

/// Requests for the transport, handled outside the reducer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportCommand {
    TogglePlay,
    Stop,
    ToggleRecord,
}

/// Result of one keydown
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyResponse {
    pub actions: Vec<Action>,
    pub transport: Option<TransportCommand>,
    /// Escape: the active pointer gesture should cancel
    pub cancel_gesture: bool,
    /// False lets the key fall through to the host
    pub handled: bool,
}

impl KeyResponse {
    fn actions(actions: Vec<Action>) -> Self {
        Self {
            actions,
            handled: true,
            ..Self::default()
        }
    }

    fn transport(command: TransportCommand) -> Self {
        Self {
            transport: Some(command),
            handled: true,
            ..Self::default()
        }
    }

    fn consumed() -> Self {
        Self {
            handled: true,
            ..Self::default()
        }
    }

    fn ignored() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone)]
pub struct KeyboardDispatcher {
    clipboard: Option<Clipboard>,
    /// Keyboard-focused clip, independent of clip selection
    focused_clip: Option<(usize, ClipId)>,
    nudge_step: f64,
    text_input_focused: bool,
}

impl KeyboardDispatcher {
    pub fn new(config: &EditingConfig) -> Self {
        Self {
            clipboard: None,
            focused_clip: None,
            nudge_step: config.nudge_step.max(f64::EPSILON),
            text_input_focused: false,
        }
    }

    pub fn clipboard(&self) -> Option<&Clipboard> {
        self.clipboard.as_ref()
    }

    pub fn focused_clip(&self) -> Option<(usize, ClipId)> {
        self.focused_clip
    }

    pub fn set_focused_clip(&mut self, clip: Option<(usize, ClipId)>) {
        self.focused_clip = clip;
    }

    pub fn set_text_input_focused(&mut self, focused: bool) {
        self.text_input_focused = focused;
    }

    pub fn key_down(&mut self, state: &EditorState, chord: KeyChord) -> KeyResponse {
        if self.text_input_focused {
            return KeyResponse::ignored();
        }
        // Drop focus on a clip that no longer exists
        if let Some((ti, id)) = self.focused_clip {
            if state.clip_at(ti, id).is_none() {
                self.focused_clip = None;
            }
        }

        let m = chord.modifiers;
        match chord.code {
            KeyCode::Delete | KeyCode::Backspace => self.delete(state),
            KeyCode::Escape => KeyResponse {
                cancel_gesture: true,
                handled: true,
                ..KeyResponse::default()
            },
            KeyCode::Char(_) if m.command() => self.command_chord(state, chord),
            KeyCode::Char(_) if chord.is_char('r') && m.is_empty() => {
                KeyResponse::transport(TransportCommand::ToggleRecord)
            }
            KeyCode::Space if m.shift => KeyResponse::transport(TransportCommand::Stop),
            KeyCode::Space => KeyResponse::transport(TransportCommand::TogglePlay),
            KeyCode::Up => self.move_track_focus(state, -1, false),
            KeyCode::Down => self.move_track_focus(state, 1, false),
            KeyCode::Tab => self.move_track_focus(state, if m.shift { -1 } else { 1 }, true),
            KeyCode::Left if m.shift => self.extend_time_selection(state, -self.nudge_step),
            KeyCode::Right if m.shift => self.extend_time_selection(state, self.nudge_step),
            KeyCode::Left => self.step(state, -1),
            KeyCode::Right => self.step(state, 1),
            KeyCode::Enter => self.toggle_focused(state),
            KeyCode::Home => KeyResponse::actions(vec![Action::SetPlayhead(0.0)]),
            KeyCode::End => KeyResponse::actions(vec![Action::SetPlayhead(state.project_end())]),
            KeyCode::Char(_) => KeyResponse::ignored(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // DELETE
    // ═══════════════════════════════════════════════════════════════════════

    fn delete(&mut self, state: &EditorState) -> KeyResponse {
        let time = state.time_selection.filter(|r| !r.is_empty());

        if !state.selected_label_ids.is_empty() {
            let mut actions = vec![Action::DeleteLabels(state.selected_label_ids.clone())];
            if let Some(range) = time.filter(|_| state.all_tracks_selected()) {
                actions.push(delete_range(range));
            }
            return KeyResponse::actions(actions);
        }

        if let Some(range) = time {
            return KeyResponse::actions(vec![delete_range(range)]);
        }

        let mut targets = state.selected_clips();
        if let Some(focused) = self.focused_clip {
            if !targets.contains(&focused) {
                targets.push(focused);
            }
        }
        if !targets.is_empty() {
            self.focused_clip = self
                .focused_clip
                .and_then(|(ti, id)| nearest_survivor(state, ti, id, &targets));
            return KeyResponse::actions(vec![Action::DeleteClips(targets)]);
        }

        if !state.selected_track_indices.is_empty() {
            self.focused_clip = None;
            return KeyResponse::actions(vec![Action::DeleteTracks(
                state.selected_track_indices.clone(),
            )]);
        }
        KeyResponse::ignored()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // COMMAND CHORDS
    // ═══════════════════════════════════════════════════════════════════════

    fn command_chord(&mut self, state: &EditorState, chord: KeyChord) -> KeyResponse {
        if chord.is_char('c') {
            self.copy(state, ClipboardOp::Copy)
                .map_or_else(KeyResponse::ignored, |_| KeyResponse::consumed())
        } else if chord.is_char('x') {
            match self.copy(state, ClipboardOp::Cut) {
                Some(targets) => KeyResponse::actions(vec![Action::DeleteClips(targets)]),
                None => KeyResponse::ignored(),
            }
        } else if chord.is_char('v') {
            self.paste(state)
        } else if chord.is_char('a') {
            KeyResponse::actions(vec![Action::SelectAll])
        } else if chord.is_char('b') {
            KeyResponse::actions(add_label_actions(state))
        } else {
            KeyResponse::ignored()
        }
    }

    /// Fill the clipboard from the clip selection; returns what was copied
    fn copy(&mut self, state: &EditorState, op: ClipboardOp) -> Option<Vec<(usize, ClipId)>> {
        let clipboard = Clipboard::copy_selected(state, op)?;
        let copied = clipboard
            .clips
            .iter()
            .map(|e| (e.track_index, e.clip.id))
            .collect();
        log::debug!("clipboard {:?}: {} clip(s)", op, clipboard.clips.len());
        self.clipboard = Some(clipboard);
        Some(copied)
    }

    fn paste(&self, state: &EditorState) -> KeyResponse {
        let Some(clipboard) = self.clipboard.as_ref().filter(|c| !c.is_empty()) else {
            return KeyResponse::ignored();
        };
        let dest = state
            .focused_track_index
            .or_else(|| state.selected_track_indices.iter().min().copied())
            .unwrap_or_else(|| clipboard.min_track_index());
        let entries = clipboard.paste_layout(
            dest,
            state.playhead_position,
            state.next_clip_id(),
            state.tracks.len(),
        );
        if entries.is_empty() {
            log::warn!("paste: no destination track at {}", dest);
            return KeyResponse::consumed();
        }
        KeyResponse::actions(vec![Action::InsertClips(entries)])
    }

    // ═══════════════════════════════════════════════════════════════════════
    // FOCUS & NAVIGATION
    // ═══════════════════════════════════════════════════════════════════════

    fn move_track_focus(&mut self, state: &EditorState, step: isize, wrap: bool) -> KeyResponse {
        let count = state.tracks.len();
        if count == 0 {
            return KeyResponse::ignored();
        }
        let next = match state.focused_track_index {
            None if step > 0 => 0,
            None => count - 1,
            Some(current) => {
                let target = current as isize + step;
                if wrap {
                    target.rem_euclid(count as isize) as usize
                } else {
                    target.clamp(0, count as isize - 1) as usize
                }
            }
        };
        self.focused_clip = None;
        KeyResponse::actions(vec![Action::SetFocusedTrack(Some(next))])
    }

    /// Left/Right: cycle clips on the focused track, else nudge the playhead
    fn step(&mut self, state: &EditorState, direction: isize) -> KeyResponse {
        if let Some(track_index) = state.focused_track_index {
            let mut clips: Vec<(f64, ClipId)> = state
                .track(track_index)
                .map(|t| t.clips.iter().map(|c| (c.start, c.id)).collect())
                .unwrap_or_default();
            if !clips.is_empty() {
                clips.sort_by(|a, b| a.0.total_cmp(&b.0));
                let current = self
                    .focused_clip
                    .filter(|(ti, _)| *ti == track_index)
                    .and_then(|(_, id)| clips.iter().position(|(_, c)| *c == id));
                let len = clips.len() as isize;
                let next = match current {
                    Some(pos) => (pos as isize + direction).rem_euclid(len) as usize,
                    None if direction > 0 => 0,
                    None => clips.len() - 1,
                };
                self.focused_clip = Some((track_index, clips[next].1));
                return KeyResponse::consumed();
            }
        }
        let position = (state.playhead_position + direction as f64 * self.nudge_step).max(0.0);
        KeyResponse::actions(vec![Action::SetPlayhead(position)])
    }

    /// Shift+Left/Right: move the far edge of the time selection
    fn extend_time_selection(&self, state: &EditorState, delta: f64) -> KeyResponse {
        let (anchor, edge) = match state.time_selection {
            Some(range) => (range.start_time, range.end_time),
            None => (state.playhead_position, state.playhead_position),
        };
        let edge = (edge + delta).max(0.0);
        KeyResponse::actions(vec![Action::SetTimeSelection(Some(TimeRange::ordered(
            anchor, edge,
        )))])
    }

    fn toggle_focused(&self, state: &EditorState) -> KeyResponse {
        if let Some((track_index, clip_id)) = self.focused_clip {
            return KeyResponse::actions(vec![Action::ToggleClipSelection {
                track_index,
                clip_id,
            }]);
        }
        match state.focused_track_index {
            Some(index) => KeyResponse::actions(vec![Action::SelectTrack {
                index,
                mode: TrackSelectMode::Toggle,
            }]),
            None => KeyResponse::ignored(),
        }
    }
}

fn delete_range(range: TimeRange) -> Action {
    Action::DeleteTimeRange {
        start_time: range.start_time,
        end_time: range.end_time,
    }
}

/// Closest clip by start time on the focused clip's track that survives the delete
fn nearest_survivor(
    state: &EditorState,
    track_index: usize,
    clip_id: ClipId,
    deleted: &[(usize, ClipId)],
) -> Option<(usize, ClipId)> {
    let track = state.track(track_index)?;
    let origin = track.clip(clip_id)?.start;
    track
        .clips
        .iter()
        .filter(|c| !deleted.contains(&(track_index, c.id)))
        .min_by(|a, b| (a.start - origin).abs().total_cmp(&(b.start - origin).abs()))
        .map(|c| (track_index, c.id))
}

/// Label at the time selection (or playhead) on the first label track,
/// creating that track when there is none
fn add_label_actions(state: &EditorState) -> Vec<Action> {
    let (start_time, end_time) = match state.time_selection {
        Some(range) => (range.start_time, range.end_time),
        None => (state.playhead_position, state.playhead_position),
    };
    let mut actions = Vec::new();
    let track_index = match state.tracks.iter().position(Track::is_label) {
        Some(index) => index,
        None => {
            actions.push(Action::AddTrack(Track::label(state.next_track_id(), "Labels")));
            state.tracks.len()
        }
    };
    actions.push(Action::AddLabel {
        track_index,
        start_time,
        end_time,
        text: String::new(),
    });
    actions
}
