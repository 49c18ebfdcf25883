//! Canvas Controller
//!
//! Routes pointer events on the timeline canvas to gesture controllers.
//! One gesture is active at a time; mouseup always ends it. Clicks that
//! trail a drag are swallowed.

use wd_core::WdResult;
use wd_state::{track_click_selection, Action, EditorState, TrackSelectMode};

use crate::{
    ClickGuard, ClipDrag, ClipTrim, ClipZone, EditorConfig, EnvelopeEdit, EnvelopeLane,
    GesturePhase, GestureTracker, LabelDrag, Modifiers, PointerEvent,
    TimeSelect, TimelineGeometry, TrimEdge, YHit,
};

/// Gesture currently owned by the canvas
#[derive(Debug, Clone)]
pub enum ActiveGesture {
    ClipDrag(ClipDrag),
    ClipTrim(ClipTrim),
    LabelDrag(LabelDrag),
    Envelope(EnvelopeEdit),
    TimeSelect(TimeSelect),
}

impl ActiveGesture {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ClipDrag(_) => "clip drag",
            Self::ClipTrim(_) => "clip trim",
            Self::LabelDrag(_) => "label drag",
            Self::Envelope(_) => "envelope edit",
            Self::TimeSelect(_) => "time select",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CanvasController {
    geometry: TimelineGeometry,
    config: EditorConfig,
    gesture: Option<ActiveGesture>,
    tracker: GestureTracker,
    click_guard: ClickGuard,
}

impl CanvasController {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            geometry: TimelineGeometry::from_config(config),
            config: config.clone(),
            gesture: None,
            tracker: GestureTracker::new(config.editing.drag_threshold),
            click_guard: ClickGuard::default(),
        }
    }

    pub fn geometry(&self) -> &TimelineGeometry {
        &self.geometry
    }

    /// Zoom change; takes effect for the next gesture
    pub fn set_pixels_per_second(&mut self, pixels_per_second: f64) {
        self.geometry.pixels_per_second = pixels_per_second.max(f64::EPSILON);
    }

    pub fn is_active(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn active_gesture(&self) -> Option<&ActiveGesture> {
        self.gesture.as_ref()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // POINTER EVENTS
    // ═══════════════════════════════════════════════════════════════════════

    /// Press: hit-test and arm a gesture. Returns selection actions the grab
    /// implies.
    pub fn mouse_down(&mut self, state: &EditorState, event: &PointerEvent) -> WdResult<Vec<Action>> {
        self.click_guard.reset();
        if self.gesture.is_some() {
            log::debug!("mousedown during active gesture; ending it first");
            self.end_gesture();
        }

        let hit = self.geometry.track_at_y(&state.tracks, event.y);
        let additive = is_additive(&event.modifiers);
        let pps = self.geometry.pixels_per_second;
        let mut actions = Vec::new();

        let gesture = match hit {
            YHit::Track { index, local_y } => {
                let track = &state.tracks[index];
                if track.is_audio() {
                    match self.geometry.hit_clip(track, event.x, local_y) {
                        // Modified clicks only toggle; they never grab
                        Some(_) if additive => None,
                        Some(clip_hit) => match clip_hit.zone {
                            ClipZone::LeftEdge | ClipZone::RightEdge => {
                                let edge = if clip_hit.zone == ClipZone::LeftEdge {
                                    TrimEdge::Left
                                } else {
                                    TrimEdge::Right
                                };
                                Some(ActiveGesture::ClipTrim(ClipTrim::begin(
                                    state,
                                    index,
                                    clip_hit.clip_id,
                                    edge,
                                    event.x,
                                    pps,
                                    self.config.editing.min_clip_duration,
                                )?))
                            }
                            ClipZone::Header => {
                                let (drag, pre) =
                                    ClipDrag::begin(state, index, clip_hit.clip_id, event.x, pps)?;
                                actions = pre;
                                Some(ActiveGesture::ClipDrag(drag))
                            }
                            ClipZone::Body if state.envelope_mode => {
                                let edit = EnvelopeLane::for_clip(state, &self.geometry, index, clip_hit.clip_id)
                                    .and_then(|lane| {
                                        EnvelopeEdit::begin(state, lane, &self.geometry, &self.config.envelope, event)
                                    });
                                match edit {
                                    Some((edit, pre)) => {
                                        actions = pre;
                                        Some(ActiveGesture::Envelope(edit))
                                    }
                                    None => None,
                                }
                            }
                            ClipZone::Body => Some(self.time_select(state, event, hit)),
                        },
                        None => Some(self.time_select(state, event, hit)),
                    }
                } else {
                    match self.geometry.hit_label(track, event.x, local_y) {
                        Some(_) if additive => None,
                        Some(label_hit) => {
                            let (drag, pre) =
                                LabelDrag::begin(state, label_hit.key, label_hit.zone, event.x, pps, false)?;
                            actions = pre;
                            Some(ActiveGesture::LabelDrag(drag))
                        }
                        None => Some(self.time_select(state, event, hit)),
                    }
                }
            }
            YHit::Gap { .. } => Some(self.time_select(state, event, hit)),
            YHit::Above | YHit::Below => None,
        };

        if let Some(gesture) = gesture {
            log::debug!("armed {}", gesture.name());
            self.tracker.press(event);
            self.gesture = Some(gesture);
        }
        Ok(actions)
    }

    pub fn mouse_move(&mut self, state: &EditorState, event: &PointerEvent) -> Vec<Action> {
        if self.gesture.is_none() {
            return Vec::new();
        }
        if self.tracker.motion(event) {
            self.click_guard.mark_moved();
        }
        if self.tracker.phase() != GesturePhase::Dragging {
            return Vec::new();
        }

        let hit = self.geometry.track_at_y(&state.tracks, event.y);
        let geometry = self.geometry;
        match self.gesture.as_mut() {
            Some(ActiveGesture::ClipDrag(drag)) => {
                let pointer_track = match hit {
                    YHit::Track { index, .. } => Some(index),
                    _ => None,
                };
                drag.update(state, event.x, pointer_track)
            }
            Some(ActiveGesture::ClipTrim(trim)) => trim.update(event.x),
            Some(ActiveGesture::LabelDrag(drag)) => drag.update(event.x),
            Some(ActiveGesture::Envelope(edit)) => edit.update(event),
            Some(ActiveGesture::TimeSelect(select)) => {
                select.update(state, &geometry, event.x, event.y, hit)
            }
            None => Vec::new(),
        }
    }

    /// Release always ends the gesture
    pub fn mouse_up(&mut self, _event: &PointerEvent) -> Vec<Action> {
        let dragged = self.tracker.release() == GesturePhase::Dragging;
        match self.gesture.take() {
            Some(ActiveGesture::TimeSelect(mut select)) if dragged => select.finish(),
            Some(gesture) => {
                log::debug!("released {}", gesture.name());
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    /// Escape: undo the active gesture's effects
    pub fn cancel(&mut self) -> Vec<Action> {
        self.tracker.release();
        match self.gesture.take() {
            Some(gesture) => {
                log::debug!("cancelled {}", gesture.name());
                match gesture {
                    ActiveGesture::ClipDrag(mut drag) => drag.cancel(),
                    ActiveGesture::ClipTrim(mut trim) => trim.cancel(),
                    ActiveGesture::LabelDrag(mut drag) => drag.cancel(),
                    ActiveGesture::Envelope(mut edit) => edit.cancel(),
                    ActiveGesture::TimeSelect(mut select) => select.cancel(),
                }
            }
            None => Vec::new(),
        }
    }

    /// Click (press and release without a drag in between)
    pub fn click(&mut self, state: &EditorState, event: &PointerEvent) -> Vec<Action> {
        if self.click_guard.consume() {
            log::trace!("click after drag suppressed");
            return Vec::new();
        }

        let additive = is_additive(&event.modifiers);
        let time = self.geometry.x_to_time(event.x).max(0.0);
        match self.geometry.track_at_y(&state.tracks, event.y) {
            YHit::Below => vec![Action::ClearSelection],
            YHit::Above | YHit::Gap { .. } => Vec::new(),
            YHit::Track { index, local_y } => {
                let track = &state.tracks[index];
                if track.is_audio() {
                    if let Some(hit) = self.geometry.hit_clip(track, event.x, local_y) {
                        let target = (index, hit.clip_id);
                        let mut actions = vec![if additive {
                            Action::ToggleClipSelection {
                                track_index: target.0,
                                clip_id: target.1,
                            }
                        } else {
                            Action::SelectClip {
                                track_index: target.0,
                                clip_id: target.1,
                            }
                        }];
                        if hit.zone == ClipZone::Body && !state.envelope_mode {
                            actions.push(Action::SetPlayhead(time));
                        }
                        return actions;
                    }
                } else if let Some(hit) = self.geometry.hit_label(track, event.x, local_y) {
                    return vec![if additive {
                        Action::ToggleLabelSelection(hit.key)
                    } else {
                        Action::SetSelectedLabels(vec![hit.key])
                    }];
                }
                self.empty_area_click(state, index, &event.modifiers, time)
            }
        }
    }

    fn empty_area_click(
        &self,
        state: &EditorState,
        index: usize,
        modifiers: &Modifiers,
        time: f64,
    ) -> Vec<Action> {
        let mode = if modifiers.shift {
            TrackSelectMode::Range
        } else if modifiers.command() {
            TrackSelectMode::Toggle
        } else {
            TrackSelectMode::Replace
        };
        // Computed before the deselects below wipe the derived track list
        let tracks = track_click_selection(&state.selected_track_indices, index, mode, state.tracks.len());
        vec![
            Action::DeselectAllClips,
            Action::SetSelectedLabels(Vec::new()),
            Action::SetTimeSelection(None),
            Action::SetSelectedTracks(tracks),
            Action::SetFocusedTrack(Some(index)),
            Action::SetPlayhead(time),
        ]
    }

    fn time_select(&self, state: &EditorState, event: &PointerEvent, hit: YHit) -> ActiveGesture {
        ActiveGesture::TimeSelect(TimeSelect::begin(state, &self.geometry, event.x, event.y, hit))
    }

    fn end_gesture(&mut self) {
        self.tracker.release();
        self.gesture = None;
    }
}

#[inline]
fn is_additive(modifiers: &Modifiers) -> bool {
    modifiers.shift || modifiers.command()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use wd_core::{Clip, ClipId, Label, LabelId, LabelKey, Track, TrackId};
    use wd_state::reduce;

    fn config() -> EditorConfig {
        let mut config = EditorConfig::default();
        config.timeline.content_offset = 0.0;
        config.timeline.track_gap = 0.0;
        config
    }

    /// Track 0 audio (y 0..114), track 1 labels (y 114..190)
    fn state() -> EditorState {
        EditorState::with_tracks(vec![
            Track::audio(TrackId(1), "A").with_clips(vec![
                Clip::new(ClipId(1), "a", 1.0, 2.0),
                Clip::new(ClipId(2), "b", 5.0, 2.0),
            ]),
            Track::label(TrackId(2), "L").with_labels(vec![Label::region(LabelId(1), 1, "r", 2.0, 4.0)]),
        ])
    }

    fn run(mut state: EditorState, actions: Vec<Action>) -> EditorState {
        for action in &actions {
            state = reduce(&state, action).unwrap();
        }
        state
    }

    #[test]
    fn test_header_press_drags_clip() {
        let mut canvas = CanvasController::new(&config());
        let s = state();
        let pre = canvas.mouse_down(&s, &PointerEvent::new(200.0, 10.0)).unwrap();
        assert!(matches!(canvas.active_gesture(), Some(ActiveGesture::ClipDrag(_))));
        let s = run(s, pre);

        let s = run(s.clone(), canvas.mouse_move(&s, &PointerEvent::new(250.0, 10.0)));
        assert_abs_diff_eq!(s.tracks[0].clip(ClipId(1)).unwrap().start, 1.5);
        assert!(canvas.mouse_up(&PointerEvent::new(250.0, 10.0)).is_empty());
        assert!(!canvas.is_active());

        // Trailing click is swallowed once
        assert!(canvas.click(&s, &PointerEvent::new(250.0, 10.0)).is_empty());
        assert!(!canvas.click(&s, &PointerEvent::new(250.0, 10.0)).is_empty());
    }

    #[test]
    fn test_edge_press_trims() {
        let mut canvas = CanvasController::new(&config());
        let s = state();
        canvas.mouse_down(&s, &PointerEvent::new(298.0, 50.0)).unwrap();
        assert!(matches!(canvas.active_gesture(), Some(ActiveGesture::ClipTrim(t)) if t.edge() == TrimEdge::Right));
    }

    #[test]
    fn test_click_routes() {
        let mut canvas = CanvasController::new(&config());
        let s = state();

        // Clip body click selects and moves the playhead
        let actions = canvas.click(&s, &PointerEvent::new(150.0, 60.0));
        assert_eq!(
            actions,
            vec![
                Action::SelectClip {
                    track_index: 0,
                    clip_id: ClipId(1)
                },
                Action::SetPlayhead(1.5)
            ]
        );

        // Shift toggles instead
        let shifted = PointerEvent::new(550.0, 10.0).with_modifiers(Modifiers::shift());
        assert_eq!(
            canvas.click(&s, &shifted),
            vec![Action::ToggleClipSelection {
                track_index: 0,
                clip_id: ClipId(2)
            }]
        );

        // Label
        let key = LabelKey::new(1, LabelId(1));
        assert_eq!(
            canvas.click(&s, &PointerEvent::new(300.0, 120.0)),
            vec![Action::SetSelectedLabels(vec![key])]
        );

        // Below every track
        assert_eq!(canvas.click(&s, &PointerEvent::new(300.0, 400.0)), vec![Action::ClearSelection]);
    }

    #[test]
    fn test_empty_area_click_selects_track() {
        let mut canvas = CanvasController::new(&config());
        let mut s = state();
        s.selected_track_indices = vec![0];
        let actions = canvas.click(
            &s,
            &PointerEvent::new(900.0, 150.0).with_modifiers(Modifiers::shift()),
        );
        let s = run(s, actions);
        assert_eq!(s.selected_track_indices, vec![0, 1]);
        assert_eq!(s.focused_track_index, Some(1));
        assert_abs_diff_eq!(s.playhead_position, 9.0);
        assert_eq!(s.time_selection, None);
    }

    #[test]
    fn test_shift_press_does_not_grab() {
        let mut canvas = CanvasController::new(&config());
        let s = state();
        let shifted = PointerEvent::new(200.0, 10.0).with_modifiers(Modifiers::shift());
        assert!(canvas.mouse_down(&s, &shifted).unwrap().is_empty());
        assert!(!canvas.is_active());
    }

    #[test]
    fn test_escape_cancels_label_resize() {
        let mut canvas = CanvasController::new(&config());
        let s = state();
        let pre = canvas.mouse_down(&s, &PointerEvent::new(400.0, 120.0)).unwrap();
        let s = run(s, pre);
        let s = run(s.clone(), canvas.mouse_move(&s, &PointerEvent::new(600.0, 120.0)));
        assert_abs_diff_eq!(s.tracks[1].labels[0].end_time, 6.0);

        let s = run(s, canvas.cancel());
        assert_abs_diff_eq!(s.tracks[1].labels[0].end_time, 4.0);
        assert!(!canvas.is_active());
        assert!(canvas.mouse_up(&PointerEvent::new(600.0, 120.0)).is_empty());
    }
}
