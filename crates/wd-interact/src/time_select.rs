//! Time range selection
//!
//! A press on empty canvas (or a clip body outside envelope mode) anchors a
//! time range. The first move clears clip and label selection; every move
//! then updates the time selection and the covered track range. Starting
//! inside a spectrogram lane also drags a frequency band.

use wd_core::{ClipId, LabelKey, TimeRange, ViewMode};
use wd_state::{Action, EditorState, SpectralSelection};

use crate::{TimelineGeometry, YHit};

/// Spectrogram area of one track, in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralLane {
    pub track_index: usize,
    pub top: f64,
    pub height: f64,
}

impl SpectralLane {
    /// Lane under `(track_index, local_y)`; none in waveform view or below the split
    pub fn at(
        state: &EditorState,
        geometry: &TimelineGeometry,
        track_index: usize,
        local_y: f64,
    ) -> Option<Self> {
        let track = state.track(track_index)?;
        let height = match track.view_mode {
            ViewMode::Waveform => return None,
            ViewMode::Spectrogram => f64::from(track.height),
            ViewMode::Split => f64::from(track.height) * f64::from(track.split_ratio()),
        };
        if local_y < 0.0 || local_y > height || !track.is_audio() {
            return None;
        }
        Some(Self {
            track_index,
            top: geometry.track_top(&state.tracks, track_index),
            height,
        })
    }

    /// Normalized frequency at `y`: 1 at the top of the lane, 0 at the bottom
    pub fn frequency_at(&self, y: f64) -> f64 {
        (1.0 - (y - self.top) / self.height).clamp(0.0, 1.0)
    }
}

/// Selection in place before the drag started
#[derive(Debug, Clone, PartialEq)]
struct PriorSelection {
    time: Option<TimeRange>,
    tracks: Vec<usize>,
    spectral: Option<SpectralSelection>,
    clips: Vec<(usize, ClipId)>,
    labels: Vec<LabelKey>,
}

#[derive(Debug, Clone)]
pub struct TimeSelect {
    anchor_time: f64,
    anchor_track: Option<usize>,
    lane: Option<SpectralLane>,
    anchor_frequency: f64,
    prior: PriorSelection,
    range: Option<TimeRange>,
    tracks: Vec<usize>,
    started: bool,
}

impl TimeSelect {
    pub fn begin(
        state: &EditorState,
        geometry: &TimelineGeometry,
        x: f64,
        y: f64,
        hit: YHit,
    ) -> Self {
        let anchor_track = pointer_track(state, hit);
        let lane = match hit {
            YHit::Track { index, local_y } => SpectralLane::at(state, geometry, index, local_y),
            _ => None,
        };
        Self {
            anchor_time: geometry.x_to_time(x).max(0.0),
            anchor_track,
            lane,
            anchor_frequency: lane.map_or(0.0, |l| l.frequency_at(y)),
            prior: PriorSelection {
                time: state.time_selection,
                tracks: state.selected_track_indices.clone(),
                spectral: state.spectral_selection,
                clips: state.selected_clips(),
                labels: state.selected_label_ids.clone(),
            },
            range: None,
            tracks: Vec::new(),
            started: false,
        }
    }

    pub fn anchor_time(&self) -> f64 {
        self.anchor_time
    }

    pub fn is_spectral(&self) -> bool {
        self.lane.is_some()
    }

    /// Current range, once the pointer has moved
    pub fn range(&self) -> Option<TimeRange> {
        self.range
    }

    pub fn update(
        &mut self,
        state: &EditorState,
        geometry: &TimelineGeometry,
        x: f64,
        y: f64,
        hit: YHit,
    ) -> Vec<Action> {
        let mut actions = Vec::new();
        if !self.started {
            self.started = true;
            actions.push(Action::DeselectAllClips);
            actions.push(Action::SetSelectedLabels(Vec::new()));
        }

        let time = geometry.x_to_time(x).max(0.0);
        let range = TimeRange::ordered(self.anchor_time, time);
        self.range = Some(range);
        actions.push(Action::SetTimeSelection(Some(range)));

        if let (Some(anchor), Some(current)) = (self.anchor_track, pointer_track(state, hit)) {
            self.tracks = (anchor.min(current)..=anchor.max(current)).collect();
            actions.push(Action::SetSelectedTracks(self.tracks.clone()));
        }

        if let Some(lane) = self.lane {
            let frequency = lane.frequency_at(y);
            actions.push(Action::SetSpectralSelection(Some(SpectralSelection {
                start_time: range.start_time,
                end_time: range.end_time,
                min_frequency: self.anchor_frequency.min(frequency),
                max_frequency: self.anchor_frequency.max(frequency),
                track_index: Some(lane.track_index),
            })));
        }
        actions
    }

    /// Release: a plain time drag selects the clips it covers
    pub fn finish(&mut self) -> Vec<Action> {
        match self.range {
            Some(range) if !range.is_empty() && self.lane.is_none() && !self.tracks.is_empty() => {
                vec![Action::SelectClipsInRange {
                    track_indices: self.tracks.clone(),
                    range,
                }]
            }
            _ => Vec::new(),
        }
    }

    /// Restore the selection that existed before the press
    pub fn cancel(&mut self) -> Vec<Action> {
        if !self.started {
            return Vec::new();
        }
        let prior = &self.prior;
        let mut actions = vec![Action::DeselectAllClips];
        actions.extend(prior.clips.iter().map(|&(track_index, clip_id)| {
            Action::ToggleClipSelection {
                track_index,
                clip_id,
            }
        }));
        actions.push(Action::SetSelectedLabels(prior.labels.clone()));
        actions.push(Action::SetTimeSelection(prior.time));
        actions.push(Action::SetSelectedTracks(prior.tracks.clone()));
        actions.push(Action::SetSpectralSelection(prior.spectral));
        actions
    }
}

/// Track under the pointer, pinned to the nearest track outside the bands
fn pointer_track(state: &EditorState, hit: YHit) -> Option<usize> {
    if state.tracks.is_empty() {
        return None;
    }
    match hit {
        YHit::Above => Some(0),
        YHit::Track { index, .. } => Some(index),
        YHit::Gap { after } => Some(after),
        YHit::Below => Some(state.tracks.len() - 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use wd_core::{Clip, Track, TrackId};
    use wd_state::reduce;

    fn geometry() -> TimelineGeometry {
        TimelineGeometry {
            pixels_per_second: 100.0,
            content_offset: 0.0,
            top_offset: 0.0,
            track_gap: 0.0,
            ..TimelineGeometry::default()
        }
    }

    fn state() -> EditorState {
        let mut selected = Clip::new(ClipId(1), "a", 0.0, 1.0);
        selected.selected = true;
        let mut spectral = Track::audio(TrackId(2), "B").with_clips(vec![Clip::new(ClipId(2), "b", 2.0, 2.0)]);
        spectral.view_mode = ViewMode::Spectrogram;
        spectral.height = 100.0;
        let mut first = Track::audio(TrackId(1), "A").with_clips(vec![selected]);
        first.height = 100.0;
        let mut s = EditorState::with_tracks(vec![first, spectral]);
        s.time_selection = Some(TimeRange::ordered(0.0, 1.0));
        s
    }

    fn run(mut state: EditorState, actions: &[Action]) -> EditorState {
        for action in actions {
            state = reduce(&state, action).unwrap();
        }
        state
    }

    #[test]
    fn test_drag_selects_range_and_tracks() {
        let s = state();
        let g = geometry();
        let mut select = TimeSelect::begin(&s, &g, 350.0, 50.0, g.track_at_y(&s.tracks, 50.0));
        assert!(!select.is_spectral());

        let actions = select.update(&s, &g, 150.0, 150.0, g.track_at_y(&s.tracks, 150.0));
        assert_eq!(&actions[..2], &[Action::DeselectAllClips, Action::SetSelectedLabels(vec![])]);
        let s = run(s, &actions);
        assert_eq!(s.selected_clip_count(), 0);
        assert_eq!(s.selected_track_indices, vec![0, 1]);
        let range = s.time_selection.unwrap();
        assert_abs_diff_eq!(range.start_time, 1.5);
        assert_abs_diff_eq!(range.end_time, 3.5);

        // Release picks up the clip the range covers
        let s = run(s, &select.finish());
        assert_eq!(s.selected_clips(), vec![(1, ClipId(2))]);
        assert_eq!(s.time_selection, Some(range));
    }

    #[test]
    fn test_drag_left_of_origin_clamps() {
        let s = state();
        let g = geometry();
        let mut select = TimeSelect::begin(&s, &g, 100.0, 10.0, g.track_at_y(&s.tracks, 10.0));
        let s = run(s.clone(), &select.update(&s, &g, -300.0, 10.0, g.track_at_y(&s.tracks, 10.0)));
        let range = s.time_selection.unwrap();
        assert_abs_diff_eq!(range.start_time, 0.0);
        assert_abs_diff_eq!(range.end_time, 1.0);
    }

    #[test]
    fn test_spectral_lane_drag() {
        let s = state();
        let g = geometry();
        let mut select = TimeSelect::begin(&s, &g, 200.0, 125.0, g.track_at_y(&s.tracks, 125.0));
        assert!(select.is_spectral());
        let s = run(s.clone(), &select.update(&s, &g, 300.0, 175.0, g.track_at_y(&s.tracks, 175.0)));
        let spectral = s.spectral_selection.unwrap();
        assert_abs_diff_eq!(spectral.min_frequency, 0.25);
        assert_abs_diff_eq!(spectral.max_frequency, 0.75);
        assert_eq!(spectral.track_index, Some(1));
        assert!(select.finish().is_empty());
    }

    #[test]
    fn test_cancel_restores_prior_selection() {
        let before = state();
        let g = geometry();
        let mut select = TimeSelect::begin(&before, &g, 200.0, 10.0, g.track_at_y(&before.tracks, 10.0));
        assert!(select.cancel().is_empty());

        let moved = run(before.clone(), &select.update(&before, &g, 400.0, 10.0, g.track_at_y(&before.tracks, 10.0)));
        assert_ne!(moved.time_selection, before.time_selection);

        let restored = run(moved, &select.cancel());
        assert_eq!(restored.selected_clips(), vec![(0, ClipId(1))]);
        assert_eq!(restored.time_selection, before.time_selection);
        assert_eq!(restored.selected_track_indices, before.selected_track_indices);
    }
}
