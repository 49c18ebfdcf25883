//! Editor state
//!
//! Single source of truth for the editing surface. The renderer reads it,
//! interaction code derives actions from it, and only the reducer writes it.

use serde::{Deserialize, Serialize};

use wd_core::{Clip, ClipId, Label, LabelId, LabelKey, TimeRange, Track, TrackId, ViewMode};

// ═══════════════════════════════════════════════════════════════════════════════
// MODES
// ═══════════════════════════════════════════════════════════════════════════════

/// How a time-range deletion treats later material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CutMode {
    /// Leave a gap; nothing moves
    #[default]
    Split,
    /// Close the gap; later material shifts left
    Ripple,
}

impl CutMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Split => "Split",
            Self::Ripple => "Ripple",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SELECTION SHAPES
// ═══════════════════════════════════════════════════════════════════════════════

/// Time range plus a frequency band, normalized to `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpectralSelection {
    pub start_time: f64,
    pub end_time: f64,
    pub min_frequency: f64,
    pub max_frequency: f64,
    pub track_index: Option<usize>,
}

/// Extent of the clip currently mirrored on the ruler
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipDurationIndicator {
    pub clip_id: ClipId,
    pub track_index: usize,
    pub start_time: f64,
    pub end_time: f64,
}

impl ClipDurationIndicator {
    pub fn for_clip(track_index: usize, clip: &Clip) -> Self {
        Self {
            clip_id: clip.id,
            track_index,
            start_time: clip.start,
            end_time: clip.end_time(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EDITOR STATE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorState {
    pub tracks: Vec<Track>,
    /// Sorted, deduplicated
    pub selected_track_indices: Vec<usize>,
    pub focused_track_index: Option<usize>,
    pub selected_label_ids: Vec<LabelKey>,
    pub time_selection: Option<TimeRange>,
    pub spectral_selection: Option<SpectralSelection>,
    pub clip_duration_indicator: Option<ClipDurationIndicator>,
    pub playhead_position: f64,
    pub cut_mode: CutMode,
    pub envelope_mode: bool,
    pub spectrogram_mode: bool,
    /// View modes saved while the spectrogram overlay is forced on
    pub view_modes_before_overlay: Option<Vec<ViewMode>>,
    pub is_recording: bool,
    pub recording_track_index: Option<usize>,
}

impl Default for EditorState {
    fn default() -> Self {
        Self {
            tracks: Vec::new(),
            selected_track_indices: Vec::new(),
            focused_track_index: None,
            selected_label_ids: Vec::new(),
            time_selection: None,
            spectral_selection: None,
            clip_duration_indicator: None,
            playhead_position: 0.0,
            cut_mode: CutMode::Split,
            envelope_mode: false,
            spectrogram_mode: false,
            view_modes_before_overlay: None,
            is_recording: false,
            recording_track_index: None,
        }
    }
}

impl EditorState {
    pub fn with_tracks(tracks: Vec<Track>) -> Self {
        let mut state = Self {
            tracks,
            ..Self::default()
        };
        for (index, track) in state.tracks.iter_mut().enumerate() {
            track.set_index(index);
        }
        state
    }

    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Locate a clip anywhere in the project
    pub fn find_clip(&self, id: ClipId) -> Option<(usize, &Clip)> {
        self.tracks
            .iter()
            .enumerate()
            .find_map(|(ti, t)| t.clip(id).map(|c| (ti, c)))
    }

    pub fn clip_at(&self, track_index: usize, id: ClipId) -> Option<&Clip> {
        self.tracks.get(track_index).and_then(|t| t.clip(id))
    }

    pub fn find_label(&self, key: LabelKey) -> Option<&Label> {
        self.tracks
            .get(key.track_index)
            .and_then(|t| t.label_by_id(key.id))
    }

    /// `(track_index, clip_id)` of every selected clip, in track order
    pub fn selected_clips(&self) -> Vec<(usize, ClipId)> {
        self.tracks
            .iter()
            .enumerate()
            .flat_map(|(ti, t)| {
                t.clips
                    .iter()
                    .filter(|c| c.selected)
                    .map(move |c| (ti, c.id))
            })
            .collect()
    }

    pub fn selected_clip_count(&self) -> usize {
        self.tracks
            .iter()
            .map(|t| t.clips.iter().filter(|c| c.selected).count())
            .sum()
    }

    pub fn is_label_selected(&self, key: LabelKey) -> bool {
        self.selected_label_ids.contains(&key)
    }

    pub fn all_tracks_selected(&self) -> bool {
        !self.tracks.is_empty() && self.selected_track_indices.len() == self.tracks.len()
    }

    pub fn max_clip_id(&self) -> u64 {
        self.tracks
            .iter()
            .flat_map(|t| t.clips.iter())
            .map(|c| c.id.0)
            .max()
            .unwrap_or(0)
    }

    /// Fresh clip id (`max existing + 1`)
    pub fn next_clip_id(&self) -> ClipId {
        ClipId(self.max_clip_id() + 1)
    }

    pub fn next_label_id(&self) -> LabelId {
        let max = self
            .tracks
            .iter()
            .flat_map(|t| t.labels.iter())
            .map(|l| l.id.0)
            .max()
            .unwrap_or(0);
        LabelId(max + 1)
    }

    pub fn next_track_id(&self) -> TrackId {
        let max = self.tracks.iter().map(|t| t.id.0).max().unwrap_or(0);
        TrackId(max + 1)
    }

    /// End of the last clip or label in the project
    pub fn project_end(&self) -> f64 {
        self.tracks.iter().map(Track::end_time).fold(0.0_f64, f64::max)
    }

    /// Tracks a time-range edit applies to: the selected ones, or all
    pub fn edit_target_tracks(&self) -> Vec<usize> {
        if self.selected_track_indices.is_empty() {
            (0..self.tracks.len()).collect()
        } else {
            self.selected_track_indices.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> EditorState {
        let mut a = Clip::new(ClipId(4), "a", 0.0, 2.0);
        a.selected = true;
        let b = Clip::new(ClipId(9), "b", 3.0, 1.0);
        EditorState::with_tracks(vec![
            Track::audio(TrackId(1), "Audio 1").with_clips(vec![a]),
            Track::audio(TrackId(2), "Audio 2").with_clips(vec![b]),
        ])
    }

    #[test]
    fn test_lookup_helpers() {
        let state = sample_state();
        assert_eq!(state.find_clip(ClipId(9)).map(|(ti, _)| ti), Some(1));
        assert_eq!(state.selected_clips(), vec![(0, ClipId(4))]);
        assert_eq!(state.next_clip_id(), ClipId(10));
        assert_eq!(state.next_track_id(), TrackId(3));
        assert_eq!(state.project_end(), 4.0);
    }

    #[test]
    fn test_edit_targets_default_to_all() {
        let mut state = sample_state();
        assert_eq!(state.edit_target_tracks(), vec![0, 1]);
        state.selected_track_indices = vec![1];
        assert_eq!(state.edit_target_tracks(), vec![1]);
    }
}
