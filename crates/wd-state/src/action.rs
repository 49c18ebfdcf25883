//! Editor actions
//!
//! Every edit to [`EditorState`](crate::EditorState) is expressed as an
//! `Action`. Pointer controllers and the keyboard dispatcher emit these;
//! the reducer is the only code that applies them.

use wd_core::{Clip, ClipColor, ClipId, EnvelopePoint, LabelKey, TimeRange, Track, ViewMode};

use crate::{CutMode, SpectralSelection, TrackSelectMode};

/// One member of a [`Action::MoveClips`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipMove {
    pub clip_id: ClipId,
    pub from_track: usize,
    pub to_track: usize,
    pub new_start: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── Tracks ───────────────────────────────────────────────────────────────
    AddTrack(Track),
    DeleteTracks(Vec<usize>),
    RenameTrack { index: usize, name: String },
    ReorderTrack { from: usize, to: usize },
    SetTrackHeight { index: usize, height: f32 },
    SetTrackViewMode { index: usize, mode: ViewMode },
    SetChannelSplitRatio { index: usize, ratio: f32 },

    // ── Clips ────────────────────────────────────────────────────────────────
    AddClip { track_index: usize, clip: Clip },
    /// Paste: place clips and make them the clip selection
    InsertClips(Vec<(usize, Clip)>),
    DeleteClips(Vec<(usize, ClipId)>),
    MoveClip {
        clip_id: ClipId,
        from_track: usize,
        to_track: usize,
        new_start: f64,
    },
    /// Group move: derived selections shift once, by the group's delta
    MoveClips(Vec<ClipMove>),
    TrimClip {
        track_index: usize,
        clip_id: ClipId,
        new_trim_start: f64,
        new_duration: f64,
        /// Set when the left edge moves
        new_start: Option<f64>,
    },
    RenameClip { track_index: usize, clip_id: ClipId, name: String },
    SetClipColor { track_index: usize, clip_id: ClipId, color: ClipColor },
    SetClipEnvelope {
        track_index: usize,
        clip_id: ClipId,
        points: Vec<EnvelopePoint>,
    },

    // ── Labels ───────────────────────────────────────────────────────────────
    AddLabel {
        track_index: usize,
        start_time: f64,
        end_time: f64,
        text: String,
    },
    /// Edges are stored as given; callers decide the order
    UpdateLabel { key: LabelKey, start_time: f64, end_time: f64 },
    RenameLabel { key: LabelKey, text: String },
    DeleteLabels(Vec<LabelKey>),

    // ── Selection & focus ────────────────────────────────────────────────────
    SelectClip { track_index: usize, clip_id: ClipId },
    ToggleClipSelection { track_index: usize, clip_id: ClipId },
    /// Select every clip intersecting the range on the given tracks
    SelectClipsInRange { track_indices: Vec<usize>, range: TimeRange },
    DeselectAllClips,
    SetSelectedLabels(Vec<LabelKey>),
    ToggleLabelSelection(LabelKey),
    SetSelectedTracks(Vec<usize>),
    /// Track header click
    SelectTrack { index: usize, mode: TrackSelectMode },
    SetFocusedTrack(Option<usize>),
    SelectAll,
    /// Full deselect: tracks, focus, time, clips, labels
    ClearSelection,
    SetTimeSelection(Option<TimeRange>),
    SetSpectralSelection(Option<SpectralSelection>),

    // ── Editing modes ────────────────────────────────────────────────────────
    DeleteTimeRange { start_time: f64, end_time: f64 },
    SetCutMode(CutMode),
    SetEnvelopeMode(bool),
    SetSpectrogramMode(bool),

    // ── Transport ────────────────────────────────────────────────────────────
    SetPlayhead(f64),
    StartRecording { track_index: usize },
    StopRecording,
}

impl Action {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddTrack(_) => "AddTrack",
            Self::DeleteTracks(_) => "DeleteTracks",
            Self::RenameTrack { .. } => "RenameTrack",
            Self::ReorderTrack { .. } => "ReorderTrack",
            Self::SetTrackHeight { .. } => "SetTrackHeight",
            Self::SetTrackViewMode { .. } => "SetTrackViewMode",
            Self::SetChannelSplitRatio { .. } => "SetChannelSplitRatio",
            Self::AddClip { .. } => "AddClip",
            Self::InsertClips(_) => "InsertClips",
            Self::DeleteClips(_) => "DeleteClips",
            Self::MoveClip { .. } => "MoveClip",
            Self::MoveClips(_) => "MoveClips",
            Self::TrimClip { .. } => "TrimClip",
            Self::RenameClip { .. } => "RenameClip",
            Self::SetClipColor { .. } => "SetClipColor",
            Self::SetClipEnvelope { .. } => "SetClipEnvelope",
            Self::AddLabel { .. } => "AddLabel",
            Self::UpdateLabel { .. } => "UpdateLabel",
            Self::RenameLabel { .. } => "RenameLabel",
            Self::DeleteLabels(_) => "DeleteLabels",
            Self::SelectClip { .. } => "SelectClip",
            Self::ToggleClipSelection { .. } => "ToggleClipSelection",
            Self::SelectClipsInRange { .. } => "SelectClipsInRange",
            Self::DeselectAllClips => "DeselectAllClips",
            Self::SetSelectedLabels(_) => "SetSelectedLabels",
            Self::ToggleLabelSelection(_) => "ToggleLabelSelection",
            Self::SetSelectedTracks(_) => "SetSelectedTracks",
            Self::SelectTrack { .. } => "SelectTrack",
            Self::SetFocusedTrack(_) => "SetFocusedTrack",
            Self::SelectAll => "SelectAll",
            Self::ClearSelection => "ClearSelection",
            Self::SetTimeSelection(_) => "SetTimeSelection",
            Self::SetSpectralSelection(_) => "SetSpectralSelection",
            Self::DeleteTimeRange { .. } => "DeleteTimeRange",
            Self::SetCutMode(_) => "SetCutMode",
            Self::SetEnvelopeMode(_) => "SetEnvelopeMode",
            Self::SetSpectrogramMode(_) => "SetSpectrogramMode",
            Self::SetPlayhead(_) => "SetPlayhead",
            Self::StartRecording { .. } => "StartRecording",
            Self::StopRecording => "StopRecording",
        }
    }

    /// Whether the action changes project content (as opposed to view state)
    pub fn is_edit(&self) -> bool {
        matches!(
            self,
            Self::AddTrack(_)
                | Self::DeleteTracks(_)
                | Self::RenameTrack { .. }
                | Self::ReorderTrack { .. }
                | Self::AddClip { .. }
                | Self::InsertClips(_)
                | Self::DeleteClips(_)
                | Self::MoveClip { .. }
                | Self::MoveClips(_)
                | Self::TrimClip { .. }
                | Self::RenameClip { .. }
                | Self::SetClipColor { .. }
                | Self::SetClipEnvelope { .. }
                | Self::AddLabel { .. }
                | Self::UpdateLabel { .. }
                | Self::RenameLabel { .. }
                | Self::DeleteLabels(_)
                | Self::DeleteTimeRange { .. }
        )
    }
}
