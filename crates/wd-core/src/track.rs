//! Tracks
//!
//! Audio tracks carry clips, label tracks carry labels. A track's position
//! in the project list is its index; labels record that index.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Clip, ClipId, Label, LabelId};

/// Default audio track height (pixels)
pub const DEFAULT_TRACK_HEIGHT: f32 = 114.0;

/// Default label track height (pixels)
pub const DEFAULT_LABEL_TRACK_HEIGHT: f32 = 76.0;

/// Smallest height a track can be resized to (pixels)
pub const MIN_TRACK_HEIGHT: f32 = 44.0;

/// Track identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct TrackId(pub u64);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Track content kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    #[default]
    Audio,
    Label,
}

/// How an audio track renders its clips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Waveform,
    Spectrogram,
    /// Spectrogram above, waveform below; divided by `channel_split_ratio`
    Split,
}

/// A single track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: TrackId,
    pub name: String,
    pub kind: TrackKind,
    pub height: f32,
    #[serde(default)]
    pub view_mode: ViewMode,
    /// Fraction of the height given to the spectrogram in split view
    #[serde(default)]
    pub channel_split_ratio: Option<f32>,
    #[serde(default)]
    pub clips: Vec<Clip>,
    #[serde(default)]
    pub labels: Vec<Label>,
}

impl Track {
    pub fn audio(id: TrackId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            kind: TrackKind::Audio,
            height: DEFAULT_TRACK_HEIGHT,
            view_mode: ViewMode::Waveform,
            channel_split_ratio: None,
            clips: Vec::new(),
            labels: Vec::new(),
        }
    }

    pub fn label(id: TrackId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            kind: TrackKind::Label,
            height: DEFAULT_LABEL_TRACK_HEIGHT,
            view_mode: ViewMode::Waveform,
            channel_split_ratio: None,
            clips: Vec::new(),
            labels: Vec::new(),
        }
    }

    pub fn with_clips(mut self, clips: Vec<Clip>) -> Self {
        self.clips = clips;
        self
    }

    pub fn with_labels(mut self, labels: Vec<Label>) -> Self {
        self.labels = labels;
        self
    }

    #[inline]
    pub fn is_audio(&self) -> bool {
        self.kind == TrackKind::Audio
    }

    #[inline]
    pub fn is_label(&self) -> bool {
        self.kind == TrackKind::Label
    }

    pub fn clip(&self, id: ClipId) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == id)
    }

    pub fn clip_mut(&mut self, id: ClipId) -> Option<&mut Clip> {
        self.clips.iter_mut().find(|c| c.id == id)
    }

    pub fn label_by_id(&self, id: LabelId) -> Option<&Label> {
        self.labels.iter().find(|l| l.id == id)
    }

    pub fn label_by_id_mut(&mut self, id: LabelId) -> Option<&mut Label> {
        self.labels.iter_mut().find(|l| l.id == id)
    }

    /// Latest clip or label end on this track
    pub fn end_time(&self) -> f64 {
        let clips = self.clips.iter().map(Clip::end_time);
        let labels = self.labels.iter().map(|l| l.start_time.max(l.end_time));
        clips.chain(labels).fold(0.0_f64, f64::max)
    }

    /// Fraction of the height used by the spectrogram in split view
    pub fn split_ratio(&self) -> f32 {
        self.channel_split_ratio.unwrap_or(0.5)
    }

    /// Re-stamp labels with this track's position
    pub fn set_index(&mut self, index: usize) {
        for label in &mut self.labels {
            label.track_index = index;
        }
    }
}
