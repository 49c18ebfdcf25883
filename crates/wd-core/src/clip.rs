//! Audio clips
//!
//! A clip places a window of an underlying recording on a track:
//! - `start`: timeline position of the first visible sample
//! - `trim_start`: offset into the recording where the window begins
//! - `duration`: visible length
//! - `full_duration`: length of the recording, recorded on first trim
//! - `deleted_regions`: hidden gaps left by ripple cuts inside the clip

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{EnvelopePoint, MIN_CLIP_DURATION};

// ═══════════════════════════════════════════════════════════════════════════════
// CLIP IDS
// ═══════════════════════════════════════════════════════════════════════════════

/// Clip identifier, unique across the project
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct ClipId(pub u64);

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DELETED REGIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Gap hidden inside a clip by a ripple cut
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedRegion {
    /// Offset from the clip's visible start at the time of the cut
    pub start_time: f64,
    pub duration: f64,
}

impl DeletedRegion {
    #[inline]
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLIP COLOR
// ═══════════════════════════════════════════════════════════════════════════════

/// Clip color palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipColor {
    #[default]
    Blue,
    Violet,
    Magenta,
    Red,
    Orange,
    Yellow,
    Green,
    Cyan,
}

impl ClipColor {
    pub const ALL: [ClipColor; 8] = [
        ClipColor::Blue,
        ClipColor::Violet,
        ClipColor::Magenta,
        ClipColor::Red,
        ClipColor::Orange,
        ClipColor::Yellow,
        ClipColor::Green,
        ClipColor::Cyan,
    ];

    /// Palette entry for the n-th track, cycling
    pub fn for_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLIP
// ═══════════════════════════════════════════════════════════════════════════════

/// Audio clip on a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    pub id: ClipId,
    pub name: String,
    /// Timeline position (seconds)
    pub start: f64,
    /// Visible length (seconds)
    pub duration: f64,
    #[serde(default)]
    pub trim_start: f64,
    #[serde(default)]
    pub full_duration: Option<f64>,
    #[serde(default)]
    pub deleted_regions: Vec<DeletedRegion>,
    /// Mono (or mixed-down) peak data
    #[serde(default)]
    pub waveform: Vec<f32>,
    #[serde(default)]
    pub waveform_left: Option<Vec<f32>>,
    #[serde(default)]
    pub waveform_right: Option<Vec<f32>>,
    #[serde(default)]
    pub envelope_points: Vec<EnvelopePoint>,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub color: ClipColor,
}

impl Clip {
    pub fn new(id: ClipId, name: &str, start: f64, duration: f64) -> Self {
        debug_assert!(duration > 0.0, "clip duration must be positive");
        Self {
            id,
            name: name.to_string(),
            start: start.max(0.0),
            duration: duration.max(MIN_CLIP_DURATION),
            trim_start: 0.0,
            full_duration: None,
            deleted_regions: Vec::new(),
            waveform: Vec::new(),
            waveform_left: None,
            waveform_right: None,
            envelope_points: Vec::new(),
            selected: false,
            color: ClipColor::default(),
        }
    }

    pub fn with_waveform(mut self, waveform: Vec<f32>) -> Self {
        self.waveform = waveform;
        self
    }

    pub fn with_stereo(mut self, left: Vec<f32>, right: Vec<f32>) -> Self {
        self.waveform_left = Some(left);
        self.waveform_right = Some(right);
        self
    }

    pub fn with_color(mut self, color: ClipColor) -> Self {
        self.color = color;
        self
    }

    pub fn with_envelope(mut self, points: Vec<EnvelopePoint>) -> Self {
        self.envelope_points = points;
        self
    }

    #[inline]
    pub fn end_time(&self) -> f64 {
        self.start + self.duration
    }

    /// Length of the underlying recording as far as trims are concerned.
    ///
    /// Before the first trim this is the visible extent.
    #[inline]
    pub fn full_duration_or_visible(&self) -> f64 {
        self.full_duration
            .unwrap_or(self.trim_start + self.duration)
    }

    /// Latest recording offset the right edge may reveal
    #[inline]
    pub fn max_trim_end(&self) -> f64 {
        self.full_duration_or_visible()
    }

    #[inline]
    pub fn overlaps(&self, start_time: f64, end_time: f64) -> bool {
        self.start < end_time && self.end_time() > start_time
    }

    #[inline]
    pub fn is_stereo(&self) -> bool {
        self.waveform_left.is_some() && self.waveform_right.is_some()
    }

    /// Total audio hidden by ripple cuts
    pub fn deleted_duration(&self) -> f64 {
        self.deleted_regions.iter().map(|r| r.duration).sum()
    }
}
