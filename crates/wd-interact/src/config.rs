//! Editor Configuration
//!
//! Persistent settings for the editing surface:
//! - Timeline geometry (zoom, offsets, track gaps)
//! - Editing behaviour (nudge step, grab widths, default cut mode)
//! - Envelope hit-testing radii
//! - Recording defaults

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use wd_core::{ClipColor, WdError, WdResult, MIN_CLIP_DURATION};
use wd_state::CutMode;

/// Editor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub timeline: TimelineConfig,
    pub editing: EditingConfig,
    pub envelope: EnvelopeConfig,
    pub recording: RecordingConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            timeline: TimelineConfig::default(),
            editing: EditingConfig::default(),
            envelope: EnvelopeConfig::default(),
            recording: RecordingConfig::default(),
        }
    }
}

/// Timeline geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Zoom (pixels per second)
    pub pixels_per_second: f64,
    /// Left padding before time 0 (pixels)
    pub content_offset: f64,
    /// Space above the first track (pixels)
    pub top_offset: f64,
    /// Vertical gap between tracks (pixels)
    pub track_gap: f64,
    /// Height of the clip name bar (pixels)
    pub clip_header_height: f64,
    /// Height of one label row on a label track (pixels)
    pub label_row_height: f64,
    /// Minimum pixel gap between stacked labels in one row
    pub label_min_spacing: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            pixels_per_second: 100.0,
            content_offset: 12.0,
            top_offset: 0.0,
            track_gap: 2.0,
            clip_header_height: 20.0,
            label_row_height: 24.0,
            label_min_spacing: 8.0,
        }
    }
}

/// Editing behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditingConfig {
    /// Shortest clip a trim may leave (seconds)
    pub min_clip_duration: f64,
    /// Arrow-key playhead step (seconds)
    pub nudge_step: f64,
    /// Width of the trim handle at each clip edge (pixels)
    pub clip_edge_width: f64,
    /// Width of the resize ear at each region-label edge (pixels)
    pub label_ear_width: f64,
    /// Pointer travel before a press becomes a drag (pixels)
    pub drag_threshold: f64,
    pub default_cut_mode: CutMode,
}

impl Default for EditingConfig {
    fn default() -> Self {
        Self {
            min_clip_duration: MIN_CLIP_DURATION,
            nudge_step: 0.1,
            clip_edge_width: 8.0,
            label_ear_width: 6.0,
            drag_threshold: 0.0,
            default_cut_mode: CutMode::Split,
        }
    }
}

/// Envelope hit-testing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvelopeConfig {
    /// Grab radius around an existing point (pixels)
    pub point_hit_radius: f64,
    /// Band around the envelope line that adds a point (pixels)
    pub line_hit_band: f64,
    /// Rows at the bottom of the lane that mean silence (pixels)
    pub silence_zone: f64,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            point_hit_radius: 6.0,
            line_hit_band: 10.0,
            silence_zone: 1.0,
        }
    }
}

/// Recording defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    pub sample_rate: u32,
    /// Peak values kept per second of recorded audio
    pub peaks_per_second: u32,
    pub clip_color: ClipColor,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            peaks_per_second: 100,
            clip_color: ClipColor::Red,
        }
    }
}

impl EditorConfig {
    /// Load from the standard location
    pub fn load() -> Self {
        Self::load_from(Self::default_path())
    }

    /// Load from `path`, falling back to defaults
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                log::warn!("ignoring malformed config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> WdResult<()> {
        self.save_to(Self::default_path())
    }

    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> WdResult<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        let json =
            serde_json::to_string_pretty(self).map_err(|e| WdError::Serialization(e.to_string()))?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("wavedesk"))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("editor.json")
    }
}
