//! Clip clipboard
//!
//! Holds copies of clips with their source track. Pasting does not consume
//! the clipboard, so the same content can be pasted repeatedly.

use serde::{Deserialize, Serialize};

use wd_core::{Clip, ClipId, WdError, WdResult};

use crate::EditorState;

/// How the clipboard was filled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipboardOp {
    Copy,
    Cut,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipboardEntry {
    pub track_index: usize,
    pub clip: Clip,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clipboard {
    pub clips: Vec<ClipboardEntry>,
    pub operation: ClipboardOp,
}

impl Clipboard {
    /// Snapshot the selected clips, `None` when nothing is selected
    pub fn copy_selected(state: &EditorState, operation: ClipboardOp) -> Option<Self> {
        let clips: Vec<ClipboardEntry> = state
            .tracks
            .iter()
            .enumerate()
            .flat_map(|(track_index, track)| {
                track
                    .clips
                    .iter()
                    .filter(|c| c.selected)
                    .map(move |clip| ClipboardEntry {
                        track_index,
                        clip: clip.clone(),
                    })
            })
            .collect();
        if clips.is_empty() {
            return None;
        }
        Some(Self { clips, operation })
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Earliest copied start, the paste anchor in time
    pub fn earliest_start(&self) -> f64 {
        self.clips
            .iter()
            .map(|e| e.clip.start)
            .fold(f64::INFINITY, f64::min)
    }

    /// Lowest source track, the paste anchor vertically
    pub fn min_track_index(&self) -> usize {
        self.clips.iter().map(|e| e.track_index).min().unwrap_or(0)
    }

    /// Place the clipboard so its earliest clip starts at `at_time` on
    /// `dest_track`, preserving relative time offsets and track spacing.
    ///
    /// Clips get sequential ids from `first_id`. Entries that would land past
    /// the last track are dropped.
    pub fn paste_layout(
        &self,
        dest_track: usize,
        at_time: f64,
        first_id: ClipId,
        track_count: usize,
    ) -> Vec<(usize, Clip)> {
        let earliest = self.earliest_start();
        let min_track = self.min_track_index();
        let mut next_id = first_id.0;

        let mut out = Vec::with_capacity(self.clips.len());
        for entry in &self.clips {
            let track_index = dest_track + (entry.track_index - min_track);
            if track_index >= track_count {
                log::debug!(
                    "paste: clip {} would land on missing track {}",
                    entry.clip.id,
                    track_index
                );
                continue;
            }
            let mut clip = entry.clip.clone();
            clip.id = ClipId(next_id);
            next_id += 1;
            clip.start = (at_time + (entry.clip.start - earliest)).max(0.0);
            clip.selected = true;
            out.push((track_index, clip));
        }
        out
    }

    pub fn to_json(&self) -> WdResult<String> {
        serde_json::to_string(self).map_err(|e| WdError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> WdResult<Self> {
        serde_json::from_str(json).map_err(|e| WdError::Serialization(e.to_string()))
    }
}
