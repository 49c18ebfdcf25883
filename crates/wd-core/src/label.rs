//! Labels on label tracks
//!
//! - Point label: `start_time == end_time`
//! - Region label: `end_time > start_time`
//!
//! Selection uses the composite key `(track_index, id)`, written
//! `"<trackIndex>-<id>"`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::WdError;

/// Label identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct LabelId(pub u64);

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Selection key for a label
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelKey {
    pub track_index: usize,
    pub id: LabelId,
}

impl LabelKey {
    pub fn new(track_index: usize, id: LabelId) -> Self {
        Self { track_index, id }
    }
}

impl fmt::Display for LabelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.track_index, self.id)
    }
}

impl FromStr for LabelKey {
    type Err = WdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || WdError::InvalidParam(format!("malformed label key '{s}'"));
        let (track, id) = s.split_once('-').ok_or_else(bad)?;
        let track_index = track.parse::<usize>().map_err(|_| bad())?;
        let id = id.parse::<u64>().map_err(|_| bad())?;
        Ok(Self::new(track_index, LabelId(id)))
    }
}

/// Text annotation on a label track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub id: LabelId,
    /// Position of the owning track; kept in sync when tracks move
    pub track_index: usize,
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
}

impl Label {
    /// Create point label
    pub fn point(id: LabelId, track_index: usize, text: &str, time: f64) -> Self {
        Self {
            id,
            track_index,
            text: text.to_string(),
            start_time: time,
            end_time: time,
        }
    }

    /// Create region label
    pub fn region(id: LabelId, track_index: usize, text: &str, start: f64, end: f64) -> Self {
        Self {
            id,
            track_index,
            text: text.to_string(),
            start_time: start.min(end),
            end_time: start.max(end),
        }
    }

    #[inline]
    pub fn is_point(&self) -> bool {
        self.start_time == self.end_time
    }

    #[inline]
    pub fn duration(&self) -> f64 {
        (self.end_time - self.start_time).abs()
    }

    #[inline]
    pub fn key(&self) -> LabelKey {
        LabelKey::new(self.track_index, self.id)
    }
}
