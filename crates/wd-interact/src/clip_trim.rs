//! Clip trim
//!
//! Dragging a clip edge trims that edge without touching the audio. When the
//! grabbed clip is selected, the same delta goes to the matching edge of
//! every other selected clip. Each member clamps independently:
//! - left edge: cannot reveal audio before the recording start, move the
//!   clip before time 0, or shrink it below the minimum duration
//! - right edge: cannot run past the recording end or shrink below the
//!   minimum duration

use wd_core::{ClipId, WdError, WdResult};
use wd_state::{Action, EditorState};

/// Which edge is being trimmed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimEdge {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TrimMember {
    track_index: usize,
    clip_id: ClipId,
    start: f64,
    trim_start: f64,
    duration: f64,
    full_duration: f64,
}

impl TrimMember {
    /// Clamp a shared delta to this clip's limits
    fn clamp(&self, edge: TrimEdge, delta: f64, min_duration: f64) -> f64 {
        let shrink_limit = (self.duration - min_duration).max(0.0);
        match edge {
            TrimEdge::Left => {
                let lower = (-self.trim_start).max(-self.start);
                delta.max(lower).min(shrink_limit)
            }
            TrimEdge::Right => {
                let upper = (self.full_duration - self.trim_start - self.duration).max(0.0);
                delta.min(upper).max(-shrink_limit)
            }
        }
    }

    fn action(&self, edge: TrimEdge, delta: f64) -> Action {
        match edge {
            TrimEdge::Left => Action::TrimClip {
                track_index: self.track_index,
                clip_id: self.clip_id,
                new_trim_start: self.trim_start + delta,
                new_duration: self.duration - delta,
                new_start: Some(self.start + delta),
            },
            TrimEdge::Right => Action::TrimClip {
                track_index: self.track_index,
                clip_id: self.clip_id,
                new_trim_start: self.trim_start,
                new_duration: self.duration + delta,
                new_start: None,
            },
        }
    }
}

/// In-progress edge trim
#[derive(Debug, Clone)]
pub struct ClipTrim {
    edge: TrimEdge,
    members: Vec<TrimMember>,
    origin_x: f64,
    pixels_per_second: f64,
    min_duration: f64,
}

impl ClipTrim {
    pub fn begin(
        state: &EditorState,
        track_index: usize,
        clip_id: ClipId,
        edge: TrimEdge,
        x: f64,
        pixels_per_second: f64,
        min_duration: f64,
    ) -> WdResult<Self> {
        let grabbed = state
            .clip_at(track_index, clip_id)
            .ok_or(WdError::ClipNotFound(clip_id))?;

        let mut targets = vec![(track_index, clip_id)];
        if grabbed.selected {
            targets.extend(
                state
                    .selected_clips()
                    .into_iter()
                    .filter(|&(ti, id)| (ti, id) != (track_index, clip_id)),
            );
        }

        let members: Vec<TrimMember> = targets
            .into_iter()
            .filter_map(|(ti, id)| {
                state.clip_at(ti, id).map(|c| TrimMember {
                    track_index: ti,
                    clip_id: id,
                    start: c.start,
                    trim_start: c.trim_start,
                    duration: c.duration,
                    full_duration: c.full_duration_or_visible(),
                })
            })
            .collect();

        log::debug!("clip trim {:?}: {} member(s)", edge, members.len());
        Ok(Self {
            edge,
            members,
            origin_x: x,
            pixels_per_second,
            min_duration,
        })
    }

    pub fn edge(&self) -> TrimEdge {
        self.edge
    }

    pub fn update(&mut self, x: f64) -> Vec<Action> {
        let delta = (x - self.origin_x) / self.pixels_per_second;
        self.members
            .iter()
            .map(|m| m.action(self.edge, m.clamp(self.edge, delta, self.min_duration)))
            .collect()
    }

    /// Restore every member's pre-gesture window
    pub fn cancel(&mut self) -> Vec<Action> {
        self.members
            .iter()
            .map(|m| Action::TrimClip {
                track_index: m.track_index,
                clip_id: m.clip_id,
                new_trim_start: m.trim_start,
                new_duration: m.duration,
                new_start: Some(m.start),
            })
            .collect()
    }
}
