//! Clip drag
//!
//! Grabbing an unselected clip makes it the exclusive selection and the
//! only member of the drag. Grabbing a selected clip drags every selected
//! clip. All members share one time delta and one track delta:
//! - the time delta is clamped so the left-most member stays at `>= 0`
//! - the track delta is clamped so every member lands on an audio track

use wd_core::{ClipId, WdError, WdResult};
use wd_state::{Action, ClipMove, EditorState};

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragMember {
    clip_id: ClipId,
    initial_track: usize,
    initial_start: f64,
    current_track: usize,
    current_start: f64,
}

/// In-progress clip drag
#[derive(Debug, Clone)]
pub struct ClipDrag {
    grabbed: ClipId,
    members: Vec<DragMember>,
    origin_x: f64,
    origin_track: usize,
    pixels_per_second: f64,
    delta_time: f64,
    delta_track: isize,
}

impl ClipDrag {
    /// Start dragging `clip_id`. Returns the selection actions the grab
    /// implies.
    pub fn begin(
        state: &EditorState,
        track_index: usize,
        clip_id: ClipId,
        x: f64,
        pixels_per_second: f64,
    ) -> WdResult<(Self, Vec<Action>)> {
        let clip = state
            .clip_at(track_index, clip_id)
            .ok_or(WdError::ClipNotFound(clip_id))?;

        let (members, actions): (Vec<DragMember>, Vec<Action>) = if clip.selected {
            let members = state
                .selected_clips()
                .into_iter()
                .filter_map(|(ti, id)| state.clip_at(ti, id).map(|c| member(ti, id, c.start)))
                .collect();
            (members, Vec::new())
        } else {
            (
                vec![member(track_index, clip_id, clip.start)],
                vec![Action::SelectClip {
                    track_index,
                    clip_id,
                }],
            )
        };

        log::debug!("clip drag: {} member(s), grabbed {}", members.len(), clip_id);
        Ok((
            Self {
                grabbed: clip_id,
                members,
                origin_x: x,
                origin_track: track_index,
                pixels_per_second,
                delta_time: 0.0,
                delta_track: 0,
            },
            actions,
        ))
    }

    pub fn grabbed(&self) -> ClipId {
        self.grabbed
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Shared `(delta_time, delta_track)` currently applied
    pub fn delta(&self) -> (f64, isize) {
        (self.delta_time, self.delta_track)
    }

    /// Pointer moved to `x` over `pointer_track` (None outside any track)
    pub fn update(&mut self, state: &EditorState, x: f64, pointer_track: Option<usize>) -> Vec<Action> {
        let raw_time = (x - self.origin_x) / self.pixels_per_second;
        let min_start = self
            .members
            .iter()
            .map(|m| m.initial_start)
            .fold(f64::INFINITY, f64::min);
        self.delta_time = raw_time.max(-min_start);

        if let Some(track) = pointer_track {
            let wanted = track as isize - self.origin_track as isize;
            if self.track_delta_fits(state, wanted) {
                self.delta_track = wanted;
            }
        }

        self.apply(self.delta_time, self.delta_track)
    }

    /// Return every member to where it started
    pub fn cancel(&mut self) -> Vec<Action> {
        self.delta_time = 0.0;
        self.delta_track = 0;
        self.apply(0.0, 0)
    }

    fn track_delta_fits(&self, state: &EditorState, delta: isize) -> bool {
        self.members.iter().all(|m| {
            let target = m.initial_track as isize + delta;
            target >= 0
                && state
                    .track(target as usize)
                    .is_some_and(|t| t.is_audio())
        })
    }

    /// One `MoveClips` per step so derived selections move once
    fn apply(&mut self, delta_time: f64, delta_track: isize) -> Vec<Action> {
        let mut moves = Vec::new();
        for m in &mut self.members {
            let to_track = (m.initial_track as isize + delta_track) as usize;
            let new_start = (m.initial_start + delta_time).max(0.0);
            if to_track == m.current_track && new_start == m.current_start {
                continue;
            }
            moves.push(ClipMove {
                clip_id: m.clip_id,
                from_track: m.current_track,
                to_track,
                new_start,
            });
            m.current_track = to_track;
            m.current_start = new_start;
        }
        if moves.is_empty() {
            Vec::new()
        } else {
            vec![Action::MoveClips(moves)]
        }
    }
}

fn member(track_index: usize, clip_id: ClipId, start: f64) -> DragMember {
    DragMember {
        clip_id,
        initial_track: track_index,
        initial_start: start,
        current_track: track_index,
        current_start: start,
    }
}
