//! Label drag & resize
//!
//! Body drags move a label as a unit; point labels stay points and region
//! labels keep their duration. Ear drags move one edge, and that edge may
//! cross the other: the label then flips so the dragged edge becomes the
//! opposite boundary.

use wd_core::{LabelKey, WdError, WdResult};
use wd_state::{Action, EditorState};

use crate::LabelZone;

/// In-progress label gesture
#[derive(Debug, Clone)]
pub struct LabelDrag {
    key: LabelKey,
    zone: LabelZone,
    origin_x: f64,
    pixels_per_second: f64,
    initial_start: f64,
    initial_end: f64,
}

impl LabelDrag {
    /// Grab a label. An unselected label becomes the selection (shift adds).
    pub fn begin(
        state: &EditorState,
        key: LabelKey,
        zone: LabelZone,
        x: f64,
        pixels_per_second: f64,
        additive: bool,
    ) -> WdResult<(Self, Vec<Action>)> {
        let label = state.find_label(key).ok_or(WdError::LabelNotFound(key))?;

        let actions = if state.is_label_selected(key) {
            Vec::new()
        } else if additive {
            vec![Action::ToggleLabelSelection(key)]
        } else {
            vec![Action::SetSelectedLabels(vec![key])]
        };

        Ok((
            Self {
                key,
                zone,
                origin_x: x,
                pixels_per_second,
                initial_start: label.start_time,
                initial_end: label.end_time,
            },
            actions,
        ))
    }

    pub fn key(&self) -> LabelKey {
        self.key
    }

    /// New `(start_time, end_time)` for a pointer at `x`
    pub fn edges_at(&self, x: f64) -> (f64, f64) {
        let delta = (x - self.origin_x) / self.pixels_per_second;
        match self.zone {
            LabelZone::Body => {
                let earliest = self.initial_start.min(self.initial_end);
                let d = delta.max(-earliest);
                (self.initial_start + d, self.initial_end + d)
            }
            LabelZone::LeftEar => {
                let moved = (self.initial_start + delta).max(0.0);
                if moved > self.initial_end {
                    (self.initial_end, moved)
                } else {
                    (moved, self.initial_end)
                }
            }
            LabelZone::RightEar => {
                let moved = (self.initial_end + delta).max(0.0);
                if moved < self.initial_start {
                    (moved, self.initial_start)
                } else {
                    (self.initial_start, moved)
                }
            }
        }
    }

    pub fn update(&mut self, x: f64) -> Vec<Action> {
        let (start_time, end_time) = self.edges_at(x);
        vec![Action::UpdateLabel {
            key: self.key,
            start_time,
            end_time,
        }]
    }

    pub fn cancel(&mut self) -> Vec<Action> {
        vec![Action::UpdateLabel {
            key: self.key,
            start_time: self.initial_start,
            end_time: self.initial_end,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use wd_core::{Label, LabelId, Track, TrackId};

    fn state() -> EditorState {
        EditorState::with_tracks(vec![Track::label(TrackId(1), "L").with_labels(vec![
            Label::region(LabelId(1), 0, "r", 2.0, 4.0),
            Label::point(LabelId(2), 0, "p", 1.0),
        ])])
    }

    fn drag(zone: LabelZone, id: u64) -> LabelDrag {
        LabelDrag::begin(&state(), LabelKey::new(0, LabelId(id)), zone, 0.0, 100.0, false)
            .unwrap()
            .0
    }

    #[test]
    fn test_body_move_keeps_shape() {
        let (s, e) = drag(LabelZone::Body, 1).edges_at(150.0);
        assert_abs_diff_eq!(s, 3.5);
        assert_abs_diff_eq!(e, 5.5);

        // Floor at zero keeps the duration
        let (s, e) = drag(LabelZone::Body, 1).edges_at(-500.0);
        assert_abs_diff_eq!(s, 0.0);
        assert_abs_diff_eq!(e, 2.0);

        let (s, e) = drag(LabelZone::Body, 2).edges_at(50.0);
        assert_eq!(s, e);
    }

    #[test]
    fn test_ear_inversion_swaps_edges() {
        // Left ear dragged past the right edge
        let (s, e) = drag(LabelZone::LeftEar, 1).edges_at(300.0);
        assert_abs_diff_eq!(s, 4.0);
        assert_abs_diff_eq!(e, 5.0);

        // Right ear dragged past the left edge
        let (s, e) = drag(LabelZone::RightEar, 1).edges_at(-300.0);
        assert_abs_diff_eq!(s, 1.0);
        assert_abs_diff_eq!(e, 2.0);
    }

    #[test]
    fn test_grab_selects_and_cancel_restores() {
        let key = LabelKey::new(0, LabelId(1));
        let (mut d, pre) = LabelDrag::begin(&state(), key, LabelZone::RightEar, 0.0, 100.0, false).unwrap();
        assert_eq!(pre, vec![Action::SetSelectedLabels(vec![key])]);
        assert_eq!(
            d.cancel(),
            vec![Action::UpdateLabel {
                key,
                start_time: 2.0,
                end_time: 4.0
            }]
        );
    }
}
