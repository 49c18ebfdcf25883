//! Envelope point & segment editing
//!
//! Hit priority on press:
//! 1. an existing point within `point_hit_radius` → drag that point
//! 2. the envelope line within `line_hit_band` → add a point and drag it,
//!    or with Alt drag the segment between the two surrounding points
//!
//! Vertical mapping uses the cubic display curve from `wd_core::envelope`.
//! The bottom `silence_zone` pixels of the lane mean `-∞ dB`.

use wd_core::{
    db_at, db_to_normalized, insert_point, normalized_to_db, ClipId, EnvelopePoint,
};
use wd_state::{Action, EditorState};

use crate::{EnvelopeConfig, PointerEvent, TimelineGeometry};

// ═══════════════════════════════════════════════════════════════════════════════
// LEVEL ↔ PIXEL
// ═══════════════════════════════════════════════════════════════════════════════

/// Vertical extent of a clip's envelope lane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeLane {
    pub track_index: usize,
    pub clip_id: ClipId,
    pub clip_start: f64,
    pub clip_duration: f64,
    pub top: f64,
    pub height: f64,
}

impl EnvelopeLane {
    /// Lane covering the clip body below the header
    pub fn for_clip(
        state: &EditorState,
        geometry: &TimelineGeometry,
        track_index: usize,
        clip_id: ClipId,
    ) -> Option<Self> {
        let track = state.track(track_index)?;
        let clip = track.clip(clip_id)?;
        let top = geometry.track_top(&state.tracks, track_index) + geometry.clip_header_height;
        Some(Self {
            track_index,
            clip_id,
            clip_start: clip.start,
            clip_duration: clip.duration,
            top,
            height: (f64::from(track.height) - geometry.clip_header_height).max(1.0),
        })
    }
}

/// Canvas y for a level
pub fn db_to_y(db: f64, top: f64, height: f64, silence_zone: f64) -> f64 {
    let usable = (height - silence_zone).max(0.0);
    if db == f64::NEG_INFINITY {
        return top + height;
    }
    top + (1.0 - db_to_normalized(db)) * usable
}

/// Level for a canvas y; inside the silence zone returns `-∞`
pub fn y_to_db(y: f64, top: f64, height: f64, silence_zone: f64) -> f64 {
    let usable = (height - silence_zone).max(0.0);
    if y > top + usable || usable <= 0.0 {
        return f64::NEG_INFINITY;
    }
    normalized_to_db(1.0 - (y - top) / usable)
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONTROLLER
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq)]
enum EnvelopeGesture {
    Point { index: usize },
    Segment { left: usize, right: usize, origin_y: f64 },
}

/// In-progress envelope edit on one clip
#[derive(Debug, Clone)]
pub struct EnvelopeEdit {
    lane: EnvelopeLane,
    geometry: TimelineGeometry,
    silence_zone: f64,
    gesture: EnvelopeGesture,
    original: Vec<EnvelopePoint>,
    /// Points at gesture start (after an inserted point, if any)
    base: Vec<EnvelopePoint>,
    points: Vec<EnvelopePoint>,
}

impl EnvelopeEdit {
    /// Hit-test a press. `None` when neither a point nor the line is near.
    pub fn begin(
        state: &EditorState,
        lane: EnvelopeLane,
        geometry: &TimelineGeometry,
        config: &EnvelopeConfig,
        event: &PointerEvent,
    ) -> Option<(Self, Vec<Action>)> {
        let clip = state.clip_at(lane.track_index, lane.clip_id)?;
        let original = clip.envelope_points.clone();
        let y_of = |db| db_to_y(db, lane.top, lane.height, config.silence_zone);
        let rel_time = geometry.x_to_time(event.x) - lane.clip_start;

        // 1. Nearest existing point
        let nearest = original
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let px = geometry.time_to_x(lane.clip_start + p.time);
                (i, (px - event.x).hypot(y_of(p.db) - event.y))
            })
            .filter(|(_, dist)| *dist <= config.point_hit_radius)
            .min_by(|a, b| a.1.total_cmp(&b.1));

        let mut points = original.clone();
        let mut actions = Vec::new();
        let gesture = if let Some((index, _)) = nearest {
            EnvelopeGesture::Point { index }
        } else {
            // 2. The line itself
            if rel_time < 0.0 || rel_time > lane.clip_duration {
                return None;
            }
            let line_y = y_of(db_at(&original, rel_time));
            if (event.y - line_y).abs() > config.line_hit_band {
                return None;
            }
            if event.modifiers.alt {
                let right = original.partition_point(|p| p.time <= rel_time);
                if right == 0 || right >= original.len() {
                    return None;
                }
                EnvelopeGesture::Segment {
                    left: right - 1,
                    right,
                    origin_y: event.y,
                }
            } else {
                let db = y_to_db(event.y, lane.top, lane.height, config.silence_zone);
                let index = insert_point(&mut points, EnvelopePoint::new(rel_time, db));
                actions.push(Action::SetClipEnvelope {
                    track_index: lane.track_index,
                    clip_id: lane.clip_id,
                    points: points.clone(),
                });
                EnvelopeGesture::Point { index }
            }
        };

        log::debug!("envelope edit on clip {}: {:?}", lane.clip_id, gesture);
        Some((
            Self {
                lane,
                geometry: *geometry,
                silence_zone: config.silence_zone,
                gesture,
                original,
                base: points.clone(),
                points,
            },
            actions,
        ))
    }

    pub fn points(&self) -> &[EnvelopePoint] {
        &self.points
    }

    pub fn update(&mut self, event: &PointerEvent) -> Vec<Action> {
        let (top, height, zone) = (self.lane.top, self.lane.height, self.silence_zone);
        match self.gesture {
            EnvelopeGesture::Point { index } => {
                // Neighbours bound the time so the list stays ordered
                let lower = index
                    .checked_sub(1)
                    .map_or(0.0, |i| self.base[i].time);
                let upper = self
                    .base
                    .get(index + 1)
                    .map_or(self.lane.clip_duration, |p| p.time);
                let time = (self.geometry.x_to_time(event.x) - self.lane.clip_start)
                    .clamp(lower, upper.max(lower));
                let db = y_to_db(event.y.clamp(top, top + height), top, height, zone);
                self.points[index] = point_at(time, db);
            }
            EnvelopeGesture::Segment {
                left,
                right,
                origin_y,
            } => {
                let dy = event.y - origin_y;
                for i in [left, right] {
                    let base = self.base[i];
                    if base.is_silent() {
                        continue;
                    }
                    let y = (db_to_y(base.db, top, height, zone) + dy).clamp(top, top + height);
                    self.points[i] = point_at(base.time, y_to_db(y, top, height, zone));
                }
            }
        }
        vec![self.envelope_action(self.points.clone())]
    }

    /// Put back the envelope as it was before the press
    pub fn cancel(&mut self) -> Vec<Action> {
        self.points = self.original.clone();
        vec![self.envelope_action(self.original.clone())]
    }

    fn envelope_action(&self, points: Vec<EnvelopePoint>) -> Action {
        Action::SetClipEnvelope {
            track_index: self.lane.track_index,
            clip_id: self.lane.clip_id,
            points,
        }
    }
}

fn point_at(time: f64, db: f64) -> EnvelopePoint {
    if db == f64::NEG_INFINITY {
        EnvelopePoint::silent(time)
    } else {
        EnvelopePoint::new(time, db)
    }
}
