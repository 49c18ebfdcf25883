//! Timeline Geometry
//!
//! Pixel ↔ time conversion and hit testing against the region model.
//! Coordinates are relative to the canvas bounding rect.
//!
//! Vertical layout: `top_offset`, then each track's height followed by
//! `track_gap`. Label tracks stack overlapping labels into rows.

use wd_core::{ClipId, Label, LabelKey, Track};

use crate::EditorConfig;

/// Which track band a y coordinate falls in
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum YHit {
    Above,
    Track { index: usize, local_y: f64 },
    /// Gap after track `after`
    Gap { after: usize },
    Below,
}

/// Part of a clip under the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipZone {
    /// Name bar; grabs the clip for dragging
    Header,
    LeftEdge,
    RightEdge,
    /// Waveform area
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipHit {
    pub clip_id: ClipId,
    pub zone: ClipZone,
}

/// Part of a label under the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelZone {
    Body,
    LeftEar,
    RightEar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelHit {
    pub key: LabelKey,
    pub zone: LabelZone,
}

/// Canvas layout parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineGeometry {
    pub pixels_per_second: f64,
    pub content_offset: f64,
    pub top_offset: f64,
    pub track_gap: f64,
    pub clip_header_height: f64,
    pub clip_edge_width: f64,
    pub label_ear_width: f64,
    pub label_row_height: f64,
    pub label_min_spacing: f64,
}

impl Default for TimelineGeometry {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

impl TimelineGeometry {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            pixels_per_second: config.timeline.pixels_per_second.max(f64::EPSILON),
            content_offset: config.timeline.content_offset,
            top_offset: config.timeline.top_offset,
            track_gap: config.timeline.track_gap,
            clip_header_height: config.timeline.clip_header_height,
            clip_edge_width: config.editing.clip_edge_width,
            label_ear_width: config.editing.label_ear_width,
            label_row_height: config.timeline.label_row_height.max(1.0),
            label_min_spacing: config.timeline.label_min_spacing,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Horizontal
    // ─────────────────────────────────────────────────────────────────────────

    /// Time under `x`; negative left of the content origin
    #[inline]
    pub fn x_to_time(&self, x: f64) -> f64 {
        (x - self.content_offset) / self.pixels_per_second
    }

    #[inline]
    pub fn time_to_x(&self, time: f64) -> f64 {
        time * self.pixels_per_second + self.content_offset
    }

    /// Pixel distance as a time delta
    #[inline]
    pub fn dx_to_time(&self, dx: f64) -> f64 {
        dx / self.pixels_per_second
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Vertical
    // ─────────────────────────────────────────────────────────────────────────

    pub fn track_top(&self, tracks: &[Track], index: usize) -> f64 {
        self.top_offset
            + tracks
                .iter()
                .take(index)
                .map(|t| f64::from(t.height) + self.track_gap)
                .sum::<f64>()
    }

    /// Bottom of the last track
    pub fn content_bottom(&self, tracks: &[Track]) -> f64 {
        match tracks.len() {
            0 => self.top_offset,
            n => self.track_top(tracks, n - 1) + f64::from(tracks[n - 1].height),
        }
    }

    pub fn track_at_y(&self, tracks: &[Track], y: f64) -> YHit {
        if y < self.top_offset {
            return YHit::Above;
        }
        let mut top = self.top_offset;
        for (index, track) in tracks.iter().enumerate() {
            let bottom = top + f64::from(track.height);
            if y < bottom {
                return YHit::Track {
                    index,
                    local_y: y - top,
                };
            }
            let next_top = bottom + self.track_gap;
            if y < next_top && index + 1 < tracks.len() {
                return YHit::Gap { after: index };
            }
            top = next_top;
        }
        YHit::Below
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Clips
    // ─────────────────────────────────────────────────────────────────────────

    /// Topmost clip under `(x, local_y)`; later clips draw over earlier ones
    pub fn hit_clip(&self, track: &Track, x: f64, local_y: f64) -> Option<ClipHit> {
        track.clips.iter().rev().find_map(|clip| {
            let left = self.time_to_x(clip.start);
            let right = self.time_to_x(clip.end_time());
            if x < left || x > right {
                return None;
            }
            let edge = self.clip_edge_width.min((right - left) / 2.0);
            let zone = if x - left <= edge && x - left <= right - x {
                ClipZone::LeftEdge
            } else if right - x <= edge {
                ClipZone::RightEdge
            } else if local_y < self.clip_header_height {
                ClipZone::Header
            } else {
                ClipZone::Body
            };
            Some(ClipHit {
                clip_id: clip.id,
                zone,
            })
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Labels
    // ─────────────────────────────────────────────────────────────────────────

    /// Row for each label (same order as `labels`).
    ///
    /// Labels are placed by start time into the first row whose previous
    /// occupant ends at least `label_min_spacing` pixels earlier.
    pub fn label_rows(&self, labels: &[Label]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..labels.len()).collect();
        order.sort_by(|&a, &b| {
            let (la, lb) = (&labels[a], &labels[b]);
            la.start_time
                .min(la.end_time)
                .total_cmp(&lb.start_time.min(lb.end_time))
                .then(la.id.cmp(&lb.id))
        });

        let mut rows = vec![0; labels.len()];
        let mut row_ends: Vec<f64> = Vec::new();
        for index in order {
            let label = &labels[index];
            let left = self.time_to_x(label.start_time.min(label.end_time));
            let right = self
                .time_to_x(label.start_time.max(label.end_time))
                .max(left + self.label_ear_width);

            let row = row_ends
                .iter()
                .position(|&end| end + self.label_min_spacing <= left)
                .unwrap_or(row_ends.len());
            if row == row_ends.len() {
                row_ends.push(right);
            } else {
                row_ends[row] = right;
            }
            rows[index] = row;
        }
        rows
    }

    pub fn hit_label(&self, track: &Track, x: f64, local_y: f64) -> Option<LabelHit> {
        if local_y < 0.0 {
            return None;
        }
        let row = (local_y / self.label_row_height) as usize;
        let rows = self.label_rows(&track.labels);
        let ear = self.label_ear_width;

        track
            .labels
            .iter()
            .zip(rows)
            .rev()
            .filter(|(_, r)| *r == row)
            .find_map(|(label, _)| {
                let start_x = self.time_to_x(label.start_time);
                let end_x = self.time_to_x(label.end_time);
                let zone = if label.is_point() {
                    ((x - start_x).abs() <= ear).then_some(LabelZone::Body)?
                } else if (x - start_x).abs() <= ear {
                    LabelZone::LeftEar
                } else if (x - end_x).abs() <= ear {
                    LabelZone::RightEar
                } else if x > start_x.min(end_x) && x < start_x.max(end_x) {
                    LabelZone::Body
                } else {
                    return None;
                };
                Some(LabelHit {
                    key: label.key(),
                    zone,
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use wd_core::{Clip, LabelId, TrackId};

    fn geometry() -> TimelineGeometry {
        TimelineGeometry {
            pixels_per_second: 100.0,
            content_offset: 10.0,
            top_offset: 0.0,
            track_gap: 2.0,
            clip_header_height: 20.0,
            clip_edge_width: 8.0,
            label_ear_width: 6.0,
            label_row_height: 24.0,
            label_min_spacing: 8.0,
        }
    }

    #[test]
    fn test_time_conversion() {
        let g = geometry();
        assert_abs_diff_eq!(g.x_to_time(210.0), 2.0);
        assert_abs_diff_eq!(g.time_to_x(2.0), 210.0);
        assert!(g.x_to_time(0.0) < 0.0);
    }

    #[test]
    fn test_track_bands() {
        let g = geometry();
        let mut a = Track::audio(TrackId(1), "A");
        a.height = 100.0;
        let mut b = Track::audio(TrackId(2), "B");
        b.height = 50.0;
        let tracks = vec![a, b];

        assert_eq!(g.track_at_y(&tracks, 10.0), YHit::Track { index: 0, local_y: 10.0 });
        assert_eq!(g.track_at_y(&tracks, 101.0), YHit::Gap { after: 0 });
        assert_eq!(g.track_at_y(&tracks, 112.0), YHit::Track { index: 1, local_y: 10.0 });
        assert_eq!(g.track_at_y(&tracks, 160.0), YHit::Below);
        assert_abs_diff_eq!(g.content_bottom(&tracks), 152.0);
    }

    #[test]
    fn test_clip_zones() {
        let g = geometry();
        let track = Track::audio(TrackId(1), "A").with_clips(vec![Clip::new(ClipId(1), "a", 1.0, 2.0)]);
        // Clip spans x 110..310
        let zone = |x, y| g.hit_clip(&track, x, y).map(|h| h.zone);
        assert_eq!(zone(112.0, 50.0), Some(ClipZone::LeftEdge));
        assert_eq!(zone(305.0, 50.0), Some(ClipZone::RightEdge));
        assert_eq!(zone(200.0, 5.0), Some(ClipZone::Header));
        assert_eq!(zone(200.0, 50.0), Some(ClipZone::Body));
        assert_eq!(zone(400.0, 50.0), None);
    }

    #[test]
    fn test_overlapping_labels_stack() {
        let g = geometry();
        let labels = vec![
            Label::region(LabelId(1), 0, "a", 0.0, 2.0),
            Label::region(LabelId(2), 0, "b", 1.0, 3.0),
            Label::region(LabelId(3), 0, "c", 4.0, 5.0),
        ];
        assert_eq!(g.label_rows(&labels), vec![0, 1, 0]);
    }

    #[test]
    fn test_label_ears_and_rows() {
        let g = geometry();
        let track = Track::label(TrackId(1), "L").with_labels(vec![
            Label::region(LabelId(1), 0, "a", 0.0, 2.0),
            Label::region(LabelId(2), 0, "b", 1.0, 3.0),
            Label::point(LabelId(3), 0, "p", 5.0),
        ]);
        let hit = |x, y| g.hit_label(&track, x, y).map(|h| (h.key.id.0, h.zone));
        assert_eq!(hit(12.0, 5.0), Some((1, LabelZone::LeftEar)));
        assert_eq!(hit(100.0, 5.0), Some((1, LabelZone::Body)));
        assert_eq!(hit(308.0, 30.0), Some((2, LabelZone::RightEar)));
        assert_eq!(hit(512.0, 5.0), Some((3, LabelZone::Body)));
        assert_eq!(hit(100.0, 60.0), None);
    }
}
