//! Cut Engine
//!
//! Pure functions that delete a time range from clip lists:
//! - Split cut: remove audio, leave the gap, never move other clips
//! - Ripple cut: remove audio and pull everything after the range left
//!
//! Each clip is classified against the deletion range into one of five
//! cases (no overlap, contained, deletion inside, overlaps front, overlaps
//! back). Split turns an inside deletion into two clips; ripple keeps one
//! clip and records the hole in `deleted_regions`.

use wd_core::{shift_points, Clip, ClipId, DeletedRegion, EnvelopePoint, TimeRange, Track, WdResult};

use crate::CutMode;

// ═══════════════════════════════════════════════════════════════════════════════
// ENTRY POINT
// ═══════════════════════════════════════════════════════════════════════════════

/// Delete `[start_time, end_time)` from the affected tracks.
///
/// Tracks not listed in `affected` (and label tracks) are returned as-is.
/// Rejects empty or inverted ranges.
pub fn apply_cut(
    tracks: &[Track],
    start_time: f64,
    end_time: f64,
    mode: CutMode,
    affected: &[usize],
) -> WdResult<Vec<Track>> {
    let range = TimeRange::new(start_time, end_time)?;

    // Split ids are minted past every clip in the project, not just this track
    let mut next_id = tracks
        .iter()
        .flat_map(|t| t.clips.iter())
        .map(|c| c.id.0)
        .max()
        .unwrap_or(0)
        + 1;

    let result = tracks
        .iter()
        .enumerate()
        .map(|(index, track)| {
            if !affected.contains(&index) || !track.is_audio() {
                return track.clone();
            }
            let mut track = track.clone();
            track.clips = match mode {
                CutMode::Split => apply_split_cut(&track.clips, range, &mut next_id),
                CutMode::Ripple => apply_ripple_cut(&track.clips, range),
            };
            track
        })
        .collect();

    log::debug!(
        "{} cut [{:.3}, {:.3}) over tracks {:?}",
        mode.name(),
        range.start_time,
        range.end_time,
        affected
    );
    Ok(result)
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLASSIFICATION
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Overlap {
    /// Clip entirely before the range
    Before,
    /// Clip entirely after the range
    After,
    /// Range covers the whole clip
    Contains,
    /// Range strictly inside the clip
    Inside,
    /// Range covers the clip's start only
    Front,
    /// Range covers the clip's end only
    Back,
}

fn classify(clip: &Clip, range: TimeRange) -> Overlap {
    let (cs, ce) = (clip.start, clip.end_time());
    if ce <= range.start_time {
        Overlap::Before
    } else if cs >= range.end_time {
        Overlap::After
    } else if range.start_time <= cs && range.end_time >= ce {
        Overlap::Contains
    } else if range.start_time > cs && range.end_time < ce {
        Overlap::Inside
    } else if range.start_time <= cs {
        Overlap::Front
    } else {
        Overlap::Back
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SPLIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Split-cut one track's clips. `next_id` advances once per split.
pub fn apply_split_cut(clips: &[Clip], range: TimeRange, next_id: &mut u64) -> Vec<Clip> {
    let mut out = Vec::with_capacity(clips.len() + 1);
    for clip in clips {
        match classify(clip, range) {
            Overlap::Before | Overlap::After => out.push(clip.clone()),
            Overlap::Contains => {}
            Overlap::Inside => {
                let (left, right) = split_around(clip, range, ClipId(*next_id));
                *next_id += 1;
                out.push(left);
                out.push(right);
            }
            Overlap::Front => out.push(trim_front(clip, range, range.end_time)),
            Overlap::Back => out.push(trim_back(clip, range)),
        }
    }
    out
}

/// Two clips either side of an inside deletion.
///
/// The left part keeps the id. The right part starts at the range end; its
/// `trim_start`, envelope points and deleted regions advance by the deleted
/// span.
fn split_around(clip: &Clip, range: TimeRange, right_id: ClipId) -> (Clip, Clip) {
    let deleted = range.duration();
    let left_duration = range.start_time - clip.start;
    let right_offset = range.end_time - clip.start;
    let ceiling = clip.full_duration_or_visible();

    let mut left = clip.clone();
    left.duration = left_duration;
    left.full_duration = Some(ceiling);
    left.envelope_points = clip
        .envelope_points
        .iter()
        .copied()
        .filter(|p| p.time <= left_duration)
        .collect();
    left.deleted_regions = clip
        .deleted_regions
        .iter()
        .copied()
        .filter(|r| r.start_time < left_duration)
        .collect();

    let mut right = clip.clone();
    right.id = right_id;
    right.start = range.end_time;
    right.duration = clip.end_time() - range.end_time;
    right.trim_start = clip.trim_start + deleted;
    right.full_duration = Some(ceiling.max(right.trim_start + right.duration));
    right.envelope_points = clip
        .envelope_points
        .iter()
        .filter(|p| p.time >= right_offset)
        .map(|p| EnvelopePoint {
            time: p.time - deleted,
            db: p.db,
        })
        .collect();
    right.deleted_regions = clip
        .deleted_regions
        .iter()
        .filter(|r| r.start_time >= right_offset)
        .map(|r| DeletedRegion {
            start_time: r.start_time - deleted,
            duration: r.duration,
        })
        .collect();

    (left, right)
}

/// Remove the part of `clip` covered by a range over its start, placing the
/// survivor at `new_start`
fn trim_front(clip: &Clip, range: TimeRange, new_start: f64) -> Clip {
    let overlap = range.end_time - clip.start;
    let mut out = clip.clone();
    out.full_duration = Some(clip.full_duration_or_visible());
    out.start = new_start.max(0.0);
    out.duration = clip.duration - overlap;
    out.trim_start = clip.trim_start + overlap;
    out.envelope_points = shift_points(&clip.envelope_points, -overlap);
    out.deleted_regions = clip
        .deleted_regions
        .iter()
        .map(|r| DeletedRegion {
            start_time: r.start_time - overlap,
            duration: r.duration,
        })
        .filter(|r| r.start_time >= 0.0)
        .collect();
    out
}

/// Remove the part of `clip` covered by a range over its end
fn trim_back(clip: &Clip, range: TimeRange) -> Clip {
    let new_duration = range.start_time - clip.start;
    let mut out = clip.clone();
    out.full_duration = Some(clip.full_duration_or_visible());
    out.duration = new_duration;
    out.envelope_points.retain(|p| p.time <= new_duration);
    out.deleted_regions.retain(|r| r.start_time < new_duration);
    out
}

// ═══════════════════════════════════════════════════════════════════════════════
// RIPPLE
// ═══════════════════════════════════════════════════════════════════════════════

/// Ripple-cut one track's clips
pub fn apply_ripple_cut(clips: &[Clip], range: TimeRange) -> Vec<Clip> {
    let deleted = range.duration();
    clips
        .iter()
        .filter_map(|clip| match classify(clip, range) {
            Overlap::Before => Some(clip.clone()),
            Overlap::After => {
                let mut out = clip.clone();
                out.start = (clip.start - deleted).max(0.0);
                Some(out)
            }
            Overlap::Contains => None,
            Overlap::Inside => Some(annotate_deleted_region(clip, range)),
            // Pulled left to meet the cut point
            Overlap::Front => Some(trim_front(clip, range, range.start_time)),
            Overlap::Back => Some(trim_back(clip, range)),
        })
        .collect()
}

/// Keep the clip whole and record the hole it now skips
fn annotate_deleted_region(clip: &Clip, range: TimeRange) -> Clip {
    let deleted = range.duration();
    let rel_start = range.start_time - clip.start;
    let rel_end = range.end_time - clip.start;

    let mut out = clip.clone();
    out.full_duration = Some(clip.full_duration_or_visible());
    out.duration = clip.duration - deleted;

    let region = DeletedRegion {
        start_time: rel_start,
        duration: deleted,
    };
    let idx = out
        .deleted_regions
        .partition_point(|r| r.start_time <= region.start_time);
    out.deleted_regions.insert(idx, region);
    debug_assert!(
        out.deleted_regions
            .windows(2)
            .all(|w| w[0].start_time <= w[1].start_time),
        "deleted regions must stay sorted"
    );

    // Envelope times are visible time: drop the removed span, close the gap
    out.envelope_points = clip
        .envelope_points
        .iter()
        .filter(|p| p.time < rel_start || p.time >= rel_end)
        .map(|p| {
            if p.time >= rel_end {
                EnvelopePoint {
                    time: p.time - deleted,
                    db: p.db,
                }
            } else {
                *p
            }
        })
        .collect();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use wd_core::TrackId;

    fn clip(id: u64, start: f64, duration: f64) -> Clip {
        Clip::new(ClipId(id), "clip", start, duration)
    }

    fn range(a: f64, b: f64) -> TimeRange {
        TimeRange::new(a, b).unwrap()
    }

    #[test]
    fn test_split_inside_makes_two_clips() {
        let mut next = 2;
        let out = apply_split_cut(&[clip(1, 0.0, 10.0)], range(4.0, 6.0), &mut next);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].id, ClipId(1));
        assert_abs_diff_eq!(out[0].start, 0.0);
        assert_abs_diff_eq!(out[0].duration, 4.0);
        assert_eq!(out[1].id, ClipId(2));
        assert_abs_diff_eq!(out[1].start, 6.0);
        assert_abs_diff_eq!(out[1].duration, 4.0);
        assert_abs_diff_eq!(out[1].trim_start, 2.0);
        assert_eq!(next, 3);
    }

    #[test]
    fn test_split_ids_increment_per_split() {
        let mut next = 10;
        let clips = vec![clip(1, 0.0, 10.0), clip(2, 1.0, 10.0)];
        let out = apply_split_cut(&clips, range(4.0, 6.0), &mut next);
        let ids: Vec<u64> = out.iter().map(|c| c.id.0).collect();
        assert_eq!(ids, vec![1, 10, 2, 11]);
    }

    #[test]
    fn test_split_front_and_back_trim() {
        let mut next = 5;
        let mut front = clip(1, 3.0, 5.0);
        front.envelope_points = vec![EnvelopePoint::new(0.5, -6.0), EnvelopePoint::new(3.0, 0.0)];
        let back = clip(2, 0.0, 5.0);
        let out = apply_split_cut(&[front, back], range(2.0, 4.0), &mut next);

        // Front trim: start moves to range end
        assert_abs_diff_eq!(out[0].start, 4.0);
        assert_abs_diff_eq!(out[0].duration, 4.0);
        assert_abs_diff_eq!(out[0].trim_start, 1.0);
        assert_eq!(out[0].envelope_points.len(), 1);
        assert_abs_diff_eq!(out[0].envelope_points[0].time, 2.0);

        // Back trim
        assert_abs_diff_eq!(out[1].start, 0.0);
        assert_abs_diff_eq!(out[1].duration, 2.0);
        assert_eq!(next, 5);
    }

    #[test]
    fn test_split_drops_contained_and_keeps_outside() {
        let mut next = 9;
        let clips = vec![clip(1, 4.5, 1.0), clip(2, 0.0, 2.0), clip(3, 8.0, 1.0)];
        let out = apply_split_cut(&clips, range(4.0, 6.0), &mut next);
        assert_eq!(out.len(), 2);
        assert_abs_diff_eq!(out[0].start, 0.0);
        assert_abs_diff_eq!(out[1].start, 8.0);
    }

    #[test]
    fn test_ripple_inside_annotates() {
        let clips = vec![clip(1, 0.0, 10.0), clip(2, 12.0, 2.0)];
        let out = apply_ripple_cut(&clips, range(4.0, 6.0));
        assert_eq!(out.len(), 2);
        assert_abs_diff_eq!(out[0].start, 0.0);
        assert_abs_diff_eq!(out[0].duration, 8.0);
        assert_eq!(
            out[0].deleted_regions,
            vec![DeletedRegion {
                start_time: 4.0,
                duration: 2.0
            }]
        );
        assert_abs_diff_eq!(out[1].start, 10.0);
    }

    #[test]
    fn test_ripple_front_pulls_to_cut_point() {
        let mut c = clip(1, 3.0, 5.0);
        c.deleted_regions = vec![
            DeletedRegion {
                start_time: 0.5,
                duration: 1.0,
            },
            DeletedRegion {
                start_time: 3.0,
                duration: 1.0,
            },
        ];
        let out = apply_ripple_cut(&[c], range(2.0, 4.0));
        assert_abs_diff_eq!(out[0].start, 2.0);
        assert_abs_diff_eq!(out[0].duration, 4.0);
        assert_abs_diff_eq!(out[0].trim_start, 1.0);
        assert_eq!(out[0].deleted_regions.len(), 1);
        assert_abs_diff_eq!(out[0].deleted_regions[0].start_time, 2.0);
    }

    #[test]
    fn test_ripple_back_drops_trailing() {
        let mut c = clip(1, 0.0, 5.0);
        c.envelope_points = vec![EnvelopePoint::new(1.0, 0.0), EnvelopePoint::new(4.0, 0.0)];
        let out = apply_ripple_cut(&[c], range(3.0, 8.0));
        assert_abs_diff_eq!(out[0].duration, 3.0);
        assert_eq!(out[0].envelope_points.len(), 1);
    }

    #[test]
    fn test_apply_cut_only_touches_affected() {
        let tracks = vec![
            Track::audio(TrackId(1), "A").with_clips(vec![clip(1, 0.0, 10.0)]),
            Track::audio(TrackId(2), "B").with_clips(vec![clip(2, 0.0, 10.0)]),
        ];
        let out = apply_cut(&tracks, 4.0, 6.0, CutMode::Split, &[1]).unwrap();
        assert_eq!(out[0], tracks[0]);
        assert_eq!(out[1].clips.len(), 2);
        assert_eq!(out[1].clips[1].id, ClipId(3));
    }

    #[test]
    fn test_apply_cut_rejects_inverted_range() {
        let tracks = vec![Track::audio(TrackId(1), "A")];
        assert!(apply_cut(&tracks, 6.0, 4.0, CutMode::Ripple, &[0]).is_err());
        assert!(apply_cut(&tracks, 4.0, 4.0, CutMode::Split, &[0]).is_err());
    }
}
