//! Selection & focus derivation
//!
//! Rules applied after any action that changes clip or label selection:
//!
//! | Driver | Count | Effect |
//! |--------|-------|--------|
//! | clips  | 0     | indicator cleared, time selection too if it was the clip extent |
//! | clips  | 1     | labels cleared, time selection + indicator = clip extent |
//! | clips  | >1    | labels cleared, time selection + indicator cleared |
//! | labels | 1     | clip flags cleared, time selection = label extent |
//! | labels | >1    | clip flags cleared, time selection cleared |
//!
//! In every case the selected track indices are re-derived from whatever
//! drives the selection. Track header clicks bypass this and set the indices
//! directly (see [`track_click_selection`]).

use wd_core::TimeRange;

use crate::{ClipDurationIndicator, EditorState};

/// Which selection kind changed last
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionDriver {
    Clips,
    Labels,
}

/// Track header click semantics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackSelectMode {
    /// Plain click: only the clicked track
    #[default]
    Replace,
    /// Ctrl/Cmd click
    Toggle,
    /// Shift click: from the highest selected index to the clicked one
    Range,
}

// ═══════════════════════════════════════════════════════════════════════════════
// NORMALIZATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Re-derive the auxiliary selection fields from the driving selection
pub fn normalize_selection(state: &mut EditorState, driver: SelectionDriver) {
    match driver {
        SelectionDriver::Clips => normalize_from_clips(state),
        SelectionDriver::Labels => normalize_from_labels(state),
    }
}

fn normalize_from_clips(state: &mut EditorState) {
    let selected = state.selected_clips();
    state.selected_track_indices = sorted_unique(selected.iter().map(|(ti, _)| *ti));

    match selected.as_slice() {
        [] => {
            // A range that only mirrored the last clip goes with it
            if let Some(ind) = state.clip_duration_indicator.take() {
                if state.time_selection == Some(TimeRange::ordered(ind.start_time, ind.end_time)) {
                    state.time_selection = None;
                }
            }
        }
        [(track_index, clip_id)] => {
            state.selected_label_ids.clear();
            let indicator = state
                .clip_at(*track_index, *clip_id)
                .map(|clip| ClipDurationIndicator::for_clip(*track_index, clip));
            state.time_selection =
                indicator.map(|i| TimeRange::ordered(i.start_time, i.end_time));
            state.clip_duration_indicator = indicator;
        }
        _ => {
            state.selected_label_ids.clear();
            state.time_selection = None;
            state.clip_duration_indicator = None;
        }
    }
}

fn normalize_from_labels(state: &mut EditorState) {
    // Stale keys (deleted labels, moved tracks) fall out here
    let mut keys = std::mem::take(&mut state.selected_label_ids);
    keys.retain(|k| state.find_label(*k).is_some());
    keys.sort();
    keys.dedup();
    state.selected_label_ids = keys;

    state.selected_track_indices =
        sorted_unique(state.selected_label_ids.iter().map(|k| k.track_index));

    if state.selected_label_ids.is_empty() {
        return;
    }

    for track in &mut state.tracks {
        for clip in &mut track.clips {
            clip.selected = false;
        }
    }
    state.clip_duration_indicator = None;

    state.time_selection = match state.selected_label_ids.as_slice() {
        [key] => state
            .find_label(*key)
            .map(|l| TimeRange::ordered(l.start_time, l.end_time)),
        _ => None,
    };
}

fn sorted_unique(indices: impl Iterator<Item = usize>) -> Vec<usize> {
    let mut out: Vec<usize> = indices.collect();
    out.sort_unstable();
    out.dedup();
    out
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRACK HEADER CLICKS
// ═══════════════════════════════════════════════════════════════════════════════

/// New track selection after clicking header `index`.
///
/// Range mode anchors on `max(current)`, not on the last clicked track, so a
/// non-contiguous selection collapses to one contiguous span.
pub fn track_click_selection(
    current: &[usize],
    index: usize,
    mode: TrackSelectMode,
    track_count: usize,
) -> Vec<usize> {
    if index >= track_count {
        return current.to_vec();
    }
    match mode {
        TrackSelectMode::Replace => vec![index],
        TrackSelectMode::Toggle => {
            let mut out: Vec<usize> = current.iter().copied().filter(|&i| i != index).collect();
            if out.len() == current.len() {
                out.push(index);
            }
            sorted_unique(out.into_iter())
        }
        TrackSelectMode::Range => match current.iter().max() {
            None => vec![index],
            Some(&anchor) => {
                let (lo, hi) = if anchor <= index { (anchor, index) } else { (index, anchor) };
                (lo..=hi).collect()
            }
        },
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// INDEX REPAIR
// ═══════════════════════════════════════════════════════════════════════════════

/// Position of `index` after removing the `deleted` tracks, `None` if removed
pub fn index_after_delete(index: usize, deleted: &[usize]) -> Option<usize> {
    if deleted.contains(&index) {
        return None;
    }
    Some(index - deleted.iter().filter(|&&d| d < index).count())
}

/// Position of `index` after moving one track from `from` to `to`
pub fn index_after_reorder(index: usize, from: usize, to: usize) -> usize {
    if index == from {
        to
    } else if from < index && index <= to {
        index - 1
    } else if to <= index && index < from {
        index + 1
    } else {
        index
    }
}
