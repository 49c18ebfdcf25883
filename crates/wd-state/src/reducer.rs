//! Reducer
//!
//! `reduce(state, action)` builds the next [`EditorState`]. It never mutates
//! its input; a rejected action returns `Err` and the caller keeps the old
//! state.
//!
//! Handlers touching clip or label selection finish through
//! [`normalize_selection`] so derived fields stay in one place.

use wd_core::{
    clamp_db, sort_points, Clip, ClipId, EnvelopePoint, Label, LabelKey, TimeRange, Track,
    ViewMode, WdError, WdResult, MIN_CLIP_DURATION, MIN_TRACK_HEIGHT,
};

use crate::cut::apply_cut;
use crate::selection::{
    index_after_delete, index_after_reorder, normalize_selection, track_click_selection,
    SelectionDriver, TrackSelectMode,
};
use crate::{Action, ClipDurationIndicator, ClipMove, CutMode, EditorState, SpectralSelection};

/// Split-view ratio bounds
const MIN_SPLIT_RATIO: f32 = 0.1;
const MAX_SPLIT_RATIO: f32 = 0.9;

/// Apply one action
pub fn reduce(state: &EditorState, action: &Action) -> WdResult<EditorState> {
    let mut next = state.clone();

    match action {
        // ── Tracks ───────────────────────────────────────────────────────────
        Action::AddTrack(track) => add_track(&mut next, track),
        Action::DeleteTracks(indices) => delete_tracks(&mut next, indices)?,
        Action::RenameTrack { index, name } => {
            track_mut(&mut next, *index)?.name = name.clone();
        }
        Action::ReorderTrack { from, to } => reorder_track(&mut next, *from, *to)?,
        Action::SetTrackHeight { index, height } => {
            track_mut(&mut next, *index)?.height = height.max(MIN_TRACK_HEIGHT);
        }
        Action::SetTrackViewMode { index, mode } => {
            track_mut(&mut next, *index)?.view_mode = *mode;
        }
        Action::SetChannelSplitRatio { index, ratio } => {
            track_mut(&mut next, *index)?.channel_split_ratio =
                Some(ratio.clamp(MIN_SPLIT_RATIO, MAX_SPLIT_RATIO));
        }

        // ── Clips ────────────────────────────────────────────────────────────
        Action::AddClip { track_index, clip } => add_clip(&mut next, *track_index, clip)?,
        Action::InsertClips(entries) => insert_clips(&mut next, entries),
        Action::DeleteClips(targets) => delete_clips(&mut next, targets),
        Action::MoveClip {
            clip_id,
            from_track,
            to_track,
            new_start,
        } => move_clips(
            &mut next,
            &[ClipMove {
                clip_id: *clip_id,
                from_track: *from_track,
                to_track: *to_track,
                new_start: *new_start,
            }],
        )?,
        Action::MoveClips(moves) => move_clips(&mut next, moves)?,
        Action::TrimClip {
            track_index,
            clip_id,
            new_trim_start,
            new_duration,
            new_start,
        } => trim_clip(
            &mut next,
            *track_index,
            *clip_id,
            *new_trim_start,
            *new_duration,
            *new_start,
        )?,
        Action::RenameClip {
            track_index,
            clip_id,
            name,
        } => {
            clip_mut(&mut next, *track_index, *clip_id)?.name = name.clone();
        }
        Action::SetClipColor {
            track_index,
            clip_id,
            color,
        } => {
            clip_mut(&mut next, *track_index, *clip_id)?.color = *color;
        }
        Action::SetClipEnvelope {
            track_index,
            clip_id,
            points,
        } => {
            clip_mut(&mut next, *track_index, *clip_id)?.envelope_points = sanitize_points(points);
        }

        // ── Labels ───────────────────────────────────────────────────────────
        Action::AddLabel {
            track_index,
            start_time,
            end_time,
            text,
        } => add_label(&mut next, *track_index, *start_time, *end_time, text)?,
        Action::UpdateLabel {
            key,
            start_time,
            end_time,
        } => update_label(&mut next, *key, *start_time, *end_time)?,
        Action::RenameLabel { key, text } => {
            label_mut(&mut next, *key)?.text = text.clone();
        }
        Action::DeleteLabels(keys) => delete_labels(&mut next, keys),

        // ── Selection & focus ────────────────────────────────────────────────
        Action::SelectClip {
            track_index,
            clip_id,
        } => {
            clip_mut(&mut next, *track_index, *clip_id)?;
            deselect_all_clips(&mut next);
            clip_mut(&mut next, *track_index, *clip_id)?.selected = true;
            normalize_selection(&mut next, SelectionDriver::Clips);
        }
        Action::ToggleClipSelection {
            track_index,
            clip_id,
        } => {
            let clip = clip_mut(&mut next, *track_index, *clip_id)?;
            clip.selected = !clip.selected;
            normalize_selection(&mut next, SelectionDriver::Clips);
        }
        Action::SelectClipsInRange {
            track_indices,
            range,
        } => select_clips_in_range(&mut next, track_indices, *range),
        Action::DeselectAllClips => {
            deselect_all_clips(&mut next);
            normalize_selection(&mut next, SelectionDriver::Clips);
        }
        Action::SetSelectedLabels(keys) => {
            next.selected_label_ids = keys.clone();
            normalize_selection(&mut next, SelectionDriver::Labels);
        }
        Action::ToggleLabelSelection(key) => {
            label_mut(&mut next, *key)?;
            if let Some(pos) = next.selected_label_ids.iter().position(|k| k == key) {
                next.selected_label_ids.remove(pos);
            } else {
                next.selected_label_ids.push(*key);
            }
            normalize_selection(&mut next, SelectionDriver::Labels);
        }
        Action::SetSelectedTracks(indices) => {
            let count = next.tracks.len();
            let mut indices: Vec<usize> = indices.iter().copied().filter(|&i| i < count).collect();
            indices.sort_unstable();
            indices.dedup();
            next.selected_track_indices = indices;
        }
        Action::SelectTrack { index, mode } => select_track(&mut next, *index, *mode)?,
        Action::SetFocusedTrack(index) => {
            if let Some(i) = index {
                track_mut(&mut next, *i)?;
            }
            next.focused_track_index = *index;
        }
        Action::SelectAll => select_all(&mut next),
        Action::ClearSelection => clear_selection(&mut next),
        Action::SetTimeSelection(range) => {
            next.time_selection = range.map(|r| TimeRange::ordered(r.start_time, r.end_time));
        }
        Action::SetSpectralSelection(selection) => {
            next.spectral_selection = selection.map(sanitize_spectral);
        }

        // ── Editing modes ────────────────────────────────────────────────────
        Action::DeleteTimeRange {
            start_time,
            end_time,
        } => delete_time_range(&mut next, *start_time, *end_time)?,
        Action::SetCutMode(mode) => next.cut_mode = *mode,
        Action::SetEnvelopeMode(on) => next.envelope_mode = *on,
        Action::SetSpectrogramMode(on) => set_spectrogram_mode(&mut next, *on),

        // ── Transport ────────────────────────────────────────────────────────
        Action::SetPlayhead(position) => next.playhead_position = position.max(0.0),
        Action::StartRecording { track_index } => {
            if !track_mut(&mut next, *track_index)?.is_audio() {
                return Err(not_audio(*track_index));
            }
            next.is_recording = true;
            next.recording_track_index = Some(*track_index);
        }
        Action::StopRecording => {
            next.is_recording = false;
            next.recording_track_index = None;
        }
    }

    Ok(next)
}

// ═══════════════════════════════════════════════════════════════════════════════
// LOOKUP
// ═══════════════════════════════════════════════════════════════════════════════

fn track_mut(state: &mut EditorState, index: usize) -> WdResult<&mut Track> {
    state
        .tracks
        .get_mut(index)
        .ok_or(WdError::TrackOutOfRange(index))
}

fn clip_mut(state: &mut EditorState, track_index: usize, id: ClipId) -> WdResult<&mut Clip> {
    track_mut(state, track_index)?
        .clip_mut(id)
        .ok_or(WdError::ClipNotFound(id))
}

fn label_mut(state: &mut EditorState, key: LabelKey) -> WdResult<&mut Label> {
    track_mut(state, key.track_index)?
        .label_by_id_mut(key.id)
        .ok_or(WdError::LabelNotFound(key))
}

fn not_audio(index: usize) -> WdError {
    WdError::InvalidParam(format!("track {index} is not an audio track"))
}

fn deselect_all_clips(state: &mut EditorState) {
    for clip in state.tracks.iter_mut().flat_map(|t| t.clips.iter_mut()) {
        clip.selected = false;
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRACKS
// ═══════════════════════════════════════════════════════════════════════════════

fn add_track(state: &mut EditorState, track: &Track) {
    let mut track = track.clone();
    track.set_index(state.tracks.len());
    if state.spectrogram_mode {
        if let Some(snapshot) = state.view_modes_before_overlay.as_mut() {
            snapshot.push(track.view_mode);
        }
        track.view_mode = ViewMode::Spectrogram;
    }
    state.tracks.push(track);
}

fn delete_tracks(state: &mut EditorState, indices: &[usize]) -> WdResult<()> {
    let mut doomed = indices.to_vec();
    doomed.sort_unstable();
    doomed.dedup();
    if let Some(&bad) = doomed.iter().find(|&&i| i >= state.tracks.len()) {
        return Err(WdError::TrackOutOfRange(bad));
    }

    for &index in doomed.iter().rev() {
        state.tracks.remove(index);
        if let Some(snapshot) = state.view_modes_before_overlay.as_mut() {
            if index < snapshot.len() {
                snapshot.remove(index);
            }
        }
    }
    remap_track_indices(state, |i| index_after_delete(i, &doomed));
    Ok(())
}

fn reorder_track(state: &mut EditorState, from: usize, to: usize) -> WdResult<()> {
    let count = state.tracks.len();
    if from >= count {
        return Err(WdError::TrackOutOfRange(from));
    }
    if to >= count {
        return Err(WdError::TrackOutOfRange(to));
    }
    if from == to {
        return Ok(());
    }

    let track = state.tracks.remove(from);
    state.tracks.insert(to, track);
    if let Some(snapshot) = state.view_modes_before_overlay.as_mut() {
        if from < snapshot.len() && to < snapshot.len() {
            let mode = snapshot.remove(from);
            snapshot.insert(to, mode);
        }
    }
    remap_track_indices(state, |i| Some(index_after_reorder(i, from, to)));
    Ok(())
}

/// Repair every field that stores a track position
fn remap_track_indices(state: &mut EditorState, map: impl Fn(usize) -> Option<usize>) {
    for (index, track) in state.tracks.iter_mut().enumerate() {
        track.set_index(index);
    }

    let mut selected: Vec<usize> = state
        .selected_track_indices
        .iter()
        .filter_map(|&i| map(i))
        .collect();
    selected.sort_unstable();
    selected.dedup();
    state.selected_track_indices = selected;

    state.focused_track_index = state.focused_track_index.and_then(&map);
    state.recording_track_index = state.recording_track_index.and_then(&map);
    state.selected_label_ids = state
        .selected_label_ids
        .iter()
        .filter_map(|k| map(k.track_index).map(|ti| LabelKey::new(ti, k.id)))
        .collect();
    state.clip_duration_indicator = state.clip_duration_indicator.and_then(|ind| {
        map(ind.track_index).map(|track_index| ClipDurationIndicator {
            track_index,
            ..ind
        })
    });
    if let Some(spectral) = state.spectral_selection.as_mut() {
        spectral.track_index = spectral.track_index.and_then(&map);
    }
}

fn set_spectrogram_mode(state: &mut EditorState, on: bool) {
    if on {
        // A second "on" must not overwrite the original modes
        if state.view_modes_before_overlay.is_none() {
            state.view_modes_before_overlay =
                Some(state.tracks.iter().map(|t| t.view_mode).collect());
        }
        for track in &mut state.tracks {
            track.view_mode = ViewMode::Spectrogram;
        }
    } else if let Some(snapshot) = state.view_modes_before_overlay.take() {
        debug_assert_eq!(snapshot.len(), state.tracks.len());
        for (track, mode) in state.tracks.iter_mut().zip(snapshot) {
            track.view_mode = mode;
        }
    } else {
        log::debug!("spectrogram overlay off without snapshot; view modes unchanged");
    }
    state.spectrogram_mode = on;
}

fn select_track(state: &mut EditorState, index: usize, mode: TrackSelectMode) -> WdResult<()> {
    track_mut(state, index)?;
    state.selected_track_indices = track_click_selection(
        &state.selected_track_indices,
        index,
        mode,
        state.tracks.len(),
    );
    state.focused_track_index = Some(index);
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLIPS
// ═══════════════════════════════════════════════════════════════════════════════

fn add_clip(state: &mut EditorState, track_index: usize, clip: &Clip) -> WdResult<()> {
    let track = track_mut(state, track_index)?;
    if !track.is_audio() {
        return Err(not_audio(track_index));
    }
    let mut clip = clip.clone();
    clip.start = clip.start.max(0.0);
    let selected = clip.selected;
    track.clips.push(clip);
    if selected {
        normalize_selection(state, SelectionDriver::Clips);
    }
    Ok(())
}

fn insert_clips(state: &mut EditorState, entries: &[(usize, Clip)]) {
    let valid: Vec<&(usize, Clip)> = entries
        .iter()
        .filter(|(ti, clip)| {
            let ok = state.tracks.get(*ti).is_some_and(Track::is_audio);
            if !ok {
                log::warn!("paste skipped clip {} for missing track {}", clip.id, ti);
            }
            ok
        })
        .collect();
    if valid.is_empty() {
        return;
    }

    deselect_all_clips(state);
    for (track_index, clip) in valid {
        let mut clip = clip.clone();
        clip.start = clip.start.max(0.0);
        clip.selected = true;
        state.tracks[*track_index].clips.push(clip);
    }
    normalize_selection(state, SelectionDriver::Clips);
}

fn delete_clips(state: &mut EditorState, targets: &[(usize, ClipId)]) {
    let mut removed_selected = false;
    for &(track_index, id) in targets {
        let Some(track) = state.tracks.get_mut(track_index) else {
            log::warn!("delete skipped clip {id}: no track {track_index}");
            continue;
        };
        if let Some(pos) = track.clips.iter().position(|c| c.id == id) {
            removed_selected |= track.clips.remove(pos).selected;
        }
    }

    if let Some(ind) = state.clip_duration_indicator {
        if state.clip_at(ind.track_index, ind.clip_id).is_none() {
            state.clip_duration_indicator = None;
        }
    }
    if removed_selected {
        normalize_selection(state, SelectionDriver::Clips);
        if state.selected_clip_count() == 0 {
            state.time_selection = None;
        }
    }
}

/// Relocate every member, then shift the derived selections once by the
/// delta of the first selected member. Members of one drag share a delta.
fn move_clips(state: &mut EditorState, moves: &[ClipMove]) -> WdResult<()> {
    let mut shift = None;
    let mut changed_tracks = false;
    for m in moves {
        let (delta, was_selected) = relocate_clip(state, m)?;
        if !was_selected {
            continue;
        }
        shift.get_or_insert(delta);
        changed_tracks |= m.from_track != m.to_track;
        if let Some(ind) = state
            .clip_duration_indicator
            .as_mut()
            .filter(|ind| ind.clip_id == m.clip_id)
        {
            ind.track_index = m.to_track;
        }
    }

    // Derived selections stay glued to the clips
    if let Some(delta) = shift {
        if let Some(range) = state.time_selection {
            state.time_selection = Some(range.shifted(delta));
        }
        if let Some(ind) = state.clip_duration_indicator.as_mut() {
            ind.start_time += delta;
            ind.end_time += delta;
        }
    }
    if changed_tracks {
        let mut indices: Vec<usize> = state.selected_clips().into_iter().map(|(ti, _)| ti).collect();
        indices.dedup();
        state.selected_track_indices = indices;
    }
    Ok(())
}

/// Returns the start delta and whether the clip was selected
fn relocate_clip(state: &mut EditorState, m: &ClipMove) -> WdResult<(f64, bool)> {
    if !track_mut(state, m.to_track)?.is_audio() {
        return Err(not_audio(m.to_track));
    }
    let source = track_mut(state, m.from_track)?;
    let pos = source
        .clips
        .iter()
        .position(|c| c.id == m.clip_id)
        .ok_or(WdError::ClipNotFound(m.clip_id))?;

    let new_start = m.new_start.max(0.0);
    let delta = new_start - source.clips[pos].start;
    let was_selected = source.clips[pos].selected;

    if m.from_track == m.to_track {
        source.clips[pos].start = new_start;
    } else {
        let mut clip = source.clips.remove(pos);
        clip.start = new_start;
        state.tracks[m.to_track].clips.push(clip);
    }
    Ok((delta, was_selected))
}

fn trim_clip(
    state: &mut EditorState,
    track_index: usize,
    clip_id: ClipId,
    new_trim_start: f64,
    new_duration: f64,
    new_start: Option<f64>,
) -> WdResult<()> {
    let single_selected = state.selected_clips() == vec![(track_index, clip_id)];
    let clip = clip_mut(state, track_index, clip_id)?;

    // Ceiling recorded on first trim
    let full = clip.full_duration.unwrap_or(clip.trim_start + clip.duration);
    let trim_start = new_trim_start.clamp(0.0, (full - MIN_CLIP_DURATION).max(0.0));
    let duration = new_duration
        .max(MIN_CLIP_DURATION)
        .min((full - trim_start).max(MIN_CLIP_DURATION));

    clip.full_duration = Some(full);
    clip.trim_start = trim_start;
    clip.duration = duration;
    if let Some(start) = new_start {
        clip.start = start.max(0.0);
    }
    debug_assert!(clip.trim_start + clip.duration <= full.max(MIN_CLIP_DURATION) + 1e-9);
    let extent = ClipDurationIndicator::for_clip(track_index, clip);

    if state.clip_duration_indicator.map(|i| i.clip_id) == Some(clip_id) {
        state.clip_duration_indicator = Some(extent);
    }
    if single_selected {
        state.time_selection = Some(TimeRange::ordered(extent.start_time, extent.end_time));
    }
    Ok(())
}

fn sanitize_points(points: &[EnvelopePoint]) -> Vec<EnvelopePoint> {
    let mut out: Vec<EnvelopePoint> = points
        .iter()
        .map(|p| EnvelopePoint {
            time: p.time.max(0.0),
            db: clamp_db(p.db),
        })
        .collect();
    sort_points(&mut out);
    out
}

fn select_clips_in_range(state: &mut EditorState, track_indices: &[usize], range: TimeRange) {
    deselect_all_clips(state);
    for &ti in track_indices {
        let Some(track) = state.tracks.get_mut(ti) else {
            continue;
        };
        for clip in &mut track.clips {
            if range.overlaps(clip.start, clip.end_time()) {
                clip.selected = true;
            }
        }
    }
    normalize_selection(state, SelectionDriver::Clips);

    // The dragged range stays the time selection
    let mut tracks: Vec<usize> = track_indices
        .iter()
        .copied()
        .filter(|&i| i < state.tracks.len())
        .collect();
    tracks.sort_unstable();
    tracks.dedup();
    state.selected_track_indices = tracks;
    state.time_selection = Some(range);
}

// ═══════════════════════════════════════════════════════════════════════════════
// LABELS
// ═══════════════════════════════════════════════════════════════════════════════

fn add_label(
    state: &mut EditorState,
    track_index: usize,
    start_time: f64,
    end_time: f64,
    text: &str,
) -> WdResult<()> {
    let id = state.next_label_id();
    let track = track_mut(state, track_index)?;
    if !track.is_label() {
        return Err(WdError::InvalidParam(format!(
            "track {track_index} is not a label track"
        )));
    }
    track.labels.push(Label::region(
        id,
        track_index,
        text,
        start_time.max(0.0),
        end_time.max(0.0),
    ));
    Ok(())
}

fn update_label(state: &mut EditorState, key: LabelKey, start_time: f64, end_time: f64) -> WdResult<()> {
    let label = label_mut(state, key)?;
    label.start_time = start_time.max(0.0);
    label.end_time = end_time.max(0.0);
    let extent = TimeRange::ordered(label.start_time, label.end_time);

    if state.selected_label_ids == [key] {
        state.time_selection = Some(extent);
    }
    Ok(())
}

fn delete_labels(state: &mut EditorState, keys: &[LabelKey]) {
    for key in keys {
        if let Some(track) = state.tracks.get_mut(key.track_index) {
            track.labels.retain(|l| l.id != key.id);
        }
    }
    let before = state.selected_label_ids.len();
    state.selected_label_ids.retain(|k| !keys.contains(k));
    if state.selected_label_ids.len() != before {
        normalize_selection(state, SelectionDriver::Labels);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SELECTION
// ═══════════════════════════════════════════════════════════════════════════════

fn select_all(state: &mut EditorState) {
    for clip in state.tracks.iter_mut().flat_map(|t| t.clips.iter_mut()) {
        clip.selected = true;
    }
    normalize_selection(state, SelectionDriver::Clips);

    state.selected_track_indices = (0..state.tracks.len()).collect();
    let end = state.project_end();
    state.time_selection = if end > 0.0 {
        Some(TimeRange::ordered(0.0, end))
    } else {
        None
    };
}

fn clear_selection(state: &mut EditorState) {
    deselect_all_clips(state);
    state.selected_track_indices.clear();
    state.focused_track_index = None;
    state.selected_label_ids.clear();
    state.time_selection = None;
    state.spectral_selection = None;
    state.clip_duration_indicator = None;
}

fn sanitize_spectral(selection: SpectralSelection) -> SpectralSelection {
    let min = selection.min_frequency.clamp(0.0, 1.0);
    let max = selection.max_frequency.clamp(0.0, 1.0);
    SpectralSelection {
        start_time: selection.start_time.min(selection.end_time).max(0.0),
        end_time: selection.start_time.max(selection.end_time).max(0.0),
        min_frequency: min.min(max),
        max_frequency: min.max(max),
        track_index: selection.track_index,
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TIME RANGE DELETION
// ═══════════════════════════════════════════════════════════════════════════════

fn delete_time_range(state: &mut EditorState, start_time: f64, end_time: f64) -> WdResult<()> {
    let targets = state.edit_target_tracks();
    state.tracks = apply_cut(&state.tracks, start_time, end_time, state.cut_mode, &targets)?;

    // Playhead follows the material it sat on
    if state.cut_mode == CutMode::Ripple {
        let p = state.playhead_position;
        if p >= end_time {
            state.playhead_position = p - (end_time - start_time);
        } else if p > start_time {
            state.playhead_position = start_time;
        }
    }

    state.time_selection = None;
    state.spectral_selection = None;
    state.clip_duration_indicator = state.clip_duration_indicator.and_then(|ind| {
        state
            .clip_at(ind.track_index, ind.clip_id)
            .map(|clip| ClipDurationIndicator::for_clip(ind.track_index, clip))
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use wd_core::{LabelId, TrackId};

    fn two_tracks() -> EditorState {
        EditorState::with_tracks(vec![
            Track::audio(TrackId(1), "Audio 1").with_clips(vec![
                Clip::new(ClipId(1), "a", 1.0, 3.0),
                Clip::new(ClipId(2), "b", 6.0, 2.0),
            ]),
            Track::audio(TrackId(2), "Audio 2").with_clips(vec![Clip::new(ClipId(3), "c", 0.0, 5.0)]),
        ])
    }

    fn run(state: &EditorState, action: Action) -> EditorState {
        reduce(state, &action).unwrap()
    }

    #[test]
    fn test_reduce_leaves_input_untouched() {
        let state = two_tracks();
        let next = run(
            &state,
            Action::SelectClip {
                track_index: 0,
                clip_id: ClipId(1),
            },
        );
        assert_eq!(state.selected_clip_count(), 0);
        assert_eq!(next.selected_clip_count(), 1);
    }

    #[test]
    fn test_move_clip_keeps_selection_glued() {
        let state = run(
            &two_tracks(),
            Action::SelectClip {
                track_index: 0,
                clip_id: ClipId(1),
            },
        );
        let next = run(
            &state,
            Action::MoveClip {
                clip_id: ClipId(1),
                from_track: 0,
                to_track: 1,
                new_start: 2.5,
            },
        );
        assert_eq!(next.tracks[0].clips.len(), 1);
        assert_eq!(next.tracks[1].clips.last().map(|c| c.id), Some(ClipId(1)));
        assert_eq!(next.time_selection, Some(TimeRange::ordered(2.5, 5.5)));
        let ind = next.clip_duration_indicator.unwrap();
        assert_eq!(ind.track_index, 1);
        assert_abs_diff_eq!(ind.start_time, 2.5);
        assert_eq!(next.selected_track_indices, vec![1]);
    }

    #[test]
    fn test_group_move_shifts_range_once() {
        let state = run(
            &two_tracks(),
            Action::SelectClipsInRange {
                track_indices: vec![0],
                range: TimeRange::ordered(0.5, 8.5),
            },
        );
        let next = run(
            &state,
            Action::MoveClips(vec![
                ClipMove {
                    clip_id: ClipId(1),
                    from_track: 0,
                    to_track: 0,
                    new_start: 2.0,
                },
                ClipMove {
                    clip_id: ClipId(2),
                    from_track: 0,
                    to_track: 0,
                    new_start: 7.0,
                },
            ]),
        );
        assert_eq!(next.time_selection, Some(TimeRange::ordered(1.5, 9.5)));
        assert_eq!(next.selected_clip_count(), 2);
    }

    #[test]
    fn test_move_clip_clamps_and_rejects() {
        let state = two_tracks();
        let next = run(
            &state,
            Action::MoveClip {
                clip_id: ClipId(2),
                from_track: 0,
                to_track: 0,
                new_start: -4.0,
            },
        );
        assert_eq!(next.tracks[0].clips[1].start, 0.0);

        let err = reduce(
            &state,
            &Action::MoveClip {
                clip_id: ClipId(2),
                from_track: 0,
                to_track: 7,
                new_start: 1.0,
            },
        );
        assert!(matches!(err, Err(WdError::TrackOutOfRange(7))));
    }

    #[test]
    fn test_trim_records_full_duration_and_clamps() {
        let state = two_tracks();
        let next = run(
            &state,
            Action::TrimClip {
                track_index: 0,
                clip_id: ClipId(1),
                new_trim_start: 1.0,
                new_duration: 2.0,
                new_start: Some(2.0),
            },
        );
        let clip = next.tracks[0].clip(ClipId(1)).unwrap();
        assert_eq!(clip.full_duration, Some(3.0));
        assert_abs_diff_eq!(clip.start, 2.0);

        // Asking for more than the ceiling
        let next = run(
            &next,
            Action::TrimClip {
                track_index: 0,
                clip_id: ClipId(1),
                new_trim_start: 1.0,
                new_duration: 9.0,
                new_start: None,
            },
        );
        let clip = next.tracks[0].clip(ClipId(1)).unwrap();
        assert_abs_diff_eq!(clip.duration, 2.0);

        let next = run(
            &next,
            Action::TrimClip {
                track_index: 0,
                clip_id: ClipId(1),
                new_trim_start: 1.0,
                new_duration: 0.0,
                new_start: None,
            },
        );
        assert_abs_diff_eq!(next.tracks[0].clip(ClipId(1)).unwrap().duration, MIN_CLIP_DURATION);
    }

    #[test]
    fn test_delete_tracks_remaps_indices() {
        let mut state = two_tracks();
        state.tracks.push(Track::label(TrackId(3), "Labels"));
        state = run(
            &state,
            Action::AddLabel {
                track_index: 2,
                start_time: 1.0,
                end_time: 2.0,
                text: "x".into(),
            },
        );
        let key = LabelKey::new(2, LabelId(1));
        state = run(&state, Action::SetSelectedLabels(vec![key]));
        state.focused_track_index = Some(2);
        state.selected_track_indices = vec![0, 2];

        let next = run(&state, Action::DeleteTracks(vec![0]));
        assert_eq!(next.tracks.len(), 2);
        assert_eq!(next.selected_track_indices, vec![1]);
        assert_eq!(next.focused_track_index, Some(1));
        assert_eq!(next.selected_label_ids, vec![LabelKey::new(1, LabelId(1))]);
        assert_eq!(next.tracks[1].labels[0].track_index, 1);
    }

    #[test]
    fn test_reorder_track_moves_focus() {
        let mut state = two_tracks();
        state.focused_track_index = Some(0);
        let next = run(&state, Action::ReorderTrack { from: 0, to: 1 });
        assert_eq!(next.tracks[1].id, TrackId(1));
        assert_eq!(next.focused_track_index, Some(1));
    }

    #[test]
    fn test_spectrogram_off_without_snapshot_is_harmless() {
        let mut state = two_tracks();
        state.tracks[1].view_mode = ViewMode::Split;
        let next = run(&state, Action::SetSpectrogramMode(false));
        assert_eq!(next.tracks[1].view_mode, ViewMode::Split);
    }

    #[test]
    fn test_spectrogram_add_track_while_on() {
        let state = run(&two_tracks(), Action::SetSpectrogramMode(true));
        let state = run(&state, Action::AddTrack(Track::audio(TrackId(9), "New")));
        assert_eq!(state.tracks[2].view_mode, ViewMode::Spectrogram);
        let state = run(&state, Action::SetSpectrogramMode(false));
        assert!(state.tracks.iter().all(|t| t.view_mode == ViewMode::Waveform));
    }

    #[test]
    fn test_delete_time_range_targets_selected_tracks() {
        let mut state = two_tracks();
        state.selected_track_indices = vec![1];
        state.cut_mode = CutMode::Ripple;
        state.playhead_position = 4.5;
        let next = run(
            &state,
            Action::DeleteTimeRange {
                start_time: 1.0,
                end_time: 2.0,
            },
        );
        assert_eq!(next.tracks[0], state.tracks[0]);
        assert_abs_diff_eq!(next.tracks[1].clips[0].duration, 4.0);
        assert_abs_diff_eq!(next.playhead_position, 3.5);
        assert_eq!(next.time_selection, None);

        assert!(reduce(
            &state,
            &Action::DeleteTimeRange {
                start_time: 2.0,
                end_time: 2.0
            }
        )
        .is_err());
    }

    #[test]
    fn test_clear_selection_is_full_deselect() {
        let mut state = run(&two_tracks(), Action::SelectAll);
        state.focused_track_index = Some(1);
        assert_eq!(state.selected_track_indices, vec![0, 1]);
        assert_eq!(state.time_selection, Some(TimeRange::ordered(0.0, 8.0)));

        let next = run(&state, Action::ClearSelection);
        assert!(next.selected_track_indices.is_empty());
        assert_eq!(next.focused_track_index, None);
        assert_eq!(next.time_selection, None);
        assert_eq!(next.selected_clip_count(), 0);
    }

    #[test]
    fn test_insert_clips_skips_missing_tracks() {
        let state = two_tracks();
        let next = run(
            &state,
            Action::InsertClips(vec![
                (1, Clip::new(ClipId(10), "p", 9.0, 1.0)),
                (5, Clip::new(ClipId(11), "q", 9.0, 1.0)),
            ]),
        );
        assert_eq!(next.selected_clips(), vec![(1, ClipId(10))]);
        assert_eq!(next.time_selection, Some(TimeRange::ordered(9.0, 10.0)));
    }

    #[test]
    fn test_split_ratio_clamped() {
        let next = run(
            &two_tracks(),
            Action::SetChannelSplitRatio {
                index: 0,
                ratio: 1.5,
            },
        );
        assert_eq!(next.tracks[0].split_ratio(), MAX_SPLIT_RATIO);
    }
}
