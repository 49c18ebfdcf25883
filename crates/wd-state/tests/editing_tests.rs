//! Editor State Integration Tests
//!
//! Tests for:
//! - Split and ripple cuts through `DeleteTimeRange`
//! - Cut conservation and shift properties over varied clip layouts
//! - Selection exclusivity between clips and labels
//! - Spectrogram overlay save/restore
//! - Track deletion repairing dependent indices
//! - Store dispatch, clipboard copy and repeated paste

use approx::assert_abs_diff_eq;
use wd_core::{Clip, ClipId, DeletedRegion, Label, LabelId, LabelKey, TimeRange, Track, TrackId, ViewMode};
use wd_state::{
    apply_cut, reduce, Action, Clipboard, ClipboardOp, CutMode, EditorState, EditorStore,
};

// ═══════════════════════════════════════════════════════════════════════════════
// HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

fn clip(id: u64, start: f64, duration: f64) -> Clip {
    Clip::new(ClipId(id), &format!("Clip {id}"), start, duration)
}

fn audio_track(id: u64, clips: Vec<Clip>) -> Track {
    Track::audio(TrackId(id), &format!("Audio {id}")).with_clips(clips)
}

fn apply(state: &EditorState, action: Action) -> EditorState {
    reduce(state, &action).expect("action should be accepted")
}

fn total_duration(track: &Track) -> f64 {
    track.clips.iter().map(|c| c.duration).sum()
}

/// Audio overlapping `[start, end)` across a track's clips
fn overlapping_audio(track: &Track, start: f64, end: f64) -> f64 {
    track
        .clips
        .iter()
        .map(|c| (c.end_time().min(end) - c.start.max(start)).max(0.0))
        .sum()
}

/// Layouts covering every overlap case
fn layouts() -> Vec<Vec<Clip>> {
    vec![
        vec![clip(1, 0.0, 10.0)],
        vec![clip(1, 0.0, 3.0), clip(2, 3.5, 1.0), clip(3, 5.0, 4.0)],
        vec![clip(1, 4.5, 1.0), clip(2, 12.0, 2.0)],
        vec![clip(1, 2.0, 2.5), clip(2, 5.5, 3.0), clip(3, 0.0, 1.0)],
        vec![clip(1, 1.0, 8.0), clip(2, 3.0, 2.0)],
    ]
}

// ═══════════════════════════════════════════════════════════════════════════════
// CUT SCENARIOS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_split_cut_single_clip() {
    let state = EditorState::with_tracks(vec![audio_track(1, vec![clip(1, 0.0, 10.0)])]);
    let next = apply(
        &state,
        Action::DeleteTimeRange {
            start_time: 4.0,
            end_time: 6.0,
        },
    );

    let clips = &next.tracks[0].clips;
    assert_eq!(clips.len(), 2);
    assert_abs_diff_eq!(clips[0].start, 0.0);
    assert_abs_diff_eq!(clips[0].duration, 4.0);
    assert_abs_diff_eq!(clips[1].start, 6.0);
    assert_abs_diff_eq!(clips[1].duration, 4.0);
    assert_abs_diff_eq!(clips[1].trim_start, 2.0);
    assert_ne!(clips[0].id, clips[1].id);
}

#[test]
fn test_ripple_cut_single_clip() {
    let mut state = EditorState::with_tracks(vec![audio_track(
        1,
        vec![clip(1, 0.0, 10.0), clip(2, 12.0, 1.0)],
    )]);
    state.cut_mode = CutMode::Ripple;
    let next = apply(
        &state,
        Action::DeleteTimeRange {
            start_time: 4.0,
            end_time: 6.0,
        },
    );

    let clips = &next.tracks[0].clips;
    assert_eq!(clips.len(), 2);
    assert_abs_diff_eq!(clips[0].start, 0.0);
    assert_abs_diff_eq!(clips[0].duration, 8.0);
    assert_eq!(
        clips[0].deleted_regions,
        vec![DeletedRegion {
            start_time: 4.0,
            duration: 2.0
        }]
    );
    assert_abs_diff_eq!(clips[1].start, 10.0);
}

#[test]
fn test_nested_ripple_cuts_accumulate_regions() {
    let tracks = vec![audio_track(1, vec![clip(1, 0.0, 10.0)])];
    let once = apply_cut(&tracks, 6.0, 7.0, CutMode::Ripple, &[0]).unwrap();
    let twice = apply_cut(&once, 2.0, 3.0, CutMode::Ripple, &[0]).unwrap();

    let regions = &twice[0].clips[0].deleted_regions;
    assert_eq!(regions.len(), 2);
    assert!(regions[0].start_time < regions[1].start_time);
    assert_abs_diff_eq!(twice[0].clips[0].duration, 8.0);
}

// ═══════════════════════════════════════════════════════════════════════════════
// CUT PROPERTIES
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_split_cut_conserves_audio() {
    for (start, end) in [(4.0, 6.0), (0.0, 1.5), (2.5, 11.0), (8.0, 9.0)] {
        for clips in layouts() {
            let track = audio_track(1, clips);
            let out = apply_cut(&[track.clone()], start, end, CutMode::Split, &[0]).unwrap();
            let removed = total_duration(&track) - total_duration(&out[0]);
            assert_abs_diff_eq!(removed, overlapping_audio(&track, start, end), epsilon = 1e-9);

            // Clips outside the range never move
            for before in track.clips.iter().filter(|c| c.end_time() <= start || c.start >= end) {
                let after = out[0].clip(before.id).unwrap();
                assert_abs_diff_eq!(after.start, before.start);
            }
        }
    }
}

#[test]
fn test_ripple_cut_shifts_later_clips() {
    for (start, end) in [(4.0, 6.0), (0.0, 1.5), (2.5, 3.0)] {
        let d = end - start;
        for clips in layouts() {
            let track = audio_track(1, clips);
            let out = apply_cut(&[track.clone()], start, end, CutMode::Ripple, &[0]).unwrap();
            for before in &track.clips {
                let Some(after) = out[0].clip(before.id) else {
                    continue;
                };
                if before.start >= end {
                    assert_abs_diff_eq!(after.start, before.start - d, epsilon = 1e-9);
                } else if before.end_time() <= start {
                    assert_abs_diff_eq!(after.start, before.start);
                }
                assert!(after.start >= 0.0);
                assert!(after.trim_start >= 0.0);
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SELECTION
// ═══════════════════════════════════════════════════════════════════════════════

fn clips_and_labels() -> EditorState {
    EditorState::with_tracks(vec![
        audio_track(1, vec![clip(1, 1.0, 3.0), clip(2, 6.0, 2.0)]),
        Track::label(TrackId(2), "Labels").with_labels(vec![
            Label::region(LabelId(1), 1, "Verse", 2.0, 5.0),
            Label::point(LabelId(2), 1, "Hit", 7.0),
        ]),
    ])
}

#[test]
fn test_single_then_shift_select_clears_time_selection() {
    let state = apply(
        &clips_and_labels(),
        Action::SelectClip {
            track_index: 0,
            clip_id: ClipId(1),
        },
    );
    assert_eq!(state.time_selection, Some(TimeRange::ordered(1.0, 4.0)));

    let state = apply(
        &state,
        Action::ToggleClipSelection {
            track_index: 0,
            clip_id: ClipId(2),
        },
    );
    assert_eq!(state.selected_clip_count(), 2);
    assert_eq!(state.time_selection, None);
}

#[test]
fn test_clip_and_label_selection_are_exclusive() {
    let label = LabelKey::new(1, LabelId(1));
    let state = apply(&clips_and_labels(), Action::SetSelectedLabels(vec![label]));
    assert_eq!(state.time_selection, Some(TimeRange::ordered(2.0, 5.0)));

    let state = apply(
        &state,
        Action::SelectClip {
            track_index: 0,
            clip_id: ClipId(2),
        },
    );
    assert!(state.selected_label_ids.is_empty());
    assert_eq!(state.selected_track_indices, vec![0]);

    let state = apply(&state, Action::ToggleLabelSelection(label));
    assert_eq!(state.selected_clip_count(), 0);
    assert_eq!(state.clip_duration_indicator, None);

    let state = apply(&state, Action::ToggleLabelSelection(LabelKey::new(1, LabelId(2))));
    assert_eq!(state.selected_label_ids.len(), 2);
    assert_eq!(state.time_selection, None);
}

// ═══════════════════════════════════════════════════════════════════════════════
// VIEW MODES
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_spectrogram_overlay_restores_modes() {
    let mut state = EditorState::with_tracks(vec![audio_track(1, vec![]), audio_track(2, vec![])]);
    state.tracks[1].view_mode = ViewMode::Split;

    let on = apply(&state, Action::SetSpectrogramMode(true));
    assert!(on.tracks.iter().all(|t| t.view_mode == ViewMode::Spectrogram));

    // Repeated "on" keeps the first snapshot
    let on = apply(&on, Action::SetSpectrogramMode(true));
    let off = apply(&on, Action::SetSpectrogramMode(false));
    let modes: Vec<ViewMode> = off.tracks.iter().map(|t| t.view_mode).collect();
    assert_eq!(modes, vec![ViewMode::Waveform, ViewMode::Split]);
    assert_eq!(off.view_modes_before_overlay, None);
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRACK DELETION
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_delete_track_repairs_indicator_and_recording() {
    let mut state = EditorState::with_tracks(vec![
        audio_track(1, vec![]),
        audio_track(2, vec![clip(5, 0.0, 2.0)]),
        audio_track(3, vec![]),
    ]);
    state = apply(
        &state,
        Action::SelectClip {
            track_index: 1,
            clip_id: ClipId(5),
        },
    );
    state = apply(&state, Action::StartRecording { track_index: 2 });

    let next = apply(&state, Action::DeleteTracks(vec![0]));
    assert_eq!(next.clip_duration_indicator.map(|i| i.track_index), Some(0));
    assert_eq!(next.recording_track_index, Some(1));

    let next = apply(&next, Action::DeleteTracks(vec![0]));
    assert_eq!(next.clip_duration_indicator, None);
    assert!(reduce(&next, &Action::DeleteTracks(vec![3])).is_err());
}

// ═══════════════════════════════════════════════════════════════════════════════
// STORE & CLIPBOARD
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_copy_paste_twice_through_store() {
    let mut store = EditorStore::new(EditorState::with_tracks(vec![
        audio_track(1, vec![clip(1, 2.0, 1.0)]),
        audio_track(2, vec![clip(2, 3.0, 1.0)]),
    ]));
    store.dispatch(Action::SelectAll).unwrap();
    let clipboard = Clipboard::copy_selected(store.state(), ClipboardOp::Copy).unwrap();

    for at in [10.0, 20.0] {
        let placed = clipboard.paste_layout(0, at, store.state().next_clip_id(), store.state().tracks.len());
        store.dispatch(Action::InsertClips(placed)).unwrap();
    }

    let state = store.state();
    assert_eq!(state.tracks[0].clips.len(), 3);
    assert_eq!(state.tracks[1].clips.len(), 3);
    assert_abs_diff_eq!(state.tracks[1].clips[2].start, 21.0);
    // Only the last paste stays selected
    assert_eq!(state.selected_clip_count(), 2);
    let mut ids: Vec<u64> = state.tracks.iter().flat_map(|t| t.clips.iter().map(|c| c.id.0)).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 6);
}
