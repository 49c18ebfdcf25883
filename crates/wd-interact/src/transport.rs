//! Transport & Recording
//!
//! Bridges the editor to external playback and recording engines:
//! - Pushes clip layout to the playback engine when the project changed
//! - Loops over the time selection when one exists
//! - Picks (or creates) the record target track
//! - Drains engine events and turns them into editor actions
//!
//! Engines post [`TransportEvent`]s from their own threads; `poll` drains
//! them on the editor thread.

use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use thiserror::Error;

use wd_core::{Clip, ClipId, Track, WdError};
use wd_state::{Action, EditorState};

use crate::RecordingConfig;

// ═══════════════════════════════════════════════════════════════════════════
// ENGINE SEAMS
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Device error: {0}")]
    Device(String),

    #[error("No recording source available")]
    NotReady,

    #[error(transparent)]
    Core(#[from] WdError),
}

pub type TransportResult<T> = Result<T, TransportError>;

/// Playback engine
pub trait AudioPlayback: Send {
    fn load_clips(&mut self, tracks: &[Track], position: f64) -> TransportResult<()>;
    fn play(&mut self, position: f64) -> TransportResult<()>;
    fn pause(&mut self) -> TransportResult<()>;
    fn stop(&mut self) -> TransportResult<()>;
    fn seek(&mut self, position: f64) -> TransportResult<()>;
    fn set_loop_enabled(&mut self, enabled: bool) -> TransportResult<()>;
    fn set_loop_region(&mut self, start: f64, end: f64) -> TransportResult<()>;
}

/// Input capture engine
pub trait RecordingSource: Send {
    fn start_monitoring(&mut self) -> TransportResult<()>;
    fn start_recording(&mut self, position: f64) -> TransportResult<()>;
    fn stop_recording(&mut self) -> TransportResult<()>;
}

pub type SharedPlayback = Arc<Mutex<dyn AudioPlayback>>;
pub type SharedRecorder = Arc<Mutex<dyn RecordingSource>>;

/// Captured audio, one buffer per channel
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedAudio {
    pub sample_rate: u32,
    pub channels: Vec<Vec<f32>>,
}

impl RecordedAudio {
    pub fn frames(&self) -> usize {
        self.channels.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Length in seconds
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.sample_rate)
    }
}

/// Messages from the engines
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    PositionUpdate(f64),
    PlayheadUpdate(f64),
    MeterUpdate { level: f32, peak: f32 },
    WaveformUpdate(Vec<f32>),
    RecordingComplete(RecordedAudio),
    PlaybackEnded,
    Error(String),
}

// ═══════════════════════════════════════════════════════════════════════════
// TRANSPORT
// ═══════════════════════════════════════════════════════════════════════════

pub struct Transport {
    playback: SharedPlayback,
    recorder: Option<SharedRecorder>,
    events_tx: Sender<TransportEvent>,
    events_rx: Receiver<TransportEvent>,
    config: RecordingConfig,
    playing: bool,
    /// Store revision last pushed to the playback engine
    loaded_revision: Option<u64>,
    recording_start: f64,
    meter: (f32, f32),
    live_waveform: Vec<f32>,
}

impl Transport {
    pub fn new(playback: SharedPlayback, recorder: Option<SharedRecorder>, config: &RecordingConfig) -> Self {
        let (events_tx, events_rx) = unbounded();
        Self {
            playback,
            recorder,
            events_tx,
            events_rx,
            config: config.clone(),
            playing: false,
            loaded_revision: None,
            recording_start: 0.0,
            meter: (0.0, 0.0),
            live_waveform: Vec::new(),
        }
    }

    /// Handle for engines to post events
    pub fn event_sender(&self) -> Sender<TransportEvent> {
        self.events_tx.clone()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Latest `(level, peak)` from the input meter
    pub fn meter(&self) -> (f32, f32) {
        self.meter
    }

    /// Peaks received so far for the take in progress
    pub fn live_waveform(&self) -> &[f32] {
        &self.live_waveform
    }

    // ─────────────────────────────────────────────────────────────────────
    // Playback
    // ─────────────────────────────────────────────────────────────────────

    /// Play from the playhead, or pause if playing. `revision` is the store
    /// revision; clips are reloaded only when it moved.
    pub fn toggle_play(&mut self, state: &EditorState, revision: u64) -> TransportResult<()> {
        let mut engine = self.playback.lock();
        if self.playing {
            engine.pause()?;
            self.playing = false;
            log::info!("playback paused");
            return Ok(());
        }

        if self.loaded_revision != Some(revision) {
            engine.load_clips(&state.tracks, state.playhead_position)?;
            self.loaded_revision = Some(revision);
        }
        match state.time_selection.filter(|r| !r.is_empty()) {
            Some(range) => {
                engine.set_loop_region(range.start_time, range.end_time)?;
                engine.set_loop_enabled(true)?;
            }
            None => engine.set_loop_enabled(false)?,
        }
        engine.play(state.playhead_position)?;
        self.playing = true;
        log::info!("playback started at {:.3}s", state.playhead_position);
        Ok(())
    }

    pub fn stop(&mut self) -> TransportResult<()> {
        self.playback.lock().stop()?;
        self.playing = false;
        log::info!("playback stopped");
        Ok(())
    }

    pub fn seek(&mut self, position: f64) -> TransportResult<()> {
        self.playback.lock().seek(position.max(0.0))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Recording
    // ─────────────────────────────────────────────────────────────────────

    /// Start capturing. Returns the actions that mark the record target;
    /// on error nothing should be dispatched.
    pub fn start_recording(&mut self, state: &EditorState) -> TransportResult<Vec<Action>> {
        let recorder = self.recorder.as_ref().ok_or(TransportError::NotReady)?;

        let mut actions = Vec::new();
        let target = state
            .selected_track_indices
            .iter()
            .copied()
            .find(|&i| state.track(i).is_some_and(Track::is_audio));
        let track_index = match target {
            Some(index) => index,
            None => {
                let id = state.next_track_id();
                actions.push(Action::AddTrack(Track::audio(id, &format!("Audio {}", id))));
                state.tracks.len()
            }
        };

        {
            let mut recorder = recorder.lock();
            recorder.start_monitoring()?;
            recorder.start_recording(state.playhead_position)?;
        }
        self.recording_start = state.playhead_position;
        self.live_waveform.clear();
        log::info!(
            "recording on track {} from {:.3}s",
            track_index,
            state.playhead_position
        );

        actions.push(Action::StartRecording { track_index });
        Ok(actions)
    }

    /// Ask the source to finish; the take arrives as `RecordingComplete`
    pub fn stop_recording(&mut self) -> TransportResult<()> {
        let recorder = self.recorder.as_ref().ok_or(TransportError::NotReady)?;
        recorder.lock().stop_recording()?;
        log::info!("recording stop requested");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Events
    // ─────────────────────────────────────────────────────────────────────

    /// Drain pending engine events into editor actions
    pub fn poll(&mut self, state: &EditorState) -> Vec<Action> {
        let mut actions = Vec::new();
        let mut next_id = state.next_clip_id().0;

        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                TransportEvent::PositionUpdate(position) | TransportEvent::PlayheadUpdate(position) => {
                    actions.push(Action::SetPlayhead(position));
                }
                TransportEvent::MeterUpdate { level, peak } => self.meter = (level, peak),
                TransportEvent::WaveformUpdate(samples) => self.live_waveform.extend(samples),
                TransportEvent::PlaybackEnded => {
                    self.playing = false;
                    log::info!("playback ended");
                }
                TransportEvent::Error(message) => log::warn!("transport: {}", message),
                TransportEvent::RecordingComplete(audio) => {
                    if let Some(clip) = self.recorded_clip(ClipId(next_id), &audio) {
                        if let Some(track_index) = state.recording_track_index {
                            next_id += 1;
                            actions.push(Action::AddClip { track_index, clip });
                        } else {
                            log::warn!("recording finished with no target track; take dropped");
                        }
                    }
                    self.live_waveform.clear();
                    actions.push(Action::StopRecording);
                }
            }
        }
        actions
    }

    fn recorded_clip(&self, id: ClipId, audio: &RecordedAudio) -> Option<Clip> {
        let duration = audio.duration();
        if duration <= 0.0 {
            log::warn!("empty recording discarded");
            return None;
        }
        let chunk = (audio.sample_rate / self.config.peaks_per_second.max(1)).max(1) as usize;
        let mut clip = Clip::new(id, &format!("Recording {}", id), self.recording_start, duration)
            .with_waveform(mixed_peaks(&audio.channels, chunk))
            .with_color(self.config.clip_color);
        if let [left, right] = audio.channels.as_slice() {
            clip = clip.with_stereo(peaks(left, chunk), peaks(right, chunk));
        }
        clip.full_duration = Some(clip.duration);
        log::debug!("recorded clip {} ({:.3}s)", id, duration);
        Some(clip)
    }
}

/// Absolute peak per `chunk` samples
pub fn peaks(samples: &[f32], chunk: usize) -> Vec<f32> {
    samples
        .chunks(chunk.max(1))
        .map(|c| c.iter().fold(0.0_f32, |m, s| m.max(s.abs())))
        .collect()
}

/// Peak across all channels per `chunk` frames
fn mixed_peaks(channels: &[Vec<f32>], chunk: usize) -> Vec<f32> {
    let per_channel: Vec<Vec<f32>> = channels.iter().map(|c| peaks(c, chunk)).collect();
    let len = per_channel.iter().map(Vec::len).max().unwrap_or(0);
    (0..len)
        .map(|i| {
            per_channel
                .iter()
                .filter_map(|p| p.get(i))
                .fold(0.0_f32, |m, &v| m.max(v))
        })
        .collect()
}
