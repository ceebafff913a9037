//! Nodes of the playback graph: buffer sources and gain stages.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use super::automation::AudioParam;
use super::decode::DecodedAudio;
use crate::catalog::Track;
use crate::error::TeardownWarning;

/// Loop window of a buffer source, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopRegion {
    pub start: Option<f64>,
    pub end: Option<f64>,
}

impl LoopRegion {
    pub fn for_track(track: &Track) -> Option<Self> {
        track.looping.then_some(Self {
            start: track.loop_start,
            end: track.loop_end,
        })
    }

    /// Loop bounds in frames. A missing start loops from the top, a missing
    /// or zero end loops to the end of the buffer. An inverted window or one
    /// outside the buffer falls back to the whole buffer.
    pub fn frames(&self, audio: &DecodedAudio) -> (usize, usize) {
        let total = audio.frames();
        let rate = audio.sample_rate() as f64;
        let start_frame = self
            .start
            .filter(|s| *s >= 0.0)
            .map_or(0, |s| (s * rate) as usize);
        let end_frame = self
            .end
            .filter(|e| *e > 0.0)
            .map_or(total, |e| ((e * rate) as usize).min(total));
        if start_frame >= end_frame {
            return (0, total);
        }
        (start_frame, end_frame)
    }
}

const IDLE: u8 = 0;
const PLAYING: u8 = 1;
const STOPPED: u8 = 2;
const ENDED: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    /// Connected, not yet started: renders silence.
    Idle,
    Playing,
    /// Explicitly stopped.
    Stopped,
    /// Reached the end of a non-looping buffer.
    Ended,
}

/// A one-shot player of a decoded buffer.
///
/// Handles are shared with the render thread; state changes are visible to
/// it on the next frame.
#[derive(Debug, Clone)]
pub struct SourceNode {
    audio: Arc<DecodedAudio>,
    looping: Option<LoopRegion>,
    state: Arc<AtomicU8>,
}

impl SourceNode {
    pub fn new(audio: Arc<DecodedAudio>) -> Self {
        Self {
            audio,
            looping: None,
            state: Arc::new(AtomicU8::new(IDLE)),
        }
    }

    pub fn set_loop(&mut self, region: Option<LoopRegion>) {
        self.looping = region;
    }

    pub fn audio(&self) -> &Arc<DecodedAudio> {
        &self.audio
    }

    pub fn loop_region(&self) -> Option<LoopRegion> {
        self.looping
    }

    pub fn state(&self) -> SourceState {
        match self.state.load(Ordering::Acquire) {
            IDLE => SourceState::Idle,
            PLAYING => SourceState::Playing,
            STOPPED => SourceState::Stopped,
            _ => SourceState::Ended,
        }
    }

    /// Starts rendering. Starting twice is a no-op.
    pub fn start(&self) {
        let _ = self
            .state
            .compare_exchange(IDLE, PLAYING, Ordering::AcqRel, Ordering::Acquire);
    }

    pub fn stop(&self) -> Result<(), TeardownWarning> {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            match current {
                IDLE => return Err(TeardownWarning::NotStarted),
                STOPPED => return Err(TeardownWarning::AlreadyStopped),
                _ => {}
            }
            match self.state.compare_exchange(
                current,
                STOPPED,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Ok(()),
                Err(actual) => current = actual,
            }
        }
    }

    /// Called by the renderer when a non-looping buffer runs out.
    pub(crate) fn mark_ended(&self) {
        let _ = self
            .state
            .compare_exchange(PLAYING, ENDED, Ordering::AcqRel, Ordering::Acquire);
    }
}

/// A volume stage whose gain can be scheduled.
#[derive(Debug, Clone)]
pub struct GainNode {
    gain: AudioParam,
}

impl GainNode {
    pub fn new(value: f32) -> Self {
        Self {
            gain: AudioParam::new(value),
        }
    }

    pub fn gain(&self) -> &AudioParam {
        &self.gain
    }
}

/// One playing track: its source and its private gain stage.
#[derive(Debug, Clone)]
pub struct SoundInstance {
    pub track_id: String,
    pub source: SourceNode,
    pub gain: GainNode,
}
