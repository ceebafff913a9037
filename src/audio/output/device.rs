use rodio::mixer::{self, Mixer, MixerSource};
use rodio::{ChannelCount, OutputStream, OutputStreamBuilder, Sample, SampleRate, Source};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::{OutputBackend, OutputDevice};
use crate::audio::automation::AudioParam;
use crate::audio::decode::DecodedAudio;
use crate::audio::graph::{GainNode, SourceNode, SourceState};
use crate::error::AudioError;

/// Format of the private mix bus. rodio converts it to the device format.
pub const MASTER_CHANNELS: ChannelCount = 2;
pub const MASTER_SAMPLE_RATE: SampleRate = 48_000;

/// Gains are re-evaluated once per block of this many frames.
const GAIN_BLOCK_FRAMES: u32 = 32;

/// Output clock: frames rendered by the master stage.
#[derive(Debug, Clone)]
pub struct FrameClock {
    frames: Arc<AtomicU64>,
    sample_rate: u32,
}

impl FrameClock {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            frames: Arc::new(AtomicU64::new(0)),
            sample_rate: sample_rate.max(1),
        }
    }

    pub fn now(&self) -> f64 {
        self.frames.load(Ordering::Relaxed) as f64 / self.sample_rate as f64
    }

    fn tick(&self) {
        self.frames.fetch_add(1, Ordering::Relaxed);
    }
}

pub struct RodioBackend;

impl OutputBackend for RodioBackend {
    fn open(&self, master: GainNode) -> Result<Box<dyn OutputDevice>, AudioError> {
        let stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| AudioError::Output(e.to_string()))?;
        let (bus, bus_source) = mixer::mixer(MASTER_CHANNELS, MASTER_SAMPLE_RATE);
        let clock = FrameClock::new(MASTER_SAMPLE_RATE);
        stream
            .mixer()
            .add(MasterStage::new(bus_source, master.gain().clone(), clock.clone()));
        tracing::info!(
            channels = MASTER_CHANNELS,
            sample_rate = MASTER_SAMPLE_RATE,
            "audio output opened"
        );
        Ok(Box::new(RodioDevice {
            _stream: stream,
            bus,
            clock,
        }))
    }
}

struct RodioDevice {
    _stream: OutputStream,
    bus: Mixer,
    clock: FrameClock,
}

impl OutputDevice for RodioDevice {
    fn current_time(&self) -> f64 {
        self.clock.now()
    }

    fn is_suspended(&self) -> bool {
        false
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        Ok(())
    }

    fn connect(&mut self, source: &SourceNode, gain: &GainNode) {
        self.bus.add(VoiceSource::new(
            source.clone(),
            gain.gain().clone(),
            self.clock.clone(),
        ));
    }
}

/// Applies the master gain to the mix bus and advances the clock.
/// Never ends; renders silence when nothing is connected.
struct MasterStage {
    inner: MixerSource,
    gain: AudioParam,
    clock: FrameClock,
    channels: ChannelCount,
    channel: ChannelCount,
    frame_gain: f32,
    refresh_in: u32,
}

impl MasterStage {
    fn new(inner: MixerSource, gain: AudioParam, clock: FrameClock) -> Self {
        let channels = inner.channels().max(1);
        Self {
            inner,
            gain,
            clock,
            channels,
            channel: 0,
            frame_gain: 0.0,
            refresh_in: 0,
        }
    }
}

impl Iterator for MasterStage {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        if self.channel == 0 {
            self.clock.tick();
            if self.refresh_in == 0 {
                self.frame_gain = self.gain.value_at(self.clock.now());
                self.refresh_in = GAIN_BLOCK_FRAMES;
            }
            self.refresh_in -= 1;
        }
        let sample = self.inner.next().unwrap_or(0.0) * self.frame_gain;
        self.channel = (self.channel + 1) % self.channels;
        Some(sample)
    }
}

impl Source for MasterStage {
    fn current_span_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> ChannelCount {
        self.channels
    }

    fn sample_rate(&self) -> SampleRate {
        self.inner.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

/// Renders one buffer source through its gain stage.
struct VoiceSource {
    node: SourceNode,
    audio: Arc<DecodedAudio>,
    window: Option<(usize, usize)>,
    gain: AudioParam,
    clock: FrameClock,
    channels: usize,
    frame: usize,
    channel: usize,
    silent: bool,
    frame_gain: f32,
    refresh_in: u32,
}

impl VoiceSource {
    fn new(node: SourceNode, gain: AudioParam, clock: FrameClock) -> Self {
        let audio = Arc::clone(node.audio());
        let window = node.loop_region().map(|r| r.frames(&audio));
        Self {
            channels: audio.channels() as usize,
            audio,
            window,
            node,
            gain,
            clock,
            frame: 0,
            channel: 0,
            silent: true,
            frame_gain: 0.0,
            refresh_in: 0,
        }
    }

    /// Decides how the next frame renders. `false` ends the voice.
    fn begin_frame(&mut self) -> bool {
        match self.node.state() {
            SourceState::Stopped | SourceState::Ended => return false,
            SourceState::Idle => {
                self.silent = true;
                return true;
            }
            SourceState::Playing => self.silent = false,
        }

        let end = self.window.map_or(self.audio.frames(), |(_, end)| end);
        if self.frame >= end {
            match self.window {
                Some((start, _)) => self.frame = start,
                None => {
                    self.node.mark_ended();
                    return false;
                }
            }
        }

        if self.refresh_in == 0 {
            self.frame_gain = self.gain.value_at(self.clock.now());
            self.refresh_in = GAIN_BLOCK_FRAMES;
        }
        self.refresh_in -= 1;
        true
    }
}

impl Iterator for VoiceSource {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        if self.channel == 0 && !self.begin_frame() {
            return None;
        }
        let sample = if self.silent {
            0.0
        } else {
            self.audio.samples()[self.frame * self.channels + self.channel] * self.frame_gain
        };
        self.channel += 1;
        if self.channel == self.channels {
            self.channel = 0;
            if !self.silent {
                self.frame += 1;
            }
        }
        Some(sample)
    }
}

impl Source for VoiceSource {
    fn current_span_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> ChannelCount {
        self.audio.channels()
    }

    fn sample_rate(&self) -> SampleRate {
        self.audio.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}
