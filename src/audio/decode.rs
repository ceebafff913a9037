use rodio::{Decoder, Source};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use crate::error::DecodeError;

/// A fully decoded track: interleaved `f32` samples.
#[derive(Debug)]
pub struct DecodedAudio {
    channels: u16,
    sample_rate: u32,
    samples: Arc<[f32]>,
}

impl DecodedAudio {
    pub fn new(channels: u16, sample_rate: u32, samples: Vec<f32>) -> Self {
        Self {
            channels: channels.max(1),
            sample_rate: sample_rate.max(1),
            samples: samples.into(),
        }
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }
}

/// Decodes a whole payload in memory. Blocking; see [`decode_in_background`].
pub fn decode_bytes(bytes: Vec<u8>) -> Result<DecodedAudio, DecodeError> {
    let decoder = Decoder::new(Cursor::new(bytes))?;
    let channels = decoder.channels();
    let sample_rate = decoder.sample_rate();
    let samples: Vec<f32> = decoder.collect();
    if samples.len() < channels.max(1) as usize {
        return Err(DecodeError::Empty);
    }
    Ok(DecodedAudio::new(channels, sample_rate, samples))
}

pub async fn decode_in_background(bytes: Vec<u8>) -> Result<DecodedAudio, DecodeError> {
    tokio::task::spawn_blocking(move || decode_bytes(bytes)).await?
}
