//! Fixtures shared by the unit tests and the integration suites.
//!
//! Compiled for `cfg(test)` and behind the `test-util` feature.

use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::Cursor;

use crate::audio::AssetFetcher;
use crate::audio::automation::AutomationEvent;
use crate::error::LoadError;

/// A WAV file of `frames` frames holding a quiet sine on every channel.
pub fn wav_bytes(channels: u16, sample_rate: u32, frames: usize) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut out = Vec::new();
    {
        let mut writer = hound::WavWriter::new(Cursor::new(&mut out), spec).expect("wav writer");
        for i in 0..frames {
            let t = i as f32 / sample_rate as f32;
            let v = ((t * 440.0 * std::f32::consts::TAU).sin() * 8_000.0) as i16;
            for _ in 0..channels {
                writer.write_sample(v).expect("write sample");
            }
        }
        writer.finalize().expect("finalize wav");
    }
    out
}

/// In-memory asset source that counts requests per uri. Unknown uris answer
/// with a 404.
#[derive(Debug, Default)]
pub struct FakeFetcher {
    assets: HashMap<String, Vec<u8>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl FakeFetcher {
    pub fn with(mut self, uri: &str, bytes: Vec<u8>) -> Self {
        self.assets.insert(uri.to_owned(), bytes);
        self
    }

    pub fn calls(&self, uri: &str) -> usize {
        self.calls.lock().get(uri).copied().unwrap_or(0)
    }
}

impl AssetFetcher for FakeFetcher {
    fn fetch<'a>(&'a self, uri: &'a str) -> BoxFuture<'a, Result<Vec<u8>, LoadError>> {
        *self.calls.lock().entry(uri.to_owned()).or_insert(0) += 1;
        let res = self.assets.get(uri).cloned().ok_or_else(|| LoadError::Status {
            status: reqwest::StatusCode::NOT_FOUND,
            uri: uri.to_owned(),
        });
        Box::pin(async move { res })
    }
}

/// Same kind, time within 1µs, value within 1e-4.
pub fn assert_event(actual: AutomationEvent, expected: AutomationEvent) {
    assert!(
        std::mem::discriminant(&actual) == std::mem::discriminant(&expected)
            && (actual.time() - expected.time()).abs() < 1e-6
            && (actual.value() - expected.value()).abs() < 1e-4,
        "{actual:?} != {expected:?}"
    );
}
