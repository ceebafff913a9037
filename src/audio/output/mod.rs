//! The device end of the playback graph.
//!
//! An [`OutputBackend`] opens an [`OutputDevice`] once; the device owns the
//! output clock and renders every connected source through its gain stage
//! and the master gain.

mod device;
mod null_device;

pub use device::{FrameClock, MASTER_CHANNELS, MASTER_SAMPLE_RATE, RodioBackend};
pub use null_device::NullBackend;

use super::graph::{GainNode, SourceNode};
use crate::error::AudioError;

pub trait OutputBackend: Send {
    /// Acquires the device and wires `master` in front of it.
    fn open(&self, master: GainNode) -> Result<Box<dyn OutputDevice>, AudioError>;
}

pub trait OutputDevice {
    /// Seconds on the device's monotonic clock.
    fn current_time(&self) -> f64;

    fn is_suspended(&self) -> bool;

    fn resume(&mut self) -> Result<(), AudioError>;

    /// Routes `source → gain → master`. The source renders silence until
    /// started and is dropped from the mix once stopped.
    fn connect(&mut self, source: &SourceNode, gain: &GainNode);
}

/// Which backend the player opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioBackend {
    /// Default output device through rodio.
    Real,
    /// No device; keeps time but renders nothing.
    Null,
}

impl AudioBackend {
    pub fn into_backend(self) -> Box<dyn OutputBackend> {
        match self {
            AudioBackend::Real => Box::new(RodioBackend),
            AudioBackend::Null => Box::new(NullBackend::new()),
        }
    }
}
