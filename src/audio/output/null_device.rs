use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::time::Instant;

use super::{OutputBackend, OutputDevice};
use crate::audio::graph::{GainNode, SourceNode};
use crate::error::AudioError;

#[derive(Debug, Default)]
struct NullStats {
    opens: AtomicUsize,
    resumes: AtomicUsize,
    connections: AtomicUsize,
    master: Mutex<Option<GainNode>>,
}

/// Headless output. The clock follows `tokio::time`, so a paused test
/// runtime drives it deterministically.
#[derive(Debug, Clone, Default)]
pub struct NullBackend {
    start_suspended: bool,
    stats: Arc<NullStats>,
}

impl NullBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A device that comes up suspended and must be resumed.
    pub fn suspended() -> Self {
        Self {
            start_suspended: true,
            ..Self::default()
        }
    }

    pub fn opens(&self) -> usize {
        self.stats.opens.load(Ordering::Relaxed)
    }

    pub fn resumes(&self) -> usize {
        self.stats.resumes.load(Ordering::Relaxed)
    }

    pub fn connections(&self) -> usize {
        self.stats.connections.load(Ordering::Relaxed)
    }

    /// The master gain stage handed to the most recent `open`.
    pub fn last_master(&self) -> Option<GainNode> {
        self.stats.master.lock().clone()
    }
}

impl OutputBackend for NullBackend {
    fn open(&self, master: GainNode) -> Result<Box<dyn OutputDevice>, AudioError> {
        self.stats.opens.fetch_add(1, Ordering::Relaxed);
        *self.stats.master.lock() = Some(master);
        tracing::info!(suspended = self.start_suspended, "null audio output opened");
        Ok(Box::new(NullDevice {
            epoch: Instant::now(),
            suspended: self.start_suspended,
            stats: Arc::clone(&self.stats),
        }))
    }
}

struct NullDevice {
    epoch: Instant,
    suspended: bool,
    stats: Arc<NullStats>,
}

impl OutputDevice for NullDevice {
    fn current_time(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    fn is_suspended(&self) -> bool {
        self.suspended
    }

    fn resume(&mut self) -> Result<(), AudioError> {
        self.stats.resumes.fetch_add(1, Ordering::Relaxed);
        self.suspended = false;
        Ok(())
    }

    fn connect(&mut self, _source: &SourceNode, _gain: &GainNode) {
        self.stats.connections.fetch_add(1, Ordering::Relaxed);
    }
}
