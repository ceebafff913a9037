//! Playback engine errors.

use super::{DecodeError, LoadError};

/// Errors surfaced by the playback engine to its caller.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("failed to load {track_id}: {source}")]
    Load {
        track_id: String,
        #[source]
        source: LoadError,
    },

    #[error("failed to decode {track_id}: {source}")]
    Decode {
        track_id: String,
        #[source]
        source: DecodeError,
    },

    /// The output device could not be opened or resumed
    #[error("audio output unavailable: {0}")]
    Output(String),
}

impl AudioError {
    pub fn track_id(&self) -> Option<&str> {
        match self {
            AudioError::Load { track_id, .. } | AudioError::Decode { track_id, .. } => {
                Some(track_id)
            }
            AudioError::Output(_) => None,
        }
    }
}

/// A best-effort stop of an outgoing source did not go through.
///
/// Only ever logged: by the time teardown runs the source is silent and no
/// longer referenced by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TeardownWarning {
    #[error("source was already stopped")]
    AlreadyStopped,

    #[error("source was never started")]
    NotStarted,
}
