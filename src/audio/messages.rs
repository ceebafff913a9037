use std::time::Duration;

use crate::catalog::Track;
use crate::error::AudioError;

#[derive(Debug)]
pub enum PlayerCommand {
    /// Crossfade to `track`; `None` uses the configured fade.
    Play {
        track: Track,
        fade: Option<Duration>,
    },
    Stop {
        fade: Option<Duration>,
    },
    SetVolume(f32),
    /// Decode into the cache without playing
    Prefetch(Track),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    NowPlaying { track_id: String, title: String },
    Stopped,
    VolumeChanged(f32),
    Prefetched { track_id: String },
    /// A command failed; `track_id` names the track when one was involved.
    Error {
        track_id: Option<String>,
        message: String,
    },
}

impl From<&AudioError> for PlayerEvent {
    fn from(err: &AudioError) -> Self {
        PlayerEvent::Error {
            track_id: err.track_id().map(str::to_owned),
            message: err.to_string(),
        }
    }
}
