//! Playback: decoding, caching, gain automation and crossfades.

pub mod automation;
mod cache;
mod decode;
mod download;
mod engine;
mod fade;
pub mod graph;
mod messages;
pub mod output;
mod worker;

pub use cache::TrackCache;
pub use decode::{DecodedAudio, decode_bytes};
pub use download::{AssetFetcher, AssetLoader};
pub use engine::AudioPlayer;
pub use fade::teardown_delay;
pub use messages::{PlayerCommand, PlayerEvent};
pub use output::AudioBackend;
pub use worker::spawn_player;
