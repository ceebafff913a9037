//! maptune: a map-based background music player.
//!
//! Hotspots on a map are bound to tracks; selecting one crossfades the
//! single output to that track. The [`audio::AudioPlayer`] owns the output
//! pipeline, the decoded-audio cache and the crossfade state.

pub mod audio;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
#[cfg(any(test, feature = "test-util"))]
#[doc(hidden)]
pub mod testutil;
pub mod ui;
