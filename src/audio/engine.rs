use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::cache::TrackCache;
use super::download::AssetFetcher;
use super::fade::{fade_out_and_release, schedule_fade_in};
use super::graph::{GainNode, LoopRegion, SoundInstance, SourceNode};
use super::output::{OutputBackend, OutputDevice};
use crate::catalog::Track;
use crate::config::PlayerConfig;
use crate::error::AudioError;

/// Device plus master gain, created on first use.
struct OutputPipeline {
    device: Box<dyn OutputDevice>,
    master: GainNode,
}

/// Crossfading single-track player.
///
/// At most one instance is active; every instance replaced by `play` or
/// released by `stop` fades out on its own and is stopped by its own
/// teardown task.
pub struct AudioPlayer {
    backend: Box<dyn OutputBackend>,
    pipeline: Option<OutputPipeline>,
    cache: TrackCache,
    active: Option<SoundInstance>,
    volume: f32,
    fade_in: Duration,
    fade_out: Duration,
    teardown_margin: Duration,
    draining: Arc<AtomicUsize>,
}

impl AudioPlayer {
    pub fn new(
        backend: Box<dyn OutputBackend>,
        fetcher: Arc<dyn AssetFetcher>,
        config: &PlayerConfig,
    ) -> Self {
        Self {
            backend,
            pipeline: None,
            cache: TrackCache::new(fetcher),
            active: None,
            volume: clamp_volume(config.volume),
            fade_in: Duration::from_millis(config.fade_in_ms),
            fade_out: Duration::from_millis(config.fade_out_ms),
            teardown_margin: Duration::from_millis(config.teardown_margin_ms),
            draining: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Opens the output on first call; later calls return at once.
    pub async fn ensure_ready(&mut self) -> Result<(), AudioError> {
        if self.pipeline.is_some() {
            return Ok(());
        }

        let master = GainNode::new(self.volume);
        let mut device = self.backend.open(master.clone())?;
        if device.is_suspended() {
            tracing::debug!("audio output suspended, resuming");
            device.resume()?;
        }
        tracing::info!(volume = self.volume, "audio pipeline ready");
        self.pipeline = Some(OutputPipeline { device, master });
        Ok(())
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Clamps to `[0, 1]` and applies immediately, without a ramp. NaN is
    /// treated as silence.
    pub fn set_volume(&mut self, value: f32) {
        self.volume = clamp_volume(value);
        if let Some(pipeline) = &self.pipeline {
            pipeline.master.gain().set_value(self.volume);
        }
        tracing::debug!(volume = self.volume, "volume set");
    }

    pub async fn play(&mut self, track: &Track) -> Result<(), AudioError> {
        self.play_with_fade(track, self.fade_in).await
    }

    /// Crossfades from the active track (if any) to `track`.
    ///
    /// On a load or decode failure nothing changes: the current track keeps
    /// playing.
    pub async fn play_with_fade(&mut self, track: &Track, fade: Duration) -> Result<(), AudioError> {
        self.ensure_ready().await?;
        let audio = match self.cache.get(track).await {
            Ok(audio) => audio,
            Err(e) => {
                tracing::error!(track_id = %track.id, err = %e, "track load failed");
                return Err(e);
            }
        };
        let Some(pipeline) = self.pipeline.as_mut() else {
            return Err(AudioError::Output("audio pipeline missing".to_owned()));
        };

        let mut source = SourceNode::new(audio);
        source.set_loop(LoopRegion::for_track(track));
        let gain = GainNode::new(0.0);
        pipeline.device.connect(&source, &gain);

        let now = pipeline.device.current_time();
        if let Some(previous) = self.active.take() {
            fade_out_and_release(previous, now, fade, self.teardown_margin, &self.draining);
        }
        schedule_fade_in(&gain, now, fade);
        source.start();

        tracing::info!(
            track_id = %track.id,
            title = %track.title,
            at = now,
            fade_ms = fade.as_millis() as u64,
            "now playing"
        );
        self.active = Some(SoundInstance {
            track_id: track.id.clone(),
            source,
            gain,
        });
        Ok(())
    }

    pub fn stop(&mut self) {
        self.stop_with_fade(self.fade_out);
    }

    /// Fades the active track to silence and forgets it right away; a later
    /// `play` does not wait for this fade.
    pub fn stop_with_fade(&mut self, fade: Duration) {
        let Some(pipeline) = self.pipeline.as_ref() else {
            return;
        };
        let Some(current) = self.active.take() else {
            return;
        };
        let now = pipeline.device.current_time();
        tracing::info!(track_id = %current.track_id, at = now, "stopping");
        fade_out_and_release(current, now, fade, self.teardown_margin, &self.draining);
    }

    /// Decodes `track` into the cache without playing it.
    pub async fn prefetch(&mut self, track: &Track) -> Result<(), AudioError> {
        self.cache.get(track).await.map(|_| ())
    }

    pub fn active(&self) -> Option<&SoundInstance> {
        self.active.as_ref()
    }

    /// Outgoing instances whose teardown has not fired yet.
    pub fn draining(&self) -> usize {
        self.draining.load(Ordering::Acquire)
    }

    pub fn is_ready(&self) -> bool {
        self.pipeline.is_some()
    }

    pub fn current_time(&self) -> Option<f64> {
        self.pipeline.as_ref().map(|p| p.device.current_time())
    }

    pub fn cache(&self) -> &TrackCache {
        &self.cache
    }
}

fn clamp_volume(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::automation::AutomationEvent;
    use crate::audio::graph::SourceState;
    use crate::audio::output::NullBackend;
    use crate::testutil::{FakeFetcher, assert_event, wav_bytes};

    fn player(backend: NullBackend) -> (AudioPlayer, Arc<FakeFetcher>) {
        let fetcher = Arc::new(
            FakeFetcher::default()
                .with("/t1.wav", wav_bytes(1, 8_000, 8_000))
                .with("/t2.wav", wav_bytes(2, 8_000, 4_000)),
        );
        let p = AudioPlayer::new(Box::new(backend), fetcher.clone(), &PlayerConfig::default());
        (p, fetcher)
    }

    fn t1() -> Track {
        Track::new("t1", "One", "/t1.wav").looped()
    }

    fn t2() -> Track {
        Track::new("t2", "Two", "/t2.wav")
    }

    #[test]
    fn volume_is_clamped() {
        let (mut p, _) = player(NullBackend::new());
        p.set_volume(1.5);
        assert_eq!(p.volume(), 1.0);
        p.set_volume(-0.2);
        assert_eq!(p.volume(), 0.0);
        p.set_volume(0.35);
        assert_eq!(p.volume(), 0.35);
        p.set_volume(f32::NAN);
        assert_eq!(p.volume(), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn ensure_ready_opens_once_and_resumes() {
        let backend = NullBackend::suspended();
        let (mut p, _) = player(backend.clone());
        assert!(!p.is_ready());

        p.ensure_ready().await.expect("ready");
        p.ensure_ready().await.expect("ready again");
        assert!(p.is_ready());
        assert_eq!(backend.opens(), 1);
        assert_eq!(backend.resumes(), 1);
        assert_eq!(backend.connections(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn volume_reaches_master_gain_without_ramp() {
        let backend = NullBackend::new();
        let (mut p, _) = player(backend.clone());
        p.set_volume(0.3);
        assert!(backend.last_master().is_none());

        p.ensure_ready().await.expect("ready");
        let master = backend.last_master().expect("master wired at open");
        let now = p.current_time().expect("clock");
        assert!((master.gain().value_at(now) - 0.3).abs() < 1e-6);

        tokio::time::advance(Duration::from_millis(250)).await;
        p.set_volume(0.7);
        let now = p.current_time().expect("clock");
        assert!((master.gain().value_at(now) - 0.7).abs() < 1e-6);
        assert!(master.gain().events().is_empty(), "volume changes are not ramped");

        p.set_volume(4.0);
        assert_eq!(master.gain().value_at(now), 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_without_pipeline_is_a_no_op() {
        let backend = NullBackend::new();
        let (mut p, _) = player(backend.clone());
        p.stop();
        assert_eq!(backend.opens(), 0);
        assert_eq!(p.draining(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn first_play_fades_in_from_silence() {
        let (mut p, _) = player(NullBackend::new());
        p.play(&t1()).await.expect("play");

        let active = p.active().expect("active");
        assert_eq!(active.track_id, "t1");
        assert_eq!(active.source.state(), SourceState::Playing);
        let events = active.gain.gain().events();
        assert_eq!(events.len(), 2);
        assert_event(events[0], AutomationEvent::SetValue { time: 0.0, value: 0.0 });
        assert_event(events[1], AutomationEvent::LinearRamp { end_time: 0.6, value: 1.0 });
        assert_eq!(p.draining(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn play_mid_fade_ramps_down_from_live_value() {
        let (mut p, _) = player(NullBackend::new());
        p.play(&t1()).await.expect("play t1");
        let first = p.active().cloned().expect("t1 active");

        tokio::time::advance(Duration::from_millis(100)).await;
        p.play_with_fade(&t2(), Duration::from_millis(300))
            .await
            .expect("play t2");

        let events = first.gain.gain().events();
        assert_eq!(events.len(), 3);
        assert_event(events[0], AutomationEvent::SetValue { time: 0.0, value: 0.0 });
        assert_event(events[1], AutomationEvent::SetValue { time: 0.1, value: 0.1 / 0.6 });
        assert_event(events[2], AutomationEvent::LinearRamp { end_time: 0.4, value: 0.0 });

        let second = p.active().expect("t2 active");
        let events = second.gain.gain().events();
        assert_event(events[0], AutomationEvent::SetValue { time: 0.1, value: 0.0 });
        assert_event(events[1], AutomationEvent::LinearRamp { end_time: 0.4, value: 1.0 });
        assert_eq!(p.draining(), 1);
    }
}

