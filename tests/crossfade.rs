use std::sync::Arc;
use std::time::Duration;

use maptune::audio::AudioPlayer;
use maptune::audio::automation::AutomationEvent;
use maptune::audio::graph::{SoundInstance, SourceState};
use maptune::audio::output::NullBackend;
use maptune::catalog::Track;
use maptune::config::PlayerConfig;
use maptune::error::{AudioError, LoadError};
use maptune::testutil::{FakeFetcher, assert_event, wav_bytes};

fn t1() -> Track {
    Track::new("t1", "Field", "/t1.wav").looped()
}

fn t2() -> Track {
    Track::new("t2", "Town", "/t2.wav")
}

fn t3() -> Track {
    Track::new("t3", "Dungeon", "/t3.wav").with_loop_window(0.1, 0.4)
}

async fn player() -> (AudioPlayer, Arc<FakeFetcher>) {
    let fetcher = Arc::new(
        FakeFetcher::default()
            .with("/t1.wav", wav_bytes(1, 8_000, 8_000))
            .with("/t2.wav", wav_bytes(2, 8_000, 4_000))
            .with("/t3.wav", wav_bytes(2, 8_000, 4_000)),
    );
    let mut p = AudioPlayer::new(
        Box::new(NullBackend::new()),
        fetcher.clone(),
        &PlayerConfig::default(),
    );
    // decode up front so the timed sections never wait on blocking work
    for track in [t1(), t2(), t3()] {
        p.prefetch(&track).await.expect("prefetch");
    }
    (p, fetcher)
}

fn active(p: &AudioPlayer) -> SoundInstance {
    p.active().cloned().expect("active instance")
}

#[tokio::test(start_paused = true)]
async fn crossfade_mid_fade_in_ramps_from_live_gain_and_tears_down() {
    let (mut p, _) = player().await;
    p.play(&t1()).await.expect("play t1");
    let first = active(&p);

    tokio::time::sleep(Duration::from_millis(100)).await;
    p.play_with_fade(&t2(), Duration::from_millis(300))
        .await
        .expect("play t2");

    let events = first.gain.gain().events();
    assert_eq!(events.len(), 3);
    assert_event(events[1], AutomationEvent::SetValue { time: 0.1, value: 0.1 / 0.6 });
    assert_event(events[2], AutomationEvent::LinearRamp { end_time: 0.4, value: 0.0 });

    let second = active(&p);
    assert_eq!(second.track_id, "t2");
    let events = second.gain.gain().events();
    assert_event(events[0], AutomationEvent::SetValue { time: 0.1, value: 0.0 });
    assert_event(events[1], AutomationEvent::LinearRamp { end_time: 0.4, value: 1.0 });

    // teardown fires at call time + 300ms + 50ms
    tokio::time::sleep(Duration::from_millis(349)).await;
    assert_eq!(first.source.state(), SourceState::Playing);
    assert_eq!(p.draining(), 1);

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(first.source.state(), SourceState::Stopped);
    assert_eq!(p.draining(), 0);
    assert_eq!(second.source.state(), SourceState::Playing);
}

#[tokio::test(start_paused = true)]
async fn crossfade_from_full_gain_ramps_one_to_zero() {
    let (mut p, _) = player().await;
    p.play(&t1()).await.expect("play t1");
    let first = active(&p);

    tokio::time::sleep(Duration::from_secs(1)).await;
    p.play_with_fade(&t2(), Duration::from_millis(300))
        .await
        .expect("play t2");

    let gain = first.gain.gain();
    let events = gain.events();
    assert_event(events[events.len() - 2], AutomationEvent::SetValue { time: 1.0, value: 1.0 });
    assert_event(events[events.len() - 1], AutomationEvent::LinearRamp { end_time: 1.3, value: 0.0 });
    assert!((gain.value_at(1.15) - 0.5).abs() < 1e-4);
    assert_eq!(gain.value_at(2.0), 0.0);

    let incoming = active(&p).gain;
    assert!((incoming.gain().value_at(1.15) - 0.5).abs() < 1e-4);
    assert_eq!(incoming.gain().value_at(2.0), 1.0);
}

#[tokio::test(start_paused = true)]
async fn play_after_stop_does_not_wait_for_teardown() {
    let (mut p, _) = player().await;
    p.play(&t1()).await.expect("play t1");
    let first = active(&p);
    tokio::time::sleep(Duration::from_secs(1)).await;

    p.stop();
    assert!(p.active().is_none());
    assert_eq!(p.draining(), 1);
    let events = first.gain.gain().events();
    assert_event(events[events.len() - 1], AutomationEvent::LinearRamp { end_time: 1.4, value: 0.0 });

    p.play(&t3()).await.expect("play t3");
    let third = active(&p);
    assert_eq!(third.track_id, "t3");
    let events = third.gain.gain().events();
    assert_event(events[0], AutomationEvent::SetValue { time: 1.0, value: 0.0 });
    assert_event(events[1], AutomationEvent::LinearRamp { end_time: 1.6, value: 1.0 });
    assert_eq!(first.source.state(), SourceState::Playing, "teardown still pending");
    assert_eq!(p.draining(), 1, "the stopped instance was not faded twice");

    tokio::time::sleep(Duration::from_millis(451)).await;
    assert_eq!(first.source.state(), SourceState::Stopped);
    assert_eq!(third.source.state(), SourceState::Playing);
    assert_eq!(p.draining(), 0);
}

#[tokio::test(start_paused = true)]
async fn rapid_plays_never_hold_two_full_gain_instances() {
    let (mut p, _) = player().await;
    let mut instances = Vec::new();
    for track in [t1(), t2(), t3(), t1()] {
        p.play(&track).await.expect("play");
        instances.push(active(&p));
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(p.draining(), 3);

    for step in 0..=200 {
        let t = f64::from(step) * 0.01;
        let full = instances
            .iter()
            .filter(|i| i.gain.gain().value_at(t) >= 1.0 - 1e-6)
            .count();
        assert!(full <= 1, "{full} instances at full gain at t={t}");
    }

    let last = instances.last().expect("last");
    assert_eq!(last.gain.gain().value_at(2.0), 1.0);
    for outgoing in &instances[..3] {
        assert_eq!(outgoing.gain.gain().value_at(2.0), 0.0);
    }

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(p.draining(), 0);
    assert!(instances[..3].iter().all(|i| i.source.state() == SourceState::Stopped));
    assert_eq!(last.source.state(), SourceState::Playing);
}

#[tokio::test(start_paused = true)]
async fn failed_load_keeps_current_track() {
    let (mut p, fetcher) = player().await;
    p.play(&t1()).await.expect("play t1");
    let first = active(&p);

    let missing = Track::new("gone", "Gone", "/gone.wav");
    let err = p.play(&missing).await.expect_err("missing asset");
    assert!(matches!(
        err,
        AudioError::Load { ref track_id, source: LoadError::Status { .. } } if track_id == "gone"
    ));
    assert_eq!(fetcher.calls("/gone.wav"), 1);

    assert_eq!(active(&p).track_id, "t1");
    assert_eq!(first.gain.gain().events().len(), 2, "no fade-out was scheduled");
    assert_eq!(p.draining(), 0);
    assert_eq!(first.source.state(), SourceState::Playing);
}

#[tokio::test(start_paused = true)]
async fn cached_tracks_are_fetched_once() {
    let (mut p, fetcher) = player().await;
    for track in [t1(), t2(), t1(), t1(), t2()] {
        p.play(&track).await.expect("play");
    }
    assert_eq!(fetcher.calls("/t1.wav"), 1);
    assert_eq!(fetcher.calls("/t2.wav"), 1);
    assert_eq!(p.cache().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn volume_is_clamped_and_applied_to_master_gain() {
    let backend = NullBackend::new();
    let fetcher = Arc::new(FakeFetcher::default().with("/t2.wav", wav_bytes(2, 8_000, 4_000)));
    let mut p = AudioPlayer::new(Box::new(backend.clone()), fetcher, &PlayerConfig::default());

    p.set_volume(1.5);
    assert_eq!(p.volume(), 1.0);
    p.set_volume(-0.2);
    assert_eq!(p.volume(), 0.0);
    p.set_volume(0.3);

    p.play(&t2()).await.expect("play");
    let master = backend.last_master().expect("master gain");
    assert!((master.gain().value_at(0.0) - 0.3).abs() < 1e-6, "preference applied at open");

    tokio::time::sleep(Duration::from_millis(200)).await;
    p.set_volume(0.7);
    let now = p.current_time().expect("clock");
    assert!((master.gain().value_at(now) - 0.7).abs() < 1e-6);
    assert!(master.gain().events().is_empty());
    assert_eq!(p.volume(), 0.7);
}
