use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::graph::{GainNode, SoundInstance};

/// Delay before an outgoing source is stopped: the fade rounded up to whole
/// milliseconds, plus the safety margin.
pub fn teardown_delay(fade: Duration, margin: Duration) -> Duration {
    let fade_ms = fade.as_nanos().div_ceil(1_000_000) as u64;
    Duration::from_millis(fade_ms) + margin
}

/// Silence → full over `fade`, starting at `now`.
pub(super) fn schedule_fade_in(gain: &GainNode, now: f64, fade: Duration) {
    let param = gain.gain();
    param.set_value_at_time(0.0, now);
    param.linear_ramp_to_value_at_time(1.0, now + fade.as_secs_f64());
}

/// Ramps `instance` from wherever it is at `now` down to silence, then hands
/// it to a one-shot task that stops its source after the ramp.
///
/// The task owns the instance outright; the caller must not touch it again.
pub(super) fn fade_out_and_release(
    instance: SoundInstance,
    now: f64,
    fade: Duration,
    margin: Duration,
    draining: &Arc<AtomicUsize>,
) {
    let param = instance.gain.gain();
    let live = param.value_at(now);
    param.cancel_scheduled_values(now);
    param.set_value_at_time(live, now);
    param.linear_ramp_to_value_at_time(0.0, now + fade.as_secs_f64());

    let delay = teardown_delay(fade, margin);
    tracing::debug!(
        track_id = %instance.track_id,
        from_gain = live,
        fade_ms = fade.as_millis() as u64,
        teardown_ms = delay.as_millis() as u64,
        "fading out"
    );

    draining.fetch_add(1, Ordering::AcqRel);
    let draining = Arc::clone(draining);
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        match instance.source.stop() {
            Ok(()) => tracing::debug!(track_id = %instance.track_id, "outgoing track stopped"),
            Err(w) => {
                tracing::warn!(track_id = %instance.track_id, warn = %w, "failed to stop outgoing track")
            }
        }
        draining.fetch_sub(1, Ordering::AcqRel);
    });
}
