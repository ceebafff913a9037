//! Scheduled parameter automation, evaluated against the output clock.
//!
//! Times are seconds on the output pipeline's clock. A param is shared
//! between the control side, which schedules events, and the render side,
//! which samples `value_at` once per block.

use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutomationEvent {
    /// Jump to `value` at `time`.
    SetValue { time: f64, value: f32 },
    /// Ramp linearly from the previous event to `value`, arriving at `end_time`.
    LinearRamp { end_time: f64, value: f32 },
}

impl AutomationEvent {
    pub fn time(&self) -> f64 {
        match *self {
            AutomationEvent::SetValue { time, .. } => time,
            AutomationEvent::LinearRamp { end_time, .. } => end_time,
        }
    }

    pub fn value(&self) -> f32 {
        match *self {
            AutomationEvent::SetValue { value, .. } | AutomationEvent::LinearRamp { value, .. } => {
                value
            }
        }
    }
}

#[derive(Debug)]
struct Timeline {
    intrinsic: f32,
    events: Vec<AutomationEvent>,
}

impl Timeline {
    fn insert(&mut self, event: AutomationEvent) {
        // Events at equal times keep insertion order.
        let at = self
            .events
            .iter()
            .position(|e| e.time() > event.time())
            .unwrap_or(self.events.len());
        self.events.insert(at, event);
    }

    fn value_at(&self, t: f64) -> f32 {
        let mut prev_time = 0.0_f64;
        let mut prev_value = self.intrinsic;
        for event in &self.events {
            let time = event.time();
            if time <= t {
                prev_time = time;
                prev_value = event.value();
                continue;
            }
            return match *event {
                AutomationEvent::SetValue { .. } => prev_value,
                AutomationEvent::LinearRamp { value, .. } => {
                    let span = time - prev_time;
                    if span <= 0.0 {
                        value
                    } else {
                        let progress = ((t - prev_time) / span).clamp(0.0, 1.0) as f32;
                        prev_value + (value - prev_value) * progress
                    }
                }
            };
        }
        prev_value
    }
}

/// A schedulable value, cheap to clone and shared across threads.
#[derive(Debug, Clone)]
pub struct AudioParam {
    inner: Arc<Mutex<Timeline>>,
}

impl AudioParam {
    pub fn new(value: f32) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Timeline {
                intrinsic: value,
                events: Vec::new(),
            })),
        }
    }

    /// Instantaneous change: drops every scheduled event.
    pub fn set_value(&self, value: f32) {
        let mut tl = self.inner.lock();
        tl.events.clear();
        tl.intrinsic = value;
    }

    pub fn set_value_at_time(&self, value: f32, time: f64) {
        self.inner
            .lock()
            .insert(AutomationEvent::SetValue { time, value });
    }

    pub fn linear_ramp_to_value_at_time(&self, value: f32, end_time: f64) {
        self.inner
            .lock()
            .insert(AutomationEvent::LinearRamp { end_time, value });
    }

    /// Drops every event scheduled at or after `time`.
    pub fn cancel_scheduled_values(&self, time: f64) {
        self.inner.lock().events.retain(|e| e.time() < time);
    }

    pub fn value_at(&self, time: f64) -> f32 {
        self.inner.lock().value_at(time)
    }

    pub fn events(&self) -> Vec<AutomationEvent> {
        self.inner.lock().events.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-6;

    #[test]
    fn intrinsic_value_without_events() {
        let p = AudioParam::new(0.25);
        assert!((p.value_at(0.0) - 0.25).abs() < EPS);
        assert!((p.value_at(100.0) - 0.25).abs() < EPS);
    }

    #[test]
    fn linear_ramp_interpolates_from_previous_event() {
        let p = AudioParam::new(1.0);
        p.set_value_at_time(0.0, 2.0);
        p.linear_ramp_to_value_at_time(1.0, 3.0);

        assert!((p.value_at(1.0) - 1.0).abs() < EPS, "before any event: intrinsic");
        assert!((p.value_at(2.0) - 0.0).abs() < EPS);
        assert!((p.value_at(2.25) - 0.25).abs() < EPS);
        assert!((p.value_at(2.5) - 0.5).abs() < EPS);
        assert!((p.value_at(3.0) - 1.0).abs() < EPS);
        assert!((p.value_at(9.0) - 1.0).abs() < EPS);
    }

    #[test]
    fn zero_length_ramp_lands_immediately() {
        let p = AudioParam::new(0.0);
        p.set_value_at_time(0.0, 1.0);
        p.linear_ramp_to_value_at_time(1.0, 1.0);
        assert!((p.value_at(1.0) - 1.0).abs() < EPS);
    }

    #[test]
    fn cancel_drops_future_events_only() {
        let p = AudioParam::new(0.0);
        p.set_value_at_time(0.0, 0.0);
        p.linear_ramp_to_value_at_time(1.0, 0.6);

        let live = p.value_at(0.3);
        p.cancel_scheduled_values(0.3);
        p.set_value_at_time(live, 0.3);
        p.linear_ramp_to_value_at_time(0.0, 0.7);

        assert_eq!(
            p.events(),
            vec![
                AutomationEvent::SetValue { time: 0.0, value: 0.0 },
                AutomationEvent::SetValue { time: 0.3, value: live },
                AutomationEvent::LinearRamp { end_time: 0.7, value: 0.0 },
            ]
        );
        assert!((p.value_at(0.3) - 0.5).abs() < EPS);
        assert!((p.value_at(0.5) - 0.25).abs() < EPS);
        assert!(p.value_at(0.7).abs() < EPS);
    }

    #[test]
    fn set_value_clears_schedule() {
        let p = AudioParam::new(0.0);
        p.linear_ramp_to_value_at_time(1.0, 5.0);
        p.set_value(0.4);
        assert!(p.events().is_empty());
        assert!((p.value_at(2.5) - 0.4).abs() < EPS);
    }
}
