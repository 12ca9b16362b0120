use std::time::{Duration, Instant};

/// Minimum gap between two consecutive pulses
const PULSE_COOLDOWN: Duration = Duration::from_millis(250);

/// Raw-energy thresholds and their pulse durations. The thresholds apply to
/// the unnormalized 0-255 bin mean, not the display percentage.
const LOUD_THRESHOLD: f32 = 70.0;
const MODERATE_THRESHOLD: f32 = 40.0;
const SOFT_THRESHOLD: f32 = 20.0;

const LOUD_PULSE_MS: u64 = 200;
const MODERATE_PULSE_MS: u64 = 100;
const SOFT_PULSE_MS: u64 = 50;

/// A single haptic pulse decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HapticPulse {
    /// Pulse duration in milliseconds
    pub duration_ms: u64,
    /// When the pulse was issued
    pub issued_at: Instant,
}

/// Haptic actuator trait
///
/// Fire-and-forget delivery to the device's vibration hardware. Absence of
/// the capability is not an error; use [`NullActuator`].
pub trait HapticActuator: Send + Sync {
    /// Vibrate once for `duration`.
    fn pulse(&self, duration: Duration);

    /// Play alternating vibrate/pause steps. Defaults to pulsing the first
    /// vibrate step only.
    fn pattern(&self, steps: &[Duration]) {
        if let Some(first) = steps.first() {
            self.pulse(*first);
        }
    }
}

/// No-capability actuator: every pulse is silently dropped.
pub struct NullActuator;

impl HapticActuator for NullActuator {
    fn pulse(&self, _duration: Duration) {}
}

/// Maps loudness samples to haptic pulses under a cooldown.
///
/// Pure decision state: no I/O, no clock reads. The caller supplies `now`
/// so the policy is fully testable.
pub struct HapticController {
    cooldown: Duration,
    last_pulse_at: Option<Instant>,
}

impl Default for HapticController {
    fn default() -> Self {
        Self::new(PULSE_COOLDOWN)
    }
}

impl HapticController {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_pulse_at: None,
        }
    }

    /// Decide whether `loudness` (raw 0-255 bin mean) warrants a pulse at `now`.
    ///
    /// Issuing a pulse always updates the cooldown anchor.
    pub fn decide(&mut self, loudness: f32, now: Instant) -> Option<HapticPulse> {
        if let Some(last) = self.last_pulse_at {
            if now.saturating_duration_since(last) < self.cooldown {
                return None;
            }
        }

        let duration_ms = if loudness > LOUD_THRESHOLD {
            LOUD_PULSE_MS
        } else if loudness > MODERATE_THRESHOLD {
            MODERATE_PULSE_MS
        } else if loudness > SOFT_THRESHOLD {
            SOFT_PULSE_MS
        } else {
            return None;
        };

        self.last_pulse_at = Some(now);

        Some(HapticPulse {
            duration_ms,
            issued_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_mapping() {
        let base = Instant::now();
        let mut ctl = HapticController::default();

        assert_eq!(ctl.decide(71.0, base).unwrap().duration_ms, 200);

        let mut ctl = HapticController::default();
        assert_eq!(ctl.decide(70.0, base).unwrap().duration_ms, 100);

        let mut ctl = HapticController::default();
        assert_eq!(ctl.decide(40.5, base).unwrap().duration_ms, 100);

        let mut ctl = HapticController::default();
        assert_eq!(ctl.decide(21.0, base).unwrap().duration_ms, 50);

        let mut ctl = HapticController::default();
        assert!(ctl.decide(20.0, base).is_none());
        assert!(ctl.decide(0.0, base).is_none());
    }

    #[test]
    fn test_cooldown_suppresses_second_pulse() {
        let base = Instant::now();
        let mut ctl = HapticController::default();

        assert!(ctl.decide(80.0, base).is_some());
        assert!(ctl.decide(80.0, base + Duration::from_millis(100)).is_none());
        assert!(ctl.decide(80.0, base + Duration::from_millis(249)).is_none());
        assert!(ctl.decide(80.0, base + Duration::from_millis(250)).is_some());
    }

    #[test]
    fn test_quiet_sample_does_not_touch_cooldown() {
        let base = Instant::now();
        let mut ctl = HapticController::default();

        assert!(ctl.decide(80.0, base).is_some());
        // Quiet sample during cooldown: no pulse, cooldown anchor unchanged
        assert!(ctl.decide(5.0, base + Duration::from_millis(100)).is_none());
        assert!(ctl.decide(80.0, base + Duration::from_millis(250)).is_some());
    }
}
