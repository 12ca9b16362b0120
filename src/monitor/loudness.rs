use super::haptics::{HapticActuator, HapticController};
use crate::audio::EnergySnapshot;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{error, info};

/// A single loudness measurement
///
/// `value` is the arithmetic mean of the frequency bins on the raw 0-255
/// scale. The display percentage is derived separately; the haptic
/// thresholds apply to the raw value.
#[derive(Debug, Clone, Copy)]
pub struct LoudnessSample {
    pub value: f32,
    pub taken_at: Instant,
}

/// UI volume indicator sink
///
/// Receives the 0-100 display percentage every monitor tick, and a final 0
/// when the session tears down.
pub trait LevelSink: Send + Sync {
    fn level_changed(&self, percent: f32);
}

/// Sink for sessions without a volume indicator.
pub struct NullLevelSink;

impl LevelSink for NullLevelSink {
    fn level_changed(&self, _percent: f32) {}
}

/// Arithmetic mean of the energy bins (0-255 scale). Empty snapshots read
/// as silence.
pub fn mean_energy(bins: &[u8]) -> f32 {
    if bins.is_empty() {
        return 0.0;
    }
    bins.iter().map(|&b| b as f32).sum::<f32>() / bins.len() as f32
}

/// Samples the source's energy snapshot on a fixed tick and drives the
/// volume indicator and the haptic actuator.
///
/// This is the high-frequency lane: it never performs blocking I/O and is
/// independent of the capture/classification lane.
pub struct LoudnessMonitor {
    energy: watch::Receiver<EnergySnapshot>,
    level_sink: Arc<dyn LevelSink>,
    actuator: Arc<dyn HapticActuator>,
    haptics: HapticController,
}

impl LoudnessMonitor {
    pub fn new(
        energy: watch::Receiver<EnergySnapshot>,
        level_sink: Arc<dyn LevelSink>,
        actuator: Arc<dyn HapticActuator>,
        haptics: HapticController,
    ) -> Self {
        Self {
            energy,
            level_sink,
            actuator,
            haptics,
        }
    }

    /// Compute the current loudness from the latest snapshot.
    pub fn sample(&self, now: Instant) -> LoudnessSample {
        let value = mean_energy(&self.energy.borrow().bins);
        LoudnessSample {
            value,
            taken_at: now,
        }
    }

    /// Run the sampling loop until shutdown or until the source goes away.
    pub async fn run(mut self, tick: Duration, mut shutdown: watch::Receiver<bool>) {
        info!("Loudness monitor started ({}ms tick)", tick.as_millis());

        let mut ticker = tokio::time::interval(tick);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => break,
            }

            if self.energy.has_changed().is_err() {
                // Sender dropped: the audio source is gone
                error!("Audio source unavailable; loudness monitor halted");
                break;
            }

            let sample = self.sample(Instant::now());
            let percent = sample.value.min(100.0);

            self.level_sink.level_changed(percent);

            if let Some(pulse) = self.haptics.decide(sample.value, sample.taken_at) {
                self.actuator.pulse(Duration::from_millis(pulse.duration_ms));
            }
        }

        info!("Loudness monitor stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_energy() {
        assert_eq!(mean_energy(&[]), 0.0);
        assert_eq!(mean_energy(&[10, 20, 30]), 20.0);
        assert_eq!(mean_energy(&[255; 8]), 255.0);
    }

    #[test]
    fn test_display_percent_clamps_at_100() {
        let value = mean_energy(&[200; 8]);
        assert_eq!(value, 200.0);
        assert_eq!(value.min(100.0), 100.0);
    }
}
