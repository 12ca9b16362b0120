//! Loudness monitoring lane
//!
//! This module provides the high-frequency half of the pipeline:
//! - `LoudnessMonitor`: samples the source's energy snapshot every tick
//! - `HapticController`: maps loudness to pulses under the cooldown policy
//! - `HapticActuator` / `LevelSink`: delivery seams for the device and UI

mod haptics;
mod loudness;

pub use haptics::{HapticActuator, HapticController, HapticPulse, NullActuator};
pub use loudness::{mean_energy, LevelSink, LoudnessMonitor, LoudnessSample, NullLevelSink};
