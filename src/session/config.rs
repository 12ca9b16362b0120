use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How clips are extracted from the live stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMode {
    /// Emit whatever accumulated every flush interval
    Continuous,
    /// One clip per explicit trigger, forced to a fixed duration
    OnDemand,
}

/// Configuration for a monitoring session
///
/// One parameterized pipeline with the optional collaborators enumerated,
/// so a session can run haptics-only, haptics + classification, or the
/// full set including speech recognition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier
    pub session_id: String,

    /// Clip extraction mode
    pub capture_mode: CaptureMode,

    /// Submit captured clips to the remote classifier
    pub enable_remote_classification: bool,

    /// Run the speech-recognition collaborator alongside the pipeline
    pub enable_speech_recognition: bool,

    /// Loudness sampling tick (the device's redraw cadence)
    pub monitor_tick: Duration,

    /// Continuous-mode flush interval
    pub flush_interval: Duration,

    /// On-demand clip duration (forced stop)
    pub on_demand_duration: Duration,

    /// Minimum gap between haptic pulses
    pub haptic_cooldown: Duration,

    /// Suppression window for repeated sound labels
    pub debounce_window: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("session-{}", uuid::Uuid::new_v4()),
            capture_mode: CaptureMode::Continuous,
            enable_remote_classification: true,
            enable_speech_recognition: false,
            monitor_tick: Duration::from_millis(16),
            flush_interval: Duration::from_secs(5),
            on_demand_duration: Duration::from_secs(4),
            haptic_cooldown: Duration::from_millis(250),
            debounce_window: Duration::from_secs(4),
        }
    }
}
