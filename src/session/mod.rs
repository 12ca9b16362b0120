//! Session lifecycle management
//!
//! This module provides the `SessionController` state machine that:
//! - Acquires and releases the audio source
//! - Launches the loudness-monitor and clip-capture lanes
//! - Wires captured clips into the classification lane
//! - Supervises the optional speech-recognition collaborator
//! - Guarantees serialized transitions and idempotent teardown

mod config;
mod controller;
mod stats;
mod transcript;

pub use config::{CaptureMode, SessionConfig};
pub use controller::{SessionController, SessionState};
pub use stats::SessionStats;
pub use transcript::{
    MemoryTranscript, NullTranscript, TranscriptEntry, TranscriptKind, TranscriptSink,
};
