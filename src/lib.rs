pub mod audio;
pub mod capture;
pub mod classify;
pub mod config;
pub mod error;
pub mod monitor;
pub mod session;
pub mod speech;

pub use audio::{AudioFrame, AudioSource, AudioStream, EnergySnapshot, FileSource};
pub use capture::{AudioClip, ClipRecorder};
pub use classify::{ClassificationResult, Classifier, DebounceFilter, RemoteClassifier};
pub use config::{ClassifierConfig, Config};
pub use error::{CaptureError, ClassificationError, DeviceError, SessionError};
pub use monitor::{
    HapticActuator, HapticController, HapticPulse, LevelSink, LoudnessMonitor, NullActuator,
    NullLevelSink,
};
pub use session::{
    CaptureMode, MemoryTranscript, SessionConfig, SessionController, SessionState, SessionStats,
    TranscriptEntry, TranscriptKind, TranscriptSink,
};
pub use speech::SpeechRecognizer;
