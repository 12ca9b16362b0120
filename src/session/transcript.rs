use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// What a transcript entry represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptKind {
    /// Transcribed speech
    Speech,
    /// An environmental sound label
    Event,
    /// A visible, non-fatal pipeline error (e.g. a failed classification)
    Error,
}

/// One ordered unit handed to the transcript/alert sink.
///
/// Plain text only; rendering belongs to the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub kind: TranscriptKind,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl TranscriptEntry {
    pub fn speech(text: impl Into<String>) -> Self {
        Self {
            kind: TranscriptKind::Speech,
            text: text.into(),
            at: Utc::now(),
        }
    }

    pub fn event(text: impl Into<String>) -> Self {
        Self {
            kind: TranscriptKind::Event,
            text: text.into(),
            at: Utc::now(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: TranscriptKind::Error,
            text: text.into(),
            at: Utc::now(),
        }
    }
}

/// Transcript/alert sink the UI provides.
pub trait TranscriptSink: Send + Sync {
    fn append(&self, entry: TranscriptEntry);
}

/// Sink for sessions without a transcript surface.
pub struct NullTranscript;

impl TranscriptSink for NullTranscript {
    fn append(&self, _entry: TranscriptEntry) {}
}

/// In-memory transcript accumulator, used by the demo binary and tests.
#[derive(Default)]
pub struct MemoryTranscript {
    entries: Mutex<Vec<TranscriptEntry>>,
}

impl MemoryTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the accumulated entries, in append order.
    pub fn entries(&self) -> Vec<TranscriptEntry> {
        self.entries.lock().unwrap().clone()
    }
}

impl TranscriptSink for MemoryTranscript {
    fn append(&self, entry: TranscriptEntry) {
        self.entries.lock().unwrap().push(entry);
    }
}
