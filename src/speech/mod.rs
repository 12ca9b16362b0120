//! Speech-recognition collaborator seam
//!
//! The engine itself is external; the session controller only supervises
//! its lifetime and restarts it while the session is running.

use crate::session::TranscriptSink;
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::watch;

/// A speech-recognition engine feeding the shared transcript.
///
/// `run` captures and transcribes until the engine terminates on its own or
/// `shutdown` is signaled. Returning while the session is still running —
/// with `Ok` or `Err` — makes the supervisor restart it immediately; once
/// shutdown is signaled it is never restarted.
#[async_trait::async_trait]
pub trait SpeechRecognizer: Send + Sync {
    async fn run(
        &self,
        transcript: Arc<dyn TranscriptSink>,
        shutdown: watch::Receiver<bool>,
    ) -> Result<()>;
}
