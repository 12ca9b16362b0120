use thiserror::Error;

/// Session-level errors surfaced by [`SessionController`](crate::session::SessionController).
#[derive(Error, Debug)]
pub enum SessionError {
    /// The audio device could not be acquired. Fatal: the session cannot start.
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(#[from] DeviceError),

    #[error("invalid session transition: {from} -> {to}")]
    InvalidTransition { from: &'static str, to: &'static str },

    #[error("capture error: {0}")]
    Capture(#[from] CaptureError),
}

/// Errors from the audio source itself.
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("device not found: {name:?}")]
    NotFound { name: Option<String> },

    #[error("device error: {0}")]
    Other(String),
}

/// Errors from a single flush/recording cycle. Non-fatal: the offending clip
/// is skipped and the session continues.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// The audio stream is absent or closed.
    #[error("audio stream closed")]
    StreamClosed,

    /// An on-demand capture was triggered while one is already in flight.
    #[error("capture already in progress")]
    CaptureInProgress,

    /// On-demand capture is not available in the current mode or state.
    #[error("capture not available: {0}")]
    NotAvailable(String),

    #[error("clip encoding failed: {0}")]
    Encode(String),
}

/// Errors from the remote classification call. Non-fatal: converted to a
/// visible transcript entry, never a crash.
#[derive(Error, Debug)]
pub enum ClassificationError {
    /// HTTP transport or connection error.
    #[error("classification request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("classification request timed out")]
    Timeout,

    /// The service replied with a non-success status.
    #[error("classifier returned status {status}")]
    Status { status: u16 },

    /// The reply body did not contain any recognized field.
    #[error("unrecognized classifier reply: {0}")]
    UnrecognizedReply(String),
}

impl From<reqwest::Error> for ClassificationError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClassificationError::Timeout
        } else {
            ClassificationError::Request(e.to_string())
        }
    }
}
