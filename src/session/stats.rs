use super::controller::SessionState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Statistics snapshot for a monitoring session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    /// Current lifecycle state
    pub state: SessionState,

    /// When the session last entered `Running`, if it ever has
    pub started_at: Option<DateTime<Utc>>,

    /// Seconds since the session started
    pub duration_secs: f64,

    /// Number of clips submitted for classification
    pub clips_submitted: usize,

    /// Number of sound-event entries that passed the debounce filter
    pub events_emitted: usize,
}
