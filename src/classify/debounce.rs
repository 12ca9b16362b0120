use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Default suppression window for repeated labels
pub const SUPPRESSION_WINDOW: Duration = Duration::from_secs(4);

/// Suppresses re-emission of an identical sound label inside a fixed window.
///
/// The window anchors on the last *admission*: suppressed repeats do not
/// refresh it. Callers pass each result's own arrival timestamp, so
/// out-of-order completions stay consistent.
pub struct DebounceFilter {
    window: Duration,
    last_admitted: HashMap<String, Instant>,
}

impl Default for DebounceFilter {
    fn default() -> Self {
        Self::new(SUPPRESSION_WINDOW)
    }
}

impl DebounceFilter {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_admitted: HashMap::new(),
        }
    }

    /// True when `label` should be displayed: first sighting, or the last
    /// admission is at least one window old. Expired entries are pruned
    /// lazily on each call.
    pub fn admit(&mut self, label: &str, now: Instant) -> bool {
        let window = self.window;
        self.last_admitted
            .retain(|_, &mut at| now.saturating_duration_since(at) < window);

        if self.last_admitted.contains_key(label) {
            return false;
        }

        self.last_admitted.insert(label.to_string(), now);
        true
    }

    /// Number of labels currently inside their suppression window.
    pub fn tracked_labels(&self) -> usize {
        self.last_admitted.len()
    }
}
