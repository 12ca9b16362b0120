//! Remote classification lane
//!
//! This module provides the low-frequency half of the pipeline:
//! - `RemoteClassifier`: multipart upload of a clip, reply parsing
//! - `DebounceFilter`: per-label suppression window for alert spam
//! - `Classifier`: the seam the session lane is tested through

mod client;
mod debounce;
mod result;

pub use client::{Classifier, RemoteClassifier};
pub use debounce::{DebounceFilter, SUPPRESSION_WINDOW};
pub use result::{parse_reply_text, ClassificationResult, UNIMPORTANT_SENTINEL};
