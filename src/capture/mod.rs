//! Chunked clip capture
//!
//! Slices the live audio stream into fixed-duration clips for remote
//! classification, independently of the loudness monitor's cadence.

mod clip;
mod recorder;

pub use clip::{encode_wav_clip, AudioClip, CLIP_CODEC};
pub use recorder::ClipRecorder;
