use super::clip::{encode_wav_clip, AudioClip};
use crate::audio::AudioFrame;
use crate::error::CaptureError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// Accumulates PCM frames between flushes.
#[derive(Default)]
struct FrameBuffer {
    samples: Vec<i16>,
    sample_rate: u32,
    channels: u16,
}

impl FrameBuffer {
    fn push(&mut self, frame: AudioFrame) {
        if self.samples.is_empty() {
            self.sample_rate = frame.sample_rate;
            self.channels = frame.channels;
        }
        self.samples.extend_from_slice(&frame.samples);
    }

    /// Drain the buffer; `None` when nothing accumulated.
    fn take(&mut self) -> Option<(Vec<i16>, u32, u16)> {
        if self.samples.is_empty() {
            return None;
        }
        Some((
            std::mem::take(&mut self.samples),
            self.sample_rate,
            self.channels,
        ))
    }
}

/// Slices the live frame stream into fixed-duration clips.
///
/// Two modes:
/// - continuous: flush whatever accumulated every fixed interval
/// - on-demand: one clip per trigger, force-stopped at a fixed deadline,
///   guarded by a busy latch so triggers never queue
pub struct ClipRecorder {
    frames: mpsc::Receiver<AudioFrame>,
    clips: mpsc::Sender<AudioClip>,
}

impl ClipRecorder {
    pub fn new(frames: mpsc::Receiver<AudioFrame>, clips: mpsc::Sender<AudioClip>) -> Self {
        Self { frames, clips }
    }

    /// Continuous mode: emit one clip per flush interval.
    ///
    /// Empty flushes are discarded. Stream closure logs a capture error,
    /// flushes the remainder, and ends the loop; the session continues.
    pub async fn run_continuous(
        mut self,
        flush_interval: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!(
            "Clip recorder started (continuous, {}s flush)",
            flush_interval.as_secs()
        );

        let mut buffer = FrameBuffer::default();
        // First flush lands one full interval from now
        let mut ticker = tokio::time::interval_at(
            tokio::time::Instant::now() + flush_interval,
            flush_interval,
        );

        loop {
            tokio::select! {
                maybe_frame = self.frames.recv() => match maybe_frame {
                    Some(frame) => buffer.push(frame),
                    None => {
                        warn!("Capture error: {}", CaptureError::StreamClosed);
                        self.flush(&mut buffer).await;
                        break;
                    }
                },
                _ = ticker.tick() => {
                    self.flush(&mut buffer).await;
                }
                _ = shutdown.changed() => break,
            }
        }

        info!("Clip recorder stopped");
    }

    /// On-demand mode: wait for triggers, capture one clip per trigger.
    ///
    /// While idle, incoming frames are drained and discarded so the bounded
    /// frame channel never back-pressures the source. The `busy` latch is
    /// set by the caller before triggering and cleared here once the
    /// capture resolves.
    pub async fn run_on_demand(
        mut self,
        clip_duration: Duration,
        mut trigger_rx: mpsc::Receiver<()>,
        busy: Arc<AtomicBool>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!(
            "Clip recorder started (on-demand, {}s clips)",
            clip_duration.as_secs()
        );

        let mut stream_open = true;

        loop {
            tokio::select! {
                maybe_trigger = trigger_rx.recv() => match maybe_trigger {
                    Some(()) => {
                        stream_open = self.capture_once(clip_duration, stream_open).await;
                        busy.store(false, Ordering::SeqCst);
                    }
                    None => break,
                },
                maybe_frame = self.frames.recv(), if stream_open => {
                    if maybe_frame.is_none() {
                        warn!("Capture error: {}", CaptureError::StreamClosed);
                        stream_open = false;
                    }
                    // Idle frames are discarded
                }
                _ = shutdown.changed() => break,
            }
        }

        info!("Clip recorder stopped");
    }

    /// Record until the deadline, then emit exactly one clip.
    ///
    /// The deadline is a forced stop: the recorder never waits for natural
    /// completion. A closed stream yields no clip. Returns whether the
    /// stream is still open afterwards.
    async fn capture_once(&mut self, clip_duration: Duration, stream_open: bool) -> bool {
        if !stream_open {
            warn!("Capture error: {}", CaptureError::StreamClosed);
            return false;
        }

        // Drop frames buffered while idle so the clip starts at the trigger
        while self.frames.try_recv().is_ok() {}

        debug!("On-demand capture started");

        let deadline = tokio::time::Instant::now() + clip_duration;
        let mut buffer = FrameBuffer::default();
        let mut still_open = true;

        loop {
            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => break,
                maybe_frame = self.frames.recv() => match maybe_frame {
                    Some(frame) => buffer.push(frame),
                    None => {
                        warn!("Capture error: {}", CaptureError::StreamClosed);
                        still_open = false;
                        break;
                    }
                }
            }
        }

        self.flush(&mut buffer).await;
        still_open
    }

    /// Encode and emit whatever the buffer holds; empty buffers emit nothing.
    async fn flush(&self, buffer: &mut FrameBuffer) {
        let Some((samples, sample_rate, channels)) = buffer.take() else {
            debug!("Empty flush discarded");
            return;
        };

        match encode_wav_clip(&samples, sample_rate, channels) {
            Ok(clip) => {
                debug!(
                    "Captured clip: {} bytes, {}ms",
                    clip.bytes.len(),
                    clip.duration_ms
                );
                if self.clips.send(clip).await.is_err() {
                    warn!("Clip channel closed; dropping clip");
                }
            }
            Err(e) => warn!("Capture error: {}", e),
        }
    }
}
