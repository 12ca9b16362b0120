// Integration tests for clip capture
//
// These verify the continuous flush cadence (including empty-flush
// discard) and the on-demand forced-duration capture, using the paused
// tokio clock so timing is deterministic.

use soundwatch::{AudioFrame, ClipRecorder};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;

fn frame(timestamp_ms: u64) -> AudioFrame {
    AudioFrame {
        // 100ms of 16kHz mono
        samples: vec![200i16; 1600],
        sample_rate: 16000,
        channels: 1,
        timestamp_ms,
    }
}

#[tokio::test(start_paused = true)]
async fn test_continuous_mode_flushes_on_interval() {
    let (frame_tx, frame_rx) = mpsc::channel(100);
    let (clip_tx, mut clip_rx) = mpsc::channel(8);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    let recorder = ClipRecorder::new(frame_rx, clip_tx);
    tokio::spawn(recorder.run_continuous(Duration::from_secs(5), shutdown_rx));

    // Two seconds of audio, then silence until the flush fires
    for i in 0..20u64 {
        frame_tx.send(frame(i * 100)).await.unwrap();
    }

    let clip = timeout(Duration::from_secs(6), clip_rx.recv())
        .await
        .expect("flush should fire within the interval")
        .expect("clip channel open");

    assert_eq!(clip.codec, "wav");
    assert_eq!(clip.duration_ms, 2000);
    assert!(!clip.bytes.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_continuous_mode_discards_empty_flush() {
    let (_frame_tx, frame_rx) = mpsc::channel::<AudioFrame>(100);
    let (clip_tx, mut clip_rx) = mpsc::channel(8);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    let recorder = ClipRecorder::new(frame_rx, clip_tx);
    tokio::spawn(recorder.run_continuous(Duration::from_secs(5), shutdown_rx));

    // No frames at all: two full intervals pass without a clip
    let result = timeout(Duration::from_secs(11), clip_rx.recv()).await;
    assert!(result.is_err(), "empty flushes must not emit clips");
}

#[tokio::test(start_paused = true)]
async fn test_continuous_mode_flushes_remainder_on_stream_close() {
    let (frame_tx, frame_rx) = mpsc::channel(100);
    let (clip_tx, mut clip_rx) = mpsc::channel(8);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    let recorder = ClipRecorder::new(frame_rx, clip_tx);
    tokio::spawn(recorder.run_continuous(Duration::from_secs(5), shutdown_rx));

    for i in 0..10u64 {
        frame_tx.send(frame(i * 100)).await.unwrap();
    }
    drop(frame_tx);

    let clip = timeout(Duration::from_secs(1), clip_rx.recv())
        .await
        .expect("remainder should flush on close")
        .expect("clip channel open");

    assert_eq!(clip.duration_ms, 1000);
}

#[tokio::test(start_paused = true)]
async fn test_on_demand_capture_is_forced_to_duration() {
    let (frame_tx, frame_rx) = mpsc::channel(100);
    let (clip_tx, mut clip_rx) = mpsc::channel(8);
    let (trigger_tx, trigger_rx) = mpsc::channel(1);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let busy = Arc::new(AtomicBool::new(false));

    let recorder = ClipRecorder::new(frame_rx, clip_tx);
    tokio::spawn(recorder.run_on_demand(
        Duration::from_secs(4),
        trigger_rx,
        Arc::clone(&busy),
        shutdown_rx,
    ));

    // A feeder that never stops on its own
    tokio::spawn(async move {
        let mut timestamp_ms = 0u64;
        loop {
            tokio::time::sleep(Duration::from_millis(100)).await;
            if frame_tx.send(frame(timestamp_ms)).await.is_err() {
                break;
            }
            timestamp_ms += 100;
        }
    });

    busy.store(true, Ordering::SeqCst);
    trigger_tx.send(()).await.unwrap();

    let clip = timeout(Duration::from_secs(5), clip_rx.recv())
        .await
        .expect("clip must arrive by the forced deadline")
        .expect("clip channel open");

    // Forced stop at 4s: roughly 40 frames of 100ms each
    assert!(
        clip.duration_ms >= 3800 && clip.duration_ms <= 4000,
        "clip duration was {}ms",
        clip.duration_ms
    );

    // The latch clears once the capture resolves
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!busy.load(Ordering::SeqCst));

    // Exactly one clip per trigger
    let extra = timeout(Duration::from_secs(5), clip_rx.recv()).await;
    assert!(extra.is_err(), "a single trigger must emit a single clip");
}

#[tokio::test(start_paused = true)]
async fn test_on_demand_closed_stream_emits_no_clip() {
    let (frame_tx, frame_rx) = mpsc::channel::<AudioFrame>(100);
    let (clip_tx, mut clip_rx) = mpsc::channel(8);
    let (trigger_tx, trigger_rx) = mpsc::channel(1);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let busy = Arc::new(AtomicBool::new(false));

    let recorder = ClipRecorder::new(frame_rx, clip_tx);
    tokio::spawn(recorder.run_on_demand(
        Duration::from_secs(4),
        trigger_rx,
        Arc::clone(&busy),
        shutdown_rx,
    ));

    drop(frame_tx);
    // Let the recorder observe the closed stream
    tokio::time::sleep(Duration::from_millis(10)).await;

    busy.store(true, Ordering::SeqCst);
    trigger_tx.send(()).await.unwrap();

    let result = timeout(Duration::from_secs(5), clip_rx.recv()).await;
    assert!(result.is_err(), "closed stream must not emit a clip");
    assert!(!busy.load(Ordering::SeqCst), "latch must clear on failure");
}
