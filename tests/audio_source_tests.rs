// Integration tests for the file-backed audio source
//
// A generated WAV fixture is paced into frames and energy snapshots the
// same way a live device would feed the pipeline.

use anyhow::Result;
use soundwatch::{AudioSource, DeviceError, FileSource};
use tempfile::TempDir;
use tokio::time::timeout;

/// Write a mono 16kHz WAV of `secs` seconds with constant amplitude.
fn write_fixture(dir: &TempDir, name: &str, secs: u32, amplitude: i16) -> Result<String> {
    let path = dir.path().join(name);

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(&path, spec)?;
    for _ in 0..(16000 * secs) {
        writer.write_sample(amplitude)?;
    }
    writer.finalize()?;

    Ok(path.to_string_lossy().into_owned())
}

#[test]
fn test_open_reads_wav_metadata() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_fixture(&dir, "fixture.wav", 2, 1000)?;

    let source = FileSource::open(&path)?;

    assert_eq!(source.sample_rate, 16000);
    assert_eq!(source.channels, 1);
    assert!((source.duration_seconds - 2.0).abs() < 0.01);

    Ok(())
}

#[test]
fn test_open_missing_file_is_device_error() {
    let result = FileSource::open("/nonexistent/clip.wav");
    assert!(matches!(result, Err(DeviceError::NotFound { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_acquire_paces_frames_and_energy() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_fixture(&dir, "fixture.wav", 1, 8000)?;

    let mut source = FileSource::open(&path)?;
    let mut stream = source.acquire().await?;

    // One second of audio in 100ms frames
    let mut frames = Vec::new();
    while let Ok(Some(frame)) =
        timeout(std::time::Duration::from_millis(200), stream.frames.recv()).await
    {
        frames.push(frame);
    }

    assert_eq!(frames.len(), 10);
    assert!(frames.iter().all(|f| f.samples.len() == 1600));
    assert!(frames.iter().all(|f| f.sample_rate == 16000));

    // Timestamps advance by the frame duration
    assert_eq!(frames[0].timestamp_ms, 0);
    assert_eq!(frames[9].timestamp_ms, 900);

    // Constant non-zero amplitude shows up in the energy snapshot
    let bins = stream.energy.borrow().bins.clone();
    assert!(!bins.is_empty());
    assert!(bins.iter().all(|&b| b > 0));

    source.release().await?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_release_is_idempotent() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_fixture(&dir, "fixture.wav", 1, 1000)?;

    let mut source = FileSource::open(&path)?;
    let _stream = source.acquire().await?;

    source.release().await?;
    source.release().await?;

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_second_acquire_without_release_fails() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_fixture(&dir, "fixture.wav", 1, 1000)?;

    let mut source = FileSource::open(&path)?;
    let _stream = source.acquire().await?;

    assert!(source.acquire().await.is_err());

    source.release().await?;
    Ok(())
}
