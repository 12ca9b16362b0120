use super::source::{AudioFrame, AudioSource, AudioStream, EnergySnapshot};
use crate::error::DeviceError;
use hound::WavReader;
use std::path::Path;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Frame pacing for file playback (matches typical capture buffer latency)
const FRAME_DURATION_MS: u64 = 100;

/// Number of energy bins published per frame
const ENERGY_BINS: usize = 32;

/// WAV-file-backed audio source
///
/// Paces the file's samples into the stream in real time, 100ms per frame,
/// and publishes an energy snapshot per frame. Used by the demo binary and
/// integration tests; live device capture is provided by the embedding
/// application.
pub struct FileSource {
    pub path: String,
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
    samples: Vec<i16>,
    feeder: Option<JoinHandle<()>>,
}

impl FileSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DeviceError> {
        let path = path.as_ref();
        info!("Opening audio file: {}", path.display());

        let reader = WavReader::open(path).map_err(|e| DeviceError::NotFound {
            name: Some(format!("{}: {}", path.display(), e)),
        })?;

        let spec = reader.spec();
        let samples: Vec<i16> = reader
            .into_samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DeviceError::Other(format!("failed to read samples: {}", e)))?;

        let duration_seconds =
            samples.len() as f64 / (spec.sample_rate as f64 * spec.channels as f64);

        info!(
            "Audio file loaded: {:.1}s, {}Hz, {} channels, {} samples",
            duration_seconds,
            spec.sample_rate,
            spec.channels,
            samples.len()
        );

        Ok(Self {
            path: path.display().to_string(),
            duration_seconds,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            samples,
            feeder: None,
        })
    }
}

#[async_trait::async_trait]
impl AudioSource for FileSource {
    async fn acquire(&mut self) -> Result<AudioStream, DeviceError> {
        if self.feeder.is_some() {
            return Err(DeviceError::Other("source already acquired".into()));
        }

        let (frame_tx, frame_rx) = mpsc::channel(32);
        let (energy_tx, energy_rx) = watch::channel(EnergySnapshot::default());

        let samples = self.samples.clone();
        let sample_rate = self.sample_rate;
        let channels = self.channels;
        let samples_per_frame =
            (sample_rate as u64 * FRAME_DURATION_MS / 1000) as usize * channels as usize;

        let feeder = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(FRAME_DURATION_MS));
            let mut timestamp_ms = 0u64;

            for chunk in samples.chunks(samples_per_frame.max(1)) {
                ticker.tick().await;

                let _ = energy_tx.send(EnergySnapshot {
                    bins: energy_bins(chunk),
                });

                let frame = AudioFrame {
                    samples: chunk.to_vec(),
                    sample_rate,
                    channels,
                    timestamp_ms,
                };

                if frame_tx.send(frame).await.is_err() {
                    // Receiver dropped; nobody is listening anymore
                    break;
                }

                timestamp_ms += FRAME_DURATION_MS;
            }

            debug!("File source reached end of input");
        });

        self.feeder = Some(feeder);

        Ok(AudioStream {
            frames: frame_rx,
            energy: energy_rx,
        })
    }

    async fn release(&mut self) -> Result<(), DeviceError> {
        if let Some(feeder) = self.feeder.take() {
            feeder.abort();
            debug!("File source released");
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.path
    }
}

/// Approximate an analyser's frequency-bin magnitudes from raw PCM.
///
/// Splits the frame into `ENERGY_BINS` slices and maps each slice's RMS
/// amplitude onto the 0-255 magnitude range.
pub fn energy_bins(samples: &[i16]) -> Vec<u8> {
    if samples.is_empty() {
        return vec![0; ENERGY_BINS];
    }

    let slice_len = (samples.len() / ENERGY_BINS).max(1);
    samples
        .chunks(slice_len)
        .take(ENERGY_BINS)
        .map(|slice| {
            let sum_sq: f64 = slice.iter().map(|&s| (s as f64) * (s as f64)).sum();
            let rms = (sum_sq / slice.len() as f64).sqrt();
            ((rms / i16::MAX as f64) * 255.0).min(255.0) as u8
        })
        .collect()
}
