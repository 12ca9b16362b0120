use crate::error::DeviceError;
use tokio::sync::{mpsc, watch};

/// Audio sample data (16-bit PCM, interleaved)
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Latest frequency-bin magnitudes from the source.
///
/// Each bin is a 0-255 magnitude. The loudness monitor averages the bins
/// on its own schedule; it never blocks on the source.
#[derive(Debug, Clone, Default)]
pub struct EnergySnapshot {
    pub bins: Vec<u8>,
}

/// The two lanes fed by an acquired source.
///
/// `frames` carries raw PCM for clip capture; `energy` always holds the
/// most recent frequency-bin snapshot for loudness sampling. Closure of
/// either channel means the source is gone.
pub struct AudioStream {
    pub frames: mpsc::Receiver<AudioFrame>,
    pub energy: watch::Receiver<EnergySnapshot>,
}

/// Audio capture source trait
///
/// Implementations:
/// - `FileSource`: paces a WAV file in real time (demos/tests)
/// - Live device capture is provided by the embedding application
#[async_trait::async_trait]
pub trait AudioSource: Send {
    /// Acquire the device and start capturing.
    ///
    /// May fail with `DeviceError` (permission denied, no device); that
    /// failure is fatal to session start.
    async fn acquire(&mut self) -> Result<AudioStream, DeviceError>;

    /// Release the device. Must be idempotent and must free the device
    /// even if capture already failed.
    async fn release(&mut self) -> Result<(), DeviceError>;

    /// Get source name for logging
    fn name(&self) -> &str;
}
