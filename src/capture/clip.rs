use crate::error::CaptureError;
use chrono::{DateTime, Utc};
use std::io::Cursor;

/// Container/codec tag attached to every clip
pub const CLIP_CODEC: &str = "wav";

/// A bounded-duration audio segment bound for remote classification.
///
/// Owned by the recorder until handed to the classifier, then owned by the
/// in-flight request and dropped with it. Never persisted.
#[derive(Debug, Clone)]
pub struct AudioClip {
    /// Encoded audio bytes (WAV container)
    pub bytes: Vec<u8>,
    /// Container/codec tag
    pub codec: &'static str,
    /// Clip duration in milliseconds
    pub duration_ms: u64,
    /// When the clip was captured
    pub captured_at: DateTime<Utc>,
}

/// Encode accumulated PCM samples as an in-memory WAV clip.
pub fn encode_wav_clip(
    samples: &[i16],
    sample_rate: u32,
    channels: u16,
) -> Result<AudioClip, CaptureError> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());

    let mut writer = hound::WavWriter::new(&mut cursor, spec)
        .map_err(|e| CaptureError::Encode(e.to_string()))?;

    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| CaptureError::Encode(e.to_string()))?;
    }

    writer
        .finalize()
        .map_err(|e| CaptureError::Encode(e.to_string()))?;

    let duration_ms = samples.len() as u64 * 1000 / (sample_rate as u64 * channels as u64);

    Ok(AudioClip {
        bytes: cursor.into_inner(),
        codec: CLIP_CODEC,
        duration_ms,
        captured_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_wav_clip_duration() {
        // 1 second of 16kHz mono
        let clip = encode_wav_clip(&vec![0i16; 16000], 16000, 1).unwrap();
        assert_eq!(clip.duration_ms, 1000);
        assert_eq!(clip.codec, "wav");
        // WAV header plus 2 bytes per sample
        assert!(clip.bytes.len() > 16000 * 2);
    }

    #[test]
    fn test_encode_wav_clip_stereo_duration() {
        let clip = encode_wav_clip(&vec![0i16; 16000 * 2], 16000, 2).unwrap();
        assert_eq!(clip.duration_ms, 1000);
    }
}
