//! `NormalizedWaveform` — the canonical PCM form every downstream stage
//! consumes.
//!
//! The normalizer always produces **16 kHz, mono, f32** samples decoded from
//! 16-bit linear PCM.  [`NormalizedWaveform::wav_bytes`] re-encodes the
//! samples as an in-memory PCM WAV for the recognition service, so no stage
//! after normalization ever touches the original container.

use std::io::Cursor;

/// Canonical sample rate of normalized audio.
pub const SAMPLE_RATE: u32 = 16_000;

/// 16 kHz mono f32 PCM derived from one [`AudioBlob`](crate::audio::AudioBlob).
///
/// Owned by a single pipeline invocation; never shared across requests.
/// Invariant: directly decodable by the recognizer with no further
/// conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedWaveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl NormalizedWaveform {
    /// Wrap already-normalized samples.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Clip duration in seconds.
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Encode the waveform as a complete 16-bit PCM WAV file in memory.
    ///
    /// Used to build the multipart body for the recognition request.
    /// Samples are clamped to `[-1.0, 1.0]` before scaling to i16.
    pub fn wav_bytes(&self) -> Result<Vec<u8>, hound::Error> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
            for &sample in &self.samples {
                let scaled = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                writer.write_sample(scaled)?;
            }
            writer.finalize()?;
        }

        Ok(cursor.into_inner())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
