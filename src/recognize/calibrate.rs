//! Ambient-noise calibration for speech recognition.
//!
//! Before a waveform is sent to the recognition service, the recognizer
//! measures the ambient noise floor from the leading portion of the clip and
//! checks whether anything in the clip rises meaningfully above it.  A clip
//! with no such frame is reported as containing no speech — without ever
//! contacting the service.
//!
//! ## Algorithm
//!
//! The noise floor is the RMS amplitude of the first 300 ms.  The clip is
//! then scanned in 30 ms frames; a frame counts as speech when its RMS
//! exceeds `max(floor × 1.5, 0.005)`.  The absolute minimum keeps a
//! digitally-silent clip (floor = 0) from passing on any nonzero wobble.

use crate::audio::NormalizedWaveform;

/// Leading window used to estimate the ambient noise floor.
const CALIBRATION_WINDOW_SECS: f32 = 0.3;

/// Frame length for the speech scan: 30 ms.
const FRAME_SECS: f32 = 0.03;

/// Frames must exceed the noise floor by this factor to count as speech.
const SPEECH_FACTOR: f32 = 1.5;

/// Absolute RMS floor below which nothing counts as speech.
const MIN_SPEECH_RMS: f32 = 0.005;

/// Ambient noise profile of one clip.
///
/// # Example
///
/// ```rust
/// use voice_translate::audio::{NormalizedWaveform, SAMPLE_RATE};
/// use voice_translate::recognize::NoiseProfile;
///
/// let silence = NormalizedWaveform::new(vec![0.0; SAMPLE_RATE as usize], SAMPLE_RATE);
/// let profile = NoiseProfile::measure(&silence);
/// assert!(!profile.contains_speech(&silence));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct NoiseProfile {
    floor_rms: f32,
}

impl NoiseProfile {
    /// Measure the noise floor from the leading window of `waveform`.
    pub fn measure(waveform: &NormalizedWaveform) -> Self {
        let window = (waveform.sample_rate() as f32 * CALIBRATION_WINDOW_SECS) as usize;
        let lead = &waveform.samples()[..window.min(waveform.samples().len())];

        Self {
            floor_rms: rms(lead),
        }
    }

    /// Noise floor measured during calibration.
    pub fn floor_rms(&self) -> f32 {
        self.floor_rms
    }

    /// RMS a frame must exceed to count as speech.
    pub fn speech_threshold(&self) -> f32 {
        (self.floor_rms * SPEECH_FACTOR).max(MIN_SPEECH_RMS)
    }

    /// Returns `true` when at least one 30 ms frame rises above the speech
    /// threshold.
    pub fn contains_speech(&self, waveform: &NormalizedWaveform) -> bool {
        let frame_len = ((waveform.sample_rate() as f32 * FRAME_SECS) as usize).max(1);
        let threshold = self.speech_threshold();

        waveform
            .samples()
            .chunks(frame_len)
            .any(|frame| rms(frame) > threshold)
    }
}

/// Root-mean-square amplitude of a sample slice.
fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let mean_sq: f32 = samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32;
    mean_sq.sqrt()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
