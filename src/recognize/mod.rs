//! Speech recognition — normalized waveform → recognized text.
//!
//! # Architecture
//!
//! ```text
//! NormalizedWaveform ──▶ NoiseProfile::measure (ambient calibration)
//!                           │
//!                           ├─ no speech frames ──▶ RecognizeError::NoSpeech
//!                           │
//!                           └─ speech present ──▶ HTTP transcription service
//!                                                    │
//!                                                    └─▶ RecognitionResult
//! ```
//!
//! Calibration is a capability-internal concern: [`HttpRecognizer`] performs
//! it before every service call, the pipeline never has to.

pub mod calibrate;
pub mod engine;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use calibrate::NoiseProfile;
pub use engine::{HttpRecognizer, RecognitionResult, RecognizeError, SpeechRecognizer};

// test-only re-export so pipeline tests can import the mock directly.
#[cfg(test)]
pub use engine::MockRecognizer;
