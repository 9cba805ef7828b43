//! Audio handling — upload sniffing, toolchain detection, normalization.
//!
//! # Pipeline position
//!
//! ```text
//! AudioBlob (any container) → FfmpegNormalizer → NormalizedWaveform
//!                               (ffmpeg →          (16 kHz mono f32,
//!                                pcm_s16le WAV)     recognizer-ready)
//! ```
//!
//! The conversion toolchain is located once at startup
//! ([`ToolchainConfig::detect`]) and injected into the normalizer; nothing
//! here reads ambient global state.

pub mod blob;
pub mod normalize;
pub mod toolchain;
pub mod waveform;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use blob::{AudioBlob, ContainerFormat};
pub use normalize::{AudioNormalizer, FfmpegNormalizer, NormalizeError};
pub use toolchain::{ToolchainConfig, ToolchainError};
pub use waveform::{NormalizedWaveform, SAMPLE_RATE};

// test-only re-export so the pipeline test module can use the stub
// normalizer without naming the inner module.
#[cfg(test)]
pub use normalize::MockNormalizer;
