//! Speech synthesis — translated text → spoken audio bytes.
//!
//! [`SpeechSynthesizer`] is the async capability trait;
//! [`HttpSynthesizer`] posts to an OpenAI-compatible `/v1/audio/speech`
//! endpoint and returns the encoded audio entirely in memory — no on-disk
//! state outside the request workspace, ever.

pub mod engine;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use engine::{HttpSynthesizer, SpeechSynthesizer, SynthError, SynthesisArtifact};

// test-only re-export so pipeline tests can import the mock directly.
#[cfg(test)]
pub use engine::MockSynthesizer;
