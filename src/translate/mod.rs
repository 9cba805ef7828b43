//! Text translation — recognized text → target-language text.
//!
//! [`Translator`] is the async capability trait; [`HttpTranslator`] speaks
//! the LibreTranslate wire format, so any compatible self-hosted or managed
//! instance works.  Text is treated as opaque — no segmentation or
//! post-processing happens on this side of the wire.

pub mod engine;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use engine::{HttpTranslator, TranslateError, TranslationResult, Translator};

// test-only re-export so pipeline tests can import the mock directly.
#[cfg(test)]
pub use engine::MockTranslator;
