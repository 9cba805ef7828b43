//! Pipeline orchestrator for voice-translate.
//!
//! This module composes the four capabilities into one request-scoped,
//! fail-fast sequence and maps every failure to a structured result.
//!
//! # Architecture
//!
//! ```text
//! TranslationPipeline::run(blob, source_raw, target_raw)
//!        │
//!        ├─ resolve LanguageCodes (infallible, "en" fallback)
//!        ├─ Workspace::acquire()                 [Received]
//!        ├─ normalizer.normalize(…)              [Normalized]
//!        ├─ recognizer.recognize(…)              [Recognized]
//!        ├─ translator.translate(…)              [Translated]
//!        ├─ synthesizer.synthesize(…)            [Synthesized]
//!        ├─ assemble PipelineSuccess             [Completed]
//!        └─ workspace release on every path      (logged, never overriding)
//!
//! any stage ──error──▶ PipelineFailure { stage, kind, message }  [Failed]
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use voice_translate::audio::{AudioBlob, FfmpegNormalizer, ToolchainConfig};
//! use voice_translate::config::AppConfig;
//! use voice_translate::pipeline::TranslationPipeline;
//! use voice_translate::recognize::HttpRecognizer;
//! use voice_translate::synth::HttpSynthesizer;
//! use voice_translate::translate::HttpTranslator;
//!
//! # async fn example() {
//! let config = AppConfig::default();
//! let toolchain = ToolchainConfig::detect().expect("ffmpeg missing");
//!
//! let pipeline = TranslationPipeline::new(
//!     Arc::new(FfmpegNormalizer::new(toolchain)),
//!     Arc::new(HttpRecognizer::from_config(&config.recognizer)),
//!     Arc::new(HttpTranslator::from_config(&config.translator)),
//!     Arc::new(HttpSynthesizer::from_config(&config.synthesizer)),
//! );
//!
//! let blob = AudioBlob::new(vec![/* upload bytes */], Some("webm".into()));
//! let outcome = pipeline.run(blob, "auto", "es").await;
//! # let _ = outcome;
//! # }
//! ```

pub mod outcome;
pub mod runner;
pub mod state;
pub mod workspace;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use outcome::{ErrorClass, FailureKind, PipelineFailure, PipelineSuccess, Stage};
pub use runner::TranslationPipeline;
pub use state::PipelineState;
pub use workspace::{Workspace, WorkspaceError};
