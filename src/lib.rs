//! voice-translate — spoken-audio translation pipeline.
//!
//! Converts a short audio clip in one language into spoken audio in another,
//! exposing the intermediate text artifacts to the caller.
//!
//! # Pipeline
//!
//! ```text
//! AudioBlob ──▶ AudioNormalizer ──▶ SpeechRecognizer ──▶ Translator ──▶ SpeechSynthesizer
//!                 (ffmpeg →           (STT service)       (MT service)    (TTS service)
//!                  16 kHz PCM)
//! ```
//!
//! One pipeline run per request, strictly sequential, fail-fast.  Every run
//! owns a scoped temporary workspace that is released on all exit paths.
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
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let toolchain = ToolchainConfig::detect().expect("ffmpeg not installed");
//!
//!     let pipeline = TranslationPipeline::new(
//!         Arc::new(FfmpegNormalizer::new(toolchain)),
//!         Arc::new(HttpRecognizer::from_config(&config.recognizer)),
//!         Arc::new(HttpTranslator::from_config(&config.translator)),
//!         Arc::new(HttpSynthesizer::from_config(&config.synthesizer)),
//!     );
//!
//!     let blob = AudioBlob::new(std::fs::read("clip.ogg").unwrap(), Some("ogg".into()));
//!     match pipeline.run(blob, "auto", "es").await {
//!         Ok(success) => println!("{}", success.translated_text),
//!         Err(failure) => eprintln!("{failure}"),
//!     }
//! }
//! ```

pub mod audio;
pub mod config;
pub mod lang;
pub mod pipeline;
pub mod recognize;
pub mod synth;
pub mod translate;
