//! Application entry point — voice-translate CLI.
//!
//! A thin front end standing in for the serving layer: it reads one audio
//! file, runs the translation pipeline, and prints the structured result as
//! JSON (success to stdout, failure to stderr with a non-zero exit).
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (writes the default `settings.toml` on
//!    first run).
//! 3. Detect the conversion toolchain — fail fast if ffmpeg is absent.
//! 4. Build the four pipeline capabilities from config.
//! 5. Create [`tokio`] runtime (multi-thread, 2 workers).
//! 6. Run the pipeline and print the outcome.
//!
//! # Usage
//!
//! ```text
//! voice-translate <audio-file> [source-lang] [target-lang]
//! ```
//!
//! `source-lang` defaults to `auto`, `target-lang` to `en` (both
//! overridable in `settings.toml`).

use std::sync::Arc;

use anyhow::{bail, Context};

use voice_translate::{
    audio::{AudioBlob, FfmpegNormalizer, ToolchainConfig},
    config::AppConfig,
    pipeline::TranslationPipeline,
    recognize::HttpRecognizer,
    synth::HttpSynthesizer,
    translate::HttpTranslator,
};

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("voice-translate starting up");

    // 2. Configuration — a default settings.toml is written on first run.
    let config = AppConfig::load_or_init().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Toolchain detection — the whole process is useless without ffmpeg,
    //    so refuse to start rather than fail every request later.
    let toolchain = ToolchainConfig::detect_with(&config.toolchain)
        .context("audio conversion toolchain not available")?;

    // CLI arguments
    let args: Vec<String> = std::env::args().collect();
    let Some(audio_path) = args.get(1) else {
        bail!("usage: voice-translate <audio-file> [source-lang] [target-lang]");
    };
    let source_lang = args
        .get(2)
        .cloned()
        .unwrap_or_else(|| config.limits.default_source_lang.clone());
    let target_lang = args
        .get(3)
        .cloned()
        .unwrap_or_else(|| config.limits.default_target_lang.clone());

    // Read the upload and enforce the size cap the serving layer would.
    let bytes = std::fs::read(audio_path).with_context(|| format!("reading {audio_path}"))?;
    if bytes.len() as u64 > config.limits.max_upload_bytes {
        bail!(
            "{audio_path} is {} bytes, over the {} byte limit",
            bytes.len(),
            config.limits.max_upload_bytes
        );
    }

    let extension = std::path::Path::new(audio_path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_string);
    let blob = AudioBlob::new(bytes, extension);

    // 4. Pipeline capabilities
    let pipeline = TranslationPipeline::new(
        Arc::new(FfmpegNormalizer::new(toolchain)),
        Arc::new(HttpRecognizer::from_config(&config.recognizer)),
        Arc::new(HttpTranslator::from_config(&config.translator)),
        Arc::new(HttpSynthesizer::from_config(&config.synthesizer)),
    );

    // 5. Tokio runtime (2 workers — one run at a time needs no more)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    // 6. Run and report
    match rt.block_on(pipeline.run(blob, &source_lang, &target_lang)) {
        Ok(success) => {
            println!("{}", serde_json::to_string_pretty(&success)?);
            Ok(())
        }
        Err(failure) => {
            eprintln!("{}", serde_json::to_string_pretty(&failure)?);
            std::process::exit(if failure.kind.http_status() == 400 { 2 } else { 1 });
        }
    }
}
