//! `TranslationPipeline` — drives the full normalize → recognize → translate
//! → synthesize sequence for one request.
//!
//! The pipeline is stateless between runs: the capabilities are shared,
//! thread-safe `Arc<dyn …>` values, and everything request-scoped (blob,
//! waveform, texts, artifact, workspace) lives and dies inside `run`.
//! Stages are strictly sequential; a stage only starts once the previous
//! stage's output is fully materialized, and any failure stops the run with
//! no retry.

use std::sync::Arc;

use crate::audio::{AudioBlob, AudioNormalizer};
use crate::lang::LanguageCode;
use crate::recognize::SpeechRecognizer;
use crate::synth::SpeechSynthesizer;
use crate::translate::Translator;

use super::outcome::{PipelineFailure, PipelineSuccess};
use super::state::PipelineState;
use super::workspace::Workspace;

// ---------------------------------------------------------------------------
// TranslationPipeline
// ---------------------------------------------------------------------------

/// Orchestrates one audio-translation request end to end.
///
/// Create once with [`TranslationPipeline::new`] and share it across
/// requests; each [`run`](Self::run) is independent of every other.
pub struct TranslationPipeline {
    normalizer: Arc<dyn AudioNormalizer>,
    recognizer: Arc<dyn SpeechRecognizer>,
    translator: Arc<dyn Translator>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
}

impl TranslationPipeline {
    /// Assemble a pipeline from its four capabilities.
    pub fn new(
        normalizer: Arc<dyn AudioNormalizer>,
        recognizer: Arc<dyn SpeechRecognizer>,
        translator: Arc<dyn Translator>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        Self {
            normalizer,
            recognizer,
            translator,
            synthesizer,
        }
    }

    /// Run the full pipeline for one request.
    ///
    /// `source_raw` and `target_raw` may be free-form language strings;
    /// resolution never fails the request (unknown values fall back to the
    /// defaults).  Every exit path — success, recognized failure — releases
    /// the request workspace before returning; a release failure is logged
    /// and never overrides the stage outcome.
    pub async fn run(
        &self,
        blob: AudioBlob,
        source_raw: &str,
        target_raw: &str,
    ) -> Result<PipelineSuccess, PipelineFailure> {
        let source = LanguageCode::resolve_source(source_raw);
        let target = LanguageCode::resolve(target_raw);

        log::info!(
            "pipeline: run start ({} bytes, {} → {})",
            blob.len(),
            source,
            target
        );

        let workspace = Workspace::acquire().map_err(PipelineFailure::from_workspace)?;

        let result = self.run_stages(&blob, &workspace, &source, &target).await;

        // Cleanup happens on both arms; the outcome is already decided.
        workspace.release();

        match &result {
            Ok(_) => log::info!("pipeline: run completed"),
            Err(failure) => log::warn!("pipeline: {failure}"),
        }

        result
    }

    // -----------------------------------------------------------------------
    // Stage sequence
    // -----------------------------------------------------------------------

    async fn run_stages(
        &self,
        blob: &AudioBlob,
        workspace: &Workspace,
        source: &LanguageCode,
        target: &LanguageCode,
    ) -> Result<PipelineSuccess, PipelineFailure> {
        let mut state = PipelineState::Received;

        // ── 1. Normalize ─────────────────────────────────────────────────
        let waveform = self
            .normalizer
            .normalize(blob, workspace)
            .await
            .map_err(PipelineFailure::from_normalize)?;
        state = self.transition(state, PipelineState::Normalized);

        // ── 2. Recognize ─────────────────────────────────────────────────
        let recognition = self
            .recognizer
            .recognize(&waveform, source.as_str())
            .await
            .map_err(PipelineFailure::from_recognize)?;
        state = self.transition(state, PipelineState::Recognized);

        // ── 3. Translate ─────────────────────────────────────────────────
        let translation = self
            .translator
            .translate(&recognition.text, source, target)
            .await
            .map_err(PipelineFailure::from_translate)?;
        state = self.transition(state, PipelineState::Translated);

        // ── 4. Synthesize ────────────────────────────────────────────────
        let artifact = self
            .synthesizer
            .synthesize(&translation.text, target)
            .await
            .map_err(PipelineFailure::from_synthesize)?;
        state = self.transition(state, PipelineState::Synthesized);

        // ── 5. Assemble ──────────────────────────────────────────────────
        let success = PipelineSuccess {
            recognized_text: recognition.text,
            translated_text: translation.text,
            audio_base64: artifact.to_base64(),
        };
        self.transition(state, PipelineState::Completed);

        Ok(success)
    }

    fn transition(&self, from: PipelineState, to: PipelineState) -> PipelineState {
        log::debug!("pipeline: {} → {}", from.label(), to.label());
        to
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{
        MockNormalizer, NormalizeError, NormalizedWaveform, SAMPLE_RATE,
    };
    use crate::pipeline::outcome::{FailureKind, Stage};
    use crate::recognize::{MockRecognizer, RecognizeError};
    use crate::synth::{MockSynthesizer, SynthError};
    use crate::translate::{MockTranslator, TranslateError};

    fn upload() -> AudioBlob {
        AudioBlob::new(vec![0xFF, 0xFB, 0x90, 0x00], Some("mp3".into()))
    }

    fn speech_waveform() -> NormalizedWaveform {
        let mut samples = vec![0.0; 8_000];
        samples.extend(vec![0.5; 8_000]);
        NormalizedWaveform::new(samples, SAMPLE_RATE)
    }

    /// Build a pipeline over the given mocks, returning shared handles so
    /// tests can inspect call counts afterwards.
    fn pipeline(
        normalizer: MockNormalizer,
        recognizer: MockRecognizer,
        translator: MockTranslator,
        synthesizer: MockSynthesizer,
    ) -> (
        TranslationPipeline,
        Arc<MockNormalizer>,
        Arc<MockRecognizer>,
        Arc<MockTranslator>,
        Arc<MockSynthesizer>,
    ) {
        let normalizer = Arc::new(normalizer);
        let recognizer = Arc::new(recognizer);
        let translator = Arc::new(translator);
        let synthesizer = Arc::new(synthesizer);

        let p = TranslationPipeline::new(
            Arc::clone(&normalizer) as Arc<dyn AudioNormalizer>,
            Arc::clone(&recognizer) as Arc<dyn SpeechRecognizer>,
            Arc::clone(&translator) as Arc<dyn Translator>,
            Arc::clone(&synthesizer) as Arc<dyn SpeechSynthesizer>,
        );

        (p, normalizer, recognizer, translator, synthesizer)
    }

    // ---- happy path ----

    #[tokio::test]
    async fn hello_to_hola_end_to_end() {
        let (p, _, _, _, _) = pipeline(
            MockNormalizer::ok(speech_waveform()),
            MockRecognizer::ok("hello"),
            MockTranslator::new().map("hello", "auto", "es", "hola"),
            MockSynthesizer::ok(b"AUDIO".to_vec()),
        );

        let success = p.run(upload(), "auto", "es").await.expect("success");

        assert_eq!(success.recognized_text, "hello");
        assert_eq!(success.translated_text, "hola");
        // base64("AUDIO")
        assert_eq!(success.audio_base64, "QVVESU8=");
    }

    #[tokio::test]
    async fn free_form_language_names_are_resolved() {
        let (p, _, _, _, _) = pipeline(
            MockNormalizer::ok(speech_waveform()),
            MockRecognizer::ok("hello"),
            MockTranslator::new().map("hello", "en", "es", "hola"),
            MockSynthesizer::ok(b"AUDIO".to_vec()),
        );

        // "English"/"Spanish" resolve to "en"/"es" before the translator
        // ever sees them.
        let success = p.run(upload(), "English", "Spanish").await.expect("success");
        assert_eq!(success.translated_text, "hola");
    }

    #[tokio::test]
    async fn unresolvable_target_falls_back_to_default_not_failure() {
        let (p, _, _, translator, _) = pipeline(
            MockNormalizer::ok(speech_waveform()),
            MockRecognizer::ok("hello"),
            MockTranslator::new().map("hello", "auto", "en", "hello"),
            MockSynthesizer::ok(b"AUDIO".to_vec()),
        );

        let result = p.run(upload(), "auto", "klingon").await;

        assert!(result.is_ok(), "fallback must not fail the request");
        assert_eq!(translator.calls(), 1);
    }

    #[tokio::test]
    async fn idempotent_with_deterministic_mocks() {
        let (p, _, _, _, _) = pipeline(
            MockNormalizer::ok(speech_waveform()),
            MockRecognizer::ok("hello"),
            MockTranslator::new().map("hello", "auto", "es", "hola"),
            MockSynthesizer::ok(b"AUDIO".to_vec()),
        );

        let first = p.run(upload(), "auto", "es").await.expect("first run");
        let second = p.run(upload(), "auto", "es").await.expect("second run");

        assert_eq!(first.recognized_text, second.recognized_text);
        assert_eq!(first.translated_text, second.translated_text);
        assert_eq!(first.audio_base64, second.audio_base64);
    }

    #[tokio::test]
    async fn empty_translation_completes_with_empty_audio() {
        let (p, _, _, _, synthesizer) = pipeline(
            MockNormalizer::ok(speech_waveform()),
            MockRecognizer::ok(""),
            MockTranslator::new(), // echoes "" back
            MockSynthesizer::ok(b"AUDIO".to_vec()),
        );

        let success = p.run(upload(), "auto", "es").await.expect("success");

        assert_eq!(success.recognized_text, "");
        assert_eq!(success.translated_text, "");
        assert_eq!(success.audio_base64, "");
        // The synthesizer was consulted; its empty-text policy applied.
        assert_eq!(synthesizer.calls(), 1);
    }

    // ---- short-circuiting ----

    #[tokio::test]
    async fn normalize_failure_stops_everything_downstream() {
        let (p, _, recognizer, translator, synthesizer) = pipeline(
            MockNormalizer::err(NormalizeError::Conversion("ffmpeg not found".into())),
            MockRecognizer::ok("hello"),
            MockTranslator::new(),
            MockSynthesizer::ok(b"AUDIO".to_vec()),
        );

        let failure = p.run(upload(), "auto", "es").await.unwrap_err();

        assert_eq!(failure.stage, Stage::Normalize);
        assert_eq!(failure.kind, FailureKind::ConversionError);
        assert_eq!(recognizer.calls(), 0);
        assert_eq!(translator.calls(), 0);
        assert_eq!(synthesizer.calls(), 0);
    }

    #[tokio::test]
    async fn unsupported_upload_is_client_class() {
        let (p, _, _, _, _) = pipeline(
            MockNormalizer::err(NormalizeError::UnsupportedFormat("empty upload".into())),
            MockRecognizer::ok("hello"),
            MockTranslator::new(),
            MockSynthesizer::ok(b"AUDIO".to_vec()),
        );

        let failure = p.run(AudioBlob::new(Vec::new(), None), "auto", "es").await.unwrap_err();

        assert_eq!(failure.kind, FailureKind::UnsupportedFormat);
        assert_eq!(failure.kind.http_status(), 400);
    }

    #[tokio::test]
    async fn silence_halts_before_translation_and_synthesis() {
        let (p, _, recognizer, translator, synthesizer) = pipeline(
            MockNormalizer::silence(),
            MockRecognizer::err(RecognizeError::NoSpeech),
            MockTranslator::new(),
            MockSynthesizer::ok(b"AUDIO".to_vec()),
        );

        let failure = p.run(upload(), "auto", "es").await.unwrap_err();

        assert_eq!(failure.stage, Stage::Recognize);
        assert_eq!(failure.kind, FailureKind::NoSpeechDetected);
        assert_eq!(failure.kind.http_status(), 400);
        assert_eq!(recognizer.calls(), 1);
        assert_eq!(translator.calls(), 0);
        assert_eq!(synthesizer.calls(), 0);
    }

    #[tokio::test]
    async fn recognition_service_failure_is_server_class() {
        let (p, _, _, translator, _) = pipeline(
            MockNormalizer::ok(speech_waveform()),
            MockRecognizer::err(RecognizeError::Service("connection refused".into())),
            MockTranslator::new(),
            MockSynthesizer::ok(b"AUDIO".to_vec()),
        );

        let failure = p.run(upload(), "auto", "es").await.unwrap_err();

        assert_eq!(failure.kind, FailureKind::RecognitionServiceError);
        assert_eq!(failure.kind.http_status(), 500);
        assert_eq!(translator.calls(), 0);
    }

    #[tokio::test]
    async fn translation_failure_stops_synthesis() {
        let (p, _, _, _, synthesizer) = pipeline(
            MockNormalizer::ok(speech_waveform()),
            MockRecognizer::ok("hello"),
            MockTranslator::err(TranslateError::Timeout),
            MockSynthesizer::ok(b"AUDIO".to_vec()),
        );

        let failure = p.run(upload(), "auto", "es").await.unwrap_err();

        assert_eq!(failure.stage, Stage::Translate);
        assert_eq!(failure.kind, FailureKind::TranslationServiceError);
        assert_eq!(synthesizer.calls(), 0);
    }

    #[tokio::test]
    async fn synthesis_failure_is_tagged_at_its_stage() {
        let (p, _, _, _, _) = pipeline(
            MockNormalizer::ok(speech_waveform()),
            MockRecognizer::ok("hello"),
            MockTranslator::new().map("hello", "auto", "es", "hola"),
            MockSynthesizer::err(SynthError::Service("voice model missing".into())),
        );

        let failure = p.run(upload(), "auto", "es").await.unwrap_err();

        assert_eq!(failure.stage, Stage::Synthesize);
        assert_eq!(failure.kind, FailureKind::SynthesisServiceError);
    }

    // ---- workspace lifecycle ----

    /// Normalizer double that records the workspace directory and leaves a
    /// staged file behind, so tests can observe the cleanup after `run`.
    struct SpyNormalizer {
        seen: std::sync::Mutex<Option<std::path::PathBuf>>,
    }

    impl SpyNormalizer {
        fn new() -> Self {
            Self {
                seen: std::sync::Mutex::new(None),
            }
        }

        fn seen_dir(&self) -> Option<std::path::PathBuf> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl AudioNormalizer for SpyNormalizer {
        async fn normalize(
            &self,
            _blob: &AudioBlob,
            workspace: &Workspace,
        ) -> Result<NormalizedWaveform, NormalizeError> {
            std::fs::write(workspace.file("staged.wav"), b"scratch")
                .map_err(|e| NormalizeError::Conversion(e.to_string()))?;
            *self.seen.lock().unwrap() = Some(workspace.path().to_path_buf());
            Ok(speech_waveform())
        }
    }

    #[tokio::test]
    async fn workspace_is_removed_after_success() {
        let normalizer = Arc::new(SpyNormalizer::new());
        let p = TranslationPipeline::new(
            Arc::clone(&normalizer) as Arc<dyn AudioNormalizer>,
            Arc::new(MockRecognizer::ok("hello")),
            Arc::new(MockTranslator::new().map("hello", "auto", "es", "hola")),
            Arc::new(MockSynthesizer::ok(b"AUDIO".to_vec())),
        );

        p.run(upload(), "auto", "es").await.expect("success");

        let dir = normalizer.seen_dir().expect("normalizer ran");
        assert!(!dir.exists(), "workspace must be gone after the run");
    }

    #[tokio::test]
    async fn workspace_is_removed_after_mid_pipeline_failure() {
        let normalizer = Arc::new(SpyNormalizer::new());
        let p = TranslationPipeline::new(
            Arc::clone(&normalizer) as Arc<dyn AudioNormalizer>,
            Arc::new(MockRecognizer::err(RecognizeError::Service("down".into()))),
            Arc::new(MockTranslator::new()),
            Arc::new(MockSynthesizer::ok(b"AUDIO".to_vec())),
        );

        let failure = p.run(upload(), "auto", "es").await.unwrap_err();
        assert_eq!(failure.stage, Stage::Recognize);

        let dir = normalizer.seen_dir().expect("normalizer ran");
        assert!(!dir.exists(), "workspace must be gone even when a stage fails");
    }

    // ---- single attempt ----

    #[tokio::test]
    async fn each_stage_is_called_exactly_once_on_success() {
        let (p, normalizer, recognizer, translator, synthesizer) = pipeline(
            MockNormalizer::ok(speech_waveform()),
            MockRecognizer::ok("hello"),
            MockTranslator::new().map("hello", "auto", "es", "hola"),
            MockSynthesizer::ok(b"AUDIO".to_vec()),
        );

        p.run(upload(), "auto", "es").await.expect("success");

        assert_eq!(normalizer.calls(), 1);
        assert_eq!(recognizer.calls(), 1);
        assert_eq!(translator.calls(), 1);
        assert_eq!(synthesizer.calls(), 1);
    }

    #[tokio::test]
    async fn failed_stage_is_not_retried() {
        let (p, normalizer, _, _, _) = pipeline(
            MockNormalizer::err(NormalizeError::Conversion("boom".into())),
            MockRecognizer::ok("hello"),
            MockTranslator::new(),
            MockSynthesizer::ok(vec![]),
        );

        let _ = p.run(upload(), "auto", "es").await;
        assert_eq!(normalizer.calls(), 1);
    }
}
