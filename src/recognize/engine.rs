//! Core `SpeechRecognizer` trait and HTTP implementation.
//!
//! [`HttpRecognizer`] posts the normalized waveform (re-encoded as a 16-bit
//! PCM WAV) to any endpoint speaking the OpenAI-compatible
//! `/v1/audio/transcriptions` multipart format.  All connection details come
//! from [`RecognizerConfig`]; nothing is hardcoded.
//!
//! Single attempt per request — recognition failures are never retried.

use async_trait::async_trait;
use thiserror::Error;

use crate::audio::NormalizedWaveform;
use crate::config::RecognizerConfig;
use crate::lang::AUTO;
use crate::recognize::calibrate::NoiseProfile;

// ---------------------------------------------------------------------------
// RecognizeError
// ---------------------------------------------------------------------------

/// Errors that can occur during speech recognition.
#[derive(Debug, Clone, Error)]
pub enum RecognizeError {
    /// Audio is present but contains no intelligible speech.  This is a
    /// client-class outcome, distinct from every service failure below.
    #[error("no intelligible speech detected in the audio")]
    NoSpeech,

    /// HTTP transport failure or a non-success status from the service.
    #[error("speech recognition request failed: {0}")]
    Service(String),

    /// The request did not complete within the configured timeout.
    #[error("speech recognition request timed out")]
    Timeout,

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse recognition response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for RecognizeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RecognizeError::Timeout
        } else {
            RecognizeError::Service(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// RecognitionResult
// ---------------------------------------------------------------------------

/// Text recognized from one waveform.  Read-only once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionResult {
    /// Recognized text; may legitimately be empty.
    pub text: String,
}

// ---------------------------------------------------------------------------
// SpeechRecognizer trait
// ---------------------------------------------------------------------------

/// Async, thread-safe interface for speech-to-text capabilities.
///
/// # Contract
///
/// - `waveform` is 16 kHz mono f32 from the normalizer.
/// - `language_hint` is a resolved code or the literal `"auto"`, which the
///   capability interprets itself (no prior detection stage exists).
/// - Implementations calibrate for ambient noise before transcribing and
///   return [`RecognizeError::NoSpeech`] for unintelligible audio.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    async fn recognize(
        &self,
        waveform: &NormalizedWaveform,
        language_hint: &str,
    ) -> Result<RecognitionResult, RecognizeError>;
}

// ---------------------------------------------------------------------------
// HttpRecognizer
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible `/v1/audio/transcriptions` endpoint.
///
/// # No hardcoded URLs
/// All connection details (`base_url`, `api_key`, `model`) come exclusively
/// from the [`RecognizerConfig`] passed to [`HttpRecognizer::from_config`].
pub struct HttpRecognizer {
    client: reqwest::Client,
    config: RecognizerConfig,
}

impl HttpRecognizer {
    /// Build an `HttpRecognizer` from application config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`.  A default (no-timeout) client is used as a
    /// last-resort fallback if the builder fails (should never happen in
    /// practice).
    pub fn from_config(config: &RecognizerConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }
}

#[async_trait]
impl SpeechRecognizer for HttpRecognizer {
    /// Calibrate, then send the waveform for transcription.
    ///
    /// The `Authorization: Bearer …` header is attached **only** when
    /// `config.api_key` is `Some(key)` and `key` is non-empty.  When
    /// `language_hint` is `"auto"` the language field is omitted entirely
    /// and the service performs its own detection.
    async fn recognize(
        &self,
        waveform: &NormalizedWaveform,
        language_hint: &str,
    ) -> Result<RecognitionResult, RecognizeError> {
        // ── Ambient calibration — before any network traffic ─────────────
        let profile = NoiseProfile::measure(waveform);
        if !profile.contains_speech(waveform) {
            log::debug!(
                "recognize: no frame above RMS {:.4}, skipping service call",
                profile.speech_threshold()
            );
            return Err(RecognizeError::NoSpeech);
        }

        // ── Build the multipart request ──────────────────────────────────
        let wav = waveform
            .wav_bytes()
            .map_err(|e| RecognizeError::Service(format!("WAV encoding failed: {e}")))?;

        let part = reqwest::multipart::Part::bytes(wav)
            .file_name("audio.wav")
            .mime_str("audio/wav")?;

        let mut form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.config.model.clone());

        if language_hint != AUTO {
            form = form.text("language", language_hint.to_string());
        }

        let url = format!("{}/v1/audio/transcriptions", self.config.base_url);
        let mut req = self.client.post(&url).multipart(form);

        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        // ── Single attempt, no retry ─────────────────────────────────────
        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RecognizeError::Service(format!(
                "service returned {status}: {}",
                body.trim()
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| RecognizeError::Parse(e.to_string()))?;

        let text = json["text"]
            .as_str()
            .ok_or_else(|| RecognizeError::Parse("response has no `text` field".into()))?
            .trim()
            .to_string();

        Ok(RecognitionResult { text })
    }
}

// ---------------------------------------------------------------------------
// MockRecognizer  (test-only)
// ---------------------------------------------------------------------------

/// Test double returning a pre-configured response; counts calls so pipeline
/// tests can verify that failed stages stop the run.
#[cfg(test)]
pub struct MockRecognizer {
    response: Result<RecognitionResult, RecognizeError>,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockRecognizer {
    /// Mock that always recognizes `text`.
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            response: Ok(RecognitionResult { text: text.into() }),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Mock that always fails with `error`.
    pub fn err(error: RecognizeError) -> Self {
        Self {
            response: Err(error),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl SpeechRecognizer for MockRecognizer {
    async fn recognize(
        &self,
        _waveform: &NormalizedWaveform,
        _language_hint: &str,
    ) -> Result<RecognitionResult, RecognizeError> {
        self.calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
