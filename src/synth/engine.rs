//! Core `SpeechSynthesizer` trait and HTTP implementation.
//!
//! [`HttpSynthesizer`] posts `{input, language, format}` JSON to
//! `{base_url}/v1/audio/speech` and returns the raw response body as the
//! synthesis artifact.  All connection details come from
//! [`SynthesizerConfig`].

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use thiserror::Error;

use crate::config::SynthesizerConfig;
use crate::lang::LanguageCode;

// ---------------------------------------------------------------------------
// SynthError
// ---------------------------------------------------------------------------

/// Errors that can occur during speech synthesis.
#[derive(Debug, Clone, Error)]
pub enum SynthError {
    /// HTTP transport failure or a non-success status from the service.
    #[error("speech synthesis request failed: {0}")]
    Service(String),

    /// The request did not complete within the configured timeout.
    #[error("speech synthesis request timed out")]
    Timeout,
}

impl From<reqwest::Error> for SynthError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SynthError::Timeout
        } else {
            SynthError::Service(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// SynthesisArtifact
// ---------------------------------------------------------------------------

/// Encoded spoken audio for one piece of text.
///
/// Transient: returned to the caller and never retained server-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisArtifact {
    bytes: Vec<u8>,
}

impl SynthesisArtifact {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// The "nothing to synthesize" artifact produced for empty text.
    pub fn empty() -> Self {
        Self { bytes: Vec::new() }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Standard base64 of the audio bytes, for transport inside JSON.
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }
}

// ---------------------------------------------------------------------------
// SpeechSynthesizer trait
// ---------------------------------------------------------------------------

/// Async, thread-safe interface for text-to-speech capabilities.
///
/// # Contract
///
/// - `language` is a pre-normalized [`LanguageCode`] (never `"auto"`).
/// - The artifact is produced entirely in memory.
/// - **Empty-text policy**: empty or whitespace-only `text` yields
///   [`SynthesisArtifact::empty`] without contacting the service — the
///   pipeline still completes, with an empty `audio_base64`.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(
        &self,
        text: &str,
        language: &LanguageCode,
    ) -> Result<SynthesisArtifact, SynthError>;
}

// ---------------------------------------------------------------------------
// HttpSynthesizer
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible `/v1/audio/speech` endpoint.
pub struct HttpSynthesizer {
    client: reqwest::Client,
    config: SynthesizerConfig,
}

impl HttpSynthesizer {
    /// Build an `HttpSynthesizer` from application config, with the
    /// per-request timeout from `config.timeout_secs`.
    pub fn from_config(config: &SynthesizerConfig) -> Self {
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
impl SpeechSynthesizer for HttpSynthesizer {
    async fn synthesize(
        &self,
        text: &str,
        language: &LanguageCode,
    ) -> Result<SynthesisArtifact, SynthError> {
        if text.trim().is_empty() {
            log::debug!("synthesize: empty text, returning empty artifact");
            return Ok(SynthesisArtifact::empty());
        }

        let url = format!("{}/v1/audio/speech", self.config.base_url);

        let body = serde_json::json!({
            "input":    text,
            "language": language.as_str(),
            "format":   self.config.audio_format,
        });

        let mut req = self.client.post(&url).json(&body);

        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(SynthError::Service(format!(
                "service returned {status}: {}",
                detail.trim()
            )));
        }

        let bytes = response.bytes().await?;
        Ok(SynthesisArtifact::new(bytes.to_vec()))
    }
}

// ---------------------------------------------------------------------------
// MockSynthesizer  (test-only)
// ---------------------------------------------------------------------------

/// Test double returning fixed bytes; counts calls and honours the
/// empty-text policy so pipeline tests exercise the real contract.
#[cfg(test)]
pub struct MockSynthesizer {
    response: Result<Vec<u8>, SynthError>,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockSynthesizer {
    /// Mock returning `bytes` for any non-empty text.
    pub fn ok(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            response: Ok(bytes.into()),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Mock that always fails with `error`.
    pub fn err(error: SynthError) -> Self {
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
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(
        &self,
        text: &str,
        _language: &LanguageCode,
    ) -> Result<SynthesisArtifact, SynthError> {
        self.calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        if text.trim().is_empty() {
            return Ok(SynthesisArtifact::empty());
        }
        self.response.clone().map(SynthesisArtifact::new)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
