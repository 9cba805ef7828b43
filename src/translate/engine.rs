//! Core `Translator` trait and HTTP implementation.
//!
//! [`HttpTranslator`] posts `{q, source, target, format}` JSON to
//! `{base_url}/translate` and reads `{translatedText}` — the LibreTranslate
//! wire shape.  All connection details come from [`TranslatorConfig`].

use async_trait::async_trait;
use thiserror::Error;

use crate::config::TranslatorConfig;
use crate::lang::LanguageCode;

// ---------------------------------------------------------------------------
// TranslateError
// ---------------------------------------------------------------------------

/// Errors that can occur during translation.
#[derive(Debug, Clone, Error)]
pub enum TranslateError {
    /// HTTP transport failure or a non-success status from the service.
    #[error("translation request failed: {0}")]
    Service(String),

    /// The request did not complete within the configured timeout.
    #[error("translation request timed out")]
    Timeout,

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse translation response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for TranslateError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TranslateError::Timeout
        } else {
            TranslateError::Service(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// TranslationResult
// ---------------------------------------------------------------------------

/// Translated text for one (text, source, target) triple.
///
/// Deterministic for identical inputs to the extent the backing service is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResult {
    /// The translated text.
    pub text: String,
}

// ---------------------------------------------------------------------------
// Translator trait
// ---------------------------------------------------------------------------

/// Async, thread-safe interface for text translation capabilities.
///
/// # Contract
///
/// - `text` is opaque; implementations forward it untouched.
/// - `source` and `target` are pre-normalized [`LanguageCode`]s and are
///   forwarded verbatim — `"auto"` as the source passes straight through.
/// - No local caching; idempotence is delegated to the service.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        source: &LanguageCode,
        target: &LanguageCode,
    ) -> Result<TranslationResult, TranslateError>;
}

// ---------------------------------------------------------------------------
// HttpTranslator
// ---------------------------------------------------------------------------

/// Calls a LibreTranslate-compatible `/translate` endpoint.
pub struct HttpTranslator {
    client: reqwest::Client,
    config: TranslatorConfig,
}

impl HttpTranslator {
    /// Build an `HttpTranslator` from application config, with the
    /// per-request timeout from `config.timeout_secs`.
    pub fn from_config(config: &TranslatorConfig) -> Self {
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
impl Translator for HttpTranslator {
    async fn translate(
        &self,
        text: &str,
        source: &LanguageCode,
        target: &LanguageCode,
    ) -> Result<TranslationResult, TranslateError> {
        let url = format!("{}/translate", self.config.base_url);

        let mut body = serde_json::json!({
            "q":      text,
            "source": source.as_str(),
            "target": target.as_str(),
            "format": "text",
        });

        // LibreTranslate carries the key in the body, not a header.
        if let Some(key) = self.config.api_key.as_deref().filter(|k| !k.is_empty()) {
            body["api_key"] = serde_json::Value::String(key.to_string());
        }

        let response = self.client.post(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(TranslateError::Service(format!(
                "service returned {status}: {}",
                detail.trim()
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TranslateError::Parse(e.to_string()))?;

        let translated = json["translatedText"]
            .as_str()
            .ok_or_else(|| TranslateError::Parse("response has no `translatedText` field".into()))?
            .to_string();

        Ok(TranslationResult { text: translated })
    }
}

// ---------------------------------------------------------------------------
// MockTranslator  (test-only)
// ---------------------------------------------------------------------------

/// Test double with a fixed (text, source, target) → text mapping and a call
/// counter.  Unmapped input falls back to echoing the text, so idempotence
/// tests do not need exhaustive tables.
#[cfg(test)]
pub struct MockTranslator {
    mappings: Vec<((String, String, String), String)>,
    error: Option<TranslateError>,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockTranslator {
    pub fn new() -> Self {
        Self {
            mappings: Vec::new(),
            error: None,
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Add a deterministic mapping.
    pub fn map(
        mut self,
        text: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        translated: impl Into<String>,
    ) -> Self {
        self.mappings.push((
            (text.into(), source.into(), target.into()),
            translated.into(),
        ));
        self
    }

    /// Mock that always fails with `error`.
    pub fn err(error: TranslateError) -> Self {
        Self {
            mappings: Vec::new(),
            error: Some(error),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl Translator for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        source: &LanguageCode,
        target: &LanguageCode,
    ) -> Result<TranslationResult, TranslateError> {
        self.calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        if let Some(error) = &self.error {
            return Err(error.clone());
        }

        let key = (
            text.to_string(),
            source.as_str().to_string(),
            target.as_str().to_string(),
        );
        let translated = self
            .mappings
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| text.to_string());

        Ok(TranslationResult { text: translated })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str, api_key: Option<&str>) -> TranslatorConfig {
        TranslatorConfig {
            base_url: base_url.into(),
            api_key: api_key.map(str::to_string),
            timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn translates_via_libretranslate_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/translate"))
            .and(body_partial_json(serde_json::json!({
                "q": "hello",
                "source": "auto",
                "target": "es",
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"translatedText": "hola"})),
            )
            .mount(&server)
            .await;

        let translator = HttpTranslator::from_config(&config(&server.uri(), None));
        let result = translator
            .translate(
                "hello",
                &LanguageCode::auto(),
                &LanguageCode::resolve("es"),
            )
            .await
            .expect("translation");

        assert_eq!(result.text, "hola");
    }

    #[tokio::test]
    async fn api_key_travels_in_the_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/translate"))
            .and(body_partial_json(serde_json::json!({"api_key": "lt-key"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"translatedText": "ok"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let translator = HttpTranslator::from_config(&config(&server.uri(), Some("lt-key")));
        let result = translator
            .translate("x", &LanguageCode::resolve("en"), &LanguageCode::resolve("fr"))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn error_status_is_service_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/translate"))
            .respond_with(ResponseTemplate::new(500).set_body_string("engine crashed"))
            .mount(&server)
            .await;

        let translator = HttpTranslator::from_config(&config(&server.uri(), None));
        let err = translator
            .translate("x", &LanguageCode::resolve("en"), &LanguageCode::resolve("fr"))
            .await
            .unwrap_err();

        assert!(matches!(err, TranslateError::Service(_)));
    }

    #[tokio::test]
    async fn missing_field_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/translate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": 1})))
            .mount(&server)
            .await;

        let translator = HttpTranslator::from_config(&config(&server.uri(), None));
        let err = translator
            .translate("x", &LanguageCode::resolve("en"), &LanguageCode::resolve("fr"))
            .await
            .unwrap_err();

        assert!(matches!(err, TranslateError::Parse(_)));
    }

    // ---- mock double ----

    #[tokio::test]
    async fn mock_mapping_and_fallthrough() {
        let mock = MockTranslator::new().map("hello", "auto", "es", "hola");

        let hit = mock
            .translate("hello", &LanguageCode::auto(), &LanguageCode::resolve("es"))
            .await
            .unwrap();
        assert_eq!(hit.text, "hola");

        let miss = mock
            .translate("other", &LanguageCode::auto(), &LanguageCode::resolve("es"))
            .await
            .unwrap();
        assert_eq!(miss.text, "other");

        assert_eq!(mock.calls(), 2);
    }

    #[test]
    fn translator_is_object_safe() {
        let mock: Box<dyn Translator> = Box::new(MockTranslator::new());
        drop(mock);
    }
}
