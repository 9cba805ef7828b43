//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//!
//! Every section carries `#[serde(default)]` so a partial `settings.toml`
//! (for example one that only overrides the translator URL) still loads.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// RecognizerConfig
// ---------------------------------------------------------------------------

/// Settings for the speech-recognition service.
///
/// The adapter speaks the OpenAI-compatible `/v1/audio/transcriptions` wire
/// format, so any provider exposing that shape works here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    /// Base URL of the recognition endpoint.
    pub base_url: String,
    /// API key — `None` for local providers that require no authentication.
    pub api_key: Option<String>,
    /// Model identifier sent with the request (e.g. `"whisper-1"`).
    pub model: String,
    /// Maximum seconds to wait for a recognition response.
    pub timeout_secs: u64,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".into(),
            api_key: None,
            model: "whisper-1".into(),
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// TranslatorConfig
// ---------------------------------------------------------------------------

/// Settings for the text-translation service (LibreTranslate wire format).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Base URL of the translation endpoint.
    pub base_url: String,
    /// API key — `None` for self-hosted instances without one.
    pub api_key: Option<String>,
    /// Maximum seconds to wait for a translation response.
    pub timeout_secs: u64,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".into(),
            api_key: None,
            timeout_secs: 15,
        }
    }
}

// ---------------------------------------------------------------------------
// SynthesizerConfig
// ---------------------------------------------------------------------------

/// Settings for the speech-synthesis service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesizerConfig {
    /// Base URL of the synthesis endpoint.
    pub base_url: String,
    /// API key — `None` for local providers.
    pub api_key: Option<String>,
    /// Container/codec requested from the service (e.g. `"mp3"`).
    pub audio_format: String,
    /// Maximum seconds to wait for a synthesis response.
    pub timeout_secs: u64,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8002".into(),
            api_key: None,
            audio_format: "mp3".into(),
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// LimitsConfig
// ---------------------------------------------------------------------------

/// Request limits and language defaults applied by the calling layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: u64,
    /// Source language applied when the request does not name one.
    /// `"auto"` delegates detection to the recognition service.
    pub default_source_lang: String,
    /// Target language applied when the request does not name one.
    pub default_target_lang: String,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: 16 * 1024 * 1024,
            default_source_lang: "auto".into(),
            default_target_lang: "en".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// ToolchainSettings
// ---------------------------------------------------------------------------

/// Optional explicit paths to the audio-conversion binaries.
///
/// When `None`, `ToolchainConfig::detect` searches `PATH` at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// Explicit path to the `ffmpeg` binary.
    pub ffmpeg: Option<PathBuf>,
    /// Explicit path to the `ffprobe` binary.
    pub ffprobe: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// AppConfig
// ---------------------------------------------------------------------------

/// Top-level application configuration.
///
/// Persisted as `settings.toml` under the platform config directory (see
/// [`AppPaths`]).
///
/// ```rust,no_run
/// use voice_translate::config::AppConfig;
///
/// let config = AppConfig::load_or_init().unwrap_or_default();
/// println!("translator at {}", config.translator.base_url);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Speech-recognition service settings.
    pub recognizer: RecognizerConfig,
    /// Translation service settings.
    pub translator: TranslatorConfig,
    /// Speech-synthesis service settings.
    pub synthesizer: SynthesizerConfig,
    /// Request limits and language defaults.
    pub limits: LimitsConfig,
    /// Conversion-toolchain path overrides.
    pub toolchain: ToolchainSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            recognizer: RecognizerConfig::default(),
            translator: TranslatorConfig::default(),
            synthesizer: SynthesizerConfig::default(),
            limits: LimitsConfig::default(),
            toolchain: ToolchainSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`,
    /// writing the default file on first run so users have one to edit.
    ///
    /// A missing file never errors: the defaults are returned (and
    /// persisted) instead, so callers need no first-run special case.
    pub fn load_or_init() -> Result<Self> {
        Self::load_or_init_at(&AppPaths::new().settings_file)
    }

    /// Like [`load_or_init`](Self::load_or_init), at an explicit path
    /// (useful for tests).
    pub fn load_or_init_at(path: &std::path::Path) -> Result<Self> {
        let config = Self::load_from(path)?;
        if !path.exists() {
            config.save_to(path)?;
            log::info!("config: wrote default settings to {}", path.display());
        }
        Ok(config)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Verify that a default `AppConfig` can be serialised to TOML and
    /// deserialised back without any data loss.
    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(original.recognizer.base_url, loaded.recognizer.base_url);
        assert_eq!(original.recognizer.model, loaded.recognizer.model);
        assert_eq!(original.translator.base_url, loaded.translator.base_url);
        assert_eq!(original.synthesizer.base_url, loaded.synthesizer.base_url);
        assert_eq!(
            original.synthesizer.audio_format,
            loaded.synthesizer.audio_format
        );
        assert_eq!(original.limits.max_upload_bytes, loaded.limits.max_upload_bytes);
        assert_eq!(
            original.limits.default_source_lang,
            loaded.limits.default_source_lang
        );
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        let default = AppConfig::default();

        assert_eq!(config.recognizer.model, default.recognizer.model);
        assert_eq!(config.limits.default_target_lang, "en");
    }

    /// First run writes the default file; later runs load it back.
    #[test]
    fn load_or_init_persists_defaults_on_first_run() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let first = AppConfig::load_or_init_at(&path).expect("first run");
        assert!(path.exists(), "first run must write the defaults to disk");
        assert_eq!(first.limits.default_target_lang, "en");

        // A user edit survives the next startup untouched.
        let mut edited = first.clone();
        edited.translator.base_url = "https://translate.example.com".into();
        edited.save_to(&path).expect("save edit");

        let second = AppConfig::load_or_init_at(&path).expect("second run");
        assert_eq!(second.translator.base_url, "https://translate.example.com");
    }

    /// A partial TOML file (one section, one key) fills the rest from
    /// defaults.
    #[test]
    fn partial_toml_fills_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("partial.toml");
        std::fs::write(
            &path,
            "[translator]\nbase_url = \"https://translate.example.com\"\n",
        )
        .expect("write");

        let config = AppConfig::load_from(&path).expect("load");

        assert_eq!(config.translator.base_url, "https://translate.example.com");
        assert_eq!(config.translator.timeout_secs, 15);
        assert_eq!(config.recognizer.model, "whisper-1");
    }

    /// Defaults mirror the original request contract: source `auto`, target
    /// `en`, 16 MiB upload cap.
    #[test]
    fn default_limits() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.limits.default_source_lang, "auto");
        assert_eq!(cfg.limits.default_target_lang, "en");
        assert_eq!(cfg.limits.max_upload_bytes, 16 * 1024 * 1024);
        assert!(cfg.toolchain.ffmpeg.is_none());
        assert!(cfg.toolchain.ffprobe.is_none());
    }

    /// Modified non-default values survive a round trip.
    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.recognizer.base_url = "https://api.openai.com".into();
        cfg.recognizer.api_key = Some("sk-test".into());
        cfg.recognizer.timeout_secs = 60;
        cfg.translator.api_key = Some("lt-key".into());
        cfg.synthesizer.audio_format = "ogg".into();
        cfg.limits.default_target_lang = "es".into();
        cfg.toolchain.ffmpeg = Some(PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.recognizer.base_url, "https://api.openai.com");
        assert_eq!(loaded.recognizer.api_key, Some("sk-test".into()));
        assert_eq!(loaded.recognizer.timeout_secs, 60);
        assert_eq!(loaded.translator.api_key, Some("lt-key".into()));
        assert_eq!(loaded.synthesizer.audio_format, "ogg");
        assert_eq!(loaded.limits.default_target_lang, "es");
        assert_eq!(
            loaded.toolchain.ffmpeg,
            Some(PathBuf::from("/opt/ffmpeg/bin/ffmpeg"))
        );
    }
}
