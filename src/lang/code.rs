//! `LanguageCode` — normalized language identifiers with infallible
//! resolution.
//!
//! Resolution order:
//!
//! 1. `"auto"` (source side only) passes through untouched.
//! 2. An ISO-639 code, optionally with a region subtag (`en-US`, `pt_BR`),
//!    is reduced to its primary subtag.
//! 3. A known language name (English or native spelling) is looked up in a
//!    static table.
//! 4. Anything else falls back to [`DEFAULT_CODE`] with a debug log — the
//!    request is never failed over a language string.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fallback code used when resolution fails.
pub const DEFAULT_CODE: &str = "en";

/// Sentinel understood by the recognition service: detect the language
/// from the audio itself.
pub const AUTO: &str = "auto";

/// Language name → ISO-639-1 code table.
///
/// Covers the languages the original service was observed handling plus
/// their common native spellings.  Lookup keys are lowercase.
const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("english", "en"),
    ("spanish", "es"),
    ("español", "es"),
    ("espanol", "es"),
    ("french", "fr"),
    ("français", "fr"),
    ("francais", "fr"),
    ("german", "de"),
    ("deutsch", "de"),
    ("italian", "it"),
    ("italiano", "it"),
    ("portuguese", "pt"),
    ("português", "pt"),
    ("portugues", "pt"),
    ("russian", "ru"),
    ("japanese", "ja"),
    ("korean", "ko"),
    ("chinese", "zh"),
    ("mandarin", "zh"),
    ("arabic", "ar"),
    ("hindi", "hi"),
    ("thai", "th"),
    ("vietnamese", "vi"),
    ("dutch", "nl"),
    ("polish", "pl"),
    ("turkish", "tr"),
    ("swedish", "sv"),
    ("greek", "el"),
    ("hebrew", "he"),
    ("indonesian", "id"),
    ("ukrainian", "uk"),
];

// ---------------------------------------------------------------------------
// LanguageCode
// ---------------------------------------------------------------------------

/// A normalized language identifier — an ISO-639 primary subtag, or the
/// special value `"auto"`.
///
/// Invariant: the wrapped string is always a value the translation and
/// synthesis services accept; construction via [`LanguageCode::resolve`]
/// cannot produce anything else.
///
/// # Example
///
/// ```rust
/// use voice_translate::lang::LanguageCode;
///
/// assert_eq!(LanguageCode::resolve("Spanish").as_str(), "es");
/// assert_eq!(LanguageCode::resolve("en-US").as_str(), "en");
/// assert_eq!(LanguageCode::resolve("klingon").as_str(), "en"); // fallback
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LanguageCode(String);

impl LanguageCode {
    /// The auto-detect sentinel, valid only as a source language.
    pub fn auto() -> Self {
        Self(AUTO.to_string())
    }

    /// Returns `true` when this is the auto-detect sentinel.
    pub fn is_auto(&self) -> bool {
        self.0 == AUTO
    }

    /// The code as a `&str` for wire formats.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve a free-form language string to a normalized code.
    ///
    /// Never fails; unrecognized input falls back to [`DEFAULT_CODE`].
    pub fn resolve(raw: &str) -> Self {
        let trimmed = raw.trim().to_lowercase();

        if trimmed.is_empty() {
            return Self(DEFAULT_CODE.to_string());
        }

        if trimmed == AUTO {
            return Self::auto();
        }

        // `en-US` / `pt_BR` → primary subtag.
        let primary = trimmed
            .split(['-', '_'])
            .next()
            .unwrap_or(trimmed.as_str());
        if (2..=3).contains(&primary.len()) && primary.chars().all(|c| c.is_ascii_lowercase()) {
            return Self(primary.to_string());
        }

        if let Some((_, code)) = LANGUAGE_NAMES.iter().find(|(name, _)| *name == trimmed) {
            return Self((*code).to_string());
        }

        log::debug!("lang: could not resolve {raw:?}, falling back to {DEFAULT_CODE:?}");
        Self(DEFAULT_CODE.to_string())
    }

    /// Resolve a source-language string, where an absent value means
    /// auto-detect rather than the default target code.
    pub fn resolve_source(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::auto();
        }
        Self::resolve(raw)
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
