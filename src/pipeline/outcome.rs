//! Structured pipeline results.
//!
//! [`PipelineSuccess`] and [`PipelineFailure`] are the only two ways a run
//! ends.  Both are `Serialize` so the serving layer can emit them as JSON
//! bodies directly; [`FailureKind::http_status`] gives that layer the
//! client/server classification without it having to know the taxonomy.

use serde::Serialize;

use crate::audio::NormalizeError;
use crate::recognize::RecognizeError;
use crate::synth::SynthError;
use crate::translate::TranslateError;

// ---------------------------------------------------------------------------
// PipelineSuccess
// ---------------------------------------------------------------------------

/// Result of a completed run: both text artifacts plus the synthesized audio
/// in transport-safe base64.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineSuccess {
    /// Source-language text recognized from the upload.
    pub recognized_text: String,
    /// Target-language translation of the recognized text.
    pub translated_text: String,
    /// Base64 of the synthesized audio bytes; empty when there was nothing
    /// to synthesize.
    pub audio_base64: String,
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// The stage in which a failure originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Workspace,
    Normalize,
    Recognize,
    Translate,
    Synthesize,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Workspace => "workspace",
            Stage::Normalize => "normalize",
            Stage::Recognize => "recognize",
            Stage::Translate => "translate",
            Stage::Synthesize => "synthesize",
        }
    }
}

// ---------------------------------------------------------------------------
// FailureKind
// ---------------------------------------------------------------------------

/// User-visible classification of a failure: does the client fix their
/// request, or did something on our side break?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The request itself is at fault (4xx).
    Client,
    /// A backing service or the local toolchain is at fault (5xx).
    Server,
}

/// Complete failure taxonomy across all stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    UnsupportedFormat,
    ConversionError,
    NoSpeechDetected,
    RecognitionServiceError,
    TranslationServiceError,
    SynthesisServiceError,
    WorkspaceError,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::UnsupportedFormat => "UnsupportedFormat",
            FailureKind::ConversionError => "ConversionError",
            FailureKind::NoSpeechDetected => "NoSpeechDetected",
            FailureKind::RecognitionServiceError => "RecognitionServiceError",
            FailureKind::TranslationServiceError => "TranslationServiceError",
            FailureKind::SynthesisServiceError => "SynthesisServiceError",
            FailureKind::WorkspaceError => "WorkspaceError",
        }
    }

    /// Input-shape and intelligibility problems are the client's to fix;
    /// toolchain and service unavailability are ours.
    pub fn class(&self) -> ErrorClass {
        match self {
            FailureKind::UnsupportedFormat | FailureKind::NoSpeechDetected => ErrorClass::Client,
            FailureKind::ConversionError
            | FailureKind::RecognitionServiceError
            | FailureKind::TranslationServiceError
            | FailureKind::SynthesisServiceError
            | FailureKind::WorkspaceError => ErrorClass::Server,
        }
    }

    /// HTTP status the serving layer should respond with.
    pub fn http_status(&self) -> u16 {
        match self.class() {
            ErrorClass::Client => 400,
            ErrorClass::Server => 500,
        }
    }
}

// ---------------------------------------------------------------------------
// PipelineFailure
// ---------------------------------------------------------------------------

/// Structured failure: originating stage, failure kind, and a human-readable
/// message.  No stage failure is ever swallowed or retried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineFailure {
    pub stage: Stage,
    pub kind: FailureKind,
    pub message: String,
}

impl std::fmt::Display for PipelineFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "pipeline failed at stage `{}` ({}): {}",
            self.stage.as_str(),
            self.kind.as_str(),
            self.message
        )
    }
}

impl std::error::Error for PipelineFailure {}

impl PipelineFailure {
    pub fn new(stage: Stage, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            stage,
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn from_normalize(e: NormalizeError) -> Self {
        let kind = match &e {
            NormalizeError::UnsupportedFormat(_) => FailureKind::UnsupportedFormat,
            NormalizeError::Conversion(_) => FailureKind::ConversionError,
        };
        Self::new(Stage::Normalize, kind, e.to_string())
    }

    pub(crate) fn from_recognize(e: RecognizeError) -> Self {
        let kind = match &e {
            RecognizeError::NoSpeech => FailureKind::NoSpeechDetected,
            RecognizeError::Service(_) | RecognizeError::Timeout | RecognizeError::Parse(_) => {
                FailureKind::RecognitionServiceError
            }
        };
        Self::new(Stage::Recognize, kind, e.to_string())
    }

    pub(crate) fn from_translate(e: TranslateError) -> Self {
        Self::new(
            Stage::Translate,
            FailureKind::TranslationServiceError,
            e.to_string(),
        )
    }

    pub(crate) fn from_synthesize(e: SynthError) -> Self {
        Self::new(
            Stage::Synthesize,
            FailureKind::SynthesisServiceError,
            e.to_string(),
        )
    }

    pub(crate) fn from_workspace(e: crate::pipeline::WorkspaceError) -> Self {
        Self::new(Stage::Workspace, FailureKind::WorkspaceError, e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
