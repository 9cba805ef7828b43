//! Conversion-toolchain detection.
//!
//! [`ToolchainConfig`] holds the resolved paths of the `ffmpeg` and
//! `ffprobe` binaries.  It is constructed **once at startup** — the process
//! fails fast when the toolchain is absent — and then injected into
//! [`FfmpegNormalizer`](crate::audio::FfmpegNormalizer) as an immutable
//! value.  Concurrent pipeline runs may read it freely.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::ToolchainSettings;

/// Errors raised while locating the conversion toolchain.
#[derive(Debug, Clone, Error)]
pub enum ToolchainError {
    /// A required binary was not found on `PATH` or at its configured path.
    #[error("conversion toolchain binary not found: {0}")]
    NotFound(String),
}

// ---------------------------------------------------------------------------
// ToolchainConfig
// ---------------------------------------------------------------------------

/// Resolved, immutable paths to the audio-conversion binaries.
///
/// # Example
///
/// ```rust,no_run
/// use voice_translate::audio::ToolchainConfig;
///
/// let toolchain = ToolchainConfig::detect().expect("install ffmpeg first");
/// println!("using ffmpeg at {}", toolchain.ffmpeg().display());
/// ```
#[derive(Debug, Clone)]
pub struct ToolchainConfig {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl ToolchainConfig {
    /// Search `PATH` for `ffmpeg` and `ffprobe`.
    ///
    /// # Errors
    ///
    /// [`ToolchainError::NotFound`] when either binary is missing.
    pub fn detect() -> Result<Self, ToolchainError> {
        Self::detect_with(&ToolchainSettings::default())
    }

    /// Like [`detect`](Self::detect), but explicit paths from
    /// `settings.toml` take precedence over the `PATH` search.
    pub fn detect_with(settings: &ToolchainSettings) -> Result<Self, ToolchainError> {
        let ffmpeg = Self::resolve_binary("ffmpeg", settings.ffmpeg.as_deref())?;
        let ffprobe = Self::resolve_binary("ffprobe", settings.ffprobe.as_deref())?;

        log::info!(
            "toolchain: ffmpeg={} ffprobe={}",
            ffmpeg.display(),
            ffprobe.display()
        );

        Ok(Self { ffmpeg, ffprobe })
    }

    /// Build from already-known paths (useful for tests).
    ///
    /// # Errors
    ///
    /// [`ToolchainError::NotFound`] when either path does not exist.
    pub fn from_paths(
        ffmpeg: impl Into<PathBuf>,
        ffprobe: impl Into<PathBuf>,
    ) -> Result<Self, ToolchainError> {
        let ffmpeg = ffmpeg.into();
        let ffprobe = ffprobe.into();

        for path in [&ffmpeg, &ffprobe] {
            if !path.exists() {
                return Err(ToolchainError::NotFound(path.display().to_string()));
            }
        }

        Ok(Self { ffmpeg, ffprobe })
    }

    pub fn ffmpeg(&self) -> &Path {
        &self.ffmpeg
    }

    pub fn ffprobe(&self) -> &Path {
        &self.ffprobe
    }

    fn resolve_binary(name: &str, override_path: Option<&Path>) -> Result<PathBuf, ToolchainError> {
        if let Some(path) = override_path {
            if path.exists() {
                return Ok(path.to_path_buf());
            }
            return Err(ToolchainError::NotFound(path.display().to_string()));
        }

        find_in_path(name).ok_or_else(|| ToolchainError::NotFound(name.to_string()))
    }
}

/// Search every `PATH` entry for an executable called `name`.
fn find_in_path(name: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;

    for dir in std::env::split_paths(&path_var) {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
        // Windows installs carry an .exe suffix.
        let candidate_exe = dir.join(format!("{name}.exe"));
        if candidate_exe.is_file() {
            return Some(candidate_exe);
        }
    }

    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
