//! Audio normalization — arbitrary upload container → canonical PCM.
//!
//! [`AudioNormalizer`] is the seam the pipeline depends on; the production
//! implementation is [`FfmpegNormalizer`], which stages the upload in the
//! request workspace, shells out to ffmpeg for the transcode
//! (`-ac 1 -ar 16000 -acodec pcm_s16le`), and decodes the resulting WAV with
//! `hound`.  When the transcode fails, ffprobe classifies the input: an
//! identifiable container means a toolchain fault, anything else means the
//! upload itself is unsupported.
//!
//! All intermediate files live inside the [`Workspace`], so releasing the
//! workspace removes every trace of the request on success and failure
//! alike.  No file handle survives past `normalize`.

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

use crate::audio::blob::AudioBlob;
use crate::audio::toolchain::ToolchainConfig;
use crate::audio::waveform::{NormalizedWaveform, SAMPLE_RATE};
use crate::pipeline::Workspace;

// ---------------------------------------------------------------------------
// NormalizeError
// ---------------------------------------------------------------------------

/// Errors that can arise while normalizing an upload.
#[derive(Debug, Clone, Error)]
pub enum NormalizeError {
    /// The byte stream is empty or in a container the toolchain could not
    /// decode.  Client-class: the upload itself is at fault.
    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),

    /// The conversion toolchain is unavailable or failed on a recognized
    /// container.  Server-class, never retried.
    #[error("audio conversion failed: {0}")]
    Conversion(String),
}

// ---------------------------------------------------------------------------
// AudioNormalizer trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for audio normalization.
///
/// # Contract
///
/// - Output is always 16 kHz mono f32 decoded from 16-bit linear PCM —
///   directly consumable by the recognizer.
/// - Every intermediate file is created inside `workspace`; nothing outside
///   it is touched.
/// - All decode buffers and file handles are released before returning, on
///   success and on failure.
#[async_trait]
pub trait AudioNormalizer: Send + Sync {
    /// Normalize `blob` into the canonical waveform.
    async fn normalize(
        &self,
        blob: &AudioBlob,
        workspace: &Workspace,
    ) -> Result<NormalizedWaveform, NormalizeError>;
}

// Compile-time assertion: Box<dyn AudioNormalizer> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn AudioNormalizer>) {}
};

// ---------------------------------------------------------------------------
// FfmpegNormalizer
// ---------------------------------------------------------------------------

/// Production normalizer that shells out to ffmpeg.
///
/// Holds only the immutable [`ToolchainConfig`]; safe to share across any
/// number of concurrent pipeline runs.
pub struct FfmpegNormalizer {
    toolchain: ToolchainConfig,
}

impl FfmpegNormalizer {
    /// Wrap a detected toolchain.
    pub fn new(toolchain: ToolchainConfig) -> Self {
        Self { toolchain }
    }

    /// Ask ffprobe whether `input` is a container it can identify.
    ///
    /// `None` means ffprobe itself could not be launched.
    async fn probe_container(&self, input: &std::path::Path) -> Option<bool> {
        let output = Command::new(self.toolchain.ffprobe())
            .arg("-hide_banner")
            .args(["-loglevel", "error"])
            .args(["-show_entries", "format=format_name"])
            .args(["-of", "default=noprint_wrappers=1:nokey=1"])
            .arg(input)
            .output()
            .await;

        match output {
            Ok(out) => Some(out.status.success() && !out.stdout.is_empty()),
            Err(e) => {
                log::warn!("normalize: could not launch ffprobe: {e}");
                None
            }
        }
    }
}

#[async_trait]
impl AudioNormalizer for FfmpegNormalizer {
    async fn normalize(
        &self,
        blob: &AudioBlob,
        workspace: &Workspace,
    ) -> Result<NormalizedWaveform, NormalizeError> {
        if blob.is_empty() {
            return Err(NormalizeError::UnsupportedFormat("empty upload".into()));
        }

        // ── 1. Stage the upload in the workspace ─────────────────────────
        let input_path = workspace.file(&blob.suggested_file_name());
        tokio::fs::write(&input_path, blob.bytes())
            .await
            .map_err(|e| NormalizeError::Conversion(format!("failed to stage upload: {e}")))?;

        // ── 2. Transcode to 16-bit mono PCM at 16 kHz ────────────────────
        let output_path = workspace.file("normalized.wav");

        let output = Command::new(self.toolchain.ffmpeg())
            .arg("-y")
            .arg("-hide_banner")
            .args(["-loglevel", "error"])
            .arg("-i")
            .arg(&input_path)
            .args(["-ac", "1"])
            .args(["-ar", "16000"])
            .args(["-acodec", "pcm_s16le"])
            .arg(&output_path)
            .output()
            .await
            .map_err(|e| NormalizeError::Conversion(format!("failed to launch ffmpeg: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr.trim();
            let message = if detail.is_empty() {
                format!("ffmpeg exited with {}", output.status)
            } else {
                detail.to_string()
            };

            // ffprobe decides blame: a container it identifies points at the
            // toolchain, anything else at the upload.  Magic bytes stand in
            // when ffprobe itself cannot run.
            let identified = match self.probe_container(&input_path).await {
                Some(identified) => identified,
                None => blob.format_hint().is_some(),
            };

            return Err(if identified {
                NormalizeError::Conversion(message)
            } else {
                NormalizeError::UnsupportedFormat(message)
            });
        }

        // ── 3. Decode the canonical WAV ──────────────────────────────────
        let waveform = read_wav(&output_path)?;

        log::debug!(
            "normalize: {} byte upload → {:.2}s waveform",
            blob.len(),
            waveform.duration_secs()
        );

        Ok(waveform)
    }
}

/// Decode a PCM WAV file into a [`NormalizedWaveform`].
///
/// The reader is dropped before returning so the workspace can be removed
/// afterwards even on platforms with mandatory file locking.
fn read_wav(path: &std::path::Path) -> Result<NormalizedWaveform, NormalizeError> {
    let mut reader = hound::WavReader::open(path)
        .map_err(|e| NormalizeError::Conversion(format!("failed to read converted WAV: {e}")))?;

    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max))
                .collect::<Result<_, _>>()
        }
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>(),
    }
    .map_err(|e| NormalizeError::Conversion(format!("failed to decode PCM samples: {e}")))?;

    Ok(NormalizedWaveform::new(samples, spec.sample_rate))
}

// ---------------------------------------------------------------------------
// MockNormalizer  (test-only)
// ---------------------------------------------------------------------------

/// Test double returning a pre-configured waveform or error; counts calls so
/// pipeline tests can assert stage short-circuiting.
#[cfg(test)]
pub struct MockNormalizer {
    response: Result<NormalizedWaveform, NormalizeError>,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockNormalizer {
    /// Mock returning the given waveform.
    pub fn ok(waveform: NormalizedWaveform) -> Self {
        Self {
            response: Ok(waveform),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Mock returning one second of silence.
    pub fn silence() -> Self {
        Self::ok(NormalizedWaveform::new(
            vec![0.0; SAMPLE_RATE as usize],
            SAMPLE_RATE,
        ))
    }

    /// Mock returning the given error.
    pub fn err(error: NormalizeError) -> Self {
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
impl AudioNormalizer for MockNormalizer {
    async fn normalize(
        &self,
        _blob: &AudioBlob,
        _workspace: &Workspace,
    ) -> Result<NormalizedWaveform, NormalizeError> {
        self.calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn fake_toolchain(dir: &std::path::Path) -> ToolchainConfig {
        let ffmpeg = dir.join("ffmpeg");
        let ffprobe = dir.join("ffprobe");
        std::fs::write(&ffmpeg, b"").expect("write");
        std::fs::write(&ffprobe, b"").expect("write");
        ToolchainConfig::from_paths(ffmpeg, ffprobe).expect("resolve")
    }

    #[tokio::test]
    async fn empty_blob_is_unsupported_format() {
        let dir = tempdir().expect("temp dir");
        let normalizer = FfmpegNormalizer::new(fake_toolchain(dir.path()));
        let workspace = Workspace::acquire().expect("workspace");

        let err = normalizer
            .normalize(&AudioBlob::new(Vec::new(), None), &workspace)
            .await
            .unwrap_err();

        assert!(matches!(err, NormalizeError::UnsupportedFormat(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn unlaunchable_ffmpeg_is_conversion_error() {
        // The fake ffmpeg file exists but is not executable, so spawning it
        // fails with a permission error.
        let dir = tempdir().expect("temp dir");
        let normalizer = FfmpegNormalizer::new(fake_toolchain(dir.path()));
        let workspace = Workspace::acquire().expect("workspace");

        let blob = AudioBlob::new(vec![0xFF, 0xFB, 0x90, 0x00], Some("mp3".into()));
        let err = normalizer.normalize(&blob, &workspace).await.unwrap_err();

        assert!(matches!(err, NormalizeError::Conversion(_)));
    }

    /// Write `body` as an executable shell script posing as a toolchain binary.
    #[cfg(unix)]
    fn executable_script(path: &std::path::Path, body: &str) {
        use std::os::unix::fs::PermissionsExt;
        std::fs::write(path, body).expect("write");
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).expect("chmod");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failed_transcode_on_identified_container_is_conversion_error() {
        let dir = tempdir().expect("temp dir");
        let ffmpeg = dir.path().join("ffmpeg");
        let ffprobe = dir.path().join("ffprobe");
        executable_script(&ffmpeg, "#!/bin/sh\necho 'decoder exploded' >&2\nexit 1\n");
        executable_script(&ffprobe, "#!/bin/sh\necho mp3\nexit 0\n");

        let toolchain = ToolchainConfig::from_paths(ffmpeg, ffprobe).expect("resolve");
        let normalizer = FfmpegNormalizer::new(toolchain);
        let workspace = Workspace::acquire().expect("workspace");

        let blob = AudioBlob::new(vec![0xFF, 0xFB, 0x90, 0x00], Some("mp3".into()));
        let err = normalizer.normalize(&blob, &workspace).await.unwrap_err();

        assert!(matches!(err, NormalizeError::Conversion(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failed_transcode_on_unidentified_bytes_is_unsupported_format() {
        let dir = tempdir().expect("temp dir");
        let ffmpeg = dir.path().join("ffmpeg");
        let ffprobe = dir.path().join("ffprobe");
        executable_script(&ffmpeg, "#!/bin/sh\nexit 1\n");
        executable_script(&ffprobe, "#!/bin/sh\nexit 1\n");

        let toolchain = ToolchainConfig::from_paths(ffmpeg, ffprobe).expect("resolve");
        let normalizer = FfmpegNormalizer::new(toolchain);
        let workspace = Workspace::acquire().expect("workspace");

        let blob = AudioBlob::new(vec![0xDE, 0xAD, 0xBE, 0xEF], None);
        let err = normalizer.normalize(&blob, &workspace).await.unwrap_err();

        assert!(matches!(err, NormalizeError::UnsupportedFormat(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn magic_bytes_decide_when_ffprobe_cannot_run() {
        let dir = tempdir().expect("temp dir");
        let ffmpeg = dir.path().join("ffmpeg");
        let ffprobe = dir.path().join("ffprobe");
        executable_script(&ffmpeg, "#!/bin/sh\nexit 1\n");
        // Present but not executable, so spawning it fails.
        std::fs::write(&ffprobe, b"").expect("write");

        let toolchain = ToolchainConfig::from_paths(ffmpeg, ffprobe).expect("resolve");
        let normalizer = FfmpegNormalizer::new(toolchain);
        let workspace = Workspace::acquire().expect("workspace");

        let blob = AudioBlob::new(vec![0xFF, 0xFB, 0x90, 0x00], Some("mp3".into()));
        let err = normalizer.normalize(&blob, &workspace).await.unwrap_err();

        assert!(matches!(err, NormalizeError::Conversion(_)));
    }

    #[test]
    fn read_wav_decodes_int16_to_f32() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("test.wav");

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).expect("create");
        writer.write_sample(i16::MAX / 2).expect("write");
        writer.write_sample(-(i16::MAX / 2)).expect("write");
        writer.write_sample(0i16).expect("write");
        writer.finalize().expect("finalize");

        let waveform = read_wav(&path).expect("decode");
        assert_eq!(waveform.sample_rate(), SAMPLE_RATE);
        assert_eq!(waveform.samples().len(), 3);
        assert!((waveform.samples()[0] - 0.5).abs() < 1e-3);
        assert!((waveform.samples()[1] + 0.5).abs() < 1e-3);
        assert!(waveform.samples()[2].abs() < 1e-6);
    }

    #[test]
    fn read_wav_missing_file_is_conversion_error() {
        let err = read_wav(std::path::Path::new("/nonexistent/never.wav")).unwrap_err();
        assert!(matches!(err, NormalizeError::Conversion(_)));
    }

    #[tokio::test]
    async fn mock_counts_calls() {
        let mock = MockNormalizer::silence();
        let workspace = Workspace::acquire().expect("workspace");
        let blob = AudioBlob::new(vec![1, 2, 3], None);

        assert_eq!(mock.calls(), 0);
        let _ = mock.normalize(&blob, &workspace).await;
        let _ = mock.normalize(&blob, &workspace).await;
        assert_eq!(mock.calls(), 2);
    }
}
