//! `AudioBlob` — an uploaded audio byte stream plus what we know about its
//! container format.
//!
//! Uploads arrive as raw bytes with, at best, a file-name extension.  The
//! blob sniffs the real container from magic bytes and only falls back to
//! the declared extension when the magic is inconclusive — browsers routinely
//! mislabel recorded audio.

/// Container formats the normalizer recognizes up front.
///
/// This list is for error classification only; ffmpeg itself decides what it
/// can actually decode.  An upload outside this list is still handed to
/// ffmpeg — if decoding then fails, the failure is reported as an unsupported
/// format rather than a conversion error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    /// RIFF/WAVE.
    Wav,
    /// MPEG audio (MP3), with or without an ID3 tag.
    Mp3,
    /// Ogg (Vorbis/Opus).
    Ogg,
    /// FLAC.
    Flac,
    /// ISO BMFF (MP4 / M4A / 3GP).
    Mp4,
    /// Matroska / WebM — what browser `MediaRecorder` typically produces.
    WebM,
}

impl ContainerFormat {
    /// Canonical file extension, used to name the workspace input file so
    /// ffmpeg gets a format hint.
    pub fn extension(&self) -> &'static str {
        match self {
            ContainerFormat::Wav => "wav",
            ContainerFormat::Mp3 => "mp3",
            ContainerFormat::Ogg => "ogg",
            ContainerFormat::Flac => "flac",
            ContainerFormat::Mp4 => "m4a",
            ContainerFormat::WebM => "webm",
        }
    }

    /// Map a declared file extension to a container, if known.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "wav" | "wave" => Some(ContainerFormat::Wav),
            "mp3" => Some(ContainerFormat::Mp3),
            "ogg" | "oga" | "opus" => Some(ContainerFormat::Ogg),
            "flac" => Some(ContainerFormat::Flac),
            "mp4" | "m4a" | "aac" | "3gp" => Some(ContainerFormat::Mp4),
            "webm" | "mkv" => Some(ContainerFormat::WebM),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// AudioBlob
// ---------------------------------------------------------------------------

/// Raw uploaded audio bytes plus the declared container format.
///
/// Owned exclusively by one pipeline invocation; dropped at the end of the
/// request regardless of outcome.
#[derive(Debug, Clone)]
pub struct AudioBlob {
    bytes: Vec<u8>,
    declared_extension: Option<String>,
}

impl AudioBlob {
    /// Wrap uploaded bytes.  `declared_extension` is the extension of the
    /// uploaded file name, when one was provided.
    pub fn new(bytes: Vec<u8>, declared_extension: Option<String>) -> Self {
        Self {
            bytes,
            declared_extension,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Sniff the container format from magic bytes.
    ///
    /// Returns `None` when the signature matches none of the known
    /// containers.
    pub fn sniff_format(&self) -> Option<ContainerFormat> {
        let b = &self.bytes;

        if b.len() >= 12 && &b[0..4] == b"RIFF" && &b[8..12] == b"WAVE" {
            return Some(ContainerFormat::Wav);
        }
        if b.len() >= 4 && &b[0..4] == b"OggS" {
            return Some(ContainerFormat::Ogg);
        }
        if b.len() >= 4 && &b[0..4] == b"fLaC" {
            return Some(ContainerFormat::Flac);
        }
        // ISO BMFF: size (4 bytes) then "ftyp".
        if b.len() >= 8 && &b[4..8] == b"ftyp" {
            return Some(ContainerFormat::Mp4);
        }
        // EBML header — Matroska or WebM.
        if b.len() >= 4 && b[0..4] == [0x1A, 0x45, 0xDF, 0xA3] {
            return Some(ContainerFormat::WebM);
        }
        // MP3: ID3 tag, or a bare MPEG frame sync (11 set bits).
        if b.len() >= 3 && &b[0..3] == b"ID3" {
            return Some(ContainerFormat::Mp3);
        }
        if b.len() >= 2 && b[0] == 0xFF && (b[1] & 0xE0) == 0xE0 {
            return Some(ContainerFormat::Mp3);
        }

        None
    }

    /// Best available container guess: sniffed magic first, declared
    /// extension second.
    pub fn format_hint(&self) -> Option<ContainerFormat> {
        self.sniff_format().or_else(|| {
            self.declared_extension
                .as_deref()
                .and_then(ContainerFormat::from_extension)
        })
    }

    /// File name for the workspace input file, carrying whatever extension
    /// hint we have (`upload.bin` when there is none).
    pub fn suggested_file_name(&self) -> String {
        match self.format_hint() {
            Some(format) => format!("upload.{}", format.extension()),
            None => "upload.bin".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
