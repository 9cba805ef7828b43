//! Scoped temporary workspace for one pipeline invocation.
//!
//! [`Workspace`] wraps a `tempfile::TempDir`.  Exactly one invocation owns
//! it; it is never shared, so no locking is needed.  Explicit
//! [`release`](Workspace::release) removes the directory and logs (but never
//! propagates) removal failures — a cleanup problem must not override a
//! stage's own outcome.  `TempDir`'s `Drop` removes the directory on panic
//! paths too.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use thiserror::Error;

/// Errors raised while acquiring the scoped workspace.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// The temporary directory could not be created.
    #[error("failed to acquire request workspace: {0}")]
    Acquire(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Workspace
// ---------------------------------------------------------------------------

/// Exclusive per-request scratch directory.
///
/// # Example
///
/// ```rust
/// use voice_translate::pipeline::Workspace;
///
/// let workspace = Workspace::acquire().unwrap();
/// let staging = workspace.file("upload.webm");
/// std::fs::write(&staging, b"bytes").unwrap();
/// workspace.release(); // directory and contents removed
/// assert!(!staging.exists());
/// ```
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create the workspace directory under the system temp dir.
    pub fn acquire() -> Result<Self, WorkspaceError> {
        let dir = tempfile::Builder::new()
            .prefix("voice-translate-")
            .tempdir()?;

        log::debug!("workspace: acquired {}", dir.path().display());
        Ok(Self { dir })
    }

    /// Path of the workspace directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path for a file named `name` inside the workspace.
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Remove the workspace and everything in it.
    ///
    /// Removal failures are logged and swallowed: cleanup must never change
    /// the outcome of the run that owned this workspace.
    pub fn release(self) {
        let path = self.dir.path().display().to_string();
        match self.dir.close() {
            Ok(()) => log::debug!("workspace: released {path}"),
            Err(e) => log::warn!("workspace: failed to remove {path}: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
