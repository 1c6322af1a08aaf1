//! Guard that keeps a half-written archive from outliving a failed run.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Removes `path` when dropped unless [`keep`](PartialArchive::keep) was called.
///
/// Covers early returns, stage failures, interrupts and panics alike.
#[derive(Debug)]
pub struct PartialArchive {
    path: PathBuf,
    armed: bool,
}

impl PartialArchive {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            armed: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Commits the archive: it stays on disk and its final path is returned.
    pub fn keep(mut self) -> PathBuf {
        self.armed = false;
        std::mem::take(&mut self.path)
    }
}

impl Drop for PartialArchive {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(_) => warn!("Removed incomplete backup file: {}", self.path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No incomplete backup file to remove")
            }
            Err(e) => warn!(
                "Failed to remove incomplete backup file {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}
