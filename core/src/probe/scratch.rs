//! Scoped scratch file for the restricted-directory write probe

use crate::capability::FsProber;
use std::io;
use std::path::{Path, PathBuf};

const PROBE_CONTENTS: &[u8] = b"test";

/// A file written through an [`FsProber`] and removed again when the guard
/// goes out of scope, whichever way the probe exits.
pub struct ScratchFile<'a> {
    fs: &'a dyn FsProber,
    path: PathBuf,
    armed: bool,
}

impl<'a> ScratchFile<'a> {
    /// Create the probe file. Only a file created here is armed for
    /// removal; an existing file yields `AlreadyExists` and is left alone.
    pub fn create(fs: &'a dyn FsProber, path: &Path) -> io::Result<Self> {
        fs.write(path, PROBE_CONTENTS)?;
        Ok(Self {
            fs,
            path: path.to_path_buf(),
            armed: true,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the file now and report the outcome. On failure the guard
    /// stays armed and tries once more on drop.
    pub fn remove(mut self) -> io::Result<()> {
        self.fs.remove(&self.path)?;
        self.armed = false;
        Ok(())
    }
}

impl Drop for ScratchFile<'_> {
    fn drop(&mut self) {
        if self.armed {
            if let Err(err) = self.fs.remove(&self.path) {
                tracing::warn!(
                    "Failed to remove write probe {}: {}",
                    self.path.display(),
                    err
                );
            }
        }
    }
}
