//! Workspace management for pipeline execution.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Workspace for pipeline execution.
///
/// Provides a temporary directory for intermediate files and a staging path
/// for the deliverable, with atomic finalization to its real destination.
/// Everything inside the workspace is removed when it is dropped, on success
/// and failure paths alike.
///
/// # Example
///
/// ```no_run
/// use moshforge_av::Workspace;
///
/// let workspace = Workspace::new("glitched.mp4")?;
/// // Write intermediates to workspace.temp_file("intermediate.avi"),
/// // produce the deliverable at workspace.output(), then move it out.
/// workspace.finalize("/path/to/glitched.mp4")?;
/// # Ok::<(), moshforge_av::Error>(())
/// ```
pub struct Workspace {
    temp_dir: TempDir,
    output_path: PathBuf,
}

impl Workspace {
    /// Create a new workspace whose staged deliverable has the given name.
    pub fn new(deliverable_name: &str) -> Result<Self> {
        if deliverable_name.is_empty() || deliverable_name.contains(std::path::MAIN_SEPARATOR) {
            return Err(Error::InvalidInput(format!(
                "invalid deliverable name: {deliverable_name:?}"
            )));
        }

        let temp_dir = TempDir::new().map_err(|e| Error::Workspace(e.to_string()))?;
        let output_path = temp_dir.path().join(deliverable_name);

        Ok(Self {
            temp_dir,
            output_path,
        })
    }

    /// Get the staged output file path.
    pub fn output(&self) -> &Path {
        &self.output_path
    }

    /// Get the temp directory path.
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a temp file path with the given name.
    pub fn temp_file(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Move the staged output to its destination.
    ///
    /// If a file already exists at the destination it is backed up first and
    /// restored if the move fails.
    pub fn finalize<P: AsRef<Path>>(self, destination: P) -> Result<PathBuf> {
        let dest = destination.as_ref();

        if !self.output_path.exists() {
            return Err(Error::Workspace(format!(
                "output file does not exist: {:?}",
                self.output_path
            )));
        }

        if dest.exists() {
            let backup = dest.with_extension("bak");
            std::fs::rename(dest, &backup).map_err(|e| {
                Error::Workspace(format!("failed to create backup of existing file: {e}"))
            })?;

            if let Err(e) = move_file(&self.output_path, dest) {
                // Restore backup on failure
                let _ = std::fs::rename(&backup, dest);
                return Err(Error::Workspace(format!(
                    "failed to move output to destination: {e}"
                )));
            }

            let _ = std::fs::remove_file(&backup);
        } else {
            move_file(&self.output_path, dest).map_err(|e| {
                Error::Workspace(format!("failed to move output to destination: {e}"))
            })?;
        }

        Ok(dest.to_path_buf())
    }

    /// Clean up without finalizing (discard output).
    pub fn cleanup(self) {
        // TempDir will clean up on drop
        drop(self.temp_dir);
    }
}

/// Rename, falling back to copy-and-remove for cross-device destinations.
fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    match std::fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(_) => {
            std::fs::copy(from, to)?;
            std::fs::remove_file(from)
        }
    }
}
