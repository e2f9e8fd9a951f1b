use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scratch directory owned by a single run.
///
/// Every run gets a new directory; it is deleted when the workspace is
/// dropped, whether the run finished, failed or unwound.
#[derive(Debug)]
pub struct RunWorkspace {
    dir: TempDir,
}

impl RunWorkspace {
    /// Create a workspace under the system temp directory.
    pub fn acquire() -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("lotsnap-").tempdir()?;
        tracing::debug!("Run workspace: {}", dir.path().display());
        Ok(Self { dir })
    }

    /// Create a workspace under `parent`, which must already exist.
    pub fn acquire_in(parent: &Path) -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("lotsnap-").tempdir_in(parent)?;
        tracing::debug!("Run workspace: {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// A named subdirectory, created on first use.
    pub fn subdir(&self, name: &str) -> io::Result<PathBuf> {
        let path = self.dir.path().join(name);
        std::fs::create_dir_all(&path)?;
        Ok(path)
    }
}
