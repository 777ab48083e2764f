//! Temporary output paths for external capture programs
//!
//! External backends write their screenshot to a file named on their
//! command line. [`TempOutput`] owns that hand-off path: it lives in a
//! private `gscreenshot-*` directory created for the adapter, is removed
//! after every read, and the directory goes away when the owner is dropped.
//!
//! # Examples
//!
//! ```
//! use gscreenshot::util::temp_files::TempOutput;
//!
//! let output = TempOutput::new().unwrap();
//! assert!(output.path().to_string_lossy().ends_with(".png"));
//! assert!(!output.path().exists());
//! ```

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tempfile::TempDir;

use crate::error::{CaptureError, CaptureResult};

const DIR_PREFIX: &str = "gscreenshot-";

/// The `.png` extension matters since several grabbers pick their output
/// format from it.
const OUTPUT_NAME: &str = "capture.png";

/// Exclusive temp output path for one capture adapter
#[derive(Debug)]
pub struct TempOutput {
    path: PathBuf,
    // Removed with its contents on drop, after `path` is cleared
    dir:  TempDir,
}

impl TempOutput {
    /// Creates a path in a fresh private directory under the system temp dir
    pub fn new() -> CaptureResult<Self> {
        let dir = tempfile::Builder::new()
            .prefix(DIR_PREFIX)
            .tempdir()
            .map_err(CaptureError::IoError)?;
        Ok(Self::with_dir(dir))
    }

    /// Creates a path in a fresh private directory under `parent`
    ///
    /// `parent` is created if it does not exist yet.
    pub fn in_dir(parent: impl AsRef<Path>) -> CaptureResult<Self> {
        let parent = parent.as_ref();
        fs::create_dir_all(parent).map_err(CaptureError::IoError)?;

        let dir = tempfile::Builder::new()
            .prefix(DIR_PREFIX)
            .tempdir_in(parent)
            .map_err(CaptureError::IoError)?;
        Ok(Self::with_dir(dir))
    }

    fn with_dir(dir: TempDir) -> Self {
        tracing::debug!("Capture hand-off directory {:?}", dir.path());
        Self {
            path: dir.path().join(OUTPUT_NAME),
            dir,
        }
    }

    /// The hand-off path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The private directory holding [`path`](Self::path)
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Removes the file if present
    ///
    /// Cleanup is best-effort: failures are logged, not returned.
    pub fn clear(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!("Removed temp output {:?}", self.path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to remove temp file {:?}: {}", self.path, e),
        }
    }
}

impl Drop for TempOutput {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_unique_per_instance() {
        let dir = tempfile::tempdir().unwrap();
        let first = TempOutput::in_dir(dir.path()).unwrap();
        let second = TempOutput::in_dir(dir.path()).unwrap();

        assert_ne!(first.path(), second.path());
        assert_ne!(first.dir(), second.dir());
        assert!(first.path().starts_with(dir.path()));
        assert!(
            first
                .dir()
                .file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with(DIR_PREFIX)
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_directory_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let output = TempOutput::new().unwrap();
        let mode = fs::metadata(output.dir()).unwrap().permissions().mode();
        assert_eq!(mode & 0o077, 0, "hand-off dir is accessible to others: {:o}", mode);
        assert_eq!(output.path().parent(), Some(output.dir()));
    }

    #[test]
    fn test_existing_shared_directory_is_not_reused() {
        // A directory with the old fixed name, owned by someone else,
        // must not become the hand-off location
        let parent = tempfile::tempdir().unwrap();
        let shared = parent.path().join("gscreenshot");
        fs::create_dir(&shared).unwrap();

        let output = TempOutput::in_dir(parent.path()).unwrap();
        assert!(!output.path().starts_with(&shared));
        assert!(output.dir().is_dir());
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let output = TempOutput::in_dir(&nested).unwrap();

        assert!(nested.is_dir());
        assert!(output.path().starts_with(&nested));
    }

    #[test]
    fn test_clear_removes_file_and_tolerates_missing() {
        let dir = tempfile::tempdir().unwrap();
        let output = TempOutput::in_dir(dir.path()).unwrap();

        fs::write(output.path(), b"stale").unwrap();
        output.clear();
        assert!(!output.path().exists());

        // Second clear is a no-op
        output.clear();
    }

    #[test]
    fn test_drop_removes_file_and_directory() {
        let dir = tempfile::tempdir().unwrap();
        let (path, private_dir) = {
            let output = TempOutput::in_dir(dir.path()).unwrap();
            fs::write(output.path(), b"data").unwrap();
            (output.path().to_path_buf(), output.dir().to_path_buf())
        };
        assert!(!path.exists());
        assert!(!private_dir.exists());
    }
}
