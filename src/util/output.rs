//! Where screenshots end up on disk

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Local};

use crate::{
    capture::ImageBuffer,
    error::{CaptureError, CaptureResult},
    util::encode::save_image,
};

/// chrono pattern for the timestamp in default filenames
pub const FILENAME_TIMESTAMP: &str = "%Y-%m-%d-%H%M%S";

/// Default filename for a screenshot taken at `time`
///
/// # Examples
///
/// ```
/// use chrono::{Local, TimeZone};
/// use gscreenshot::util::output::filename_at;
///
/// let time = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
/// assert_eq!(filename_at(&time), "gscreenshot_2024-03-09-140507.png");
/// ```
pub fn filename_at(time: &DateTime<Local>) -> String {
    format!("gscreenshot_{}.png", time.format(FILENAME_TIMESTAMP))
}

/// Default filename for a screenshot taken now
pub fn default_filename() -> String {
    filename_at(&Local::now())
}

/// Directory screenshots go to when no path is given
///
/// The configured directory wins, then the XDG pictures directory, then
/// the working directory.
pub fn default_save_dir(configured: Option<&Path>) -> PathBuf {
    configured
        .map(Path::to_path_buf)
        .or_else(dirs::picture_dir)
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Turns a user-supplied destination into a file path
///
/// A path without an extension names a directory, which is created if
/// needed and receives a default filename. `None` means the default
/// directory.
pub fn resolve_save_path(requested: Option<&Path>, save_dir: Option<&Path>) -> CaptureResult<PathBuf> {
    let directory = match requested {
        Some(path) if path.extension().is_some() => return Ok(path.to_path_buf()),
        Some(path) => path.to_path_buf(),
        None => default_save_dir(save_dir),
    };

    if !directory.exists() {
        tracing::info!("Creating screenshot directory: {}", directory.display());
        fs::create_dir_all(&directory)?;
    }

    Ok(directory.join(default_filename()))
}

/// Saves a screenshot to the resolved destination and returns its path
pub fn save_screenshot(
    image: &ImageBuffer,
    requested: Option<&Path>,
    save_dir: Option<&Path>,
) -> CaptureResult<PathBuf> {
    let path = resolve_save_path(requested, save_dir)?;
    save_image(image, &path)?;
    Ok(path)
}

/// Saves a screenshot under the temp directory
///
/// Used when the screenshot has to live somewhere but the user did not ask
/// for a file, e.g. for opening in a viewer or after a failed copy.
pub fn save_to_temp(image: &ImageBuffer) -> CaptureResult<PathBuf> {
    // Created exclusively, then kept past this process for the viewer
    let (_file, path) = tempfile::Builder::new()
        .prefix("gscreenshot_")
        .suffix(".png")
        .tempfile()
        .map_err(CaptureError::IoError)?
        .keep()
        .map_err(|e| CaptureError::IoError(e.error))?;
    save_image(image, &path)?;
    Ok(path)
}

/// Opens a saved screenshot in the desktop's default viewer
pub fn open_in_viewer(path: &Path) -> CaptureResult<()> {
    tracing::debug!("Opening {} in the default viewer", path.display());
    open::that_detached(path).map_err(|e| {
        CaptureError::IoError(std::io::Error::new(
            e.kind(),
            format!("could not open {}: {}", path.display(), e),
        ))
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_filename_pattern() {
        let time = Local.with_ymd_and_hms(2023, 12, 31, 23, 59, 1).unwrap();
        assert_eq!(filename_at(&time), "gscreenshot_2023-12-31-235901.png");
        assert!(default_filename().starts_with("gscreenshot_"));
    }

    #[test]
    fn test_configured_save_dir_wins() {
        let dir = Path::new("/srv/shots");
        assert_eq!(default_save_dir(Some(dir)), dir);
    }

    #[test]
    fn test_path_with_extension_is_kept() {
        let path = Path::new("/tmp/somewhere/shot.jpg");
        assert_eq!(resolve_save_path(Some(path), None).unwrap(), path);
    }

    #[test]
    fn test_path_without_extension_is_a_directory() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("nested").join("shots");

        let path = resolve_save_path(Some(&dir), None).unwrap();
        assert!(dir.is_dir());
        assert_eq!(path.parent(), Some(dir.as_path()));
        assert!(
            path.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("gscreenshot_")
        );
    }

    #[test]
    fn test_save_screenshot_to_configured_dir() {
        let root = tempfile::tempdir().unwrap();
        let image = ImageBuffer::from_test_pattern(20, 10);

        let path = save_screenshot(&image, None, Some(root.path())).unwrap();
        assert_eq!(path.parent(), Some(root.path()));
        assert_eq!(ImageBuffer::load(&path).unwrap().dimensions(), (20, 10));
    }

    #[test]
    fn test_save_to_temp_uses_fresh_files() {
        let image = ImageBuffer::from_test_pattern(6, 4);
        let first = save_to_temp(&image).unwrap();
        let second = save_to_temp(&image).unwrap();

        assert_ne!(first, second);
        assert!(first.extension().is_some_and(|ext| ext == "png"));
        assert_eq!(ImageBuffer::load(&first).unwrap().dimensions(), (6, 4));

        std::fs::remove_file(first).unwrap();
        std::fs::remove_file(second).unwrap();
    }
}
