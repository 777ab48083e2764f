//! Error types for screenshot capture operations
//!
//! This module defines the error taxonomy for the capture pipeline with
//! user-facing messages and actionable remediation hints. Only
//! [`CaptureError::NoSupportedBackend`] is fatal; every per-capture error is
//! recovered by the orchestrator as "no image" or as a degraded capture.

use crate::model::BackendKind;

/// Result type alias for capture operations
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Error type for screenshot capture operations
///
/// Each variant includes detailed context and provides remediation hints
/// through the `remediation_hint()` method.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// None of the candidate capture programs is installed
    #[error("No supported screenshot backend is available (tried: {})", format_candidates(.candidates))]
    NoSupportedBackend {
        /// Backends that were probed, in priority order
        candidates: Vec<BackendKind>,
    },

    /// A single capture attempt produced no image
    #[error("Screenshot backend '{backend}' failed: {reason}")]
    BackendExecFailure {
        /// Name of the backend that failed
        backend: String,
        /// Exit status, stderr or load failure
        reason:  String,
    },

    /// The selector ran but its output was not four integers
    #[error("Could not parse selection output: {output:?}")]
    SelectionParseFailure {
        /// Raw standard output of the selector
        output: String,
    },

    /// The selector could not be started or exited abnormally
    #[error("Region selector '{selector}' failed: {reason}")]
    SelectionExecFailure {
        /// Name of the selector program
        selector: String,
        /// Spawn error or exit status
        reason:   String,
    },

    /// The pointer position could not be queried
    #[error("Cursor position unavailable: {reason}")]
    CursorQueryUnavailable {
        /// Why the query failed
        reason: String,
    },

    /// Another capture is already running on this orchestrator
    #[error("A capture is already in progress")]
    CaptureInProgress,

    /// File extension does not map to a writable image format
    #[error("Unsupported image format '{extension}'")]
    UnsupportedFormat {
        /// The offending extension (empty when missing)
        extension: String,
    },

    /// Image encoding failed
    #[error("Failed to encode image as {format}: {reason}")]
    EncodingFailed {
        /// Image format that failed
        format: String,
        /// Reason for encoding failure
        reason: String,
    },

    /// Copying to the clipboard failed
    #[error("Could not copy image to clipboard: {reason}")]
    ClipboardFailed {
        /// Reason for the failure
        reason: String,
    },

    /// Invalid parameter provided
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: String,
        /// Reason why it's invalid
        reason:    String,
    },

    /// I/O error occurred
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Image processing error
    #[error("Image processing error: {0}")]
    ImageError(String),
}

fn format_candidates(candidates: &[BackendKind]) -> String {
    if candidates.is_empty() {
        return "none".to_string();
    }
    candidates
        .iter()
        .map(BackendKind::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<image::ImageError> for CaptureError {
    fn from(err: image::ImageError) -> Self {
        CaptureError::ImageError(err.to_string())
    }
}

impl CaptureError {
    /// Returns an actionable remediation hint for this error
    ///
    /// # Examples
    ///
    /// ```
    /// use gscreenshot::{error::CaptureError, model::BackendKind};
    ///
    /// let error = CaptureError::NoSupportedBackend {
    ///     candidates: vec![BackendKind::Scrot],
    /// };
    ///
    /// assert!(error.remediation_hint().contains("scrot"));
    /// ```
    pub fn remediation_hint(&self) -> &str {
        match self {
            CaptureError::NoSupportedBackend { .. } => {
                "Install one of scrot, maim, imlib2_grab, ImageMagick (import) or grim and make \
                 sure it is on your PATH."
            }
            CaptureError::BackendExecFailure { .. } => {
                "The screenshot program did not produce an image. Run it by hand to see its \
                 output, and check that a display is available."
            }
            CaptureError::SelectionParseFailure { .. } => {
                "The region selector printed something unexpected. A full screen screenshot was \
                 taken instead."
            }
            CaptureError::SelectionExecFailure { .. } => {
                "Install slop (X11) or slurp (Wayland) for interactive selection. A full screen \
                 screenshot was taken instead."
            }
            CaptureError::CursorQueryUnavailable { .. } => {
                "The pointer position could not be read, so no cursor was drawn. Pointer queries \
                 need an X11 (or XWayland) display."
            }
            CaptureError::CaptureInProgress => {
                "Wait for the current screenshot to finish before starting another one."
            }
            CaptureError::UnsupportedFormat { .. } => {
                "Use a file extension of png, jpg, jpeg, bmp, tif, tiff or webp."
            }
            CaptureError::EncodingFailed { format, .. } => match format.as_str() {
                "jpeg" => "JPEG encoding failed. Try saving as PNG instead.",
                _ => "Image encoding failed. Try a different format (PNG, JPEG or BMP).",
            },
            CaptureError::ClipboardFailed { .. } => {
                "Install xclip (X11) or wl-clipboard (Wayland) to copy screenshots to the \
                 clipboard."
            }
            CaptureError::InvalidParameter { parameter, .. } => match parameter.as_str() {
                "delay" => "Delay must be a non-negative number of seconds.",
                "backend" => "Valid backends are scrot, maim, imlib2, imagemagick and grim.",
                "selector" => "Valid selectors are slop, slurp and none.",
                _ => "Check the parameter value and try again.",
            },
            CaptureError::IoError(_) => {
                "An I/O error occurred. Check file permissions, disk space, and system resources."
            }
            CaptureError::ImageError(_) => {
                "Image processing failed. The file may be truncated or in an unsupported format."
            }
        }
    }

    /// Whether this error should stop the application
    ///
    /// Only a missing backend is fatal; everything else degrades to a
    /// missing image or a simpler capture mode.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CaptureError::NoSupportedBackend { .. })
    }
}
