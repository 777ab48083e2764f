//! Capability traits for the capture pipeline
//!
//! The orchestrator depends on three seams, each with one implementation
//! per external program plus test doubles in [`mock`](super::mock):
//!
//! - [`ScreenCapture`] + [`BackendCapabilities`]: full-screen grabbers
//! - [`RegionSelector`]: interactive region/window pickers
//! - [`CursorLocator`]: pointer position queries
//!
//! All traits are synchronous. Front ends that must stay responsive run
//! captures through [`task`](super::task).

use std::time::Duration;

use crate::{
    error::CaptureResult,
    model::{Capabilities, CursorPosition, Region},
};

use super::ImageBuffer;

/// Query backend feature support at runtime.
pub trait BackendCapabilities: Send + Sync {
    /// Whether the backend can draw the pointer into its own captures.
    ///
    /// This is a static declaration and never runs the external program.
    fn supports_cursor(&self) -> bool;

    /// Capability flags for serialization and version output.
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            supports_cursor:    self.supports_cursor(),
            supports_selection: false,
        }
    }
}

/// Capability: Backend can grab the whole screen.
pub trait ScreenCapture: BackendCapabilities {
    /// Backend name for diagnostics.
    fn name(&self) -> &str;

    /// Captures the full screen after waiting `delay`.
    ///
    /// Spawns exactly one external process per call. Failures are returned,
    /// never retried.
    fn capture_fullscreen(
        &self,
        delay: Duration,
        capture_cursor: bool,
    ) -> CaptureResult<ImageBuffer>;
}

/// Result of one interactive selection
///
/// Degradation paths are data rather than control flow: the orchestrator
/// matches on this to decide between cropping, falling back to a full
/// capture, or giving up silently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// The user picked a region or window
    Selected(Region),
    /// The user aborted (escape, right click); not an error
    Cancelled,
    /// The selector ran but printed something unreadable
    ParseFailure {
        /// Raw standard output
        output: String,
    },
    /// The selector could not be started or exited abnormally
    ExecFailure {
        /// Spawn error or exit status
        reason: String,
    },
}

/// Capability: interactive region or window selection.
pub trait RegionSelector: Send + Sync {
    /// Selector name for diagnostics.
    fn name(&self) -> &str;

    /// Blocks until the user finishes selecting.
    fn select_region(&self) -> SelectionOutcome;
}

/// Capability: pointer position query.
pub trait CursorLocator: Send + Sync {
    /// Current pointer position in screen coordinates.
    ///
    /// Returns [`CaptureError::CursorQueryUnavailable`] when the query
    /// cannot be answered.
    ///
    /// [`CaptureError::CursorQueryUnavailable`]: crate::error::CaptureError::CursorQueryUnavailable
    fn cursor_position(&self) -> CaptureResult<CursorPosition>;
}
