//! Capture orchestration
//!
//! [`CaptureOrchestrator`] owns the active backend, the optional selector,
//! the cursor compositor and the last captured image. Each capture runs
//! through the states
//!
//! ```text
//! Idle -> Capturing -> { Succeeded | Failed | Cancelled }
//! ```
//!
//! and the terminal states count as idle for the next call.
//!
//! Interactive captures resolve the selector first, then run the countdown,
//! then grab the screen. An unreadable or failed selection degrades to a
//! full-screen capture; a cancelled one produces nothing. Cropping happens
//! before the synthetic cursor is stamped, so the cursor lands in the
//! cropped image's coordinate space.
//!
//! The orchestrator is synchronous and takes `&mut self` for every capture.
//! Overlapping captures are ruled out by the borrow checker here, and by
//! [`spawn_capture`](super::task::spawn_capture) across threads.

use std::{sync::Arc, time::Duration};

use super::{CursorCompositor, ImageBuffer, RegionSelector, ScreenCapture, SelectionOutcome};
use crate::{
    error::{CaptureError, CaptureResult},
    model::{Capabilities, CaptureMode, CaptureRequest, Region},
};

/// Lifecycle of the most recent capture
///
/// The state does not drop back to `Idle` once a capture ends: it keeps
/// the last result so callers can inspect it. `Succeeded`, `Failed` and
/// `Cancelled` all accept the next capture the way `Idle` does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    /// No capture has run yet
    #[default]
    Idle,
    /// A capture is in flight
    Capturing,
    /// The last capture produced an image
    Succeeded,
    /// The last capture produced nothing
    Failed,
    /// The user backed out of the last selection
    Cancelled,
}

/// Result of one capture call
#[derive(Debug)]
pub enum CaptureOutcome {
    /// A new image, also stored as the last image
    Captured(ImageBuffer),
    /// Selection was cancelled; nothing changed
    Cancelled,
    /// No image was produced; the last image is untouched
    Failed(CaptureError),
}

impl CaptureOutcome {
    /// Whether an image was produced
    pub fn is_captured(&self) -> bool {
        matches!(self, CaptureOutcome::Captured(_))
    }

    /// The captured image, if any
    pub fn image(&self) -> Option<&ImageBuffer> {
        match self {
            CaptureOutcome::Captured(image) => Some(image),
            _ => None,
        }
    }

    /// Converts into the captured image, if any
    pub fn into_image(self) -> Option<ImageBuffer> {
        match self {
            CaptureOutcome::Captured(image) => Some(image),
            _ => None,
        }
    }

    /// Converts into a result, mapping cancellation to `Ok(None)`
    pub fn into_result(self) -> CaptureResult<Option<ImageBuffer>> {
        match self {
            CaptureOutcome::Captured(image) => Ok(Some(image)),
            CaptureOutcome::Cancelled => Ok(None),
            CaptureOutcome::Failed(e) => Err(e),
        }
    }
}

/// Coordinates backend, selector and cursor compositor
pub struct CaptureOrchestrator {
    backend:    Arc<dyn ScreenCapture>,
    selector:   Option<Arc<dyn RegionSelector>>,
    compositor: CursorCompositor,
    image:      Option<ImageBuffer>,
    state:      CaptureState,
}

impl CaptureOrchestrator {
    /// Creates an orchestrator around an already probed backend
    ///
    /// The backend is fixed for the lifetime of the orchestrator.
    pub fn new(
        backend: Arc<dyn ScreenCapture>,
        selector: Option<Arc<dyn RegionSelector>>,
        compositor: CursorCompositor,
    ) -> Self {
        tracing::debug!(
            backend = backend.name(),
            selector = selector.as_ref().map(|s| s.name()),
            "Created capture orchestrator"
        );
        Self {
            backend,
            selector,
            compositor,
            image: None,
            state: CaptureState::Idle,
        }
    }

    /// Name of the active backend
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Capabilities of the active backend and selector
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            supports_selection: self.selector.is_some(),
            ..self.backend.capabilities()
        }
    }

    /// State of the most recent capture
    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// The last successfully captured image
    pub fn image(&self) -> Option<&ImageBuffer> {
        self.image.as_ref()
    }

    /// Empties the last-image slot
    pub fn clear_image(&mut self) {
        self.image = None;
    }

    /// Runs the capture described by `request`
    pub fn capture(&mut self, request: &CaptureRequest) -> CaptureOutcome {
        match request.mode {
            CaptureMode::Full => self.capture_fullscreen(request.delay, request.capture_cursor),
            CaptureMode::Selection => {
                self.capture_selection(request.delay, request.capture_cursor)
            }
            CaptureMode::Window => self.capture_window(request.delay, request.capture_cursor),
        }
    }

    /// Captures the whole screen after `delay`
    pub fn capture_fullscreen(&mut self, delay: Duration, capture_cursor: bool) -> CaptureOutcome {
        self.state = CaptureState::Capturing;
        self.finish(delay, capture_cursor, None)
    }

    /// Lets the user drag a region, then captures it after `delay`
    ///
    /// Without a selector this is a full-screen capture.
    pub fn capture_selection(&mut self, delay: Duration, capture_cursor: bool) -> CaptureOutcome {
        let Some(selector) = self.selector.clone() else {
            tracing::debug!("No region selector available, capturing full screen");
            return self.capture_fullscreen(delay, capture_cursor);
        };

        self.state = CaptureState::Capturing;
        let region = match selector.select_region() {
            SelectionOutcome::Selected(region) => Some(region),
            SelectionOutcome::Cancelled => {
                tracing::info!("Selection cancelled, no screenshot taken");
                self.state = CaptureState::Cancelled;
                return CaptureOutcome::Cancelled;
            }
            SelectionOutcome::ParseFailure { output } => {
                let error = CaptureError::SelectionParseFailure { output };
                tracing::warn!("{}; capturing full screen", error);
                None
            }
            SelectionOutcome::ExecFailure { reason } => {
                let error = CaptureError::SelectionExecFailure {
                    selector: selector.name().to_string(),
                    reason,
                };
                tracing::warn!("{}; capturing full screen", error);
                None
            }
        };

        self.finish(delay, capture_cursor, region)
    }

    /// Lets the user pick a window, then captures it after `delay`
    ///
    /// Window picking shares the selector with region selection.
    pub fn capture_window(&mut self, delay: Duration, capture_cursor: bool) -> CaptureOutcome {
        self.capture_selection(delay, capture_cursor)
    }

    /// Grabs the screen and commits the result to the last-image slot
    fn finish(
        &mut self,
        delay: Duration,
        capture_cursor: bool,
        region: Option<Region>,
    ) -> CaptureOutcome {
        match self.grab(delay, capture_cursor, region) {
            Ok(image) => {
                self.image = Some(image.clone());
                self.state = CaptureState::Succeeded;
                CaptureOutcome::Captured(image)
            }
            Err(e) => {
                tracing::warn!("Capture failed: {}", e);
                self.state = CaptureState::Failed;
                CaptureOutcome::Failed(e)
            }
        }
    }

    fn grab(
        &self,
        delay: Duration,
        capture_cursor: bool,
        region: Option<Region>,
    ) -> CaptureResult<ImageBuffer> {
        let native_cursor = self.backend.supports_cursor();
        let raw = self
            .backend
            .capture_fullscreen(delay, capture_cursor && native_cursor)?;

        let (image, origin) = match region {
            Some(region) => match region.clip_to(raw.width(), raw.height()) {
                Some(rect) => (raw.crop(rect)?, (rect.x, rect.y)),
                None => {
                    tracing::warn!(?region, "Selection lies outside the screen, keeping full capture");
                    (raw, (0, 0))
                }
            },
            None => (raw, (0, 0)),
        };

        if capture_cursor && !native_cursor {
            Ok(self.compositor.composite(&image, origin))
        } else {
            Ok(image)
        }
    }
}

impl std::fmt::Debug for CaptureOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureOrchestrator")
            .field("backend", &self.backend.name())
            .field("selector", &self.selector.as_ref().map(|s| s.name()))
            .field("state", &self.state)
            .field("image", &self.image.as_ref().map(ImageBuffer::dimensions))
            .finish()
    }
}
