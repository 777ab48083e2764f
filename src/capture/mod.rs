//! Capture pipeline
//!
//! This module turns a capture request into an image. It includes:
//!
//! - [`probe`]: picks the installed backend and selector programs
//! - [`external`]: one [`ScreenCapture`] adapter per external grabber
//! - [`selector`]: the slop/slurp [`RegionSelector`] adapter
//! - [`cursor`]: stamps a synthetic pointer onto captures
//! - [`orchestrator`]: ties the above together with selection fallback
//! - [`task`]: runs a capture off the caller's thread
//! - `ImageBuffer`: a wrapper around `image::DynamicImage`
//!
//! Most callers only need [`create_orchestrator`]:
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use gscreenshot::{capture::create_orchestrator, config::Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env()?;
//! let mut orchestrator = create_orchestrator(&config)?;
//!
//! if let Some(image) = orchestrator.capture_fullscreen(Duration::ZERO, true).into_image() {
//!     println!("Captured {}x{}", image.width(), image.height());
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use crate::{config::Config, error::CaptureResult, model::BackendKind};

pub mod cursor;
pub mod external;
pub mod image_buffer;
pub mod mock;
pub mod orchestrator;
pub mod probe;
pub mod selector;
pub mod task;
mod traits;

pub use cursor::CursorCompositor;
pub use external::{ArgTemplate, ExternalBackend};
pub use image_buffer::ImageBuffer;
pub use orchestrator::{CaptureOrchestrator, CaptureOutcome, CaptureState};
pub use selector::ExternalSelector;
pub use traits::{BackendCapabilities, CursorLocator, RegionSelector, ScreenCapture, SelectionOutcome};

/// Creates the adapter for a probed backend
pub fn create_backend(kind: BackendKind) -> CaptureResult<Arc<dyn ScreenCapture>> {
    Ok(Arc::new(ExternalBackend::new(kind)?))
}

/// Probes for an interactive selector
///
/// Returns `None` when selection is disabled or nothing is installed.
pub fn create_selector(config: &Config) -> Option<Arc<dyn RegionSelector>> {
    let candidates = config.selector_candidates();
    if candidates.is_empty() {
        tracing::debug!("Interactive selection disabled");
        return None;
    }

    match probe::probe_selector(&candidates) {
        Some(kind) => Some(Arc::new(ExternalSelector::new(kind))),
        None => {
            tracing::info!(
                "No region selector installed, selections will capture the full screen"
            );
            None
        }
    }
}

/// Builds the cursor compositor, loading a custom glyph if configured
///
/// An unreadable glyph file falls back to the built-in arrow.
pub fn create_compositor(config: &Config) -> CursorCompositor {
    let locator = cursor::default_locator();

    let Some(path) = &config.cursor_image else {
        return CursorCompositor::new(locator);
    };

    match cursor::load_cursor_glyph(path) {
        Ok(glyph) => CursorCompositor::with_glyph(locator, glyph),
        Err(e) => {
            tracing::warn!("Ignoring cursor image {}: {}", path.display(), e);
            CursorCompositor::new(locator)
        }
    }
}

/// Probes the system and builds a ready orchestrator
///
/// # Errors
///
/// [`CaptureError::NoSupportedBackend`](crate::error::CaptureError::NoSupportedBackend)
/// when none of the candidate programs is installed. This is the only
/// error that should stop an application.
pub fn create_orchestrator(config: &Config) -> CaptureResult<CaptureOrchestrator> {
    let kind = probe::probe_backend(&config.backend_candidates())?;
    tracing::info!(backend = %kind, session = %config.session, "Selected capture backend");

    Ok(CaptureOrchestrator::new(
        create_backend(kind)?,
        create_selector(config),
        create_compositor(config),
    ))
}
