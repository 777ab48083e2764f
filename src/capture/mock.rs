//! Test doubles for the capture pipeline
//!
//! These implement the capture traits without spawning processes or
//! touching a display, so orchestrator behaviour can be exercised anywhere.
//!
//! # Features
//!
//! - **Synthetic Images:** [`MockBackend`] returns test patterns of a fixed size
//! - **Call Recording:** every backend and selector invocation is recorded
//! - **Delay Honouring:** the backend sleeps for the requested countdown
//!   before recording the call, like a real adapter
//! - **Failure Injection:** make every capture fail with a given reason
//!
//! # Examples
//!
//! ```
//! use std::{sync::Arc, time::Duration};
//!
//! use gscreenshot::capture::{
//!     CaptureOrchestrator, CursorCompositor,
//!     mock::{FixedCursorLocator, MockBackend},
//! };
//!
//! let backend = Arc::new(MockBackend::new(200, 150));
//! let compositor = CursorCompositor::new(Arc::new(FixedCursorLocator::unavailable()));
//! let mut orchestrator = CaptureOrchestrator::new(backend.clone(), None, compositor);
//!
//! let outcome = orchestrator.capture_fullscreen(Duration::ZERO, false);
//! assert!(outcome.is_captured());
//! assert_eq!(backend.call_count(), 1);
//! ```

use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::{Duration, Instant},
};

use parking_lot::Mutex;

use super::{
    BackendCapabilities, CursorLocator, ImageBuffer, RegionSelector, ScreenCapture,
    SelectionOutcome, external::wait_for_delay,
};
use crate::{
    error::{CaptureError, CaptureResult},
    model::CursorPosition,
};

/// One recorded backend invocation
#[derive(Debug, Clone, Copy)]
pub struct MockCall {
    /// When the grab happened, after the delay elapsed
    pub at:             Instant,
    pub delay:          Duration,
    pub capture_cursor: bool,
}

/// Mock capture backend for testing and development
#[derive(Debug)]
pub struct MockBackend {
    width:           u32,
    height:          u32,
    supports_cursor: bool,
    /// Optional failure reason to inject into every capture
    failure:         Mutex<Option<String>>,
    calls:           Mutex<Vec<MockCall>>,
}

impl MockBackend {
    /// Creates a backend producing `width` x `height` test patterns
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            supports_cursor: false,
            failure: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Declares native cursor support
    pub fn with_cursor_support(mut self, supports_cursor: bool) -> Self {
        self.supports_cursor = supports_cursor;
        self
    }

    /// Makes every capture fail with `reason`
    pub fn with_failure(self, reason: impl Into<String>) -> Self {
        self.set_failure(Some(reason.into()));
        self
    }

    /// Starts or stops failing captures on a shared backend
    pub fn set_failure(&self, reason: Option<String>) {
        *self.failure.lock() = reason;
    }

    /// Recorded invocations, oldest first
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    /// Number of recorded invocations
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl BackendCapabilities for MockBackend {
    fn supports_cursor(&self) -> bool {
        self.supports_cursor
    }
}

impl ScreenCapture for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn capture_fullscreen(
        &self,
        delay: Duration,
        capture_cursor: bool,
    ) -> CaptureResult<ImageBuffer> {
        wait_for_delay(delay);
        self.calls.lock().push(MockCall {
            at: Instant::now(),
            delay,
            capture_cursor,
        });

        if let Some(reason) = self.failure.lock().clone() {
            return Err(CaptureError::BackendExecFailure {
                backend: "mock".to_string(),
                reason,
            });
        }

        Ok(ImageBuffer::from_test_pattern(self.width, self.height))
    }
}

/// Selector returning a canned outcome
#[derive(Debug)]
pub struct MockSelector {
    outcome: SelectionOutcome,
    calls:   Mutex<Vec<Instant>>,
}

impl MockSelector {
    /// Creates a selector that always answers `outcome`
    pub fn new(outcome: SelectionOutcome) -> Self {
        Self {
            outcome,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// When each selection finished
    pub fn calls(&self) -> Vec<Instant> {
        self.calls.lock().clone()
    }

    /// Number of selections made
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl RegionSelector for MockSelector {
    fn name(&self) -> &str {
        "mock"
    }

    fn select_region(&self) -> SelectionOutcome {
        self.calls.lock().push(Instant::now());
        self.outcome.clone()
    }
}

/// Pointer query with a fixed answer
#[derive(Debug, Default)]
pub struct FixedCursorLocator {
    position: Option<CursorPosition>,
    queries:  AtomicUsize,
}

impl FixedCursorLocator {
    /// Always reports the pointer at (`x`, `y`)
    pub fn at(x: i32, y: i32) -> Self {
        Self {
            position: Some(CursorPosition::new(x, y)),
            queries:  AtomicUsize::new(0),
        }
    }

    /// Never knows where the pointer is
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// How many times the position was asked for
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl CursorLocator for FixedCursorLocator {
    fn cursor_position(&self) -> CaptureResult<CursorPosition> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.position
            .ok_or_else(|| CaptureError::CursorQueryUnavailable {
                reason: "mock pointer unavailable".to_string(),
            })
    }
}
