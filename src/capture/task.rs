//! Off-thread captures for responsive front ends
//!
//! The orchestrator blocks for the countdown and for every external
//! program. [`spawn_capture`] moves one capture onto tokio's blocking pool
//! and hands back a future for the outcome, so an event loop can keep
//! drawing while the user drags a selection.
//!
//! Only one capture may run per orchestrator. A second request made while
//! one is in flight is answered right away with
//! [`CaptureError::CaptureInProgress`] instead of queueing behind it.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use super::{CaptureOrchestrator, CaptureOutcome};
use crate::{error::CaptureError, model::CaptureRequest};

/// Orchestrator shared between a front end and its capture tasks
pub type SharedOrchestrator = Arc<Mutex<CaptureOrchestrator>>;

/// Wraps an orchestrator for use with [`spawn_capture`]
pub fn shared(orchestrator: CaptureOrchestrator) -> SharedOrchestrator {
    Arc::new(Mutex::new(orchestrator))
}

/// Runs one capture on the blocking pool
///
/// Must be called from within a tokio runtime.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use gscreenshot::{
///     capture::{
///         CaptureOrchestrator, CursorCompositor,
///         mock::{FixedCursorLocator, MockBackend},
///         task::{shared, spawn_capture},
///     },
///     model::{CaptureMode, CaptureRequest},
/// };
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let orchestrator = shared(CaptureOrchestrator::new(
///     Arc::new(MockBackend::new(320, 200)),
///     None,
///     CursorCompositor::new(Arc::new(FixedCursorLocator::unavailable())),
/// ));
///
/// let outcome = spawn_capture(orchestrator, CaptureRequest::new(CaptureMode::Full))
///     .await
///     .unwrap();
/// assert!(outcome.is_captured());
/// # }
/// ```
pub fn spawn_capture(
    orchestrator: SharedOrchestrator,
    request: CaptureRequest,
) -> JoinHandle<CaptureOutcome> {
    tokio::task::spawn_blocking(move || {
        let Some(mut guard) = orchestrator.try_lock() else {
            tracing::warn!("Rejected capture request, another capture is running");
            return CaptureOutcome::Failed(CaptureError::CaptureInProgress);
        };

        tracing::debug!(?request, "Starting background capture");
        guard.capture(&request)
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        capture::{
            CursorCompositor, ImageBuffer,
            mock::{FixedCursorLocator, MockBackend},
        },
        model::CaptureMode,
    };

    fn shared_mock(backend: Arc<MockBackend>) -> SharedOrchestrator {
        shared(CaptureOrchestrator::new(
            backend,
            None,
            CursorCompositor::new(Arc::new(FixedCursorLocator::unavailable())),
        ))
    }

    #[tokio::test]
    async fn test_spawned_capture_updates_orchestrator() {
        let orchestrator = shared_mock(Arc::new(MockBackend::new(40, 30)));

        let outcome = spawn_capture(orchestrator.clone(), CaptureRequest::new(CaptureMode::Full))
            .await
            .unwrap();

        assert!(outcome.is_captured());
        assert_eq!(
            orchestrator.lock().image().map(ImageBuffer::dimensions),
            Some((40, 30))
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_overlapping_capture_is_rejected() {
        let backend = Arc::new(MockBackend::new(10, 10));
        let orchestrator = shared_mock(backend.clone());

        let slow = CaptureRequest::new(CaptureMode::Full).with_delay(Duration::from_millis(300));
        let first = spawn_capture(orchestrator.clone(), slow);

        // Let the first capture take the lock
        tokio::time::sleep(Duration::from_millis(100)).await;
        let second = spawn_capture(orchestrator.clone(), CaptureRequest::new(CaptureMode::Full))
            .await
            .unwrap();

        assert!(matches!(
            second,
            CaptureOutcome::Failed(CaptureError::CaptureInProgress)
        ));
        assert!(first.await.unwrap().is_captured());
        assert_eq!(backend.call_count(), 1);
    }
}
