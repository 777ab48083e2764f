//! Integration tests for external capture programs
//!
//! Real grabbers need a display, so these drive the adapter with `sh`
//! scripts that behave like a grabber would.

mod common;

#[cfg(unix)]
mod shell_backend {
    use std::{
        sync::Arc,
        time::{Duration, Instant},
    };

    use gscreenshot::{
        capture::{ArgTemplate, CaptureOutcome, ScreenCapture},
        error::CaptureError,
    };

    use crate::common::*;

    fn reason_of(err: CaptureError) -> String {
        match err {
            CaptureError::BackendExecFailure { reason, .. } => reason,
            other => panic!("expected a backend failure, got {other:?}"),
        }
    }

    #[test]
    fn test_successful_capture_loads_and_removes_output() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = write_png_fixture(dir.path(), 64, 48);
        let backend = shell_backend(dir.path(), &copy_script(&fixture));

        let image = backend.capture_fullscreen(Duration::ZERO, false).unwrap();
        assert_eq!(image.dimensions(), (64, 48));
        assert!(!backend.output().path().exists());
    }

    #[test]
    fn test_nonzero_exit_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let backend = shell_backend(dir.path(), "echo 'cannot open display' >&2; exit 1");

        let reason = reason_of(backend.capture_fullscreen(Duration::ZERO, false).unwrap_err());
        assert!(reason.contains("cannot open display"));
    }

    #[test]
    fn test_missing_output_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let backend = shell_backend(dir.path(), "exit 0");

        let reason = reason_of(backend.capture_fullscreen(Duration::ZERO, false).unwrap_err());
        assert!(reason.contains("no output written"));
    }

    #[test]
    fn test_corrupt_output_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let backend = shell_backend(dir.path(), "echo 'not an image' > \"$0\"");

        assert!(backend.capture_fullscreen(Duration::ZERO, false).is_err());
        assert!(!backend.output().path().exists());
    }

    #[test]
    fn test_stale_output_is_not_reused() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = write_png_fixture(dir.path(), 8, 8);
        let backend = shell_backend(dir.path(), "exit 0");

        // A leftover from an earlier run must not pass as this run's output
        std::fs::copy(&fixture, backend.output().path()).unwrap();
        assert!(backend.capture_fullscreen(Duration::ZERO, false).is_err());
    }

    #[test]
    fn test_delay_runs_before_the_program() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = write_png_fixture(dir.path(), 4, 4);
        let backend = shell_backend(dir.path(), &copy_script(&fixture));

        let delay = Duration::from_millis(250);
        let start = Instant::now();
        backend.capture_fullscreen(delay, false).unwrap();
        assert!(start.elapsed() >= delay);
    }

    #[test]
    fn test_cursor_arguments_precede_output_path() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = write_png_fixture(dir.path(), 4, 4);
        let script = format!(
            "test \"$0\" = --with-pointer && cp '{}' \"$1\"",
            fixture.display()
        );
        let template = ArgTemplate {
            base:           vec!["-c".to_string(), script],
            with_cursor:    vec!["--with-pointer".to_string()],
            without_cursor: Vec::new(),
        };
        let backend = shell_backend_with(dir.path(), template, true);

        assert!(backend.capture_fullscreen(Duration::ZERO, true).is_ok());
        assert!(backend.capture_fullscreen(Duration::ZERO, false).is_err());
    }

    #[test]
    fn test_orchestrator_reports_failed_backend_without_image() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(shell_backend(dir.path(), "exit 3"));
        let mut orchestrator = orchestrator_with(backend, None);

        let outcome = orchestrator.capture_fullscreen(Duration::ZERO, false);
        assert!(matches!(
            outcome,
            CaptureOutcome::Failed(CaptureError::BackendExecFailure { .. })
        ));
        assert!(orchestrator.image().is_none());
    }
}
