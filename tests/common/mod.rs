//! Shared helpers for integration tests
//!
//! External programs are faked with `sh -c '<script>'`. The adapter appends
//! the temp output path as the last argument, which the script sees as `$0`
//! (or a later positional when cursor arguments come first).

#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use gscreenshot::{
    capture::{
        ArgTemplate, CaptureOrchestrator, CursorCompositor, ExternalBackend, ImageBuffer,
        RegionSelector, ScreenCapture, SelectionOutcome,
        mock::{FixedCursorLocator, MockBackend, MockSelector},
    },
    model::Region,
    util::temp_files::TempOutput,
};

/// Writes a test-pattern PNG and returns its path
pub fn write_png_fixture(dir: &Path, width: u32, height: u32) -> PathBuf {
    let path = dir.join(format!("fixture-{}x{}.png", width, height));
    ImageBuffer::from_test_pattern(width, height)
        .inner()
        .save(&path)
        .expect("fixture should be writable");
    path
}

/// Script that copies `fixture` to the path passed as `$0`
pub fn copy_script(fixture: &Path) -> String {
    format!("cp '{}' \"$0\"", fixture.display())
}

/// Backend running `script` through `sh`, writing temp files into `dir`
pub fn shell_backend(dir: &Path, script: &str) -> ExternalBackend {
    shell_backend_with(dir, ArgTemplate::fixed(["-c", script]), false)
}

/// Backend running `sh` with an explicit template
pub fn shell_backend_with(
    dir: &Path,
    template: ArgTemplate,
    supports_cursor: bool,
) -> ExternalBackend {
    ExternalBackend::custom(
        "sh",
        "sh",
        template,
        supports_cursor,
        TempOutput::in_dir(dir).expect("temp dir should be writable"),
    )
}

/// Orchestrator without pointer queries
pub fn orchestrator_with(
    backend: Arc<dyn ScreenCapture>,
    selector: Option<Arc<dyn RegionSelector>>,
) -> CaptureOrchestrator {
    CaptureOrchestrator::new(
        backend,
        selector,
        CursorCompositor::new(Arc::new(FixedCursorLocator::unavailable())),
    )
}

/// Mock backend of the given size
pub fn mock_backend(width: u32, height: u32) -> Arc<MockBackend> {
    Arc::new(MockBackend::new(width, height))
}

/// Selector that always picks `region`
pub fn selecting(region: Region) -> Arc<dyn RegionSelector> {
    Arc::new(MockSelector::new(SelectionOutcome::Selected(region)))
}
