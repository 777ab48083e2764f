//! Capability probe for external programs
//!
//! Resolves candidate programs against `$PATH` in priority order. The probe
//! touches nothing but the filesystem and keeps no cache, so repeated calls
//! in an unchanged environment return the same answer.

use std::{env, ffi::OsString, path::PathBuf};

use crate::{
    error::{CaptureError, CaptureResult},
    model::{BackendKind, ExternalProgram, SelectorKind},
    util::clipboard::ClipboardTool,
};

/// Finds an executable on the current `$PATH`
///
/// Names containing a path separator are checked as given.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Finds an executable in an explicit search path
///
/// Relative names resolve against the current directory.
pub fn find_executable_in(name: &str, search_path: Option<OsString>) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    which::which_in(name, search_path, cwd).ok()
}

/// Returns the first candidate whose program resolves
pub fn probe_first<T, F>(candidates: &[T], lookup: F) -> Option<T>
where
    T: ExternalProgram + Copy,
    F: Fn(&str) -> Option<PathBuf>,
{
    candidates.iter().copied().find(|candidate| {
        let found = lookup(candidate.program());
        tracing::debug!(
            program = candidate.program(),
            found = found.is_some(),
            "Probed external program"
        );
        found.is_some()
    })
}

/// Picks the capture backend, or fails with `NoSupportedBackend`
pub fn probe_backend(candidates: &[BackendKind]) -> CaptureResult<BackendKind> {
    probe_backend_with(candidates, find_executable)
}

/// Backend probe with an injectable lookup
pub fn probe_backend_with<F>(candidates: &[BackendKind], lookup: F) -> CaptureResult<BackendKind>
where
    F: Fn(&str) -> Option<PathBuf>,
{
    probe_first(candidates, lookup).ok_or_else(|| CaptureError::NoSupportedBackend {
        candidates: candidates.to_vec(),
    })
}

/// Picks an interactive selector, if any is installed
pub fn probe_selector(candidates: &[SelectorKind]) -> Option<SelectorKind> {
    probe_first(candidates, find_executable)
}

/// Picks a clipboard program, if any is installed
pub fn probe_clipboard(candidates: &[ClipboardTool]) -> Option<ClipboardTool> {
    probe_first(candidates, find_executable)
}
