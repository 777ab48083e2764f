//! Session detection for gscreenshot
//!
//! Determines whether the process runs under Wayland, X11 or no graphical
//! session at all. The result only orders the backend and selector
//! candidates; the probe still decides what is actually installed.

use std::env;

use crate::model::SessionType;

/// Detects the current desktop session type
///
/// Checks `$WAYLAND_DISPLAY` first, then `$DISPLAY`. Empty values are
/// treated as unset.
///
/// # Examples
///
/// ```
/// use gscreenshot::util::detect::detect_session;
///
/// let session = detect_session();
/// println!("Running in a {} session", session);
/// ```
pub fn detect_session() -> SessionType {
    detect_session_with_env(|key| env::var(key).ok())
}

/// Session detection with an injectable environment provider
pub fn detect_session_with_env<F>(env_provider: F) -> SessionType
where
    F: Fn(&str) -> Option<String>,
{
    let is_set = |key: &str| env_provider(key).is_some_and(|value| !value.is_empty());

    if is_set("WAYLAND_DISPLAY") {
        return SessionType::Wayland;
    }

    if is_set("DISPLAY") {
        return SessionType::X11;
    }

    SessionType::None
}
