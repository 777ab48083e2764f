//! Environment-driven configuration
//!
//! gscreenshot has no configuration file. Front ends pass per-capture
//! options directly; the few process-wide knobs are read from the
//! environment:
//!
//! | Variable | Meaning |
//! |---|---|
//! | `GSCREENSHOT_BACKEND` | Force a backend (`scrot`, `maim`, `imlib2`, `imagemagick`, `grim`) |
//! | `GSCREENSHOT_SELECTOR` | Force a selector (`slop`, `slurp`) or `none` |
//! | `GSCREENSHOT_CURSOR_IMAGE` | PNG used as the synthetic cursor |
//! | `GSCREENSHOT_SAVE_DIR` | Default directory for saved screenshots |

use std::{env, path::PathBuf};

use crate::{
    error::CaptureResult,
    model::{BackendKind, SelectorKind, SessionType},
    util::detect::detect_session_with_env,
};

pub const BACKEND_VAR: &str = "GSCREENSHOT_BACKEND";
pub const SELECTOR_VAR: &str = "GSCREENSHOT_SELECTOR";
pub const CURSOR_IMAGE_VAR: &str = "GSCREENSHOT_CURSOR_IMAGE";
pub const SAVE_DIR_VAR: &str = "GSCREENSHOT_SAVE_DIR";

/// How the interactive selector is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectorChoice {
    /// Probe the session's preferred selectors
    #[default]
    Auto,
    /// Use only this selector
    Only(SelectorKind),
    /// Never run a selector; selection captures become full captures
    Disabled,
}

/// Process-wide settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Detected desktop session
    pub session:      SessionType,
    /// Backend forced by the user, still subject to probing
    pub backend:      Option<BackendKind>,
    pub selector:     SelectorChoice,
    /// Replacement glyph for the synthetic cursor
    pub cursor_image: Option<PathBuf>,
    pub save_dir:     Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session:      SessionType::None,
            backend:      None,
            selector:     SelectorChoice::Auto,
            cursor_image: None,
            save_dir:     None,
        }
    }
}

impl Config {
    /// Reads the configuration from the process environment
    pub fn from_env() -> CaptureResult<Self> {
        Self::from_env_with(|key| env::var(key).ok())
    }

    /// Reads the configuration through an injectable environment provider
    pub fn from_env_with<F>(env_provider: F) -> CaptureResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| env_provider(key).filter(|value| !value.trim().is_empty());

        let backend = non_empty(BACKEND_VAR)
            .map(|value| value.parse::<BackendKind>())
            .transpose()?;

        let selector = match non_empty(SELECTOR_VAR) {
            None => SelectorChoice::Auto,
            Some(value) if value.trim().eq_ignore_ascii_case("none") => SelectorChoice::Disabled,
            Some(value) => SelectorChoice::Only(value.parse()?),
        };

        Ok(Self {
            session: detect_session_with_env(&env_provider),
            backend,
            selector,
            cursor_image: non_empty(CURSOR_IMAGE_VAR).map(PathBuf::from),
            save_dir: non_empty(SAVE_DIR_VAR).map(PathBuf::from),
        })
    }

    /// Backend candidates in probe order
    pub fn backend_candidates(&self) -> Vec<BackendKind> {
        match self.backend {
            Some(kind) => vec![kind],
            None => BackendKind::priority_for(self.session),
        }
    }

    /// Selector candidates in probe order
    pub fn selector_candidates(&self) -> Vec<SelectorKind> {
        match self.selector {
            SelectorChoice::Auto => SelectorKind::priority_for(self.session),
            SelectorChoice::Only(kind) => vec![kind],
            SelectorChoice::Disabled => Vec::new(),
        }
    }
}
