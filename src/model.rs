//! Data models and type definitions for gscreenshot
//!
//! This module defines the core types used throughout the application:
//! - Capture backend and selector kinds, and the desktop session type
//! - Geometry types for selections and crops
//! - Capture requests handed in by front ends
//! - Program information for version output

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

use crate::error::CaptureError;

/// An external program that can be looked up on the search path
pub trait ExternalProgram {
    /// Executable name as resolved on `$PATH`
    fn program(&self) -> &'static str;
}

/// Supported external full-screen capture programs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// scrot
    Scrot,
    /// maim
    Maim,
    /// imlib2_grab
    Imlib2,
    /// ImageMagick `import`
    ImageMagick,
    /// grim (wlroots Wayland compositors)
    Grim,
}

impl BackendKind {
    /// All backends in X11 priority order
    pub const ALL: [BackendKind; 5] = [
        BackendKind::Scrot,
        BackendKind::Maim,
        BackendKind::Imlib2,
        BackendKind::ImageMagick,
        BackendKind::Grim,
    ];

    /// Returns the backend kind as a lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Scrot => "scrot",
            BackendKind::Maim => "maim",
            BackendKind::Imlib2 => "imlib2",
            BackendKind::ImageMagick => "imagemagick",
            BackendKind::Grim => "grim",
        }
    }

    /// Candidate order for the given session
    ///
    /// Wayland sessions try grim first since the X11 grabbers only see
    /// XWayland surfaces there.
    pub fn priority_for(session: SessionType) -> Vec<BackendKind> {
        match session {
            SessionType::Wayland => {
                let mut order = vec![BackendKind::Grim];
                order.extend(Self::ALL.iter().copied().filter(|k| *k != BackendKind::Grim));
                order
            }
            SessionType::X11 | SessionType::None => Self::ALL.to_vec(),
        }
    }
}

impl ExternalProgram for BackendKind {
    fn program(&self) -> &'static str {
        match self {
            BackendKind::Scrot => "scrot",
            BackendKind::Maim => "maim",
            BackendKind::Imlib2 => "imlib2_grab",
            BackendKind::ImageMagick => "import",
            BackendKind::Grim => "grim",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = CaptureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == wanted || k.program() == wanted)
            .ok_or_else(|| CaptureError::InvalidParameter {
                parameter: "backend".to_string(),
                reason:    format!(
                    "unknown backend '{}'; expected one of scrot, maim, imlib2, imagemagick, grim",
                    s
                ),
            })
    }
}

/// Supported external interactive region selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorKind {
    /// slop (X11)
    Slop,
    /// slurp (Wayland)
    Slurp,
}

impl SelectorKind {
    /// Returns the selector kind as a lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectorKind::Slop => "slop",
            SelectorKind::Slurp => "slurp",
        }
    }

    /// Candidate order for the given session
    pub fn priority_for(session: SessionType) -> Vec<SelectorKind> {
        match session {
            SessionType::Wayland => vec![SelectorKind::Slurp, SelectorKind::Slop],
            SessionType::X11 | SessionType::None => vec![SelectorKind::Slop, SelectorKind::Slurp],
        }
    }
}

impl ExternalProgram for SelectorKind {
    fn program(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SelectorKind {
    type Err = CaptureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "slop" => Ok(SelectorKind::Slop),
            "slurp" => Ok(SelectorKind::Slurp),
            _ => Err(CaptureError::InvalidParameter {
                parameter: "selector".to_string(),
                reason:    format!("unknown selector '{}'; expected slop, slurp or none", s),
            }),
        }
    }
}

/// Desktop session type detected from the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    /// No graphical session detected
    None,
    /// Wayland compositor
    Wayland,
    /// X11 display server
    X11,
}

impl SessionType {
    /// Returns the session type as a lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::None => "none",
            SessionType::Wayland => "wayland",
            SessionType::X11 => "x11",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A bounding box in screen pixel coordinates
///
/// Produced by an interactive selector. `right` and `bottom` are exclusive,
/// and the box may extend past the screen edges; it is clipped against the
/// captured image with [`Region::clip_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub left:   i32,
    pub top:    i32,
    pub right:  i32,
    pub bottom: i32,
}

impl Region {
    /// Creates a region from its four edges
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Creates a region from an origin and a size
    pub fn from_geometry(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x.saturating_add(width), y.saturating_add(height))
    }

    /// Intersects the region with a `width` x `height` image
    ///
    /// Returns `None` when the intersection is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use gscreenshot::model::{Rect, Region};
    ///
    /// let clipped = Region::new(-5, -5, 50, 50).clip_to(200, 150);
    /// assert_eq!(clipped, Some(Rect::new(0, 0, 50, 50)));
    /// ```
    pub fn clip_to(&self, width: u32, height: u32) -> Option<Rect> {
        let max_x = i64::from(width);
        let max_y = i64::from(height);

        let left = i64::from(self.left).clamp(0, max_x);
        let top = i64::from(self.top).clamp(0, max_y);
        let right = i64::from(self.right).clamp(0, max_x);
        let bottom = i64::from(self.bottom).clamp(0, max_y);

        if right <= left || bottom <= top {
            return None;
        }

        Some(Rect::new(
            left as u32,
            top as u32,
            (right - left) as u32,
            (bottom - top) as u32,
        ))
    }
}

/// A rectangle lying inside an image, used for cropping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x:      u32,
    pub y:      u32,
    pub width:  u32,
    pub height: u32,
}

impl Rect {
    /// Creates a new rectangle
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Pointer location in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorPosition {
    pub x: i32,
    pub y: i32,
}

impl CursorPosition {
    /// Creates a new cursor position
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// What part of the screen a capture covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    /// The whole screen
    #[default]
    Full,
    /// An interactively dragged region
    Selection,
    /// An interactively picked window
    Window,
}

/// A capture request as handed in by a front end
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CaptureRequest {
    /// Which capture operation to run
    pub mode:           CaptureMode,
    /// Countdown before the screen is grabbed
    pub delay:          Duration,
    /// Whether the pointer should appear in the result
    pub capture_cursor: bool,
}

impl CaptureRequest {
    /// Creates a request with no delay and no cursor
    pub fn new(mode: CaptureMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Sets the countdown before capture
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the countdown from a number of seconds
    ///
    /// Negative, NaN or infinite values are rejected.
    pub fn with_delay_secs(self, seconds: f64) -> Result<Self, CaptureError> {
        let delay = Duration::try_from_secs_f64(seconds).map_err(|_| {
            CaptureError::InvalidParameter {
                parameter: "delay".to_string(),
                reason:    format!("{} is not a non-negative number of seconds", seconds),
            }
        })?;
        Ok(self.with_delay(delay))
    }

    /// Requests the pointer to be included
    pub fn with_cursor(mut self, capture_cursor: bool) -> Self {
        self.capture_cursor = capture_cursor;
        self
    }
}

/// Runtime capability flags for a capture backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Capabilities {
    /// Backend draws the pointer itself
    pub supports_cursor:    bool,
    /// An interactive selector is installed
    pub supports_selection: bool,
}

/// Program information printed by `--version`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramInfo {
    pub name:         String,
    pub version:      String,
    pub description:  String,
    pub website:      String,
    pub license:      String,
    pub authors:      Vec<String>,
    /// Name of the active capture backend
    pub backend:      String,
    pub capabilities: Capabilities,
}

impl ProgramInfo {
    /// Builds program info from the crate metadata and the active backend
    pub fn new(backend: &str, capabilities: Capabilities) -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: env!("CARGO_PKG_DESCRIPTION").to_string(),
            website: env!("CARGO_PKG_REPOSITORY").to_string(),
            license: env!("CARGO_PKG_LICENSE").to_string(),
            authors: env!("CARGO_PKG_AUTHORS")
                .split(':')
                .filter(|a| !a.is_empty())
                .map(str::to_string)
                .collect(),
            backend: backend.to_string(),
            capabilities,
        }
    }
}
