//! Synthetic cursor stamping
//!
//! Backends that cannot draw the pointer get a cursor glyph pasted onto
//! their output instead. The glyph is shrunk relative to a 2000px reference
//! screen (never below 0.3x, never enlarged) and blended using its own
//! alpha channel as the paste mask.
//!
//! The pointer is queried when stamping, not when grabbing, so a pointer
//! that moves in between is drawn where it ended up. Stamping is
//! best-effort: without a pointer position the image is returned as is.

use std::{path::Path, sync::Arc};

use image::{RgbaImage, imageops::FilterType};

use super::{CursorLocator, ImageBuffer};
use crate::{
    error::{CaptureError, CaptureResult},
    model::CursorPosition,
};

/// Screen size at which the glyph is drawn at its natural size
pub const REFERENCE_SIZE: f32 = 2000.0;

/// Smallest scale factor applied to the glyph
pub const MIN_SCALE: f32 = 0.3;

/// Built-in arrow, hotspot at the top-left pixel.
///
/// `X` is outline, `o` is fill, space is transparent.
const ARROW: [&str; 19] = [
    "X           ",
    "XX          ",
    "XoX         ",
    "XooX        ",
    "XoooX       ",
    "XooooX      ",
    "XoooooX     ",
    "XooooooX    ",
    "XoooooooX   ",
    "XooooooooX  ",
    "XoooooooooX ",
    "XooooooXXXXX",
    "XoooXooX    ",
    "XooXXooX    ",
    "XoX  XooX   ",
    "XX   XooX   ",
    "X     XooX  ",
    "      XooX  ",
    "       XX   ",
];

/// Upscale applied to the built-in arrow bitmap
const ARROW_PIXEL_SIZE: u32 = 2;

/// Renders the built-in arrow glyph
pub fn default_cursor_glyph() -> RgbaImage {
    let width = ARROW[0].len() as u32;
    let height = ARROW.len() as u32;

    let bitmap = RgbaImage::from_fn(width, height, |x, y| {
        match ARROW[y as usize].as_bytes()[x as usize] {
            b'X' => image::Rgba([0, 0, 0, 255]),
            b'o' => image::Rgba([255, 255, 255, 255]),
            _ => image::Rgba([0, 0, 0, 0]),
        }
    });

    image::imageops::resize(
        &bitmap,
        width * ARROW_PIXEL_SIZE,
        height * ARROW_PIXEL_SIZE,
        FilterType::Nearest,
    )
}

/// Loads a cursor glyph from an image file
pub fn load_cursor_glyph(path: impl AsRef<Path>) -> CaptureResult<RgbaImage> {
    Ok(ImageBuffer::load(path)?.to_rgba8())
}

/// Glyph scale factor for a screenshot of the given size
///
/// # Examples
///
/// ```
/// use gscreenshot::capture::cursor::cursor_scale;
///
/// assert_eq!(cursor_scale(4000, 4000), 2.0);
/// assert_eq!(cursor_scale(200, 150), 0.3);
/// ```
pub fn cursor_scale(width: u32, height: u32) -> f32 {
    let by_width = (width as f32 / REFERENCE_SIZE).max(MIN_SCALE);
    let by_height = (height as f32 / REFERENCE_SIZE).max(MIN_SCALE);
    by_width.min(by_height)
}

/// Shrinks the glyph by `factor`, keeping its aspect ratio
///
/// Factors of 1.0 and above return the glyph unchanged.
pub fn scale_glyph(glyph: &RgbaImage, factor: f32) -> RgbaImage {
    if factor >= 1.0 {
        return glyph.clone();
    }

    let width = ((glyph.width() as f32 * factor).round() as u32).max(1);
    let height = ((glyph.height() as f32 * factor).round() as u32).max(1);
    image::imageops::resize(glyph, width, height, FilterType::Triangle)
}

/// Stamps a cursor glyph onto screenshots
#[derive(Clone)]
pub struct CursorCompositor {
    locator: Arc<dyn CursorLocator>,
    glyph:   RgbaImage,
}

impl CursorCompositor {
    /// Creates a compositor using the built-in arrow
    pub fn new(locator: Arc<dyn CursorLocator>) -> Self {
        Self::with_glyph(locator, default_cursor_glyph())
    }

    /// Creates a compositor with a custom glyph
    pub fn with_glyph(locator: Arc<dyn CursorLocator>, glyph: RgbaImage) -> Self {
        Self { locator, glyph }
    }

    /// The unscaled glyph
    pub fn glyph(&self) -> &RgbaImage {
        &self.glyph
    }

    /// Stamps the cursor onto `image`
    ///
    /// `origin` is the screen position of the image's top-left pixel, so a
    /// cropped capture gets the cursor at the right place. When the pointer
    /// cannot be queried the image comes back unchanged.
    pub fn composite(&self, image: &ImageBuffer, origin: (u32, u32)) -> ImageBuffer {
        let position = match self.locator.cursor_position() {
            Ok(position) => position,
            Err(e) => {
                tracing::warn!("Not drawing cursor: {}", e);
                return image.clone();
            }
        };

        let (width, height) = image.dimensions();
        let glyph = scale_glyph(&self.glyph, cursor_scale(width, height));
        let x = i64::from(position.x) - i64::from(origin.0);
        let y = i64::from(position.y) - i64::from(origin.1);

        tracing::debug!(x, y, glyph_width = glyph.width(), "Stamping cursor");
        image.overlay(&glyph, x, y)
    }
}

impl std::fmt::Debug for CursorCompositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CursorCompositor")
            .field("glyph", &self.glyph.dimensions())
            .finish()
    }
}

/// Locator that never knows where the pointer is
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCursorLocator;

impl CursorLocator for NoCursorLocator {
    fn cursor_position(&self) -> CaptureResult<CursorPosition> {
        Err(CaptureError::CursorQueryUnavailable {
            reason: "pointer queries are not supported on this platform".to_string(),
        })
    }
}

/// Pointer query against the X server named by `$DISPLAY`
///
/// Works under XWayland too, where it reports the pointer only while it is
/// over an X11 surface.
#[cfg(target_os = "linux")]
#[derive(Debug, Clone, Copy, Default)]
pub struct X11CursorLocator;

#[cfg(target_os = "linux")]
impl CursorLocator for X11CursorLocator {
    fn cursor_position(&self) -> CaptureResult<CursorPosition> {
        use x11rb::{connection::Connection as _, protocol::xproto::ConnectionExt as _};

        let unavailable = |reason: String| CaptureError::CursorQueryUnavailable { reason };

        let (conn, screen_idx) = x11rb::connect(None)
            .map_err(|e| unavailable(format!("cannot connect to X server: {}", e)))?;

        let root = conn
            .setup()
            .roots
            .get(screen_idx)
            .map(|screen| screen.root)
            .ok_or_else(|| unavailable(format!("X screen {} does not exist", screen_idx)))?;

        let reply = conn
            .query_pointer(root)
            .map_err(|e| unavailable(e.to_string()))?
            .reply()
            .map_err(|e| unavailable(e.to_string()))?;

        Ok(CursorPosition::new(
            i32::from(reply.root_x),
            i32::from(reply.root_y),
        ))
    }
}

/// The platform's pointer query
pub fn default_locator() -> Arc<dyn CursorLocator> {
    #[cfg(target_os = "linux")]
    {
        Arc::new(X11CursorLocator)
    }

    #[cfg(not(target_os = "linux"))]
    {
        Arc::new(NoCursorLocator)
    }
}
