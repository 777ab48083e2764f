//! Image buffer wrapper for screenshot data
//!
//! This module provides an `ImageBuffer` wrapper around `image::DynamicImage`
//! with the operations the capture pipeline needs: loading a backend's output
//! file, cropping to a selection, and stamping a cursor glyph.
//!
//! # Examples
//!
//! ```
//! use gscreenshot::{capture::ImageBuffer, model::Rect};
//!
//! let img = ImageBuffer::from_test_pattern(200, 150);
//!
//! let cropped = img.crop(Rect::new(10, 10, 100, 50)).unwrap();
//! assert_eq!(cropped.dimensions(), (100, 50));
//! ```

use std::path::Path;

use image::{GenericImageView, RgbaImage};

use crate::{
    error::{CaptureError, CaptureResult},
    model::Rect,
};

/// Wrapper around `image::DynamicImage`
///
/// All transformation methods return new `ImageBuffer` instances, leaving
/// the original unchanged.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageBuffer {
    inner: image::DynamicImage,
}

impl ImageBuffer {
    /// Creates a new ImageBuffer from a DynamicImage
    pub fn new(image: image::DynamicImage) -> Self {
        Self { inner: image }
    }

    /// Decodes an image file, guessing the format from its contents
    ///
    /// Missing, truncated and unrecognised files all map to an error;
    /// nothing here panics on bad input.
    pub fn load(path: impl AsRef<Path>) -> CaptureResult<Self> {
        let path = path.as_ref();
        let reader = image::ImageReader::open(path)
            .map_err(CaptureError::IoError)?
            .with_guessed_format()
            .map_err(CaptureError::IoError)?;

        let image = reader.decode().map_err(|e| {
            CaptureError::ImageError(format!("failed to decode {}: {}", path.display(), e))
        })?;

        Ok(Self::new(image))
    }

    /// Crops the image to the specified rectangle
    ///
    /// The rectangle must lie within the image; callers holding a selection
    /// that may spill over the edges clip it first with
    /// [`Region::clip_to`](crate::model::Region::clip_to).
    pub fn crop(&self, rect: Rect) -> CaptureResult<Self> {
        let (img_width, img_height) = self.dimensions();

        if rect.width == 0 || rect.height == 0 {
            return Err(CaptureError::InvalidParameter {
                parameter: "region".to_string(),
                reason:    format!("Region {}x{} is empty", rect.width, rect.height),
            });
        }

        let fits_x = rect.x.checked_add(rect.width).is_some_and(|r| r <= img_width);
        let fits_y = rect.y.checked_add(rect.height).is_some_and(|b| b <= img_height);
        if !fits_x || !fits_y {
            return Err(CaptureError::InvalidParameter {
                parameter: "region".to_string(),
                reason:    format!(
                    "Region ({}x{} at {},{}) extends beyond image bounds ({}x{})",
                    rect.width, rect.height, rect.x, rect.y, img_width, img_height
                ),
            });
        }

        Ok(Self::new(
            self.inner.crop_imm(rect.x, rect.y, rect.width, rect.height),
        ))
    }

    /// Alpha-blends `overlay` onto a copy of the image at (`x`, `y`)
    ///
    /// The overlay's alpha channel acts as the paste mask. Offsets may be
    /// negative or past the edges; the overlay is clipped to the image.
    pub fn overlay(&self, overlay: &RgbaImage, x: i64, y: i64) -> Self {
        let mut base = self.inner.clone();
        image::imageops::overlay(&mut base, overlay, x, y);
        Self::new(base)
    }

    /// Returns the dimensions of the image as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        self.inner.dimensions()
    }

    /// Returns the image width in pixels
    pub fn width(&self) -> u32 {
        self.dimensions().0
    }

    /// Returns the image height in pixels
    pub fn height(&self) -> u32 {
        self.dimensions().1
    }

    /// Converts the image to RGBA8 format
    pub fn to_rgba8(&self) -> RgbaImage {
        self.inner.to_rgba8()
    }

    /// Creates a test pattern image with the specified dimensions
    ///
    /// Red grows with x and green with y, so every pixel of patterns up to
    /// 256x256 is distinct and crop offsets can be checked exactly.
    pub fn from_test_pattern(width: u32, height: u32) -> Self {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            image::Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
        });

        Self::new(image::DynamicImage::ImageRgba8(img))
    }

    /// Returns a reference to the inner DynamicImage
    pub fn inner(&self) -> &image::DynamicImage {
        &self.inner
    }

    /// Consumes self and returns the inner DynamicImage
    pub fn into_inner(self) -> image::DynamicImage {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_dimensions() {
        let img = ImageBuffer::from_test_pattern(1920, 1080);
        assert_eq!(img.dimensions(), (1920, 1080));
        assert_eq!(img.width(), 1920);
        assert_eq!(img.height(), 1080);
    }

    #[test]
    fn test_crop_keeps_offset() {
        let img = ImageBuffer::from_test_pattern(200, 150);
        let cropped = img.crop(Rect::new(10, 10, 100, 50)).unwrap();

        assert_eq!(cropped.dimensions(), (100, 50));
        let rgba = cropped.to_rgba8();
        assert_eq!(rgba.get_pixel(0, 0).0, [10, 10, 128, 255]);
        assert_eq!(rgba.get_pixel(99, 49).0, [109, 59, 128, 255]);
    }

    #[test]
    fn test_crop_boundary_check() {
        let img = ImageBuffer::from_test_pattern(200, 150);

        // Exact image edges succeed
        assert_eq!(img.crop(Rect::new(0, 0, 200, 150)).unwrap().dimensions(), (200, 150));
        assert_eq!(img.crop(Rect::new(150, 100, 50, 50)).unwrap().dimensions(), (50, 50));
    }

    #[test]
    fn test_crop_out_of_bounds() {
        let img = ImageBuffer::from_test_pattern(200, 150);

        assert!(img.crop(Rect::new(250, 10, 10, 10)).is_err());
        assert!(img.crop(Rect::new(190, 10, 20, 10)).is_err());
        assert!(img.crop(Rect::new(10, 10, 10, 1000)).is_err());
        assert!(img.crop(Rect::new(10, 10, 0, 10)).is_err());
        assert!(img.crop(Rect::new(u32::MAX, 0, 2, 2)).is_err());
    }

    #[test]
    fn test_overlay_respects_alpha() {
        let img = ImageBuffer::from_test_pattern(20, 20);

        let mut glyph = RgbaImage::new(2, 1);
        glyph.put_pixel(0, 0, image::Rgba([255, 255, 255, 255]));
        glyph.put_pixel(1, 0, image::Rgba([255, 255, 255, 0]));

        let stamped = img.overlay(&glyph, 5, 5).to_rgba8();
        assert_eq!(stamped.get_pixel(5, 5).0, [255, 255, 255, 255]);
        // Transparent glyph pixel leaves the screenshot untouched
        assert_eq!(stamped.get_pixel(6, 5).0, [6, 5, 128, 255]);
        // Original untouched
        assert_eq!(img.to_rgba8().get_pixel(5, 5).0, [5, 5, 128, 255]);
    }

    #[test]
    fn test_overlay_clips_negative_offsets() {
        let img = ImageBuffer::from_test_pattern(10, 10);
        let glyph = RgbaImage::from_pixel(4, 4, image::Rgba([0, 0, 0, 255]));

        let stamped = img.overlay(&glyph, -2, -2);
        assert_eq!(stamped.dimensions(), (10, 10));
        let rgba = stamped.to_rgba8();
        assert_eq!(rgba.get_pixel(1, 1).0, [0, 0, 0, 255]);
        assert_eq!(rgba.get_pixel(2, 2).0, [2, 2, 128, 255]);
    }

    #[test]
    fn test_load_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        ImageBuffer::from_test_pattern(32, 16)
            .inner()
            .save(&path)
            .unwrap();

        let loaded = ImageBuffer::load(&path).unwrap();
        assert_eq!(loaded.dimensions(), (32, 16));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ImageBuffer::load(dir.path().join("missing.png")).unwrap_err();
        assert!(matches!(err, CaptureError::IoError(_)));
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.png");
        fs::write(&path, b"definitely not an image").unwrap();

        let err = ImageBuffer::load(&path).unwrap_err();
        assert!(matches!(err, CaptureError::ImageError(_)));
    }

    #[test]
    fn test_into_inner() {
        let img = ImageBuffer::from_test_pattern(100, 100);
        assert_eq!(img.into_inner().dimensions(), (100, 100));
    }
}
