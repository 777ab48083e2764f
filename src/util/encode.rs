//! Image encoding and saving
//!
//! The output format is chosen by file extension. All formats go through
//! the `image` crate's encoders, so anything saved here can be read back
//! by [`ImageBuffer::load`].
//!
//! # Format Support
//!
//! - **PNG**: lossless, the default
//! - **JPEG**: lossy, alpha is dropped before encoding
//! - **BMP** and **TIFF**: lossless, uncompressed
//! - **WebP**: lossless only in image crate v0.25
//!
//! # Examples
//!
//! ```
//! use gscreenshot::{
//!     capture::ImageBuffer,
//!     util::encode::{ImageFormat, encode_image},
//! };
//!
//! let img = ImageBuffer::from_test_pattern(64, 64);
//! let png = encode_image(&img, ImageFormat::Png).unwrap();
//! assert_eq!(&png[..4], b"\x89PNG");
//! ```

use std::{fs, io::Cursor, path::Path};

use image::{
    ImageEncoder,
    codecs::{
        bmp::BmpEncoder,
        jpeg::JpegEncoder,
        png::{CompressionType, FilterType, PngEncoder},
        tiff::TiffEncoder,
        webp::WebPEncoder,
    },
};
use serde::{Deserialize, Serialize};

use crate::{
    capture::ImageBuffer,
    error::{CaptureError, CaptureResult},
};

/// JPEG quality used for saved screenshots
pub const JPEG_QUALITY: u8 = 90;

/// File formats screenshots can be saved in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
    Bmp,
    Tiff,
    Webp,
}

impl ImageFormat {
    /// Looks up a format by file extension, case-insensitively
    ///
    /// # Examples
    ///
    /// ```
    /// use gscreenshot::util::encode::ImageFormat;
    ///
    /// assert_eq!(ImageFormat::from_extension("JPG").unwrap(), ImageFormat::Jpeg);
    /// assert!(ImageFormat::from_extension("gif").is_err());
    /// ```
    pub fn from_extension(extension: &str) -> CaptureResult<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
            "bmp" => Ok(ImageFormat::Bmp),
            "tif" | "tiff" => Ok(ImageFormat::Tiff),
            "webp" => Ok(ImageFormat::Webp),
            _ => Err(CaptureError::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }

    /// Format implied by a path's extension
    pub fn from_path(path: impl AsRef<Path>) -> CaptureResult<Self> {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        Self::from_extension(extension)
    }

    /// Canonical file extension
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Tiff => "tiff",
            ImageFormat::Webp => "webp",
        }
    }

    /// MIME type, as handed to clipboard tools
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Tiff => "image/tiff",
            ImageFormat::Webp => "image/webp",
        }
    }

    /// Whether decoding gives back the exact pixels
    pub fn is_lossless(&self) -> bool {
        !matches!(self, ImageFormat::Jpeg)
    }
}

fn encoding_failed(format: ImageFormat) -> impl FnOnce(image::ImageError) -> CaptureError {
    move |e| CaptureError::EncodingFailed {
        format: format!("{:?}", format).to_lowercase(),
        reason: e.to_string(),
    }
}

/// Encodes an image in the given format
pub fn encode_image(buffer: &ImageBuffer, format: ImageFormat) -> CaptureResult<Vec<u8>> {
    let (width, height) = buffer.dimensions();
    if width == 0 || height == 0 {
        return Err(CaptureError::InvalidParameter {
            parameter: "dimensions".to_string(),
            reason:    "Image dimensions must be > 0".to_string(),
        });
    }

    let mut output = Vec::new();
    let map_err = encoding_failed(format);

    match format {
        ImageFormat::Png => {
            let rgba = buffer.to_rgba8();
            PngEncoder::new_with_quality(
                Cursor::new(&mut output),
                CompressionType::Default,
                FilterType::Adaptive,
            )
            .write_image(rgba.as_raw(), width, height, image::ExtendedColorType::Rgba8)
            .map_err(map_err)?;
        }
        ImageFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = buffer.inner().to_rgb8();
            JpegEncoder::new_with_quality(Cursor::new(&mut output), JPEG_QUALITY)
                .write_image(rgb.as_raw(), width, height, image::ExtendedColorType::Rgb8)
                .map_err(map_err)?;
        }
        ImageFormat::Bmp => {
            let rgba = buffer.to_rgba8();
            BmpEncoder::new(&mut output)
                .write_image(rgba.as_raw(), width, height, image::ExtendedColorType::Rgba8)
                .map_err(map_err)?;
        }
        ImageFormat::Tiff => {
            let rgba = buffer.to_rgba8();
            TiffEncoder::new(Cursor::new(&mut output))
                .write_image(rgba.as_raw(), width, height, image::ExtendedColorType::Rgba8)
                .map_err(map_err)?;
        }
        ImageFormat::Webp => {
            let rgba = buffer.to_rgba8();
            WebPEncoder::new_lossless(Cursor::new(&mut output))
                .write_image(rgba.as_raw(), width, height, image::ExtendedColorType::Rgba8)
                .map_err(map_err)?;
        }
    }

    Ok(output)
}

/// Saves an image, picking the format from the path's extension
///
/// Nothing is written when the extension is not supported.
pub fn save_image(buffer: &ImageBuffer, path: impl AsRef<Path>) -> CaptureResult<ImageFormat> {
    let path = path.as_ref();
    let format = ImageFormat::from_path(path)?;
    let bytes = encode_image(buffer, format)?;

    fs::write(path, &bytes)?;
    tracing::info!(path = %path.display(), ?format, bytes = bytes.len(), "Saved screenshot");
    Ok(format)
}
