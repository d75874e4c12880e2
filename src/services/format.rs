//! Output format handling service
//!
//! Keeps encoder selection and container quirks (JPEG has no alpha) out of
//! the operation code.

use crate::{config::OutputFormat, error::Result, image_data::EncodedImage};
use image::{codecs::jpeg::JpegEncoder, DynamicImage, ImageFormat};
use std::io::Cursor;

/// Service for encoding images in a chosen output format
pub struct OutputFormatHandler;

impl OutputFormatHandler {
    /// Encode an image in the given format
    ///
    /// JPEG output drops the alpha channel; `quality` only applies to JPEG.
    ///
    /// # Errors
    /// - Encoder failure (e.g. WebP without the `webp-support` feature)
    pub fn encode(image: &DynamicImage, format: OutputFormat, quality: u8) -> Result<EncodedImage> {
        match format {
            OutputFormat::Png => EncodedImage::from_image(image, ImageFormat::Png),
            OutputFormat::Jpeg => {
                let mut buffer = Vec::new();
                let rgb_image = image.to_rgb8();
                {
                    let mut cursor = Cursor::new(&mut buffer);
                    let mut encoder = JpegEncoder::new_with_quality(&mut cursor, quality.min(100));
                    encoder.encode_image(&rgb_image)?;
                }
                Ok(EncodedImage::new(buffer, Self::mime_type(format)))
            },
            OutputFormat::WebP => {
                let rgba_image = DynamicImage::ImageRgba8(image.to_rgba8());
                EncodedImage::from_image(&rgba_image, ImageFormat::WebP)
            },
        }
    }

    /// Format to re-encode an upload in, following its source container
    ///
    /// Sources we cannot encode (GIF, TIFF, unknown) fall back to PNG.
    #[must_use]
    pub fn upload_format_for(source: Option<ImageFormat>) -> OutputFormat {
        match source {
            Some(ImageFormat::Jpeg) => OutputFormat::Jpeg,
            Some(ImageFormat::WebP) if cfg!(feature = "webp-support") => OutputFormat::WebP,
            _ => OutputFormat::Png,
        }
    }

    /// Mime type produced for a format
    #[must_use]
    pub fn mime_type(format: OutputFormat) -> &'static str {
        match format {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::WebP => "image/webp",
        }
    }
}
