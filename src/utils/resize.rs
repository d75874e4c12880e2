//! Resize helpers used to prepare uploads
//!
//! "Fit inside" scales an image so its longer side equals the bound while
//! keeping the aspect ratio. Smaller images are scaled up as well, matching
//! what the service's own web client sends.

use crate::{
    error::{Result, SnapEditError},
    image_data::EncodedImage,
    services::OutputFormatHandler,
};
use image::{imageops::FilterType, DynamicImage, GenericImageView};

/// JPEG quality used when re-encoding JPEG uploads
const UPLOAD_JPEG_QUALITY: u8 = 90;

/// Resampling filter for all resizes
const RESIZE_FILTER: FilterType = FilterType::Lanczos3;

/// Shared resize utilities
pub struct ImageResizer;

impl ImageResizer {
    /// Dimensions of `(width, height)` scaled to fit inside a `bound` square
    ///
    /// The longer side becomes `bound`, the shorter one is rounded to the
    /// nearest pixel and never drops below 1.
    ///
    /// # Examples
    /// ```rust
    /// use snapedit::utils::ImageResizer;
    ///
    /// assert_eq!(ImageResizer::fit_inside((4000, 3000), 1280), (1280, 960));
    /// assert_eq!(ImageResizer::fit_inside((300, 600), 1200), (600, 1200));
    /// ```
    #[must_use]
    pub fn fit_inside(dimensions: (u32, u32), bound: u32) -> (u32, u32) {
        let (width, height) = dimensions;
        let bound = bound.max(1);
        if width == 0 || height == 0 {
            return (bound, bound);
        }

        let scale_side = |side: u32, longest: u32| -> u32 {
            let scaled = (u64::from(side) * u64::from(bound) + u64::from(longest) / 2)
                / u64::from(longest);
            u32::try_from(scaled).unwrap_or(bound).clamp(1, bound)
        };

        if width >= height {
            (bound, scale_side(height, width))
        } else {
            (scale_side(width, height), bound)
        }
    }

    /// Resize a decoded image to fit inside `bound`
    #[must_use]
    pub fn resize_to_fit(image: &DynamicImage, bound: u32) -> DynamicImage {
        let (width, height) = Self::fit_inside(image.dimensions(), bound);
        Self::resize_exact(image, width, height)
    }

    /// Resize a decoded image to exact dimensions, ignoring aspect ratio
    #[must_use]
    pub fn resize_exact(image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        if image.dimensions() == (width, height) {
            return image.clone();
        }
        image.resize_exact(width, height, RESIZE_FILTER)
    }

    /// Prepare an upload: fit inside `bound`, keep the source container
    ///
    /// Bytes pass through untouched when the dimensions already match.
    ///
    /// # Errors
    /// - Source cannot be decoded
    /// - Re-encoding fails
    pub fn resize_encoded_to_fit(source: &EncodedImage, bound: u32) -> Result<EncodedImage> {
        let dimensions = source.dimensions()?;
        let target = Self::fit_inside(dimensions, bound);
        if target == dimensions && source.format().is_some() {
            tracing::debug!(
                width = dimensions.0,
                height = dimensions.1,
                "Upload already at target size"
            );
            return Ok(source.clone());
        }

        let decoded = source.decode()?;
        let resized = Self::resize_to_fit(&decoded, bound);
        let format = OutputFormatHandler::upload_format_for(source.format());
        OutputFormatHandler::encode(&resized, format, UPLOAD_JPEG_QUALITY)
    }

    /// Resize a mask to exact dimensions and encode it as PNG
    ///
    /// # Errors
    /// - Empty or undecodable mask
    pub fn resize_mask_exact(mask: &EncodedImage, width: u32, height: u32) -> Result<EncodedImage> {
        if width == 0 || height == 0 {
            return Err(SnapEditError::invalid_input(format!(
                "cannot resize mask to {}x{}",
                width, height
            )));
        }
        let decoded = mask.decode()?;
        let resized = Self::resize_exact(&decoded, width, height);
        OutputFormatHandler::encode(&resized, crate::config::OutputFormat::Png, 100)
    }
}
