//! Alpha compositing of masks and patches

use super::resize::ImageResizer;
use image::{imageops, DynamicImage, GenericImageView, GrayImage, Luma, RgbaImage};

/// Shared compositing utilities
pub struct Compositor;

impl Compositor {
    /// Transparency map of a mask, resampled to `width` x `height`
    ///
    /// Masks with an alpha channel contribute their alpha; opaque masks
    /// contribute their luminance.
    #[must_use]
    pub fn mask_alpha(mask: &DynamicImage, width: u32, height: u32) -> GrayImage {
        let resized = ImageResizer::resize_exact(mask, width, height);
        if resized.color().has_alpha() {
            let luma_alpha = resized.to_luma_alpha8();
            GrayImage::from_fn(width, height, |x, y| Luma([luma_alpha.get_pixel(x, y)[1]]))
        } else {
            resized.to_luma8()
        }
    }

    /// Destination-in: keep base pixels only where the mask is opaque
    ///
    /// RGB is untouched; `alpha = base_alpha * mask_alpha / 255`.
    #[must_use]
    pub fn destination_in(base: &DynamicImage, mask: &DynamicImage) -> RgbaImage {
        let (width, height) = base.dimensions();
        let alpha = Self::mask_alpha(mask, width, height);
        let mut output = base.to_rgba8();

        for (pixel, coverage) in output.pixels_mut().zip(alpha.pixels()) {
            let combined = (u16::from(pixel[3]) * u16::from(coverage[0]) + 127) / 255;
            pixel[3] = combined as u8;
        }

        output
    }

    /// Source-over: layer `overlay` on top of `base`, both at the origin
    #[must_use]
    pub fn over(base: &DynamicImage, overlay: &DynamicImage) -> RgbaImage {
        let mut output = base.to_rgba8();
        Self::overlay_at(&mut output, &overlay.to_rgba8(), 0, 0);
        output
    }

    /// Source-over of `patch` at `(x, y)`, clipped to the canvas
    pub fn overlay_at(canvas: &mut RgbaImage, patch: &RgbaImage, x: i64, y: i64) {
        imageops::overlay(canvas, patch, x, y);
    }

    /// Gaussian blur used to soften refined masks (`sigma <= 0` is a no-op)
    #[must_use]
    pub fn blur_mask(mask: &DynamicImage, sigma: f32) -> DynamicImage {
        if sigma <= 0.0 {
            return mask.clone();
        }
        mask.blur(sigma)
    }
}
