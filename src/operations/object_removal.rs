//! Object removal (inpainting)
//!
//! The caller paints a brush mask over the object to erase. The service
//! returns an inpainted image and a refined mask at upload resolution;
//! [`compose_object_removal`] blends the inpainted area back into the
//! full-resolution original so untouched pixels stay byte-for-byte sharp.

use super::{
    decode_response_image, elapsed_ms, new_request_id, prepare_upload, IMAGE_FILE_STEM,
    PREVIEW_IMAGE_FIELD,
};
use crate::{
    client::{run_blocking, SnapEditClient},
    config::{ClientConfig, OutputFormat},
    endpoints::Endpoint,
    error::{Result, SnapEditError},
    image_data::EncodedImage,
    services::OutputFormatHandler,
    tracing_config::{events, spans},
    transport::MultipartForm,
    types::{ErasedRegion, ObjectRemovalResponse},
    utils::{Compositor, ImageResizer},
};
use image::{DynamicImage, GenericImageView};
use tracing::Instrument;

const MASK_FILE_STEM: &str = "mask";

/// Settings for blending an erased region back into the original
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeOptions {
    /// Gaussian sigma applied to the refined mask
    pub mask_blur_sigma: f32,
    pub format: OutputFormat,
    pub jpeg_quality: u8,
}

impl CompositeOptions {
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            mask_blur_sigma: config.mask_blur_sigma,
            format: config.object_removal_format,
            jpeg_quality: config.jpeg_quality,
        }
    }
}

impl Default for CompositeOptions {
    fn default() -> Self {
        Self::from_config(&ClientConfig::default())
    }
}

/// Multipart form for the erase and super-erase endpoints
///
/// Masks must already match the upload's dimensions.
#[must_use]
pub fn object_removal_form(
    upload: &EncodedImage,
    brush_mask: &EncodedImage,
    base_mask: Option<&EncodedImage>,
) -> MultipartForm {
    let form = MultipartForm::new()
        .image(PREVIEW_IMAGE_FIELD, IMAGE_FILE_STEM, upload)
        .image("mask_brush", MASK_FILE_STEM, brush_mask);
    match base_mask {
        Some(mask) => form.image("mask_base", MASK_FILE_STEM, mask),
        None => form,
    }
}

/// Blend an erased region into the original image
///
/// The refined mask is softened, used to cut the inpainted pixels, scaled to
/// the original's size and layered over it.
///
/// # Errors
/// - Any image cannot be decoded
/// - Encoding in the requested format fails
pub fn compose_object_removal(
    original: &EncodedImage,
    region: &ErasedRegion,
    options: &CompositeOptions,
) -> Result<EncodedImage> {
    let edited = region.image.decode()?;
    let mask = Compositor::blur_mask(&region.mask.decode()?, options.mask_blur_sigma);
    let patch = DynamicImage::ImageRgba8(Compositor::destination_in(&edited, &mask));

    let base = original.decode()?;
    let (width, height) = base.dimensions();
    let patch = ImageResizer::resize_exact(&patch, width, height);
    let composed = Compositor::over(&base, &patch);

    OutputFormatHandler::encode(
        &DynamicImage::ImageRgba8(composed),
        options.format,
        options.jpeg_quality,
    )
}

impl SnapEditClient {
    /// Erase the object under `brush_mask` and return the full-size result
    ///
    /// `base_mask` is an optional previous mask; an empty one counts as
    /// absent. The output format follows
    /// [`ClientConfig::object_removal_format`]. Returns `Ok(None)` for an
    /// empty image without contacting the service.
    ///
    /// # Errors
    /// - Empty brush mask
    /// - Any image cannot be decoded
    /// - Transport or HTTP failure
    /// - Response is missing the image or mask
    pub async fn remove_object(
        &self,
        image: &EncodedImage,
        brush_mask: &EncodedImage,
        base_mask: Option<&EncodedImage>,
    ) -> Result<Option<EncodedImage>> {
        let endpoint = self.object_removal_endpoint();
        if image.is_empty() {
            events::short_circuit(endpoint.operation_name());
            return Ok(None);
        }

        let span = spans::operation(endpoint.operation_name(), &new_request_id());
        async {
            let started = instant::Instant::now();
            let region = self
                .submit_object_removal(endpoint, image, brush_mask, base_mask)
                .await?;

            let original = image.clone();
            let options = CompositeOptions::from_config(self.config());
            let output = run_blocking(move || {
                let _guard = spans::postprocessing("compose_object_removal").entered();
                compose_object_removal(&original, &region, &options)
            })
            .await?;

            events::performance_metric(endpoint.operation_name(), elapsed_ms(started));
            Ok(Some(output))
        }
        .instrument(span)
        .await
    }

    /// Erase the object under `brush_mask` without compositing
    ///
    /// Returns the inpainted image and refined mask exactly as the service
    /// produced them, at upload resolution.
    ///
    /// # Errors
    /// See [`SnapEditClient::remove_object`].
    pub async fn erase_object_region(
        &self,
        image: &EncodedImage,
        brush_mask: &EncodedImage,
        base_mask: Option<&EncodedImage>,
    ) -> Result<Option<ErasedRegion>> {
        let endpoint = self.object_removal_endpoint();
        if image.is_empty() {
            events::short_circuit("erase_object_region");
            return Ok(None);
        }

        let span = spans::operation("erase_object_region", &new_request_id());
        async {
            let started = instant::Instant::now();
            let region = self
                .submit_object_removal(endpoint, image, brush_mask, base_mask)
                .await?;
            events::performance_metric("erase_object_region", elapsed_ms(started));
            Ok(Some(region))
        }
        .instrument(span)
        .await
    }

    fn object_removal_endpoint(&self) -> Endpoint {
        Endpoint::for_object_removal(self.config().object_removal_mode)
    }

    async fn submit_object_removal(
        &self,
        endpoint: Endpoint,
        image: &EncodedImage,
        brush_mask: &EncodedImage,
        base_mask: Option<&EncodedImage>,
    ) -> Result<ErasedRegion> {
        if brush_mask.is_empty() {
            return Err(SnapEditError::invalid_input(
                "object removal requires a non-empty brush mask",
            ));
        }

        let upload = prepare_upload(image, self.config().object_removal_max_side).await?;
        let (width, height) = upload.dimensions()?;

        let brush = brush_mask.clone();
        let base = base_mask.filter(|mask| !mask.is_empty()).cloned();
        let (brush, base) = run_blocking(move || {
            let brush = ImageResizer::resize_mask_exact(&brush, width, height)?;
            let base = base
                .map(|mask| ImageResizer::resize_mask_exact(&mask, width, height))
                .transpose()?;
            Ok((brush, base))
        })
        .await?;

        let form = object_removal_form(&upload, &brush, base.as_ref());
        let response: ObjectRemovalResponse = self.post_form(endpoint, form).await?;

        Ok(ErasedRegion {
            image: decode_response_image(endpoint.path(), "image", &response.image)?,
            mask: decode_response_image(endpoint.path(), "mask", &response.mask)?,
        })
    }
}
