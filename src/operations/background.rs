//! Background removal
//!
//! The service returns a foreground mask at upload resolution. The mask is
//! applied to the caller's original image, so the output keeps the original
//! dimensions regardless of the upload bound.

use super::{
    decode_response_image, elapsed_ms, new_request_id, prepare_upload, IMAGE_FILE_STEM,
    INPUT_IMAGE_FIELD,
};
use crate::{
    client::{run_blocking, SnapEditClient},
    config::OutputFormat,
    endpoints::Endpoint,
    error::Result,
    image_data::EncodedImage,
    services::OutputFormatHandler,
    tracing_config::{events, spans},
    transport::MultipartForm,
    types::BackgroundRemovalResponse,
    utils::Compositor,
};
use image::DynamicImage;
use tracing::Instrument;

/// Multipart form for the background removal endpoint
#[must_use]
pub fn background_removal_form(upload: &EncodedImage) -> MultipartForm {
    MultipartForm::new().image(INPUT_IMAGE_FIELD, IMAGE_FILE_STEM, upload)
}

/// Cut `original` with a foreground mask and encode the result as PNG
///
/// The mask is stretched to the original's dimensions.
///
/// # Errors
/// - Either image cannot be decoded
pub fn apply_background_mask(original: &EncodedImage, mask: &EncodedImage) -> Result<EncodedImage> {
    let base = original.decode()?;
    let mask = mask.decode()?;
    let cutout = Compositor::destination_in(&base, &mask);
    OutputFormatHandler::encode(&DynamicImage::ImageRgba8(cutout), OutputFormat::Png, 100)
}

impl SnapEditClient {
    /// Remove the background of an image
    ///
    /// Returns a PNG the size of `image`, with the background transparent.
    /// Returns `Ok(None)` for an empty image without contacting the service.
    ///
    /// # Errors
    /// - Input or response image cannot be decoded
    /// - Transport or HTTP failure
    /// - Response is missing the `output` mask
    pub async fn remove_background(&self, image: &EncodedImage) -> Result<Option<EncodedImage>> {
        let endpoint = Endpoint::BackgroundRemoval;
        if image.is_empty() {
            events::short_circuit(endpoint.operation_name());
            return Ok(None);
        }

        let span = spans::operation(endpoint.operation_name(), &new_request_id());
        async {
            let started = instant::Instant::now();
            let upload =
                prepare_upload(image, self.config().background_removal_max_side).await?;

            let response: BackgroundRemovalResponse = self
                .post_form(endpoint, background_removal_form(&upload))
                .await?;
            let mask = decode_response_image(endpoint.path(), "output", &response.output)?;

            let original = image.clone();
            let output = run_blocking(move || {
                let _guard = spans::postprocessing("apply_background_mask").entered();
                apply_background_mask(&original, &mask)
            })
            .await?;

            events::performance_metric(endpoint.operation_name(), elapsed_ms(started));
            Ok(Some(output))
        }
        .instrument(span)
        .await
    }
}
