//! Image enhancement (upscaling and face restoration)
//!
//! The upload size and the zoom actually requested depend on the image's
//! longer side, see [`EnhancePlan`]. The service either returns a fully
//! enhanced image or a set of restored face patches that are pasted back
//! over the upload.

use super::{decode_response_image, elapsed_ms, new_request_id, IMAGE_FILE_STEM, INPUT_IMAGE_FIELD};
use crate::{
    client::{run_blocking, SnapEditClient},
    config::{EnhanceLimits, OutputFormat},
    endpoints::Endpoint,
    error::{Result, SnapEditError},
    image_data::EncodedImage,
    services::OutputFormatHandler,
    tracing_config::{events, spans},
    transport::MultipartForm,
    types::EnhanceResponse,
    utils::{Compositor, ImageResizer},
};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::Instrument;

/// Requested upscaling factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ZoomFactor {
    #[default]
    X2,
    X4,
}

impl ZoomFactor {
    #[must_use]
    pub fn value(self) -> u32 {
        match self {
            Self::X2 => 2,
            Self::X4 => 4,
        }
    }
}

impl TryFrom<u32> for ZoomFactor {
    type Error = SnapEditError;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            2 => Ok(Self::X2),
            4 => Ok(Self::X4),
            other => Err(SnapEditError::invalid_input(format!(
                "unsupported zoom factor {} (expected 2 or 4)",
                other
            ))),
        }
    }
}

impl std::fmt::Display for ZoomFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.value())
    }
}

/// Upload size and zoom derived from an image's longer side
///
/// | longer side          | upload side          | zoom multiplier |
/// |----------------------|----------------------|-----------------|
/// | `< max_size`         | unchanged            | 1               |
/// | `<= max_size_download` | `max_size`         | 1               |
/// | larger               | `max_size_download`  | 0.5             |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnhancePlan {
    /// Longer side of the upload
    pub target_side: u32,
    /// Zoom the caller asked for
    pub zoom: ZoomFactor,
    /// Applied to the requested zoom before it is sent
    pub zoom_multiplier: f32,
}

impl EnhancePlan {
    #[must_use]
    pub fn new(largest_side: u32, zoom: ZoomFactor, limits: &EnhanceLimits) -> Self {
        let (target_side, zoom_multiplier) = if largest_side < limits.max_size {
            (largest_side, 1.0)
        } else if largest_side <= limits.max_size_download {
            (limits.max_size, 1.0)
        } else {
            (limits.max_size_download, 0.5)
        };

        Self {
            target_side,
            zoom,
            zoom_multiplier,
        }
    }

    /// Zoom factor sent to the service
    #[must_use]
    pub fn effective_zoom(&self) -> u32 {
        let scaled = (self.zoom.value() as f32 * self.zoom_multiplier).round() as u32;
        scaled.max(1)
    }
}

/// Multipart form for the enhance endpoint
#[must_use]
pub fn enhance_form(upload: &EncodedImage, plan: &EnhancePlan, face_model_ids: &str) -> MultipartForm {
    MultipartForm::new()
        .image(INPUT_IMAGE_FIELD, IMAGE_FILE_STEM, upload)
        .text("zoom_factor", plan.effective_zoom().to_string())
        .text("face_model_ids", face_model_ids)
}

/// Build the final enhanced image from a service response
///
/// A non-empty full output image wins. Otherwise face patches are pasted over the
/// upload at their box origins; with neither, the upload is returned as PNG.
///
/// # Errors
/// - Base64 or image decoding failures
/// - A face patch without any PNG rendering
pub fn assemble_enhanced(upload: &EncodedImage, response: &EnhanceResponse) -> Result<EncodedImage> {
    let path = Endpoint::Enhance.path();
    let output = response
        .output_images
        .first()
        .filter(|payload| !payload.trim().is_empty());
    if let Some(first) = output {
        return decode_response_image(path, "output_images[0]", first);
    }

    let faces = response.faces.as_deref().unwrap_or_default();
    if faces.is_empty() {
        events::warning_with_recommendation(
            "Enhance response carried no output image and no faces",
            "returning the uploaded image unchanged",
        );
    }

    let mut canvas = upload.decode()?.to_rgba8();
    for (index, face) in faces.iter().enumerate() {
        let payload = face.png.first().ok_or_else(|| {
            SnapEditError::InvalidResponse(format!("face {} has no png rendering", index))
        })?;
        let patch = decode_response_image(path, &format!("faces[{}].png[0]", index), payload)?
            .decode()?
            .to_rgba8();
        let (x, y) = face.origin();
        tracing::trace!(face = index, x, y, "Pasting face patch");
        Compositor::overlay_at(&mut canvas, &patch, x, y);
    }

    OutputFormatHandler::encode(&DynamicImage::ImageRgba8(canvas), OutputFormat::Png, 100)
}

impl SnapEditClient {
    /// Upscale an image and restore faces
    ///
    /// Returns `Ok(None)` for an empty image without contacting the service.
    ///
    /// # Errors
    /// - Input or response image cannot be decoded
    /// - Transport or HTTP failure
    /// - Malformed face patches
    pub async fn enhance_image(
        &self,
        image: &EncodedImage,
        zoom: ZoomFactor,
    ) -> Result<Option<EncodedImage>> {
        let endpoint = Endpoint::Enhance;
        if image.is_empty() {
            events::short_circuit(endpoint.operation_name());
            return Ok(None);
        }

        let span = spans::operation(endpoint.operation_name(), &new_request_id());
        async {
            let started = instant::Instant::now();
            let (width, height) = image.dimensions()?;
            let plan = EnhancePlan::new(width.max(height), zoom, &self.config().enhance_limits);
            tracing::debug!(
                target_side = plan.target_side,
                zoom = plan.effective_zoom(),
                "Enhance plan"
            );

            let source = image.clone();
            let target_side = plan.target_side;
            let upload = run_blocking(move || {
                let _guard = spans::preprocessing((width, height), target_side).entered();
                ImageResizer::resize_encoded_to_fit(&source, target_side)
            })
            .await?;

            let form = enhance_form(&upload, &plan, &self.config().face_model_ids);
            let response: EnhanceResponse = self.post_form(endpoint, form).await?;

            let output = run_blocking(move || {
                let _guard = spans::postprocessing("assemble_enhanced").entered();
                assemble_enhanced(&upload, &response)
            })
            .await?;

            events::performance_metric(endpoint.operation_name(), elapsed_ms(started));
            Ok(Some(output))
        }
        .instrument(span)
        .await
    }
}
