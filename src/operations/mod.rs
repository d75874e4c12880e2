//! The four SnapEdit operations
//!
//! Each operation follows the same shape:
//!
//! 1. An empty input image short-circuits to `Ok(None)` without a request
//! 2. The upload is bounded to the endpoint's size limit
//! 3. The multipart form is posted and the JSON response decoded
//! 4. Returned masks or patches are composited locally
//!
//! Form construction and compositing are exposed as plain functions so they
//! can be exercised without a transport.

pub mod background;
pub mod detection;
pub mod enhance;
pub mod object_removal;

pub use background::{apply_background_mask, background_removal_form};
pub use detection::detection_form;
pub use enhance::{assemble_enhanced, enhance_form, EnhancePlan, ZoomFactor};
pub use object_removal::{compose_object_removal, object_removal_form, CompositeOptions};

use crate::{
    client::run_blocking,
    error::{Result, SnapEditError},
    image_data::EncodedImage,
    tracing_config::spans,
    utils::ImageResizer,
};

/// Form field carrying the main image for background removal and enhance
pub const INPUT_IMAGE_FIELD: &str = "input_image";
/// Form field carrying the main image for detection and object removal
pub const PREVIEW_IMAGE_FIELD: &str = "original_preview_image";

/// File name stem of uploaded images
const IMAGE_FILE_STEM: &str = "image";

/// Fresh identifier attached to an operation span
pub(crate) fn new_request_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Milliseconds elapsed since `started`
pub(crate) fn elapsed_ms(started: instant::Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Decode a base64 image field of a service response
///
/// An empty field is a malformed response, never an empty result.
pub(crate) fn decode_response_image(path: &str, field: &str, payload: &str) -> Result<EncodedImage> {
    let image = EncodedImage::from_base64(payload, "image/png")?;
    if image.is_empty() {
        return Err(SnapEditError::invalid_response(
            path,
            format!("field `{}` carries no image data", field),
        ));
    }
    Ok(image)
}

/// Bound `image` to `bound` on its longer side, off the async runtime
pub(crate) async fn prepare_upload(image: &EncodedImage, bound: u32) -> Result<EncodedImage> {
    let dimensions = image.dimensions()?;
    let source = image.clone();
    run_blocking(move || {
        let _guard = spans::preprocessing(dimensions, bound).entered();
        ImageResizer::resize_encoded_to_fit(&source, bound)
    })
    .await
}


#[cfg(test)]
mod tests {
    use super::*;
    use test_support::jpeg;

    #[tokio::test]
    async fn test_prepare_upload_bounds_longer_side() {
        let upload = prepare_upload(&jpeg(300, 150), 100).await.unwrap();
        assert_eq!(upload.dimensions().unwrap(), (100, 50));
        assert_eq!(upload.mime_type(), "image/jpeg");
    }

    #[test]
    fn test_empty_response_image_is_invalid_response() {
        for payload in ["", "   ", "data:image/png;base64,"] {
            let err = decode_response_image("/api/x", "mask", payload).unwrap_err();
            assert!(
                matches!(err, SnapEditError::InvalidResponse(ref msg) if msg.contains("mask")),
                "payload {:?} gave {:?}",
                payload,
                err
            );
        }

        let image = test_support::png(3, 2, [0, 0, 0, 255]);
        let decoded = decode_response_image("/api/x", "mask", &image.to_base64()).unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn test_request_ids_are_unique() {
        assert_ne!(new_request_id(), new_request_id());
    }
}
