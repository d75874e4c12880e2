//! Object detection for removal suggestions

use super::{elapsed_ms, new_request_id, prepare_upload, IMAGE_FILE_STEM, PREVIEW_IMAGE_FIELD};
use crate::{
    client::SnapEditClient,
    endpoints::Endpoint,
    error::Result,
    image_data::EncodedImage,
    tracing_config::{events, spans},
    transport::MultipartForm,
    types::DetectionResponse,
};
use tracing::Instrument;

/// Multipart form for the auto-suggest endpoint
#[must_use]
pub fn detection_form(upload: &EncodedImage) -> MultipartForm {
    MultipartForm::new().image(PREVIEW_IMAGE_FIELD, IMAGE_FILE_STEM, upload)
}

impl SnapEditClient {
    /// Detect objects that are candidates for removal
    ///
    /// Boxes are in the coordinates of the uploaded (bounded) image, not of
    /// `image` itself.
    ///
    /// # Errors
    /// - Input cannot be decoded
    /// - Transport or HTTP failure
    /// - Response does not match the detection shape
    pub async fn detect_objects(&self, image: &EncodedImage) -> Result<Option<DetectionResponse>> {
        let endpoint = Endpoint::AutoSuggest;
        if image.is_empty() {
            events::short_circuit(endpoint.operation_name());
            return Ok(None);
        }

        let span = spans::operation(endpoint.operation_name(), &new_request_id());
        async {
            let started = instant::Instant::now();
            let upload = prepare_upload(image, self.config().detection_max_side).await?;
            let response: DetectionResponse =
                self.post_form(endpoint, detection_form(&upload)).await?;

            tracing::debug!(
                objects = response.detected_objects.len(),
                "Objects detected"
            );
            events::performance_metric(endpoint.operation_name(), elapsed_ms(started));
            Ok(Some(response))
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SnapEditError;
    use crate::operations::test_support::{client_with, jpeg};
    use crate::transport::test_utils::MockTransport;
    use crate::types::ObjectType;
    use serde_json::json;

    fn detection_payload() -> serde_json::Value {
        json!({
            "detected_objects": [
                {
                    "accuracy": 0.91,
                    "box": { "x": 5.0, "y": 6.0, "width": 50.0, "height": 80.0 },
                    "object_description": "person",
                    "object_type": "person"
                },
                {
                    "accuracy": 0.42,
                    "box": { "x": 100.0, "y": 10.0, "width": 20.0, "height": 20.0 },
                    "object_description": "bottle",
                    "object_type": "object"
                }
            ]
        })
    }

    #[tokio::test]
    async fn test_detect_returns_structured_response() {
        let mock = MockTransport::with_json(detection_payload());
        let client = client_with(&mock);

        let response = client.detect_objects(&jpeg(2400, 1200)).await.unwrap().unwrap();
        assert_eq!(response.detected_objects.len(), 2);
        assert_eq!(response.detected_objects[1].object_type, ObjectType::Object);
        assert_eq!(response.detected_objects[0].bounding_box.height, 80.0);

        let history = mock.get_call_history();
        assert_eq!(history[0].path, "/api/object_removal/v1/auto_suggest");
        let form = history[0].form().unwrap();
        let upload = form.file_data("original_preview_image").unwrap();
        assert_eq!(
            EncodedImage::from_bytes(upload.to_vec()).dimensions().unwrap(),
            (1200, 600)
        );
    }

    #[tokio::test]
    async fn test_detect_empty_input() {
        let mock = MockTransport::with_json(detection_payload());
        let client = client_with(&mock);

        assert!(client
            .detect_objects(&EncodedImage::empty())
            .await
            .unwrap()
            .is_none());
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_detect_rejects_unexpected_shape() {
        let mock = MockTransport::with_json(json!({ "objects": [] }));
        let client = client_with(&mock);

        let err = client.detect_objects(&jpeg(32, 32)).await.unwrap_err();
        assert!(matches!(err, SnapEditError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_detect_transport_failure() {
        let mock = MockTransport::failing();
        let client = client_with(&mock);

        let err = client.detect_objects(&jpeg(32, 32)).await.unwrap_err();
        assert!(matches!(err, SnapEditError::Internal(_)));
        assert_eq!(mock.call_count(), 1);
    }
}
