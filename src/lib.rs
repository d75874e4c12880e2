#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unused_async)]

//! # SnapEdit Client Library
//!
//! An async client for the SnapEdit image editing API. It wraps four remote
//! operations and performs the client-side image work each one needs:
//!
//! - **Background removal**: bounded upload, returned mask applied to the
//!   full-resolution original
//! - **Enhancement**: size-dependent upload and zoom policy, face patches
//!   pasted back over the upload
//! - **Object detection**: structured removal suggestions
//! - **Object removal**: brush masks resized to the upload, the inpainted
//!   area blended back into the original
//!
//! Images travel as [`EncodedImage`] values (bytes plus mime type) and can
//! be built from raw bytes, `data:` URLs or async readers. An empty input
//! image is never sent; every operation returns `Ok(None)` for it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use snapedit::{ClientConfig, EncodedImage, SnapEditClient, ZoomFactor};
//! use tokio::fs::File;
//!
//! # async fn example() -> snapedit::Result<()> {
//! let config = ClientConfig::builder()
//!     .api_key(std::env::var("SNAPEDIT_API_KEY").unwrap_or_default())
//!     .build()?;
//! let client = SnapEditClient::from_config(config)?;
//!
//! let image = EncodedImage::from_reader(File::open("portrait.jpg").await?).await?;
//! if let Some(enhanced) = client.enhance_image(&image, ZoomFactor::X2).await? {
//!     tokio::fs::write("portrait-x2.png", enhanced.data()).await?;
//! }
//!
//! if let Some(detections) = client.detect_objects(&image).await? {
//!     for object in &detections.detected_objects {
//!         println!("{} ({:.2})", object.object_description, object.accuracy);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Transports
//!
//! All network access goes through the [`Transport`] trait. The default
//! [`HttpTransport`] uses `reqwest`; any other implementation can be
//! injected with [`SnapEditClient::with_transport`].
//!
//! ### Feature Flags
//!
//! - `webp-support` (default): WebP decoding and output
//! - `tracing-json`: JSON formatted log output

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod image_data;
pub mod operations;
pub mod services;
pub mod tracing_config;
pub mod transport;
pub mod types;
pub mod utils;

use tokio::io::AsyncRead;

// Public API exports
pub use client::SnapEditClient;
pub use config::{ClientConfig, ClientConfigBuilder, EnhanceLimits, ObjectRemovalMode, OutputFormat};
pub use endpoints::Endpoint;
pub use error::{Result, SnapEditError};
pub use image_data::EncodedImage;
pub use operations::{CompositeOptions, EnhancePlan, ZoomFactor};
pub use services::OutputFormatHandler;
pub use tracing_config::{events, init_library_tracing, spans, TracingConfig, TracingFormat};
pub use transport::{
    FormPart, HttpTransport, MultipartForm, PartValue, RequestBody, Transport, TransportResponse,
};
pub use types::{
    BoundingBox, DetectedObject, DetectionResponse, EnhanceResponse, ErasedRegion, FacePatch,
    ObjectType,
};
pub use utils::{Compositor, ImageResizer};

/// Remove the background of an image read from an async stream
///
/// Convenience wrapper around [`EncodedImage::from_reader`] and
/// [`SnapEditClient::remove_background`].
///
/// # Examples
///
/// ```rust,no_run
/// use snapedit::{remove_background_from_reader, SnapEditClient};
/// use tokio::fs::File;
///
/// # async fn example() -> snapedit::Result<()> {
/// let client = SnapEditClient::from_env()?;
/// let file = File::open("product.jpg").await?;
/// if let Some(cutout) = remove_background_from_reader(&client, file).await? {
///     tokio::fs::write("product.png", cutout.data()).await?;
/// }
/// # Ok(())
/// # }
/// ```
pub async fn remove_background_from_reader<R: AsyncRead + Unpin>(
    client: &SnapEditClient,
    reader: R,
) -> Result<Option<EncodedImage>> {
    let image = EncodedImage::from_reader(reader).await?;
    client.remove_background(&image).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::test_utils::MockTransport;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_reader_api_short_circuits_empty_stream() {
        let mock = MockTransport::with_json(serde_json::json!({ "output": "" }));
        let config = ClientConfig::builder().api_key("key").build().unwrap();
        let client = SnapEditClient::with_transport(config, Arc::new(mock.clone())).unwrap();

        let result = remove_background_from_reader(&client, tokio::io::empty())
            .await
            .unwrap();
        assert!(result.is_none());
        assert_eq!(mock.call_count(), 0);
    }
}
