//! The SnapEdit client handle
//!
//! [`SnapEditClient`] owns the validated configuration and a transport. The
//! four operations are implemented in [`crate::operations`].

use crate::{
    config::ClientConfig,
    endpoints::Endpoint,
    error::{Result, SnapEditError},
    transport::{HttpTransport, MultipartForm, RequestBody, Transport},
};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Client for the SnapEdit image editing API
///
/// Cheap to clone; clones share the transport and configuration. Holds no
/// per-call state, so concurrent calls on one handle are independent.
///
/// # Examples
///
/// ```rust,no_run
/// use snapedit::{EncodedImage, SnapEditClient};
///
/// # async fn example() -> snapedit::Result<()> {
/// let client = SnapEditClient::new("my-api-key")?;
/// let image = EncodedImage::from_bytes(std::fs::read("photo.jpg")?);
/// if let Some(cutout) = client.remove_background(&image).await? {
///     std::fs::write("cutout.png", cutout.data())?;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SnapEditClient {
    transport: Arc<dyn Transport>,
    config: Arc<ClientConfig>,
}

impl SnapEditClient {
    /// Create a client with default settings for the given API key
    ///
    /// # Errors
    /// - Empty API key
    /// - Failed to create HTTP client
    pub fn new<S: Into<String>>(api_key: S) -> Result<Self> {
        Self::from_config(ClientConfig::builder().api_key(api_key).build()?)
    }

    /// Create a client from `SNAPEDIT_*` environment variables
    ///
    /// # Errors
    /// See [`ClientConfig::from_env`] and [`SnapEditClient::from_config`].
    pub fn from_env() -> Result<Self> {
        Self::from_config(ClientConfig::from_env()?)
    }

    /// Create a client backed by [`HttpTransport`]
    ///
    /// # Errors
    /// - Invalid configuration
    /// - Failed to create HTTP client
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(&config)?;
        Ok(Self {
            transport: Arc::new(transport),
            config: Arc::new(config),
        })
    }

    /// Create a client on top of a custom transport
    ///
    /// # Errors
    /// - Invalid configuration
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            transport,
            config: Arc::new(config),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Underlying transport, for requests outside the four operations
    #[must_use]
    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// POST a multipart form and decode the endpoint's JSON response
    pub(crate) async fn post_form<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        form: MultipartForm,
    ) -> Result<T> {
        let path = endpoint.path();
        tracing::debug!(path = %path, fields = form.len(), "Submitting form");
        let response = self
            .transport
            .post(path, RequestBody::Multipart(form))
            .await?;
        response.json(path)
    }
}

impl std::fmt::Debug for SnapEditClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapEditClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Run CPU-bound image work off the async runtime, inside the current span
pub(crate) async fn run_blocking<F, T>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let span = tracing::Span::current();
    tokio::task::spawn_blocking(move || span.in_scope(work))
        .await
        .map_err(|e| SnapEditError::internal(format!("image processing task failed: {}", e)))?
}
