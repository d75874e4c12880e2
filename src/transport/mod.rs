//! Transport abstraction between the operation façade and the network
//!
//! The façade only ever talks to a [`Transport`]. [`HttpTransport`] is the
//! production implementation backed by `reqwest`; tests inject their own.

pub mod http;
pub mod multipart;

#[cfg(test)]
pub mod test_utils;

pub use http::{HttpTransport, API_KEY_HEADER};
pub use multipart::{FormPart, MultipartForm, PartValue};

use crate::error::{Result, SnapEditError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// Request payload accepted by [`Transport::post`]
#[derive(Debug, Clone)]
pub enum RequestBody {
    /// JSON-serialized body (`application/json`)
    Json(serde_json::Value),
    /// `multipart/form-data` body
    Multipart(MultipartForm),
}

impl From<MultipartForm> for RequestBody {
    fn from(form: MultipartForm) -> Self {
        Self::Multipart(form)
    }
}

impl From<serde_json::Value> for RequestBody {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

/// Raw response returned by a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body bytes
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    /// A 200 response carrying the given JSON document
    #[must_use]
    pub fn json_ok(value: &serde_json::Value) -> Self {
        Self::new(200, value.to_string().into_bytes())
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-success status into [`SnapEditError::Http`]
    ///
    /// # Errors
    /// - Status outside 2xx
    pub fn error_for_status(self, path: &str) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(SnapEditError::http_status(self.status, path, &self.body))
        }
    }

    /// Decode the body as JSON into the endpoint's response type
    ///
    /// # Errors
    /// - Body is not valid JSON or lacks required fields
    pub fn json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| SnapEditError::invalid_response(path, e))
    }
}

/// Trait for transports that carry requests to the SnapEdit service
///
/// Implementations attach authentication and resolve `path` against their
/// origin. Non-success statuses must be reported as [`SnapEditError::Http`]
/// and network failures passed through unchanged; no retries.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET request
    ///
    /// # Errors
    /// - Network failure
    /// - Non-success HTTP status
    async fn get(&self, path: &str) -> Result<TransportResponse>;

    /// Issue a POST request with the given body
    ///
    /// # Errors
    /// - Network failure
    /// - Non-success HTTP status
    async fn post(&self, path: &str, body: RequestBody) -> Result<TransportResponse>;
}
