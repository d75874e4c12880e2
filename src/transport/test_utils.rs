//! Mock transport for testing the operation façade
//!
//! Records every request and answers from a caller-supplied handler, so
//! façade tests run without network access.

use super::{RequestBody, Transport, TransportResponse};
use crate::error::{Result, SnapEditError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// A request observed by [`MockTransport`]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub path: String,
    pub body: Option<RequestBody>,
}

type Handler = dyn Fn(&RecordedRequest) -> Result<TransportResponse> + Send + Sync;

/// Mock transport with call history and scripted responses
#[derive(Clone)]
pub struct MockTransport {
    handler: Arc<Handler>,
    call_history: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockTransport {
    /// Answer every request with the given handler
    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(&RecordedRequest) -> Result<TransportResponse> + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
            call_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer every request with 200 and the given JSON document
    #[must_use]
    pub fn with_json(value: serde_json::Value) -> Self {
        Self::with_handler(move |_| Ok(TransportResponse::json_ok(&value)))
    }

    /// Answer every request with the given status and body
    #[must_use]
    pub fn with_status(status: u16, body: &str) -> Self {
        let body = body.as_bytes().to_vec();
        Self::with_handler(move |request| {
            TransportResponse::new(status, body.clone()).error_for_status(&request.path)
        })
    }

    /// Fail every request as if the connection dropped
    #[must_use]
    pub fn failing() -> Self {
        Self::with_handler(|request| {
            Err(SnapEditError::internal(format!(
                "simulated transport failure for {}",
                request.path
            )))
        })
    }

    /// Get the call history for verification in tests
    pub fn get_call_history(&self) -> Vec<RecordedRequest> {
        self.call_history.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.call_history.lock().unwrap().len()
    }

    fn record_and_answer(&self, request: RecordedRequest) -> Result<TransportResponse> {
        let response = (self.handler)(&request);
        if let Ok(mut history) = self.call_history.lock() {
            history.push(request);
        }
        response
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, path: &str) -> Result<TransportResponse> {
        self.record_and_answer(RecordedRequest {
            method: "GET",
            path: path.to_string(),
            body: None,
        })
    }

    async fn post(&self, path: &str, body: RequestBody) -> Result<TransportResponse> {
        self.record_and_answer(RecordedRequest {
            method: "POST",
            path: path.to_string(),
            body: Some(body),
        })
    }
}

impl RecordedRequest {
    /// Multipart form of this request, if it carried one
    pub fn form(&self) -> Option<&super::MultipartForm> {
        match &self.body {
            Some(RequestBody::Multipart(form)) => Some(form),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_records_calls() {
        let mock = MockTransport::with_json(serde_json::json!({ "ok": true }));
        let response = mock.get("/status").await.unwrap();
        assert!(response.is_success());

        let response = mock
            .post("/api/x", RequestBody::Json(serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(response.status, 200);

        let history = mock.get_call_history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].method, "GET");
        assert_eq!(history[1].path, "/api/x");
        assert!(history[1].form().is_none());
    }

    #[tokio::test]
    async fn test_mock_failures() {
        let mock = MockTransport::with_status(503, "maintenance");
        let err = mock.get("/status").await.unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert_eq!(mock.call_count(), 1);

        let mock = MockTransport::failing();
        assert!(matches!(
            mock.get("/status").await,
            Err(SnapEditError::Internal(_))
        ));
    }
}
