//! Error types for SnapEdit client operations

use thiserror::Error;

/// Result type alias for SnapEdit client operations
pub type Result<T> = std::result::Result<T, SnapEditError>;

/// Error types for SnapEdit client operations
#[derive(Error, Debug)]
pub enum SnapEditError {
    /// Input/output errors while reading caller-supplied streams
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding or encoding errors
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Connection, TLS or timeout failures raised by the HTTP client
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("HTTP {status} from {path}: {body}")]
    Http {
        status: u16,
        path: String,
        body: String,
    },

    /// Response body did not match the expected shape for the endpoint
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Malformed base64 payload in a data URL or response field
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Malformed caller input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Generic error for unexpected conditions
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SnapEditError {
    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Create an HTTP status error, keeping a bounded excerpt of the body
    pub fn http_status(status: u16, path: &str, body: &[u8]) -> Self {
        const MAX_BODY_EXCERPT: usize = 512;
        let text = String::from_utf8_lossy(body);
        let body = if text.len() > MAX_BODY_EXCERPT {
            let mut end = MAX_BODY_EXCERPT;
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}...", text.get(..end).unwrap_or_default())
        } else {
            text.into_owned()
        };

        Self::Http {
            status,
            path: path.to_string(),
            body,
        }
    }

    /// Create a response shape error with endpoint context
    pub fn invalid_response<E: std::fmt::Display>(path: &str, error: E) -> Self {
        Self::InvalidResponse(format!("Unexpected payload from {}: {}", path, error))
    }

    /// Create configuration error with valid ranges
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
        recommended: Option<T>,
    ) -> Self {
        let recommendation = match recommended {
            Some(rec) => format!(" Recommended: {}", rec),
            None => String::new(),
        };

        Self::InvalidConfig(format!(
            "Invalid {}: {} (valid range: {}).{}",
            parameter, value, valid_range, recommendation
        ))
    }

    /// HTTP status code carried by this error, if the service produced one
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
