//! Configuration types for the SnapEdit client

use crate::error::{Result, SnapEditError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Public SnapEdit platform origin
pub const DEFAULT_BASE_URL: &str = "https://platform.snapedit.app";

/// Environment variable holding the API key
pub const ENV_API_KEY: &str = "SNAPEDIT_API_KEY";
/// Environment variable overriding the service origin
pub const ENV_BASE_URL: &str = "SNAPEDIT_BASE_URL";
/// Environment variable overriding the request timeout (seconds)
pub const ENV_TIMEOUT_SECS: &str = "SNAPEDIT_TIMEOUT_SECS";

/// Output image format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// PNG with alpha channel transparency
    Png,
    /// JPEG (no transparency, alpha is flattened)
    Jpeg,
    /// WebP with alpha channel transparency (lossless)
    WebP,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Png
    }
}

/// Which object removal endpoint to call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectRemovalMode {
    /// Standard inpainting (`/api/object_removal/v1/erase`)
    Erase,
    /// Higher quality inpainting (`/api/object_removal/v1/super_erase`)
    SuperErase,
}

impl Default for ObjectRemovalMode {
    fn default() -> Self {
        Self::Erase
    }
}

impl std::fmt::Display for ObjectRemovalMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Erase => write!(f, "erase"),
            Self::SuperErase => write!(f, "super_erase"),
        }
    }
}

/// Size thresholds driving the enhancement resize policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhanceLimits {
    /// Images whose largest side reaches this are downscaled to it
    pub max_size: u32,
    /// Images larger than this are downscaled to it and the zoom is halved
    pub max_size_download: u32,
}

impl Default for EnhanceLimits {
    fn default() -> Self {
        Self {
            max_size: 1400,
            max_size_download: 3000,
        }
    }
}

/// Configuration for a [`SnapEditClient`](crate::SnapEditClient)
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API key sent as `X-API-KEY`; never serialized
    #[serde(skip_serializing, default)]
    pub api_key: String,

    /// Service origin all endpoint paths are joined to
    pub base_url: String,

    /// Per-request timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// User-Agent header value
    pub user_agent: String,

    /// Longest side of the image uploaded for background removal
    pub background_removal_max_side: u32,

    /// Longest side of the image uploaded for object detection
    pub detection_max_side: u32,

    /// Longest side of the image uploaded for object removal
    pub object_removal_max_side: u32,

    /// Enhancement size thresholds
    pub enhance_limits: EnhanceLimits,

    /// Face restoration models requested from the enhancer
    pub face_model_ids: String,

    /// Object removal endpoint variant
    pub object_removal_mode: ObjectRemovalMode,

    /// Encoding of the composited object removal result
    pub object_removal_format: OutputFormat,

    /// JPEG quality (0-100, only used for JPEG output)
    pub jpeg_quality: u8,

    /// Gaussian blur sigma applied to the refined object removal mask
    pub mask_blur_sigma: f32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Some(Duration::from_secs(60)),
            user_agent: format!("snapedit-rs/{}", env!("CARGO_PKG_VERSION")),
            background_removal_max_side: 1280,
            detection_max_side: 1200,
            object_removal_max_side: 1200,
            enhance_limits: EnhanceLimits::default(),
            face_model_ids: "0".to_string(),
            object_removal_mode: ObjectRemovalMode::default(),
            object_removal_format: OutputFormat::Jpeg,
            jpeg_quality: 90,
            mask_blur_sigma: 1.0,
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("background_removal_max_side", &self.background_removal_max_side)
            .field("detection_max_side", &self.detection_max_side)
            .field("object_removal_max_side", &self.object_removal_max_side)
            .field("enhance_limits", &self.enhance_limits)
            .field("face_model_ids", &self.face_model_ids)
            .field("object_removal_mode", &self.object_removal_mode)
            .field("object_removal_format", &self.object_removal_format)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("mask_blur_sigma", &self.mask_blur_sigma)
            .finish()
    }
}

impl ClientConfig {
    /// Create a new configuration builder for fluent API construction
    ///
    /// # Examples
    ///
    /// ```rust
    /// use snapedit::{ClientConfig, ObjectRemovalMode};
    ///
    /// let config = ClientConfig::builder()
    ///     .api_key("my-key")
    ///     .object_removal_mode(ObjectRemovalMode::SuperErase)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.detection_max_side, 1200);
    /// ```
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Load configuration from `SNAPEDIT_*` environment variables
    ///
    /// # Errors
    /// - `SNAPEDIT_API_KEY` missing or empty
    /// - `SNAPEDIT_TIMEOUT_SECS` not a whole number of seconds
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Errors
    /// Same as [`ClientConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(ENV_API_KEY).unwrap_or_default();
        let mut builder = Self::builder().api_key(api_key);

        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            builder = builder.base_url(base_url.trim());
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                SnapEditError::invalid_config(format!(
                    "{} must be a whole number of seconds, got '{}'",
                    ENV_TIMEOUT_SECS, raw
                ))
            })?;
            builder = builder.timeout(if secs == 0 {
                None
            } else {
                Some(Duration::from_secs(secs))
            });
        }

        builder.build()
    }

    /// Validate all configuration parameters
    ///
    /// # Errors
    /// - Empty API key
    /// - Base URL without an `http://` or `https://` scheme
    /// - Zero resize bounds
    /// - Enhancement thresholds out of order
    /// - JPEG quality above 100
    /// - Negative or non-finite blur sigma
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(SnapEditError::invalid_config("API key must not be empty"));
        }

        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(SnapEditError::invalid_config(format!(
                "Base URL must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }

        for (name, value, recommended) in [
            ("background removal max side", self.background_removal_max_side, 1280),
            ("detection max side", self.detection_max_side, 1200),
            ("object removal max side", self.object_removal_max_side, 1200),
            ("enhance max size", self.enhance_limits.max_size, 1400),
        ] {
            if value == 0 {
                return Err(SnapEditError::config_value_error(
                    name,
                    value,
                    "1 or greater",
                    Some(recommended),
                ));
            }
        }

        if self.enhance_limits.max_size_download < self.enhance_limits.max_size {
            return Err(SnapEditError::config_value_error(
                "enhance max download size",
                self.enhance_limits.max_size_download,
                &format!(">= enhance max size ({})", self.enhance_limits.max_size),
                Some(3000),
            ));
        }

        if self.jpeg_quality > 100 {
            return Err(SnapEditError::config_value_error(
                "JPEG quality",
                self.jpeg_quality,
                "0-100",
                Some(90),
            ));
        }

        if !self.mask_blur_sigma.is_finite() || self.mask_blur_sigma < 0.0 {
            return Err(SnapEditError::config_value_error(
                "mask blur sigma",
                self.mask_blur_sigma,
                "0.0 or greater",
                Some(1.0),
            ));
        }

        Ok(())
    }
}

/// Builder for `ClientConfig`
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the API key
    #[must_use]
    pub fn api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.config.api_key = api_key.into();
        self
    }

    /// Set the service origin
    #[must_use]
    pub fn base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        let base_url: String = base_url.into();
        self.config.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Set the per-request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the background removal upload bound
    #[must_use]
    pub fn background_removal_max_side(mut self, side: u32) -> Self {
        self.config.background_removal_max_side = side;
        self
    }

    /// Set the object detection upload bound
    #[must_use]
    pub fn detection_max_side(mut self, side: u32) -> Self {
        self.config.detection_max_side = side;
        self
    }

    /// Set the object removal upload bound
    #[must_use]
    pub fn object_removal_max_side(mut self, side: u32) -> Self {
        self.config.object_removal_max_side = side;
        self
    }

    /// Set the enhancement thresholds
    #[must_use]
    pub fn enhance_limits(mut self, limits: EnhanceLimits) -> Self {
        self.config.enhance_limits = limits;
        self
    }

    /// Set the face model ids sent to the enhancer
    #[must_use]
    pub fn face_model_ids<S: Into<String>>(mut self, ids: S) -> Self {
        self.config.face_model_ids = ids.into();
        self
    }

    /// Select the object removal endpoint
    #[must_use]
    pub fn object_removal_mode(mut self, mode: ObjectRemovalMode) -> Self {
        self.config.object_removal_mode = mode;
        self
    }

    /// Set the encoding of composited object removal results
    #[must_use]
    pub fn object_removal_format(mut self, format: OutputFormat) -> Self {
        self.config.object_removal_format = format;
        self
    }

    /// Set JPEG quality
    #[must_use]
    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.config.jpeg_quality = quality.min(100);
        self
    }

    /// Set the mask blur sigma (0 disables blurring)
    #[must_use]
    pub fn mask_blur_sigma(mut self, sigma: f32) -> Self {
        self.config.mask_blur_sigma = sigma;
        self
    }

    /// Build and validate the configuration
    ///
    /// # Errors
    /// Any failure reported by [`ClientConfig::validate`].
    pub fn build(self) -> Result<ClientConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
